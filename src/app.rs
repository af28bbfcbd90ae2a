use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::TokenCodec;
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::handlers;
use crate::middleware::require_user;
use crate::services::{ItemService, UserService};

pub const API_PREFIX: &str = "/api/v1";

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenCodec>,
    pub users: UserService,
    pub items: ItemService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tokens: Arc::new(TokenCodec::from_config(&config.security)),
            users: UserService::new(Arc::clone(&store)),
            items: ItemService::new(Arc::clone(&store)),
            config: Arc::new(config),
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let authenticated = protected_routes()
        .merge(elevated_routes())
        .route_layer(from_fn_with_state(state.clone(), require_user));

    let api = public_routes().merge(authenticated);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest(API_PREFIX, api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/login/access-token", post(public::login_access_token))
        .route("/users/signup", post(public::user_signup))
        .route("/utils/health-check", get(handlers::health::health_check))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{items, login, users};

    Router::new()
        .route("/login/test-token", post(login::test_token))
        .route(
            "/users/me",
            get(users::me_get).patch(users::me_patch).delete(users::me_delete),
        )
        .route("/users/me/password", patch(users::me_password_patch))
        .route("/users/:id", get(users::user_get))
        .route("/items", get(items::items_list).post(items::item_create))
        .route(
            "/items/:id",
            get(items::item_get).put(items::item_update).delete(items::item_delete),
        )
}

fn elevated_routes() -> Router<AppState> {
    use handlers::elevated::users;

    Router::new()
        .route("/users", get(users::users_list).post(users::user_create))
        .route("/users/:id", patch(users::user_patch).delete(users::user_delete))
}

/// Anything goes in development; elsewhere only the configured origins.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
