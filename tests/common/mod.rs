#![allow(dead_code)]

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use items_api_rust::config::AppConfig;
use items_api_rust::database::DatabaseManager;
use items_api_rust::{app, AppState};

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "adminpass123";
pub const PASSWORD: &str = "pw123456";

/// A server on its own port with a fresh in-memory store and one administrator.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
    pub state: AppState,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut config = AppConfig::for_memory_store(SECRET);
        config.bootstrap.first_superuser = Some(ADMIN_EMAIL.to_string());
        config.bootstrap.first_superuser_password = Some(ADMIN_PASSWORD.to_string());

        let store = DatabaseManager::new(config.database.clone()).connect().await?;
        let state = AppState::new(config, store);
        state.users.ensure_first_superuser(ADMIN_EMAIL, ADMIN_PASSWORD).await?;

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(state.clone());
        tokio::spawn(async move { axum::serve(listener, router).await });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            state,
        })
    }

    /// Absolute URL for a path under `/api/v1`.
    pub fn api(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api("/login/access-token"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?)
    }

    pub async fn token(&self, email: &str, password: &str) -> Result<String> {
        let res = self.login(email, password).await?;
        if res.status() != StatusCode::OK {
            bail!("login for {} failed with {}", email, res.status());
        }
        let body: Value = res.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response without access_token")
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.api("/users/signup"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register `email` with [`PASSWORD`] and log in. Returns (user id, token).
    pub async fn user(&self, email: &str) -> Result<(String, String)> {
        let res = self.signup(email, PASSWORD).await?;
        if res.status() != StatusCode::OK {
            bail!("signup for {} failed with {}", email, res.status());
        }
        let body: Value = res.json().await?;
        let id = body["id"].as_str().context("signup response without id")?.to_string();
        Ok((id, self.token(email, PASSWORD).await?))
    }

    pub async fn create_item(&self, token: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.api("/items"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        if res.status() != StatusCode::OK {
            bail!("item create failed with {}", res.status());
        }
        Ok(res.json().await?)
    }
}
