use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{self, UserRoute};
use crate::api::{UpdatePassword, UserCreate, UserRegister, UserUpdate, UserUpdateMe};
use crate::auth::{hash_password, verify_password};
use crate::database::models::{Item, User, UserPatch};
use crate::database::{DatabaseError, DocumentStore, Repository};
use crate::filter::{Filter, Page};

use super::{ServiceError, ServiceResult};

const EMAIL_TAKEN: &str = "The user with this email already exists in the system";
const USER_NOT_FOUND: &str = "User not found";

#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    items: Repository<Item>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Repository::new(Arc::clone(&store)),
            items: Repository::new(store),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let mut filter = Filter::new();
        filter.eq("email", email).map_err(DatabaseError::from)?;
        Ok(self.users.select_one(&filter).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.users.select_id(id).await?)
    }

    /// Conflict when another account already holds `email`.
    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> ServiceResult<()> {
        match self.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(ServiceError::Conflict(EMAIL_TAKEN))
            }
            _ => Ok(()),
        }
    }

    async fn load(&self, id: Uuid) -> ServiceResult<User> {
        self.find_by_id(id).await?.ok_or(ServiceError::NotFound(USER_NOT_FOUND))
    }

    async fn apply(&self, id: Uuid, patch: &UserPatch) -> ServiceResult<User> {
        self.users
            .update(id, patch)
            .await?
            .ok_or(ServiceError::NotFound(USER_NOT_FOUND))
    }

    /// Self-registration: always an active, regular account.
    pub async fn register(&self, input: UserRegister) -> ServiceResult<User> {
        self.ensure_email_free(&input.email, None).await?;
        let user = User::new(input.email, input.full_name, hash_password(&input.password)?);
        self.users.insert(&user).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn create(&self, principal: &User, input: UserCreate) -> ServiceResult<User> {
        access::require_superuser(principal)?;
        self.ensure_email_free(&input.email, None).await?;

        let mut user = User::new(input.email, input.full_name, hash_password(&input.password)?);
        user.is_active = input.is_active;
        user.is_superuser = input.is_superuser;
        self.users.insert(&user).await?;
        info!("User {} created by {}", user.id, principal.id);
        Ok(user)
    }

    /// One page of accounts plus the total count.
    pub async fn list(&self, principal: &User, page: Page) -> ServiceResult<(Vec<User>, u64)> {
        access::require_superuser(principal)?;
        let mut filter = Filter::new();
        filter.page(page).map_err(DatabaseError::from)?;
        let users = self.users.select_any(&filter).await?;
        let count = self.users.count(&Filter::new()).await?;
        Ok((users, count))
    }

    pub async fn update_me(&self, principal: &User, input: UserUpdateMe) -> ServiceResult<User> {
        if let Some(email) = &input.email {
            self.ensure_email_free(email, Some(principal.id)).await?;
        }
        let patch = UserPatch {
            email: input.email,
            full_name: input.full_name,
            ..Default::default()
        };
        self.apply(principal.id, &patch).await
    }

    pub async fn update_password(
        &self,
        principal: &User,
        input: UpdatePassword,
    ) -> ServiceResult<()> {
        if !verify_password(&input.current_password, &principal.hashed_password) {
            return Err(ServiceError::BadRequest("Incorrect password"));
        }
        if input.current_password == input.new_password {
            return Err(ServiceError::BadRequest(
                "New password cannot be the same as the current one",
            ));
        }
        let patch = UserPatch::password(hash_password(&input.new_password)?);
        self.apply(principal.id, &patch).await?;
        info!("User {} changed their password", principal.id);
        Ok(())
    }

    pub async fn delete_me(&self, principal: &User) -> ServiceResult<()> {
        access::can_delete_self(principal)?;
        self.remove(principal.id).await
    }

    pub async fn read_by_id(&self, principal: &User, id: Uuid) -> ServiceResult<User> {
        let user = self.load(id).await?;
        if !access::can_read_user(principal, &user) {
            warn!("User {} denied read of user {}", principal.id, id);
            return Err(ServiceError::Forbidden(access::AccessDenied::NOT_ENOUGH_PRIVILEGES));
        }
        Ok(user)
    }

    pub async fn update_by_id(
        &self,
        principal: &User,
        id: Uuid,
        input: UserUpdate,
    ) -> ServiceResult<User> {
        access::require_superuser(principal)?;
        let target = self.load(id).await?;
        if !access::can_write_user(principal, &target, UserRoute::Administrative) {
            return Err(ServiceError::Forbidden(access::AccessDenied::NOT_ENOUGH_PRIVILEGES));
        }
        if let Some(email) = &input.email {
            self.ensure_email_free(email, Some(target.id)).await?;
        }

        let hashed_password = input.password.as_deref().map(hash_password).transpose()?;
        let patch = UserPatch {
            email: input.email,
            full_name: input.full_name,
            is_active: input.is_active,
            is_superuser: input.is_superuser,
            hashed_password,
        };
        let user = self.apply(target.id, &patch).await?;
        info!("User {} updated by {}", user.id, principal.id);
        Ok(user)
    }

    pub async fn delete_by_id(&self, principal: &User, id: Uuid) -> ServiceResult<()> {
        access::require_superuser(principal)?;
        let target = self.load(id).await?;
        access::can_delete_other(principal, &target)?;
        self.remove(target.id).await?;
        info!("User {} deleted by {}", target.id, principal.id);
        Ok(())
    }

    /// Delete an account along with every item it owns.
    async fn remove(&self, id: Uuid) -> ServiceResult<()> {
        let mut owned = Filter::new();
        owned.eq("owner_id", id).map_err(DatabaseError::from)?;
        let items = self.items.delete_any(&owned).await?;
        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound(USER_NOT_FOUND));
        }
        info!("Removed user {} and {} owned item(s)", id, items);
        Ok(())
    }

    /// `Some` iff the email exists and the password verifies.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Option<User>> {
        Ok(self
            .find_by_email(email)
            .await?
            .filter(|user| verify_password(password, &user.hashed_password)))
    }

    /// Credentials check for the token endpoint; also refuses inactive accounts.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .authenticate(email, password)
            .await?
            .ok_or(ServiceError::InvalidCredentials("Incorrect email or password"))?;
        if !user.is_active {
            return Err(ServiceError::InvalidCredentials("Inactive user"));
        }
        Ok(user)
    }

    /// Resolve a token subject to an active account.
    pub async fn principal(&self, id: Uuid) -> ServiceResult<User> {
        let user = self.load(id).await?;
        if !user.is_active {
            return Err(ServiceError::InvalidCredentials("Inactive user"));
        }
        Ok(user)
    }

    /// Create the configured administrator unless that email is already taken.
    pub async fn ensure_first_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> ServiceResult<Option<User>> {
        if self.find_by_email(email).await?.is_some() {
            info!("First superuser {} already present", email);
            return Ok(None);
        }
        let mut user = User::new(email, None, hash_password(password)?);
        user.is_superuser = true;
        self.users.insert(&user).await?;
        info!("Created first superuser {}", email);
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessDenied;
    use crate::database::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    fn register_input(email: &str) -> UserRegister {
        UserRegister {
            email: email.to_string(),
            password: "pw123456".to_string(),
            full_name: None,
        }
    }

    async fn admin(service: &UserService) -> User {
        service
            .ensure_first_superuser("admin@x.com", "adminpass")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_without_new_record() {
        let service = service();
        service.register(register_input("a@x.com")).await.unwrap();

        let err = service.register(register_input("a@x.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let admin = admin(&service).await;
        let (_, count) = service.list(&admin, Page::new(0, 100)).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn authenticate_requires_matching_password() {
        let service = service();
        let user = service.register(register_input("a@x.com")).await.unwrap();

        assert_eq!(
            service.authenticate("a@x.com", "pw123456").await.unwrap().map(|u| u.id),
            Some(user.id)
        );
        assert!(service.authenticate("a@x.com", "wrongpass").await.unwrap().is_none());
        assert!(service.authenticate("b@x.com", "pw123456").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn login_rejects_inactive_accounts() {
        let service = service();
        let admin = admin(&service).await;
        let user = service.register(register_input("a@x.com")).await.unwrap();
        let deactivate = UserUpdate { is_active: Some(false), ..Default::default() };
        service.update_by_id(&admin, user.id, deactivate).await.unwrap();

        let err = service.login("a@x.com", "pw123456").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials("Inactive user")));
        assert!(matches!(
            service.principal(user.id).await,
            Err(ServiceError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn same_password_is_rejected_and_hash_kept() {
        let service = service();
        let user = service.register(register_input("a@x.com")).await.unwrap();

        let same = UpdatePassword {
            current_password: "pw123456".to_string(),
            new_password: "pw123456".to_string(),
        };
        let err = service.update_password(&user, same).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let stored = service.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.hashed_password, user.hashed_password);
    }

    #[tokio::test]
    async fn wrong_current_password_is_rejected() {
        let service = service();
        let user = service.register(register_input("a@x.com")).await.unwrap();
        let input = UpdatePassword {
            current_password: "not-my-password".to_string(),
            new_password: "brandnew123".to_string(),
        };
        assert!(matches!(
            service.update_password(&user, input).await,
            Err(ServiceError::BadRequest("Incorrect password"))
        ));
    }

    #[tokio::test]
    async fn update_me_checks_email_against_others_only() {
        let service = service();
        let a = service.register(register_input("a@x.com")).await.unwrap();
        service.register(register_input("b@x.com")).await.unwrap();

        let keep_own = UserUpdateMe {
            email: Some("a@x.com".to_string()),
            full_name: Some(Some("A".to_string())),
        };
        let updated = service.update_me(&a, keep_own).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("A"));

        let steal = UserUpdateMe { email: Some("b@x.com".to_string()), full_name: None };
        assert!(matches!(service.update_me(&a, steal).await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn null_full_name_clears_it_on_both_routes() {
        let service = service();
        let admin = admin(&service).await;
        let user = service.register(register_input("a@x.com")).await.unwrap();
        let named = UserUpdateMe { full_name: Some(Some("A".to_string())), email: None };
        let user = service.update_me(&user, named).await.unwrap();
        assert_eq!(user.full_name.as_deref(), Some("A"));

        let cleared = UserUpdateMe { full_name: Some(None), email: None };
        let user = service.update_me(&user, cleared).await.unwrap();
        assert_eq!(user.full_name, None);
        assert_eq!(user.email, "a@x.com");

        let renamed = UserUpdate { full_name: Some(Some("B".to_string())), ..Default::default() };
        service.update_by_id(&admin, user.id, renamed).await.unwrap();
        let cleared = UserUpdate { full_name: Some(None), ..Default::default() };
        let after = service.update_by_id(&admin, user.id, cleared).await.unwrap();
        assert_eq!(after.full_name, None);
        assert_eq!(service.read_by_id(&admin, user.id).await.unwrap().full_name, None);
    }

    #[tokio::test]
    async fn empty_update_leaves_user_unchanged() {
        let service = service();
        let admin = admin(&service).await;
        let user = service.register(register_input("a@x.com")).await.unwrap();

        let after = service.update_by_id(&admin, user.id, UserUpdate::default()).await.unwrap();
        assert_eq!(after, user);
        let after = service.update_me(&user, UserUpdateMe::default()).await.unwrap();
        assert_eq!(after, user);
    }

    #[tokio::test]
    async fn admin_update_rehashes_password() {
        let service = service();
        let admin = admin(&service).await;
        let user = service.register(register_input("a@x.com")).await.unwrap();

        let input = UserUpdate { password: Some("replaced99".to_string()), ..Default::default() };
        service.update_by_id(&admin, user.id, input).await.unwrap();

        assert!(service.authenticate("a@x.com", "replaced99").await.unwrap().is_some());
        assert!(service.authenticate("a@x.com", "pw123456").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admins_cannot_delete_themselves() {
        let service = service();
        let admin = admin(&service).await;

        assert!(matches!(
            service.delete_me(&admin).await,
            Err(ServiceError::Forbidden(AccessDenied::SUPERUSER_SELF_DELETE))
        ));
        assert!(matches!(
            service.delete_by_id(&admin, admin.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(service.find_by_id(admin.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_items() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let service = UserService::new(Arc::clone(&store));
        let items = Repository::<Item>::new(store);

        let user = service.register(register_input("a@x.com")).await.unwrap();
        let other = service.register(register_input("b@x.com")).await.unwrap();
        items.insert(&Item::new("mine", None, user.id)).await.unwrap();
        items.insert(&Item::new("theirs", None, other.id)).await.unwrap();

        service.delete_me(&user).await.unwrap();

        assert!(service.find_by_id(user.id).await.unwrap().is_none());
        assert_eq!(items.count(&Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn regular_users_only_read_themselves() {
        let service = service();
        let a = service.register(register_input("a@x.com")).await.unwrap();
        let b = service.register(register_input("b@x.com")).await.unwrap();

        assert_eq!(service.read_by_id(&a, a.id).await.unwrap().id, a.id);
        assert!(matches!(service.read_by_id(&a, b.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(
            service.read_by_id(&a, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
        let listed = service.list(&a, Page::new(0, 10)).await;
        assert!(matches!(listed, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn first_superuser_is_created_once() {
        let service = service();
        assert!(service.ensure_first_superuser("root@x.com", "rootpass1").await.unwrap().is_some());
        assert!(service.ensure_first_superuser("root@x.com", "rootpass1").await.unwrap().is_none());

        let root = service.find_by_email("root@x.com").await.unwrap().unwrap();
        assert!(root.is_superuser && root.is_active);
    }
}
