//! Mocked local authentication and the persisted signed-in profile.

use std::{thread, time::Duration};

use tracing::{debug, info, warn};

use crate::core::time::{Clock, SystemClock};
use crate::domain::user::{email_local_part, User};
use crate::storage::{KeyValueStore, AUTH_USER_KEY};

use super::{ServiceError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_AUTH_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_FEDERATED_DELAY: Duration = Duration::from_millis(1500);

const FEDERATED_EMAIL: &str = "user@gmail.com";
const FEDERATED_NAME: &str = "Google User";
const FEDERATED_AVATAR: &str = "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&h=100&fit=crop&crop=face";

/// Capability that verifies credentials and produces a profile.
pub trait CredentialService: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> ServiceResult<User>;
    fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> ServiceResult<User>;
    fn sign_in_federated(&self) -> ServiceResult<User>;
}

/// Accepts any non-blank email with a password of at least six characters.
pub struct MockCredentialService {
    delay: Duration,
    federated_delay: Duration,
    clock: Box<dyn Clock>,
}

impl MockCredentialService {
    pub fn new(delay: Duration, federated_delay: Duration) -> Self {
        Self::with_clock(delay, federated_delay, Box::new(SystemClock))
    }

    pub fn with_clock(delay: Duration, federated_delay: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            delay,
            federated_delay,
            clock,
        }
    }

    /// No artificial latency.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn accepts(email: &str, password: &str) -> bool {
        !email.trim().is_empty() && password.chars().count() >= MIN_PASSWORD_LEN
    }

    fn user_id(&self) -> String {
        self.clock.now().timestamp_millis().to_string()
    }
}

impl Default for MockCredentialService {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_DELAY, DEFAULT_FEDERATED_DELAY)
    }
}

impl CredentialService for MockCredentialService {
    fn sign_in(&self, email: &str, password: &str) -> ServiceResult<User> {
        thread::sleep(self.delay);
        if !Self::accepts(email, password) {
            return Err(ServiceError::Auth("Invalid email or password".into()));
        }
        let email = email.trim();
        Ok(User {
            id: self.user_id(),
            email: email.to_string(),
            name: Some(email_local_part(email).to_string()),
            avatar: None,
        })
    }

    fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> ServiceResult<User> {
        thread::sleep(self.delay);
        if !Self::accepts(email, password) {
            return Err(ServiceError::Auth(
                "Invalid email or password (minimum 6 characters)".into(),
            ));
        }
        let email = email.trim();
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email_local_part(email));
        Ok(User {
            id: self.user_id(),
            email: email.to_string(),
            name: Some(name.to_string()),
            avatar: None,
        })
    }

    fn sign_in_federated(&self) -> ServiceResult<User> {
        thread::sleep(self.federated_delay);
        Ok(User {
            id: format!("google_{}", self.user_id()),
            email: FEDERATED_EMAIL.into(),
            name: Some(FEDERATED_NAME.into()),
            avatar: Some(FEDERATED_AVATAR.into()),
        })
    }
}

/// Tracks who is signed in and keeps the profile under [`AUTH_USER_KEY`].
pub struct AuthSession {
    storage: Box<dyn KeyValueStore>,
    credentials: Box<dyn CredentialService>,
    user: Option<User>,
}

impl AuthSession {
    /// Restores the persisted profile. A missing key means signed out; an
    /// unreadable one is logged and treated the same way.
    pub fn open(storage: Box<dyn KeyValueStore>, credentials: Box<dyn CredentialService>) -> Self {
        let user = load_user(storage.as_ref());
        debug!(signed_in = user.is_some(), "auth session opened");
        Self {
            storage,
            credentials,
            user,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> ServiceResult<&User> {
        info!(email = email.trim(), "signing in");
        let user = self.credentials.sign_in(email, password).map_err(log_auth_error)?;
        self.store_user(user)
    }

    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ServiceResult<&User> {
        info!(email = email.trim(), "signing up");
        let user = self
            .credentials
            .sign_up(email, password, name)
            .map_err(log_auth_error)?;
        self.store_user(user)
    }

    pub fn sign_in_with_google(&mut self) -> ServiceResult<&User> {
        info!("signing in with federated provider");
        let user = self.credentials.sign_in_federated().map_err(log_auth_error)?;
        self.store_user(user)
    }

    pub fn sign_out(&mut self) -> ServiceResult<()> {
        self.storage.remove(AUTH_USER_KEY)?;
        self.user = None;
        info!("signed out");
        Ok(())
    }

    fn store_user(&mut self, user: User) -> ServiceResult<&User> {
        let json = serde_json::to_string(&user).map_err(crate::errors::StorageError::from)?;
        self.storage.set(AUTH_USER_KEY, &json)?;
        Ok(&*self.user.insert(user))
    }
}

fn log_auth_error(err: ServiceError) -> ServiceError {
    warn!(error = %err, "authentication failed");
    err
}

fn load_user(storage: &dyn KeyValueStore) -> Option<User> {
    let raw = match storage.get(AUTH_USER_KEY) {
        Ok(raw) => raw?,
        Err(err) => {
            warn!(error = %err, "failed to read signed-in user");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(err) => {
            warn!(error = %err, "stored user profile is unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session(storage: &MemoryStore) -> AuthSession {
        AuthSession::open(
            Box::new(storage.clone()),
            Box::new(MockCredentialService::instant()),
        )
    }

    #[test]
    fn short_password_is_rejected() {
        let storage = MemoryStore::new();
        let mut auth = session(&storage);
        let err = auth.sign_in("ann@example.com", "12345").unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!auth.is_signed_in());
        assert!(storage.is_empty());
    }

    #[test]
    fn sign_in_persists_and_restores_profile() {
        let storage = MemoryStore::new();
        let mut auth = session(&storage);
        let user = auth.sign_in("ann@example.com", "123456").unwrap().clone();
        assert_eq!(user.name.as_deref(), Some("ann"));

        let restored = session(&storage);
        assert_eq!(restored.current_user(), Some(&user));
    }

    #[test]
    fn sign_up_uses_given_name_and_sign_out_clears() {
        let storage = MemoryStore::new();
        let mut auth = session(&storage);
        let user = auth.sign_up("bo@example.com", "secret1", Some("Bo")).unwrap();
        assert_eq!(user.display_name(), "Bo");
        auth.sign_out().unwrap();
        assert!(!auth.is_signed_in());
        assert!(!storage.contains(AUTH_USER_KEY).unwrap());
    }

    #[test]
    fn federated_sign_in_returns_fixed_profile() {
        let storage = MemoryStore::new();
        let mut auth = session(&storage);
        let user = auth.sign_in_with_google().unwrap();
        assert!(user.id.starts_with("google_"));
        assert_eq!(user.email, "user@gmail.com");
        assert!(user.avatar.is_some());
    }
}
