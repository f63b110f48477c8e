//! The session store: who is signed in, and the only writer of the
//! gateway credential.
//!
//! State machine:
//!
//! ```text
//! Restoring ──restore ok──▶ Authenticated ──logout──▶ Anonymous
//!     └──────restore failed / no token──────────────▶ Anonymous ──login──▶ Authenticated
//! ```
//!
//! `Restoring` is the initial state and is never re-entered.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::{AuthError, LOGIN_FAILED};
use super::storage::{Storage, TOKEN_KEY, USER_KEY};
use crate::api::{ApiClient, Credential, RequestGateway};
use crate::models::{ProfileUpdate, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Restoring,
    Authenticated {
        user: UserProfile,
        credential: Credential,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Restoring)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

pub struct SessionStore {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        Self { api, storage, state }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn gateway(&self) -> &RequestGateway {
        self.api.gateway()
    }

    // ===== Accessors =====

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    /// Receiver that wakes on every state transition
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    // ===== Transitions =====

    /// Turn a persisted token into a confirmed session.
    ///
    /// Every path leaves `Restoring`. Any failure cleans up exactly like
    /// [`logout`](Self::logout). Once restoration has finished, further
    /// calls do nothing.
    pub async fn restore_session(&self) {
        if !self.is_loading() {
            debug!("Session already resolved, skipping restore");
            return;
        }

        let stored = self.storage.get(TOKEN_KEY).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read stored token");
            None
        });
        let Some(credential) = stored.and_then(Credential::new) else {
            debug!("No stored token");
            self.finish_restore(None);
            return;
        };

        // A login or logout may have committed while the token was read
        let mut armed = false;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                self.gateway().set_credential(credential.clone());
                armed = true;
            }
            false
        });
        if !armed {
            debug!("Session resolved while reading stored token, skipping restore");
            return;
        }

        match self.api.fetch_profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Session restored");
                self.finish_restore(Some((user, credential)));
            }
            Err(e) if e.is_response() => {
                info!(error = %e, "Stored token rejected");
                self.finish_restore(None);
            }
            Err(e) => {
                warn!(error = %e, "Could not reach API while restoring session");
                self.finish_restore(None);
            }
        }
    }

    /// Leave `Restoring`, unless a login or logout already did
    fn finish_restore(&self, outcome: Option<(UserProfile, Credential)>) {
        let applied = self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = match outcome {
                Some((user, credential)) => {
                    self.persist_user(&user);
                    SessionState::Authenticated { user, credential }
                }
                None => {
                    self.clear_session();
                    SessionState::Anonymous
                }
            };
            true
        });
        if !applied {
            debug!("Discarding stale restore result");
        }
    }

    /// `POST /auth/login`. The store is `Authenticated` before this returns `Ok`.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let response: LoginResponse = self
            .gateway()
            .post("/auth/login", &LoginRequest { email, password })
            .await
            .map_err(AuthError::from_login)?;

        let credential = Credential::new(response.token)
            .ok_or_else(|| AuthError::Authentication(LOGIN_FAILED.to_string()))?;
        let user = response
            .user
            .filter(UserProfile::has_identity)
            .ok_or_else(|| AuthError::Authentication(LOGIN_FAILED.to_string()))?;

        if let Err(e) = self.storage.set(TOKEN_KEY, credential.as_str()) {
            warn!(error = %e, "Failed to persist token, session will not survive restart");
        }
        self.persist_user(&user);

        self.state.send_modify(|state| {
            self.gateway().set_credential(credential.clone());
            *state = SessionState::Authenticated {
                user: user.clone(),
                credential,
            };
        });
        info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    /// Forget the session everywhere. Safe to call in any state.
    pub fn logout(&self) {
        let changed = self.state.send_if_modified(|state| {
            self.clear_session();
            if matches!(state, SessionState::Anonymous) {
                false
            } else {
                *state = SessionState::Anonymous;
                true
            }
        });
        if changed {
            info!("Logged out");
        }
    }

    /// `PUT /profile`, then replace the signed-in user's copy
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        let user = self.api.update_profile(update).await.map_err(AuthError::Api)?;

        let applied = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated { user: current, .. } => {
                *current = user.clone();
                true
            }
            _ => false,
        });
        if applied {
            self.persist_user(&user);
        } else {
            debug!("Signed out while profile update was in flight");
        }
        Ok(user)
    }

    fn persist_user(&self, user: &UserProfile) {
        let result = serde_json::to_string(user)
            .map_err(anyhow::Error::from)
            .and_then(|snapshot| self.storage.set(USER_KEY, &snapshot));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist user snapshot");
        }
    }

    fn clear_session(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, key, "Failed to clear stored session");
            }
        }
        self.gateway().clear_credential();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::{ApiError, Method, RequestBody};
    use crate::auth::storage::MemoryStorage;
    use serde_json::json;

    struct Fixture {
        transport: Arc<MockTransport>,
        storage: Arc<MemoryStorage>,
        store: Arc<SessionStore>,
    }

    fn fixture() -> Fixture {
        fixture_with_timeout(Duration::from_secs(5))
    }

    fn fixture_with_timeout(timeout: Duration) -> Fixture {
        let transport = MockTransport::new();
        let storage = Arc::new(MemoryStorage::new());
        let gateway = RequestGateway::new(transport.clone(), "http://api.test").with_timeout(timeout);
        let store = SessionStore::new(ApiClient::new(Arc::new(gateway)), storage.clone());
        Fixture {
            transport,
            storage,
            store: Arc::new(store),
        }
    }

    impl Fixture {
        fn has_credential(&self) -> bool {
            self.store.api().gateway().has_credential()
        }
    }

    struct ReadOnlyStorage;

    /// Memory storage that signs the store out right after the token is read
    struct SignOutOnRead {
        inner: MemoryStorage,
        store: std::sync::Mutex<Option<Arc<SessionStore>>>,
    }

    impl Storage for SignOutOnRead {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            let value = self.inner.get(key)?;
            if let Some(store) = self.store.lock().unwrap().take() {
                store.logout();
            }
            Ok(value)
        }
        fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    impl Storage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only")
        }
        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    // --- Restoration ---

    #[tokio::test]
    async fn test_starts_restoring() {
        let f = fixture();
        assert!(f.store.is_loading());
        assert!(!f.store.is_authenticated());
        assert_eq!(f.store.user(), None);
    }

    #[tokio::test]
    async fn test_restore_without_token_is_idempotent() {
        let f = fixture();
        for _ in 0..3 {
            f.store.restore_session().await;
            assert_eq!(f.store.state(), SessionState::Anonymous);
            assert!(!f.store.is_loading());
        }
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let f = fixture();
        f.storage.set(TOKEN_KEY, "abc123").unwrap();
        f.transport.respond(200, r#"{"_id":"u1","fullName":"Jane Doe","email":"jane@x.com"}"#);

        f.store.restore_session().await;

        assert!(f.store.is_authenticated());
        assert!(!f.store.is_loading());
        assert_eq!(f.store.user().unwrap().full_name, "Jane Doe");

        let sent = f.transport.last_request().unwrap();
        assert_eq!(sent.method, Method::Get);
        assert_eq!(sent.url, "http://api.test/profile");
        assert_eq!(sent.authorization.as_deref(), Some("Bearer abc123"));

        let snapshot = f.storage.get(USER_KEY).unwrap().unwrap();
        assert!(snapshot.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_restore_with_expired_token() {
        let f = fixture();
        f.storage.set(TOKEN_KEY, "expired").unwrap();
        f.storage.set(USER_KEY, r#"{"_id":"u1"}"#).unwrap();
        f.transport.respond(401, r#"{"message":"jwt expired"}"#);

        f.store.restore_session().await;

        assert_eq!(f.store.state(), SessionState::Anonymous);
        assert!(!f.store.is_loading());
        assert_eq!(f.storage.get(TOKEN_KEY).unwrap(), None);
        assert!(!f.has_credential());
    }

    #[tokio::test]
    async fn test_restore_network_failure_cleans_up() {
        let f = fixture();
        f.storage.set(TOKEN_KEY, "abc123").unwrap();
        f.transport.fail(ApiError::Network("connection refused".into()));

        f.store.restore_session().await;

        assert_eq!(f.store.state(), SessionState::Anonymous);
        assert!(f.storage.is_empty());
        assert!(!f.has_credential());
    }

    #[tokio::test]
    async fn test_restore_with_non_profile_body_cleans_up() {
        let f = fixture();
        f.storage.set(TOKEN_KEY, "abc").unwrap();
        f.transport.respond(200, r#"{"message":"Not authorized, token failed"}"#);

        f.store.restore_session().await;

        assert_eq!(f.store.state(), SessionState::Anonymous);
        assert_eq!(f.store.user(), None);
        assert!(f.storage.is_empty());
        assert!(!f.has_credential());
    }

    #[tokio::test]
    async fn test_logout_during_token_read_wins() {
        let transport = MockTransport::new();
        let storage = Arc::new(SignOutOnRead {
            inner: MemoryStorage::new(),
            store: std::sync::Mutex::new(None),
        });
        storage.inner.set(TOKEN_KEY, "stale").unwrap();
        let gateway = RequestGateway::new(transport.clone(), "http://api.test");
        let store = Arc::new(SessionStore::new(ApiClient::new(Arc::new(gateway)), storage.clone()));
        *storage.store.lock().unwrap() = Some(store.clone());

        store.restore_session().await;

        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(!store.api().gateway().has_credential());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_restore_hung_request_times_out() {
        let f = fixture_with_timeout(Duration::from_millis(50));
        f.storage.set(TOKEN_KEY, "abc123").unwrap();
        f.transport.hang();

        f.store.restore_session().await;

        assert!(!f.store.is_loading());
        assert_eq!(f.store.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_failed_restore_matches_logout() {
        let restored = fixture();
        restored.storage.set(TOKEN_KEY, "expired").unwrap();
        restored.transport.respond(401, "{}");
        restored.store.restore_session().await;

        let logged_out = fixture();
        logged_out.store.restore_session().await;
        logged_out.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1"}}"#);
        logged_out.store.login("jane@x.com", "pw").await.unwrap();
        logged_out.store.logout();

        for f in [&restored, &logged_out] {
            assert_eq!(f.store.state(), SessionState::Anonymous);
            assert!(f.storage.is_empty());
            assert!(!f.has_credential());
        }
    }

    #[tokio::test]
    async fn test_stale_restore_does_not_override_login() {
        let f = fixture_with_timeout(Duration::from_millis(100));
        f.storage.set(TOKEN_KEY, "old").unwrap();
        f.transport.hang();
        f.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1","fullName":"Jane"}}"#);

        let store = f.store.clone();
        let restore = tokio::spawn(async move { store.restore_session().await });
        while f.transport.requests().is_empty() {
            tokio::task::yield_now().await;
        }

        f.store.login("jane@x.com", "rightpass").await.unwrap();
        restore.await.unwrap();

        assert!(f.store.is_authenticated());
        assert_eq!(f.storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert!(f.has_credential());
    }

    // --- Login ---

    #[tokio::test]
    async fn test_login_rejected() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(401, r#"{"message":"Invalid credentials"}"#);

        let err = f.store.login("jane@x.com", "wrongpass").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(f.store.state(), SessionState::Anonymous);
        assert!(f.storage.is_empty());
    }

    #[tokio::test]
    async fn test_login_rejected_without_message() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(500, "Internal Server Error");

        let err = f.store.login("jane@x.com", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), LOGIN_FAILED);
    }

    #[tokio::test]
    async fn test_login_success_is_committed_on_return() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1","fullName":"Jane"}}"#);

        let user = f.store.login("jane@x.com", "rightpass").await.unwrap();

        assert_eq!(user.full_name, "Jane");
        assert!(f.store.is_authenticated());
        assert_eq!(f.store.user().unwrap().full_name, "Jane");
        assert_eq!(
            f.transport.last_request().unwrap().body,
            RequestBody::Json(json!({ "email": "jane@x.com", "password": "rightpass" }))
        );
        assert_eq!(f.storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));

        f.transport.respond(200, "[]");
        f.store.api().fetch_projects().await.unwrap();
        assert_eq!(
            f.transport.last_request().unwrap().authorization.as_deref(),
            Some("Bearer tok1")
        );
    }

    #[tokio::test]
    async fn test_login_without_token_fails() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(200, r#"{"user":{"_id":"u1"}}"#);

        let err = f.store.login("jane@x.com", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::Authentication(LOGIN_FAILED.into()));
        assert!(!f.store.is_authenticated());
        assert!(!f.has_credential());
    }

    #[tokio::test]
    async fn test_login_without_user_fails() {
        let f = fixture();
        f.store.restore_session().await;

        for body in [r#"{"token":"tok1"}"#, r#"{"token":"tok1","user":{}}"#, r#"{"token":"tok1","user":null}"#] {
            f.transport.respond(200, body);
            let err = f.store.login("jane@x.com", "pw").await.unwrap_err();
            assert_eq!(err, AuthError::Authentication(LOGIN_FAILED.into()), "{body}");
            assert_eq!(f.store.state(), SessionState::Anonymous);
            assert!(f.storage.is_empty());
            assert!(!f.has_credential());
        }
    }

    #[tokio::test]
    async fn test_login_survives_storage_failure() {
        let transport = MockTransport::new();
        let gateway = RequestGateway::new(transport.clone(), "http://api.test");
        let store = SessionStore::new(ApiClient::new(Arc::new(gateway)), Arc::new(ReadOnlyStorage));
        store.restore_session().await;
        transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1"}}"#);

        store.login("jane@x.com", "pw").await.unwrap();
        assert!(store.is_authenticated());
    }

    // --- Logout / profile ---

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let f = fixture();
        f.store.restore_session().await;
        f.store.logout();
        f.store.logout();
        assert_eq!(f.store.state(), SessionState::Anonymous);
        assert!(f.storage.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let f = fixture();
        let mut rx = f.store.subscribe();
        assert!(rx.borrow_and_update().is_loading());

        f.store.restore_session().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);

        f.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1"}}"#);
        f.store.login("jane@x.com", "pw").await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        f.store.logout();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let f = fixture();
        f.store.restore_session().await;
        let result = f.store.update_profile(ProfileUpdate::default()).await;
        assert_eq!(result.unwrap_err(), AuthError::NotAuthenticated);
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_replaces_user() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1","bio":"old"}}"#);
        f.store.login("jane@x.com", "pw").await.unwrap();

        f.transport.respond(200, r#"{"user":{"_id":"u1","bio":"new"}}"#);
        let update = ProfileUpdate {
            bio: Some("new".into()),
            ..Default::default()
        };
        f.store.update_profile(update).await.unwrap();

        assert_eq!(f.store.user().unwrap().bio, "new");
        assert!(f.storage.get(USER_KEY).unwrap().unwrap().contains("\"new\""));
    }

    #[tokio::test]
    async fn test_update_profile_error_propagates() {
        let f = fixture();
        f.store.restore_session().await;
        f.transport.respond(200, r#"{"token":"tok1","user":{"_id":"u1","bio":"old"}}"#);
        f.store.login("jane@x.com", "pw").await.unwrap();

        f.transport.respond(400, r#"{"message":"Email already in use"}"#);
        let err = f.store.update_profile(ProfileUpdate::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already in use");
        assert_eq!(f.store.user().unwrap().bio, "old");
    }
}
