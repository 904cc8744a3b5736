//! Authenticated session state.
//!
//! A [`SessionStore`] owns at most one [`AuthSession`]. The only transitions
//! are *establish* (replace whatever is there with a new session) and
//! *teardown* (replace it with nothing); both swap the whole value through an
//! `ArcSwapOption`, so readers never observe a half-written session.
//!
//! Teardown triggered by an authorization failure goes through
//! [`SessionStore::invalidate`], which succeeds at most once per established
//! session no matter how many failed responses race to call it.
//!
//! Readers are lock-free. Writers (establish, clear, invalidate) serialize on
//! a mutex so the epoch check and the teardown happen as one step.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::storage::{MemorySessionStorage, SessionStorage, StorageError};

/// Platform role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Mentor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
            Self::Mentor => "mentor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "student" => Ok(Self::Student),
            "mentor" => Ok(Self::Mentor),
            other => Err(format!("Unknown role: {other}. Valid roles: admin, student, mentor")),
        }
    }
}

/// Identifying attributes of the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    /// Any further attributes the backend sent along.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Principal {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
            role,
            extra: Map::new(),
        }
    }

    /// Name when known, email otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// How the credential is rendered in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CredentialScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: Token <token>`
    Token,
}

impl CredentialScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::Token => "Token",
        }
    }
}

impl FromStr for CredentialScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "token" => Ok(Self::Token),
            other => Err(format!("Unknown auth scheme: {other}. Valid schemes: Bearer, Token")),
        }
    }
}

/// A credential plus the principal it authenticates.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(default)]
    pub scheme: CredentialScheme,
    pub principal: Principal,
    /// Sequence number assigned when the session was established.
    #[serde(skip)]
    pub epoch: u64,
}

impl AuthSession {
    pub fn new(token: impl Into<String>, scheme: CredentialScheme, principal: Principal) -> Self {
        Self {
            token: token.into(),
            scheme,
            principal,
            epoch: 0,
        }
    }

    /// `Authorization` header value for this session.
    pub fn authorization_value(&self) -> Result<HeaderValue, reqwest::header::InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("{} {}", self.scheme.as_str(), self.token))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Shortened token for display.
    pub fn token_preview(&self) -> String {
        let token = &self.token;
        if token.len() > 20 && token.is_ascii() {
            format!("{}...{}", &token[..8], &token[token.len() - 8..])
        } else {
            "********".to_string()
        }
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("principal", &self.principal)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Single-writer owner of the client's [`AuthSession`].
pub struct SessionStore {
    current: ArcSwapOption<AuthSession>,
    /// Set once the current session has been torn down by an authorization
    /// failure; cleared again when a new session is established.
    invalidated: AtomicBool,
    next_epoch: AtomicU64,
    storage: Arc<dyn SessionStorage>,
    writer: Mutex<()>,
}

impl SessionStore {
    /// Creates an empty store backed by `storage`. Nothing is loaded.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            invalidated: AtomicBool::new(false),
            next_epoch: AtomicU64::new(0),
            storage,
            writer: Mutex::new(()),
        }
    }

    /// Creates an empty store that persists nothing beyond the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStorage::default()))
    }

    /// Creates a store and loads the persisted session, if any.
    ///
    /// An unreadable record is logged and treated as "not logged in".
    pub fn restore(storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self::new(storage);
        match store.storage.load() {
            Ok(Some(mut session)) => {
                session.epoch = store.bump_epoch();
                debug!(email = %session.principal.email, "Restored persisted session");
                store.current.store(Some(Arc::new(session)));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable session record"),
        }
        store
    }

    fn bump_epoch(&self) -> u64 {
        self.next_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Arc<AuthSession>> {
        self.current.load_full()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replaces the active session with `session`.
    ///
    /// The record is persisted first; if that fails the store is left as it was.
    pub fn establish(&self, mut session: AuthSession) -> Result<Arc<AuthSession>, StorageError> {
        let _writer = self.writer.lock();
        self.storage.save(&session)?;
        session.epoch = self.bump_epoch();
        let session = Arc::new(session);
        self.current.store(Some(Arc::clone(&session)));
        self.invalidated.store(false, Ordering::SeqCst);
        info!(
            email = %session.principal.email,
            role = %session.principal.role,
            epoch = session.epoch,
            "Session established"
        );
        Ok(session)
    }

    /// Removes the active session (explicit logout).
    ///
    /// Returns the session that was active. Failing to delete the persisted
    /// record is logged, the in-memory session is cleared regardless.
    pub fn clear(&self) -> Option<Arc<AuthSession>> {
        let _writer = self.writer.lock();
        let previous = self.current.swap(None);
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
        if let Some(session) = &previous {
            info!(email = %session.principal.email, "Session cleared");
        }
        previous
    }

    /// Tears the session down after an authorization failure.
    ///
    /// `stamped_epoch` is the epoch of the session the failed request was sent
    /// with (`None` for unauthenticated requests). A response to a request made
    /// before the current session existed is ignored. Returns `true` for the
    /// single caller that performed the teardown.
    pub fn invalidate(&self, stamped_epoch: Option<u64>) -> bool {
        let _writer = self.writer.lock();
        if let Some(current) = self.current.load_full() {
            if stamped_epoch != Some(current.epoch) {
                debug!(
                    current = current.epoch,
                    stamped = ?stamped_epoch,
                    "Ignoring authorization failure from a request that predates the current session"
                );
                return false;
            }
        }

        if self.invalidated.swap(true, Ordering::SeqCst) {
            return false;
        }

        let previous = self.current.swap(None);
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
        info!(
            email = previous.as_ref().map(|s| s.principal.email.as_str()).unwrap_or("-"),
            "Session invalidated by authorization failure"
        );
        true
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .field("invalidated", &self.is_invalidated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(email: &str) -> AuthSession {
        AuthSession::new("tok-123", CredentialScheme::Bearer, Principal::new(email, Role::Admin))
    }

    #[test]
    fn test_establish_and_clear() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());

        let s = store.establish(session("a@example.com")).unwrap();
        assert_eq!(s.epoch, 1);
        assert!(store.is_authenticated());

        let cleared = store.clear().unwrap();
        assert_eq!(cleared.principal.email, "a@example.com");
        assert!(store.current().is_none());
    }

    #[test]
    fn test_establish_replaces_wholesale() {
        let store = SessionStore::in_memory();
        store.establish(session("a@example.com")).unwrap();
        let second = store.establish(session("b@example.com")).unwrap();
        assert_eq!(second.epoch, 2);
        assert_eq!(store.current().unwrap().principal.email, "b@example.com");
    }

    #[test]
    fn test_invalidate_only_once() {
        let store = SessionStore::in_memory();
        let s = store.establish(session("a@example.com")).unwrap();

        assert!(store.invalidate(Some(s.epoch)));
        assert!(!store.invalidate(Some(s.epoch)));
        assert!(!store.invalidate(None));
        assert!(store.current().is_none());
        assert!(store.is_invalidated());
    }

    #[test]
    fn test_invalidate_ignores_stale_epoch() {
        let store = SessionStore::in_memory();
        let old = store.establish(session("a@example.com")).unwrap();
        store.establish(session("b@example.com")).unwrap();

        assert!(!store.invalidate(Some(old.epoch)));
        assert!(!store.invalidate(None));
        assert_eq!(store.current().unwrap().principal.email, "b@example.com");
    }

    #[test]
    fn test_invalidate_without_session() {
        let store = SessionStore::in_memory();
        assert!(store.invalidate(None));
        assert!(!store.invalidate(None));
    }

    #[test]
    fn test_new_session_rearms_invalidation() {
        let store = SessionStore::in_memory();
        let first = store.establish(session("a@example.com")).unwrap();
        assert!(store.invalidate(Some(first.epoch)));

        let second = store.establish(session("a@example.com")).unwrap();
        assert!(!store.is_invalidated());
        assert!(store.invalidate(Some(second.epoch)));
    }

    #[test]
    fn test_stale_invalidate_racing_establish_never_drops_new_session() {
        use std::sync::Barrier;

        let store = SessionStore::in_memory();
        for _ in 0..500 {
            let old = store.establish(session("old@example.com")).unwrap();
            let barrier = Barrier::new(2);

            let fresh = std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    store.invalidate(Some(old.epoch));
                });
                barrier.wait();
                store.establish(session("new@example.com")).unwrap()
            });

            let current = store.current().expect("newer session must survive");
            assert_eq!(current.epoch, fresh.epoch);
            assert!(!store.is_invalidated());
        }
    }

    #[test]
    fn test_restore_from_storage() {
        let storage = Arc::new(MemorySessionStorage::default());
        storage.save(&session("persisted@example.com")).unwrap();

        let store = SessionStore::restore(storage);
        let current = store.current().unwrap();
        assert_eq!(current.principal.email, "persisted@example.com");
        assert_eq!(current.epoch, 1);
    }

    #[test]
    fn test_authorization_value() {
        let s = session("a@example.com");
        let value = s.authorization_value().unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer tok-123");
        assert!(value.is_sensitive());

        let s = AuthSession::new("abc", CredentialScheme::Token, Principal::new("x@y", Role::Mentor));
        assert_eq!(s.authorization_value().unwrap().to_str().unwrap(), "Token abc");

        let bad = AuthSession::new("line\nbreak", CredentialScheme::Bearer, Principal::new("x@y", Role::Mentor));
        assert!(bad.authorization_value().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let s = session("a@example.com");
        assert!(!format!("{s:?}").contains("tok-123"));
    }

    #[test]
    fn test_principal_deserialize_keeps_extra() {
        let p: Principal = serde_json::from_value(serde_json::json!({
            "id": 7,
            "email": "m@example.com",
            "name": "Mira",
            "role": "mentor",
            "avatar": "https://img"
        }))
        .unwrap();
        assert_eq!(p.role, Role::Mentor);
        assert_eq!(p.display_name(), "Mira");
        assert_eq!(p.extra.get("avatar").unwrap(), "https://img");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("instructor".parse::<Role>().is_err());
    }
}
