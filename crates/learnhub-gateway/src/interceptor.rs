//! Credential attachment and the single reaction to authorization loss.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::envelope::RequestEnvelope;
use crate::error::TransportError;
use crate::session::SessionStore;

/// Receives the "go to login" notification after the session is torn down.
///
/// Implementations decide what navigation means for their front-end (route
/// change, terminal notice, ...). Called at most once per invalidated session.
pub trait Navigator: Send + Sync {
    fn navigate_to_login(&self);
}

/// Navigator that does nothing, for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate_to_login(&self) {}
}

/// Attaches the session credential to requests and watches responses for 401.
#[derive(Clone)]
pub struct SessionInterceptor {
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionInterceptor {
    pub fn new(store: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Adds `Authorization` for the current session, if there is one.
    ///
    /// The header is inserted, not appended, so attaching twice leaves a single
    /// credential. Without a session the envelope is returned untouched.
    ///
    /// The session epoch is stamped even when the token cannot be encoded, so
    /// a 401 for that request still tears the session down.
    pub fn attach(&self, mut envelope: RequestEnvelope) -> RequestEnvelope {
        let Some(session) = self.store.current() else {
            return envelope;
        };

        envelope.session_epoch = Some(session.epoch);
        match session.authorization_value() {
            Ok(value) => {
                envelope.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => {
                warn!(error = %e, "Session token is not a valid header value; sending unauthenticated");
            }
        }
        envelope
    }

    /// Inspects a call outcome; on 401 tears the session down and navigates
    /// to login once. Never fails.
    pub fn observe<T>(&self, outcome: &Result<T, TransportError>, stamped_epoch: Option<u64>) {
        let Err(err) = outcome else {
            return;
        };
        if !err.is_unauthorized() {
            return;
        }

        if self.store.invalidate(stamped_epoch) {
            self.navigator.navigate_to_login();
        } else {
            debug!("Authorization failure after session was already invalidated");
        }
    }
}
