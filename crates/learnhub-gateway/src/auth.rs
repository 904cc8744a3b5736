//! Login and logout.
//!
//! Both login flows post to the backend and, on success, establish a new
//! [`AuthSession`] from the returned `{ "token", "user" }` pair. A 401 from a
//! login endpoint is reported to the caller as an authorization failure but
//! does not trigger the session teardown.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::envelope::RequestEnvelope;
use crate::error::{ErrorKind, GatewayError};
use crate::facade::{Gateway, SessionPolicy, decode};
use crate::resources::Operation;
use crate::session::{AuthSession, Principal, Role};

pub const GOOGLE_AUTH_PATH: &str = "/api/auth/google/enhanced/";
pub const DEV_BYPASS_PATH: &str = "/api/auth/dev-bypass/";

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "access", alias = "access_token", alias = "key")]
    pub token: String,
    pub user: Principal,
}

impl Gateway {
    /// Exchanges a Google ID token for a platform session.
    ///
    /// `role` is only consulted by the backend when the account does not exist
    /// yet.
    pub async fn login_with_google(
        &self,
        id_token: &str,
        role: Option<Role>,
    ) -> Result<Arc<AuthSession>, GatewayError> {
        let mut body = json!({ "token": id_token });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        self.login(GOOGLE_AUTH_PATH, "googleAuth", body).await
    }

    /// Development-only login that skips the identity provider.
    pub async fn login_dev_bypass(
        &self,
        email: &str,
        role: Role,
    ) -> Result<Arc<AuthSession>, GatewayError> {
        let body = json!({ "email": email, "role": role });
        self.login(DEV_BYPASS_PATH, "devBypass", body).await
    }

    async fn login(
        &self,
        path: &str,
        endpoint: &'static str,
        body: serde_json::Value,
    ) -> Result<Arc<AuthSession>, GatewayError> {
        let envelope = RequestEnvelope::new(Operation::Create.method(), path).with_body(body);
        let value = self
            .execute(envelope, endpoint, Operation::Create, SessionPolicy::Ignore)
            .await?;
        let response: AuthResponse = decode(value, endpoint, Operation::Create)?;

        let session = AuthSession::new(response.token, self.scheme, response.user);
        if let Err(e) = session.authorization_value() {
            return Err(GatewayError::new(
                ErrorKind::Unknown,
                format!("backend returned a token that cannot be sent as a header: {e}"),
                endpoint,
                Operation::Create,
            ));
        }
        self.session().establish(session).map_err(|e| {
            GatewayError::new(
                ErrorKind::Unknown,
                format!("failed to persist session: {e}"),
                endpoint,
                Operation::Create,
            )
        })
    }

    /// Ends the current session without navigating anywhere.
    ///
    /// Returns `true` if a session was active.
    pub fn logout(&self) -> bool {
        let previous = self.session().clear();
        if previous.is_some() {
            info!("Logged out");
        }
        previous.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_aliases() {
        let r: AuthResponse = serde_json::from_value(json!({
            "access": "jwt",
            "user": {"email": "a@example.com", "role": "admin"}
        }))
        .unwrap();
        assert_eq!(r.token, "jwt");
        assert_eq!(r.user.role, Role::Admin);

        let r: AuthResponse = serde_json::from_value(json!({
            "token": "tok",
            "user": {"id": 3, "email": "s@example.com", "role": "student"}
        }))
        .unwrap();
        assert_eq!(r.token, "tok");
    }
}
