//! Uniform per-resource method surface.
//!
//! Every call follows the same path: build a [`RequestEnvelope`] from the
//! resource descriptor, let the [`SessionInterceptor`] attach the credential,
//! send it through the [`Transport`], let the interceptor observe the outcome,
//! and normalize any failure into a [`GatewayError`] tagged with the resource
//! and operation.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::config::{ConfigError, GatewayConfig};
use crate::envelope::RequestEnvelope;
use crate::error::{ErrorKind, GatewayError};
use crate::interceptor::{Navigator, SessionInterceptor};
use crate::models::{
    AnalyticsReport, Cohort, Course, Entity, Invitation, MentorProfile, MentorSession, Message,
    StudentGoal, StudentProfile, Team,
};
use crate::resources::{Operation, Resource};
use crate::session::{CredentialScheme, SessionStore};
use crate::transport::{HttpTransport, Transport};

pub const HEALTH_PATH: &str = "/api/hello/";

/// Whether a call's 401 should tear the session down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionPolicy {
    Watch,
    /// Used by the login operations: a rejected login is not a lost session.
    Ignore,
}

/// The resource gateway used by every dashboard.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    interceptor: SessionInterceptor,
    pub(crate) scheme: CredentialScheme,
}

impl Gateway {
    /// Builds a gateway talking HTTP to `config.base_url`.
    pub fn connect(
        config: &GatewayConfig,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        let mut gateway = Self::with_transport(Arc::new(transport), store, navigator);
        gateway.scheme = config.credential_scheme()?;
        Ok(gateway)
    }

    /// Builds a gateway over any transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        store: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            interceptor: SessionInterceptor::new(store, navigator),
            scheme: CredentialScheme::default(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.interceptor.store()
    }

    pub fn interceptor(&self) -> &SessionInterceptor {
        &self.interceptor
    }

    pub(crate) async fn execute(
        &self,
        envelope: RequestEnvelope,
        resource: &'static str,
        operation: Operation,
        policy: SessionPolicy,
    ) -> Result<Value, GatewayError> {
        let envelope = self.interceptor.attach(envelope);
        let stamped_epoch = envelope.session_epoch;

        let outcome = self.transport.send(&envelope).await;
        if policy == SessionPolicy::Watch {
            self.interceptor.observe(&outcome, stamped_epoch);
        }

        outcome.map_err(|e| {
            let err = GatewayError::from_transport(e, resource, operation);
            warn!(
                resource,
                operation = %operation,
                kind = %err.kind,
                status = ?err.status,
                "Gateway call failed: {}",
                err.message
            );
            err
        })
    }

    async fn call(
        &self,
        resource: Resource,
        operation: Operation,
        id: Option<String>,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<Value, GatewayError> {
        let descriptor = resource.descriptor();
        if !resource.supports(operation) {
            return Err(GatewayError::unsupported(descriptor.name, operation));
        }

        let path = match &id {
            Some(id) => descriptor.item_path(id).map_err(|e| {
                GatewayError::new(ErrorKind::Validation, e.to_string(), descriptor.name, operation)
            })?,
            None => descriptor.collection_path().to_string(),
        };
        let mut envelope = RequestEnvelope::new(operation.method(), path).with_query(query);
        if let Some(body) = body {
            envelope = envelope.with_body(body);
        }

        self.execute(envelope, descriptor.name, operation, SessionPolicy::Watch)
            .await
    }

    pub async fn list(&self, resource: Resource) -> Result<Vec<Value>, GatewayError> {
        self.list_filtered(resource, &[]).await
    }

    /// Lists a resource with query-string filters (e.g. `course=3`).
    pub async fn list_filtered(
        &self,
        resource: Resource,
        query: &[(String, String)],
    ) -> Result<Vec<Value>, GatewayError> {
        let value = self
            .call(resource, Operation::List, None, None, query)
            .await?;
        into_items(value).ok_or_else(|| {
            GatewayError::new(
                ErrorKind::Unknown,
                "expected a JSON array in list response",
                resource.name(),
                Operation::List,
            )
        })
    }

    pub async fn get(&self, resource: Resource, id: impl Display) -> Result<Value, GatewayError> {
        self.call(resource, Operation::Get, Some(id.to_string()), None, &[])
            .await
    }

    pub async fn create<P: Serialize + ?Sized>(
        &self,
        resource: Resource,
        payload: &P,
    ) -> Result<Value, GatewayError> {
        let body = to_body(payload, resource, Operation::Create)?;
        self.call(resource, Operation::Create, None, Some(body), &[])
            .await
    }

    pub async fn update<P: Serialize + ?Sized>(
        &self,
        resource: Resource,
        id: impl Display,
        payload: &P,
    ) -> Result<Value, GatewayError> {
        let body = to_body(payload, resource, Operation::Update)?;
        self.call(resource, Operation::Update, Some(id.to_string()), Some(body), &[])
            .await
    }

    pub async fn patch<P: Serialize + ?Sized>(
        &self,
        resource: Resource,
        id: impl Display,
        payload: &P,
    ) -> Result<Value, GatewayError> {
        let body = to_body(payload, resource, Operation::Patch)?;
        self.call(resource, Operation::Patch, Some(id.to_string()), Some(body), &[])
            .await
    }

    pub async fn delete(&self, resource: Resource, id: impl Display) -> Result<(), GatewayError> {
        self.call(resource, Operation::Delete, Some(id.to_string()), None, &[])
            .await
            .map(|_| ())
    }

    /// Calls the backend's health endpoint.
    pub async fn health_check(&self) -> Result<Value, GatewayError> {
        let envelope = RequestEnvelope::new(Operation::Get.method(), HEALTH_PATH);
        self.execute(envelope, "health", Operation::Get, SessionPolicy::Watch)
            .await
    }

    /// Typed access to the resource bound to `E`.
    pub fn resource<E: Entity>(&self) -> Resources<'_, E> {
        Resources {
            gateway: self,
            _entity: PhantomData,
        }
    }

    pub fn courses(&self) -> Resources<'_, Course> {
        self.resource()
    }

    pub fn cohorts(&self) -> Resources<'_, Cohort> {
        self.resource()
    }

    pub fn teams(&self) -> Resources<'_, Team> {
        self.resource()
    }

    pub fn invitations(&self) -> Resources<'_, Invitation> {
        self.resource()
    }

    pub fn student_profiles(&self) -> Resources<'_, StudentProfile> {
        self.resource()
    }

    pub fn student_goals(&self) -> Resources<'_, StudentGoal> {
        self.resource()
    }

    pub fn mentor_profiles(&self) -> Resources<'_, MentorProfile> {
        self.resource()
    }

    pub fn mentor_sessions(&self) -> Resources<'_, MentorSession> {
        self.resource()
    }

    pub fn messages(&self) -> Resources<'_, Message> {
        self.resource()
    }

    pub fn analytics(&self) -> Resources<'_, AnalyticsReport> {
        self.resource()
    }
}

/// Typed wrapper over the gateway's calls for one [`Entity`].
pub struct Resources<'g, E> {
    gateway: &'g Gateway,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Resources<'_, E> {
    pub async fn list(&self) -> Result<Vec<E>, GatewayError> {
        self.gateway
            .list(E::RESOURCE)
            .await?
            .into_iter()
            .map(|item| decode(item, E::RESOURCE.name(), Operation::List))
            .collect()
    }

    pub async fn list_filtered(&self, query: &[(String, String)]) -> Result<Vec<E>, GatewayError> {
        self.gateway
            .list_filtered(E::RESOURCE, query)
            .await?
            .into_iter()
            .map(|item| decode(item, E::RESOURCE.name(), Operation::List))
            .collect()
    }

    pub async fn get(&self, id: impl Display) -> Result<E, GatewayError> {
        let value = self.gateway.get(E::RESOURCE, id).await?;
        decode(value, E::RESOURCE.name(), Operation::Get)
    }

    pub async fn create(&self, entity: &E) -> Result<E, GatewayError> {
        let value = self.gateway.create(E::RESOURCE, entity).await?;
        decode(value, E::RESOURCE.name(), Operation::Create)
    }

    pub async fn update(&self, id: impl Display, entity: &E) -> Result<E, GatewayError> {
        let value = self.gateway.update(E::RESOURCE, id, entity).await?;
        decode(value, E::RESOURCE.name(), Operation::Update)
    }

    /// Partial update; `changes` holds only the fields to modify.
    pub async fn patch(&self, id: impl Display, changes: &Value) -> Result<E, GatewayError> {
        let value = self.gateway.patch(E::RESOURCE, id, changes).await?;
        decode(value, E::RESOURCE.name(), Operation::Patch)
    }

    pub async fn delete(&self, id: impl Display) -> Result<(), GatewayError> {
        self.gateway.delete(E::RESOURCE, id).await
    }
}

/// Accepts a bare array, a paginated `{"results": [...]}` object, or an empty
/// body.
fn into_items(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Null => Some(Vec::new()),
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn to_body<P: Serialize + ?Sized>(
    payload: &P,
    resource: Resource,
    operation: Operation,
) -> Result<Value, GatewayError> {
    serde_json::to_value(payload).map_err(|e| {
        GatewayError::new(
            ErrorKind::Unknown,
            format!("payload could not be serialized: {e}"),
            resource.name(),
            operation,
        )
    })
}

pub(crate) fn decode<T: DeserializeOwned>(
    value: Value,
    resource: &'static str,
    operation: Operation,
) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| {
        GatewayError::new(
            ErrorKind::Unknown,
            format!("unexpected response shape: {e}"),
            resource,
            operation,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_items_shapes() {
        assert_eq!(into_items(json!([1, 2])), Some(vec![json!(1), json!(2)]));
        assert_eq!(into_items(Value::Null), Some(vec![]));
        assert_eq!(
            into_items(json!({"count": 1, "results": [{"id": 1}]})),
            Some(vec![json!({"id": 1})])
        );
        assert_eq!(into_items(json!({"id": 1})), None);
        assert_eq!(into_items(json!("nope")), None);
    }

    #[test]
    fn test_decode_failure_is_unknown() {
        let err = decode::<Course>(json!([1, 2, 3]), "course", Operation::Get).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert_eq!(err.resource, "course");
    }
}
