//! LearnHub resource gateway.
//!
//! One client that every dashboard (admin, student, mentor) uses to reach the
//! LearnHub REST backend. It is made of three parts:
//!
//! - [`Transport`]: performs the HTTP exchange and decodes JSON.
//! - [`SessionInterceptor`]: attaches the session credential to each request
//!   and tears the session down, once, when the backend answers 401.
//! - [`Gateway`]: one method per resource/operation pair, with failures
//!   normalized into [`GatewayError`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use learnhub_gateway::{Gateway, GatewayConfig, NoopNavigator, Resource, Role, SessionStore};
//!
//! let config = GatewayConfig::load(None)?;
//! let store = Arc::new(SessionStore::in_memory());
//! let gateway = Gateway::connect(&config, store, Arc::new(NoopNavigator))?;
//!
//! gateway.login_dev_bypass("admin@example.com", Role::Admin).await?;
//! let courses = gateway.list(Resource::Course).await?;
//! let stats = gateway.statistics().await;
//! ```

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod facade;
pub mod interceptor;
pub mod models;
pub mod resources;
pub mod session;
pub mod statistics;
pub mod storage;
pub mod transport;

pub use auth::AuthResponse;
pub use config::{ConfigError, GatewayConfig};
pub use dashboard::{DashboardViewState, StatusLevel, StatusMessage, resources_for};
pub use envelope::RequestEnvelope;
pub use error::{ErrorKind, GatewayError, TransportError};
pub use facade::{Gateway, Resources};
pub use interceptor::{Navigator, NoopNavigator, SessionInterceptor};
pub use models::*;
pub use resources::{InvalidItemId, Operation, Resource, ResourceDescriptor, UnknownResource};
pub use session::{AuthSession, CredentialScheme, Principal, Role, SessionStore};
pub use statistics::{DashboardStatistics, count_or_zero};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError};
pub use transport::{HttpTransport, Transport};
