#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use learnhub_gateway::{
    AuthSession, CredentialScheme, Gateway, GatewayConfig, Navigator, Principal, Role,
    SessionStore,
};

/// Counts how often the gateway asked to navigate to login.
#[derive(Default)]
pub struct CountingNavigator(AtomicUsize);

impl CountingNavigator {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Navigator for CountingNavigator {
    fn navigate_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub gateway: Gateway,
    pub store: Arc<SessionStore>,
    pub navigator: Arc<CountingNavigator>,
}

pub fn http_harness(base_url: &str) -> Harness {
    http_harness_with(GatewayConfig::new(base_url))
}

pub fn http_harness_with(config: GatewayConfig) -> Harness {
    let store = Arc::new(SessionStore::in_memory());
    let navigator = Arc::new(CountingNavigator::default());
    let gateway = Gateway::connect(&config, store.clone(), navigator.clone())
        .expect("gateway should build");
    Harness {
        gateway,
        store,
        navigator,
    }
}

pub fn login(store: &SessionStore, token: &str, role: Role) -> Arc<AuthSession> {
    store
        .establish(AuthSession::new(
            token,
            CredentialScheme::Bearer,
            Principal::new(format!("{role}@example.com"), role),
        ))
        .expect("in-memory session should persist")
}
