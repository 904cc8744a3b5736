//! Per-role dashboard view state.
//!
//! A [`DashboardViewState`] is owned by one dashboard screen. It is filled by
//! gateway calls, carries a loading flag and a transient status message, and
//! is reset when the user navigates away.

use std::collections::BTreeMap;

use futures_util::future::join_all;
use serde_json::Value;

use crate::error::GatewayError;
use crate::facade::Gateway;
use crate::resources::Resource;
use crate::session::Role;
use crate::statistics::{DashboardStatistics, count_or_zero};

/// Resources a role's dashboard loads on entry.
pub fn resources_for(role: Role) -> &'static [Resource] {
    match role {
        Role::Admin => &[
            Resource::Course,
            Resource::Cohort,
            Resource::Team,
            Resource::Invitation,
            Resource::Analytics,
        ],
        Role::Student => &[
            Resource::StudentProfile,
            Resource::StudentGoal,
            Resource::MentorSession,
            Resource::Message,
        ],
        Role::Mentor => &[
            Resource::MentorProfile,
            Resource::MentorSession,
            Resource::Message,
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardViewState {
    pub role: Role,
    pub entities: BTreeMap<Resource, Vec<Value>>,
    /// Only populated for admins.
    pub statistics: Option<DashboardStatistics>,
    pub loading: bool,
    pub status: Option<StatusMessage>,
}

impl DashboardViewState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            entities: BTreeMap::new(),
            statistics: None,
            loading: false,
            status: None,
        }
    }

    /// Loaded items of `resource`; empty when not loaded.
    pub fn entities(&self, resource: Resource) -> &[Value] {
        self.entities.get(&resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Loads every resource of the role concurrently.
    ///
    /// Resources that fail keep whatever was loaded before; the first failure
    /// becomes the status message.
    pub async fn load(&mut self, gateway: &Gateway) {
        self.loading = true;
        self.status = None;

        let resources = resources_for(self.role);
        let outcomes = join_all(resources.iter().map(|r| gateway.list(*r))).await;

        let mut failures: Vec<GatewayError> = Vec::new();
        let mut loaded = 0usize;
        let mut statistics = DashboardStatistics::default();
        for (resource, outcome) in resources.iter().zip(outcomes) {
            statistics.record(*resource, count_or_zero(&outcome));
            match outcome {
                Ok(items) => {
                    loaded += items.len();
                    self.entities.insert(*resource, items);
                }
                Err(e) => failures.push(e),
            }
        }

        // Admin counts come from the lists just loaded.
        if self.role == Role::Admin {
            self.statistics = Some(statistics);
        }

        self.status = Some(match failures.first() {
            Some(first) if failures.len() == 1 => StatusMessage::error(first.to_string()),
            Some(first) => StatusMessage::error(format!(
                "{first} (and {} more failures)",
                failures.len() - 1
            )),
            None => StatusMessage::info(format!("Loaded {loaded} records")),
        });
        self.loading = false;
    }

    /// Records the outcome of a user action as the status message, returning
    /// the value on success.
    pub fn apply<T>(&mut self, outcome: Result<T, GatewayError>, success: &str) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.status = Some(StatusMessage::info(success));
                Some(value)
            }
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                None
            }
        }
    }

    /// Drops everything loaded; called when the screen is left.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.statistics = None;
        self.loading = false;
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resources::Operation;
    use serde_json::json;

    #[test]
    fn test_resources_for_roles() {
        assert!(resources_for(Role::Admin).contains(&Resource::Course));
        assert!(resources_for(Role::Student).contains(&Resource::StudentGoal));
        assert!(!resources_for(Role::Mentor).contains(&Resource::Course));
    }

    #[test]
    fn test_apply_sets_status() {
        let mut state = DashboardViewState::new(Role::Admin);
        let created = state.apply(Ok(json!({"id": 1})), "Course created");
        assert_eq!(created, Some(json!({"id": 1})));
        assert_eq!(state.status, Some(StatusMessage::info("Course created")));

        let err = GatewayError::new(ErrorKind::Validation, "name required", "course", Operation::Create);
        let none: Option<Value> = state.apply(Err(err), "Course created");
        assert!(none.is_none());
        assert_eq!(state.status.as_ref().unwrap().level, StatusLevel::Error);
        assert!(state.status.as_ref().unwrap().text.contains("name required"));
    }

    #[test]
    fn test_reset() {
        let mut state = DashboardViewState::new(Role::Mentor);
        state.entities.insert(Resource::Message, vec![json!({"id": 1})]);
        state.status = Some(StatusMessage::info("x"));
        state.reset();
        assert!(state.entities(Resource::Message).is_empty());
        assert!(state.status.is_none());
        assert!(!state.loading);
    }
}
