//! Best-effort dashboard counts.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::GatewayError;
use crate::facade::Gateway;
use crate::resources::Resource;

/// Entity counts shown on the admin overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total_courses: usize,
    pub total_cohorts: usize,
    pub total_teams: usize,
}

/// Aggregation policy: a successful list counts its items, a failed one
/// counts as zero.
pub fn count_or_zero(outcome: &Result<Vec<Value>, GatewayError>) -> usize {
    match outcome {
        Ok(items) => items.len(),
        Err(e) => {
            warn!(resource = e.resource, kind = %e.kind, "Statistics degraded to zero: {}", e.message);
            0
        }
    }
}

impl DashboardStatistics {
    /// Records the count for `resource`; other resources are ignored.
    pub fn record(&mut self, resource: Resource, count: usize) {
        match resource {
            Resource::Course => self.total_courses = count,
            Resource::Cohort => self.total_cohorts = count,
            Resource::Team => self.total_teams = count,
            _ => {}
        }
    }
}

impl Gateway {
    /// Lists courses, cohorts and teams concurrently and counts them.
    ///
    /// Never fails; see [`count_or_zero`].
    pub async fn statistics(&self) -> DashboardStatistics {
        let (courses, cohorts, teams) = tokio::join!(
            self.list(Resource::Course),
            self.list(Resource::Cohort),
            self.list(Resource::Team),
        );

        DashboardStatistics {
            total_courses: count_or_zero(&courses),
            total_cohorts: count_or_zero(&cohorts),
            total_teams: count_or_zero(&teams),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resources::Operation;
    use serde_json::json;

    #[test]
    fn test_count_or_zero() {
        assert_eq!(count_or_zero(&Ok(vec![json!({"id": 1}), json!({"id": 2})])), 2);
        assert_eq!(count_or_zero(&Ok(vec![])), 0);

        let err = GatewayError::new(ErrorKind::Server, "boom", "course", Operation::List);
        assert_eq!(count_or_zero(&Err(err)), 0);
    }

    #[test]
    fn test_record_ignores_other_resources() {
        let mut stats = DashboardStatistics::default();
        stats.record(Resource::Course, 4);
        stats.record(Resource::Team, 2);
        stats.record(Resource::Invitation, 9);
        assert_eq!((stats.total_courses, stats.total_cohorts, stats.total_teams), (4, 0, 2));
    }

    #[test]
    fn test_serializes_camel_case() {
        let stats = DashboardStatistics {
            total_courses: 1,
            total_cohorts: 2,
            total_teams: 3,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"totalCourses": 1, "totalCohorts": 2, "totalTeams": 3})
        );
    }
}
