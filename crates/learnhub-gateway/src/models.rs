//! Typed views of backend entities.
//!
//! The backend's shape is trusted, so every model only names the fields the
//! dashboards read and keeps everything else in `extra`. Serializing a decoded
//! model gives back the payload the backend sent.
//!
//! Named fields are `Option<Option<T>>`: the outer `None` is an absent key,
//! `Some(None)` an explicit `null`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::resources::Resource;

/// A model bound to one backend resource.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const RESOURCE: Resource;
}

macro_rules! entity {
    ($(#[$meta:meta])* $name:ident => $resource:ident { $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            #[serde(
                default,
                skip_serializing_if = "Option::is_none",
                with = "::serde_with::rust::double_option"
            )]
            pub id: Option<Option<Value>>,
            $(
                $(#[$fmeta])*
                #[serde(
                    default,
                    skip_serializing_if = "Option::is_none",
                    with = "::serde_with::rust::double_option"
                )]
                pub $field: Option<Option<$ty>>,
            )*
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }

        impl Entity for $name {
            const RESOURCE: Resource = Resource::$resource;
        }

        impl $name {
            /// Backend identifier, when present and not `null`.
            pub fn key(&self) -> Option<&Value> {
                self.id.as_ref().and_then(Option::as_ref)
            }
        }
    };
}

entity!(
    /// A course offered on the platform.
    Course => Course {
        name: String,
        description: String,
        duration_weeks: u32,
        is_active: bool,
    }
);

entity!(
    /// A time-boxed group of students taking a course together.
    Cohort => Cohort {
        name: String,
        course: Value,
        start_date: String,
        end_date: String,
    }
);

entity!(
    Team => Team {
        name: String,
        cohort: Value,
        mentor: Value,
        members: Vec<Value>,
    }
);

entity!(
    /// Pending or accepted invitation sent by an admin.
    Invitation => Invitation {
        email: String,
        role: String,
        status: String,
        cohort: Value,
    }
);

entity!(
    StudentProfile => StudentProfile {
        full_name: String,
        email: String,
        bio: String,
        skills: Vec<String>,
    }
);

entity!(
    StudentGoal => StudentGoal {
        title: String,
        description: String,
        target_date: String,
        completed: bool,
    }
);

entity!(
    MentorProfile => MentorProfile {
        full_name: String,
        email: String,
        expertise: Vec<String>,
        bio: String,
    }
);

entity!(
    /// A scheduled mentoring session.
    MentorSession => MentorSession {
        title: String,
        scheduled_at: String,
        duration_minutes: u32,
        student: Value,
        status: String,
    }
);

entity!(
    Message => Message {
        sender: Value,
        recipient: Value,
        subject: String,
        body: String,
        sent_at: String,
    }
);

entity!(
    /// Aggregated platform metrics computed by the backend.
    AnalyticsReport => Analytics {
        name: String,
        period: String,
        metrics: Value,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decoded_payload_round_trips_unchanged() {
        let payload = json!({
            "id": 1,
            "name": "X",
            "description": "Intro",
            "instructor": {"id": 4, "name": "Ada"},
            "tags": ["rust"]
        });
        let course: Course = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(course.name, Some(Some("X".to_string())));
        assert!(course.extra.contains_key("instructor"));
        assert_eq!(serde_json::to_value(&course).unwrap(), payload);
    }

    #[test]
    fn test_missing_fields_default() {
        let goal: StudentGoal = serde_json::from_value(json!({"title": "Ship it"})).unwrap();
        assert_eq!(goal.id, None);
        assert_eq!(goal.key(), None);
        assert_eq!(goal.completed, None);
        assert_eq!(serde_json::to_value(&goal).unwrap(), json!({"title": "Ship it"}));
    }

    #[test]
    fn test_explicit_null_survives_round_trip() {
        let payload = json!({"id": 1, "name": "X", "description": null});
        let course: Course = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(course.description, Some(None));
        assert_eq!(course.duration_weeks, None);
        assert_eq!(course.key(), Some(&json!(1)));
        assert_eq!(serde_json::to_value(&course).unwrap(), payload);

        let cleared = Team {
            mentor: Some(None),
            ..Team::default()
        };
        assert_eq!(serde_json::to_value(&cleared).unwrap(), json!({"mentor": null}));
    }

    #[test]
    fn test_entity_resources() {
        assert_eq!(Course::RESOURCE, Resource::Course);
        assert_eq!(MentorProfile::RESOURCE, Resource::MentorProfile);
        assert_eq!(AnalyticsReport::RESOURCE, Resource::Analytics);
    }
}
