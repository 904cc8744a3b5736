//! Static registry of backend resources.
//!
//! Each [`Resource`] maps to exactly one [`ResourceDescriptor`] holding its
//! collection path and the operations the backend accepts for it. The table is
//! fixed at compile time; nothing mutates it at runtime.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;

/// An operation the façade can perform against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Patch,
    Delete,
}

impl Operation {
    /// HTTP method used for this operation.
    pub fn method(self) -> Method {
        match self {
            Self::List | Self::Get => Method::GET,
            Self::Create => Method::POST,
            Self::Update => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// Whether the operation addresses a single item (`<collection><id>/`).
    pub fn targets_item(self) -> bool {
        matches!(self, Self::Get | Self::Update | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named backend entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Course,
    Cohort,
    Team,
    Invitation,
    StudentProfile,
    StudentGoal,
    MentorProfile,
    MentorSession,
    Message,
    Analytics,
}

/// Path template and supported operations of a [`Resource`].
#[derive(Debug)]
pub struct ResourceDescriptor {
    pub resource: Resource,
    /// Logical name used in error context and on the command line.
    pub name: &'static str,
    /// Collection path, always with leading and trailing slash.
    pub path: &'static str,
    pub operations: &'static [Operation],
}

const CRUD: &[Operation] = &[
    Operation::List,
    Operation::Get,
    Operation::Create,
    Operation::Update,
    Operation::Patch,
    Operation::Delete,
];

static DESCRIPTORS: [ResourceDescriptor; 10] = [
    ResourceDescriptor {
        resource: Resource::Course,
        name: "course",
        path: "/api/admin/courses/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::Cohort,
        name: "cohort",
        path: "/api/admin/cohorts/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::Team,
        name: "team",
        path: "/api/admin/teams/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::Invitation,
        name: "invitation",
        path: "/api/admin/invitations/",
        operations: &[
            Operation::List,
            Operation::Get,
            Operation::Create,
            Operation::Delete,
        ],
    },
    ResourceDescriptor {
        resource: Resource::StudentProfile,
        name: "studentProfile",
        path: "/student-flow/api/profile/",
        operations: &[
            Operation::List,
            Operation::Get,
            Operation::Create,
            Operation::Update,
            Operation::Patch,
        ],
    },
    ResourceDescriptor {
        resource: Resource::StudentGoal,
        name: "studentGoal",
        path: "/student-flow/api/goals/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::MentorProfile,
        name: "mentorProfile",
        path: "/mentor/api/mentor-profiles/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::MentorSession,
        name: "mentorSession",
        path: "/mentor/api/sessions/",
        operations: CRUD,
    },
    ResourceDescriptor {
        resource: Resource::Message,
        name: "message",
        path: "/api/messages/",
        operations: &[
            Operation::List,
            Operation::Get,
            Operation::Create,
            Operation::Delete,
        ],
    },
    ResourceDescriptor {
        resource: Resource::Analytics,
        name: "analytics",
        path: "/api/admin/analytics/",
        operations: &[Operation::List, Operation::Get],
    },
];

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Course,
        Resource::Cohort,
        Resource::Team,
        Resource::Invitation,
        Resource::StudentProfile,
        Resource::StudentGoal,
        Resource::MentorProfile,
        Resource::MentorSession,
        Resource::Message,
        Resource::Analytics,
    ];

    pub fn descriptor(self) -> &'static ResourceDescriptor {
        // DESCRIPTORS is declared in enum order
        &DESCRIPTORS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.descriptor().operations.contains(&operation)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a resource name is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    /// Accepts the logical name in any casing, with or without `-`/`_`
    /// separators (`mentorProfile`, `mentor-profile`, `MENTOR_PROFILE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Resource::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

/// Error returned when an item id cannot be used as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid item id: {0:?}")]
pub struct InvalidItemId(pub String);

impl ResourceDescriptor {
    /// Collection path used by `list` and `create`.
    pub fn collection_path(&self) -> &'static str {
        self.path
    }

    /// Item path used by `get`, `update`, `patch` and `delete`.
    ///
    /// Surrounding slashes are dropped. The rest must be one path segment:
    /// no separators, query or fragment markers, escapes, whitespace or
    /// dot segments.
    pub fn item_path(&self, id: &str) -> Result<String, InvalidItemId> {
        let segment = id.trim_matches('/');
        let forbidden = |c: char| {
            matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
        };
        if segment.is_empty() || segment.contains("..") || segment == "." || segment.contains(forbidden)
        {
            return Err(InvalidItemId(id.to_string()));
        }
        Ok(format!("{}{}/", self.path, segment))
    }
}
