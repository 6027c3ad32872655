//! User partitions and their groups.
//!
//! A partition splits the learners of a course into named groups; content blocks reference
//! `(partition id, group ids)` pairs in their access rules. Both types serialize to the
//! versioned layout stored alongside course content:
//!
//! ```text
//! group:     { "id", "name", "version": 1 }
//! partition: { "id", "name", "description", "scheme", "parameters", "groups", "active", "version": 3 }
//! ```
//!
//! Version 1 partitions predate schemes and are read as `random`.

use crate::constants::{GROUP_VERSION, PARTITION_VERSION};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A named bucket of learners inside a partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GroupRepr", into = "GroupRepr")]
pub struct Group {
    pub id: u32,
    pub name: String,
}

impl Group {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

#[derive(Serialize, Deserialize)]
struct GroupRepr {
    id: u32,
    name: String,
    version: u32,
}

impl TryFrom<GroupRepr> for Group {
    type Error = DomainError;

    fn try_from(repr: GroupRepr) -> Result<Self, Self::Error> {
        if repr.version != GROUP_VERSION {
            return Err(DomainError::InvalidPayload {
                message: format!("Group {} has unexpected version {}", repr.id, repr.version)
                    .into(),
                context: None,
            });
        }
        Ok(Self { id: repr.id, name: repr.name })
    }
}

impl From<Group> for GroupRepr {
    fn from(group: Group) -> Self {
        Self { id: group.id, name: group.name, version: GROUP_VERSION }
    }
}

/// The fixed set of partition schemes known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeId {
    Random,
    Cohort,
    EnrollmentTrack,
    ContentTypeGate,
}

impl SchemeId {
    pub const ALL: [Self; 4] =
        [Self::Random, Self::Cohort, Self::EnrollmentTrack, Self::ContentTypeGate];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Cohort => "cohort",
            Self::EnrollmentTrack => "enrollment_track",
            Self::ContentTypeGate => "content_type_gate",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|id| id.as_str() == s).ok_or_else(|| {
            DomainError::UnrecognizedScheme {
                message: format!("Unrecognized scheme '{s}'").into(),
                context: None,
            }
        })
    }
}

/// A named way to split course learners into groups.
///
/// Ids are unique per course. Inactive partitions are ignored by access checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartitionRepr", into = "PartitionRepr")]
pub struct UserPartition {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub groups: Vec<Group>,
    pub scheme: SchemeId,
    pub parameters: BTreeMap<String, String>,
    pub active: bool,
}

impl UserPartition {
    /// Returns the group with the specified id.
    ///
    /// # Errors
    /// Returns [`DomainError::NoSuchGroup`] if the partition has no such group.
    pub fn get_group(&self, group_id: u32) -> Result<&Group, DomainError> {
        self.groups.iter().find(|g| g.id == group_id).ok_or_else(|| DomainError::NoSuchGroup {
            message: format!(
                "Could not find a Group with ID [{group_id}] in UserPartition [{}]",
                self.id
            )
            .into(),
            context: None,
        })
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

#[derive(Serialize, Deserialize)]
struct PartitionRepr {
    id: u32,
    name: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheme: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
    groups: Vec<Group>,
    #[serde(default = "default_active")]
    active: bool,
    version: u32,
}

const fn default_active() -> bool {
    true
}

impl TryFrom<PartitionRepr> for UserPartition {
    type Error = DomainError;

    fn try_from(repr: PartitionRepr) -> Result<Self, Self::Error> {
        // Newer versions must stay readable after a rollback, so only the lower bound is strict.
        let scheme = match (repr.version, repr.scheme.as_deref()) {
            (1, _) => SchemeId::Random,
            (v, Some(name)) if v >= 2 => name.parse()?,
            (v, None) if v >= 2 => {
                return Err(DomainError::InvalidPayload {
                    message: format!("UserPartition {} missing value key 'scheme'", repr.id).into(),
                    context: None,
                });
            },
            (v, _) => {
                return Err(DomainError::InvalidPayload {
                    message: format!("UserPartition {} has unexpected version {v}", repr.id)
                        .into(),
                    context: None,
                });
            },
        };

        Ok(Self {
            id: repr.id,
            name: repr.name,
            description: repr.description,
            groups: repr.groups,
            scheme,
            parameters: repr.parameters,
            active: repr.active,
        })
    }
}

impl From<UserPartition> for PartitionRepr {
    fn from(p: UserPartition) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            scheme: Some(p.scheme.as_str().to_owned()),
            parameters: p.parameters,
            groups: p.groups,
            active: p.active,
            version: PARTITION_VERSION,
        }
    }
}
