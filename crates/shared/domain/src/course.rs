use crate::error::DomainError;
use crate::partition::UserPartition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const COURSE_V1_PREFIX: &str = "course-v1:";

/// Serialized form a [`CourseKey`] was written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyFormat {
    /// `course-v1:Org+Course+Run`
    #[default]
    V1,
    /// `Org/Course/Run`
    Legacy,
}

/// Opaque course identifier, `course-v1:Org+Course+Run` or legacy `Org/Course/Run`.
///
/// The format is part of the identity: a legacy key and a `course-v1` key with the same
/// parts name different courses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseKey {
    format: KeyFormat,
    org: String,
    course: String,
    run: String,
}

impl CourseKey {
    /// Builds a `course-v1` key from its parts.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidCourseKey`] if any part is empty or contains a separator.
    pub fn new(
        org: impl Into<String>,
        course: impl Into<String>,
        run: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Self::with_format(KeyFormat::V1, org, course, run)
    }

    /// Builds a key in the given format.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidCourseKey`] if any part is empty or contains a separator.
    pub fn with_format(
        format: KeyFormat,
        org: impl Into<String>,
        course: impl Into<String>,
        run: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let key = Self { format, org: org.into(), course: course.into(), run: run.into() };
        for part in [&key.org, &key.course, &key.run] {
            if part.is_empty() || part.contains(['+', '/', ':']) {
                return Err(DomainError::InvalidCourseKey {
                    message: format!("Invalid key part '{part}'").into(),
                    context: None,
                });
            }
        }
        Ok(key)
    }

    #[must_use]
    pub const fn format(&self) -> KeyFormat {
        self.format
    }

    #[must_use]
    pub fn org(&self) -> &str {
        &self.org
    }

    #[must_use]
    pub fn course(&self) -> &str {
        &self.course
    }

    #[must_use]
    pub fn run(&self) -> &str {
        &self.run
    }
}

impl FromStr for CourseKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (format, parts): (_, Vec<&str>) = match s.strip_prefix(COURSE_V1_PREFIX) {
            Some(rest) => (KeyFormat::V1, rest.split('+').collect()),
            None => (KeyFormat::Legacy, s.split('/').collect()),
        };

        match parts.as_slice() {
            [org, course, run] => Self::with_format(format, *org, *course, *run).map_err(|_| {
                DomainError::InvalidCourseKey { message: s.to_owned().into(), context: None }
            }),
            _ => Err(DomainError::InvalidCourseKey {
                message: s.to_owned().into(),
                context: Some("Expected course-v1:Org+Course+Run or Org/Course/Run".into()),
            }),
        }
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            KeyFormat::V1 => write!(f, "{COURSE_V1_PREFIX}{}+{}+{}", self.org, self.course, self.run),
            KeyFormat::Legacy => write!(f, "{}/{}/{}", self.org, self.course, self.run),
        }
    }
}

impl Serialize for CourseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Locates a single content block inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageKey {
    pub course_key: CourseKey,
    pub block_type: String,
    pub block_id: String,
}

impl UsageKey {
    pub fn new(
        course_key: CourseKey,
        block_type: impl Into<String>,
        block_id: impl Into<String>,
    ) -> Self {
        Self { course_key, block_type: block_type.into(), block_id: block_id.into() }
    }
}

/// Course metadata relevant to gating decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub key: CourseKey,
    pub display_name: String,
    pub start: DateTime<Utc>,
    /// Partitions authored on the course itself (Studio or XML import).
    #[serde(default)]
    pub user_partitions: Vec<UserPartition>,
}

impl Course {
    /// Finds a course-defined partition by id.
    #[must_use]
    pub fn partition(&self, id: u32) -> Option<&UserPartition> {
        self.user_partitions.iter().find(|p| p.id == id)
    }
}

/// Minimal learner identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self { id, username: username.into() }
    }
}
