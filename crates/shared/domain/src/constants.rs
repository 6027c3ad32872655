//! Fixed identifiers shared across slices.

/// Course mode slugs.
pub const AUDIT: &str = "audit";
pub const VERIFIED: &str = "verified";
pub const PROFESSIONAL: &str = "professional";
pub const CREDIT: &str = "credit";

/// Modes that count as a paid, verified track.
pub const VERIFIED_MODES: &[&str] = &[VERIFIED, PROFESSIONAL];

/// Modes a learner cannot pick for themselves.
pub const UNSELECTABLE_MODES: &[&str] = &[CREDIT];

// Persisted in every block's group access rules; below the id range Studio assigns.
pub const CONTENT_GATING_PARTITION_ID: u32 = 51;

pub const LIMITED_ACCESS_GROUP_ID: u32 = 1;
pub const FULL_ACCESS_GROUP_ID: u32 = 2;

pub const GROUP_VERSION: u32 = 1;
pub const PARTITION_VERSION: u32 = 3;

/// Partition parameter carrying the owning course key.
pub const COURSE_ID_PARAMETER: &str = "course_id";
