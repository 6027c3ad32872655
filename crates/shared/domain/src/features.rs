use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

pub const CONTENT_TYPE_GATING: &str = "content_type_gating";
pub const CONTENT_TYPE_GATING_STUDIO_UI: &str = "content_type_gating_studio_ui";

bitflags! {
    /// Gating feature switches, injected into evaluation instead of read from global state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct FeatureFlags: u32 {
        /// Gate audit learners out of graded content, platform wide.
        const CONTENT_TYPE_GATING = 1 << 0;
        /// Expose the gating partition to course authors without enforcing it.
        const CONTENT_TYPE_GATING_STUDIO_UI = 1 << 1;

        const ALL = Self::CONTENT_TYPE_GATING.bits() | Self::CONTENT_TYPE_GATING_STUDIO_UI.bits();
    }
}

impl FeatureFlags {
    /// Whether content type gating is switched on globally.
    #[must_use]
    pub const fn gating_enabled(self) -> bool {
        self.contains(Self::CONTENT_TYPE_GATING)
    }

    /// Whether the gating partition may be attached to courses at all.
    #[must_use]
    pub const fn partition_enabled(self) -> bool {
        self.intersects(Self::ALL)
    }
}

impl From<&str> for FeatureFlags {
    fn from(s: &str) -> Self {
        match s {
            CONTENT_TYPE_GATING => Self::CONTENT_TYPE_GATING,
            CONTENT_TYPE_GATING_STUDIO_UI => Self::CONTENT_TYPE_GATING_STUDIO_UI,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for FeatureFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for FeatureFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for FeatureFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
