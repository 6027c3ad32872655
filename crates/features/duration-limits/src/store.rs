use crate::config::{DurationLimitConfig, EffectiveDurationLimit, StackedScope};
use crate::error::{DurationLimitError, DurationLimitErrorExt};
use cgate_domain::course::CourseKey;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt::Debug;
use tracing::debug;

/// Resolves the duration limit configuration in force for a course.
pub trait DurationLimitResolver: Debug + Send + Sync {
    fn current(&self, course_key: &CourseKey) -> EffectiveDurationLimit;
}

/// Stacked configuration kept in memory.
///
/// Each scope holds its most recently written record. Courses reach their site through the
/// org-to-site mapping; orgs without a site skip the site layer.
#[derive(Debug, Default)]
pub struct InMemoryDurationLimits {
    records: RwLock<FxHashMap<StackedScope, DurationLimitConfig>>,
    org_sites: RwLock<FxHashMap<String, String>>,
}

impl InMemoryDurationLimits {
    /// Stores `config` for `scope`, replacing the previous record.
    ///
    /// # Errors
    /// Returns [`DurationLimitError::InvalidConfig`] if the record fails validation.
    pub fn write(&self, scope: StackedScope, config: DurationLimitConfig) -> Result<(), DurationLimitError> {
        config.validate().context(format!("Writing {scope}"))?;
        debug!(%scope, ?config, "Duration limit config written");
        self.records.write().insert(scope, config);
        Ok(())
    }

    pub fn clear(&self, scope: &StackedScope) -> Option<DurationLimitConfig> {
        self.records.write().remove(scope)
    }

    pub fn map_org_to_site(&self, org: impl Into<String>, site: impl Into<String>) {
        self.org_sites.write().insert(org.into(), site.into());
    }

    /// Scopes consulted for `course_key`, most specific first.
    fn scopes_for(&self, course_key: &CourseKey) -> Vec<StackedScope> {
        let mut scopes = vec![
            StackedScope::Course(course_key.clone()),
            StackedScope::Org(course_key.org().to_owned()),
        ];
        if let Some(site) = self.org_sites.read().get(course_key.org()) {
            scopes.push(StackedScope::Site(site.clone()));
        }
        scopes.push(StackedScope::Global);
        scopes
    }
}

impl DurationLimitResolver for InMemoryDurationLimits {
    fn current(&self, course_key: &CourseKey) -> EffectiveDurationLimit {
        let scopes = self.scopes_for(course_key);
        let records = self.records.read();
        EffectiveDurationLimit::stack(scopes.iter().filter_map(|scope| records.get(scope)))
    }
}
