use cgate_domain::constants::{CONTENT_GATING_PARTITION_ID, COURSE_ID_PARAMETER};
use cgate_domain::course::Course;
use cgate_domain::partition::{SchemeId, UserPartition};
use cgate_kernel::context::GatingContext;
use cgate_kernel::scheme::SchemeRegistry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const PARTITION_NAME: &str = "Feature-based Enrollments";
pub const PARTITION_DESCRIPTION: &str =
    "Partition for segmenting users by access to gated content types";

/// Builds the content gating partition for `course` at course-load time.
///
/// Abstains (`None`) when neither gating flag is set, when the `content_type_gate` scheme is
/// not registered, or when the course already uses the reserved partition id. The last two
/// cases log a warning.
#[must_use]
pub fn create_content_gating_partition(
    ctx: &GatingContext,
    registry: &SchemeRegistry,
    course: &Course,
) -> Option<UserPartition> {
    if !ctx.flags.partition_enabled() {
        return None;
    }

    let Some(scheme) = registry.get(SchemeId::ContentTypeGate) else {
        warn!(
            scheme = %SchemeId::ContentTypeGate,
            "No content type gating scheme registered, partition will not be created"
        );
        return None;
    };

    // Courses imported from XML may carry arbitrary partition ids, including the reserved one.
    if let Some(existing) = course.partition(CONTENT_GATING_PARTITION_ID) {
        warn!(
            id = CONTENT_GATING_PARTITION_ID,
            partition = %existing.name,
            course = %course.key,
            "Can't add content type gating partition, id is already assigned"
        );
        return None;
    }

    let parameters = BTreeMap::from([(COURSE_ID_PARAMETER.to_owned(), course.key.to_string())]);
    let partition = scheme.create_user_partition(
        CONTENT_GATING_PARTITION_ID,
        PARTITION_NAME,
        PARTITION_DESCRIPTION,
        Vec::new(),
        parameters,
        true,
    );
    debug!(course = %course.key, partition = partition.id, "Content type gating partition created");

    Some(partition)
}
