use crate::domain::model::ZonePolicy;
use crate::utils::error::{AggregatorError, Result};
use regex::Regex;
use std::sync::OnceLock;

pub const SUBJECT_PREFIX: &str = "fabric.zone.";
pub const SUBJECT_SUFFIX: &str = ".provision";

fn zone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("zone pattern is valid"))
}

/// `fabric.zone.<zone>.provision`, with `zone` spliced in unescaped.
pub fn provision_subject(zone: &str) -> String {
    format!("{}{}{}", SUBJECT_PREFIX, zone, SUBJECT_SUFFIX)
}

/// Checks `zone` against `policy` before it becomes part of a subject.
///
/// Under [`ZonePolicy::Strict`] a zone containing a token separator (`.`) or
/// a wildcard (`*`, `>`) would redirect the message to another subject, so
/// anything outside `[A-Za-z0-9-]` is refused.
pub fn validate_zone(zone: &str, policy: ZonePolicy) -> Result<()> {
    match policy {
        ZonePolicy::Verbatim => Ok(()),
        ZonePolicy::Strict => {
            if zone.is_empty() {
                return Err(AggregatorError::InvalidZone {
                    zone: zone.to_string(),
                    reason: "zone cannot be empty".to_string(),
                });
            }
            if !zone_pattern().is_match(zone) {
                return Err(AggregatorError::InvalidZone {
                    zone: zone.to_string(),
                    reason: "only ASCII letters, digits and '-' are allowed".to_string(),
                });
            }
            Ok(())
        }
    }
}

pub fn subject_for_zone(zone: &str, policy: ZonePolicy) -> Result<String> {
    validate_zone(zone, policy)?;
    Ok(provision_subject(zone))
}
