//! Case schema versions.
//!
//! Case files carry an integer `version` attribute on the root element. The
//! migration chain knows how to lift any version in
//! `FIRST_MIGRATABLE_VERSION..CURRENT_VERSION` up to `CURRENT_VERSION`.

use crate::errors::{CaseError, CaseResult};

/// Schema version written by this release.
pub const CURRENT_VERSION: u32 = 6;

/// Oldest version with a migration step.
pub const FIRST_MIGRATABLE_VERSION: u32 = 1;

/// Parse the root `version` attribute.
pub fn parse_version(s: &str) -> CaseResult<u32> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| CaseError::conversion("@version", s, "schema version"))
}

/// Reject versions the migration chain cannot handle.
pub fn require_supported(version: u32) -> CaseResult<()> {
    if (FIRST_MIGRATABLE_VERSION..=CURRENT_VERSION).contains(&version) {
        Ok(())
    } else {
        Err(CaseError::IncompatibleVersion {
            found: version,
            min: FIRST_MIGRATABLE_VERSION,
            current: CURRENT_VERSION,
        })
    }
}
