//! Schema migration chain.
//!
//! Case files written by older releases are lifted to `CURRENT_VERSION` when
//! loaded, before anything else reads them:
//! - one `MigrationStep` per source version, applied strictly in order
//! - each step is a structural edit guarded by "insert only if absent", so
//!   re-running it on an already migrated document changes nothing
//! - steps never touch the `version` attribute; the chain stamps
//!   `from + 1` after each step
//!
//! Edits are recorded in a `MigrationContext` and returned as a
//! `MigrationReport` for display.

use std::collections::BTreeMap;

use crate::document::CaseDocument;
use crate::errors::{CaseError, CaseResult};
use crate::version::{self, CURRENT_VERSION};

pub mod steps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// One recorded edit or notice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MigrationDiagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
}

/// Collects diagnostics while steps run.
#[derive(Debug, Clone, Default)]
pub struct MigrationContext {
    pub diagnostics: Vec<MigrationDiagnostic>,
    edits: BTreeMap<u32, usize>,
    current: u32,
}

impl MigrationContext {
    /// Record a structural edit made by the running step.
    pub fn edit(&mut self, code: impl Into<String>, message: impl Into<String>) {
        let (code, message) = (code.into(), message.into());
        tracing::debug!(step = self.current, %code, "{message}");
        *self.edits.entry(self.current).or_default() += 1;
        self.diagnostics.push(MigrationDiagnostic {
            level: DiagnosticLevel::Info,
            code,
            message,
        });
    }

    pub fn push_warning(&mut self, code: impl Into<String>, message: impl Into<String>) {
        let (code, message) = (code.into(), message.into());
        tracing::warn!(step = self.current, %code, "{message}");
        self.diagnostics.push(MigrationDiagnostic {
            level: DiagnosticLevel::Warning,
            code,
            message,
        });
    }

    /// Edits recorded by the step lifting `from`.
    pub fn edits(&self, from: u32) -> usize {
        self.edits.get(&from).copied().unwrap_or(0)
    }
}

/// Lifts a document from `from_version()` to the next version.
pub trait MigrationStep {
    fn from_version(&self) -> u32;

    fn id(&self) -> &str;

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()>;
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MigrationReport {
    pub from: u32,
    pub to: u32,
    /// Ids of the steps applied, in order.
    pub steps: Vec<String>,
    pub diagnostics: Vec<MigrationDiagnostic>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn edits(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Info)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .count()
    }
}

/// Ordered steps indexed by source version.
pub struct MigrationChain {
    steps: Vec<Box<dyn MigrationStep + Send + Sync>>,
}

impl std::fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.steps.iter().map(|s| s.id())).finish()
    }
}

impl MigrationChain {
    /// The steps shipped with this release, one per version below current.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                Box::new(steps::V1ToV2),
                Box::new(steps::V2ToV3),
                Box::new(steps::V3ToV4),
                Box::new(steps::V4ToV5),
                Box::new(steps::V5ToV6),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step lifting `from`, if any.
    pub fn step(&self, from: u32) -> Option<&(dyn MigrationStep + Send + Sync)> {
        self.steps
            .iter()
            .find(|s| s.from_version() == from)
            .map(|s| s.as_ref())
    }

    /// Bring `doc` up to `CURRENT_VERSION`.
    ///
    /// A document already at the current version is left untouched. Versions
    /// above current, or below the first migratable one, are rejected with
    /// `IncompatibleVersion` before anything is edited.
    pub fn migrate(&self, doc: &mut CaseDocument) -> CaseResult<MigrationReport> {
        let from = doc.version()?;
        version::require_supported(from)?;

        let mut ctx = MigrationContext::default();
        let mut applied = Vec::new();

        if from == CURRENT_VERSION {
            tracing::debug!(version = from, "migration not necessary");
        }

        for v in from..CURRENT_VERSION {
            let step = self
                .step(v)
                .ok_or_else(|| CaseError::invariant(format!("no migration step from version {v}")))?;
            ctx.current = v;
            step.apply(&mut ctx, doc)?;
            doc.set_version(v + 1);
            tracing::info!(step = step.id(), edits = ctx.edits(v), "migrated to v{}", v + 1);
            applied.push(step.id().to_string());
        }

        Ok(MigrationReport {
            from,
            to: CURRENT_VERSION,
            steps: applied,
            diagnostics: ctx.diagnostics,
        })
    }
}

/// Migrate with the standard chain.
pub fn migrate(doc: &mut CaseDocument) -> CaseResult<MigrationReport> {
    MigrationChain::standard().migrate(doc)
}
