use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use foamcase_core::migrate;

use crate::output;

#[derive(Debug, Serialize)]
pub struct MigrateOut {
    pub from: u32,
    pub to: u32,
    pub steps: Vec<String>,
    pub edits: usize,
    pub warnings: usize,
    pub written: String,
}

pub fn run(case: &Path, out: Option<&Path>) -> Result<()> {
    let mut doc = super::load_case(case)?;
    let report = migrate::migrate(&mut doc).with_context(|| format!("migrating {}", case.display()))?;

    let target = out.unwrap_or(case);
    if report.is_noop() && out.is_none() {
        output::eprintln_line("already at the current version");
    } else {
        doc.save(target).with_context(|| format!("writing {}", target.display()))?;
    }

    output::print(&MigrateOut {
        from: report.from,
        to: report.to,
        edits: report.edits(),
        warnings: report.warnings(),
        steps: report.steps,
        written: target.display().to_string(),
    })
}
