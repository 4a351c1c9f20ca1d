use std::path::Path;

use anyhow::{Context, Result};

use foamcase_core::document::CaseDocument;
use foamcase_core::migrate as core_migrate;

use crate::args::{Cli, Command};

mod generate;
mod get;
mod info;
mod migrate;
mod set;

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Migrate { case, out } => migrate::run(&case, out.as_deref()),
        Command::Get { case, path } => get::run(&case, &path),
        Command::Set { case, assignments, label } => set::run(&case, &assignments, label.as_deref()),
        Command::Generate {
            case,
            out,
            resources,
            config,
        } => generate::run(&case, &out, resources.as_deref(), config.as_deref()),
        Command::Info { case } => info::run(&case),
    }
}

pub(crate) fn load_case(path: &Path) -> Result<CaseDocument> {
    CaseDocument::load(path).with_context(|| format!("loading {}", path.display()))
}

/// Load a case and bring it to the current version in memory. Files newer
/// than this build, or too old to migrate, are refused.
pub(crate) fn open_case(path: &Path) -> Result<CaseDocument> {
    let mut doc = load_case(path)?;
    let report = core_migrate::migrate(&mut doc).with_context(|| format!("opening {}", path.display()))?;
    if !report.is_noop() {
        tracing::info!(from = report.from, to = report.to, "case migrated in memory");
    }
    Ok(doc)
}
