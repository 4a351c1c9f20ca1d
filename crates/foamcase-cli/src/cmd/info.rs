use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use foamcase_core::db::CaseReader;
use foamcase_core::migrate;
use foamcase_core::version::CURRENT_VERSION;
use foamcase_foam::capability::SolverCatalog;

use crate::output;

#[derive(Debug, Serialize)]
pub struct InfoOut {
    pub version: u32,
    pub current_version: u32,
    pub digest: String,
    pub regions: Vec<String>,
    pub solver: String,
}

pub fn run(case: &Path) -> Result<()> {
    let doc = super::load_case(case)?;
    let version = doc.version()?;

    // Queries assume the current layout; older files are read through a
    // migrated copy.
    let mut current = doc.clone();
    migrate::migrate(&mut current)?;
    let reader = CaseReader::new(&current);
    let solver = SolverCatalog::standard().select(&reader, None)?;

    output::print(&InfoOut {
        version,
        current_version: CURRENT_VERSION,
        digest: doc.digest(),
        regions: reader.regions().names(),
        solver: solver.name,
    })
}
