use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use foamcase_core::document::CasePath;

use crate::output;

#[derive(Debug, Serialize)]
pub struct GetOut {
    pub path: String,
    pub value: String,
}

pub fn run(case: &Path, path: &str) -> Result<()> {
    let doc = super::open_case(case)?;
    let query = CasePath::parse(path).with_context(|| format!("invalid path: {path}"))?;
    let value = doc.get_value(&query)?;
    output::print(&GetOut {
        path: query.to_string(),
        value,
    })
}
