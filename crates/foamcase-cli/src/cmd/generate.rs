use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use foamcase_foam::resources::DirResources;
use foamcase_foam::{CaseGenerator, GenerationConfig, GenerationContext};

use crate::output;

#[derive(Debug, Serialize)]
pub struct GenerateOut {
    pub solver: String,
    pub regions: Vec<String>,
    pub files: usize,
    pub meshless_regions: Vec<String>,
    pub out_dir: String,
    pub generated_at: String,
}

pub fn run(case: &Path, out_dir: &Path, resources: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let pb = if output::is_json() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(80));

    pb.set_message("loading case");
    let doc = super::open_case(case)?;

    let config = match config {
        Some(path) => GenerationConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    let resource_dir = match resources {
        Some(dir) => dir.to_path_buf(),
        None => case.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(".")),
    };
    let resources = DirResources::new(resource_dir);

    pb.set_message("selecting solver");
    let ctx = GenerationContext::new(&doc, &resources, config)?;

    pb.set_message(format!("generating for {}", ctx.solver().name));
    let summary = CaseGenerator::new(ctx)
        .write(out_dir)
        .with_context(|| format!("generating into {}", out_dir.display()))?;
    pb.finish_and_clear();

    for rname in &summary.meshless_regions {
        output::eprintln_line(&format!("warning: no mesh for region '{rname}', polyMesh/boundary not written"));
    }

    output::print(&GenerateOut {
        solver: summary.solver,
        regions: summary.regions,
        files: summary.files.len(),
        meshless_regions: summary.meshless_regions,
        out_dir: out_dir.display().to_string(),
        generated_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
    })
}
