//! Case generation: every dictionary of every selected region.
//!
//! Generation is two-phase. `plan` builds all dictionaries in memory and fails
//! on the first error; `write` only touches the filesystem once the whole plan
//! has been built, so a failing case leaves the output directory as it was.

use std::path::{Path, PathBuf};

use serde::Serialize;

use foamcase_core::{CaseError, CaseResult};

use crate::context::{GenerationContext, RegionTopology};
use crate::dictionary::DictionaryFile;
use crate::fields::{standard_fields, FieldGenerator};
use crate::polymesh::load_boundary_file;
use crate::system::{fv_schemes, fv_solution, shared_fv_solution};

/// What a `write` produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub solver: String,
    pub regions: Vec<String>,
    /// Every file written, dictionaries and auxiliary files alike.
    pub files: Vec<PathBuf>,
    /// Regions whose `polyMesh/boundary` was not found.
    pub meshless_regions: Vec<String>,
}

/// Dictionaries built for one region.
#[derive(Debug, Clone)]
pub struct RegionPlan {
    pub rname: String,
    pub files: Vec<DictionaryFile>,
    /// `false` when the boundary rewrite was requested but no mesh exists.
    pub has_mesh: bool,
}

pub struct CaseGenerator<'a> {
    ctx: GenerationContext<'a>,
    fields: Vec<Box<dyn FieldGenerator>>,
}

impl<'a> CaseGenerator<'a> {
    pub fn new(ctx: GenerationContext<'a>) -> Self {
        Self {
            ctx,
            fields: standard_fields(),
        }
    }

    pub fn context(&self) -> &GenerationContext<'a> {
        &self.ctx
    }

    /// Regions selected by the configuration, in document order.
    pub fn regions(&self) -> CaseResult<Vec<RegionTopology>> {
        let names = self.ctx.reader().regions().names();
        let config = self.ctx.config();

        if let Some(missing) = config.regions.iter().find(|r| !names.contains(r)) {
            return Err(CaseError::invalid_argument(format!("no region named '{missing}'")));
        }

        names
            .iter()
            .filter(|r| config.wants_region(r))
            .map(|r| self.ctx.region(r))
            .collect()
    }

    /// Field files, `system/` dictionaries and, when `case_root` is given and
    /// a mesh is present there, the rewritten `polyMesh/boundary`.
    pub fn generate_region(&self, region: &RegionTopology, case_root: Option<&Path>) -> CaseResult<RegionPlan> {
        let config = self.ctx.config();
        let mut files = Vec::new();

        for field in &self.fields {
            if !config.wants_field(field.object()) {
                tracing::debug!(region = %region.rname, field = field.object(), "field skipped by configuration");
                continue;
            }
            if let Some(file) = field.build(&self.ctx, region)? {
                files.push(file);
            }
        }

        files.push(fv_schemes(&self.ctx, region)?);
        files.push(fv_solution(&self.ctx, region)?);

        let mut has_mesh = true;
        if config.write_boundary {
            if let Some(root) = case_root {
                match load_boundary_file(&self.ctx, region, root)? {
                    Some(file) => files.push(file),
                    None => has_mesh = false,
                }
            }
        }

        Ok(RegionPlan {
            rname: region.rname.clone(),
            files,
            has_mesh,
        })
    }

    /// Dictionaries shared by all regions; only multi-region cases have any.
    pub fn generate_shared(&self) -> CaseResult<Vec<DictionaryFile>> {
        if self.ctx.reader().regions().names().len() > 1 {
            Ok(vec![shared_fv_solution(&self.ctx)?])
        } else {
            Ok(Vec::new())
        }
    }

    /// Build every dictionary without writing anything.
    pub fn plan(&self, case_root: Option<&Path>) -> CaseResult<Vec<RegionPlan>> {
        let mut plans = Vec::new();
        for region in self.regions()? {
            plans.push(self.generate_region(&region, case_root)?);
        }
        Ok(plans)
    }

    /// Generate into `case_root`. The mesh, if any, is read from there too.
    pub fn write(&self, case_root: &Path) -> CaseResult<GenerationSummary> {
        let plans = self.plan(Some(case_root))?;
        let shared = self.generate_shared()?;

        let mut summary = GenerationSummary {
            solver: self.ctx.solver().name.clone(),
            ..GenerationSummary::default()
        };

        for plan in &plans {
            for file in &plan.files {
                summary.files.extend(file.write(case_root)?);
            }
            tracing::info!(region = %plan.rname, dictionaries = plan.files.len(), "region generated");
            summary.regions.push(plan.rname.clone());
            if !plan.has_mesh {
                summary.meshless_regions.push(plan.rname.clone());
            }
        }
        for file in &shared {
            summary.files.extend(file.write(case_root)?);
        }

        tracing::info!(
            solver = %summary.solver,
            regions = summary.regions.len(),
            files = summary.files.len(),
            "case generated"
        );
        Ok(summary)
    }
}
