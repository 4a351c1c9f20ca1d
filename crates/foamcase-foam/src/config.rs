//! Configuration for dictionary generation.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration. The crate never reads environment variables; the CLI loads
//! this from `--config <file.json>`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use foamcase_core::{CaseError, CaseResult};

use crate::capability::SolverCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct GenerationConfig {
    /// Solver to generate for; selected from the models when absent.
    pub solver: Option<String>,
    /// Regions to generate; empty means all.
    pub regions: Vec<String>,
    /// Write fan curves and boundary data next to the dictionaries.
    pub write_auxiliary: bool,
    /// Rewrite `constant/<region>/polyMesh/boundary` when a mesh is present.
    pub write_boundary: bool,
    /// Field files to leave out, by object name (`"T"`, `"omega"`, ...).
    pub skip_fields: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            solver: None,
            regions: Vec::new(),
            write_auxiliary: true,
            write_boundary: true,
            skip_fields: Vec::new(),
        }
    }
}

impl GenerationConfig {
    pub fn from_json_str(text: &str) -> CaseResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| CaseError::invalid_argument(format!("generation config: {e}")))?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> CaseResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn wants_region(&self, rname: &str) -> bool {
        self.regions.is_empty() || self.regions.iter().any(|r| r == rname)
    }

    pub fn wants_field(&self, object: &str) -> bool {
        !self.skip_fields.iter().any(|f| f == object)
    }
}

/// Validate a generation configuration.
pub fn validate_config(cfg: &GenerationConfig) -> CaseResult<()> {
    if let Some(solver) = &cfg.solver {
        SolverCatalog::standard().capability(solver)?;
    }

    if cfg.regions.iter().any(|r| r.trim().is_empty()) {
        return Err(CaseError::invalid_argument("region names must not be empty"));
    }

    Ok(())
}
