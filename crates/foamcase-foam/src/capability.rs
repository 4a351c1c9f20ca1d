//! Solver capability catalog.
//!
//! Generators never branch on solver names; they ask the selected solver's
//! `SolverCapability` instead. The catalog is keyed by solver executable name
//! and iterates in name order.

use std::collections::BTreeMap;

use foamcase_core::db::CaseReader;
use foamcase_core::{CaseError, CaseResult};

pub const TSL_AERO_FOAM: &str = "TSLAeroFoam";
pub const INTER_N_FOAM: &str = "interNFoam";
pub const BUOYANT_PIMPLE_N_FOAM: &str = "buoyantPimpleNFoam";
pub const BUOYANT_SIMPLE_N_FOAM: &str = "buoyantSimpleNFoam";
pub const PIMPLE_N_FOAM: &str = "pimpleNFoam";
pub const SIMPLE_N_FOAM: &str = "simpleNFoam";

/// What a solver expects from its input dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverCapability {
    /// Solves for `p_rgh`; `p` is derived.
    pub use_prgh: bool,
    /// `p_rgh` holds gauge pressure, so no operating pressure offset.
    pub use_gauge_pressure_in_prgh: bool,
    pub time_steady: bool,
    pub time_transient: bool,
}

impl SolverCapability {
    /// Steady-only solvers get `bounded` convection schemes.
    pub fn is_steady_only(&self) -> bool {
        self.time_steady && !self.time_transient
    }
}

#[derive(Debug, Clone)]
pub struct SolverCatalog {
    solvers: BTreeMap<String, SolverCapability>,
}

impl Default for SolverCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl SolverCatalog {
    pub fn empty() -> Self {
        Self {
            solvers: BTreeMap::new(),
        }
    }

    /// Solvers the generator knows how to drive.
    pub fn standard() -> Self {
        let cap = |use_prgh, gauge, steady, transient| SolverCapability {
            use_prgh,
            use_gauge_pressure_in_prgh: gauge,
            time_steady: steady,
            time_transient: transient,
        };
        let mut c = Self::empty();
        c.register(SIMPLE_N_FOAM, cap(false, false, true, false));
        c.register(PIMPLE_N_FOAM, cap(false, false, false, true));
        c.register(BUOYANT_SIMPLE_N_FOAM, cap(true, false, true, false));
        c.register(BUOYANT_PIMPLE_N_FOAM, cap(true, false, false, true));
        c.register(INTER_N_FOAM, cap(true, true, false, true));
        // Density based: steady runs use local time stepping.
        c.register(TSL_AERO_FOAM, cap(false, false, true, true));
        c
    }

    pub fn register(&mut self, name: impl Into<String>, capability: SolverCapability) {
        self.solvers.insert(name.into(), capability);
    }

    pub fn names(&self) -> Vec<&str> {
        self.solvers.keys().map(String::as_str).collect()
    }

    pub fn capability(&self, solver: &str) -> CaseResult<SolverCapability> {
        self.solvers
            .get(solver)
            .copied()
            .ok_or_else(|| CaseError::invalid_argument(format!("unknown solver: {solver}")))
    }

    /// Pick a solver from the case configuration, unless `requested` names one.
    pub fn select(&self, reader: &CaseReader<'_>, requested: Option<&str>) -> CaseResult<SelectedSolver> {
        let name = match requested {
            Some(name) => name.to_string(),
            None => find_solver(reader)?.to_string(),
        };
        let capability = self.capability(&name)?;
        tracing::debug!(solver = %name, ?capability, "solver selected");
        Ok(SelectedSolver { name, capability })
    }
}

/// The solver chosen for a run and what it supports.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SelectedSolver {
    pub name: String,
    pub capability: SolverCapability,
}

/// Solver implied by the configured models.
pub fn find_solver(reader: &CaseReader<'_>) -> CaseResult<&'static str> {
    let general = reader.general();
    let models = reader.models();
    let transient = general.is_time_transient()?;

    let name = if general.is_density_based()? {
        TSL_AERO_FOAM
    } else if models.is_multiphase_model_on()? {
        INTER_N_FOAM
    } else if models.is_energy_model_on()? || general.is_gravity_on()? {
        if transient {
            BUOYANT_PIMPLE_N_FOAM
        } else {
            BUOYANT_SIMPLE_N_FOAM
        }
    } else if transient {
        PIMPLE_N_FOAM
    } else {
        SIMPLE_N_FOAM
    };
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use foamcase_core::document::CasePath;
    use foamcase_core::template;

    fn set(doc: &mut foamcase_core::document::CaseDocument, path: &str, value: &str) {
        doc.set_value(&CasePath::root().children(path), value).unwrap();
    }

    #[test]
    fn default_case_is_steady_incompressible() {
        let doc = template::new_case().unwrap();
        let s = SolverCatalog::standard().select(&CaseReader::new(&doc), None).unwrap();
        assert_eq!(s.name, SIMPLE_N_FOAM);
        assert!(s.capability.is_steady_only());
        assert!(!s.capability.use_prgh);
    }

    #[test]
    fn selection_follows_models() {
        let mut doc = template::new_case().unwrap();
        set(&mut doc, "general/timeTransient", "true");
        assert_eq!(find_solver(&CaseReader::new(&doc)).unwrap(), PIMPLE_N_FOAM);

        set(&mut doc, "models/energyModels", "on");
        assert_eq!(find_solver(&CaseReader::new(&doc)).unwrap(), BUOYANT_PIMPLE_N_FOAM);

        set(&mut doc, "models/multiphaseModels/model", "volumeOfFluid");
        assert_eq!(find_solver(&CaseReader::new(&doc)).unwrap(), INTER_N_FOAM);

        set(&mut doc, "general/solverType", "densityBased");
        assert_eq!(find_solver(&CaseReader::new(&doc)).unwrap(), TSL_AERO_FOAM);
    }

    #[test]
    fn gravity_alone_selects_buoyant_solver() {
        let mut doc = template::new_case().unwrap();
        doc.set_attribute(&CasePath::root().children("general/operatingConditions/gravity"), "disabled", "false")
            .unwrap();
        assert_eq!(find_solver(&CaseReader::new(&doc)).unwrap(), BUOYANT_SIMPLE_N_FOAM);
    }

    #[test]
    fn override_must_be_known() {
        let doc = template::new_case().unwrap();
        let catalog = SolverCatalog::standard();
        let s = catalog.select(&CaseReader::new(&doc), Some(INTER_N_FOAM)).unwrap();
        assert!(s.capability.use_gauge_pressure_in_prgh);
        assert_matches!(
            catalog.select(&CaseReader::new(&doc), Some("icoFoam")),
            Err(CaseError::InvalidArgument(_))
        );
    }
}
