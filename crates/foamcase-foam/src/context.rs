//! Explicit generation context.
//!
//! Everything a generator reads is reachable from here: the case document
//! (read-only), the selected solver and its capability flags, the external
//! file lookup and the generation configuration. Per-region facts are
//! snapshotted once into a `RegionTopology`.

use foamcase_core::db::boundary::boundary_path;
use foamcase_core::db::material::Phase;
use foamcase_core::db::region::{BoundaryRef, InitialValues};
use foamcase_core::db::{read_enum, CaseEnum, CaseReader};
use foamcase_core::document::{CaseDocument, CasePath, Vector3};
use foamcase_core::{CaseError, CaseResult};

use crate::capability::{SelectedSolver, SolverCapability, SolverCatalog};
use crate::config::GenerationConfig;
use crate::dictionary::region_location;
use crate::resources::FileResources;

/// Turbulence model constant used for initial epsilon.
const C_MU: f64 = 0.09;

pub struct GenerationContext<'a> {
    reader: CaseReader<'a>,
    solver: SelectedSolver,
    resources: &'a dyn FileResources,
    config: GenerationConfig,
}

impl<'a> GenerationContext<'a> {
    /// Select the solver from the configuration (or its override) using the
    /// standard catalog.
    pub fn new(doc: &'a CaseDocument, resources: &'a dyn FileResources, config: GenerationConfig) -> CaseResult<Self> {
        let reader = CaseReader::new(doc);
        let solver = SolverCatalog::standard().select(&reader, config.solver.as_deref())?;
        Ok(Self::with_solver(doc, resources, config, solver))
    }

    pub fn with_solver(
        doc: &'a CaseDocument,
        resources: &'a dyn FileResources,
        config: GenerationConfig,
        solver: SelectedSolver,
    ) -> Self {
        Self {
            reader: CaseReader::new(doc),
            solver,
            resources,
            config,
        }
    }

    pub fn doc(&self) -> &'a CaseDocument {
        self.reader.document()
    }

    pub fn reader(&self) -> &CaseReader<'a> {
        &self.reader
    }

    pub fn solver(&self) -> &SelectedSolver {
        &self.solver
    }

    pub fn capability(&self) -> SolverCapability {
        self.solver.capability
    }

    pub fn resources(&self) -> &'a dyn FileResources {
        self.resources
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Reads scoped to one boundary condition.
    pub fn boundary(&self, bcid: u64) -> BoundaryView<'a> {
        BoundaryView {
            doc: self.doc(),
            base: boundary_path(bcid),
            bcid,
        }
    }

    pub fn region(&self, rname: &str) -> CaseResult<RegionTopology> {
        RegionTopology::load(&self.reader, rname)
    }
}

/// Relative reads under `.../boundaryCondition[@bcid=N]`.
#[derive(Debug, Clone)]
pub struct BoundaryView<'a> {
    doc: &'a CaseDocument,
    base: CasePath,
    bcid: u64,
}

impl<'a> BoundaryView<'a> {
    pub fn bcid(&self) -> u64 {
        self.bcid
    }

    pub fn path(&self, rel: &str) -> CasePath {
        self.base.clone().children(rel)
    }

    pub fn value(&self, rel: &str) -> CaseResult<String> {
        self.doc.get_value(&self.path(rel))
    }

    pub fn float(&self, rel: &str) -> CaseResult<f64> {
        self.doc.get_float(&self.path(rel))
    }

    pub fn boolean(&self, rel: &str) -> CaseResult<bool> {
        self.doc.get_bool(&self.path(rel))
    }

    pub fn vector(&self, rel: &str) -> CaseResult<Vector3> {
        self.doc.get_vector(&self.path(rel))
    }

    pub fn enumeration<T: CaseEnum>(&self, rel: &str) -> CaseResult<T> {
        read_enum(self.doc, &self.path(rel))
    }

    /// Whitespace separated floats, as stored for piecewise-linear tables.
    pub fn floats(&self, rel: &str) -> CaseResult<Vec<f64>> {
        let path = self.path(rel);
        let raw = self.doc.get_value(&path)?;
        raw.split_whitespace()
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| CaseError::conversion(&path, raw.clone(), "list of numbers"))
            })
            .collect()
    }
}

/// Snapshot of one region taken before its dictionaries are built.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTopology {
    pub rname: String,
    /// Subdirectory under `0/`, `constant/` and `system/`; empty when the
    /// case has a single region.
    pub dir: String,
    pub mid: u64,
    pub phase: Phase,
    /// `(bcid, name, physical type)` in document order.
    pub boundaries: Vec<BoundaryRef>,
    pub secondary_materials: Vec<u64>,
    pub initial: InitialValues,
    /// Density of the primary material at the initial state; 0 for solids.
    pub density: f64,
    /// Dynamic viscosity at the initial temperature; 0 for solids.
    pub viscosity: f64,
}

impl RegionTopology {
    pub fn load(reader: &CaseReader<'_>, rname: &str) -> CaseResult<Self> {
        let regions = reader.regions();
        let mid = regions.material(rname)?;
        let phase = reader.materials().phase(mid)?;
        let initial = regions.initial_values(rname)?;

        let (density, viscosity) = if phase == Phase::Solid {
            (0.0, 0.0)
        } else {
            (
                regions.density(rname)?,
                reader.materials().viscosity(mid, initial.temperature)?,
            )
        };

        let dir = if regions.names().len() > 1 {
            rname.to_string()
        } else {
            String::new()
        };

        Ok(Self {
            rname: rname.to_string(),
            dir,
            mid,
            phase,
            boundaries: regions.boundaries(rname).map_err(unrecognized_type)?,
            secondary_materials: regions.secondary_materials(rname)?,
            initial,
            density,
            viscosity,
        })
    }

    pub fn is_fluid(&self) -> bool {
        self.phase != Phase::Solid
    }

    /// `base/<region>` in multi-region cases, otherwise `base`.
    pub fn location(&self, base: &str) -> String {
        region_location(base, &self.dir)
    }

    /// k = 1.5 (U I)^2 with the reference velocity scale and intensity in percent.
    pub fn initial_k(&self) -> f64 {
        let ui = self.initial.scale_of_velocity * self.initial.turbulent_intensity / 100.0;
        1.5 * ui * ui
    }

    /// Turbulent kinematic viscosity from the viscosity ratio.
    pub fn initial_nut(&self) -> f64 {
        if self.density == 0.0 {
            return 0.0;
        }
        self.initial.turbulent_viscosity_ratio * self.viscosity / self.density
    }

    pub fn initial_omega(&self) -> f64 {
        let nut = self.initial_nut();
        if nut == 0.0 {
            0.0
        } else {
            self.initial_k() / nut
        }
    }

    pub fn initial_epsilon(&self) -> f64 {
        let nut = self.initial_nut();
        if nut == 0.0 {
            0.0
        } else {
            C_MU * self.initial_k().powi(2) / nut
        }
    }
}

/// A physical type no generator knows is a dispatch failure, not a bad value.
fn unrecognized_type(e: CaseError) -> CaseError {
    match e {
        CaseError::Conversion { path, value, expected } if expected == "boundary type" => {
            CaseError::dispatch(format!("unrecognized boundary type '{value}' at {path}"))
        }
        e => e,
    }
}
