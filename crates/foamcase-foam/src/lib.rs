//! foamcase-foam
//!
//! OpenFOAM input generation from a foamcase document:
//! - Dictionary model and serializer (`FoamDict`, `DictionaryFile`)
//! - Solver capability catalog and solver selection
//! - Initial field files with per-boundary-type conditions
//! - `fvSchemes`, `fvSolution` and `polyMesh/boundary`
//! - Case generation over all regions
//!
//! Generators read the document through an explicit `GenerationContext`;
//! nothing here holds global state.

pub mod capability;
pub mod case;
pub mod config;
pub mod context;
pub mod dictionary;
pub mod fields;
pub mod polymesh;
pub mod resources;
pub mod system;

pub use crate::case::{CaseGenerator, GenerationSummary};
pub use crate::config::GenerationConfig;
pub use crate::context::GenerationContext;
