//! foamcase-core
//!
//! Case configuration store for CFD cases:
//! - Typed XML document with structured path queries
//! - Forward-only schema migration chain
//! - Validated, all-or-nothing write batches
//! - Domain accessors over models, materials, regions, boundaries and numerics
//! - Cascade handlers for entity removal

pub mod config;
pub mod db;
pub mod document;
pub mod errors;
pub mod migrate;
pub mod schema;
pub mod template;
pub mod version;
pub mod writer;

pub use crate::errors::{CaseError, CaseResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::CoreConfig;
    pub use crate::db::boundary::{BoundaryDb, BoundaryType};
    pub use crate::db::material::{MaterialDb, Phase};
    pub use crate::db::models::{ModelsDb, TurbulenceModel};
    pub use crate::db::region::{BoundaryRef, RegionDb};
    pub use crate::db::{CascadeRegistry, CaseEnum, CaseReader, EntityKind};
    pub use crate::document::{CaseDocument, CasePath, CaseSession, Element, Vector3};
    pub use crate::migrate::{migrate, MigrationReport};
    pub use crate::version::CURRENT_VERSION;
    pub use crate::writer::{CoreDbWriter, WriteError};
    pub use crate::{CaseError, CaseResult};
}
