//! Domain accessors.
//!
//! Each submodule owns one subtree of the case document and exposes typed,
//! named queries over it, so callers never assemble paths themselves:
//! - `general`: time/flow/solver type, operating conditions
//! - `models`: turbulence, energy, multiphase, species
//! - `material`: material properties, mixtures and species
//! - `region`: regions, initial values, boundary topology
//! - `boundary`: boundary conditions and their enumerations
//! - `numerical`: schemes, relaxation, convergence criteria
//! - `monitor`: monitors and monitored field names
//!
//! Read access goes through `CaseReader`. Mutations are free functions taking
//! `&mut CaseDocument`; removals that other entities depend on go through a
//! `CascadeRegistry`.

pub mod boundary;
pub mod cascade;
pub mod general;
pub mod material;
pub mod models;
pub mod monitor;
pub mod numerical;
pub mod region;

use crate::document::{CaseDocument, CasePath};
use crate::errors::{CaseError, CaseResult};

pub use cascade::{CascadeHandler, CascadeRegistry, EntityKind};

/// An enumeration stored as text in the case document.
pub trait CaseEnum: Sized + Copy + 'static {
    /// Human name used in conversion errors.
    const KIND: &'static str;
    const NAMES: &'static [&'static str];

    fn all() -> &'static [Self];
    fn as_str(&self) -> &'static str;
    fn parse(s: &str) -> Option<Self>;
}

/// Declares a `CaseEnum` with its stored spelling per variant.
#[macro_export]
macro_rules! case_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($kind:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl $crate::db::CaseEnum for $name {
            const KIND: &'static str = $kind;
            const NAMES: &'static [&'static str] = $name::NAMES;

            fn all() -> &'static [Self] {
                $name::ALL
            }

            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }

            fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::errors::CaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as $crate::db::CaseEnum>::parse(s.trim())
                    .ok_or_else(|| $crate::errors::CaseError::conversion("<value>", s, $kind))
            }
        }
    };
}

/// Read a stored enumeration.
pub fn read_enum<T: CaseEnum>(doc: &CaseDocument, path: &CasePath) -> CaseResult<T> {
    let raw = doc.get_value(path)?;
    T::parse(raw.trim()).ok_or_else(|| CaseError::conversion(path, raw, T::KIND))
}

/// Entry point for typed reads.
#[derive(Debug, Clone, Copy)]
pub struct CaseReader<'a> {
    doc: &'a CaseDocument,
}

impl<'a> CaseReader<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &'a CaseDocument {
        self.doc
    }

    pub fn general(&self) -> general::GeneralDb<'a> {
        general::GeneralDb::new(self.doc)
    }

    pub fn models(&self) -> models::ModelsDb<'a> {
        models::ModelsDb::new(self.doc)
    }

    pub fn materials(&self) -> material::MaterialDb<'a> {
        material::MaterialDb::new(self.doc)
    }

    pub fn regions(&self) -> region::RegionDb<'a> {
        region::RegionDb::new(self.doc)
    }

    pub fn boundaries(&self) -> boundary::BoundaryDb<'a> {
        boundary::BoundaryDb::new(self.doc)
    }

    pub fn numerical(&self) -> numerical::NumericalDb<'a> {
        numerical::NumericalDb::new(self.doc)
    }

    pub fn monitors(&self) -> monitor::MonitorDb<'a> {
        monitor::MonitorDb::new(self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TurbulenceModel;
    use crate::template;
    use assert_matches::assert_matches;

    #[test]
    fn enum_macro_round_trips_spelling() {
        for m in TurbulenceModel::ALL {
            assert_eq!(<TurbulenceModel as CaseEnum>::parse(m.as_str()), Some(*m));
        }
        assert_eq!("k-omega".parse::<TurbulenceModel>().unwrap(), TurbulenceModel::KOmega);
        assert!("kOmega".parse::<TurbulenceModel>().is_err());
    }

    #[test]
    fn read_enum_reports_kind() {
        let mut doc = template::new_case().unwrap();
        let p = CasePath::root().children("models/turbulenceModels/model");
        doc.set_value(&p, "k-zeta").unwrap();
        assert_matches!(
            read_enum::<TurbulenceModel>(&doc, &p),
            Err(CaseError::Conversion { expected, .. }) if expected == "turbulence model"
        );
    }
}
