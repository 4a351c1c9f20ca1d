//! General settings: time mode, flow and solver type, operating conditions.

use crate::db::material::{DensitySpecification, MaterialDb};
use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath, Vector3};
use crate::errors::CaseResult;

crate::case_enum! {
    pub enum FlowType ("flow type") {
        Incompressible => "incompressible",
        Compressible => "compressible",
    }
}

crate::case_enum! {
    pub enum SolverType ("solver type") {
        PressureBased => "pressureBased",
        DensityBased => "densityBased",
    }
}

pub fn general_path() -> CasePath {
    CasePath::root().child("general")
}

pub fn operating_conditions_path() -> CasePath {
    general_path().child("operatingConditions")
}

pub fn gravity_path() -> CasePath {
    operating_conditions_path().child("gravity")
}

/// Atmospheric boundary layer inlet settings, shared by every ABL inlet.
pub fn abl_path() -> CasePath {
    general_path().child("atmosphericBoundaryLayer")
}

#[derive(Debug, Clone, Copy)]
pub struct GeneralDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> GeneralDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn is_time_transient(&self) -> CaseResult<bool> {
        self.doc.get_bool(&general_path().child("timeTransient"))
    }

    pub fn flow_type(&self) -> CaseResult<FlowType> {
        read_enum(self.doc, &general_path().child("flowType"))
    }

    pub fn is_compressible(&self) -> CaseResult<bool> {
        Ok(self.flow_type()? == FlowType::Compressible)
    }

    pub fn solver_type(&self) -> CaseResult<SolverType> {
        read_enum(self.doc, &general_path().child("solverType"))
    }

    pub fn is_density_based(&self) -> CaseResult<bool> {
        Ok(self.solver_type()? == SolverType::DensityBased)
    }

    /// Density varies with pressure: compressible flow, or a perfect-gas
    /// density law on any material.
    pub fn is_compressible_density(&self) -> CaseResult<bool> {
        if self.is_compressible()? {
            return Ok(true);
        }
        let materials = MaterialDb::new(self.doc);
        for mid in materials.ids() {
            if materials.density_specification(mid)? == DensitySpecification::PerfectGas {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn operating_pressure(&self) -> CaseResult<f64> {
        self.doc.get_float(&operating_conditions_path().child("pressure"))
    }

    pub fn is_gravity_on(&self) -> CaseResult<bool> {
        self.doc.is_enabled(&gravity_path())
    }

    pub fn gravity(&self) -> CaseResult<Vector3> {
        self.doc.get_vector(&gravity_path())
    }

    pub fn reference_pressure_location(&self) -> CaseResult<Vector3> {
        self.doc
            .get_vector(&operating_conditions_path().child("referencePressureLocation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    #[test]
    fn defaults() {
        let doc = template::new_case().unwrap();
        let g = GeneralDb::new(&doc);
        assert!(!g.is_time_transient().unwrap());
        assert_eq!(g.flow_type().unwrap(), FlowType::Incompressible);
        assert_eq!(g.operating_pressure().unwrap(), 101325.0);
        assert!(!g.is_gravity_on().unwrap());
        assert!(!g.is_compressible_density().unwrap());
        assert_eq!(g.gravity().unwrap().y, -9.81);
    }

    #[test]
    fn perfect_gas_material_makes_density_compressible() {
        let mut doc = template::new_case().unwrap();
        doc.set_value(
            &CasePath::root().children("materials/material/density/specification"),
            "perfectGas",
        )
        .unwrap();
        assert!(GeneralDb::new(&doc).is_compressible_density().unwrap());
    }
}
