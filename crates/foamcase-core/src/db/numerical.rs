//! Numerical conditions: coupling, discretization, relaxation, convergence.

use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath};
use crate::errors::CaseResult;

crate::case_enum! {
    pub enum CouplingScheme ("pressure-velocity coupling scheme") {
        Simple => "SIMPLE",
        Simplec => "SIMPLEC",
    }
}

crate::case_enum! {
    pub enum TimeScheme ("time scheme") {
        FirstOrderImplicit => "firstOrderImplicit",
        SecondOrderImplicit => "secondOrderImplicit",
    }
}

crate::case_enum! {
    pub enum UpwindOrder ("discretization order") {
        FirstOrderUpwind => "firstOrderUpwind",
        SecondOrderUpwind => "secondOrderUpwind",
    }
}

crate::case_enum! {
    pub enum PressureScheme ("pressure scheme") {
        MomentumWeightedReconstruct => "momentumWeightedReconstruct",
        MomentumWeighted => "momentumWeighted",
        Linear => "linear",
    }
}

crate::case_enum! {
    /// Convected quantities with their own discretization order.
    pub enum DiscretizedField ("discretized field") {
        Momentum => "momentum",
        Energy => "energy",
        TurbulentKineticEnergy => "turbulentKineticEnergy",
        VolumeFraction => "volumeFraction",
        Scalar => "scalar",
        Species => "species",
    }
}

crate::case_enum! {
    /// Equations with relaxation factors and convergence criteria.
    pub enum Equation ("equation") {
        Pressure => "pressure",
        Density => "density",
        Momentum => "momentum",
        Energy => "energy",
        Turbulence => "turbulence",
        VolumeFraction => "volumeFraction",
    }
}

pub fn numerical_path() -> CasePath {
    CasePath::root().child("numericalConditions")
}

/// Under-relaxation factors of one equation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxation {
    pub factor: f64,
    /// Factor for the final corrector of a transient step.
    pub final_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub absolute: f64,
    pub relative: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiphaseParameters {
    pub max_iterations_per_time_step: i64,
    pub number_of_correctors: i64,
    pub use_semi_implicit_mules: bool,
    pub phase_interface_compression_factor: f64,
    pub number_of_mules_iterations: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct NumericalDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> NumericalDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn coupling_scheme(&self) -> CaseResult<CouplingScheme> {
        read_enum(self.doc, &numerical_path().child("pressureVelocityCouplingScheme"))
    }

    pub fn time_scheme(&self) -> CaseResult<TimeScheme> {
        read_enum(self.doc, &numerical_path().children("discretizationSchemes/time"))
    }

    pub fn order(&self, field: DiscretizedField) -> CaseResult<UpwindOrder> {
        read_enum(
            self.doc,
            &numerical_path().child("discretizationSchemes").child(field.as_str()),
        )
    }

    pub fn pressure_scheme(&self) -> CaseResult<PressureScheme> {
        read_enum(self.doc, &numerical_path().children("discretizationSchemes/pressure"))
    }

    pub fn relaxation(&self, eq: Equation) -> CaseResult<Relaxation> {
        let base = numerical_path().child("underRelaxationFactors");
        Ok(Relaxation {
            factor: self.doc.get_float(&base.clone().child(eq.as_str()))?,
            final_factor: self.doc.get_float(&base.child(format!("{eq}Final")))?,
        })
    }

    /// High-order term relaxation factor, when enabled.
    pub fn high_order_term_relaxation(&self) -> CaseResult<Option<f64>> {
        let p = numerical_path().child("highOrderTermRelaxation");
        if !self.doc.exists(&p) || !self.doc.is_enabled(&p)? {
            return Ok(None);
        }
        self.doc.get_float(&p.child("relaxationFactor")).map(Some)
    }

    pub fn convergence(&self, eq: Equation) -> CaseResult<Convergence> {
        let base = numerical_path().child("convergenceCriteria").child(eq.as_str());
        Ok(Convergence {
            absolute: self.doc.get_float(&base.clone().child("absolute"))?,
            relative: self.doc.get_float(&base.child("relative"))?,
        })
    }

    pub fn max_iterations_per_time_step(&self) -> CaseResult<i64> {
        self.doc.get_int(&numerical_path().child("maxIterationsPerTimeStep"))
    }

    pub fn number_of_correctors(&self) -> CaseResult<i64> {
        self.doc.get_int(&numerical_path().child("numberOfCorrectors"))
    }

    pub fn multiphase(&self) -> CaseResult<MultiphaseParameters> {
        let base = numerical_path().child("multiphase");
        let p = |tag: &str| base.clone().child(tag);
        Ok(MultiphaseParameters {
            max_iterations_per_time_step: self.doc.get_int(&p("maxIterationsPerTimeStep"))?,
            number_of_correctors: self.doc.get_int(&p("numberOfCorrectors"))?,
            use_semi_implicit_mules: self.doc.get_bool(&p("useSemiImplicitMules"))?,
            phase_interface_compression_factor: self.doc.get_float(&p("phaseInterfaceCompressionFactor"))?,
            number_of_mules_iterations: self.doc.get_int(&p("numberOfMulesIterations"))?,
        })
    }

    /// A density-based solver parameter such as `fluxType`.
    pub fn density_based_parameter(&self, tag: &str) -> CaseResult<String> {
        self.doc
            .get_value(&numerical_path().child("densityBasedSolverParameters").child(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    #[test]
    fn defaults() {
        let doc = template::new_case().unwrap();
        let n = NumericalDb::new(&doc);
        assert_eq!(n.coupling_scheme().unwrap(), CouplingScheme::Simplec);
        assert_eq!(n.time_scheme().unwrap(), TimeScheme::FirstOrderImplicit);
        assert_eq!(n.order(DiscretizedField::Momentum).unwrap(), UpwindOrder::SecondOrderUpwind);
        assert_eq!(n.order(DiscretizedField::TurbulentKineticEnergy).unwrap(), UpwindOrder::FirstOrderUpwind);
        assert_eq!(
            n.relaxation(Equation::Pressure).unwrap(),
            Relaxation { factor: 0.3, final_factor: 1.0 }
        );
        assert_eq!(n.high_order_term_relaxation().unwrap(), None);
        assert_eq!(n.convergence(Equation::VolumeFraction).unwrap().relative, 0.05);
        assert!(n.multiphase().unwrap().use_semi_implicit_mules);
        assert_eq!(n.density_based_parameter("fluxType").unwrap(), "roeFlux");
    }

    #[test]
    fn enabled_high_order_relaxation() {
        let mut doc = template::new_case().unwrap();
        doc.set_attribute(&numerical_path().child("highOrderTermRelaxation"), "disabled", "false")
            .unwrap();
        assert_eq!(NumericalDb::new(&doc).high_order_term_relaxation().unwrap(), Some(0.8));
    }
}
