//! Value rules for case fields.
//!
//! Each rule is keyed by a tag-path suffix pattern (`*` matches any single
//! tag). `Schema::rule_for` walks the rules in order and returns the first
//! match, so specific patterns are listed before general ones. Fields without
//! a rule accept any text.

use thiserror::Error;

use crate::db::boundary::{
    BoundaryType, FlowRateInletSpecification, InterfaceMode, KEpsilonSpecification, KOmegaSpecification,
    SpalartAllmarasSpecification, TemperatureProfile, VelocityProfile, VelocitySpecification, WallTemperature,
    WallVelocityCondition,
};
use crate::db::general::{FlowType, SolverType};
use crate::db::models::{KEpsilonModel, MultiphaseModel, NearWallTreatment, TurbulenceModel};
use crate::db::numerical::{CouplingScheme, PressureScheme, TimeScheme, UpwindOrder};

/// Inclusive or exclusive numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub const fn inclusive(value: f64) -> Self {
        Self { value, inclusive: true }
    }

    pub const fn exclusive(value: f64) -> Self {
        Self { value, inclusive: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueRule {
    Float { min: Option<Bound>, max: Option<Bound> },
    PositiveInt,
    Bool,
    Enum(&'static [&'static str]),
    /// Whitespace separated integer ids.
    IdList,
    Text,
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("does not exist in this case")]
    PathNotFound,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("must be {}", lower_bound(.0))]
    BelowMinimum(Bound),
    #[error("must be {}", upper_bound(.0))]
    AboveMaximum(Bound),
    #[error("must be between {} and {}", fmt_num(.0.value), fmt_num(.1.value))]
    OutOfRange(Bound, Bound),
    #[error("must be a positive integer, got '{0}'")]
    NotPositiveInteger(String),
    #[error("must be true or false, got '{0}'")]
    NotBoolean(String),
    #[error("'{value}' is not one of: {}", join(.allowed))]
    NotInEnum {
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("'{0}' is not a list of ids")]
    NotIdList(String),
}

fn fmt_num(v: f64) -> String {
    format!("{v}")
}

fn lower_bound(b: &Bound) -> String {
    let word = if b.inclusive { "at least" } else { "greater than" };
    format!("{word} {}", fmt_num(b.value))
}

fn upper_bound(b: &Bound) -> String {
    let word = if b.inclusive { "at most" } else { "less than" };
    format!("{word} {}", fmt_num(b.value))
}

fn join(allowed: &[&str]) -> String {
    allowed.join(", ")
}

impl ValueRule {
    pub fn check(&self, value: &str) -> Result<(), Violation> {
        let v = value.trim();
        match self {
            Self::Text => Ok(()),
            Self::Float { min, max } => {
                let x = v
                    .parse::<f64>()
                    .ok()
                    .filter(|x| x.is_finite())
                    .ok_or_else(|| Violation::NotANumber(value.to_string()))?;
                let low_ok = min.map_or(true, |b| if b.inclusive { x >= b.value } else { x > b.value });
                let high_ok = max.map_or(true, |b| if b.inclusive { x <= b.value } else { x < b.value });
                match (low_ok, high_ok, min, max) {
                    (true, true, _, _) => Ok(()),
                    (_, _, Some(lo), Some(hi)) => Err(Violation::OutOfRange(*lo, *hi)),
                    (false, _, Some(lo), None) => Err(Violation::BelowMinimum(*lo)),
                    (_, false, None, Some(hi)) => Err(Violation::AboveMaximum(*hi)),
                    _ => Err(Violation::NotANumber(value.to_string())),
                }
            }
            Self::PositiveInt => match v.parse::<u64>() {
                Ok(n) if n > 0 => Ok(()),
                _ => Err(Violation::NotPositiveInteger(value.to_string())),
            },
            Self::Bool => match v {
                "true" | "false" => Ok(()),
                _ => Err(Violation::NotBoolean(value.to_string())),
            },
            Self::Enum(allowed) => {
                if allowed.contains(&v) {
                    Ok(())
                } else {
                    Err(Violation::NotInEnum {
                        value: value.to_string(),
                        allowed: *allowed,
                    })
                }
            }
            Self::IdList => {
                if v.split_whitespace().all(|t| t.parse::<u64>().is_ok()) {
                    Ok(())
                } else {
                    Err(Violation::NotIdList(value.to_string()))
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaRule {
    pub pattern: &'static [&'static str],
    pub rule: ValueRule,
}

/// Ordered rule table.
#[derive(Debug, Clone)]
pub struct Schema {
    rules: Vec<SchemaRule>,
}

const ANY: ValueRule = ValueRule::Float { min: None, max: None };
const FRACTION: ValueRule = ValueRule::Float {
    min: Some(Bound::inclusive(0.0)),
    max: Some(Bound::inclusive(1.0)),
};
const NON_NEGATIVE: ValueRule = ValueRule::Float {
    min: Some(Bound::inclusive(0.0)),
    max: None,
};
const POSITIVE: ValueRule = ValueRule::Float {
    min: Some(Bound::exclusive(0.0)),
    max: None,
};
const ON_OFF: &[&str] = &["on", "off"];

impl Schema {
    pub fn new(rules: Vec<SchemaRule>) -> Self {
        Self { rules }
    }

    /// Rules for the case layout shipped with this crate.
    pub fn standard() -> Self {
        use ValueRule::*;

        let r = |pattern: &'static [&'static str], rule: ValueRule| SchemaRule { pattern, rule };
        Self::new(vec![
            // general
            r(&["general", "timeTransient"], Bool),
            r(&["general", "solverType"], Enum(SolverType::NAMES)),
            r(&["general", "flowType"], Enum(FlowType::NAMES)),
            r(&["operatingConditions", "pressure"], NON_NEGATIVE),
            r(&["atmosphericBoundaryLayer", "referenceFlowSpeed"], POSITIVE),
            r(&["atmosphericBoundaryLayer", "referenceHeight"], POSITIVE),
            r(&["atmosphericBoundaryLayer", "surfaceRoughnessLength"], POSITIVE),
            // models
            r(&["turbulenceModels", "model"], Enum(TurbulenceModel::NAMES)),
            r(&["turbulenceModels", "k-epsilon", "model"], Enum(KEpsilonModel::NAMES)),
            r(&["nearWallTreatment"], Enum(NearWallTreatment::NAMES)),
            r(&["models", "energyModels"], Enum(ON_OFF)),
            r(&["models", "speciesModels"], Enum(ON_OFF)),
            r(&["multiphaseModels", "model"], Enum(MultiphaseModel::NAMES)),
            // materials
            r(&["material", "molecularWeight"], POSITIVE),
            r(&["density", "constant"], POSITIVE),
            r(&["viscosity", "constant"], POSITIVE),
            r(&["specificHeat", "constant"], POSITIVE),
            r(&["thermalConductivity", "constant"], POSITIVE),
            // regions
            r(&["region", "material"], PositiveInt),
            r(&["region", "secondaryMaterials"], IdList),
            r(&["initialValues", "temperature"], POSITIVE),
            r(&["initialValues", "scaleOfVelocity"], NON_NEGATIVE),
            r(&["initialValues", "turbulentIntensity"], NON_NEGATIVE),
            r(&["initialValues", "turbulentViscosity"], NON_NEGATIVE),
            r(&["initialValues", "pressure"], ANY),
            // boundary conditions
            r(&["boundaryCondition", "physicalType"], Enum(BoundaryType::NAMES)),
            r(&["boundaryCondition", "coupledBoundary"], IdList),
            r(&["velocityInlet", "velocity", "specification"], Enum(VelocitySpecification::NAMES)),
            r(&["velocity", "*", "profile"], Enum(VelocityProfile::NAMES)),
            r(&["flowRate", "specification"], Enum(FlowRateInletSpecification::NAMES)),
            r(&["wall", "velocity", "type"], Enum(WallVelocityCondition::NAMES)),
            r(&["wall", "temperature", "type"], Enum(WallTemperature::NAMES)),
            r(&["wall", "temperature", "temperature"], POSITIVE),
            r(&["wall", "temperature", "freeStreamTemperature"], POSITIVE),
            r(&["interface", "mode"], Enum(InterfaceMode::NAMES)),
            r(&["turbulence", "k-omega", "specification"], Enum(KOmegaSpecification::NAMES)),
            r(&["turbulence", "k-epsilon", "specification"], Enum(KEpsilonSpecification::NAMES)),
            r(
                &["turbulence", "spalartAllmaras", "specification"],
                Enum(SpalartAllmarasSpecification::NAMES),
            ),
            r(&["turbulence", "*", "turbulentIntensity"], NON_NEGATIVE),
            r(&["turbulence", "*", "turbulentViscosityRatio"], NON_NEGATIVE),
            r(&["boundaryCondition", "temperature", "profile"], Enum(TemperatureProfile::NAMES)),
            r(&["boundaryCondition", "temperature", "constant"], POSITIVE),
            r(&["staticTemperature"], POSITIVE),
            r(&["totalTemperature"], POSITIVE),
            r(&["backflowTotalTemperature"], POSITIVE),
            r(&["machNumber"], POSITIVE),
            r(&["porousJump", "*"], NON_NEGATIVE),
            r(&["calculatedBackflow"], Bool),
            r(&["reverseDirection"], Bool),
            // numerical conditions
            r(&["pressureVelocityCouplingScheme"], Enum(CouplingScheme::NAMES)),
            r(&["discretizationSchemes", "time"], Enum(TimeScheme::NAMES)),
            r(&["discretizationSchemes", "pressure"], Enum(PressureScheme::NAMES)),
            r(&["discretizationSchemes", "*"], Enum(UpwindOrder::NAMES)),
            r(&["underRelaxationFactors", "*"], FRACTION),
            r(&["highOrderTermRelaxation", "relaxationFactor"], FRACTION),
            r(&["convergenceCriteria", "*", "absolute"], NON_NEGATIVE),
            r(&["convergenceCriteria", "*", "relative"], NON_NEGATIVE),
            r(&["multiphase", "useSemiImplicitMules"], Bool),
            r(&["multiphase", "phaseInterfaceCompressionFactor"], NON_NEGATIVE),
            r(&["maxIterationsPerTimeStep"], PositiveInt),
            r(&["numberOfCorrectors"], PositiveInt),
            r(&["numberOfMulesIterations"], PositiveInt),
            // run conditions and monitors
            r(&["runConditions", "numberOfIterations"], PositiveInt),
            r(&["runConditions", "timeStepSize"], POSITIVE),
            r(&["runConditions", "endTime"], POSITIVE),
            r(&["runConditions", "maxCourantNumber"], POSITIVE),
            r(&["runConditions", "VoFMaxCourantNumber"], POSITIVE),
            r(&["runConditions", "reportIntervalSteps"], PositiveInt),
            r(&["parallel", "numberOfCores"], PositiveInt),
            r(&["showChart"], Bool),
            r(&["writeInterval"], PositiveInt),
            // vector components anywhere
            r(&["x"], ANY),
            r(&["y"], ANY),
            r(&["z"], ANY),
        ])
    }

    /// Rule for a node given its tag chain from the root.
    pub fn rule_for(&self, chain: &[&str]) -> &ValueRule {
        self.rules
            .iter()
            .find(|r| suffix_matches(r.pattern, chain))
            .map(|r| &r.rule)
            .unwrap_or(&ValueRule::Text)
    }

    pub fn check(&self, chain: &[&str], value: &str) -> Result<(), Violation> {
        self.rule_for(chain).check(value)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}

fn suffix_matches(pattern: &[&str], chain: &[&str]) -> bool {
    if pattern.len() > chain.len() {
        return false;
    }
    let tail = &chain[chain.len() - pattern.len()..];
    pattern.iter().zip(tail).all(|(p, t)| *p == "*" || p == t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxation_factor_range() {
        let s = Schema::standard();
        let chain = ["configuration", "numericalConditions", "underRelaxationFactors", "pressure"];
        assert!(s.check(&chain, "0.3").is_ok());
        let e = s.check(&chain, "2.5").unwrap_err();
        assert_eq!(e.to_string(), "must be between 0 and 1");
        assert_eq!(s.check(&chain, "abc").unwrap_err(), Violation::NotANumber("abc".into()));
    }

    #[test]
    fn specific_rule_wins_over_wildcard() {
        let s = Schema::standard();
        let chain = ["numericalConditions", "discretizationSchemes", "time"];
        assert!(s.check(&chain, "secondOrderImplicit").is_ok());
        assert!(s.check(&chain, "secondOrderUpwind").is_err());
        let chain = ["numericalConditions", "discretizationSchemes", "momentum"];
        assert!(s.check(&chain, "secondOrderUpwind").is_ok());
    }

    #[test]
    fn unknown_fields_are_text() {
        let s = Schema::standard();
        assert_eq!(s.rule_for(&["materials", "material", "name"]), &ValueRule::Text);
    }

    #[test]
    fn positive_int_and_bool() {
        assert!(ValueRule::PositiveInt.check("0").is_err());
        assert!(ValueRule::PositiveInt.check("3").is_ok());
        assert!(ValueRule::Bool.check("yes").is_err());
        assert!(ValueRule::IdList.check("1 2 3").is_ok());
        assert!(ValueRule::IdList.check("1 x").is_err());
    }

    #[test]
    fn one_sided_bounds_report_direction() {
        assert_eq!(POSITIVE.check("0").unwrap_err().to_string(), "must be greater than 0");
        assert_eq!(NON_NEGATIVE.check("-1").unwrap_err().to_string(), "must be at least 0");
    }
}
