//! Boundary entries shared by the transported turbulence quantities
//! (`k`, `epsilon`, `omega`).

use foamcase_core::db::boundary::{
    BoundaryType, InterfaceMode, KEpsilonSpecification, KOmegaSpecification, WallVelocityCondition,
};
use foamcase_core::db::general::abl_path;
use foamcase_core::db::models::TurbulenceModel;
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::{CaseError, CaseResult};

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quantity {
    K,
    Epsilon,
    Omega,
}

/// How the inlet turbulence of one boundary is given.
enum InletSpec {
    /// The quantity itself.
    Direct(f64),
    /// Turbulent intensity (percent) and viscosity ratio.
    IntensityAndRatio { intensity: f64, ratio: f64 },
}

impl Quantity {
    pub(crate) fn object(&self) -> &'static str {
        match self {
            Quantity::K => "k",
            Quantity::Epsilon => "epsilon",
            Quantity::Omega => "omega",
        }
    }

    pub(crate) fn dimensions(&self) -> &'static str {
        match self {
            Quantity::K => "[0 2 -2 0 0 0 0]",
            Quantity::Epsilon => "[0 2 -3 0 0 0 0]",
            Quantity::Omega => "[0 0 -1 0 0 0 0]",
        }
    }

    /// Whether `model` transports this quantity.
    pub(crate) fn solved_by(&self, model: TurbulenceModel) -> bool {
        match self {
            Quantity::K => matches!(model, TurbulenceModel::KEpsilon | TurbulenceModel::KOmega),
            Quantity::Epsilon => model == TurbulenceModel::KEpsilon,
            Quantity::Omega => model == TurbulenceModel::KOmega,
        }
    }

    pub(crate) fn initial(&self, region: &RegionTopology) -> f64 {
        match self {
            Quantity::K => region.initial_k(),
            Quantity::Epsilon => region.initial_epsilon(),
            Quantity::Omega => region.initial_omega(),
        }
    }

    fn inlet_spec(&self, b: &BoundaryView<'_>, model: TurbulenceModel) -> CaseResult<InletSpec> {
        match model {
            TurbulenceModel::KEpsilon => {
                let base = "turbulence/k-epsilon";
                match b.enumeration::<KEpsilonSpecification>(&format!("{base}/specification"))? {
                    KEpsilonSpecification::KAndEpsilon => {
                        let tag = match self {
                            Quantity::K => "turbulentKineticEnergy",
                            _ => "turbulentDissipationRate",
                        };
                        Ok(InletSpec::Direct(b.float(&format!("{base}/{tag}"))?))
                    }
                    KEpsilonSpecification::IntensityAndViscosityRatio => Ok(InletSpec::IntensityAndRatio {
                        intensity: b.float(&format!("{base}/turbulentIntensity"))?,
                        ratio: b.float(&format!("{base}/turbulentViscosityRatio"))?,
                    }),
                }
            }
            TurbulenceModel::KOmega => {
                let base = "turbulence/k-omega";
                match b.enumeration::<KOmegaSpecification>(&format!("{base}/specification"))? {
                    KOmegaSpecification::KAndOmega => {
                        let tag = match self {
                            Quantity::K => "turbulentKineticEnergy",
                            _ => "specificDissipationRate",
                        };
                        Ok(InletSpec::Direct(b.float(&format!("{base}/{tag}"))?))
                    }
                    KOmegaSpecification::IntensityAndViscosityRatio => Ok(InletSpec::IntensityAndRatio {
                        intensity: b.float(&format!("{base}/turbulentIntensity"))?,
                        ratio: b.float(&format!("{base}/turbulentViscosityRatio"))?,
                    }),
                }
            }
            other => Err(CaseError::dispatch(format!(
                "{} has no inlet condition for turbulence model {other}",
                self.object()
            ))),
        }
    }

    fn inlet(&self, b: &BoundaryView<'_>, model: TurbulenceModel, initial: f64) -> CaseResult<FoamDict> {
        Ok(match self.inlet_spec(b, model)? {
            InletSpec::Direct(v) => inlet_outlet(v, initial),
            InletSpec::IntensityAndRatio { intensity, .. } if *self == Quantity::K => {
                typed("turbulentIntensityKineticEnergyInlet")
                    .with("intensity", intensity / 100.0)
                    .with("value", FoamValue::uniform(initial))
            }
            InletSpec::IntensityAndRatio { ratio, .. } => viscosity_ratio_inlet_outlet(ratio, initial),
        })
    }

    fn freestream(&self, b: &BoundaryView<'_>, model: TurbulenceModel, initial: f64) -> CaseResult<FoamDict> {
        match self.inlet_spec(b, model)? {
            InletSpec::Direct(v) => Ok(freestream(v)),
            InletSpec::IntensityAndRatio { .. } => self.inlet(b, model, initial),
        }
    }

    /// k and epsilon follow the atmospheric profile; omega holds the
    /// boundary's own dissipation rate.
    fn abl_inlet(&self, ctx: &GenerationContext<'_>, b: &BoundaryView<'_>, initial: f64) -> CaseResult<FoamDict> {
        let kind = match self {
            Quantity::K => "atmBoundaryLayerInletK",
            Quantity::Epsilon => "atmBoundaryLayerInletEpsilon",
            Quantity::Omega => {
                return Ok(inlet_outlet(b.float("turbulence/k-omega/specificDissipationRate")?, initial));
            }
        };
        let doc = ctx.doc();
        let abl = abl_path();
        Ok(typed(kind)
            .with("flowDir", doc.get_vector(&abl.clone().child("flowDirection"))?)
            .with("zDir", doc.get_vector(&abl.clone().child("groundNormalDirection"))?)
            .with("Uref", doc.get_float(&abl.clone().child("referenceFlowSpeed"))?)
            .with("Zref", doc.get_float(&abl.clone().child("referenceHeight"))?)
            .with("z0", FoamValue::uniform(doc.get_float(&abl.clone().child("surfaceRoughnessLength"))?))
            .with("d", FoamValue::uniform(doc.get_float(&abl.child("minimumZCoordinate"))?)))
    }

    fn wall(&self, ctx: &GenerationContext<'_>, atmospheric: bool, initial: f64) -> CaseResult<FoamDict> {
        let entry = match (self, atmospheric) {
            (Quantity::K, _) => typed("kqRWallFunction"),
            (Quantity::Epsilon, false) => typed("epsilonWallFunction"),
            (Quantity::Omega, false) => typed("omegaBlendedWallFunction"),
            (Quantity::Epsilon, true) | (Quantity::Omega, true) => {
                let doc = ctx.doc();
                let abl = abl_path();
                let kind = if *self == Quantity::Epsilon {
                    "atmEpsilonWallFunction"
                } else {
                    "atmOmegaWallFunction"
                };
                typed(kind)
                    .with("z0", FoamValue::uniform(doc.get_float(&abl.clone().child("surfaceRoughnessLength"))?))
                    .with("d", FoamValue::uniform(doc.get_float(&abl.child("minimumZCoordinate"))?))
            }
        };
        Ok(entry.with("value", FoamValue::uniform(initial)))
    }

    pub(crate) fn boundary_entry(
        &self,
        ctx: &GenerationContext<'_>,
        model: TurbulenceModel,
        initial: f64,
        bref: &BoundaryRef,
    ) -> CaseResult<FoamDict> {
        let b = ctx.boundary(bref.bcid);

        let entry = match bref.physical_type {
            BoundaryType::VelocityInlet
            | BoundaryType::FlowRateInlet
            | BoundaryType::PressureInlet
            | BoundaryType::OpenChannelInlet
            | BoundaryType::FarFieldRiemann
            | BoundaryType::SubsonicInlet
            | BoundaryType::SupersonicInflow => self.inlet(&b, model, initial)?,
            BoundaryType::PressureOutlet => {
                if b.boolean("pressureOutlet/calculatedBackflow")? {
                    self.inlet(&b, model, initial)?
                } else {
                    zero_gradient()
                }
            }
            BoundaryType::AblInlet => self.abl_inlet(ctx, &b, initial)?,
            BoundaryType::FreeStream => self.freestream(&b, model, initial)?,
            BoundaryType::OpenChannelOutlet if *self == Quantity::Omega => self.inlet(&b, model, initial)?,
            BoundaryType::OpenChannelOutlet
            | BoundaryType::Outflow
            | BoundaryType::SubsonicOutflow
            | BoundaryType::SupersonicOutflow => zero_gradient(),
            BoundaryType::Wall => {
                let atmospheric = b.enumeration::<WallVelocityCondition>("wall/velocity/type")?
                    == WallVelocityCondition::AtmosphericWall;
                self.wall(ctx, atmospheric, initial)?
            }
            BoundaryType::ThermoCoupledWall => self.wall(ctx, false, initial)?,
            BoundaryType::Symmetry => symmetry(),
            BoundaryType::Interface => match b.enumeration::<InterfaceMode>("interface/mode")? {
                InterfaceMode::RegionInterface => self.wall(ctx, false, initial)?,
                _ => cyclic_ami(),
            },
            BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => cyclic(),
            BoundaryType::Empty => empty(),
            BoundaryType::Wedge => wedge(),
        };
        Ok(entry)
    }

    /// The whole field file, or `None` when the active model does not solve
    /// for this quantity.
    pub(crate) fn build(
        &self,
        ctx: &GenerationContext<'_>,
        region: &RegionTopology,
    ) -> CaseResult<Option<DictionaryFile>> {
        if !region.is_fluid() {
            return Ok(None);
        }
        let model = ctx.reader().models().turbulence_model()?;
        if !self.solved_by(model) {
            return Ok(None);
        }

        let initial = self.initial(region);
        let mut boundary = FoamDict::new();
        for b in &region.boundaries {
            boundary.insert(b.name.clone(), self.boundary_entry(ctx, model, initial, b)?);
        }

        Ok(Some(field_file(
            ctx,
            region,
            self.object(),
            DataClass::VolScalarField,
            self.dimensions(),
            initial,
            boundary,
            Vec::new(),
        )))
    }
}
