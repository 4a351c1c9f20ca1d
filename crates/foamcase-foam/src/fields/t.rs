//! Temperature, `T`.
//!
//! Written for every region. Without the energy equation, total-temperature
//! conditions use a heat capacity ratio of 1.

use foamcase_core::db::boundary::{
    BoundaryType, FlowRateInletSpecification, InterfaceMode, TemperatureProfile, TemperatureTemporalDistribution,
    WallTemperature, WallVelocityCondition,
};
use foamcase_core::db::material::UNIVERSAL_GAS_CONSTANT;
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::CaseResult;

use super::*;

pub struct Temperature;

impl FieldGenerator for Temperature {
    fn object(&self) -> &'static str {
        "T"
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        let energy = ctx.reader().models().is_energy_model_on()?;
        let mut boundary = FoamDict::new();
        let mut aux = Vec::new();
        for b in &region.boundaries {
            boundary.insert(b.name.clone(), boundary_entry(ctx, region, b, energy, &mut aux)?);
        }

        Ok(Some(field_file(
            ctx,
            region,
            self.object(),
            DataClass::VolScalarField,
            "[0 0 0 1 0 0 0]",
            region.initial.temperature,
            boundary,
            aux,
        )))
    }
}

/// cp / cv of the region material as an ideal gas at `t`, or 1 when the
/// energy equation is off.
fn heat_capacity_ratio(ctx: &GenerationContext<'_>, region: &RegionTopology, energy: bool, t: f64) -> CaseResult<f64> {
    if !energy || !region.is_fluid() {
        return Ok(1.0);
    }
    let materials = ctx.reader().materials();
    let cp = materials.specific_heat(region.mid, t)?;
    let mw = materials.molecular_weight(region.mid)?;
    Ok(cp / (cp - UNIVERSAL_GAS_CONSTANT / mw))
}

fn boundary_entry(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    bref: &BoundaryRef,
    energy: bool,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let b = ctx.boundary(bref.bcid);

    // A non-constant profile overrides the physical type.
    match b.enumeration::<TemperatureProfile>("temperature/profile")? {
        TemperatureProfile::Constant => {}
        TemperatureProfile::SpatialDistribution => {
            let file = b.value("temperature/spatialDistribution")?;
            return time_varying_mapped(ctx, region, &bref.name, "T", &file, aux);
        }
        TemperatureProfile::TemporalDistribution => {
            let base = "temperature/temporalDistribution";
            return match b.enumeration::<TemperatureTemporalDistribution>(&format!("{base}/specification"))? {
                TemperatureTemporalDistribution::PiecewiseLinear => {
                    uniform_fixed_value(&b, &format!("{base}/piecewiseLinear"), TableKind::TemporalScalar)
                }
                TemperatureTemporalDistribution::Polynomial => {
                    uniform_fixed_value(&b, &format!("{base}/polynomial"), TableKind::Polynomial)
                }
            };
        }
    }

    let constant = || b.float("temperature/constant");
    let initial = region.initial.temperature;
    let op = ctx.reader().general().operating_pressure()?;
    let total_temperature = |t0: f64| -> CaseResult<FoamDict> {
        let gamma = heat_capacity_ratio(ctx, region, energy, t0)?;
        Ok(typed("inletOutletTotalTemperature")
            .with("gamma", gamma)
            .with("inletValue", FoamValue::uniform(t0))
            .with("T0", FoamValue::uniform(t0)))
    };

    let entry = match bref.physical_type {
        BoundaryType::VelocityInlet | BoundaryType::AblInlet | BoundaryType::OpenChannelInlet => {
            fixed_value(constant()?)
        }
        BoundaryType::FlowRateInlet => {
            match b.enumeration::<FlowRateInletSpecification>("flowRateInlet/flowRate/specification")? {
                FlowRateInletSpecification::VolumeFlowRate => fixed_value(constant()?),
                FlowRateInletSpecification::MassFlowRate => total_temperature(constant()?)?,
            }
        }
        BoundaryType::PressureInlet => total_temperature(constant()?)?,
        BoundaryType::PressureOutlet => {
            if b.boolean("pressureOutlet/calculatedBackflow")? {
                total_temperature(b.float("pressureOutlet/backflowTotalTemperature")?)?
            } else {
                zero_gradient()
            }
        }
        BoundaryType::OpenChannelOutlet | BoundaryType::Outflow | BoundaryType::SupersonicOutflow => {
            zero_gradient()
        }
        BoundaryType::FreeStream => freestream(constant()?),
        BoundaryType::FarFieldRiemann => far_field_riemann(&b, op)?,
        BoundaryType::SubsonicInlet => subsonic_inlet(&b, op)?,
        BoundaryType::SubsonicOutflow => subsonic_outflow(&b, op)?,
        BoundaryType::SupersonicInflow => fixed_value(b.float("supersonicInflow/staticTemperature")?),
        BoundaryType::Wall => wall(region, &b, initial)?,
        BoundaryType::ThermoCoupledWall => coupled_baffle(region, initial),
        BoundaryType::Symmetry => symmetry(),
        BoundaryType::Interface => match b.enumeration::<InterfaceMode>("interface/mode")? {
            InterfaceMode::RegionInterface => coupled_baffle(region, initial),
            _ => cyclic_ami(),
        },
        BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => cyclic(),
        BoundaryType::Empty => empty(),
        BoundaryType::Wedge => wedge(),
    };
    Ok(entry)
}

fn kappa_method(region: &RegionTopology) -> &'static str {
    if region.is_fluid() {
        "fluidThermo"
    } else {
        "solidThermo"
    }
}

fn wall(region: &RegionTopology, b: &BoundaryView<'_>, initial: f64) -> CaseResult<FoamDict> {
    if b.enumeration::<WallVelocityCondition>("wall/velocity/type")? == WallVelocityCondition::AtmosphericWall {
        return Ok(fixed_value(b.float("temperature/constant")?));
    }

    let base = "wall/temperature";
    Ok(match b.enumeration::<WallTemperature>(&format!("{base}/type"))? {
        WallTemperature::Adiabatic => zero_gradient(),
        WallTemperature::ConstantTemperature => fixed_value(b.float(&format!("{base}/temperature"))?),
        WallTemperature::ConstantHeatFlux => typed("externalWallHeatFluxTemperature")
            .with("mode", "flux")
            .with("q", FoamValue::uniform(b.float(&format!("{base}/heatFlux"))?))
            .with("kappaMethod", kappa_method(region))
            .with("value", FoamValue::uniform(initial)),
        WallTemperature::Convection => typed("externalWallHeatFluxTemperature")
            .with("mode", "coefficient")
            .with("h", FoamValue::uniform(b.float(&format!("{base}/heatTransferCoefficient"))?))
            .with("Ta", FoamValue::uniform(b.float(&format!("{base}/freeStreamTemperature"))?))
            .with("kappaMethod", kappa_method(region))
            .with("value", FoamValue::uniform(initial)),
    })
}

fn coupled_baffle(region: &RegionTopology, initial: f64) -> FoamDict {
    typed("compressible::turbulentTemperatureCoupledBaffleMixed")
        .with("Tnbr", "T")
        .with("kappaMethod", kappa_method(region))
        .with("value", FoamValue::uniform(initial))
}
