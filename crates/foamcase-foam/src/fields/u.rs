//! Velocity, `U`.

use std::f64::consts::PI;

use foamcase_core::db::boundary::{
    BoundaryType, FlowRateInletSpecification, InterfaceMode, VelocityProfile, VelocitySpecification,
    WallVelocityCondition,
};
use foamcase_core::db::general::abl_path;
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::document::Vector3;
use foamcase_core::{CaseError, CaseResult};

use super::*;

pub struct Velocity;

impl FieldGenerator for Velocity {
    fn object(&self) -> &'static str {
        "U"
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        if !region.is_fluid() {
            return Ok(None);
        }

        let mut boundary = FoamDict::new();
        let mut aux = Vec::new();
        for b in &region.boundaries {
            boundary.insert(b.name.clone(), boundary_entry(ctx, region, b, &mut aux)?);
        }

        Ok(Some(field_file(
            ctx,
            region,
            self.object(),
            DataClass::VolVectorField,
            "[0 1 -1 0 0 0 0]",
            region.initial.velocity,
            boundary,
            aux,
        )))
    }
}

fn boundary_entry(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    bref: &BoundaryRef,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let b = ctx.boundary(bref.bcid);
    let initial = region.initial.velocity;

    let entry = match bref.physical_type {
        BoundaryType::VelocityInlet => velocity_inlet(ctx, region, &bref.name, &b, aux)?,
        BoundaryType::FlowRateInlet => flow_rate_inlet(region, &b)?,
        BoundaryType::PressureInlet | BoundaryType::PressureOutlet => {
            typed("pressureInletOutletVelocity").with("value", FoamValue::uniform(initial))
        }
        BoundaryType::AblInlet => abl_inlet(ctx)?,
        BoundaryType::OpenChannelInlet => typed("variableHeightFlowRateInletVelocity")
            .with("alpha", alpha_field(ctx, region)?)
            .with("flowRate", b.float("openChannelInlet/volumeFlowRate")?)
            .with("value", FoamValue::uniform(initial)),
        BoundaryType::OpenChannelOutlet => typed("outletPhaseMeanVelocity")
            .with("alpha", alpha_field(ctx, region)?)
            .with("Umean", b.float("openChannelOutlet/meanVelocity")?)
            .with("value", FoamValue::uniform(initial)),
        BoundaryType::Outflow | BoundaryType::SupersonicOutflow => zero_gradient(),
        BoundaryType::FreeStream => typed("freestreamVelocity")
            .with("freestreamValue", FoamValue::uniform(b.vector("freeStream/streamVelocity")?)),
        BoundaryType::FarFieldRiemann => far_field_riemann(&b, ctx.reader().general().operating_pressure()?)?,
        BoundaryType::SubsonicInlet => subsonic_inlet(&b, ctx.reader().general().operating_pressure()?)?,
        BoundaryType::SubsonicOutflow => subsonic_outflow(&b, ctx.reader().general().operating_pressure()?)?,
        BoundaryType::SupersonicInflow => fixed_value(b.vector("supersonicInflow/velocity")?),
        BoundaryType::Wall => wall(&b)?,
        BoundaryType::ThermoCoupledWall => fixed_value(Vector3::ZERO),
        BoundaryType::Symmetry => symmetry(),
        BoundaryType::Interface => match b.enumeration::<InterfaceMode>("interface/mode")? {
            InterfaceMode::RegionInterface => fixed_value(Vector3::ZERO),
            _ => cyclic_ami(),
        },
        BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => cyclic(),
        BoundaryType::Empty => empty(),
        BoundaryType::Wedge => wedge(),
    };
    Ok(entry)
}

fn velocity_inlet(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    patch: &str,
    b: &BoundaryView<'_>,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let base = "velocityInlet/velocity";
    match b.enumeration::<VelocitySpecification>(&format!("{base}/specification"))? {
        VelocitySpecification::Component => {
            let c = format!("{base}/component");
            match b.enumeration::<VelocityProfile>(&format!("{c}/profile"))? {
                VelocityProfile::Constant => Ok(fixed_value(b.vector(&format!("{c}/constant"))?)),
                VelocityProfile::SpatialDistribution => {
                    let file = b.value(&format!("{c}/spatialDistribution"))?;
                    time_varying_mapped(ctx, region, patch, "U", &file, aux)
                }
                VelocityProfile::TemporalDistribution => uniform_fixed_value(
                    b,
                    &format!("{c}/temporalDistribution/piecewiseLinear"),
                    TableKind::TemporalVector,
                ),
            }
        }
        VelocitySpecification::MagnitudeNormal => {
            let m = format!("{base}/magnitudeNormal");
            match b.enumeration::<VelocityProfile>(&format!("{m}/profile"))? {
                // Positive magnitudes point into the domain, against the face normal.
                VelocityProfile::Constant => Ok(typed("surfaceNormalFixedValue")
                    .with("refValue", FoamValue::uniform(-b.float(&format!("{m}/constant"))?))),
                VelocityProfile::SpatialDistribution => {
                    let file = b.value(&format!("{m}/spatialDistribution"))?;
                    time_varying_mapped(ctx, region, patch, "U", &file, aux)
                }
                VelocityProfile::TemporalDistribution => {
                    uniform_normal_fixed_value(b, &format!("{m}/temporalDistribution/piecewiseLinear"))
                }
            }
        }
    }
}

fn flow_rate_inlet(region: &RegionTopology, b: &BoundaryView<'_>) -> CaseResult<FoamDict> {
    let base = "flowRateInlet/flowRate";
    Ok(match b.enumeration::<FlowRateInletSpecification>(&format!("{base}/specification"))? {
        FlowRateInletSpecification::VolumeFlowRate => typed("flowRateInletVelocity")
            .with("volumetricFlowRate", b.float(&format!("{base}/volumeFlowRate"))?),
        FlowRateInletSpecification::MassFlowRate => typed("flowRateInletVelocity")
            .with("massFlowRate", b.float(&format!("{base}/massFlowRate"))?)
            .with("rhoInlet", region.density),
    })
}

fn abl_inlet(ctx: &GenerationContext<'_>) -> CaseResult<FoamDict> {
    let doc = ctx.doc();
    let abl = abl_path();
    Ok(typed("atmBoundaryLayerInletVelocity")
        .with("flowDir", doc.get_vector(&abl.clone().child("flowDirection"))?)
        .with("zDir", doc.get_vector(&abl.clone().child("groundNormalDirection"))?)
        .with("Uref", doc.get_float(&abl.clone().child("referenceFlowSpeed"))?)
        .with("Zref", doc.get_float(&abl.clone().child("referenceHeight"))?)
        .with("z0", FoamValue::uniform(doc.get_float(&abl.clone().child("surfaceRoughnessLength"))?))
        .with("d", FoamValue::uniform(doc.get_float(&abl.child("minimumZCoordinate"))?)))
}

fn wall(b: &BoundaryView<'_>) -> CaseResult<FoamDict> {
    let base = "wall/velocity";
    Ok(match b.enumeration::<WallVelocityCondition>(&format!("{base}/type"))? {
        WallVelocityCondition::NoSlip | WallVelocityCondition::AtmosphericWall => fixed_value(Vector3::ZERO),
        WallVelocityCondition::Slip => slip(),
        WallVelocityCondition::MovingWall => {
            typed("movingWallVelocity").with("value", FoamValue::uniform(Vector3::ZERO))
        }
        WallVelocityCondition::TranslationalMovingWall => {
            fixed_value(b.vector(&format!("{base}/translationalMovingWall/velocity"))?)
        }
        WallVelocityCondition::RotationalMovingWall => {
            let r = format!("{base}/rotationalMovingWall");
            let rpm = b.float(&format!("{r}/speed"))?;
            typed("rotatingWallVelocity")
                .with("origin", b.vector(&format!("{r}/rotationAxisOrigin"))?)
                .with("axis", b.vector(&format!("{r}/rotationAxisDirection"))?)
                .with("omega", rpm * 2.0 * PI / 60.0)
                .with("value", FoamValue::uniform(Vector3::ZERO))
        }
    })
}

/// `alpha.<material>` of the region's first secondary material.
fn alpha_field(ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<String> {
    let mid = region.secondary_materials.first().ok_or_else(|| {
        CaseError::invariant(format!(
            "open channel boundaries in '{}' need a secondary material",
            region.rname
        ))
    })?;
    Ok(format!("alpha.{}", ctx.reader().materials().name(*mid)?))
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::resources::MemoryResources;

    fn u(doc: &foamcase_core::document::CaseDocument) -> FoamDict {
        patch(&build_with(doc, &MemoryResources::new(), "simpleNFoam", &Velocity).unwrap())
    }

    #[test]
    fn no_slip_wall_is_fixed_zero() {
        let (doc, _) = case_with(BoundaryType::Wall);
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("fixedValue"));
        assert_eq!(entry.get("value").unwrap().to_inline_string(), "uniform (0 0 0)");
    }

    #[test]
    fn constant_component_inlet() {
        let (mut doc, bcid) = case_with(BoundaryType::VelocityInlet);
        set(&mut doc, bcid, "velocityInlet/velocity/component/constant/x", "5");
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("fixedValue"));
        assert_eq!(entry.get("value").unwrap().to_inline_string(), "uniform (5 0 0)");
    }

    #[test]
    fn normal_magnitude_points_inward() {
        let (mut doc, bcid) = case_with(BoundaryType::VelocityInlet);
        set(&mut doc, bcid, "velocityInlet/velocity/specification", "magnitudeNormal");
        set(&mut doc, bcid, "velocityInlet/velocity/magnitudeNormal/constant", "3");
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("surfaceNormalFixedValue"));
        assert_eq!(entry.get("refValue").unwrap().to_inline_string(), "uniform -3");
    }

    #[test]
    fn temporal_component_table() {
        let (mut doc, bcid) = case_with(BoundaryType::VelocityInlet);
        let base = "velocityInlet/velocity/component";
        set(&mut doc, bcid, &format!("{base}/profile"), "temporalDistribution");
        for (axis, v) in [("t", "0 1"), ("x", "0 2"), ("y", "0 0"), ("z", "0 0")] {
            set(&mut doc, bcid, &format!("{base}/temporalDistribution/piecewiseLinear/{axis}"), v);
        }
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("uniformFixedValue"));
        assert_eq!(
            entry.get("uniformValue").unwrap().to_inline_string(),
            "table ((0 (0 0 0)) (1 (2 0 0)))"
        );
    }

    #[test]
    fn mass_flow_rate_carries_inlet_density() {
        let (mut doc, bcid) = case_with(BoundaryType::FlowRateInlet);
        set(&mut doc, bcid, "flowRateInlet/flowRate/specification", "massFlowRate");
        set(&mut doc, bcid, "flowRateInlet/flowRate/massFlowRate", "2.5");
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("flowRateInletVelocity"));
        assert_eq!(entry.get("massFlowRate").and_then(FoamValue::as_float), Some(2.5));
        assert_eq!(entry.get("rhoInlet").and_then(FoamValue::as_float), Some(1.225));
    }

    #[test]
    fn rotating_wall_converts_rpm() {
        let (mut doc, bcid) = case_with(BoundaryType::Wall);
        set(&mut doc, bcid, "wall/velocity/type", "rotationalMovingWall");
        set(&mut doc, bcid, "wall/velocity/rotationalMovingWall/speed", "60");
        let entry = u(&doc);
        assert_eq!(entry.word("type"), Some("rotatingWallVelocity"));
        let omega = entry.get("omega").and_then(FoamValue::as_float).unwrap();
        assert!((omega - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn interface_modes() {
        let (mut doc, bcid) = case_with(BoundaryType::Interface);
        assert_eq!(u(&doc).word("type"), Some("cyclicAMI"));
        set(&mut doc, bcid, "interface/mode", "regionInterface");
        assert_eq!(u(&doc).word("type"), Some("fixedValue"));
    }

    #[test]
    fn open_channel_needs_secondary_material() {
        let (doc, _) = case_with(BoundaryType::OpenChannelInlet);
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(&doc, &res, Default::default(), solver("interNFoam"));
        let region = ctx.region(REGION).unwrap();
        assert!(matches!(Velocity.build(&ctx, &region), Err(CaseError::Invariant(_))));
    }

    #[test]
    fn solid_regions_have_no_velocity() {
        let mut doc = foamcase_core::template::new_case().unwrap();
        let steel = foamcase_core::db::material::add_material(
            &mut doc,
            "steel",
            foamcase_core::db::material::Phase::Solid,
        )
        .unwrap();
        foamcase_core::db::region::add_region(&mut doc, "solid", steel).unwrap();
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(&doc, &res, Default::default(), solver("buoyantSimpleNFoam"));
        let region = ctx.region("solid").unwrap();
        assert!(Velocity.build(&ctx, &region).unwrap().is_none());
    }
}
