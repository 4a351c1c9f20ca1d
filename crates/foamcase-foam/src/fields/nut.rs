//! Turbulent viscosity, `nut`.

use foamcase_core::db::boundary::{BoundaryType, InterfaceMode, WallVelocityCondition};
use foamcase_core::db::general::abl_path;
use foamcase_core::db::models::{KEpsilonModel, NearWallTreatment, TurbulenceModel};
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::CaseResult;

use super::*;

pub struct TurbulentViscosity;

impl FieldGenerator for TurbulentViscosity {
    fn object(&self) -> &'static str {
        "nut"
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        if !region.is_fluid() || !ctx.reader().models().is_turbulent()? {
            return Ok(None);
        }

        let initial = region.initial_nut();
        let wall_function = wall_function_by_model(ctx)?;
        let mut boundary = FoamDict::new();
        for b in &region.boundaries {
            boundary.insert(b.name.clone(), boundary_entry(ctx, b, wall_function, initial)?);
        }

        Ok(Some(field_file(
            ctx,
            region,
            self.object(),
            DataClass::VolScalarField,
            "[0 2 -1 0 0 0 0]",
            initial,
            boundary,
            Vec::new(),
        )))
    }
}

/// Wall function type for the active model. Only standard wall functions of
/// the k-epsilon family use `nutkWallFunction`; everything else resolves the
/// near-wall profile with Spalding's law.
fn wall_function_by_model(ctx: &GenerationContext<'_>) -> CaseResult<&'static str> {
    let models = ctx.reader().models();
    if models.turbulence_model()? != TurbulenceModel::KEpsilon {
        return Ok("nutSpaldingWallFunction");
    }
    if models.k_epsilon_model()? == KEpsilonModel::Realizable
        && models.near_wall_treatment()? == NearWallTreatment::EnhancedWallTreatment
    {
        return Ok("nutSpaldingWallFunction");
    }
    Ok("nutkWallFunction")
}

fn boundary_entry(
    ctx: &GenerationContext<'_>,
    bref: &BoundaryRef,
    wall_function: &str,
    initial: f64,
) -> CaseResult<FoamDict> {
    let b = ctx.boundary(bref.bcid);
    let by_model = || typed(wall_function).with("value", FoamValue::uniform(initial));

    let entry = match bref.physical_type {
        BoundaryType::VelocityInlet
        | BoundaryType::FlowRateInlet
        | BoundaryType::PressureInlet
        | BoundaryType::AblInlet
        | BoundaryType::OpenChannelInlet
        | BoundaryType::OpenChannelOutlet
        | BoundaryType::FreeStream
        | BoundaryType::FarFieldRiemann
        | BoundaryType::SubsonicInlet
        | BoundaryType::SubsonicOutflow
        | BoundaryType::SupersonicInflow
        | BoundaryType::SupersonicOutflow => calculated(initial),
        BoundaryType::PressureOutlet => {
            if b.boolean("pressureOutlet/calculatedBackflow")? {
                calculated(initial)
            } else {
                zero_gradient()
            }
        }
        BoundaryType::Outflow => zero_gradient(),
        BoundaryType::Wall => {
            if b.enumeration::<WallVelocityCondition>("wall/velocity/type")? == WallVelocityCondition::AtmosphericWall {
                let z0 = ctx.doc().get_float(&abl_path().child("surfaceRoughnessLength"))?;
                typed("atmNutkWallFunction")
                    .with("z0", FoamValue::uniform(z0))
                    .with("value", FoamValue::uniform(initial))
            } else {
                by_model()
            }
        }
        BoundaryType::ThermoCoupledWall => by_model(),
        BoundaryType::Symmetry => symmetry(),
        BoundaryType::Interface => match b.enumeration::<InterfaceMode>("interface/mode")? {
            InterfaceMode::RegionInterface => by_model(),
            _ => cyclic_ami(),
        },
        BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => cyclic(),
        BoundaryType::Empty => empty(),
        BoundaryType::Wedge => wedge(),
    };
    Ok(entry)
}
