//! Pressure, `p` and `p_rgh`.
//!
//! Stored pressures are gauge values. Written values add the operating
//! pressure, except in `p_rgh` for solvers that keep it as gauge pressure.
//! When the solver works on `p_rgh`, `p` is derived by the solver and every
//! non-constraint patch is written as `calculated`.

use std::path::PathBuf;

use foamcase_core::db::boundary::{BoundaryType, InterfaceMode};
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::CaseResult;

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureField {
    P,
    PRgh,
}

impl PressureField {
    pub fn object(&self) -> &'static str {
        match self {
            PressureField::P => "p",
            PressureField::PRgh => "p_rgh",
        }
    }
}

pub struct Pressure {
    field: PressureField,
}

impl Pressure {
    pub fn new(field: PressureField) -> Self {
        Self { field }
    }
}

impl FieldGenerator for Pressure {
    fn object(&self) -> &'static str {
        self.field.object()
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        let cap = ctx.capability();
        if self.field == PressureField::PRgh && !cap.use_prgh {
            return Ok(None);
        }

        let operating = if self.field == PressureField::PRgh && cap.use_gauge_pressure_in_prgh {
            0.0
        } else {
            ctx.reader().general().operating_pressure()?
        };
        let scope = Scope {
            operating,
            initial: region.initial.pressure + operating,
        };
        let derived = self.field == PressureField::P && cap.use_prgh;

        let mut boundary = FoamDict::new();
        let mut aux = Vec::new();
        for b in &region.boundaries {
            let entry = if derived {
                derived_entry(ctx, b, &scope)?
            } else {
                boundary_entry(ctx, b, &scope, &mut aux)?
            };
            boundary.insert(b.name.clone(), entry);
        }

        Ok(Some(field_file(
            ctx,
            region,
            self.object(),
            DataClass::VolScalarField,
            "[1 -1 -2 0 0 0 0]",
            scope.initial,
            boundary,
            aux,
        )))
    }
}

struct Scope {
    operating: f64,
    initial: f64,
}

/// Entry of `p` when the solver derives it from `p_rgh`.
fn derived_entry(ctx: &GenerationContext<'_>, bref: &BoundaryRef, scope: &Scope) -> CaseResult<FoamDict> {
    Ok(match bref.physical_type {
        BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => cyclic(),
        BoundaryType::Symmetry => symmetry(),
        BoundaryType::Interface => match ctx.boundary(bref.bcid).enumeration::<InterfaceMode>("interface/mode")? {
            InterfaceMode::RegionInterface => calculated(scope.initial),
            _ => cyclic_ami(),
        },
        BoundaryType::Empty => empty(),
        BoundaryType::Wedge => wedge(),
        BoundaryType::VelocityInlet
        | BoundaryType::FlowRateInlet
        | BoundaryType::PressureInlet
        | BoundaryType::AblInlet
        | BoundaryType::OpenChannelInlet
        | BoundaryType::FreeStream
        | BoundaryType::FarFieldRiemann
        | BoundaryType::SubsonicInlet
        | BoundaryType::SupersonicInflow
        | BoundaryType::PressureOutlet
        | BoundaryType::OpenChannelOutlet
        | BoundaryType::Outflow
        | BoundaryType::SubsonicOutflow
        | BoundaryType::SupersonicOutflow
        | BoundaryType::Wall
        | BoundaryType::ThermoCoupledWall => calculated(scope.initial),
    })
}

fn boundary_entry(
    ctx: &GenerationContext<'_>,
    bref: &BoundaryRef,
    scope: &Scope,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let b = ctx.boundary(bref.bcid);
    let op = scope.operating;

    let entry = match bref.physical_type {
        BoundaryType::VelocityInlet
        | BoundaryType::FlowRateInlet
        | BoundaryType::AblInlet
        | BoundaryType::OpenChannelInlet
        | BoundaryType::OpenChannelOutlet
        | BoundaryType::Outflow
        | BoundaryType::SupersonicOutflow => zero_gradient(),
        BoundaryType::PressureInlet => total_pressure(op + b.float("pressureInlet/pressure")?),
        BoundaryType::PressureOutlet => total_pressure(op + b.float("pressureOutlet/totalPressure")?),
        BoundaryType::FreeStream => typed("freestreamPressure")
            .with("freestreamValue", FoamValue::uniform(op + b.float("freeStream/pressure")?)),
        BoundaryType::FarFieldRiemann => far_field_riemann(&b, op)?,
        BoundaryType::SubsonicInlet => subsonic_inlet(&b, op)?,
        BoundaryType::SubsonicOutflow => subsonic_outflow(&b, op)?,
        BoundaryType::SupersonicInflow => fixed_value(op + b.float("supersonicInflow/staticPressure")?),
        BoundaryType::Wall => {
            if ctx.reader().general().is_compressible_density()? {
                zero_gradient()
            } else {
                fixed_flux_pressure()
            }
        }
        BoundaryType::ThermoCoupledWall => fixed_flux_pressure(),
        BoundaryType::Symmetry => symmetry(),
        BoundaryType::Interface => match b.enumeration::<InterfaceMode>("interface/mode")? {
            InterfaceMode::RegionInterface => fixed_flux_pressure(),
            _ => cyclic_ami(),
        },
        BoundaryType::PorousJump => typed("porousBafflePressure")
            .with("patchType", "cyclic")
            .with("D", b.float("porousJump/darcyCoefficient")?)
            .with("I", b.float("porousJump/inertialCoefficient")?)
            .with("length", b.float("porousJump/porousMediaThickness")?)
            .with("value", FoamValue::uniform(scope.initial)),
        BoundaryType::Fan => fan(ctx, &b, scope, aux)?,
        BoundaryType::Empty => empty(),
        BoundaryType::Cyclic => cyclic(),
        BoundaryType::Wedge => wedge(),
    };
    Ok(entry)
}

fn total_pressure(p0: f64) -> FoamDict {
    typed("totalPressure").with("p0", FoamValue::uniform(p0))
}

fn fixed_flux_pressure() -> FoamDict {
    typed("fixedFluxPressure")
}

/// Pressure jump across a fan, tabulated against flow rate. The fan curve is
/// copied to `constant/UvsPressure<bcid>`.
fn fan(
    ctx: &GenerationContext<'_>,
    b: &BoundaryView<'_>,
    scope: &Scope,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let table = ctx.resources().table(&b.value("fan/fanCurveFile")?)?;
    let file_name = format!("UvsPressure{}", b.bcid());
    aux.push(AuxiliaryFile {
        path: PathBuf::from("constant").join(&file_name),
        contents: table.to_csv()?,
    });

    let coeffs = FoamDict::new()
        .with("nHeaderLine", 0)
        .with("refColumn", 0)
        .with("componentColumns", FoamValue::list([1]))
        .with("separator", "\",\"")
        .with("mergeSeparators", "no")
        .with("file", format!("<constant>/{file_name}"));

    Ok(typed("fan")
        .with("patchType", "cyclic")
        .with("jumpTable", "csvFile")
        .with("jumpTableCoeffs", coeffs)
        .with("value", FoamValue::uniform(scope.initial)))
}
