//! Initial field files (`0/<region>/<field>`).
//!
//! Each generator is a pure function of the region topology, the case
//! document and the solver capability. Boundary entries are chosen by an
//! exhaustive `match` on `BoundaryType`, with a second-level match where the
//! physical type has sub-modes (wall velocity, interface mode, turbulence
//! specification, profiles).
//!
//! This module holds the boundary-entry constructors shared by all fields.

use std::fmt::Write as _;
use std::path::PathBuf;

use foamcase_core::db::boundary::FarFieldDirectionSpecification;
use foamcase_core::document::Vector3;
use foamcase_core::{CaseError, CaseResult};

use crate::context::{BoundaryView, GenerationContext, RegionTopology};
use crate::dictionary::{AuxiliaryFile, DataClass, DictionaryFile, FoamDict, FoamValue};

pub mod epsilon;
pub mod k;
pub mod nut;
pub mod omega;
pub mod p;
pub mod t;
mod turbulence;
pub mod u;

pub use epsilon::DissipationRate;
pub use k::TurbulentKineticEnergy;
pub use nut::TurbulentViscosity;
pub use omega::SpecificDissipationRate;
pub use p::{Pressure, PressureField};
pub use t::Temperature;
pub use u::Velocity;

/// One field file generator.
pub trait FieldGenerator {
    /// Object name of the file, e.g. `"U"`.
    fn object(&self) -> &'static str;

    /// `None` when the field is not written for this region and solver.
    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>>;
}

/// Every field generator, in write order.
pub fn standard_fields() -> Vec<Box<dyn FieldGenerator>> {
    vec![
        Box::new(Velocity),
        Box::new(Pressure::new(PressureField::P)),
        Box::new(Pressure::new(PressureField::PRgh)),
        Box::new(Temperature),
        Box::new(TurbulentKineticEnergy),
        Box::new(DissipationRate),
        Box::new(SpecificDissipationRate),
        Box::new(TurbulentViscosity),
    ]
}

/// Assemble the field file from its parts.
#[allow(clippy::too_many_arguments)]
pub(crate) fn field_file(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    object: &str,
    class: DataClass,
    dimensions: &str,
    internal: impl Into<FoamValue>,
    boundary: FoamDict,
    auxiliary: Vec<AuxiliaryFile>,
) -> DictionaryFile {
    let data = FoamDict::new()
        .with("dimensions", dimensions)
        .with("internalField", FoamValue::uniform(internal))
        .with("boundaryField", boundary);
    let mut file = DictionaryFile::new(class, region.location("0"), object, data);
    if ctx.config().write_auxiliary {
        file.auxiliary = auxiliary;
    }
    file
}

pub(crate) fn typed(t: &str) -> FoamDict {
    FoamDict::new().with("type", t)
}

pub(crate) fn fixed_value(v: impl Into<FoamValue>) -> FoamDict {
    typed("fixedValue").with("value", FoamValue::uniform(v))
}

pub(crate) fn zero_gradient() -> FoamDict {
    typed("zeroGradient")
}

pub(crate) fn calculated(initial: impl Into<FoamValue>) -> FoamDict {
    typed("calculated").with("value", FoamValue::uniform(initial))
}

pub(crate) fn slip() -> FoamDict {
    typed("slip")
}

pub(crate) fn symmetry() -> FoamDict {
    typed("symmetry")
}

pub(crate) fn cyclic() -> FoamDict {
    typed("cyclic")
}

pub(crate) fn cyclic_ami() -> FoamDict {
    typed("cyclicAMI")
}

pub(crate) fn empty() -> FoamDict {
    typed("empty")
}

pub(crate) fn wedge() -> FoamDict {
    typed("wedge")
}

pub(crate) fn inlet_outlet(inlet: impl Into<FoamValue>, initial: impl Into<FoamValue>) -> FoamDict {
    typed("inletOutlet")
        .with("inletValue", FoamValue::uniform(inlet))
        .with("value", FoamValue::uniform(initial))
}

pub(crate) fn freestream(value: impl Into<FoamValue>) -> FoamDict {
    typed("freestream").with("freestreamValue", FoamValue::uniform(value))
}

/// Turbulence inlet derived from a viscosity ratio.
pub(crate) fn viscosity_ratio_inlet_outlet(ratio: f64, initial: f64) -> FoamDict {
    typed("viscosityRatioInletOutletTDR")
        .with("viscosityRatio", FoamValue::uniform(ratio))
        .with("value", FoamValue::uniform(initial))
}

/// Free-stream direction of a far-field boundary. With angles of attack
/// (`alpha`, about the side axis) and sideslip (`beta`, about the lift axis),
/// the direction is rotated away from the drag axis.
pub(crate) fn far_field_direction(b: &BoundaryView<'_>) -> CaseResult<Vector3> {
    let base = "farFieldRiemann/flowDirection";
    let drag = b.vector(&format!("{base}/dragDirection"))?.normalized();
    match b.enumeration::<FarFieldDirectionSpecification>(&format!("{base}/specificationMethod"))? {
        FarFieldDirectionSpecification::Direct => Ok(drag),
        FarFieldDirectionSpecification::AoaAos => {
            let lift = b.vector(&format!("{base}/liftDirection"))?.normalized();
            let side = lift.cross(drag).normalized();
            let alpha = b.float(&format!("{base}/angleOfAttack"))?.to_radians();
            let beta = b.float(&format!("{base}/angleOfSideslip"))?.to_radians();
            Ok(drag
                .scaled(alpha.cos() * beta.cos())
                .add(lift.scaled(alpha.sin()))
                .add(side.scaled(alpha.cos() * beta.sin()))
                .normalized())
        }
    }
}

/// Characteristic far-field condition; `operating` is added to the stored
/// gauge pressure.
pub(crate) fn far_field_riemann(b: &BoundaryView<'_>, operating: f64) -> CaseResult<FoamDict> {
    Ok(typed("farfieldRiemann")
        .with("flowDir", far_field_direction(b)?)
        .with("MInf", b.float("farFieldRiemann/machNumber")?)
        .with("pInf", operating + b.float("farFieldRiemann/staticPressure")?)
        .with("TInf", b.float("farFieldRiemann/staticTemperature")?)
        .with("value", FoamValue::uniform(Vector3::ZERO)))
}

pub(crate) fn subsonic_inlet(b: &BoundaryView<'_>, operating: f64) -> CaseResult<FoamDict> {
    Ok(typed("subsonicInlet")
        .with("flowDir", b.vector("subsonicInlet/flowDirection")?.normalized())
        .with("p0", operating + b.float("subsonicInlet/totalPressure")?)
        .with("T0", b.float("subsonicInlet/totalTemperature")?))
}

pub(crate) fn subsonic_outflow(b: &BoundaryView<'_>, operating: f64) -> CaseResult<FoamDict> {
    Ok(typed("subsonicOutflow").with("pExit", operating + b.float("subsonicOutflow/staticPressure")?))
}

/// Stored layouts of tabulated boundary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableKind {
    /// `t`, `v` lists.
    TemporalScalar,
    /// `t`, `x`, `y`, `z` lists.
    TemporalVector,
    /// Coefficients of a polynomial in time, lowest order first.
    Polynomial,
}

fn same_length(b: &BoundaryView<'_>, rel: &str, lists: &[&Vec<f64>]) -> CaseResult<()> {
    let n = lists.first().map(|l| l.len()).unwrap_or(0);
    if lists.iter().any(|l| l.len() != n) {
        return Err(CaseError::invalid_argument(format!(
            "{}: table columns differ in length",
            b.path(rel)
        )));
    }
    Ok(())
}

/// `table (...)` or `polynomial (...)` read from `rel`.
pub(crate) fn table_value(b: &BoundaryView<'_>, rel: &str, kind: TableKind, sign: f64) -> CaseResult<FoamValue> {
    match kind {
        TableKind::TemporalScalar => {
            let t = b.floats(&format!("{rel}/t"))?;
            let v = b.floats(&format!("{rel}/v"))?;
            same_length(b, rel, &[&t, &v])?;
            let rows = t
                .iter()
                .zip(&v)
                .map(|(t, v)| FoamValue::list([*t, sign * v]));
            Ok(FoamValue::tagged("table", FoamValue::list(rows)))
        }
        TableKind::TemporalVector => {
            let t = b.floats(&format!("{rel}/t"))?;
            let x = b.floats(&format!("{rel}/x"))?;
            let y = b.floats(&format!("{rel}/y"))?;
            let z = b.floats(&format!("{rel}/z"))?;
            same_length(b, rel, &[&t, &x, &y, &z])?;
            let rows = (0..t.len()).map(|i| {
                FoamValue::list([
                    FoamValue::Float(t[i]),
                    FoamValue::Vector(Vector3::new(x[i], y[i], z[i]).scaled(sign)),
                ])
            });
            Ok(FoamValue::tagged("table", FoamValue::list(rows)))
        }
        TableKind::Polynomial => {
            let coeffs = b.floats(rel)?;
            let terms = coeffs
                .iter()
                .enumerate()
                .map(|(i, c)| FoamValue::list([FoamValue::Float(sign * c), FoamValue::from(i)]));
            Ok(FoamValue::tagged("polynomial", FoamValue::list(terms)))
        }
    }
}

pub(crate) fn uniform_fixed_value(b: &BoundaryView<'_>, rel: &str, kind: TableKind) -> CaseResult<FoamDict> {
    Ok(typed("uniformFixedValue").with("uniformValue", table_value(b, rel, kind, 1.0)?))
}

/// Normal velocity table; positive magnitudes point into the domain.
pub(crate) fn uniform_normal_fixed_value(b: &BoundaryView<'_>, rel: &str) -> CaseResult<FoamDict> {
    Ok(typed("uniformNormalFixedValue")
        .with("uniformValue", table_value(b, rel, TableKind::TemporalScalar, -1.0)?))
}

/// Spatially distributed values mapped from `boundaryData`. The referenced
/// table has point coordinates in its first three columns and one or three
/// value columns.
pub(crate) fn time_varying_mapped(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    patch: &str,
    field: &str,
    file_name: &str,
    aux: &mut Vec<AuxiliaryFile>,
) -> CaseResult<FoamDict> {
    let table = ctx.resources().table(file_name)?;
    let width = table.columns();
    if table.is_empty() || !(width == 4 || width == 6) {
        return Err(CaseError::resource(format!(
            "{file_name}: expected x, y, z and 1 or 3 value columns"
        )));
    }

    let dir = PathBuf::from(region.location("constant")).join("boundaryData").join(patch);
    let points = table.rows.iter().map(|r| Vector3::new(r[0], r[1], r[2]));
    aux.push(AuxiliaryFile {
        path: dir.join("points"),
        contents: list_file(points.map(FoamValue::Vector)),
    });
    let values = table.rows.iter().map(|r| {
        if width == 6 {
            FoamValue::Vector(Vector3::new(r[3], r[4], r[5]))
        } else {
            FoamValue::Float(r[3])
        }
    });
    aux.push(AuxiliaryFile {
        path: dir.join("0").join(field),
        contents: list_file(values),
    });

    Ok(typed("timeVaryingMappedFixedValue").with("setAverage", false))
}

/// Counted list, one item per line.
fn list_file(items: impl Iterator<Item = FoamValue>) -> String {
    let items: Vec<FoamValue> = items.collect();
    let mut out = format!("{}\n(\n", items.len());
    for item in &items {
        let _ = writeln!(out, "{}", item.to_inline_string());
    }
    out.push_str(")\n");
    out
}

#[cfg(test)]
pub(crate) mod testing {
    //! Case builders shared by the field tests.

    use foamcase_core::db::boundary::{add_boundary_condition, BoundaryType};
    use foamcase_core::db::region::add_region;
    use foamcase_core::document::{CaseDocument, CasePath};
    use foamcase_core::template;

    use crate::capability::{SelectedSolver, SolverCatalog};
    use crate::config::GenerationConfig;
    use crate::context::{GenerationContext, RegionTopology};
    use crate::dictionary::{FoamDict, FoamValue};
    use crate::fields::FieldGenerator;
    use crate::resources::FileResources;

    pub const REGION: &str = "fluid";
    pub const PATCH: &str = "b1";

    /// One fluid region with a single boundary of type `t`.
    pub fn case_with(t: BoundaryType) -> (CaseDocument, u64) {
        let mut doc = template::new_case().unwrap();
        add_region(&mut doc, REGION, 1).unwrap();
        let bcid = add_boundary_condition(&mut doc, REGION, PATCH, t).unwrap();
        (doc, bcid)
    }

    pub fn set(doc: &mut CaseDocument, bcid: u64, rel: &str, value: &str) {
        let p = foamcase_core::db::boundary::boundary_path(bcid).children(rel);
        doc.set_value(&p, value).unwrap();
    }

    pub fn set_root(doc: &mut CaseDocument, path: &str, value: &str) {
        doc.set_value(&CasePath::root().children(path), value).unwrap();
    }

    pub fn solver(name: &str) -> SelectedSolver {
        SelectedSolver {
            name: name.to_string(),
            capability: SolverCatalog::standard().capability(name).unwrap(),
        }
    }

    /// Build `gen` for the test region and return the whole file data.
    pub fn build_with(
        doc: &CaseDocument,
        res: &dyn FileResources,
        solver_name: &str,
        gen: &dyn FieldGenerator,
    ) -> Option<crate::dictionary::DictionaryFile> {
        let ctx = GenerationContext::with_solver(doc, res, GenerationConfig::default(), solver(solver_name));
        let region = RegionTopology::load(ctx.reader(), REGION).unwrap();
        gen.build(&ctx, &region).unwrap()
    }

    /// The boundary entry of the test patch.
    pub fn patch(file: &crate::dictionary::DictionaryFile) -> FoamDict {
        file.data
            .lookup(&format!("boundaryField/{PATCH}"))
            .and_then(FoamValue::as_dict)
            .cloned()
            .unwrap()
    }
}
