//! Monitors and the solver field names they sample.

use crate::db::cascade::{CascadeHandler, EntityKind};
use crate::db::material::{MaterialDb, MaterialType};
use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath, Element, Vector3};
use crate::errors::{CaseError, CaseResult};

crate::case_enum! {
    pub enum MonitorField ("monitor field") {
        Pressure => "pressure",
        Speed => "speed",
        XVelocity => "xVelocity",
        YVelocity => "yVelocity",
        ZVelocity => "zVelocity",
        TurbulentKineticEnergy => "turbulentKineticEnergy",
        TurbulentDissipationRate => "turbulentDissipationRate",
        SpecificDissipationRate => "specificDissipationRate",
        ModifiedTurbulentViscosity => "modifiedTurbulentViscosity",
        Temperature => "temperature",
        Density => "density",
        Material => "material",
    }
}

crate::case_enum! {
    pub enum MonitorKind ("monitor kind") {
        Force => "forceMonitor",
        Point => "pointMonitor",
        Surface => "surfaceMonitor",
        Volume => "volumeMonitor",
    }
}

impl MonitorKind {
    /// Tag of the group element holding monitors of this kind.
    pub fn group(&self) -> &'static str {
        match self {
            MonitorKind::Force => "forces",
            MonitorKind::Point => "points",
            MonitorKind::Surface => "surfaces",
            MonitorKind::Volume => "volumes",
        }
    }
}

pub fn monitors_path() -> CasePath {
    CasePath::root().child("monitors")
}

pub fn monitor_path(kind: MonitorKind, name: &str) -> CasePath {
    monitors_path()
        .child(kind.group())
        .child(kind.as_str())
        .where_child("name", name)
}

/// Every monitor of any kind sampling `field` with id `field_id`.
fn referencing_path(field: MonitorField, field_id: u64) -> CasePath {
    monitors_path()
        .any_child()
        .any_child()
        .where_child("field/field", field)
        .where_child("field/fieldID", field_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSummary {
    pub kind: MonitorKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> MonitorDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn monitors(&self) -> Vec<MonitorSummary> {
        let mut out = Vec::new();
        for kind in MonitorKind::ALL {
            let p = monitors_path().child(kind.group()).child(kind.as_str());
            for e in self.doc.get_elements(&p) {
                out.push(MonitorSummary {
                    kind: *kind,
                    name: e.child_text("name").unwrap_or_default().to_string(),
                });
            }
        }
        out
    }

    pub fn field(&self, kind: MonitorKind, name: &str) -> CaseResult<(MonitorField, u64)> {
        let base = monitor_path(kind, name).child("field");
        let field = read_enum(self.doc, &base.clone().child("field"))?;
        let id_path = base.child("fieldID");
        let raw = self.doc.get_value(&id_path)?;
        let id = raw
            .trim()
            .parse()
            .map_err(|_| CaseError::conversion(&id_path, raw, "field id"))?;
        Ok((field, id))
    }

    /// Names of monitors sampling `field` with `field_id`.
    pub fn monitors_referencing(&self, field: MonitorField, field_id: u64) -> Vec<String> {
        self.doc
            .get_elements(&referencing_path(field, field_id))
            .into_iter()
            .map(|e| e.child_text("name").unwrap_or_default().to_string())
            .collect()
    }

    /// Solver field sampled by a monitor. Pressure is `p_rgh` for solvers
    /// that solve for it.
    pub fn solver_field_name(&self, field: MonitorField, field_id: u64, use_prgh: bool) -> CaseResult<String> {
        let name = match field {
            MonitorField::Pressure if use_prgh => "p_rgh",
            MonitorField::Pressure => "p",
            MonitorField::Speed => "mag(U)",
            MonitorField::XVelocity => "Ux",
            MonitorField::YVelocity => "Uy",
            MonitorField::ZVelocity => "Uz",
            MonitorField::TurbulentKineticEnergy => "k",
            MonitorField::TurbulentDissipationRate => "epsilon",
            MonitorField::SpecificDissipationRate => "omega",
            MonitorField::ModifiedTurbulentViscosity => "nuTilda",
            MonitorField::Temperature => "T",
            MonitorField::Density => "rho",
            MonitorField::Material => {
                let db = MaterialDb::new(self.doc);
                let material = db.name(field_id)?;
                return Ok(match db.material_type(field_id)? {
                    MaterialType::Specie => material,
                    _ => format!("alpha.{material}"),
                });
            }
        };
        Ok(name.to_string())
    }
}

/// Add a point monitor. Names are unique among point monitors.
pub fn add_point_monitor(
    doc: &mut CaseDocument,
    name: &str,
    field: MonitorField,
    field_id: u64,
    coordinate: Vector3,
    region: &str,
) -> CaseResult<()> {
    if doc.exists(&monitor_path(MonitorKind::Point, name)) {
        return Err(CaseError::invalid_argument(format!("monitor '{name}' already exists")));
    }
    let el = Element::new(MonitorKind::Point.as_str()).with_children([
        Element::leaf("name", name),
        Element::leaf("showChart", "true"),
        Element::leaf("writeInterval", "1"),
        Element::new("field").with_children([
            Element::leaf("field", field.as_str()),
            Element::leaf("fieldID", field_id.to_string()),
        ]),
        Element::vector(
            "coordinate",
            coordinate.x.to_string(),
            coordinate.y.to_string(),
            coordinate.z.to_string(),
        ),
        Element::leaf("snapOntoBoundary", "false"),
        Element::leaf("region", region),
    ]);
    doc.append_element(&monitors_path().child(MonitorKind::Point.group()), el)
}

/// Removes monitors that sample a removed material, or any specie of a
/// removed mixture.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorCascade;

impl MonitorCascade {
    fn remove_monitors(doc: &mut CaseDocument, mid: u64) -> CaseResult<usize> {
        let p = referencing_path(MonitorField::Material, mid);
        if !doc.exists(&p) {
            return Ok(0);
        }
        doc.remove_element(&p)
    }
}

impl CascadeHandler for MonitorCascade {
    fn id(&self) -> &str {
        "monitor.material"
    }

    fn removing(&self, doc: &mut CaseDocument, kind: EntityKind, id: u64) -> CaseResult<()> {
        let mut targets = vec![id];
        if kind == EntityKind::Material {
            let db = MaterialDb::new(doc);
            if db.material_type(id)? == MaterialType::Mixture {
                targets.extend(db.species(id));
            }
        }
        let mut removed = 0;
        for mid in targets {
            removed += Self::remove_monitors(doc, mid)?;
        }
        if removed > 0 {
            tracing::info!(material = id, removed, "monitors removed with material");
        }
        Ok(())
    }
}
