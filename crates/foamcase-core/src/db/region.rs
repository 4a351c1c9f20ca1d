//! Regions: material assignment, initial values and boundary topology.

use crate::db::boundary::{BoundaryDb, BoundaryType};
use crate::db::material::{MaterialDb, Phase};
use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath, Vector3};
use crate::errors::{CaseError, CaseResult};
use crate::template;

pub fn regions_path() -> CasePath {
    CasePath::root().child("regions")
}

pub fn region_path(rname: &str) -> CasePath {
    regions_path().child("region").where_child("name", rname)
}

pub fn initial_values_path(rname: &str) -> CasePath {
    region_path(rname).children("initialization/initialValues")
}

/// Uniform initial state of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialValues {
    pub velocity: Vector3,
    /// Gauge pressure.
    pub pressure: f64,
    pub temperature: f64,
    pub scale_of_velocity: f64,
    /// Percent.
    pub turbulent_intensity: f64,
    /// Turbulent to laminar viscosity ratio.
    pub turbulent_viscosity_ratio: f64,
}

/// One boundary of a region, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRef {
    pub bcid: u64,
    pub name: String,
    pub physical_type: BoundaryType,
}

#[derive(Debug, Clone, Copy)]
pub struct RegionDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> RegionDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn names(&self) -> Vec<String> {
        self.doc
            .get_elements(&regions_path().child("region").child("name"))
            .into_iter()
            .map(|e| e.text().to_string())
            .collect()
    }

    pub fn exists(&self, rname: &str) -> bool {
        self.doc.exists(&region_path(rname))
    }

    pub fn material(&self, rname: &str) -> CaseResult<u64> {
        let p = region_path(rname).child("material");
        let raw = self.doc.get_value(&p)?;
        raw.trim().parse().map_err(|_| CaseError::conversion(&p, raw, "material id"))
    }

    pub fn phase(&self, rname: &str) -> CaseResult<Phase> {
        MaterialDb::new(self.doc).phase(self.material(rname)?)
    }

    pub fn is_fluid(&self, rname: &str) -> CaseResult<bool> {
        Ok(self.phase(rname)? != Phase::Solid)
    }

    /// Ids of the secondary materials, in stored order. They drive the
    /// per-phase volume fraction rows.
    pub fn secondary_materials(&self, rname: &str) -> CaseResult<Vec<u64>> {
        self.doc.get_id_list(&region_path(rname).child("secondaryMaterials"))
    }

    /// Names of regions whose primary or secondary materials include `mid`.
    pub fn regions_using_material(&self, mid: u64) -> CaseResult<Vec<String>> {
        let mut out = Vec::new();
        for rname in self.names() {
            if self.material(&rname)? == mid || self.secondary_materials(&rname)?.contains(&mid) {
                out.push(rname);
            }
        }
        Ok(out)
    }

    pub fn initial_values(&self, rname: &str) -> CaseResult<InitialValues> {
        let base = initial_values_path(rname);
        let f = |tag: &str| self.doc.get_float(&base.clone().child(tag));
        Ok(InitialValues {
            velocity: self.doc.get_vector(&base.clone().child("velocity"))?,
            pressure: f("pressure")?,
            temperature: f("temperature")?,
            scale_of_velocity: f("scaleOfVelocity")?,
            turbulent_intensity: f("turbulentIntensity")?,
            turbulent_viscosity_ratio: f("turbulentViscosity")?,
        })
    }

    /// Initial volume fraction of a secondary material; absent entries are 0.
    pub fn initial_volume_fraction(&self, rname: &str, mid: u64) -> CaseResult<f64> {
        let p = initial_values_path(rname)
            .child("volumeFractions")
            .child("volumeFraction")
            .where_child("material", mid)
            .child("fraction");
        if self.doc.exists(&p) {
            self.doc.get_float(&p)
        } else {
            Ok(0.0)
        }
    }

    /// Boundaries of the region with their physical types.
    pub fn boundaries(&self, rname: &str) -> CaseResult<Vec<BoundaryRef>> {
        let p = region_path(rname).children("boundaryConditions/boundaryCondition");
        let bdb = BoundaryDb::new(self.doc);
        self.doc
            .get_elements(&p)
            .into_iter()
            .map(|e| {
                let raw = e.attribute("bcid").unwrap_or_default();
                let bcid = raw
                    .parse::<u64>()
                    .map_err(|_| CaseError::conversion(&p, raw, "boundary id"))?;
                Ok(BoundaryRef {
                    bcid,
                    name: e.child_text("name").unwrap_or_default().to_string(),
                    physical_type: read_enum(self.doc, &bdb.path(bcid).child("physicalType"))?,
                })
            })
            .collect()
    }

    /// Density of the primary material at the region's initial temperature
    /// and operating pressure.
    pub fn density(&self, rname: &str) -> CaseResult<f64> {
        let t = self.initial_values(rname)?.temperature;
        let p = crate::db::general::GeneralDb::new(self.doc).operating_pressure()?;
        MaterialDb::new(self.doc).density(self.material(rname)?, t, p)
    }
}

/// Add a region using material `mid`. Region names are unique.
pub fn add_region(doc: &mut CaseDocument, name: &str, mid: u64) -> CaseResult<()> {
    if name.trim().is_empty() {
        return Err(CaseError::invalid_argument("region name is empty"));
    }
    if RegionDb::new(doc).exists(name) {
        return Err(CaseError::invalid_argument(format!("region '{name}' already exists")));
    }
    if !MaterialDb::new(doc).exists(mid) {
        return Err(CaseError::invalid_argument(format!("material {mid} does not exist")));
    }

    let czid = doc.next_id("czid");
    let mut el = template::region(name, mid)?;
    if let Some(zone) = el.child_mut("cellZones").and_then(|z| z.child_mut("cellZone")) {
        zone.set_attribute("czid", czid.to_string());
    }
    doc.append_element(&regions_path(), el)?;
    tracing::info!(region = name, material = mid, "region added");
    Ok(())
}

/// Replace the secondary materials of a region. Every id must name a
/// material other than the region's primary material.
pub fn set_secondary_materials(doc: &mut CaseDocument, rname: &str, mids: &[u64]) -> CaseResult<()> {
    let primary = RegionDb::new(doc).material(rname)?;
    let materials = MaterialDb::new(doc);
    for mid in mids {
        if *mid == primary || !materials.exists(*mid) {
            return Err(CaseError::invalid_argument(format!(
                "material {mid} cannot be a secondary material of '{rname}'"
            )));
        }
    }
    let text = mids.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
    doc.set_value(&region_path(rname).child("secondaryMaterials"), text)
}
