//! Materials, mixtures and species.
//!
//! Materials live under `materials/material[@mid]`. A mixture is a material
//! of type `mixture`; its species are materials of type `specie` carrying a
//! `mixture` child with the owning mixture's id.

use crate::db::cascade::{CascadeRegistry, EntityKind};
use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath, Element};
use crate::errors::{CaseError, CaseResult};
use crate::template;

/// J/(kmol K); molecular weights are stored in kg/kmol.
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8314.46261815324;

crate::case_enum! {
    pub enum Phase ("phase") {
        Solid => "solid",
        Liquid => "liquid",
        Gas => "gas",
    }
}

crate::case_enum! {
    pub enum MaterialType ("material type") {
        Nonmixture => "nonmixture",
        Mixture => "mixture",
        Specie => "specie",
    }
}

crate::case_enum! {
    pub enum DensitySpecification ("density specification") {
        Constant => "constant",
        PerfectGas => "perfectGas",
        Polynomial => "polynomial",
    }
}

crate::case_enum! {
    /// Specification of temperature dependent properties.
    pub enum PropertySpecification ("property specification") {
        Constant => "constant",
        Polynomial => "polynomial",
    }
}

pub fn materials_path() -> CasePath {
    CasePath::root().child("materials")
}

pub fn material_path(mid: u64) -> CasePath {
    materials_path().child("material").where_attr("mid", mid)
}

/// Evaluate `c0 + c1 t + c2 t^2 + ...` from whitespace separated coefficients.
pub fn eval_polynomial(coefficients: &str, t: f64) -> Option<f64> {
    let mut acc = 0.0;
    let mut power = 1.0;
    let mut seen = false;
    for c in coefficients.split_whitespace() {
        acc += c.parse::<f64>().ok()? * power;
        power *= t;
        seen = true;
    }
    seen.then_some(acc)
}

/// One row of the material list.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSummary {
    pub mid: u64,
    pub name: String,
    pub material_type: MaterialType,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy)]
pub struct MaterialDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> MaterialDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    /// Ids of every material, species included, in document order.
    pub fn ids(&self) -> Vec<u64> {
        self.doc
            .get_elements(&materials_path().child("material"))
            .into_iter()
            .filter_map(|e| e.attribute("mid"))
            .filter_map(|v| v.parse().ok())
            .collect()
    }

    pub fn exists(&self, mid: u64) -> bool {
        self.doc.exists(&material_path(mid))
    }

    pub fn materials(&self) -> CaseResult<Vec<MaterialSummary>> {
        self.ids()
            .into_iter()
            .map(|mid| {
                Ok(MaterialSummary {
                    mid,
                    name: self.name(mid)?,
                    material_type: self.material_type(mid)?,
                    phase: self.phase(mid)?,
                })
            })
            .collect()
    }

    pub fn name(&self, mid: u64) -> CaseResult<String> {
        self.doc.get_value(&material_path(mid).child("name"))
    }

    pub fn mid_by_name(&self, name: &str) -> CaseResult<u64> {
        let p = materials_path().child("material").where_child("name", name);
        let raw = self.doc.get_attribute(&p, "mid")?;
        raw.parse().map_err(|_| CaseError::conversion(&p, raw, "material id"))
    }

    pub fn phase(&self, mid: u64) -> CaseResult<Phase> {
        read_enum(self.doc, &material_path(mid).child("phase"))
    }

    pub fn material_type(&self, mid: u64) -> CaseResult<MaterialType> {
        read_enum(self.doc, &material_path(mid).child("type"))
    }

    /// Species of a mixture, in document order.
    pub fn species(&self, mixture: u64) -> Vec<u64> {
        let p = materials_path()
            .child("material")
            .where_child("type", MaterialType::Specie)
            .where_child("mixture", mixture);
        self.doc
            .get_elements(&p)
            .into_iter()
            .filter_map(|e| e.attribute("mid"))
            .filter_map(|v| v.parse().ok())
            .collect()
    }

    /// Owning mixture of a specie.
    pub fn mixture_of(&self, specie: u64) -> CaseResult<u64> {
        let p = material_path(specie).child("mixture");
        let raw = self.doc.get_value(&p)?;
        raw.trim().parse().map_err(|_| CaseError::conversion(&p, raw, "material id"))
    }

    pub fn molecular_weight(&self, mid: u64) -> CaseResult<f64> {
        self.doc.get_float(&material_path(mid).child("molecularWeight"))
    }

    pub fn density_specification(&self, mid: u64) -> CaseResult<DensitySpecification> {
        read_enum(self.doc, &material_path(mid).children("density/specification"))
    }

    /// Density in kg/m3 at temperature `t` (K) and absolute pressure `p` (Pa).
    pub fn density(&self, mid: u64, t: f64, p: f64) -> CaseResult<f64> {
        let base = material_path(mid).child("density");
        match self.density_specification(mid)? {
            DensitySpecification::Constant => self.doc.get_float(&base.child("constant")),
            DensitySpecification::PerfectGas => {
                Ok(p * self.molecular_weight(mid)? / (UNIVERSAL_GAS_CONSTANT * t))
            }
            DensitySpecification::Polynomial => self.polynomial(&base.child("polynomial"), t),
        }
    }

    /// Dynamic viscosity in kg/(m s).
    pub fn viscosity(&self, mid: u64, t: f64) -> CaseResult<f64> {
        self.property(mid, "viscosity", t)
    }

    /// Specific heat capacity at constant pressure in J/(kg K).
    pub fn specific_heat(&self, mid: u64, t: f64) -> CaseResult<f64> {
        self.property(mid, "specificHeat", t)
    }

    pub fn thermal_conductivity(&self, mid: u64, t: f64) -> CaseResult<f64> {
        self.property(mid, "thermalConductivity", t)
    }

    fn property(&self, mid: u64, tag: &str, t: f64) -> CaseResult<f64> {
        let base = material_path(mid).child(tag);
        match read_enum::<PropertySpecification>(self.doc, &base.clone().child("specification"))? {
            PropertySpecification::Constant => self.doc.get_float(&base.child("constant")),
            PropertySpecification::Polynomial => self.polynomial(&base.child("polynomial"), t),
        }
    }

    fn polynomial(&self, path: &CasePath, t: f64) -> CaseResult<f64> {
        let raw = self.doc.get_value(path)?;
        eval_polynomial(&raw, t).ok_or_else(|| CaseError::conversion(path, raw, "polynomial coefficients"))
    }
}

/// Add a material from the default template. Names are unique.
pub fn add_material(doc: &mut CaseDocument, name: &str, phase: Phase) -> CaseResult<u64> {
    if MaterialDb::new(doc).mid_by_name(name).is_ok() {
        return Err(CaseError::invalid_argument(format!("material '{name}' already exists")));
    }
    let mut el = template::material(name)?;
    if let Some(p) = el.child_mut("phase") {
        p.set_text(phase.as_str());
    }
    let mid = doc.add_element(&materials_path(), el, "mid")?;
    tracing::info!(mid, name, "material added");
    Ok(mid)
}

/// Add a specie to an existing mixture.
pub fn add_specie(doc: &mut CaseDocument, mixture: u64, name: &str) -> CaseResult<u64> {
    let db = MaterialDb::new(doc);
    if db.material_type(mixture)? != MaterialType::Mixture {
        return Err(CaseError::invalid_argument(format!("material {mixture} is not a mixture")));
    }
    let phase = db.phase(mixture)?;
    if db.mid_by_name(name).is_ok() {
        return Err(CaseError::invalid_argument(format!("material '{name}' already exists")));
    }

    let mut el = template::material(name)?;
    if let Some(t) = el.child_mut("type") {
        t.set_text(MaterialType::Specie.as_str());
    }
    if let Some(p) = el.child_mut("phase") {
        p.set_text(phase.as_str());
    }
    el.push_child(Element::leaf("mixture", mixture.to_string()));
    doc.add_element(&materials_path(), el, "mid")
}

/// Remove a material after notifying cascade handlers. A mixture takes its
/// species with it. Materials still assigned to a region are refused.
///
/// Handlers and the removal run on a copy; `doc` only changes when all of
/// them succeed.
pub fn remove_material(doc: &mut CaseDocument, registry: &CascadeRegistry, mid: u64) -> CaseResult<()> {
    let db = MaterialDb::new(doc);
    if !db.exists(mid) {
        return Err(CaseError::path_not_found(material_path(mid)));
    }
    let kind = match db.material_type(mid)? {
        MaterialType::Specie => EntityKind::Specie,
        _ => EntityKind::Material,
    };
    let species = db.species(mid);

    let in_use = crate::db::region::RegionDb::new(doc).regions_using_material(mid)?;
    if let Some(region) = in_use.first() {
        return Err(CaseError::invariant(format!(
            "material {mid} is used by region '{region}'"
        )));
    }

    let mut staged = doc.clone();
    registry.notify(&mut staged, kind, mid)?;
    for sid in &species {
        staged.remove_element(&material_path(*sid))?;
    }
    staged.remove_element(&material_path(mid))?;
    *doc = staged;
    tracing::info!(mid, species = species.len(), "material removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn air_properties() {
        let doc = template::new_case().unwrap();
        let db = MaterialDb::new(&doc);
        assert_eq!(db.mid_by_name("air").unwrap(), 1);
        assert_eq!(db.phase(1).unwrap(), Phase::Gas);
        assert_eq!(db.density(1, 300.0, 101325.0).unwrap(), 1.225);
        assert_eq!(db.specific_heat(1, 300.0).unwrap(), 1006.43);
        assert_eq!(db.viscosity(1, 300.0).unwrap(), 1.79e-05);
    }

    #[test]
    fn perfect_gas_density() {
        let mut doc = template::new_case().unwrap();
        doc.set_value(&material_path(1).children("density/specification"), "perfectGas")
            .unwrap();
        let rho = MaterialDb::new(&doc).density(1, 288.15, 101325.0).unwrap();
        assert!((rho - 1.225).abs() < 1e-3, "{rho}");
    }

    #[test]
    fn polynomial_specific_heat() {
        let mut doc = template::new_case().unwrap();
        let cp = material_path(1).child("specificHeat");
        doc.set_value(&cp.clone().child("specification"), "polynomial").unwrap();
        doc.set_value(&cp.child("polynomial"), "1000 0.5").unwrap();
        assert_eq!(MaterialDb::new(&doc).specific_heat(1, 200.0).unwrap(), 1100.0);
        assert_eq!(eval_polynomial("", 1.0), None);
    }

    #[test]
    fn mixtures_own_species() {
        let mut doc = template::new_case().unwrap();
        let mix = add_material(&mut doc, "fuel", Phase::Gas).unwrap();
        doc.set_value(&material_path(mix).child("type"), "mixture").unwrap();
        let o2 = add_specie(&mut doc, mix, "O2").unwrap();
        let n2 = add_specie(&mut doc, mix, "N2").unwrap();
        let db = MaterialDb::new(&doc);
        assert_eq!(db.species(mix), vec![o2, n2]);
        assert_eq!(db.mixture_of(o2).unwrap(), mix);
        assert_matches!(add_specie(&mut doc, 1, "CO2"), Err(CaseError::InvalidArgument(_)));

        remove_material(&mut doc, &CascadeRegistry::standard(), mix).unwrap();
        assert!(MaterialDb::new(&doc).ids() == vec![1]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut doc = template::new_case().unwrap();
        assert_matches!(add_material(&mut doc, "air", Phase::Gas), Err(CaseError::InvalidArgument(_)));
    }
}
