//! Physical models.

use crate::db::read_enum;
use crate::document::{CaseDocument, CasePath};
use crate::errors::CaseResult;

crate::case_enum! {
    pub enum TurbulenceModel ("turbulence model") {
        Inviscid => "inviscid",
        Laminar => "laminar",
        SpalartAllmaras => "spalartAllmaras",
        KEpsilon => "k-epsilon",
        KOmega => "k-omega",
        Des => "DES",
        Les => "LES",
    }
}

crate::case_enum! {
    pub enum KEpsilonModel ("k-epsilon model") {
        Standard => "standard",
        Rng => "RNG",
        Realizable => "realizable",
    }
}

crate::case_enum! {
    pub enum NearWallTreatment ("near-wall treatment") {
        StandardWallFunction => "standardWallFunction",
        EnhancedWallTreatment => "enhancedWallTreatment",
    }
}

crate::case_enum! {
    pub enum MultiphaseModel ("multiphase model") {
        Off => "off",
        VolumeOfFluid => "volumeOfFluid",
    }
}

pub fn models_path() -> CasePath {
    CasePath::root().child("models")
}

pub fn turbulence_models_path() -> CasePath {
    models_path().child("turbulenceModels")
}

#[derive(Debug, Clone, Copy)]
pub struct ModelsDb<'a> {
    doc: &'a CaseDocument,
}

impl<'a> ModelsDb<'a> {
    pub fn new(doc: &'a CaseDocument) -> Self {
        Self { doc }
    }

    pub fn turbulence_model(&self) -> CaseResult<TurbulenceModel> {
        read_enum(self.doc, &turbulence_models_path().child("model"))
    }

    /// Anything that solves for turbulence quantities.
    pub fn is_turbulent(&self) -> CaseResult<bool> {
        Ok(!matches!(
            self.turbulence_model()?,
            TurbulenceModel::Inviscid | TurbulenceModel::Laminar
        ))
    }

    pub fn k_epsilon_model(&self) -> CaseResult<KEpsilonModel> {
        read_enum(self.doc, &turbulence_models_path().children("k-epsilon/model"))
    }

    /// Near-wall treatment of the realizable k-epsilon model.
    pub fn near_wall_treatment(&self) -> CaseResult<NearWallTreatment> {
        read_enum(
            self.doc,
            &turbulence_models_path().children("k-epsilon/realizable/nearWallTreatment"),
        )
    }

    pub fn is_energy_model_on(&self) -> CaseResult<bool> {
        Ok(self.doc.get_value(&models_path().child("energyModels"))? == "on")
    }

    pub fn multiphase_model(&self) -> CaseResult<MultiphaseModel> {
        read_enum(self.doc, &models_path().children("multiphaseModels/model"))
    }

    pub fn is_multiphase_model_on(&self) -> CaseResult<bool> {
        Ok(self.multiphase_model()? != MultiphaseModel::Off)
    }

    pub fn is_species_model_on(&self) -> CaseResult<bool> {
        Ok(self.doc.get_value(&models_path().child("speciesModels"))? == "on")
    }
}
