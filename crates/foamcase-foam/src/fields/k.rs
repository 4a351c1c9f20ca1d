//! Turbulent kinetic energy, `k`, for the k-epsilon and k-omega models.

use foamcase_core::CaseResult;

use super::turbulence::Quantity;
use super::*;

pub struct TurbulentKineticEnergy;

impl FieldGenerator for TurbulentKineticEnergy {
    fn object(&self) -> &'static str {
        Quantity::K.object()
    }

    fn build(&self, ctx: &GenerationContext<'_>, region: &RegionTopology) -> CaseResult<Option<DictionaryFile>> {
        Quantity::K.build(ctx, region)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::resources::MemoryResources;
    use foamcase_core::db::boundary::BoundaryType;

    fn k(doc: &foamcase_core::document::CaseDocument) -> Option<DictionaryFile> {
        build_with(doc, &MemoryResources::new(), "simpleNFoam", &TurbulentKineticEnergy)
    }

    #[test]
    fn intensity_inlet() {
        let (mut doc, bcid) = case_with(BoundaryType::VelocityInlet);
        set(&mut doc, bcid, "turbulence/k-epsilon/turbulentIntensity", "5");
        let entry = patch(&k(&doc).unwrap());
        assert_eq!(entry.word("type"), Some("turbulentIntensityKineticEnergyInlet"));
        assert_eq!(entry.get("intensity").and_then(FoamValue::as_float), Some(0.05));
    }

    #[test]
    fn direct_inlet() {
        let (mut doc, bcid) = case_with(BoundaryType::VelocityInlet);
        set(&mut doc, bcid, "turbulence/k-epsilon/specification", "kAndEpsilon");
        set(&mut doc, bcid, "turbulence/k-epsilon/turbulentKineticEnergy", "0.2");
        let entry = patch(&k(&doc).unwrap());
        assert_eq!(entry.word("type"), Some("inletOutlet"));
        assert_eq!(entry.get("inletValue").unwrap().to_inline_string(), "uniform 0.2");
    }

    #[test]
    fn walls_use_wall_function() {
        let (doc, _) = case_with(BoundaryType::Wall);
        assert_eq!(patch(&k(&doc).unwrap()).word("type"), Some("kqRWallFunction"));
    }

    #[test]
    fn laminar_has_no_k() {
        let (mut doc, _) = case_with(BoundaryType::Wall);
        set_root(&mut doc, "models/turbulenceModels/model", "laminar");
        assert!(k(&doc).is_none());
    }
}
