//! Rewrite of `polyMesh/boundary` from the configured boundary conditions.

use std::path::Path;

use foamcase_core::db::boundary::{BoundaryType, InterfaceMode};
use foamcase_core::db::region::BoundaryRef;
use foamcase_core::{CaseError, CaseResult};

use crate::context::{GenerationContext, RegionTopology};
use crate::dictionary::{DataClass, DictionaryFile, FoamDict};

use super::parse_boundary;

const SAMPLE_KEYS: &[&str] = &["sampleMode", "sampleRegion", "samplePatch"];
const CYCLIC_KEYS: &[&str] = &["transform", "neighbourPatch", "rotationAxis", "rotationCentre", "separationVector"];

/// Mesh-side coupling of one patch.
enum Coupling {
    None,
    MappedWall,
    CyclicAmi(InterfaceMode),
    Cyclic,
}

/// Read the region's existing `polyMesh/boundary` under `case_root` and
/// rewrite it. A region without a mesh yields `None`.
pub fn load_boundary_file(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    case_root: &Path,
) -> CaseResult<Option<DictionaryFile>> {
    let path = case_root.join(polymesh_location(region)).join("boundary");
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(region = %region.rname, path = %path.display(), "no mesh, polyMesh boundary skipped");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    boundary_file(ctx, region, &text).map(Some)
}

/// Rewrite the patch list in `existing`. Patches without faces are dropped;
/// patches unknown to the case are kept as they are.
pub fn boundary_file(ctx: &GenerationContext<'_>, region: &RegionTopology, existing: &str) -> CaseResult<DictionaryFile> {
    let patches = parse_boundary(existing)?;
    let mut data = FoamDict::new();

    for (name, value) in patches.iter() {
        let Some(patch) = value.as_dict() else {
            return Err(CaseError::resource(format!("polyMesh boundary: '{name}' is not a dictionary")));
        };
        if patch.word("nFaces").map(str::trim) == Some("0") {
            tracing::debug!(region = %region.rname, patch = name, "empty patch dropped");
            continue;
        }

        let mut patch = patch.clone();
        if let Some(bref) = region.boundaries.iter().find(|b| b.name == name) {
            rewrite_patch(ctx, region, bref, &mut patch)?;
        }
        data.insert(name, patch);
    }

    Ok(DictionaryFile::new(
        DataClass::PolyBoundaryMesh,
        polymesh_location(region),
        "boundary",
        data,
    ))
}

fn polymesh_location(region: &RegionTopology) -> String {
    format!("{}/polyMesh", region.location("constant"))
}

fn coupling(ctx: &GenerationContext<'_>, bref: &BoundaryRef) -> CaseResult<Coupling> {
    Ok(match bref.physical_type {
        BoundaryType::ThermoCoupledWall => Coupling::MappedWall,
        BoundaryType::Interface => match ctx.reader().boundaries().interface_mode(bref.bcid)? {
            InterfaceMode::RegionInterface => Coupling::MappedWall,
            mode => Coupling::CyclicAmi(mode),
        },
        BoundaryType::PorousJump | BoundaryType::Fan | BoundaryType::Cyclic => Coupling::Cyclic,
        BoundaryType::VelocityInlet
        | BoundaryType::FlowRateInlet
        | BoundaryType::PressureInlet
        | BoundaryType::PressureOutlet
        | BoundaryType::AblInlet
        | BoundaryType::OpenChannelInlet
        | BoundaryType::OpenChannelOutlet
        | BoundaryType::Outflow
        | BoundaryType::FreeStream
        | BoundaryType::FarFieldRiemann
        | BoundaryType::SubsonicInlet
        | BoundaryType::SubsonicOutflow
        | BoundaryType::SupersonicInflow
        | BoundaryType::SupersonicOutflow
        | BoundaryType::Wall
        | BoundaryType::Symmetry
        | BoundaryType::Empty
        | BoundaryType::Wedge => Coupling::None,
    })
}

fn remove(patch: &mut FoamDict, keys: &[&str]) {
    for key in keys {
        patch.remove(key);
    }
}

fn rewrite_patch(
    ctx: &GenerationContext<'_>,
    region: &RegionTopology,
    bref: &BoundaryRef,
    patch: &mut FoamDict,
) -> CaseResult<()> {
    patch.insert("type", bref.physical_type.geometrical_type().as_str());

    let coupling = coupling(ctx, bref)?;
    if let Coupling::None = coupling {
        remove(patch, SAMPLE_KEYS);
        remove(patch, CYCLIC_KEYS);
        return Ok(());
    }

    let boundaries = ctx.reader().boundaries();
    let couple = boundaries.coupled_boundary(bref.bcid)?.ok_or_else(|| {
        CaseError::invariant(format!(
            "boundary '{}' of type {} has no coupled boundary",
            bref.name, bref.physical_type
        ))
    })?;
    let couple_name = boundaries.name(couple)?;
    let b = ctx.boundary(bref.bcid);

    match coupling {
        Coupling::None => {}
        Coupling::MappedWall => {
            remove(patch, CYCLIC_KEYS);
            patch.insert("type", "mappedWall");
            patch.insert("sampleMode", "nearestPatchFaceAMI");
            if region.dir.is_empty() {
                patch.remove("sampleRegion");
            } else {
                patch.insert("sampleRegion", boundaries.region_of(couple)?);
            }
            patch.insert("samplePatch", couple_name);
        }
        Coupling::CyclicAmi(mode) => {
            remove(patch, SAMPLE_KEYS);
            patch.insert("type", "cyclicAMI");
            patch.insert("neighbourPatch", couple_name);
            match mode {
                InterfaceMode::InternalInterface | InterfaceMode::RegionInterface => {
                    remove(patch, &["rotationAxis", "rotationCentre", "separationVector"]);
                    patch.insert("transform", "noOrdering");
                }
                InterfaceMode::RotationalPeriodic => {
                    patch.remove("separationVector");
                    patch.insert("transform", "rotational");
                    patch.insert("rotationAxis", b.vector("interface/rotationAxisDirection")?);
                    patch.insert("rotationCentre", b.vector("interface/rotationAxisOrigin")?);
                }
                InterfaceMode::TranslationalPeriodic => {
                    remove(patch, &["rotationAxis", "rotationCentre"]);
                    patch.insert("transform", "translational");
                    patch.insert("separationVector", b.vector("interface/translationVector")?);
                }
            }
        }
        Coupling::Cyclic => {
            remove(patch, SAMPLE_KEYS);
            remove(patch, CYCLIC_KEYS);
            patch.insert("type", "cyclic");
            patch.insert("neighbourPatch", couple_name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::dictionary::FoamValue;
    use crate::fields::testing::{case_with, set, solver, PATCH, REGION};
    use crate::resources::MemoryResources;
    use foamcase_core::db::boundary::{add_boundary_condition, couple_boundaries};
    use foamcase_core::db::material::{add_material, Phase};
    use foamcase_core::db::region::add_region;
    use foamcase_core::document::CaseDocument;

    fn patch_entry<'a>(file: &'a DictionaryFile, name: &str) -> Option<&'a FoamDict> {
        file.data.get(name).and_then(FoamValue::as_dict)
    }

    fn mesh(patches: &[(&str, &str)]) -> String {
        let mut out = format!("{}\n(\n", patches.len());
        for (name, body) in patches {
            out.push_str(&format!("{name}\n{{\n{body}\n}}\n"));
        }
        out.push_str(")\n");
        out
    }

    fn rewrite(doc: &CaseDocument, rname: &str, text: &str) -> CaseResult<DictionaryFile> {
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(doc, &res, GenerationConfig::default(), solver("simpleNFoam"));
        let region = RegionTopology::load(ctx.reader(), rname).unwrap();
        boundary_file(&ctx, &region, text)
    }

    #[test]
    fn types_follow_physical_type_and_empty_patches_drop() {
        let (doc, _) = case_with(BoundaryType::Wall);
        let text = mesh(&[
            (PATCH, "type patch; nFaces 10; startFace 0; neighbourPatch old;"),
            ("gone", "type patch; nFaces 0; startFace 10;"),
            ("unknown", "type patch; nFaces 4; startFace 10;"),
        ]);
        let file = rewrite(&doc, REGION, &text).unwrap();
        assert_eq!(file.location, "constant/polyMesh");
        assert_eq!(file.data.keys().collect::<Vec<_>>(), [PATCH, "unknown"]);

        let b1 = patch_entry(&file, PATCH).unwrap();
        assert_eq!(b1.word("type"), Some("wall"));
        assert_eq!(b1.word("startFace"), Some("0"));
        assert!(!b1.contains_key("neighbourPatch"));
        assert_eq!(patch_entry(&file, "unknown").unwrap().word("type"), Some("patch"));
    }

    fn coupled_pair(t: BoundaryType) -> (CaseDocument, u64) {
        let (mut doc, a) = case_with(t);
        let b = add_boundary_condition(&mut doc, REGION, "b2", t).unwrap();
        couple_boundaries(&mut doc, a, b).unwrap();
        (doc, a)
    }

    fn two_patches() -> String {
        mesh(&[
            (PATCH, "type patch; nFaces 10; startFace 0; sampleMode nearestCell;"),
            ("b2", "type patch; nFaces 10; startFace 10;"),
        ])
    }

    #[test]
    fn cyclic_pairs_name_their_neighbour() {
        let (doc, _) = coupled_pair(BoundaryType::Fan);
        let file = rewrite(&doc, REGION, &two_patches()).unwrap();
        let b1 = patch_entry(&file, PATCH).unwrap();
        assert_eq!(b1.word("type"), Some("cyclic"));
        assert_eq!(b1.word("neighbourPatch"), Some("b2"));
        assert!(!b1.contains_key("sampleMode"));
        assert_eq!(patch_entry(&file, "b2").unwrap().word("neighbourPatch"), Some(PATCH));
    }

    #[test]
    fn rotational_interface() {
        let (mut doc, a) = coupled_pair(BoundaryType::Interface);
        set(&mut doc, a, "interface/mode", "rotationalPeriodic");
        set(&mut doc, a, "interface/rotationAxisOrigin/x", "1");
        let file = rewrite(&doc, REGION, &two_patches()).unwrap();
        let b1 = patch_entry(&file, PATCH).unwrap();
        assert_eq!(b1.word("type"), Some("cyclicAMI"));
        assert_eq!(b1.word("transform"), Some("rotational"));
        assert_eq!(b1.get("rotationAxis").unwrap().to_inline_string(), "(0 0 1)");
        assert_eq!(b1.get("rotationCentre").unwrap().to_inline_string(), "(1 0 0)");

        // the partner keeps the default internal interface mode
        let b2 = patch_entry(&file, "b2").unwrap();
        assert_eq!(b2.word("transform"), Some("noOrdering"));
        assert!(!b2.contains_key("rotationAxis"));
    }

    #[test]
    fn translational_interface() {
        let (mut doc, a) = coupled_pair(BoundaryType::Interface);
        set(&mut doc, a, "interface/mode", "translationalPeriodic");
        set(&mut doc, a, "interface/translationVector/y", "0.5");
        let file = rewrite(&doc, REGION, &two_patches()).unwrap();
        let b1 = patch_entry(&file, PATCH).unwrap();
        assert_eq!(b1.word("transform"), Some("translational"));
        assert_eq!(b1.get("separationVector").unwrap().to_inline_string(), "(0 0.5 0)");
    }

    #[test]
    fn region_interface_samples_the_other_region() {
        let (mut doc, a) = case_with(BoundaryType::ThermoCoupledWall);
        let steel = add_material(&mut doc, "steel", Phase::Solid).unwrap();
        add_region(&mut doc, "solid", steel).unwrap();
        let b = add_boundary_condition(&mut doc, "solid", "s1", BoundaryType::ThermoCoupledWall).unwrap();
        couple_boundaries(&mut doc, a, b).unwrap();

        let text = mesh(&[(PATCH, "type wall; nFaces 3; startFace 0; transform noOrdering;")]);
        let file = rewrite(&doc, REGION, &text).unwrap();
        assert_eq!(file.location, format!("constant/{REGION}/polyMesh"));
        let b1 = patch_entry(&file, PATCH).unwrap();
        assert_eq!(b1.word("type"), Some("mappedWall"));
        assert_eq!(b1.word("sampleMode"), Some("nearestPatchFaceAMI"));
        assert_eq!(b1.word("sampleRegion"), Some("solid"));
        assert_eq!(b1.word("samplePatch"), Some("s1"));
        assert!(!b1.contains_key("transform"));
    }

    #[test]
    fn single_region_mapped_wall_has_no_sample_region() {
        let (doc, _) = coupled_pair(BoundaryType::ThermoCoupledWall);
        let file = rewrite(&doc, REGION, &two_patches()).unwrap();
        let b1 = patch_entry(&file, PATCH).unwrap();
        assert!(!b1.contains_key("sampleRegion"));
        assert_eq!(b1.word("samplePatch"), Some("b2"));
    }

    #[test]
    fn missing_couple_is_an_invariant_error() {
        let (doc, _) = case_with(BoundaryType::Cyclic);
        let text = mesh(&[(PATCH, "type patch; nFaces 1; startFace 0;")]);
        assert!(matches!(rewrite(&doc, REGION, &text), Err(CaseError::Invariant(_))));
    }

    #[test]
    fn missing_mesh_is_skipped() {
        let (doc, _) = case_with(BoundaryType::Wall);
        let res = MemoryResources::new();
        let ctx = GenerationContext::with_solver(&doc, &res, GenerationConfig::default(), solver("simpleNFoam"));
        let region = RegionTopology::load(ctx.reader(), REGION).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(load_boundary_file(&ctx, &region, dir.path()).unwrap().is_none());

        let mesh_dir = dir.path().join("constant/polyMesh");
        std::fs::create_dir_all(&mesh_dir).unwrap();
        std::fs::write(mesh_dir.join("boundary"), mesh(&[(PATCH, "type patch; nFaces 2; startFace 0;")])).unwrap();
        let file = load_boundary_file(&ctx, &region, dir.path()).unwrap().unwrap();
        assert_eq!(patch_entry(&file, PATCH).unwrap().word("type"), Some("wall"));
    }
}
