//! Black-box tests of the `foamcase` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;

use foamcase_core::db::boundary::{add_boundary_condition, BoundaryType};
use foamcase_core::db::region::add_region;
use foamcase_core::template;

const CASE_V1: &str = include_str!("../../foamcase-core/tests/fixtures/case_v1.xml");

fn foamcase() -> Command {
    let mut cmd = Command::cargo_bin("foamcase").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A current-version case with one fluid region and a wall.
fn write_case(dir: &Path) -> PathBuf {
    let mut doc = template::new_case().unwrap();
    add_region(&mut doc, "fluid", 1).unwrap();
    add_boundary_condition(&mut doc, "fluid", "walls", BoundaryType::Wall).unwrap();
    let path = dir.join("case.xml");
    doc.save(&path).unwrap();
    path
}

fn json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn info_reports_version_and_solver() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());

    let v = json(foamcase().arg("--json").arg("info").arg(&case));
    assert_eq!(v["version"], 6);
    assert_eq!(v["current_version"], 6);
    assert_eq!(v["regions"], serde_json::json!(["fluid"]));
    assert_eq!(v["solver"], "simpleNFoam");
    assert_eq!(v["digest"].as_str().unwrap().len(), 64);
}

#[test]
fn set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());

    foamcase()
        .args(["--json", "set"])
        .arg(&case)
        .arg("numericalConditions/underRelaxationFactors/momentum=0.5")
        .arg("models/energyModels=on")
        .assert()
        .success();

    let v = json(
        foamcase()
            .args(["--json", "get"])
            .arg(&case)
            .arg("numericalConditions/underRelaxationFactors/momentum"),
    );
    assert_eq!(v["value"], "0.5");

    let v = json(foamcase().args(["--json", "info"]).arg(&case));
    assert_eq!(v["solver"], "buoyantSimpleNFoam");
}

#[test]
fn rejected_batch_leaves_the_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());
    let before = fs::read_to_string(&case).unwrap();

    let out = foamcase()
        .arg("set")
        .arg(&case)
        .arg("models/energyModels=on")
        .arg("numericalConditions/underRelaxationFactors/momentum=2")
        .args(["--label", "Momentum"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    assert!(String::from_utf8_lossy(&out).contains("Momentum"));
    assert_eq!(fs::read_to_string(&case).unwrap(), before);
}

#[test]
fn get_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());
    foamcase().arg("get").arg(&case).arg("models/nothingHere").assert().failure();
}

#[test]
fn newer_case_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = template::new_case().unwrap();
    doc.set_version(7);
    let case = dir.path().join("case.xml");
    doc.save(&case).unwrap();
    let before = fs::read_to_string(&case).unwrap();

    foamcase()
        .arg("set")
        .arg(&case)
        .arg("numericalConditions/underRelaxationFactors/momentum=0.5")
        .assert()
        .failure();
    foamcase()
        .arg("get")
        .arg(&case)
        .arg("numericalConditions/underRelaxationFactors/momentum")
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&case).unwrap(), before);
}

#[test]
fn set_lifts_an_old_case_first() {
    let dir = tempfile::tempdir().unwrap();
    let case = dir.path().join("old.xml");
    fs::write(&case, CASE_V1).unwrap();

    // les settings only exist from version 6 on
    foamcase()
        .arg("set")
        .arg(&case)
        .arg("numericalConditions/underRelaxationFactors/momentum=0.5")
        .assert()
        .success();
    let v = json(foamcase().args(["--json", "info"]).arg(&case));
    assert_eq!(v["version"], 6);
    let v = json(
        foamcase()
            .args(["--json", "get"])
            .arg(&case)
            .arg("models/turbulenceModels/les/subgridScaleModel"),
    );
    assert_eq!(v["value"], "Smagorinsky");
}

#[test]
fn migrate_writes_to_out() {
    let dir = tempfile::tempdir().unwrap();
    let old = dir.path().join("old.xml");
    fs::write(&old, CASE_V1).unwrap();
    let new = dir.path().join("new.xml");

    let v = json(foamcase().args(["--json", "migrate"]).arg(&old).arg("--out").arg(&new));
    assert_eq!(v["from"], 1);
    assert_eq!(v["to"], 6);
    assert_eq!(v["steps"].as_array().unwrap().len(), 5);

    assert_eq!(fs::read_to_string(&old).unwrap(), CASE_V1);
    let v = json(foamcase().args(["--json", "info"]).arg(&new));
    assert_eq!(v["version"], 6);
}

#[test]
fn generate_writes_dictionaries() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());
    let out = dir.path().join("run");

    let v = json(foamcase().args(["--json", "generate"]).arg(&case).arg("--out").arg(&out));
    assert_eq!(v["solver"], "simpleNFoam");
    assert_eq!(v["meshless_regions"], serde_json::json!(["fluid"]));
    assert!(out.join("0/U").is_file());
    assert!(out.join("system/fvSchemes").is_file());
    assert!(fs::read_to_string(out.join("0/nut")).unwrap().contains("nutkWallFunction"));
}

#[test]
fn generate_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let case = write_case(dir.path());
    let config = dir.path().join("gen.json");
    fs::write(&config, r#"{"solver": "icoFoam"}"#).unwrap();

    foamcase()
        .arg("generate")
        .arg(&case)
        .arg("--out")
        .arg(dir.path().join("run"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
