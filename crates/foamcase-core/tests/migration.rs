//! Migration of historical case files up to the current schema.

use foamcase_core::db::models::ModelsDb;
use foamcase_core::db::region::RegionDb;
use foamcase_core::document::{CaseDocument, CasePath, Element};
use foamcase_core::migrate::{self, MigrationChain, MigrationContext};
use foamcase_core::version::CURRENT_VERSION;
use foamcase_core::CaseError;

use assert_matches::assert_matches;

const CASE_V1: &str = include_str!("fixtures/case_v1.xml");

fn v1() -> CaseDocument {
    CaseDocument::from_xml_str(CASE_V1).unwrap()
}

fn migrated() -> CaseDocument {
    let mut doc = v1();
    migrate::migrate(&mut doc).unwrap();
    doc
}

fn tags(doc: &CaseDocument, path: &CasePath) -> Vec<String> {
    doc.element(path)
        .unwrap()
        .children()
        .iter()
        .map(|c| c.tag().to_string())
        .collect()
}

#[test]
fn v1_reaches_current_version() {
    let mut doc = v1();
    let report = migrate::migrate(&mut doc).unwrap();
    assert_eq!(report.from, 1);
    assert_eq!(report.to, CURRENT_VERSION);
    assert_eq!(report.steps.len(), (CURRENT_VERSION - 1) as usize);
    assert!(report.edits() > 0);
    assert_eq!(doc.version().unwrap(), CURRENT_VERSION);
}

#[test]
fn every_step_leaves_its_mark() {
    let doc = migrated();
    let region = CasePath::root().children("regions/region");

    // v1 -> v2
    assert!(doc.exists(&CasePath::anywhere("material").children("density/polynomial")));
    assert_eq!(tags(&doc, &CasePath::anywhere("actuatorDisk"))[4], "upstreamPoint");
    for monitor in ["forceMonitor", "pointMonitor", "surfaceMonitor", "volumeMonitor"] {
        let t = tags(&doc, &CasePath::anywhere(monitor));
        assert_eq!(&t[1..3], ["showChart", "writeInterval"], "{monitor}");
    }
    assert_eq!(
        doc.get_value(&CasePath::anywhere("surfaceMonitor").child("reportType")).unwrap(),
        "massFlowRate"
    );

    // v2 -> v3
    let region_tags = tags(&doc, &region);
    assert_eq!(region_tags[2], "secondaryMaterials");
    assert_eq!(region_tags[3], "phaseInteractions");
    assert!(!doc.exists(&CasePath::root().child("initialization")));
    let iv = RegionDb::new(&doc).initial_values("fluid").unwrap();
    assert_eq!(iv.velocity.x, 2.5);
    assert_eq!(iv.temperature, 293.0);
    assert_eq!(iv.turbulent_intensity, 2.0);
    assert!(doc.exists(&CasePath::anywhere("sourceTerms").child("materials")));
    assert!(doc.exists(&CasePath::anywhere("wall").children("wallAdhesions/model")));
    assert_eq!(tags(&doc, &CasePath::anywhere("runConditions"))[4], "VoFMaxCourantNumber");
    assert!(!doc.exists(&CasePath::anywhere("material").child("surfaceTension")));
    assert_eq!(
        doc.get_attribute(&CasePath::root().children("general/operatingConditions/gravity"), "disabled")
            .unwrap(),
        "false"
    );

    // v3 -> v4
    assert!(doc.exists(&CasePath::root().children("runCalculation/batch/parameters")));
    assert_eq!(
        doc.get_value(&CasePath::anywhere("realizable").child("threshold")).unwrap(),
        "60"
    );

    // v4 -> v5
    let numerical = CasePath::root().child("numericalConditions");
    assert_eq!(tags(&doc, &numerical)[1], "densityBasedSolverParameters");
    assert_eq!(tags(&doc, &numerical.clone().child("convergenceCriteria"))[1], "density");
    assert_eq!(
        doc.get_value(&numerical.children("discretizationSchemes/pressure")).unwrap(),
        "momentumWeightedReconstruct"
    );
    assert_eq!(
        doc.get_value(&CasePath::anywhere("pointMonitor").children("field/field")).unwrap(),
        "pressure"
    );
    assert!(doc.exists(&CasePath::anywhere("subsonicInlet")));
    assert_eq!(tags(&doc, &CasePath::anywhere("forceMonitor"))[3], "forceDirection");
    assert_eq!(tags(&doc, &CasePath::anywhere("farFieldRiemann"))[0], "flowDirection");

    // v5 -> v6
    assert_eq!(tags(&doc, &CasePath::root().children("models/turbulenceModels"))[3], "les");
    assert!(doc.exists(&CasePath::anywhere("turbulence").children("les/specification")));
    assert!(ModelsDb::new(&doc).is_turbulent().unwrap());
}

#[test]
fn migrating_twice_is_a_noop() {
    let mut doc = migrated();
    let once = doc.clone();
    let report = migrate::migrate(&mut doc).unwrap();
    assert!(report.is_noop());
    assert_eq!(doc, once);
}

#[test]
fn each_step_is_idempotent_on_migrated_documents() {
    let chain = MigrationChain::standard();
    let doc = migrated();
    for v in 1..CURRENT_VERSION {
        let step = chain.step(v).unwrap();
        let mut again = doc.clone();
        step.apply(&mut MigrationContext::default(), &mut again).unwrap();
        assert_eq!(again, doc, "{} changed a migrated document", step.id());
    }
}

#[test]
fn partial_application_is_completed_not_duplicated() {
    // A hand-patched v3 file that already has a batch block.
    let mut doc = v1();
    doc.set_version(3);
    doc.append_element(
        &CasePath::root().child("runCalculation"),
        Element::new("batch").with_child(Element::new("parameters")),
    )
    .unwrap();
    migrate::migrate(&mut doc).unwrap();
    assert_eq!(doc.get_elements(&CasePath::root().children("runCalculation/batch")).len(), 1);
}

#[test]
fn run_calculation_gains_batch_from_v3() {
    let mut doc = CaseDocument::from_xml_str(
        r#"<configuration xmlns="http://www.baramcfd.org/baram" version="3">
             <runCalculation><runConditions/></runCalculation>
           </configuration>"#,
    )
    .unwrap();
    let step = MigrationChain::standard();
    let step = step.step(3).unwrap();
    step.apply(&mut MigrationContext::default(), &mut doc).unwrap();
    let batch = doc.element(&CasePath::root().children("runCalculation/batch")).unwrap();
    assert_eq!(batch.children().len(), 1);
    assert_eq!(batch.children()[0].tag(), "parameters");

    let once = doc.clone();
    step.apply(&mut MigrationContext::default(), &mut doc).unwrap();
    assert_eq!(doc, once);
}

#[test]
fn newer_files_are_incompatible() {
    let mut doc = v1();
    doc.set_version(CURRENT_VERSION + 3);
    assert_matches!(
        migrate::migrate(&mut doc),
        Err(CaseError::IncompatibleVersion { found, current, .. })
            if found == CURRENT_VERSION + 3 && current == CURRENT_VERSION
    );
}

#[test]
fn migrated_document_survives_save_and_load() {
    let doc = migrated();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("case.xml");
    doc.save(&path).unwrap();
    let loaded = CaseDocument::load(&path).unwrap();
    assert_eq!(loaded, doc);
    assert_eq!(loaded.digest(), doc.digest());
}
