//! Migration steps, one per source version.
//!
//! Insertion positions follow the element order of the target version so
//! that migrated files diff cleanly against freshly written ones.

use itertools::izip;

use super::{MigrationContext, MigrationStep};
use crate::document::{CaseDocument, CasePath, Element};
use crate::errors::CaseResult;

const MONITOR_GROUPS: [(&str, &str); 4] = [
    ("forces", "forceMonitor"),
    ("points", "pointMonitor"),
    ("surfaces", "surfaceMonitor"),
    ("volumes", "volumeMonitor"),
];

fn leaf(tag: &str, text: &str) -> Element {
    Element::leaf(tag, text)
}

fn zero_vector(tag: &str) -> Element {
    Element::vector(tag, "0", "0", "0")
}

fn vector_from(tag: &str, source: Option<&Element>, default: [&str; 3]) -> Element {
    let text = |axis: &str, d: &str| {
        source
            .and_then(|s| s.child_text(axis))
            .filter(|t| !t.is_empty())
            .unwrap_or(d)
            .to_string()
    };
    Element::vector(
        tag,
        text("x", default[0]),
        text("y", default[1]),
        text("z", default[2]),
    )
}

fn convergence(tag: &str) -> Element {
    Element::new(tag).with_children([leaf("absolute", "0.001"), leaf("relative", "0.05")])
}

/// Insert `child` at `index` under every match of `path` lacking that tag.
fn ensure_at(ctx: &mut MigrationContext, doc: &mut CaseDocument, path: &CasePath, index: usize, child: Element) -> CaseResult<()> {
    let tag = child.tag().to_string();
    doc.for_each_mut(path, |e| {
        if e.ensure_child_at(index, child.clone()) {
            ctx.edit("migrate.insert", format!("added {tag} to {}", e.tag()));
        }
        Ok(())
    })?;
    Ok(())
}

/// Append `child` under every match of `path` lacking that tag.
fn ensure_last(ctx: &mut MigrationContext, doc: &mut CaseDocument, path: &CasePath, child: Element) -> CaseResult<()> {
    let tag = child.tag().to_string();
    doc.for_each_mut(path, |e| {
        if e.ensure_child(child.clone()) {
            ctx.edit("migrate.insert", format!("added {tag} to {}", e.tag()));
        }
        Ok(())
    })?;
    Ok(())
}

/// v1 → v2: density polynomials, actuator disk upstream points, monitor
/// chart settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1ToV2;

impl MigrationStep for V1ToV2 {
    fn from_version(&self) -> u32 {
        1
    }

    fn id(&self) -> &str {
        "migrate.v1_v2"
    }

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        ensure_last(ctx, doc, &CasePath::anywhere("material").child("density"), Element::new("polynomial"))?;
        ensure_at(
            ctx,
            doc,
            &CasePath::anywhere("cellZone").child("actuatorDisk"),
            4,
            zero_vector("upstreamPoint"),
        )?;

        for (group, tag) in MONITOR_GROUPS {
            let p = CasePath::anywhere("monitors").child(group).child(tag);
            ensure_at(ctx, doc, &p, 1, leaf("showChart", "false"))?;
            ensure_at(ctx, doc, &p, 2, leaf("writeInterval", "1"))?;
        }

        let report = CasePath::anywhere("monitors")
            .children("surfaces/surfaceMonitor/reportType")
            .where_text("flowRate");
        doc.for_each_mut(&report, |e| {
            e.set_text("massFlowRate");
            ctx.edit("migrate.rename", "surface monitor reportType flowRate -> massFlowRate");
            Ok(())
        })?;
        Ok(())
    }
}

/// v2 → v3: multiphase support and per-region initialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2ToV3;

impl V2ToV3 {
    /// Move the case-wide initial values into every region.
    fn move_initialization(ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        let legacy = CasePath::root().children("initialization/initialValues");
        let Ok(values) = doc.element(&legacy).cloned() else {
            return Ok(());
        };
        let text = |tag: &str, d: &str| values.child_text(tag).unwrap_or(d).to_string();

        let init = Element::new("initialization").with_children([
            Element::new("initialValues").with_children([
                vector_from("velocity", values.child("velocity"), ["0", "0", "0"]),
                leaf("pressure", &text("pressure", "0")),
                leaf("temperature", &text("temperature", "300")),
                leaf("scaleOfVelocity", &text("scaleOfVelocity", "1")),
                leaf("turbulentIntensity", &text("turbulentIntensity", "1")),
                leaf("turbulentViscosity", &text("turbulentViscosity", "10")),
                Element::new("volumeFractions"),
            ]),
            Element::new("advanced").with_child(Element::new("sections")),
        ]);

        doc.remove_element(&CasePath::root().child("initialization"))?;
        ctx.edit("migrate.move", "removed case-wide initialization");
        ensure_last(ctx, doc, &CasePath::root().children("regions/region"), init)
    }
}

impl MigrationStep for V2ToV3 {
    fn from_version(&self) -> u32 {
        2
    }

    fn id(&self) -> &str {
        "migrate.v2_v3"
    }

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        let regions = CasePath::anywhere("regions").child("region");
        ensure_at(ctx, doc, &regions, 2, Element::new("secondaryMaterials"))?;
        ensure_at(
            ctx,
            doc,
            &regions,
            3,
            Element::new("phaseInteractions").with_child(Element::new("surfaceTensions").with_children([
                Element::new("material1"),
                Element::new("material2"),
                Element::new("surfaceTension"),
            ])),
        )?;

        ensure_at(
            ctx,
            doc,
            &CasePath::anywhere("cellZone").child("sourceTerms"),
            1,
            Element::new("materials"),
        )?;
        ensure_last(
            ctx,
            doc,
            &CasePath::anywhere("boundaryConditions").child("boundaryCondition"),
            Element::new("volumeFractions"),
        )?;
        ensure_last(
            ctx,
            doc,
            &CasePath::anywhere("boundaryCondition").child("wall"),
            Element::new("wallAdhesions").with_children([leaf("model", "none"), leaf("limit", "none")]),
        )?;

        let numerical = CasePath::anywhere("numericalConditions");
        let factors = numerical.clone().child("underRelaxationFactors");
        ensure_last(ctx, doc, &factors, leaf("volumeFraction", "0.7"))?;
        ensure_last(ctx, doc, &factors, leaf("volumeFractionFinal", "1"))?;
        ensure_at(
            ctx,
            doc,
            &numerical,
            7,
            Element::new("multiphase").with_children([
                leaf("maxIterationsPerTimeStep", "2"),
                leaf("numberOfCorrectors", "1"),
                leaf("useSemiImplicitMules", "true"),
                leaf("phaseInterfaceCompressionFactor", "1"),
                leaf("numberOfMulesIterations", "3"),
            ]),
        )?;
        ensure_last(
            ctx,
            doc,
            &numerical.child("convergenceCriteria"),
            convergence("volumeFraction"),
        )?;

        Self::move_initialization(ctx, doc)?;

        ensure_at(
            ctx,
            doc,
            &CasePath::anywhere("runConditions"),
            4,
            leaf("VoFMaxCourantNumber", "1"),
        )?;

        doc.for_each_mut(&CasePath::anywhere("materials").child("material"), |e| {
            if e.remove_child("surfaceTension").is_some() {
                ctx.edit("migrate.remove", "removed material surfaceTension");
            }
            Ok(())
        })?;

        let gravity = CasePath::root().children("general/operatingConditions/gravity");
        if doc.exists(&gravity) {
            doc.set_attribute(&gravity, "disabled", "false")?;
        }
        Ok(())
    }
}

/// v3 → v4: batch parameters, realizable k-epsilon blending, structured
/// surface tensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct V3ToV4;

impl V3ToV4 {
    /// Replace the parallel `material1`/`material2`/`surfaceTension` lists
    /// with one `surfaceTension` element per pair.
    fn split_surface_tensions(e: &mut Element) -> usize {
        if !e.has_child("material1") {
            return 0;
        }
        let take = |e: &mut Element, tag: &str| e.remove_child(tag).map(|c| c.text().to_string()).unwrap_or_default();
        let first = take(e, "material1");
        let second = take(e, "material2");
        let values = take(e, "surfaceTension");

        let mut added = 0;
        for (m1, m2, v) in izip!(first.split_whitespace(), second.split_whitespace(), values.split_whitespace()) {
            e.push_child(Element::new("surfaceTension").with_children([
                leaf("mid", m1),
                leaf("mid", m2),
                leaf("value", v),
            ]));
            added += 1;
        }
        added
    }
}

impl MigrationStep for V3ToV4 {
    fn from_version(&self) -> u32 {
        3
    }

    fn id(&self) -> &str {
        "migrate.v3_v4"
    }

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        ensure_last(
            ctx,
            doc,
            &CasePath::root().child("runCalculation"),
            Element::new("batch").with_child(Element::new("parameters")),
        )?;

        let realizable = CasePath::root().children("models/turbulenceModels/k-epsilon/realizable");
        ensure_last(ctx, doc, &realizable, leaf("threshold", "60"))?;
        ensure_last(ctx, doc, &realizable, leaf("blendingWidth", "10"))?;

        let tensions = CasePath::anywhere("regions").children("region/phaseInteractions/surfaceTensions");
        doc.for_each_mut(&tensions, |e| {
            if e.has_child("material1") {
                let n = Self::split_surface_tensions(e);
                ctx.edit("migrate.split", format!("split surface tensions into {n} entries"));
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// v4 → v5: density-based solver settings and structured flow directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct V4ToV5;

impl V4ToV5 {
    fn direction_block(tag: &str, drag: Option<&Element>, lift: Option<&Element>) -> Element {
        Element::new(tag).with_children([
            leaf("specificationMethod", "direct"),
            vector_from("dragDirection", drag, ["1", "0", "0"]),
            vector_from("liftDirection", lift, ["0", "1", "0"]),
            leaf("angleOfAttack", "0"),
            leaf("angleOfSideslip", "0"),
        ])
    }
}

impl MigrationStep for V4ToV5 {
    fn from_version(&self) -> u32 {
        4
    }

    fn id(&self) -> &str {
        "migrate.v4_v5"
    }

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        let numerical = CasePath::root().child("numericalConditions");
        ensure_last(
            ctx,
            doc,
            &numerical.clone().child("discretizationSchemes"),
            leaf("pressure", "momentumWeightedReconstruct"),
        )?;
        ensure_at(
            ctx,
            doc,
            &numerical,
            1,
            Element::new("densityBasedSolverParameters").with_children([
                leaf("formulation", "implicit"),
                leaf("fluxType", "roeFlux"),
                leaf("entropyFixCoefficient", "0.5"),
                leaf("cutOffMachNumber", "0.729"),
            ]),
        )?;

        let modified = CasePath::root()
            .child("monitors")
            .any_child()
            .any_child()
            .children("field/field")
            .where_text("modifiedPressure");
        doc.for_each_mut(&modified, |e| {
            e.set_text("pressure");
            ctx.edit("migrate.rename", "monitor field modifiedPressure -> pressure");
            Ok(())
        })?;

        let inflow = CasePath::anywhere("boundaryConditions").children("boundaryCondition/subsonicInflow");
        doc.for_each_mut(&inflow, |e| {
            e.set_tag("subsonicInlet");
            ctx.edit("migrate.rename", "subsonicInflow -> subsonicInlet");
            Ok(())
        })?;

        ensure_at(
            ctx,
            doc,
            &numerical.child("convergenceCriteria"),
            1,
            convergence("density"),
        )?;

        let far_field = CasePath::anywhere("boundaryCondition").child("farFieldRiemann");
        doc.for_each_mut(&far_field, |e| {
            if e.descend(&["flowDirection", "specificationMethod"]).is_some() {
                return Ok(());
            }
            let old = e.remove_child("flowDirection");
            e.insert_child(0, Self::direction_block("flowDirection", old.as_ref(), None));
            ctx.edit("migrate.restructure", "far-field flowDirection");
            Ok(())
        })?;

        let forces = CasePath::root().children("monitors/forces/forceMonitor");
        doc.for_each_mut(&forces, |e| {
            if e.has_child("forceDirection") {
                return Ok(());
            }
            let lift = e.remove_child("liftDirection");
            let drag = e.remove_child("dragDirection");
            e.insert_child(3, Self::direction_block("forceDirection", drag.as_ref(), lift.as_ref()));
            ctx.edit("migrate.restructure", "force monitor forceDirection");
            Ok(())
        })?;
        Ok(())
    }
}

/// v5 → v6: LES settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct V5ToV6;

impl MigrationStep for V5ToV6 {
    fn from_version(&self) -> u32 {
        5
    }

    fn id(&self) -> &str {
        "migrate.v5_v6"
    }

    fn apply(&self, ctx: &mut MigrationContext, doc: &mut CaseDocument) -> CaseResult<()> {
        ensure_at(
            ctx,
            doc,
            &CasePath::root().children("models/turbulenceModels"),
            3,
            Element::new("les").with_children([
                leaf("subgridScaleModel", "Smagorinsky"),
                leaf("lengthScaleModel", "cubeRootVol"),
                Element::new("modelConstants").with_children([
                    leaf("k", "0.094"),
                    leaf("e", "1.048"),
                    leaf("w", "0.325"),
                ]),
            ]),
        )?;
        ensure_last(
            ctx,
            doc,
            &CasePath::anywhere("boundaryCondition").child("turbulence"),
            Element::new("les").with_children([
                leaf("specification", "subgridScaleK"),
                leaf("subgridKineticEnergy", "1"),
                leaf("subgridTurbulentIntensity", "1"),
                leaf("turbulentViscosityRatio", "10"),
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str, version: u32) -> CaseDocument {
        CaseDocument::from_xml_str(&format!(
            r#"<configuration xmlns="http://www.baramcfd.org/baram" version="{version}">{body}</configuration>"#
        ))
        .unwrap()
    }

    #[test]
    fn batch_is_added_once() {
        let mut d = doc("<runCalculation><runConditions/><parallel/></runCalculation>", 3);
        let mut ctx = MigrationContext::default();
        V3ToV4.apply(&mut ctx, &mut d).unwrap();
        let batch = CasePath::root().children("runCalculation/batch/parameters");
        assert!(d.exists(&batch));

        let once = d.clone();
        V3ToV4.apply(&mut ctx, &mut d).unwrap();
        assert_eq!(d, once);
        assert_eq!(d.get_elements(&CasePath::root().children("runCalculation/batch")).len(), 1);
    }

    #[test]
    fn surface_tensions_are_zipped() {
        let mut d = doc(
            "<regions><region><name>r</name><material>1</material><secondaryMaterials>2 3</secondaryMaterials>\
             <phaseInteractions><surfaceTensions><material1>1 1</material1><material2>2 3</material2>\
             <surfaceTension>0.07 0.05</surfaceTension></surfaceTensions></phaseInteractions></region></regions>",
            3,
        );
        let mut ctx = MigrationContext::default();
        V3ToV4.apply(&mut ctx, &mut d).unwrap();
        let entries = d.get_elements(&CasePath::anywhere("surfaceTensions").child("surfaceTension"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].child_text("value"), Some("0.05"));
        let mids: Vec<&str> = entries[1].children().iter().filter(|c| c.tag() == "mid").map(|c| c.text()).collect();
        assert_eq!(mids, vec!["1", "3"]);

        let once = d.clone();
        V3ToV4.apply(&mut ctx, &mut d).unwrap();
        assert_eq!(d, once);
    }

    #[test]
    fn empty_legacy_tensions_leave_an_empty_group() {
        let mut d = doc(
            "<regions><region><phaseInteractions><surfaceTensions><material1/><material2/><surfaceTension/>\
             </surfaceTensions></phaseInteractions></region></regions>",
            3,
        );
        V3ToV4.apply(&mut MigrationContext::default(), &mut d).unwrap();
        let group = d.element(&CasePath::anywhere("surfaceTensions")).unwrap();
        assert!(group.children().is_empty());
    }

    #[test]
    fn monitor_chart_settings_are_positioned() {
        let mut d = doc(
            "<monitors><forces/><points><pointMonitor><name>p</name><field/></pointMonitor></points>\
             <surfaces><surfaceMonitor><name>s</name><reportType>flowRate</reportType></surfaceMonitor></surfaces>\
             <volumes/></monitors>",
            1,
        );
        V1ToV2.apply(&mut MigrationContext::default(), &mut d).unwrap();
        let point = d.element(&CasePath::anywhere("pointMonitor")).unwrap();
        let tags: Vec<&str> = point.children().iter().map(Element::tag).collect();
        assert_eq!(tags, vec!["name", "showChart", "writeInterval", "field"]);
        assert_eq!(
            d.get_value(&CasePath::anywhere("surfaceMonitor").child("reportType")).unwrap(),
            "massFlowRate"
        );
    }

    #[test]
    fn far_field_direction_is_restructured() {
        let mut d = doc(
            "<regions><region><boundaryConditions><boundaryCondition bcid=\"1\"><farFieldRiemann>\
             <flowDirection><x>0</x><y>0</y><z>1</z></flowDirection><machNumber>0.3</machNumber>\
             </farFieldRiemann><subsonicInflow/></boundaryCondition></boundaryConditions></region></regions>",
            4,
        );
        V4ToV5.apply(&mut MigrationContext::default(), &mut d).unwrap();
        let fd = CasePath::anywhere("farFieldRiemann").child("flowDirection");
        assert_eq!(d.get_value(&fd.clone().child("specificationMethod")).unwrap(), "direct");
        assert_eq!(d.get_value(&fd.clone().children("dragDirection/z")).unwrap(), "1");
        assert_eq!(d.get_value(&fd.children("liftDirection/y")).unwrap(), "1");
        assert!(d.exists(&CasePath::anywhere("subsonicInlet")));
        assert!(!d.exists(&CasePath::anywhere("subsonicInflow")));
    }
}
