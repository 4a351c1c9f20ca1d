//! Property tests for the store and the writer.

use foamcase_core::document::{CasePath, Vector3};
use foamcase_core::template;
use foamcase_core::writer::CoreDbWriter;

use proptest::prelude::*;

fn factor(name: &str) -> CasePath {
    CasePath::root()
        .children("numericalConditions/underRelaxationFactors")
        .child(name)
}

const FACTORS: [&str; 6] = ["pressure", "momentum", "energy", "turbulence", "density", "volumeFraction"];

proptest! {
    #[test]
    fn written_values_read_back(v in 0.0f64..=1.0) {
        let mut doc = template::new_case().unwrap();
        let mut w = CoreDbWriter::new();
        w.append(factor("pressure"), v, Some("Pressure"));
        prop_assert_eq!(w.write(&mut doc), 0);
        prop_assert_eq!(doc.get_value(&factor("pressure")).unwrap(), v.to_string());
    }

    #[test]
    fn vectors_read_back(x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6) {
        let mut doc = template::new_case().unwrap();
        let g = CasePath::root().children("general/operatingConditions/gravity");
        doc.set_vector(&g, Vector3::new(x, y, z)).unwrap();
        prop_assert_eq!(doc.get_vector(&g).unwrap(), Vector3::new(x, y, z));
    }

    #[test]
    fn one_bad_entry_leaves_the_document_unchanged(
        good in proptest::collection::vec((0usize..FACTORS.len(), 0.0f64..=1.0), 0..6),
        bad in 1.0001f64..100.0,
        at in 0usize..7,
    ) {
        let mut doc = template::new_case().unwrap();
        let before = doc.digest();

        let mut w = CoreDbWriter::new();
        let at = at.min(good.len());
        for (i, (f, v)) in good.iter().enumerate() {
            if i == at {
                w.append(factor("momentum"), bad, Some("Momentum"));
            }
            w.append(factor(FACTORS[*f]), *v, Some(FACTORS[*f]));
        }
        if at == good.len() {
            w.append(factor("momentum"), bad, Some("Momentum"));
        }

        prop_assert!(w.write(&mut doc) >= 1);
        prop_assert!(w.first_error().unwrap().to_message().contains("Momentum"));
        prop_assert_eq!(doc.digest(), before);
    }

    #[test]
    fn paths_display_and_parse(tags in proptest::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,8}", 1..5), value in "[a-z0-9]{1,6}") {
        let mut p = CasePath::root();
        for t in &tags {
            p = p.child(t.as_str());
        }
        let p = p.where_child("name", &value);
        let text = p.to_string();
        prop_assert_eq!(CasePath::parse(&text).unwrap(), p);
    }
}
