use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;

use foamcase_core::document::{CasePath, CaseSession};
use foamcase_core::writer::CoreDbWriter;

use crate::output;

#[derive(Debug, Serialize)]
pub struct SetOut {
    pub committed: usize,
    pub digest: String,
}

/// Split `path=value` at the first `=` outside a predicate.
fn split_assignment(s: &str) -> Result<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => return Ok((s[..i].trim(), &s[i + 1..])),
            _ => {}
        }
    }
    Err(anyhow!("expected PATH=VALUE, got '{s}'"))
}

pub fn run(case: &Path, assignments: &[String], label: Option<&str>) -> Result<()> {
    // An older file is saved in the current layout.
    let session = CaseSession::new(super::open_case(case)?);

    let mut writer = CoreDbWriter::new();
    for a in assignments {
        let (path, value) = split_assignment(a)?;
        let query = CasePath::parse(path).with_context(|| format!("invalid path: {path}"))?;
        writer.append(query, value, label);
    }

    if session.commit(&mut writer) > 0 {
        let msg = writer
            .first_error()
            .map(|e| e.to_message())
            .unwrap_or_else(|| "write rejected".to_string());
        bail!(msg);
    }

    let doc = session.into_inner();
    doc.save(case).with_context(|| format!("writing {}", case.display()))?;
    output::print(&SetOut {
        committed: assignments.len(),
        digest: doc.digest(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_outside_predicates() {
        let (p, v) = split_assignment(r#"regions/region[name="fluid"]/material=2"#).unwrap();
        assert_eq!(p, r#"regions/region[name="fluid"]/material"#);
        assert_eq!(v, "2");
        assert_eq!(split_assignment("a/b=x=y").unwrap(), ("a/b", "x=y"));
        assert!(split_assignment("a/b").is_err());
    }
}
