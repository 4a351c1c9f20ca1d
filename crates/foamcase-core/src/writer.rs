//! Write transactions.
//!
//! `CoreDbWriter` stages value writes, attribute writes, element additions and
//! removals, then validates and applies them in one `write()` call:
//!
//! - entries are applied in staging order to a copy of the document, so later
//!   entries can address elements added by earlier ones
//! - every value write is checked against the `Schema`; every entry is
//!   evaluated, so the caller learns how many failed
//! - the copy replaces the document only when nothing failed
//!
//! Validation failures are returned as a count, never as `Err`. The first one
//! is available through `first_error()` for display.

use thiserror::Error;

use crate::document::{path, CaseDocument, CasePath, Element};
use crate::schema::{Schema, Violation};

/// A rejected entry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.to_message())]
pub struct WriteError {
    pub path: String,
    pub label: Option<String>,
    pub violation: Violation,
}

impl WriteError {
    /// Message for display next to the offending field.
    pub fn to_message(&self) -> String {
        match &self.label {
            Some(label) => format!("{label} {}", self.violation),
            None => format!("{} {}", self.path, self.violation),
        }
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Value {
        path: CasePath,
        value: String,
        label: Option<String>,
    },
    Attribute {
        path: CasePath,
        name: String,
        value: String,
    },
    AddElement {
        parent: CasePath,
        element: Element,
        id_attribute: Option<String>,
        label: Option<String>,
    },
    Remove {
        path: CasePath,
        label: Option<String>,
    },
}

/// Batches writes to a case document.
#[derive(Debug, Clone, Default)]
pub struct CoreDbWriter {
    schema: Schema,
    pending: Vec<Pending>,
    errors: Vec<WriteError>,
    added_ids: Vec<u64>,
}

impl CoreDbWriter {
    pub fn new() -> Self {
        Self::with_schema(Schema::standard())
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            pending: Vec::new(),
            errors: Vec::new(),
            added_ids: Vec::new(),
        }
    }

    /// Stage a leaf value write. `label` names the field in error messages.
    pub fn append(&mut self, path: CasePath, value: impl ToString, label: Option<&str>) -> &mut Self {
        self.pending.push(Pending::Value {
            path,
            value: value.to_string(),
            label: label.map(str::to_string),
        });
        self
    }

    /// Stage `x`, `y`, `z` writes under `path`.
    pub fn append_vector(&mut self, path: CasePath, v: crate::document::Vector3, label: Option<&str>) -> &mut Self {
        self.append(path.clone().child("x"), v.x, label);
        self.append(path.clone().child("y"), v.y, label);
        self.append(path.child("z"), v.z, label)
    }

    pub fn set_attribute(&mut self, path: CasePath, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pending.push(Pending::Attribute {
            path,
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Stage a new child under `parent`; with `id_attribute` a fresh id is
    /// assigned on commit and reported by `added_ids()`.
    pub fn add_element(
        &mut self,
        parent: CasePath,
        element: Element,
        id_attribute: Option<&str>,
        label: Option<&str>,
    ) -> &mut Self {
        self.pending.push(Pending::AddElement {
            parent,
            element,
            id_attribute: id_attribute.map(str::to_string),
            label: label.map(str::to_string),
        });
        self
    }

    pub fn remove_element(&mut self, path: CasePath, label: Option<&str>) -> &mut Self {
        self.pending.push(Pending::Remove {
            path,
            label: label.map(str::to_string),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Validate and commit all staged entries. Returns the number of rejected
    /// entries; the document is untouched unless this is zero.
    ///
    /// Staged entries are consumed either way.
    pub fn write(&mut self, doc: &mut CaseDocument) -> usize {
        self.errors.clear();
        self.added_ids.clear();

        let mut staged = doc.clone();
        let mut ids = Vec::new();
        for entry in std::mem::take(&mut self.pending) {
            if let Err(e) = self.apply(&mut staged, entry, &mut ids) {
                self.errors.push(e);
            }
        }

        if self.errors.is_empty() {
            *doc = staged;
            self.added_ids = ids;
            tracing::debug!(added = self.added_ids.len(), "writer batch committed");
        } else {
            tracing::debug!(errors = self.errors.len(), "writer batch rejected");
        }
        self.errors.len()
    }

    fn apply(&self, doc: &mut CaseDocument, entry: Pending, ids: &mut Vec<u64>) -> Result<(), WriteError> {
        match entry {
            Pending::Value { path, value, label } => {
                let idx = first_match(doc, &path, label.as_deref())?;
                let chain = tag_chain(doc, &idx);
                let chain: Vec<&str> = chain.iter().map(String::as_str).collect();
                self.schema.check(&chain, &value).map_err(|violation| WriteError {
                    path: path.to_string(),
                    label: label.clone(),
                    violation,
                })?;
                if let Some(node) = doc.node_mut(&idx) {
                    node.set_text(value);
                }
                Ok(())
            }
            Pending::Attribute { path, name, value } => {
                let idx = first_match(doc, &path, None)?;
                if let Some(node) = doc.node_mut(&idx) {
                    node.set_attribute(name, value);
                }
                Ok(())
            }
            Pending::AddElement {
                parent,
                element,
                id_attribute,
                label,
            } => {
                first_match(doc, &parent, label.as_deref())?;
                match id_attribute {
                    Some(attr) => {
                        let id = doc
                            .add_element(&parent, element, &attr)
                            .map_err(|_| not_found(&parent, label.as_deref()))?;
                        ids.push(id);
                    }
                    None => doc
                        .append_element(&parent, element)
                        .map_err(|_| not_found(&parent, label.as_deref()))?,
                }
                Ok(())
            }
            Pending::Remove { path, label } => {
                doc.remove_element(&path)
                    .map(|_| ())
                    .map_err(|_| not_found(&path, label.as_deref()))
            }
        }
    }

    /// Number of entries rejected by the last `write()`.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn first_error(&self) -> Option<&WriteError> {
        self.errors.first()
    }

    pub fn errors(&self) -> &[WriteError] {
        &self.errors
    }

    /// Ids assigned by the last successful `write()`, in staging order.
    pub fn added_ids(&self) -> &[u64] {
        &self.added_ids
    }
}

fn not_found(path: &CasePath, label: Option<&str>) -> WriteError {
    WriteError {
        path: path.to_string(),
        label: label.map(str::to_string),
        violation: Violation::PathNotFound,
    }
}

fn first_match(doc: &CaseDocument, path: &CasePath, label: Option<&str>) -> Result<Vec<usize>, WriteError> {
    doc.indices(path)
        .into_iter()
        .next()
        .ok_or_else(|| not_found(path, label))
}

fn tag_chain(doc: &CaseDocument, idx: &[usize]) -> Vec<String> {
    (0..=idx.len())
        .filter_map(|n| path::node_at(doc.root(), &idx[..n]))
        .map(|e| e.tag().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    fn factors() -> CasePath {
        CasePath::root().children("numericalConditions/underRelaxationFactors")
    }

    #[test]
    fn valid_batch_commits() {
        let mut doc = template::new_case().unwrap();
        let mut w = CoreDbWriter::new();
        w.append(factors().child("pressure"), "0.2", Some("Pressure"))
            .append(factors().child("momentum"), "0.5", Some("Momentum"));
        assert_eq!(w.write(&mut doc), 0);
        assert_eq!(doc.get_value(&factors().child("pressure")).unwrap(), "0.2");
        assert!(w.is_empty());
    }

    #[test]
    fn one_bad_entry_rejects_the_batch() {
        let mut doc = template::new_case().unwrap();
        let before = doc.digest();
        let mut w = CoreDbWriter::new();
        w.append(factors().child("momentum"), "0.5", Some("Momentum"))
            .append(factors().child("pressure"), "2.5", Some("Under-Relaxation Factor (Pressure)"))
            .set_attribute(
                CasePath::root().children("general/operatingConditions/gravity"),
                "disabled",
                "false",
            );
        assert_eq!(w.write(&mut doc), 1);
        let msg = w.first_error().unwrap().to_message();
        assert!(msg.contains("Under-Relaxation Factor (Pressure)"), "{msg}");
        assert!(msg.contains("between 0 and 1"), "{msg}");
        assert_eq!(doc.digest(), before);
    }

    #[test]
    fn missing_path_is_reported_with_label() {
        let mut doc = template::new_case().unwrap();
        let mut w = CoreDbWriter::new();
        w.append(CasePath::root().child("nowhere"), "1", Some("Nowhere"));
        assert_eq!(w.write(&mut doc), 1);
        assert_eq!(w.first_error().unwrap().violation, Violation::PathNotFound);
    }

    #[test]
    fn added_elements_are_addressable_later_in_the_batch() {
        let mut doc = template::new_case().unwrap();
        let mut w = CoreDbWriter::new();
        w.add_element(
            CasePath::root().child("materials"),
            template::material("water").unwrap(),
            Some("mid"),
            None,
        )
        .append(
            CasePath::root()
                .children("materials/material")
                .where_child("name", "water")
                .children("density/constant"),
            "998.2",
            Some("Density"),
        );
        assert_eq!(w.write(&mut doc), 0);
        assert_eq!(w.added_ids(), &[2]);
    }
}
