//! Typed configuration store.
//!
//! `CaseDocument` owns one element tree and exposes typed reads and writes
//! addressed by `CasePath`. All mutation is in memory; persisting is the
//! caller's business (`to_xml_string` / `save`).
//!
//! `CaseSession` wraps a document behind a lock so that writer commits from
//! different workflows are serialized.

pub mod element;
pub mod path;
pub mod xml;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::CoreConfig;
use crate::errors::{CaseError, CaseResult};
use crate::version;

pub use element::Element;
pub use path::{CasePath, NodeIndex};

/// Cartesian triple read from `x`, `y`, `z` children.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn cross(self, o: Vector3) -> Self {
        Self::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn add(self, o: Vector3) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n == 0.0 {
            self
        } else {
            self.scaled(1.0 / n)
        }
    }

    /// Parse a whitespace separated triple such as `"1 0 0"`.
    pub fn parse_triple(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [x, y, z] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// An in-memory case document.
#[derive(Debug, Clone)]
pub struct CaseDocument {
    root: Element,
    config: CoreConfig,
    /// Last id handed out per id attribute, so ids are not reused after removal.
    id_counters: BTreeMap<String, u64>,
}

impl PartialEq for CaseDocument {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl CaseDocument {
    pub fn new(root: Element) -> Self {
        Self::with_config(root, CoreConfig::default())
    }

    pub fn with_config(root: Element, config: CoreConfig) -> Self {
        Self {
            root,
            config,
            id_counters: BTreeMap::new(),
        }
    }

    pub fn from_xml_str(xml: &str) -> CaseResult<Self> {
        Self::from_xml_str_with(xml, CoreConfig::default())
    }

    pub fn from_xml_str_with(xml: &str, config: CoreConfig) -> CaseResult<Self> {
        crate::config::validate_config(&config)?;
        let root = xml::parse_element(xml, &config)?;
        if root.tag() != config.document.root_tag {
            return Err(CaseError::invalid_argument(format!(
                "expected root element <{}>, found <{}>",
                config.document.root_tag,
                root.tag()
            )));
        }
        Ok(Self::with_config(root, config))
    }

    pub fn load(path: impl AsRef<Path>) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_xml_str(&text)
    }

    pub fn to_xml_string(&self) -> String {
        xml::write_document(&self.root, &self.config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CaseResult<()> {
        std::fs::write(path.as_ref(), self.to_xml_string())?;
        Ok(())
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Root `version` attribute.
    pub fn version(&self) -> CaseResult<u32> {
        let raw = self.root.attribute("version").ok_or_else(|| CaseError::AttributeNotFound {
            path: ".".to_string(),
            name: "version".to_string(),
        })?;
        version::parse_version(raw)
    }

    pub fn set_version(&mut self, v: u32) {
        self.root.set_attribute("version", v.to_string());
    }

    /// SHA-256 of the serialized document, lowercase hex.
    #[cfg(feature = "sha256")]
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut h = Sha256::new();
        h.update(self.to_xml_string().as_bytes());
        hex::encode(h.finalize())
    }

    // ---- queries ----

    pub fn exists(&self, path: &CasePath) -> bool {
        !path.evaluate(&self.root).is_empty()
    }

    /// All matches, in document order.
    pub fn get_elements(&self, path: &CasePath) -> Vec<&Element> {
        path.evaluate(&self.root)
            .iter()
            .filter_map(|idx| path::node_at(&self.root, idx))
            .collect()
    }

    /// First match.
    pub fn element(&self, path: &CasePath) -> CaseResult<&Element> {
        self.get_elements(path)
            .into_iter()
            .next()
            .ok_or_else(|| CaseError::path_not_found(path))
    }

    pub fn element_mut(&mut self, path: &CasePath) -> CaseResult<&mut Element> {
        let idx = self.first_index(path)?;
        path::node_at_mut(&mut self.root, &idx).ok_or_else(|| CaseError::path_not_found(path))
    }

    /// Positions of all matches, in document order.
    pub fn indices(&self, path: &CasePath) -> Vec<NodeIndex> {
        path.evaluate(&self.root)
    }

    pub fn node_mut(&mut self, idx: &[usize]) -> Option<&mut Element> {
        path::node_at_mut(&mut self.root, idx)
    }

    fn first_index(&self, path: &CasePath) -> CaseResult<NodeIndex> {
        path.evaluate(&self.root)
            .into_iter()
            .next()
            .ok_or_else(|| CaseError::path_not_found(path))
    }

    /// Leaf text of the first match. Missing text reads as `""`.
    pub fn get_value(&self, path: &CasePath) -> CaseResult<String> {
        Ok(self.element(path)?.text().to_string())
    }

    /// Leaf text parsed as `f64`.
    pub fn get_float(&self, path: &CasePath) -> CaseResult<f64> {
        let raw = self.get_value(path)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| CaseError::conversion(path, raw, "float"))
    }

    pub fn get_int(&self, path: &CasePath) -> CaseResult<i64> {
        let raw = self.get_value(path)?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| CaseError::conversion(path, raw, "integer"))
    }

    /// `true` / `false` leaf text.
    pub fn get_bool(&self, path: &CasePath) -> CaseResult<bool> {
        let raw = self.get_value(path)?;
        match raw.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(CaseError::conversion(path, raw.clone(), "boolean")),
        }
    }

    /// Whitespace separated list of integer ids, e.g. secondary materials.
    pub fn get_id_list(&self, path: &CasePath) -> CaseResult<Vec<u64>> {
        let raw = self.get_value(path)?;
        raw.split_whitespace()
            .map(|t| {
                t.parse::<u64>()
                    .map_err(|_| CaseError::conversion(path, raw.clone(), "id list"))
            })
            .collect()
    }

    /// Read the `x`, `y`, `z` children under `path`.
    pub fn get_vector(&self, path: &CasePath) -> CaseResult<Vector3> {
        Ok(Vector3::new(
            self.get_float(&path.clone().child("x"))?,
            self.get_float(&path.clone().child("y"))?,
            self.get_float(&path.clone().child("z"))?,
        ))
    }

    pub fn get_attribute(&self, path: &CasePath, name: &str) -> CaseResult<String> {
        self.element(path)?
            .attribute(name)
            .map(str::to_string)
            .ok_or_else(|| CaseError::AttributeNotFound {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    /// Optional sub-configuration flag: enabled unless `disabled="true"`.
    pub fn is_enabled(&self, path: &CasePath) -> CaseResult<bool> {
        Ok(self.element(path)?.attribute("disabled") != Some("true"))
    }

    // ---- mutation ----

    pub fn set_value(&mut self, path: &CasePath, value: impl Into<String>) -> CaseResult<()> {
        self.element_mut(path)?.set_text(value);
        Ok(())
    }

    pub fn set_vector(&mut self, path: &CasePath, v: Vector3) -> CaseResult<()> {
        self.set_value(&path.clone().child("x"), v.x.to_string())?;
        self.set_value(&path.clone().child("y"), v.y.to_string())?;
        self.set_value(&path.clone().child("z"), v.z.to_string())?;
        Ok(())
    }

    pub fn set_attribute(&mut self, path: &CasePath, name: &str, value: impl Into<String>) -> CaseResult<()> {
        self.element_mut(path)?.set_attribute(name, value.into());
        Ok(())
    }

    /// Insert a keyed entity under `parent`, stamping a fresh integer id into
    /// `id_attribute`. Returns the id.
    pub fn add_element(&mut self, parent: &CasePath, mut element: Element, id_attribute: &str) -> CaseResult<u64> {
        let id = self.next_id(id_attribute);
        element.set_attribute(id_attribute, id.to_string());
        self.append_element(parent, element)?;
        self.id_counters.insert(id_attribute.to_string(), id);
        tracing::debug!(parent = %parent, attribute = id_attribute, id, "added element");
        Ok(id)
    }

    /// Id the next `add_element` call will use for this attribute.
    pub fn next_id(&self, id_attribute: &str) -> u64 {
        let highest_live = self
            .get_elements(&CasePath::root().any_descendant())
            .into_iter()
            .filter_map(|e| e.attribute(id_attribute))
            .filter_map(|v| v.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let issued = self.id_counters.get(id_attribute).copied().unwrap_or(0);
        highest_live.max(issued) + 1
    }

    pub fn append_element(&mut self, parent: &CasePath, element: Element) -> CaseResult<()> {
        self.element_mut(parent)?.push_child(element);
        Ok(())
    }

    pub fn insert_element(&mut self, parent: &CasePath, index: usize, element: Element) -> CaseResult<()> {
        self.element_mut(parent)?.insert_child(index, element);
        Ok(())
    }

    /// Detach every match together with its descendants.
    pub fn remove_element(&mut self, path: &CasePath) -> CaseResult<usize> {
        let hits = path.evaluate(&self.root);
        if hits.is_empty() {
            return Err(CaseError::path_not_found(path));
        }
        if hits.iter().any(|idx| idx.is_empty()) {
            return Err(CaseError::invalid_argument("cannot remove the document root"));
        }

        // Later siblings first, so earlier indices stay valid.
        let mut removed = 0;
        for idx in hits.iter().rev() {
            let (last, parent_idx) = match idx.split_last() {
                Some(v) => v,
                None => continue,
            };
            if let Some(parent) = path::node_at_mut(&mut self.root, parent_idx) {
                if *last < parent.children().len() {
                    parent.children_mut().remove(*last);
                    removed += 1;
                }
            }
        }
        tracing::debug!(path = %path, removed, "removed elements");
        Ok(removed)
    }

    /// Apply `f` to every match, later matches first.
    ///
    /// Reverse order keeps the positions of not-yet-visited matches valid even
    /// when `f` inserts or removes children.
    pub fn for_each_mut<F>(&mut self, path: &CasePath, mut f: F) -> CaseResult<usize>
    where
        F: FnMut(&mut Element) -> CaseResult<()>,
    {
        let hits = path.evaluate(&self.root);
        for idx in hits.iter().rev() {
            if let Some(node) = path::node_at_mut(&mut self.root, idx) {
                f(node)?;
            }
        }
        Ok(hits.len())
    }

    /// Replace the root wholesale; used by the writer to commit a staged copy.
    pub(crate) fn replace_root(&mut self, root: Element) {
        self.root = root;
    }

    pub(crate) fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }
}

/// A document owned by one logical actor at a time.
///
/// Readers share the lock; writer commits take it exclusively.
#[derive(Debug)]
pub struct CaseSession {
    doc: RwLock<CaseDocument>,
}

impl CaseSession {
    pub fn new(doc: CaseDocument) -> Self {
        Self { doc: RwLock::new(doc) }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, CaseDocument> {
        self.doc.read()
    }

    pub fn write_lock(&self) -> RwLockWriteGuard<'_, CaseDocument> {
        self.doc.write()
    }

    /// Validate and commit a writer batch under the exclusive lock.
    pub fn commit(&self, writer: &mut crate::writer::CoreDbWriter) -> usize {
        let mut guard = self.doc.write();
        writer.write(&mut guard)
    }

    pub fn into_inner(self) -> CaseDocument {
        self.doc.into_inner()
    }
}
