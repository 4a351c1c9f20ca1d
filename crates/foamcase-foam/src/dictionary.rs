//! OpenFOAM dictionary model and serializer.
//!
//! - `FoamValue`: one entry value (word, number, vector, list, tagged, dict)
//! - `FoamDict`: entries in insertion order; re-inserting a key keeps its slot
//! - `DictionaryFile`: a dictionary with its `FoamFile` header, plus the
//!   auxiliary files (tables, boundary data) that must be written next to it
//!
//! Output is deterministic: the same dictionary always serializes to the same
//! bytes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use foamcase_core::document::Vector3;
use foamcase_core::CaseResult;

const INDENT: &str = "    ";
const KEY_WIDTH: usize = 15;

const BANNER: &str = "\
/*--------------------------------*- C++ -*----------------------------------*\\
  =========                 |
  \\\\      /  F ield         | OpenFOAM: The Open Source CFD Toolbox
   \\\\    /   O peration     |
    \\\\  /    A nd           |
     \\\\/     M anipulation  |
\\*---------------------------------------------------------------------------*/
";
const SEPARATOR: &str = "// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //";
const FOOTER: &str = "// ************************************************************************* //";

/// One entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum FoamValue {
    Word(String),
    Float(f64),
    Int(i64),
    Vector(Vector3),
    List(Vec<FoamValue>),
    /// A keyword applied to a value, e.g. `uniform 0` or `table (...)`.
    Tagged(String, Box<FoamValue>),
    Dict(FoamDict),
}

impl FoamValue {
    pub fn word(s: impl Into<String>) -> Self {
        Self::Word(s.into())
    }

    pub fn tagged(kind: impl Into<String>, value: impl Into<FoamValue>) -> Self {
        Self::Tagged(kind.into(), Box::new(value.into()))
    }

    pub fn uniform(value: impl Into<FoamValue>) -> Self {
        Self::tagged("uniform", value)
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FoamValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Numeric value; integers widen to float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FoamValue]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&FoamDict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// `(kind, value)` of a tagged value.
    pub fn as_tagged(&self) -> Option<(&str, &FoamValue)> {
        match self {
            Self::Tagged(k, v) => Some((k, v)),
            _ => None,
        }
    }

    /// The value as it appears after its key, without the trailing `;`.
    pub fn to_inline_string(&self) -> String {
        let mut out = String::new();
        self.write_inline(&mut out);
        out
    }

    fn write_inline(&self, out: &mut String) {
        match self {
            Self::Word(w) => out.push_str(w),
            Self::Float(f) => out.push_str(&format_float(*f)),
            Self::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Vector(v) => {
                let _ = write!(out, "({} {} {})", format_float(v.x), format_float(v.y), format_float(v.z));
            }
            Self::List(items) => {
                out.push('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    item.write_inline(out);
                }
                out.push(')');
            }
            Self::Tagged(kind, value) => {
                out.push_str(kind);
                out.push(' ');
                value.write_inline(out);
            }
            Self::Dict(d) => {
                out.push('{');
                for (k, v) in d.iter() {
                    out.push(' ');
                    out.push_str(k);
                    out.push(' ');
                    v.write_inline(out);
                    out.push(';');
                }
                out.push_str(" }");
            }
        }
    }
}

/// Numbers are written the way OpenFOAM reads them back unchanged:
/// integral values without a fraction, very small or large values in
/// exponent form.
pub fn format_float(f: f64) -> String {
    let a = f.abs();
    if f.fract() == 0.0 && a < 1e15 {
        format!("{f:.0}")
    } else if a != 0.0 && !(1e-4..1e15).contains(&a) {
        format!("{f:e}")
    } else {
        format!("{f}")
    }
}

impl From<&str> for FoamValue {
    fn from(s: &str) -> Self {
        Self::Word(s.to_string())
    }
}

impl From<String> for FoamValue {
    fn from(s: String) -> Self {
        Self::Word(s)
    }
}

impl From<&String> for FoamValue {
    fn from(s: &String) -> Self {
        Self::Word(s.clone())
    }
}

impl From<f64> for FoamValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for FoamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for FoamValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u64> for FoamValue {
    fn from(i: u64) -> Self {
        Self::Int(i as i64)
    }
}

impl From<usize> for FoamValue {
    fn from(i: usize) -> Self {
        Self::Int(i as i64)
    }
}

impl From<bool> for FoamValue {
    fn from(b: bool) -> Self {
        Self::Word(if b { "true" } else { "false" }.to_string())
    }
}

impl From<Vector3> for FoamValue {
    fn from(v: Vector3) -> Self {
        Self::Vector(v)
    }
}

impl From<FoamDict> for FoamValue {
    fn from(d: FoamDict) -> Self {
        Self::Dict(d)
    }
}

impl From<Vec<FoamValue>> for FoamValue {
    fn from(l: Vec<FoamValue>) -> Self {
        Self::List(l)
    }
}

/// Insertion-ordered dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoamDict {
    entries: Vec<(String, FoamValue)>,
}

impl FoamDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FoamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FoamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn extend<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FoamValue>,
    {
        for (k, v) in items {
            self.insert(k, v);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FoamValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&FoamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FoamValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn word(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FoamValue::as_word)
    }

    pub fn dict(&self, key: &str) -> Option<&FoamDict> {
        self.get(key).and_then(FoamValue::as_dict)
    }

    /// Follow `a/b/c` through nested dictionaries.
    pub fn lookup(&self, path: &str) -> Option<&FoamValue> {
        let mut parts = path.split('/');
        let mut cur = self.get(parts.next()?)?;
        for part in parts {
            cur = cur.as_dict()?.get(part)?;
        }
        Some(cur)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FoamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write entries at `depth` levels of indentation.
    pub fn write_entries(&self, out: &mut String, depth: usize) {
        let pad = INDENT.repeat(depth);
        for (key, value) in &self.entries {
            match value {
                FoamValue::Dict(d) => write_block(out, &pad, key, d, depth),
                other => {
                    let _ = write!(out, "{pad}{key:<KEY_WIDTH$} ");
                    other.write_inline(out);
                    out.push_str(";\n");
                }
            }
        }
    }
}

fn write_block(out: &mut String, pad: &str, key: &str, d: &FoamDict, depth: usize) {
    let _ = writeln!(out, "{pad}{key}");
    let _ = writeln!(out, "{pad}{{");
    d.write_entries(out, depth + 1);
    let _ = writeln!(out, "{pad}}}");
}

/// `class` entry of the `FoamFile` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataClass {
    Dictionary,
    VolScalarField,
    VolVectorField,
    PolyBoundaryMesh,
}

impl DataClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataClass::Dictionary => "dictionary",
            DataClass::VolScalarField => "volScalarField",
            DataClass::VolVectorField => "volVectorField",
            DataClass::PolyBoundaryMesh => "polyBoundaryMesh",
        }
    }
}

/// A file produced alongside a dictionary, path relative to the case root.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryFile {
    pub path: PathBuf,
    pub contents: String,
}

/// A dictionary destined for `<case>/<location>/<object>`.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryFile {
    pub class: DataClass,
    pub location: String,
    pub object: String,
    pub data: FoamDict,
    pub auxiliary: Vec<AuxiliaryFile>,
}

impl DictionaryFile {
    pub fn new(class: DataClass, location: impl Into<String>, object: impl Into<String>, data: FoamDict) -> Self {
        Self {
            class,
            location: location.into(),
            object: object.into(),
            data,
            auxiliary: Vec::new(),
        }
    }

    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.location).join(&self.object)
    }

    pub fn to_foam_string(&self) -> String {
        let mut out = String::from(BANNER);
        let header = FoamDict::new()
            .with("version", "2.0")
            .with("format", "ascii")
            .with("class", self.class.as_str())
            .with("location", format!("\"{}\"", self.location))
            .with("object", self.object.as_str());
        write_block(&mut out, "", "FoamFile", &header, 0);
        let _ = writeln!(out, "{SEPARATOR}\n");

        match self.class {
            DataClass::PolyBoundaryMesh => {
                let _ = writeln!(out, "{}\n(", self.data.len());
                for (name, value) in self.data.iter() {
                    match value {
                        FoamValue::Dict(d) => write_block(&mut out, INDENT, name, d, 1),
                        other => {
                            let _ = write!(out, "{INDENT}{name} ");
                            other.write_inline(&mut out);
                            out.push('\n');
                        }
                    }
                }
                out.push_str(")\n");
            }
            _ => self.data.write_entries(&mut out, 0),
        }

        let _ = writeln!(out, "\n{FOOTER}");
        out
    }

    /// Write the dictionary and its auxiliary files under `case_root`,
    /// returning every path written. The text is fully rendered before any
    /// file is touched.
    pub fn write(&self, case_root: &Path) -> CaseResult<Vec<PathBuf>> {
        let text = self.to_foam_string();
        let mut written = Vec::with_capacity(1 + self.auxiliary.len());

        let path = case_root.join(self.relative_path());
        write_file(&path, &text)?;
        written.push(path);

        for aux in &self.auxiliary {
            let path = case_root.join(&aux.path);
            write_file(&path, &aux.contents)?;
            written.push(path);
        }

        tracing::debug!(object = %self.object, location = %self.location, files = written.len(), "dictionary written");
        Ok(written)
    }
}

fn write_file(path: &Path, contents: &str) -> CaseResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}

/// `base/rname`, or just `base` for a single unnamed region.
pub fn region_location(base: &str, rname: &str) -> String {
    if rname.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{rname}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinsert_keeps_position() {
        let mut d = FoamDict::new().with("a", 1).with("b", 2);
        d.insert("a", 3);
        assert_eq!(d.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(d.get("a"), Some(&FoamValue::Int(3)));
    }

    #[test]
    fn floats_render_compactly() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(101325.0), "101325");
        assert_eq!(format_float(0.7), "0.7");
        assert_eq!(format_float(1e-16), "1e-16");
        assert_eq!(format_float(-2.5), "-2.5");
    }

    #[test]
    fn entries_and_blocks() {
        let d = FoamDict::new()
            .with("dimensions", "[0 1 -1 0 0 0 0]")
            .with("internalField", FoamValue::uniform(Vector3::new(1.0, 0.0, 0.0)))
            .with(
                "boundaryField",
                FoamDict::new().with("inlet", FoamDict::new().with("type", "zeroGradient")),
            );
        let mut out = String::new();
        d.write_entries(&mut out, 0);
        assert!(out.contains("internalField   uniform (1 0 0);"));
        assert!(out.contains("boundaryField\n{\n    inlet\n    {\n        type            zeroGradient;\n    }\n}\n"));
    }

    #[test]
    fn nested_lists_render_inline() {
        let table = FoamValue::tagged(
            "table",
            FoamValue::list([
                FoamValue::list([FoamValue::Float(0.0), FoamValue::Vector(Vector3::new(1.0, 2.0, 3.0))]),
                FoamValue::list([FoamValue::Float(1.5), FoamValue::Vector(Vector3::ZERO)]),
            ]),
        );
        let mut out = String::new();
        table.write_inline(&mut out);
        assert_eq!(out, "table ((0 (1 2 3)) (1.5 (0 0 0)))");
    }

    #[test]
    fn lookup_follows_nested_keys() {
        let d = FoamDict::new().with("a", FoamDict::new().with("b", FoamDict::new().with("type", "cyclic")));
        assert_eq!(d.lookup("a/b/type").and_then(FoamValue::as_word), Some("cyclic"));
        assert!(d.lookup("a/c").is_none());
    }

    #[test]
    fn header_names_class_and_location() {
        let f = DictionaryFile::new(DataClass::VolScalarField, "0/fluid", "p", FoamDict::new().with("x", 1));
        let text = f.to_foam_string();
        assert!(text.contains("class           volScalarField;"));
        assert!(text.contains("location        \"0/fluid\";"));
        assert!(text.contains("object          p;"));
        assert!(text.trim_end().ends_with(FOOTER));
    }

    #[test]
    fn boundary_mesh_is_a_counted_list() {
        let data = FoamDict::new()
            .with("inlet", FoamDict::new().with("type", "patch").with("nFaces", 10))
            .with("outlet", FoamDict::new().with("type", "patch").with("nFaces", 10));
        let text = DictionaryFile::new(DataClass::PolyBoundaryMesh, "constant/polyMesh", "boundary", data).to_foam_string();
        assert!(text.contains("2\n(\n    inlet\n    {\n"));
        assert!(text.contains("\n)\n"));
    }

    #[test]
    fn write_creates_directories_and_auxiliary_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = DictionaryFile::new(DataClass::Dictionary, "system/fluid", "fvSchemes", FoamDict::new());
        f.auxiliary.push(AuxiliaryFile {
            path: PathBuf::from("constant/UvsPressure3"),
            contents: "0,100\n".into(),
        });
        let written = f.write(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("system/fluid/fvSchemes").is_file());
        assert_eq!(std::fs::read_to_string(dir.path().join("constant/UvsPressure3")).unwrap(), "0,100\n");
    }

    #[test]
    fn unnamed_region_uses_base_location() {
        assert_eq!(region_location("0", ""), "0");
        assert_eq!(region_location("0", "fluid"), "0/fluid");
    }
}
