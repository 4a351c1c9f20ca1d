//! External file resources referenced by the case.
//!
//! Boundary conditions may name a CSV table (fan curve, spatial profile) by
//! file name. Lookup goes through `FileResources` so generation can read from
//! a project directory or from memory in tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use foamcase_core::{CaseError, CaseResult};

/// A numeric table, row major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the narrowest row.
    pub fn columns(&self) -> usize {
        self.rows.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Parse CSV text. A first row that is not numeric is treated as a header.
    pub fn from_csv(name: &str, text: &str) -> CaseResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| CaseError::resource(format!("{name}: {e}")))?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let parsed: Result<Vec<f64>, _> = record.iter().map(str::parse::<f64>).collect();
            match parsed {
                Ok(row) => rows.push(row),
                Err(_) if i == 0 => continue,
                Err(_) => {
                    return Err(CaseError::resource(format!(
                        "{name}: row {} is not numeric",
                        i + 1
                    )))
                }
            }
        }
        Ok(Self { rows })
    }

    /// Comma separated, no header.
    pub fn to_csv(&self) -> CaseResult<String> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(|e| CaseError::resource(e.to_string()))?;
        }
        let bytes = writer.into_inner().map_err(|e| CaseError::resource(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CaseError::resource(e.to_string()))
    }
}

/// Lookup of named tables.
pub trait FileResources {
    fn table(&self, name: &str) -> CaseResult<Table>;
}

fn require_name(name: &str) -> CaseResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CaseError::resource("no file is referenced"));
    }
    Ok(name)
}

/// Tables stored as files under a directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileResources for DirResources {
    fn table(&self, name: &str) -> CaseResult<Table> {
        let name = require_name(name)?;
        let path = self.root.join(name);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| CaseError::resource(format!("{}: {e}", path.display())))?;
        Table::from_csv(name, &text)
    }
}

/// Tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    tables: BTreeMap<String, Table>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    pub fn with(mut self, name: impl Into<String>, table: Table) -> Self {
        self.insert(name, table);
        self
    }
}

impl FileResources for MemoryResources {
    fn table(&self, name: &str) -> CaseResult<Table> {
        let name = require_name(name)?;
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| CaseError::resource(format!("{name}: not found")))
    }
}
