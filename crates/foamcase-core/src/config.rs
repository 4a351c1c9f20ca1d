//! Configuration structures for foamcase-core.
//!
//! Callers (CLI, tests, embedding applications) construct a `CoreConfig`
//! explicitly and hand it to the XML codec. The core crate itself does not read
//! environment variables.

use crate::errors::{CaseError, CaseResult};

/// Namespace carried by every case document.
pub const CASE_NAMESPACE: &str = "http://www.baramcfd.org/baram";

/// Name of the document root element.
pub const ROOT_TAG: &str = "configuration";

/// Global configuration container.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoreConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub document: DocumentConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub limits: LimitsConfig,
}

/// How documents are read and written.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentConfig {
    pub namespace: String,
    pub root_tag: String,
    /// Spaces per nesting level in written XML.
    pub indent: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            namespace: CASE_NAMESPACE.to_string(),
            root_tag: ROOT_TAG.to_string(),
            indent: 2,
        }
    }
}

/// Resource limits applied while parsing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimitsConfig {
    pub max_document_bytes: usize,
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 64 * 1024 * 1024,
            max_depth: 64,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> CaseResult<()> {
    if cfg.document.root_tag.is_empty() {
        return Err(CaseError::invalid_argument("root tag must not be empty"));
    }

    if cfg.limits.max_depth == 0 {
        return Err(CaseError::invalid_argument(
            "max_depth must be greater than zero",
        ));
    }

    if cfg.limits.max_document_bytes == 0 {
        return Err(CaseError::invalid_argument(
            "max_document_bytes must be greater than zero",
        ));
    }

    if cfg.document.indent > 8 {
        return Err(CaseError::invalid_argument("indent must not exceed 8"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = CoreConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.document.namespace, CASE_NAMESPACE);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_depth = 0;
        let e = validate_config(&cfg).unwrap_err();
        assert!(format!("{e:?}").contains("max_depth"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_uses_defaults() {
        let cfg: CoreConfig = serde_json::from_str(r#"{"limits":{"max_document_bytes":10,"max_depth":3}}"#).unwrap();
        assert_eq!(cfg.limits.max_depth, 3);
        assert_eq!(cfg.document.indent, 2);
    }
}
