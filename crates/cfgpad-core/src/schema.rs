//! JSON-schema association by file pattern.
//!
//! A document is validated against the first schema whose `file_match` patterns match its
//! name. Patterns are globs (`*`, `?`, `**`) matched against the trailing path segments of
//! the document identifier, so `config.yaml` matches both `config.yaml` and
//! `file:///tmp/cfgpad/config.yaml`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema endpoint served next to the config endpoints.
pub const DEFAULT_SCHEMA_URI: &str = "/api/v1/cfg/schema";

/// Document name the default schema applies to.
pub const DEFAULT_DOCUMENT_NAME: &str = "config.yaml";

/// Errors produced while compiling schema associations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A `file_match` pattern could not be compiled.
    #[error("invalid file pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending glob.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}

/// One schema and the documents it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Schema location; may be relative to the config server.
    pub uri: String,
    /// Glob patterns selecting the documents validated by this schema.
    #[serde(alias = "fileMatch")]
    pub file_match: Vec<String>,
}

impl SchemaSettings {
    /// Create settings for one schema.
    pub fn new(uri: impl Into<String>, file_match: Vec<String>) -> Self {
        Self {
            uri: uri.into(),
            file_match,
        }
    }

    /// Returns true if `uri` is not absolute (no scheme).
    pub fn is_relative(&self) -> bool {
        !self.uri.contains("://")
    }
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_URI, vec![DEFAULT_DOCUMENT_NAME.to_string()])
    }
}

#[derive(Debug)]
struct CompiledSchema {
    settings: SchemaSettings,
    patterns: Vec<Regex>,
}

/// Compiled schema list, queried by document name.
#[derive(Debug)]
pub struct SchemaAssociations {
    schemas: Vec<CompiledSchema>,
}

impl SchemaAssociations {
    /// Compile every pattern of `schemas`.
    pub fn new(schemas: Vec<SchemaSettings>) -> Result<Self, SchemaError> {
        let schemas = schemas
            .into_iter()
            .map(|settings| {
                let patterns = settings
                    .file_match
                    .iter()
                    .map(|pattern| glob_to_regex(pattern))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledSchema { settings, patterns })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(Self { schemas })
    }

    /// The schema applying to `document`, if any. First match wins.
    pub fn schema_for(&self, document: &str) -> Option<&SchemaSettings> {
        self.schemas
            .iter()
            .find(|schema| schema.patterns.iter().any(|re| re.is_match(document)))
            .map(|schema| &schema.settings)
    }

    /// All configured schemas, in priority order.
    pub fn settings(&self) -> impl Iterator<Item = &SchemaSettings> {
        self.schemas.iter().map(|schema| &schema.settings)
    }

    /// Number of configured schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schema is configured.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn glob_to_regex(pattern: &str) -> Result<Regex, SchemaError> {
    let mut out = String::from("(?:^|/)");
    let mut chars = pattern.trim_start_matches('/').chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // `**/` also matches zero directories.
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');

    Regex::new(&out).map_err(|source| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn associations(patterns: &[&str]) -> SchemaAssociations {
        SchemaAssociations::new(vec![SchemaSettings::new(
            "https://schemas.example/a.json",
            patterns.iter().map(|p| p.to_string()).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn test_default_matches_config_yaml_anywhere() {
        let assoc = SchemaAssociations::new(vec![SchemaSettings::default()]).unwrap();
        assert_eq!(
            assoc.schema_for("config.yaml").map(|s| s.uri.as_str()),
            Some(DEFAULT_SCHEMA_URI)
        );
        assert!(assoc.schema_for("file:///srv/app/config.yaml").is_some());
        assert!(assoc.schema_for("myconfig.yaml").is_none());
        assert!(assoc.schema_for("config.yaml.bak").is_none());
    }

    #[test]
    fn test_star_stays_within_segment() {
        let assoc = associations(&["*.yaml"]);
        assert!(assoc.schema_for("a.yaml").is_some());
        assert!(assoc.schema_for("dir/a.yaml").is_some());
        assert!(assoc.schema_for("a.yml").is_none());
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let assoc = associations(&["deploy/**/values.yaml"]);
        assert!(assoc.schema_for("deploy/values.yaml").is_some());
        assert!(assoc.schema_for("deploy/prod/eu/values.yaml").is_some());
        assert!(assoc.schema_for("other/values.yaml").is_none());
    }

    #[test]
    fn test_dots_are_literal() {
        let assoc = associations(&["a.yaml"]);
        assert!(assoc.schema_for("axyaml").is_none());
    }

    #[test]
    fn test_relative_uri_detection() {
        assert!(SchemaSettings::default().is_relative());
        assert!(!SchemaSettings::new("http://h/s.json", vec![]).is_relative());
    }
}
