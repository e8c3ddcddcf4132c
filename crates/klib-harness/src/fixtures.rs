//! Fixture loading and management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Function being tested.
    pub function: String,
    /// C / klib contract reference.
    pub spec_section: String,
    /// Input parameters, shaped per function.
    pub inputs: serde_json::Value,
    /// Expected output, rendered the way the executor renders results.
    pub expected_output: String,
    /// `strict`, `hardened` or `both`.
    pub mode: String,
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp the set was written.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let wrap = |source: HarnessError| HarnessError::FixtureFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        };
        let content = std::fs::read_to_string(path).map_err(|e| wrap(e.into()))?;
        Self::from_json(&content).map_err(|e| wrap(e.into()))
    }
}

/// Loads every `*.json` fixture set in `dir`, sorted by path.
pub fn load_dir(dir: &Path) -> Result<Vec<FixtureSet>, HarnessError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    paths.iter().map(|p| FixtureSet::from_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_reserializes() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"string","captured_at":"2026-01-01T00:00:00Z",
                "cases":[{"name":"len","function":"strlen","spec_section":"klib strlen",
                          "inputs":{"s":"abc"},"expected_output":"3","mode":"both"}]}"#,
        )
        .expect("valid fixture json");
        assert_eq!(set.cases.len(), 1);
        assert_eq!(set.cases[0].inputs["s"], "abc");
        let again = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(again.cases[0].name, "len");
    }

    #[test]
    fn missing_file_names_path() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/klib.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/klib.json"));
    }
}
