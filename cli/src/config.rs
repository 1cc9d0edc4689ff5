//! Run configuration.
//!
//! Loaded once at startup from a JSON document, validated against the
//! embedded schema, and then passed by reference to every stage. Nothing
//! mutates it after [`Config::load`] returns.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::validate_config;

/// Default location of the configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable consulted when the document has no `password`.
pub const PASSWORD_ENV_VAR: &str = "GRIZZLY_PASSWORD";

/// Process-wide settings for one run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the Grizzly API, without trailing slash.
    pub api_url: String,
    pub username: String,
    #[serde(default)]
    password: Option<String>,
    /// Verify the API's TLS certificate. Defaults to on.
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    pub output_directory: PathBuf,
    /// Name of the CSV an `.xlsx` extract is converted to.
    pub output_filename: String,
    /// Name of the canonical output file.
    pub processed_filename: String,
    /// Root holding one `"{term} {year}"` directory per term.
    pub data_directory: PathBuf,
    pub data: DataConfig,
}

/// The `data` sub-document: what to keep and how to rewrite it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// Source columns to keep, in output order.
    pub columns: Vec<String>,
    /// Org units whose rows are dropped.
    #[serde(default)]
    pub acad_orgs_to_remove: BTreeSet<String>,
    /// Org unit renames, old code to new code.
    #[serde(default)]
    pub acad_org_transforms: HashMap<String, String>,
}

fn default_verify_ssl() -> bool {
    true
}

impl Config {
    /// Load and validate the configuration document at `path`.
    ///
    /// A missing file is fatal; there is no fallback to an empty config.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Validate an already-parsed document and build the config.
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        validate_config(&value).map_err(|errors| ConfigError::Invalid { errors })?;

        let mut config: Config = serde_json::from_value(value)?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        if config.password.is_none() {
            config.password = std::env::var(PASSWORD_ENV_VAR).ok();
        }
        Ok(config)
    }

    /// API password from the document, or from `GRIZZLY_PASSWORD`.
    pub fn password(&self) -> ConfigResult<&str> {
        self.password.as_deref().ok_or_else(|| {
            ConfigError::MissingCredential(format!(
                "no `password` in config and {} is not set",
                PASSWORD_ENV_VAR
            ))
        })
    }

    /// Where a converted `.xlsx` extract is written and read back from.
    pub fn converted_path(&self) -> PathBuf {
        self.output_directory.join(&self.output_filename)
    }

    /// Where the canonical output file is written.
    pub fn processed_path(&self) -> PathBuf {
        self.output_directory.join(&self.processed_filename)
    }

    /// Data directory for one term, e.g. `data/Fall 2022`.
    pub fn term_directory(&self, term: &str, year: u16) -> PathBuf {
        self.data_directory.join(format!("{} {}", term, year))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    pub(crate) fn sample_document() -> Value {
        json!({
            "api_url": "https://grizzly.example.edu/api/",
            "username": "registrar",
            "password": "secret",
            "output_directory": "out",
            "output_filename": "extract.csv",
            "processed_filename": "processed.csv",
            "data_directory": "data",
            "data": {
                "columns": [
                    "Acad Org", "Session", "Term", "Class Stat", "Subject", "Catalog#",
                    "Section", "Class Title", "Class#", "Name", "Start Date", "End Date",
                    "Blackboard Course ID"
                ],
                "acad_orgs_to_remove": ["EXCL"],
                "acad_org_transforms": { "OLDPRG": "NEWPRG" }
            }
        })
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_value(sample_document()).unwrap();

        assert_eq!(config.api_url, "https://grizzly.example.edu/api");
        assert_eq!(config.password().unwrap(), "secret");
        assert!(config.verify_ssl);
        assert_eq!(config.data.columns.len(), 13);
        assert!(config.data.acad_orgs_to_remove.contains("EXCL"));
        assert_eq!(config.data.acad_org_transforms["OLDPRG"], "NEWPRG");
    }

    #[test]
    fn test_derived_paths() {
        let config = Config::from_value(sample_document()).unwrap();

        assert_eq!(config.processed_path(), Path::new("out/processed.csv"));
        assert_eq!(config.converted_path(), Path::new("out/extract.csv"));
        assert_eq!(
            config.term_directory("Fall", 2022),
            Path::new("data/Fall 2022")
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = Config::load(dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, sample_document().to_string()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.username, "registrar");
    }

    #[test]
    fn test_schema_violation_reported() {
        let mut doc = sample_document();
        doc.as_object_mut().unwrap().remove("data");

        let err = Config::from_value(doc).unwrap_err();
        match err {
            ConfigError::Invalid { errors } => assert!(errors[0].contains("data")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Config::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_verify_ssl_explicitly_disabled() {
        let mut doc = sample_document();
        doc["verify_ssl"] = json!(false);

        let config = Config::from_value(doc).unwrap();
        assert!(!config.verify_ssl);
    }
}
