use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for a requisition workspace.
///
/// This struct holds the locations of the backing files, the department used
/// when none are configured, and how tolerant loading should be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The XML requisition log.
    ///
    /// Relative paths are resolved against the workspace root.
    pub log_file: PathBuf,

    /// The CSV file listing stock items (first column, with a header row).
    pub catalog_file: PathBuf,

    /// The CSV file listing departments (first column, no header row).
    pub departments_file: PathBuf,

    /// The department offered when the departments file is missing or empty.
    pub default_department: String,

    /// Encodings tried, in order, when a CSV file does not decode cleanly
    /// under its detected encoding.
    ///
    /// These are WHATWG encoding labels, such as `utf-8` or `windows-1252`.
    fallback_encodings: Vec<String>,

    /// Whether a log record missing a required field is skipped (`true`) or
    /// makes the whole log unreadable (`false`, the default).
    pub skip_malformed_records: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            catalog_file: default_catalog_file(),
            departments_file: default_departments_file(),
            default_department: default_department(),
            fallback_encodings: default_fallback_encodings(),
            skip_malformed_records: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the fallback encoding labels.
    #[must_use]
    pub fn fallback_encodings(&self) -> &[String] {
        &self.fallback_encodings
    }

    /// Replaces the fallback encoding labels.
    ///
    /// Labels are normalized to lowercase. Duplicates are dropped.
    pub fn set_fallback_encodings<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fallback_encodings.clear();
        for label in labels {
            let label = label.as_ref().trim().to_lowercase();
            if !label.is_empty() && !self.fallback_encodings.contains(&label) {
                self.fallback_encodings.push(label);
            }
        }
    }

    /// Resolve `path` against `root` unless it is already absolute.
    #[must_use]
    pub fn resolve(root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("log_data.xml")
}

fn default_catalog_file() -> PathBuf {
    PathBuf::from("stock_items.csv")
}

fn default_departments_file() -> PathBuf {
    PathBuf::from("departments.csv")
}

fn default_department() -> String {
    "General".to_string()
}

fn default_fallback_encodings() -> Vec<String> {
    vec!["utf-8".to_string(), "windows-1252".to_string()]
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_log_file")]
        log_file: PathBuf,

        #[serde(default = "default_catalog_file")]
        catalog_file: PathBuf,

        #[serde(default = "default_departments_file")]
        departments_file: PathBuf,

        #[serde(default = "default_department")]
        default_department: String,

        #[serde(default = "default_fallback_encodings")]
        fallback_encodings: Vec<String>,

        #[serde(default)]
        skip_malformed_records: bool,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                log_file,
                catalog_file,
                departments_file,
                default_department,
                fallback_encodings,
                skip_malformed_records,
            } => Self {
                log_file,
                catalog_file,
                departments_file,
                default_department,
                fallback_encodings,
                skip_malformed_records,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            log_file: config.log_file,
            catalog_file: config.catalog_file,
            departments_file: config.departments_file,
            default_department: config.default_department,
            fallback_encodings: config.fallback_encodings,
            skip_malformed_records: config.skip_malformed_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nlog_file = \"data/log.xml\"\ndefault_department = \"Stores\"\nfallback_encodings = [\"shift_jis\"]\nskip_malformed_records = true\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.log_file, PathBuf::from("data/log.xml"));
        assert_eq!(config.catalog_file, PathBuf::from("stock_items.csv"));
        assert_eq!(config.default_department, "Stores");
        assert_eq!(config.fallback_encodings(), &["shift_jis".to_string()]);
        assert!(config.skip_malformed_records);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nskip_malformed_records = \"sometimes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.default_department = "Workshop".to_string();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn fallback_labels_are_normalized() {
        let mut config = Config::default();
        config.set_fallback_encodings(["UTF-8", " utf-8 ", "", "Latin1"]);
        assert_eq!(
            config.fallback_encodings(),
            &["utf-8".to_string(), "latin1".to_string()]
        );
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let root = Path::new("/srv/stores");
        assert_eq!(
            Config::resolve(root, Path::new("log.xml")),
            PathBuf::from("/srv/stores/log.xml")
        );
        assert_eq!(
            Config::resolve(root, Path::new("/tmp/log.xml")),
            PathBuf::from("/tmp/log.xml")
        );
    }
}
