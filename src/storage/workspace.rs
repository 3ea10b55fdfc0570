//! A directory holding a requisition log and its lists
//!
//! The [`Workspace`] ties a root directory to its [`Config`] and hands out the
//! store and the loaders with the configured paths resolved against the
//! root.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Catalog, Config, Departments},
    storage::{
        decode::TextDecoder,
        lists,
        store::{LoadMode, RequisitionStore},
    },
};

/// Directory holding per-workspace settings.
pub const CONFIG_DIR: &str = ".reqlog";

/// A requisition workspace rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Open the workspace at `root`.
    ///
    /// The configuration is read from `.reqlog/config.toml`. A missing or
    /// invalid file falls back to the defaults.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self { root, config }
    }

    /// Use the given configuration instead of the one on disk.
    #[must_use]
    pub const fn with_config(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    /// Create the settings directory and write a default configuration.
    ///
    /// An existing configuration is left alone. Returns the opened workspace
    /// and whether a new configuration file was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn init(root: PathBuf) -> Result<(Self, bool), String> {
        let path = Self::config_path(&root);
        if path.exists() {
            return Ok((Self::open(root), false));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        let config = Config::default();
        config.save(&path)?;
        tracing::info!("Wrote default configuration to {}", path.display());

        Ok((Self::with_config(root, config), true))
    }

    /// The configuration file location for a workspace rooted at `root`.
    #[must_use]
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join("config.toml")
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The requisition log, with the configured load mode.
    #[must_use]
    pub fn store(&self) -> RequisitionStore {
        let mode = if self.config.skip_malformed_records {
            LoadMode::SkipMalformed
        } else {
            LoadMode::Strict
        };
        RequisitionStore::new(Config::resolve(&self.root, &self.config.log_file)).with_mode(mode)
    }

    /// A decoder using the configured fallback encodings.
    #[must_use]
    pub fn decoder(&self) -> TextDecoder {
        TextDecoder::from_labels(self.config.fallback_encodings())
    }

    /// The stock catalog. Empty if the file is missing or unreadable.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        let path = Config::resolve(&self.root, &self.config.catalog_file);
        lists::load_catalog(&path, &self.decoder())
    }

    /// The department list, or the default department if there is none.
    #[must_use]
    pub fn departments(&self) -> Departments {
        let path = Config::resolve(&self.root, &self.config.departments_file);
        lists::load_departments(&path, &self.decoder())
            .or_default_department(&self.config.default_department)
    }
}

fn load_config(root: &Path) -> Config {
    let path = Workspace::config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_apply_without_config() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::open(tmp.path().to_path_buf());

        assert_eq!(workspace.config(), &Config::default());
        assert_eq!(workspace.store().path(), tmp.path().join("log_data.xml"));
        assert_eq!(workspace.store().mode(), LoadMode::Strict);
    }

    #[test]
    fn init_writes_config_once() {
        let tmp = TempDir::new().unwrap();

        let (_, created) = Workspace::init(tmp.path().to_path_buf()).unwrap();
        assert!(created);
        assert!(Workspace::config_path(tmp.path()).exists());

        let (_, created) = Workspace::init(tmp.path().to_path_buf()).unwrap();
        assert!(!created);
    }

    #[test]
    fn config_on_disk_is_honoured() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(CONFIG_DIR)).unwrap();
        fs::write(
            Workspace::config_path(tmp.path()),
            "_version = \"1\"\nlog_file = \"data/requisitions.xml\"\nskip_malformed_records = true\n",
        )
        .unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf());

        assert_eq!(
            workspace.store().path(),
            tmp.path().join("data/requisitions.xml")
        );
        assert_eq!(workspace.store().mode(), LoadMode::SkipMalformed);
    }

    #[test]
    fn missing_departments_offer_default() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::open(tmp.path().to_path_buf());

        assert_eq!(workspace.departments().names(), &["General".to_string()]);
        assert!(workspace.catalog().is_empty());
    }

    #[test]
    fn lists_are_read_from_configured_paths() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("stock_items.csv"), "Name\nGloves\nBoots\n").unwrap();
        fs::write(tmp.path().join("departments.csv"), "Stores\nWorkshop\n").unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf());

        assert_eq!(workspace.catalog().len(), 2);
        assert_eq!(
            workspace.departments().names(),
            &["Stores".to_string(), "Workshop".to_string()]
        );
    }
}
