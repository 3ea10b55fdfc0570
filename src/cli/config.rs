use std::path::{Path, PathBuf};

use clap::Parser;
use requisition::Workspace;
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `reqlog config`.
#[derive(Debug, Parser)]
pub struct Config {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration (default)
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = Workspace::config_path(root);

        match self.command.unwrap_or(ConfigCommand::Show) {
            ConfigCommand::Show => {
                let workspace = Workspace::open(root.to_path_buf());
                let config = workspace.config();

                println!(
                    "Configuration{}:",
                    if config_path.exists() {
                        String::new()
                    } else {
                        " (defaults)".dim()
                    }
                );
                println!("  log_file: {}", config.log_file.display());
                println!("  catalog_file: {}", config.catalog_file.display());
                println!("  departments_file: {}", config.departments_file.display());
                println!("  default_department: {}", config.default_department);
                println!(
                    "  fallback_encodings: {}",
                    config.fallback_encodings().join(", ")
                );
                println!(
                    "  skip_malformed_records: {}",
                    config.skip_malformed_records
                );
            }
            ConfigCommand::Set { key, value } => {
                let mut config = if config_path.exists() {
                    requisition::Config::load(&config_path).map_err(|e| anyhow::anyhow!("{e}"))?
                } else {
                    requisition::Config::default()
                };

                apply(&mut config, &key, &value)?;

                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;

                println!("{}", format!("{key} = {value}").success());
            }
        }

        Ok(())
    }
}

fn apply(config: &mut requisition::Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "log_file" => config.log_file = PathBuf::from(value),
        "catalog_file" => config.catalog_file = PathBuf::from(value),
        "departments_file" => config.departments_file = PathBuf::from(value),
        "default_department" => {
            let value = value.trim();
            if value.is_empty() {
                anyhow::bail!("default_department must not be empty");
            }
            config.default_department = value.to_string();
        }
        "fallback_encodings" => config.set_fallback_encodings(value.split(',')),
        "skip_malformed_records" => {
            config.skip_malformed_records = value
                .parse::<bool>()
                .map_err(|_| anyhow::anyhow!("Value must be 'true' or 'false'"))?;
        }
        _ => anyhow::bail!(
            "Unknown configuration key: {key}\nSupported keys: log_file, catalog_file, \
             departments_file, default_department, fallback_encodings, skip_malformed_records"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use test_case::test_case;

    use super::*;

    fn set(root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
        Config {
            command: Some(ConfigCommand::Set {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
        .run(root)
    }

    #[test]
    fn set_persists_value() {
        let tmp = tempdir().unwrap();

        set(tmp.path(), "skip_malformed_records", "true").unwrap();
        set(tmp.path(), "fallback_encodings", "UTF-8, latin1").unwrap();

        let workspace = Workspace::open(tmp.path().to_path_buf());
        assert!(workspace.config().skip_malformed_records);
        assert_eq!(
            workspace.config().fallback_encodings(),
            &["utf-8".to_string(), "latin1".to_string()]
        );
    }

    #[test_case("skip_malformed_records", "maybe"; "non boolean")]
    #[test_case("default_department", "  "; "blank department")]
    #[test_case("colour", "red"; "unknown key")]
    fn set_rejects_bad_input(key: &str, value: &str) {
        let tmp = tempdir().unwrap();
        assert!(set(tmp.path(), key, value).is_err());
        assert!(!Workspace::config_path(tmp.path()).exists());
    }
}
