use std::path::PathBuf;

use clap::Parser;
use requisition::{Config, Workspace};

use super::terminal::Colorize;

/// Command arguments for `reqlog catalog`.
#[derive(Debug, Parser)]
pub struct Catalog {
    /// Show only items containing this text (case-insensitive).
    query: Option<String>,
}

impl Catalog {
    pub fn run(self, root: PathBuf) {
        let workspace = Workspace::open(root);
        let catalog = workspace.catalog();

        if catalog.is_empty() {
            let path = Config::resolve(workspace.root(), &workspace.config().catalog_file);
            eprintln!(
                "{}",
                format!("No stock items loaded from {}", path.display()).warning()
            );
        }

        for item in catalog.suggest(self.query.as_deref().unwrap_or_default()) {
            println!("{item}");
        }
    }
}

/// Command arguments for `reqlog departments`.
#[derive(Debug, Parser)]
pub struct Departments {
    /// Show only departments starting with this text (case-insensitive).
    prefix: Option<String>,
}

impl Departments {
    pub fn run(self, root: PathBuf) {
        let departments = Workspace::open(root).departments();
        for name in departments.filter_by_prefix(self.prefix.as_deref().unwrap_or_default()) {
            println!("{name}");
        }
    }
}
