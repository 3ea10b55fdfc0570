use std::path::{Path, PathBuf};

mod catalog;
mod config;
mod list;
mod new;
mod terminal;
mod toggle;

use catalog::{Catalog, Departments};
use clap::ArgAction;
use config::Config;
use list::List;
use new::New;
use requisition::Workspace;
use toggle::Toggle;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the requisition log
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List requisitions (default)
    List(List),

    /// Create the workspace configuration
    Init,

    /// Record a new requisition
    New(New),

    /// Flip a requisition between Pending and Completed
    Toggle(Toggle),

    /// Search the stock catalog
    Catalog(Catalog),

    /// List departments
    Departments(Departments),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root)?,
            Self::Init => Init::run(root)?,
            Self::New(command) => command.run(root)?,
            Self::Toggle(command) => command.run(root)?,
            Self::Catalog(command) => command.run(root),
            Self::Departments(command) => command.run(root),
            Self::Config(command) => command.run(&root)?,
        }
        Ok(())
    }
}

struct Init;

impl Init {
    #[instrument]
    fn run(root: PathBuf) -> anyhow::Result<()> {
        use terminal::Colorize;

        let config_path = Workspace::config_path(&root);
        let (workspace, created) = Workspace::init(root).map_err(|e| anyhow::anyhow!(e))?;
        if !created {
            anyhow::bail!(
                "Workspace already initialized (found {})",
                config_path.display()
            );
        }

        let config = workspace.config();
        println!(
            "{}",
            format!(
                "Initialized requisition workspace in {}",
                workspace.root().display()
            )
            .success()
        );
        println!("  Created: {}", relative(&config_path, workspace.root()));
        println!();
        println!("Expected files:");
        println!("  {} (created on first save)", config.log_file.display());
        println!("  {} (stock items, first column)", config.catalog_file.display());
        println!("  {} (departments, first column)", config.departments_file.display());

        Ok(())
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
