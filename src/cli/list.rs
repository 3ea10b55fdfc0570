use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use regex::Regex;
use requisition::{Requisition, Status, Workspace};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Command arguments for `reqlog list`.
#[derive(Debug, Parser, Default)]
pub struct List {
    /// Show only requisitions with this status.
    #[arg(long)]
    status: Option<Status>,

    /// Show only requisitions for this department (case-insensitive).
    #[arg(long)]
    department: Option<String>,

    /// Case-insensitive substring match against requester and item names.
    #[arg(long, conflicts_with = "regex")]
    contains: Option<String>,

    /// Regular expression match against requester and item names.
    #[arg(long)]
    regex: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Print only ids, one per line.
    #[arg(long, short)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root);
        let store = workspace.store();
        let requisitions = store.load();

        let filter = Filter::new(&self)?;
        let selected: Vec<_> = requisitions.iter().filter(|r| filter.matches(r)).collect();

        if self.quiet {
            for requisition in &selected {
                println!("{}", requisition.id());
            }
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => render_json(&selected)?,
            OutputFormat::Table if selected.is_empty() => {
                if requisitions.is_empty() {
                    println!("No requisitions in {}", store.path().display());
                } else {
                    println!("{}", "No requisitions match the given filters".dim());
                }
            }
            OutputFormat::Table if terminal::is_narrow() => render_stacked(&selected),
            OutputFormat::Table => render_table(&selected),
        }

        Ok(())
    }
}

struct Filter {
    status: Option<Status>,
    department: Option<String>,
    contains: Option<String>,
    regex: Option<Regex>,
}

impl Filter {
    fn new(args: &List) -> anyhow::Result<Self> {
        let regex = args
            .regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --regex pattern")?;

        Ok(Self {
            status: args.status,
            department: args.department.as_deref().map(str::trim).map(str::to_lowercase),
            contains: args.contains.clone(),
            regex,
        })
    }

    fn matches(&self, requisition: &Requisition) -> bool {
        if self.status.is_some_and(|status| status != requisition.status()) {
            return false;
        }

        if let Some(department) = &self.department {
            if requisition.department().to_lowercase() != *department {
                return false;
            }
        }

        if let Some(needle) = &self.contains {
            if !requisition.mentions(needle) {
                return false;
            }
        }

        if let Some(regex) = &self.regex {
            let hit = regex.is_match(requisition.requester())
                || requisition.items().iter().any(|item| regex.is_match(&item.name));
            if !hit {
                return false;
            }
        }

        true
    }
}

fn items_summary(requisition: &Requisition) -> String {
    requisition
        .items()
        .iter()
        .map(|item| format!("{} x{}", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_table(requisitions: &[&Requisition]) {
    let colour = terminal::colour_enabled();
    let headers = ["ID", "Date", "Requester", "Department", "Status", "Items"];

    let rows: Vec<[String; 6]> = requisitions
        .iter()
        .map(|r| {
            [
                r.id().to_string(),
                r.date().to_string(),
                r.requester().to_string(),
                r.department().to_string(),
                r.status().to_string(),
                items_summary(r),
            ]
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for (row, requisition) in rows.iter().zip(requisitions) {
        for (idx, value) in row.iter().enumerate() {
            let width = widths[idx];
            if idx == 4 {
                let label = terminal::status_label(requisition.status(), width, colour);
                print!("{label}  ");
            } else if idx == 0 && requisition.id().is_synthesized() {
                print!("{}  ", format!("{value:<width$}").dim());
            } else {
                print!("{value:<width$}  ");
            }
        }
        println!();
    }
}

fn render_stacked(requisitions: &[&Requisition]) {
    let colour = terminal::colour_enabled();
    for requisition in requisitions {
        println!(
            "{} {}",
            requisition.id().display(),
            terminal::status_label(requisition.status(), 0, colour)
        );
        println!("  {} ({})", requisition.requester(), requisition.date());
        if !requisition.department().is_empty() {
            println!("  {}", requisition.department().dim());
        }
        for item in requisition.items() {
            println!("  • {} x{}", item.name, item.quantity);
        }
        println!();
    }
}

#[derive(Serialize)]
struct JsonItem<'a> {
    name: &'a str,
    quantity: &'a str,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    id: String,
    id_synthesized: bool,
    requester: &'a str,
    date: &'a str,
    status: Status,
    department: &'a str,
    items: Vec<JsonItem<'a>>,
}

impl<'a> From<&'a Requisition> for JsonRow<'a> {
    fn from(requisition: &'a Requisition) -> Self {
        Self {
            id: requisition.id().to_string(),
            id_synthesized: requisition.id().is_synthesized(),
            requester: requisition.requester(),
            date: requisition.date(),
            status: requisition.status(),
            department: requisition.department(),
            items: requisition
                .items()
                .iter()
                .map(|item| JsonItem {
                    name: &item.name,
                    quantity: &item.quantity,
                })
                .collect(),
        }
    }
}

fn render_json(requisitions: &[&Requisition]) -> anyhow::Result<()> {
    let rows: Vec<JsonRow<'_>> = requisitions.iter().map(|r| JsonRow::from(*r)).collect();
    serde_json::to_writer_pretty(std::io::stdout(), &rows).context("failed to render json output")?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use non_empty_string::NonEmptyString;
    use nonempty::NonEmpty;
    use requisition::Item;

    use super::*;

    fn requisition(requester: &str, department: &str, item: &str) -> Requisition {
        Requisition::new(
            NonEmptyString::new(requester.to_string()).unwrap(),
            department.to_string(),
            NonEmpty::new(Item::new(item, "1")),
            &Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        )
    }

    fn filter(args: &List) -> Filter {
        Filter::new(args).unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(filter(&List::default()).matches(&requisition("Jane", "Stores", "Gloves")));
    }

    #[test]
    fn status_filter() {
        let args = List {
            status: Some(Status::Completed),
            ..List::default()
        };
        let mut r = requisition("Jane", "Stores", "Gloves");
        assert!(!filter(&args).matches(&r));
        r.toggle_status();
        assert!(filter(&args).matches(&r));
    }

    #[test]
    fn department_filter_ignores_case() {
        let args = List {
            department: Some("stores ".to_string()),
            ..List::default()
        };
        assert!(filter(&args).matches(&requisition("Jane", "Stores", "Gloves")));
        assert!(!filter(&args).matches(&requisition("Jane", "Workshop", "Gloves")));
    }

    #[test]
    fn regex_filter_searches_items() {
        let args = List {
            regex: Some("^Glo".to_string()),
            ..List::default()
        };
        assert!(filter(&args).matches(&requisition("Jane", "Stores", "Gloves")));
        assert!(!filter(&args).matches(&requisition("Jane", "Stores", "Boots")));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let args = List {
            regex: Some("(".to_string()),
            ..List::default()
        };
        assert!(Filter::new(&args).is_err());
    }

    #[test]
    fn json_row_carries_all_fields() {
        let r = requisition("Jane", "Stores", "Gloves");
        let value = serde_json::to_value(JsonRow::from(&r)).unwrap();

        assert_eq!(value["requester"], "Jane");
        assert_eq!(value["status"], "Pending");
        assert_eq!(value["items"][0]["name"], "Gloves");
        assert_eq!(value["id_synthesized"], false);
    }
}
