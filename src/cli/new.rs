use std::{io::IsTerminal, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use dialoguer::{Input, Select};
use requisition::{
    Workspace,
    domain::{Catalog, CustomItemSource, Departments, Draft, catalog::OTHER},
};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `reqlog new`.
///
/// Anything not given on the command line is asked for interactively.
#[derive(Debug, Parser)]
pub struct New {
    /// Name of the person requesting the stock.
    #[arg(long, short)]
    requester: Option<String>,

    /// Department the stock is for.
    #[arg(long, short)]
    department: Option<String>,

    /// An item and its quantity, as NAME=QTY. May be repeated.
    #[arg(long = "item", short, value_name = "NAME=QTY", value_parser = parse_item)]
    items: Vec<(String, String)>,
}

/// Split `NAME=QTY` at the last `=`, so names may contain one.
fn parse_item(s: &str) -> Result<(String, String), String> {
    let (name, quantity) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{s}'"))?;
    Ok((name.trim().to_string(), quantity.trim().to_string()))
}

impl New {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let interactive = std::io::stdin().is_terminal();
        self.record(root, interactive)
    }

    #[instrument(skip(self))]
    fn record(self, root: PathBuf, interactive: bool) -> anyhow::Result<()> {
        let workspace = Workspace::open(root);
        let catalog = workspace.catalog();

        let requester = match self.requester {
            Some(requester) => requester,
            None if interactive => Input::<String>::new()
                .with_prompt("Requester")
                .allow_empty(true)
                .interact_text()?,
            None => String::new(),
        };

        let department = match self.department {
            Some(department) => department,
            None => choose_department(&workspace.departments(), interactive)?,
        };

        let mut draft = Draft::new(requester, department);
        if self.items.is_empty() && interactive {
            prompt_items(&mut draft, &catalog)?;
        } else {
            for (name, quantity) in self.items {
                draft.push(name, quantity);
            }
        }

        let mut resolver = ItemResolver::new(interactive.then_some(ask_item_name as NamePrompt));
        let assembled = draft.assemble(&catalog, &mut resolver, &chrono::Local::now());
        if let Some(error) = resolver.error {
            return Err(error).context("failed to read item name");
        }
        let requisition = match assembled {
            Ok(requisition) => requisition,
            Err(error) => {
                eprintln!("{}", format!("⚠️  {error}").warning());
                return Err(error.into());
            }
        };

        let store = workspace.store();
        let persisted = store
            .append(&requisition)
            .with_context(|| format!("failed to save requisition to {}", store.path().display()))?;

        println!(
            "{}",
            format!(
                "Requisition {} saved for {} ({} item{})",
                persisted.id(),
                persisted.requester(),
                persisted.items().len(),
                if persisted.items().len() == 1 { "" } else { "s" }
            )
            .success()
        );
        Ok(())
    }
}

type NamePrompt = fn(&str) -> dialoguer::Result<String>;

/// Resolves item names that are not in the stock list.
///
/// With a prompt, the user is asked for the real name. Without one, a typed
/// name is kept as is and a bare "Other" is dropped. The first prompt failure
/// is kept in `error` and no further prompts are shown.
struct ItemResolver {
    prompt: Option<NamePrompt>,
    error: Option<dialoguer::Error>,
}

impl ItemResolver {
    const fn new(prompt: Option<NamePrompt>) -> Self {
        Self {
            prompt,
            error: None,
        }
    }
}

impl CustomItemSource for ItemResolver {
    fn custom_item(&mut self, typed: &str) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let Some(prompt) = self.prompt else {
            if typed == OTHER {
                tracing::warn!("'{OTHER}' needs an item name; dropping it");
                return None;
            }
            tracing::info!("'{typed}' is not in the stock list; keeping it as typed");
            return Some(typed.to_string());
        };
        match prompt(typed) {
            Ok(name) => Some(name),
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

fn ask_item_name(typed: &str) -> dialoguer::Result<String> {
    let (prompt, initial) = if typed == OTHER {
        ("Enter custom item name".to_string(), "")
    } else {
        (
            format!("'{typed}' is not in the stock list. Enter the item name"),
            typed,
        )
    };
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
}

fn choose_department(departments: &Departments, interactive: bool) -> anyhow::Result<String> {
    let names = departments.names();
    match names {
        [] => Ok(String::new()),
        [only] => Ok(only.clone()),
        _ if !interactive => Ok(names[0].clone()),
        _ => {
            let index = Select::new()
                .with_prompt("Department")
                .items(names)
                .default(0)
                .interact()?;
            Ok(names[index].clone())
        }
    }
}

/// Ask for item lines until a blank item is entered.
fn prompt_items(draft: &mut Draft, catalog: &Catalog) -> anyhow::Result<()> {
    loop {
        let query: String = Input::new()
            .with_prompt("Item (blank to finish)")
            .allow_empty(true)
            .interact_text()?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let item = if catalog.contains(query) {
            query.to_string()
        } else {
            let suggestions = catalog.suggest(query);
            if suggestions.is_empty() {
                // Assembly asks for the real name of unknown items.
                query.to_string()
            } else {
                let index = Select::new()
                    .with_prompt("Matching stock items")
                    .items(&suggestions)
                    .default(0)
                    .interact()?;
                suggestions[index].to_string()
            }
        };

        let quantity: String = Input::new()
            .with_prompt(format!("Quantity of {item}"))
            .allow_empty(true)
            .interact_text()?;
        draft.push(item, quantity);
    }
}
