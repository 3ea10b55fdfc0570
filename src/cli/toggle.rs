use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use requisition::{
    Requisition, Workspace,
    storage::{UpdateResult, find_by_id},
};
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `reqlog toggle`.
#[derive(Debug, Parser)]
pub struct Toggle {
    /// Id of the requisition, or an unambiguous prefix of it.
    id: String,

    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

impl Toggle {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Workspace::open(root).store();
        let requisitions = store
            .try_load()
            .with_context(|| format!("cannot read {}", store.path().display()))?;

        let mut requisition = find_by_id(&requisitions, &self.id)?.clone();
        if let Some(twin) = shadowing_record(&requisitions, &requisition) {
            anyhow::bail!(
                "Requisition {} has no stored id and cannot be told apart from {} \
                 (same requester and date); the log was not changed",
                requisition.id(),
                twin.id()
            );
        }
        let from = requisition.status();
        let to = from.toggled();

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Mark requisition {} ({}, {}) as {to}?",
                    requisition.id(),
                    requisition.requester(),
                    requisition.date()
                ))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        requisition.set_status(to);
        match store.update_status(&requisition)? {
            UpdateResult::Updated { position } => {
                tracing::debug!("Updated record {position}");
                println!(
                    "{}",
                    format!("✅ Requisition {} marked {to}", requisition.id()).success()
                );
                Ok(())
            }
            UpdateResult::NoMatch => {
                anyhow::bail!("Requisition {} is no longer in the log", requisition.id())
            }
        }
    }
}

/// A record listed before `target` that a write to `target` would hit instead.
///
/// Records without a stored id are matched on requester and date, and the
/// first match in the log wins.
fn shadowing_record<'a>(
    requisitions: &'a [Requisition],
    target: &Requisition,
) -> Option<&'a Requisition> {
    if !target.id().is_synthesized() {
        return None;
    }
    requisitions
        .iter()
        .take_while(|r| r.id() != target.id())
        .find(|r| r.requester() == target.requester() && r.date() == target.date())
}
