//! Administrative subcommands for webhook registrations.
//!
//! Registrations are created ahead of time and are read-only on the dispatch
//! path, so all writes go through these commands rather than the running
//! worker.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sitecache_core::types::DbId;
use sitecache_core::webhook_config::WebhookConfig;
use sitecache_db::repositories::WebhookConfigRepo;
use sitecache_db::DbPool;

#[derive(Parser, Debug)]
#[command(name = "sitecache-worker", about = "Record change webhook dispatcher")]
pub struct Cli {
    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Listen for record changes and dispatch webhooks.
    Run,
    /// Print every webhook registration as JSON lines.
    List,
    /// Create a registration from a WebhookConfig JSON file.
    Register { file: PathBuf },
    /// Mark a registration active.
    Enable { id: DbId },
    /// Mark a registration inactive.
    Disable { id: DbId },
    /// Remove a registration.
    Delete { id: DbId },
    /// Install the change trigger on one or more tables.
    Watch {
        #[arg(required = true)]
        tables: Vec<String>,
    },
}

/// Execute an administrative command against the database.
pub async fn execute(pool: &DbPool, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Run => bail!("run is not an administrative command"),
        Command::List => {
            for row in WebhookConfigRepo::list(pool).await? {
                println!("{}", serde_json::to_string(&row)?);
            }
        }
        Command::Register { file: path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: WebhookConfig = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid webhook config", path.display()))?;
            let row = WebhookConfigRepo::create(pool, &config).await?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        Command::Enable { id } => set_active(pool, id, true).await?,
        Command::Disable { id } => set_active(pool, id, false).await?,
        Command::Delete { id } => {
            if !WebhookConfigRepo::delete(pool, id).await? {
                bail!("no webhook registration with id {id}");
            }
            tracing::info!(id, "Webhook registration deleted");
        }
        Command::Watch { tables } => {
            for table in &tables {
                sitecache_db::watch_collection(pool, table)
                    .await
                    .with_context(|| format!("Failed to watch table '{table}'"))?;
            }
        }
    }
    Ok(())
}

async fn set_active(pool: &DbPool, id: DbId, active: bool) -> anyhow::Result<()> {
    if !WebhookConfigRepo::set_active(pool, id, active).await? {
        bail!("no webhook registration with id {id}");
    }
    tracing::info!(id, active, "Webhook registration updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("sitecache-worker").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(Cli::into_command)
    }

    #[test]
    fn no_arguments_means_run() {
        assert_eq!(parse(&[]).unwrap(), Command::Run);
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!(parse(&["disable", "7"]).unwrap(), Command::Disable { id: 7 });
        assert_eq!(parse(&["enable", "2"]).unwrap(), Command::Enable { id: 2 });
        assert_eq!(parse(&["delete", "3"]).unwrap(), Command::Delete { id: 3 });
    }

    #[test]
    fn rejects_bad_ids_and_arity() {
        assert!(parse(&["enable", "seven"]).is_err());
        assert!(parse(&["delete"]).is_err());
        assert!(parse(&["register", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn register_takes_a_file() {
        assert_eq!(
            parse(&["register", "hooks/blog.json"]).unwrap(),
            Command::Register {
                file: PathBuf::from("hooks/blog.json")
            }
        );
    }

    #[test]
    fn watch_collects_tables() {
        assert_eq!(
            parse(&["watch", "blogs", "faqs"]).unwrap(),
            Command::Watch {
                tables: vec!["blogs".into(), "faqs".into()]
            }
        );
        assert!(parse(&["watch"]).is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
