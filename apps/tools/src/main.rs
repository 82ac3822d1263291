use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client_core::CadastroClient;
use shared::domain::{Dataset, EmptyBlockPolicy};
use storage::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cadastro_tools", about = "Maintenance commands for the stored dataset")]
struct Cli {
    #[arg(long, env = "APP__DATABASE_URL", default_value = "sqlite://./data/cadastro.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes the consolidated report for the stored dataset.
    Export {
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Prints the stored dataset as pretty JSON.
    Show {
        #[arg(long, help = "Print one line per block instead of JSON")]
        summary: bool,
    },
    /// Deletes the stored dataset.
    Erase {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url)
        .await
        .with_context(|| format!("failed to open dataset store '{}'", cli.database_url))?;

    match cli.command {
        Command::Export { output_dir } => {
            let client = CadastroClient::open(storage, EmptyBlockPolicy::Discard).await;
            match client.export_report() {
                Ok(report) => {
                    let path = report.write_to(&output_dir)?;
                    info!(path = %path.display(), "report exported");
                    println!("exported blocks={} path={}", client.dataset().len(), path.display());
                }
                Err(err) => {
                    warn!(error = %err, "nothing exported");
                    println!("nothing exported: {err}");
                }
            }
        }
        Command::Show { summary } => {
            let dataset = storage.load_dataset().await?.unwrap_or_default();
            if summary {
                let updated_at = storage.dataset_updated_at().await?;
                println!("{}", render_summary(&dataset, updated_at));
            } else {
                println!("{}", render_json(&dataset)?);
            }
        }
        Command::Erase { yes } => {
            if !yes {
                bail!("refusing to erase the stored dataset without --yes");
            }
            let mut client = CadastroClient::open(storage, EmptyBlockPolicy::Discard).await;
            let blocks = client.dataset().len();
            client.erase_all().await;
            info!(blocks, "stored dataset erased");
            println!("erased blocks={blocks}");
        }
    }

    Ok(())
}

fn render_json(dataset: &Dataset) -> Result<String> {
    serde_json::to_string_pretty(dataset).context("failed to encode dataset")
}

fn render_summary(dataset: &Dataset, updated_at: Option<DateTime<Utc>>) -> String {
    let mut lines = Vec::new();
    if let Some(updated_at) = updated_at {
        lines.push(format!("updated_at={}", updated_at.to_rfc3339()));
    }
    for block in dataset {
        lines.push(format!("{}\t{}", block.name, block.items.join(", ")));
    }
    lines.push(format!(
        "blocks={} items={}",
        dataset.len(),
        dataset.item_count()
    ));
    lines.join("\n")
}
