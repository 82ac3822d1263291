use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use clap::Parser;
use client_core::{CadastroClient, DatasetStore, Outcome, UnavailableDatasetStore};
use shared::{domain::EmptyBlockPolicy, protocol::EntryCommand};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;

use config::{load_settings, normalize_database_url, Settings};
use prompt::PromptInput;

#[derive(Parser, Debug)]
#[command(name = "cadastro", version, about = "Cadastro de bens por bloco")]
struct Args {
    #[arg(long, default_value = config::SETTINGS_FILE)]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long, help = "Directory where report files are written")]
    output_dir: Option<PathBuf>,
    #[arg(long, help = "What to do with blocks closed without items (discard|record)")]
    empty_blocks: Option<EmptyBlockPolicy>,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = load_settings(&self.config);
        if let Some(v) = &self.database_url {
            settings.database_url = normalize_database_url(v);
        }
        if let Some(v) = &self.output_dir {
            settings.output_dir = v.clone();
        }
        if let Some(v) = self.empty_blocks {
            settings.empty_block_policy = v;
        }
        settings
    }
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = args.settings();
    info!(
        database_url = %settings.database_url,
        output_dir = %settings.output_dir.display(),
        policy = ?settings.empty_block_policy,
        "starting cadastro"
    );

    let store = open_store(&settings.database_url).await;
    let mut client = CadastroClient::open(store, settings.empty_block_policy).await;

    println!("{}", prompt::TITLE);
    println!("{}", prompt::render_status(client.session(), client.dataset()));

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = read_line(&mut input, prompt::prompt_label(client.session())).await?
        else {
            break;
        };

        let outcome = match prompt::parse_input(&line) {
            PromptInput::Quit => break,
            PromptInput::Help => {
                println!("{}", prompt::HELP);
                continue;
            }
            PromptInput::Command(EntryCommand::EraseAll) => {
                let answer = read_line(&mut input, prompt::ERASE_CONFIRMATION).await?;
                if !answer.as_deref().is_some_and(prompt::is_confirmation) {
                    println!("Operação cancelada.");
                    continue;
                }
                client.handle(EntryCommand::EraseAll).await
            }
            PromptInput::Command(command) => client.handle(command).await,
        };

        present(&outcome, &settings.output_dir);
        println!("{}", prompt::render_status(client.session(), client.dataset()));
    }

    info!(blocks = client.dataset().len(), "bye");
    Ok(())
}

async fn open_store(database_url: &str) -> Box<dyn DatasetStore> {
    match Storage::new(database_url).await {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "dataset store unavailable; data will not be saved");
            Box::new(UnavailableDatasetStore::new(format!("{err:#}")))
        }
    }
}

async fn read_line(input: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

fn present(outcome: &Outcome, output_dir: &Path) {
    for notice in &outcome.notices {
        println!("{}", prompt::render_notice(notice));
    }

    let Some(report) = &outcome.report else {
        return;
    };
    match report.write_to(output_dir) {
        Ok(path) => {
            info!(path = %path.display(), "report written");
            println!("Arquivo consolidado \"{}\" gerado.", path.display());
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to write report");
            println!("Erro: não foi possível gravar o arquivo {}.", report.file_name);
        }
    }
}
