use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicI64, Ordering},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use shared::{domain::Block, error::ReportError};

pub const REPORT_TITLE: &str = "RELATÓRIO DE CADASTRO DE BENS";
pub const FILE_PREFIX: &str = "cadastro_bens_consolidado";
pub const EMPTY_BLOCK_PLACEHOLDER: &str = "(Nenhum tombamento registrado para este bloco)";
const SEPARATOR_WIDTH: usize = 37;
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

static LAST_FILE_TOKEN: AtomicI64 = AtomicI64::new(i64::MIN);

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub text: String,
    pub file_name: String,
    pub generated_at: DateTime<Local>,
}

impl Report {
    /// Writes the report under `dir`, never replacing an existing file.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create report directory '{}'", dir.display()))?;

        let path = dir.join(&self.file_name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("failed to create report file '{}'", path.display()))?;
        file.write_all(self.text.as_bytes())
            .with_context(|| format!("failed to write report file '{}'", path.display()))?;
        Ok(path)
    }
}

pub fn generate(blocks: &[Block], generated_at: DateTime<Local>) -> Result<Report, ReportError> {
    if blocks.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    Ok(Report {
        text: render_text(blocks, generated_at),
        file_name: file_name_for(generated_at),
        generated_at,
    })
}

pub fn render_text(blocks: &[Block], generated_at: DateTime<Local>) -> String {
    let mut text = String::new();
    text.push_str(REPORT_TITLE);
    text.push('\n');
    text.push_str(&format!(
        "Data de Geração: {}\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    text.push_str(&"=".repeat(SEPARATOR_WIDTH));
    text.push_str("\n\n");

    for block in blocks {
        text.push_str(&format!("BLOCO: {}\n", block.name));
        if block.items.is_empty() {
            text.push_str(&format!("  {EMPTY_BLOCK_PLACEHOLDER}\n"));
        } else {
            for (index, item) in block.items.iter().enumerate() {
                text.push_str(&format!("  Item {}: {}\n", index + 1, item));
            }
        }
        text.push_str(&"-".repeat(SEPARATOR_WIDTH));
        text.push_str("\n\n");
    }

    text
}

fn file_name_for(generated_at: DateTime<Local>) -> String {
    format!(
        "{FILE_PREFIX}_{}.txt",
        next_file_token(generated_at.timestamp_millis())
    )
}

/// Millisecond token, bumped past the last one handed out in this process.
fn next_file_token(millis: i64) -> i64 {
    let bump = |last: i64| millis.max(last.saturating_add(1));
    match LAST_FILE_TOKEN.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(bump(last))
    }) {
        Ok(last) | Err(last) => bump(last),
    }
}

#[cfg(test)]
#[path = "tests/report_tests.rs"]
mod tests;
