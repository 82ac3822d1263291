use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::EmptyBlockPolicy;
use tracing::warn;

pub const SETTINGS_FILE: &str = "cadastro.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub output_dir: PathBuf,
    pub empty_block_policy: EmptyBlockPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/cadastro.db".into(),
            output_dir: PathBuf::from("."),
            empty_block_policy: EmptyBlockPolicy::Discard,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_url: Option<String>,
    output_dir: Option<PathBuf>,
    empty_block_policy: Option<EmptyBlockPolicy>,
}

/// Defaults, then the settings file, then environment variables.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            if let Err(err) = settings.apply_file(&raw) {
                warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring settings file");
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read settings file");
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    settings.database_url = normalize_database_url(&settings.database_url);
    settings
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid settings file")?;
        if let Some(v) = file_cfg.database_url {
            self.database_url = v;
        }
        if let Some(v) = file_cfg.output_dir {
            self.output_dir = v;
        }
        if let Some(v) = file_cfg.empty_block_policy {
            self.empty_block_policy = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = lookup("APP__DATABASE_URL") {
            self.database_url = v;
        }

        if let Some(v) = lookup("APP__OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }

        if let Some(v) = lookup("APP__EMPTY_BLOCK_POLICY") {
            match v.parse() {
                Ok(policy) => self.empty_block_policy = policy,
                Err(err) => warn!(error = %err, "ignoring APP__EMPTY_BLOCK_POLICY"),
            }
        }
    }
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
