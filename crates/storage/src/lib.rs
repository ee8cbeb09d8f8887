//! Catalog and settings loading.
//!
//! Nothing here writes to disk: the catalog is read once at startup and
//! settings changes made in the UI are kept in memory only.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use catalog_core::{BookId, Catalog, Settings, Theme};

pub const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");
pub const SETTINGS_FILE: &str = "settings.json";

pub const ENV_THEME: &str = "BOOKCATALOG_THEME";
pub const ENV_PAGE_SIZE: &str = "BOOKCATALOG_PAGE_SIZE";
pub const ENV_CATALOG: &str = "BOOKCATALOG_CATALOG";
pub const ENV_LOG: &str = "BOOKCATALOG_LOG";

#[derive(Debug, Clone)]
pub struct Storage {
    config_dir: PathBuf,
}

impl Storage {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Defaults, then `settings.json` if present, then environment overrides.
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        self.load_settings_with_env(|key| std::env::var(key).ok())
    }

    pub fn load_settings_with_env(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Settings> {
        let path = self.settings_path();
        let mut settings = if path.is_file() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read settings {}", path.display()))?;
            serde_json::from_str::<Settings>(&raw)
                .with_context(|| format!("parse settings {}", path.display()))?
        } else {
            Settings::default()
        };

        apply_env_overrides(&mut settings, lookup);
        settings.normalize();
        Ok(settings)
    }

    pub fn load_catalog(&self, settings: &Settings) -> anyhow::Result<Catalog> {
        let catalog = match settings.catalog_path.as_deref() {
            Some(path) => load_catalog_file(path)?,
            None => parse_catalog(BUNDLED_CATALOG).context("parse bundled catalog")?,
        };

        let dangling = catalog.dangling_references();
        if !dangling.is_empty() {
            tracing::warn!(
                count = dangling.len(),
                first = %dangling[0],
                "catalog has unresolved author or genre references"
            );
        }
        tracing::info!(
            books = catalog.books.len(),
            authors = catalog.authors.len(),
            genres = catalog.genres.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup(ENV_THEME) {
        match value.parse::<Theme>() {
            Ok(theme) => settings.theme = theme,
            Err(err) => tracing::warn!(%value, err, "ignoring {ENV_THEME}"),
        }
    }
    if let Some(value) = lookup(ENV_PAGE_SIZE) {
        match value.trim().parse::<usize>() {
            Ok(size) => settings.page_size = size,
            Err(err) => tracing::warn!(%value, %err, "ignoring {ENV_PAGE_SIZE}"),
        }
    }
    if let Some(value) = lookup(ENV_CATALOG) {
        settings.catalog_path = Some(value);
    }
    if let Some(value) = lookup(ENV_LOG) {
        settings.log_level = value;
    }
}

pub fn load_catalog_file(path: impl AsRef<Path>) -> anyhow::Result<Catalog> {
    let path = path.as_ref();
    let raw =
        fs::read_to_string(path).with_context(|| format!("read catalog {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("parse catalog {}", path.display()))
}

/// Parses catalog JSON, trims ids and rejects duplicate book ids.
pub fn parse_catalog(json: &str) -> anyhow::Result<Catalog> {
    let mut catalog: Catalog = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    for book in &mut catalog.books {
        book.id = BookId::new(book.id.as_str().trim());
        book.author = book.author.as_str().trim().to_string().into();
        for genre in &mut book.genres {
            *genre = genre.as_str().trim().to_string().into();
        }
        if book.id.as_str().is_empty() {
            anyhow::bail!("book {:?} has an empty id", book.title);
        }
        if !seen.insert(book.id.clone()) {
            anyhow::bail!("duplicate book id {}", book.id);
        }
    }
    Ok(catalog)
}
