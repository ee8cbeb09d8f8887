use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use catalog_application::Browser;
use catalog_core::Settings;
use catalog_storage::Storage;
use catalog_ui::Ui;
use directories::ProjectDirs;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "bookcatalog.log";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "xiey", "bookcatalog").context("resolve project dirs")?;

    let storage = Storage::new(project_dirs.config_dir());
    let settings = storage.load_settings()?;
    init_tracing(&settings, project_dirs.data_dir());
    tracing::info!(
        theme = %settings.theme,
        page_size = settings.page_size,
        "starting"
    );

    let catalog = storage.load_catalog(&settings)?;
    let browser = Browser::new(Arc::new(catalog), settings);
    Ui::new(browser).run()?;

    tracing::info!("exiting");
    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI. Failures leave tracing off.
fn init_tracing(settings: &Settings, data_dir: &Path) {
    if fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))
    {
        Ok(file) => file,
        Err(_) => return,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
