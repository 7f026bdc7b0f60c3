//! simplepres: draw freehand ink over the pages of a PDF

pub mod cli;
pub mod keymap;
pub mod logging;
pub mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use pdf_engine::PdfPageRenderer;
use simplepres_core::{Canvas, Session, ViewportSize};
use std::ffi::OsString;
use storage::Settings;
use tracing::{info, warn};

pub use cli::Cli;

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let storage = cli.storage()?;

    let loaded = storage.load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(cli.debug || settings.debug_logging);
    if let Err(error) = &loaded {
        warn!(path = %storage.settings_path().display(), %error, "Ignoring unreadable settings");
    }

    let Some(path) = cli::resolve_document(cli.file.as_deref()) else {
        info!("No document selected");
        return Ok(());
    };

    let renderer = PdfPageRenderer::open(path.as_path())
        .with_context(|| format!("failed to open {}", path.display()))?;
    let session = open_session(renderer, &settings)
        .with_context(|| format!("failed to show {}", path.display()))?;

    shell::run(session, &path, &settings)
}

fn open_session(renderer: PdfPageRenderer, settings: &Settings) -> Result<shell::PresSession> {
    let viewport = ViewportSize::new(settings.window_width as u32, settings.window_height as u32);
    let session = Session::open(renderer, Canvas::new(viewport), viewport, settings.edit_config())?;
    Ok(session)
}
