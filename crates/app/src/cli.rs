use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use storage::Storage;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "simplepres", version)]
#[command(about = "Draw freehand ink over the pages of a PDF")]
pub struct Cli {
    /// PDF to open; a file dialog is shown when absent or missing
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Directory holding settings.json
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG is honoured)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn storage(&self) -> Result<Storage> {
        match &self.config_dir {
            Some(dir) => Ok(Storage::with_root(dir)),
            None => Storage::from_default_project().context("failed to locate settings directory"),
        }
    }
}

/// The given path if it names an existing file
pub fn existing_document(file: Option<&Path>) -> Option<PathBuf> {
    let file = file?;
    if file.is_file() {
        Some(file.to_path_buf())
    } else {
        warn!(path = %file.display(), "Document does not exist");
        None
    }
}

/// Ask the user for a PDF; `None` when the dialog is cancelled
pub fn pick_document() -> Option<PathBuf> {
    rfd::FileDialog::new().set_title("Open PDF").add_filter("PDF", &["pdf"]).pick_file()
}

pub fn resolve_document(file: Option<&Path>) -> Option<PathBuf> {
    existing_document(file).or_else(pick_document)
}
