use std::path::{Path, PathBuf};

use docoutline_core::Document;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Args)]
pub struct FileApp {
    /// PDF file, or a `.json` Document Text Model
    path: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct LayoutApp {
    /// Path to the PDF file
    path: PathBuf,
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load a text model from a PDF, or from JSON produced by `layout` or an
/// external renderer.
pub fn load_input(path: &Path) -> Result<Document> {
    if is_json(path) {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&raw)
            .wrap_err_with(|| format!("{} is not a Document Text Model", path.display()));
    }
    pdf::load_path(path).map_err(|e| eyre!("Failed to load {}: {e}", path.display()))
}

pub fn run_file(app: FileApp, global: crate::Global) -> Result<()> {
    let doc = load_input(&app.path)?;
    if global.verbose {
        eprintln!("{}: {} pages", app.path.display(), doc.page_count());
    }
    let outline = docoutline_core::extract(&doc);
    println!("{}", serde_json::to_string_pretty(&outline)?);
    Ok(())
}

pub fn run_layout(app: LayoutApp, _global: crate::Global) -> Result<()> {
    let doc = pdf::load_path(&app.path).map_err(|e| eyre!(e))?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
