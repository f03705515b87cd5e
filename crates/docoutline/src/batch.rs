use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use docoutline_core::Outline;
use futures::stream::{self, StreamExt};

use crate::prelude::{println, *};

/// Container layout used when `/app/input` exists.
const CONTAINER_ROOT: &str = "/app";

#[derive(Debug, Clone, clap::Args)]
pub struct App {
    /// Directory scanned for `*.pdf` files
    #[arg(long, env = "DOCOUTLINE_INPUT")]
    input: Option<PathBuf>,

    /// Directory receiving one `<name>.json` per PDF
    #[arg(long, env = "DOCOUTLINE_OUTPUT")]
    output: Option<PathBuf>,

    /// Documents processed concurrently
    #[arg(long, env = "DOCOUTLINE_JOBS", default_value_t = default_jobs())]
    jobs: usize,

    /// Per-document time limit in seconds
    #[arg(long, env = "DOCOUTLINE_TIMEOUT", default_value_t = 60)]
    timeout: u64,
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// `<root>/input` and `<root>/output` when the container layout is present,
/// otherwise `Input` and `Output` under `cwd`.
pub fn default_dirs(root: &Path, cwd: &Path) -> (PathBuf, PathBuf) {
    let container_input = root.join("input");
    if container_input.exists() {
        (container_input, root.join("output"))
    } else {
        (cwd.join("Input"), cwd.join("Output"))
    }
}

/// Create `dir` if missing. Returns whether it had to be created.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create directory {}", dir.display()))?;
    Ok(true)
}

fn is_pdf(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// PDF files directly inside `dir`, sorted by name.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to list {}", dir.display()))?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if is_pdf(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// `<output>/<stem>.json` for the given PDF.
pub fn output_path(output_dir: &Path, pdf: &Path) -> PathBuf {
    let stem = pdf.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".json");
    output_dir.join(name)
}

/// Persist `outline` as 2-space indented UTF-8 JSON.
pub fn write_outline(path: &Path, outline: &Outline) -> Result<()> {
    let json = serde_json::to_string_pretty(outline)?;
    std::fs::write(path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))
}

/// Load and analyse one PDF on the blocking pool, bounded by `timeout`.
pub async fn process(path: PathBuf, timeout: Duration) -> Result<Outline> {
    let task = tokio::task::spawn_blocking(move || {
        pdf::load_path(&path).map(|doc| docoutline_core::extract(&doc))
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined
            .map_err(|e| Error::Worker(e.to_string()))?
            .map_err(|e| eyre!(e)),
        Err(_) => Err(Error::Timeout {
            secs: timeout.as_secs(),
        }
        .into()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (default_input, default_output) = default_dirs(Path::new(CONTAINER_ROOT), &cwd);
    let input = app.input.unwrap_or(default_input);
    let output = app.output.unwrap_or(default_output);

    for dir in [&input, &output] {
        if ensure_dir(dir)? {
            println!("Created directory: {}", dir.display());
        }
    }

    let pdfs = discover_pdfs(&input)?;
    if pdfs.is_empty() {
        println!("Please add PDF files and run again.");
        return Err(Error::NoInputFiles(input.display().to_string()).into());
    }
    let total = pdfs.len();
    log::debug!("processing {total} PDFs with {} jobs", app.jobs);

    let timeout = Duration::from_secs(app.timeout);
    let mut results = stream::iter(pdfs)
        .map(|path| async move {
            let outcome = process(path.clone(), timeout).await;
            (path, outcome)
        })
        .buffer_unordered(app.jobs.max(1));

    let mut failures = 0;
    while let Some((path, outcome)) = results.next().await {
        let name = file_name(&path);
        let target = output_path(&output, &path);

        let saved = outcome.and_then(|outline| {
            write_outline(&target, &outline)?;
            Ok(outline)
        });

        match saved {
            Ok(outline) => {
                println!("{} {}", "✅ Processed:".green(), name);
                if global.verbose {
                    println!(
                        "   title: {:?}, {} headings",
                        outline.title,
                        outline.outline.len()
                    );
                }
            }
            Err(err) => {
                failures += 1;
                if let Err(write_err) = write_outline(&target, &Outline::empty()) {
                    log::warn!("{write_err:#}");
                }
                println!("{} {}: {:#}", "❌ Error processing".red(), name, err);
            }
        }
    }

    let summary = format!("{} processed, {} failed", total - failures, failures);
    if failures == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
    Ok(())
}
