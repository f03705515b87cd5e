use crate::prelude::*;
use clap::Parser;

mod batch;
mod error;
mod inspect;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract a title and an H1-H3 outline from PDF documents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DOCOUTLINE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Process every PDF in a directory into one JSON outline per file
    Batch(crate::batch::App),

    /// Print the outline of a single PDF or serialized text model
    File(crate::inspect::FileApp),

    /// Print the text model extracted from a PDF
    Layout(crate::inspect::LayoutApp),
}

/// Drive `future` to completion, then drop the runtime without joining
/// blocking workers. A document that outlived its timeout keeps running on a
/// blocking thread and must not hold the process open.
fn block_on_detached<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn dispatch(app: App) -> Result<()> {
    match app.command {
        SubCommands::Batch(sub_app) => crate::batch::run(sub_app, app.global).await,
        SubCommands::File(sub_app) => crate::inspect::run_file(sub_app, app.global),
        SubCommands::Layout(sub_app) => crate::inspect::run_layout(sub_app, app.global),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    block_on_detached(dispatch(app))?.map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
