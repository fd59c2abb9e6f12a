use crate::prelude::*;
use clap::Parser;

mod analyze;
mod assist;
mod error;
mod load;
mod prelude;
mod split;
mod toc;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Recover chapters and headings from PDF files: inspect the embedded outline, split on it, or infer headings from font statistics when there is none"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Log debug details (skipped pages, unresolved bookmarks, AI traffic) to stderr.
    #[clap(long, env = "EXTRACTORIZER_DEBUG", global = true, default_value = "false")]
    debug: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Diagnose the embedded table of contents
    Toc(crate::toc::TocOptions),

    /// Split a PDF into one file per outline chapter
    Split(crate::split::SplitOptions),

    /// Infer headings from font statistics
    Analyze(crate::analyze::AnalyzeOptions),
}

fn init_logging(global: &Global) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if global.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    init_logging(&app.global);

    match app.command {
        SubCommands::Toc(options) => crate::toc::run(options, app.global).await,
        SubCommands::Split(options) => crate::split::run(options, app.global).await,
        SubCommands::Analyze(options) => crate::analyze::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
