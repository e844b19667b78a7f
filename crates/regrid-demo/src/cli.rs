use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::error::{DemoError, Result};
use crate::story::{Board, Script};

#[derive(Debug, Parser)]
#[command(
    name = "regrid-demo",
    about = "Replay scripted drags across reorderable grids",
    version
)]
pub struct Cli {
    /// Use one grid and only reorder within it.
    #[arg(long)]
    pub single: bool,

    /// Print every step as a JSON line instead of a text summary.
    #[arg(long)]
    pub json: bool,

    /// tracing filter directives, e.g. `regrid_layout=debug`.
    #[arg(long, env = "REGRID_LOG", default_value = "warn")]
    pub log_filter: String,
}

pub fn run_from_env() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_filter)?;
    let script = if cli.single {
        Script::single()
    } else {
        Script::between()
    };
    tracing::info!(message = "demo.start", steps = script.steps.len(), single = cli.single);

    let mut board = Board::new(&script)?;
    for report in board.play(&script)? {
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{report}");
        }
    }
    tracing::info!(message = "demo.done", changes = board.changes().len());
    Ok(())
}

fn init_logging(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter).map_err(|err| DemoError::LogFilter {
        filter: filter.to_string(),
        message: err.to_string(),
    })?;
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
