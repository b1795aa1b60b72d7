use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{LevelFilter, error};
use packlet::{
    config::{ConfigLoader, ConfigOverrides},
    orchestrator::Bundler,
};

/// Bundle an ES module graph into one self-contained script
#[derive(Parser, Debug)]
#[command(name = "packlet", version, about)]
struct Cli {
    /// Project config file (defaults to packlet.toml or bundle.config.json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Entry module; overrides `entry` from the config file
    #[arg(short, long, value_name = "FILE")]
    entry: Option<PathBuf>,

    /// Artifact path; overrides `output` from the config file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the artifact instead of writing it
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Analyze each resolved file once, however often it is imported
    #[arg(long)]
    dedupe: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let working_dir = env::current_dir().context("failed to determine working directory")?;
    let overrides = ConfigOverrides {
        config: cli.config,
        entry: cli.entry,
        output: cli.output,
        dedupe: cli.dedupe,
    };
    let config = ConfigLoader::new(working_dir)
        .load(&overrides)
        .context("failed to load configuration")?;
    let bundler = Bundler::new(config);

    if cli.stdout {
        let (_, artifact) = bundler.bundle_string()?;
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(artifact.as_bytes())
            .context("failed to write bundle to stdout")?;
        stdout.flush()?;
        return Ok(());
    }

    bundler.bundle()?;
    Ok(())
}
