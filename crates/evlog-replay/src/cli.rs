#![forbid(unsafe_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use evlog_core::EventLogConfig;
use evlog_view::TreeGuides;
use tracing_subscriber::EnvFilter;

use crate::error::{ReplayError, Result};
use crate::replay::{render_text, replay};
use crate::script::parse;

#[derive(Debug, Parser)]
#[command(
    name = "evlog-replay",
    about = "Replay an undo history script through the event log and print the history view",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a history script.
    Run(RunArgs),

    /// Load a configuration file, validate it and print the effective values.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Script file, one command per line.
    pub script: PathBuf,

    /// TOML or JSON configuration (`.json` selects JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Tree guide style of the rendered view.
    #[arg(long, value_enum, default_value_t = GuideStyle::Unicode)]
    pub guides: GuideStyle,
}

#[derive(Debug, Args)]
pub struct CheckConfigArgs {
    /// TOML or JSON configuration file.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GuideStyle {
    Ascii,
    Unicode,
    Rounded,
}

impl From<GuideStyle> for TreeGuides {
    fn from(style: GuideStyle) -> Self {
        match style {
            GuideStyle::Ascii => Self::Ascii,
            GuideStyle::Unicode => Self::Unicode,
            GuideStyle::Rounded => Self::Rounded,
        }
    }
}

/// Log filter from `RUST_LOG`, `warn` when unset, written to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run_from_env() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_script(&args, out),
        Commands::CheckConfig(args) => check_config(&args.file, out),
    }
}

fn run_script(args: &RunArgs, out: &mut dyn Write) -> Result<()> {
    let config = match &args.config {
        Some(path) => EventLogConfig::load(path)?,
        None => EventLogConfig::default(),
    };
    let text = read(&args.script)?;
    let steps = parse(&text)?;
    let report = replay(&steps, config, args.guides.into())?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        out.write_all(render_text(&report).as_bytes())?;
    }
    Ok(())
}

fn check_config(path: &Path, out: &mut dyn Write) -> Result<()> {
    let config = EventLogConfig::load(path)?;
    writeln!(out, "# {} is valid", path.display())?;
    out.write_all(toml::to_string_pretty(&config)?.as_bytes())?;
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })
}
