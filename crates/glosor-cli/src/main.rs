//! glosor CLI: vocabulary practice in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use glosor_core::model::CallLanguage;

mod commands;

#[derive(Parser)]
#[command(name = "glosor", version, about = "Adaptive vocabulary practice")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database path, overriding the config file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and example word list
    Init,

    /// Import word lists into the database
    Import {
        /// Word list file or directory
        path: PathBuf,
    },

    /// Validate word list TOML files
    Validate {
        /// Word list file or directory
        path: PathBuf,
    },

    /// Practise a session
    Play(PlayArgs),

    /// Remove marks left behind by deleted words
    Prune,
}

/// Per-session overrides of the config file.
#[derive(Args, Debug, Default)]
pub struct PlayArgs {
    /// Words per round
    #[arg(long, short = 'w')]
    pub words: Option<usize>,

    /// Number of rounds
    #[arg(long, short = 'r')]
    pub rounds: Option<usize>,

    /// Side shown as the question: source or target
    #[arg(long)]
    pub call_language: Option<CallLanguage>,

    /// Parts of speech to draw from (comma-separated)
    #[arg(long)]
    pub parts_of_speech: Option<String>,

    /// Word categories to draw from (comma-separated)
    #[arg(long)]
    pub categories: Option<String>,

    /// Random seed for a reproducible session
    #[arg(long)]
    pub seed: Option<u64>,

    /// Play without recording marks
    #[arg(long)]
    pub no_commit: bool,

    /// Write a JSON session report to this directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("glosor=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let database = cli.database.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Import { path } => commands::import::execute(&path, config, database),
        Commands::Validate { path } => commands::validate::execute(&path),
        Commands::Play(args) => commands::play::execute(args, config, database),
        Commands::Prune => commands::prune::execute(config, database),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
