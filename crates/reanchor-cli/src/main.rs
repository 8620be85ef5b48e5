mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "reanchor-cli")]
#[command(about = "Keep annotated code ranges attached to their text as files change")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Config file to use instead of ~/.config/reanchor/config.toml"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Capture an anchor over a range of a file and print it as JSON")]
    Capture {
        #[arg(long, help = "File the range belongs to")]
        document: PathBuf,
        #[arg(long, help = "Range as LINE:COL-LINE:COL, 0-based, columns in characters")]
        range: String,
        #[arg(long, help = "Annotation the anchor belongs to (random if omitted)")]
        parent: Option<Uuid>,
    },
    #[command(about = "Move an anchor through a batch of edits")]
    Translate {
        #[arg(long, help = "Anchor JSON as printed by `capture`")]
        anchor: PathBuf,
        #[arg(long, help = "JSON array of edits, in the order they were made")]
        edits: PathBuf,
        #[arg(long, help = "The file before the edits")]
        document: PathBuf,
        #[arg(long, value_name = "FILE", help = "Write the edited file here")]
        output_document: Option<PathBuf>,
    },
    #[command(about = "Search a file for where a stale anchor's text went")]
    Search {
        #[arg(long, help = "Anchor JSON as printed by `capture`")]
        anchor: PathBuf,
        #[arg(long, help = "Current contents of the file")]
        document: PathBuf,
        #[arg(long, help = "Print at most this many candidates")]
        limit: Option<usize>,
    },
    #[command(about = "Check an anchor against a file; exits 1 when it is stale")]
    Validate {
        #[arg(long, help = "Anchor JSON as printed by `capture`")]
        anchor: PathBuf,
        #[arg(long, help = "Current contents of the file")]
        document: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    let result = commands::Settings::load(cli.config.as_deref()).and_then(|settings| {
        match cli.command {
            Commands::Capture {
                document,
                range,
                parent,
            } => commands::capture::run(&settings, &document, &range, parent),
            Commands::Translate {
                anchor,
                edits,
                document,
                output_document,
            } => commands::translate::run(
                &settings,
                &anchor,
                &edits,
                &document,
                output_document.as_deref(),
            ),
            Commands::Search {
                anchor,
                document,
                limit,
            } => commands::search::run(&settings, &anchor, &document, limit),
            Commands::Validate { anchor, document } => {
                commands::validate::run(&anchor, &document)
            }
        }
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
