//! Prism CLI - Inspect VRM avatars and try highlights from the command line

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{highlight, info, paths, show, SourceArgs};

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Inspect VRM avatars and their highlightable regions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an avatar
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List every highlightable document path
    Paths {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the document value at a path
    Show {
        /// JSON pointer, e.g. /extensions/VRM/meta
        path: String,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Highlight a path, report what changed, then revert it
    Highlight {
        /// Document path to highlight
        path: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Revert before the highlight has a chance to resolve
        #[arg(long)]
        cancel: bool,

        /// Frames to run before reverting
        #[arg(long, default_value = "1")]
        frames: u32,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { source } => info::run(&source),
        Commands::Paths { source } => paths::run(&source),
        Commands::Show { path, source } => show::run(&path, &source),
        Commands::Highlight {
            path,
            source,
            cancel,
            frames,
        } => highlight::run(highlight::HighlightArgs {
            path,
            source,
            cancel,
            frames,
        }),
    }
}
