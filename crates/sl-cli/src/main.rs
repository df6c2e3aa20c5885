//! CLI frontend for the Storyloom branching-story engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::SceneArgs;

#[derive(Parser)]
#[command(
    name = "loom",
    about = "Storyloom: write and play branching stories",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum Commands {
    /// Validate a story file and report every problem
    Check {
        /// Story snapshot (JSON)
        file: PathBuf,
    },

    /// List the scenes of a story
    List {
        /// Story snapshot (JSON)
        file: PathBuf,
    },

    /// Start a new story file with its first scene
    New {
        /// Story file to create
        file: PathBuf,

        /// Story title
        #[arg(long)]
        title: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Write the scene behind an unlinked choice
    Branch {
        /// Story snapshot (JSON)
        file: PathBuf,

        /// Scene owning the choice
        #[arg(short, long)]
        scene: String,

        /// Choice number (1-based)
        #[arg(short, long)]
        choice: usize,

        #[command(flatten)]
        draft: SceneArgs,
    },

    /// Point a choice at an existing scene
    Link {
        /// Story snapshot (JSON)
        file: PathBuf,

        /// Scene owning the choice
        #[arg(short, long)]
        scene: String,

        /// Choice number (1-based)
        #[arg(short, long)]
        choice: usize,

        /// Scene the choice should lead to
        #[arg(short, long)]
        target: String,
    },

    /// Write a validated copy named after the story title
    Export {
        /// Story snapshot (JSON)
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Play a story in the terminal
    Play {
        /// Story snapshot (JSON)
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::List { file } => commands::list::run(&file),
        Commands::New {
            file,
            title,
            force,
            scene,
        } => commands::new::run(&file, title.as_deref(), force, &scene),
        Commands::Branch {
            file,
            scene,
            choice,
            draft,
        } => commands::branch::run(&file, &scene, choice, &draft),
        Commands::Link {
            file,
            scene,
            choice,
            target,
        } => commands::link::run(&file, &scene, choice, &target),
        Commands::Export { file, out } => commands::export::run(&file, &out),
        Commands::Play { file } => commands::play::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
