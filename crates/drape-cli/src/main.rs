//! Drape CLI: run, preview, and validate cloth scenes.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "drape")]
#[command(version, about = "Drape: implicit mass-spring cloth simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a scene file.
    Simulate {
        /// Path to scene file (TOML).
        #[arg(short, long, default_value = "scene.toml")]
        config: String,

        /// Write captured frames to this JSON file.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a built-in scene (hanging_sheet, sphere_drape).
    Preset {
        name: String,

        /// Override the number of ticks.
        #[arg(short, long)]
        steps: Option<u32>,

        /// Write captured frames to this JSON file.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a scene file without running it.
    Validate {
        /// Path to scene file (TOML).
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate { config, output } => commands::simulate(&config, output.as_deref()),
        Commands::Preset { name, steps, output } => commands::preset(&name, steps, output.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
