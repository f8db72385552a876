//! # blogsmith CLI
//!
//! Command-line interface for the blogsmith static blog generator.

mod commands;
mod feeds;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file [default: blogsmith.yml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create blogsmith.yml and a first post
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build the static site
    Build {
        /// Directory of markdown posts (overrides paths.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Destination directory (overrides paths.output)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Abort on the first post that fails to parse
        #[arg(long)]
        strict: bool,
    },

    /// Parse every post without writing anything; fails if any post is invalid
    Check {
        /// Directory of markdown posts (overrides paths.input)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Print the tag index
    Tags {
        /// Directory of markdown posts (overrides paths.input)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `tags --json` output stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Build {
            input,
            output,
            strict,
        } => {
            let mut config =
                commands::load_config(config_path, input.as_deref(), output.as_deref())?;
            if strict {
                config.on_error = blogsmith_core::ErrorPolicy::Abort;
            }
            commands::build_site(config).map(|_| ())
        }
        Commands::Check { input } => {
            let config = commands::load_config(config_path, input.as_deref(), None)?;
            commands::check_site(config)
        }
        Commands::Tags { input, json } => {
            let config = commands::load_config(config_path, input.as_deref(), None)?;
            commands::list_tags(config, json)
        }
    }
}
