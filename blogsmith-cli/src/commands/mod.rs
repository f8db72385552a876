//! CLI command implementations.

pub mod build;
pub mod check;
pub mod init;
pub mod tags;

pub use build::build_site;
pub use check::check_site;
pub use init::init_project;
pub use tags::list_tags;

use anyhow::{bail, Context, Result};
use blogsmith_core::Config;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "blogsmith.yml";

/// Load the configuration and apply directory overrides from the command line.
///
/// An explicitly named config file must exist. Without one, `blogsmith.yml`
/// in the working directory is used when present and defaults otherwise.
pub fn load_config(
    config_path: Option<&Path>,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {:?} not found", path);
            }
            tracing::info!("Loading config from {:?}", path);
            Config::from_file(path).context("Failed to load configuration")?
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            tracing::info!("Loading config from {}", DEFAULT_CONFIG_FILE);
            Config::from_file(DEFAULT_CONFIG_FILE).context("Failed to load configuration")?
        }
        None => {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Config::default()
        }
    };

    // Flags are relative to the working directory, not to the config file
    if let Some(input) = input {
        config.set_input_dir(absolutize(input)?);
    }
    if let Some(output) = output {
        config.set_output_dir(absolutize(output)?);
    }

    Ok(config)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    Ok(cwd.join(path))
}
