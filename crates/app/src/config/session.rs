//! Session Config

use std::path::PathBuf;

use clap::Args;
use directories::ProjectDirs;

use super::ConfigError;

/// File name of the stored token inside the config directory.
pub const TOKEN_FILE_NAME: &str = "token";

/// Token storage settings.
#[derive(Debug, Args)]
pub struct SessionConfig {
    /// Where the bearer token is stored; defaults to the platform config dir
    #[arg(long, env = "STOREFRONT_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,
}

impl SessionConfig {
    /// The token file to use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no path is configured and
    /// the platform has no config directory.
    pub fn token_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.token_file {
            return Ok(path.clone());
        }

        ProjectDirs::from("app", "storefront", "storefront")
            .map(|dirs| dirs.config_dir().join(TOKEN_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }
}
