use crate::core::{SearchField, Strategy, DEFAULT_TEMPLATE};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "pls.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output template for each listed video.
    pub format: String,
    pub page_size: NonZeroUsize,
    pub strategy: Strategy,
    pub field: SearchField,
    pub yt_dlp_path: String,
    pub fzf_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: DEFAULT_TEMPLATE.to_string(),
            page_size: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
            strategy: Strategy::default(),
            field: SearchField::default(),
            yt_dlp_path: "yt-dlp".to_string(),
            fzf_path: "fzf".to_string(),
        }
    }
}

impl Config {
    /// Loads `path` if given, otherwise `pls.toml` in the working directory
    /// when there is one, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        debug!("Loading config from {}", path.display());
        Self::from_toml(&std::fs::read_to_string(&path)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
