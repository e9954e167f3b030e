//! CLI subcommands.

pub mod compile;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use busta_core::models::config::PayrollConfig;
use busta_core::source::{AutoTextSource, EmbeddedTextSource, TextSource};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("busta")
        .join("config.json")
}

/// Load the configuration from `--config`, the default file, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PayrollConfig> {
    let config = match config_path {
        Some(path) => PayrollConfig::from_file(Path::new(path))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using configuration at {}", path.display());
                PayrollConfig::from_file(&path)?
            } else {
                PayrollConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Text source for the given flags.
pub fn text_source(config: &PayrollConfig, text_only: bool) -> Arc<dyn TextSource> {
    if text_only {
        Arc::new(EmbeddedTextSource::new())
    } else {
        Arc::new(AutoTextSource::new(config.pdf.clone(), config.ocr.clone()))
    }
}
