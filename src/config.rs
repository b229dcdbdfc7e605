//! synthflow configuration
//!
//! Looked up in this order (first hit wins):
//!
//! 1. `--config <path>`
//! 2. `./synthflow.toml`
//! 3. Defaults
//!
//! `SYNTHFLOW_FORMAT` overrides `[output] format` afterwards.
//!
//! ```toml
//! [output]
//! format = "json"
//!
//! [references]
//! require_registered = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::output::OutputFormat;

pub const CONFIG_FILE: &str = "synthflow.toml";
pub const FORMAT_ENV: &str = "SYNTHFLOW_FORMAT";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub references: ReferenceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReferenceConfig {
    /// Only references present in the archive's `systems:` resolve
    #[serde(default)]
    pub require_registered: bool,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from an explicit path; the file must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SynthError::Config {
            reason: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&content)
    }

    /// Explicit path, else `./synthflow.toml` if present, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if local.exists() {
                    Self::load_from(&local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply `SYNTHFLOW_FORMAT` if set and non-empty
    pub fn with_env(self) -> Result<Self> {
        self.with_format_override(std::env::var(FORMAT_ENV).ok().as_deref())
    }

    fn with_format_override(mut self, format: Option<&str>) -> Result<Self> {
        if let Some(format) = format.filter(|f| !f.is_empty()) {
            self.output.format = format.parse()?;
        }
        Ok(self)
    }
}
