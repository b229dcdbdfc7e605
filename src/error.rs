//! Error types with fix suggestions

use thiserror::Error;

use crate::ordering::SerialCheck;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SF-001: Config error: {reason}")]
    Config { reason: String },

    #[error("SF-002: Unsupported document format '{extension}'")]
    UnsupportedFormat { extension: String },

    // ─────────────────────────────────────────────────────────────
    // Timing errors (SF-010 to SF-011)
    // ─────────────────────────────────────────────────────────────
    #[error("SF-010: Invalid duration '{input}'")]
    InvalidDuration { input: String },

    #[error("SF-011: Duration must be non-negative and finite, got {seconds} s")]
    NegativeDuration { seconds: f64 },

    // ─────────────────────────────────────────────────────────────
    // Synthesis errors (SF-020)
    // ─────────────────────────────────────────────────────────────
    #[error("SF-020: Steps are not serial: {check}")]
    NotSerial { check: SerialCheck },

    // ─────────────────────────────────────────────────────────────
    // Lookup errors (SF-030 to SF-031)
    // ─────────────────────────────────────────────────────────────
    #[error("SF-030: Process '{name}' not found in archive")]
    ProcessNotFound { name: String },

    #[error("SF-031: Stack '{name}' not found in archive")]
    StackNotFound { name: String },
}

impl FixSuggestion for SynthError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            SynthError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            SynthError::JsonParse(_) => Some("Check JSON syntax (try parsing with jq)"),
            SynthError::TomlParse(_) => Some("Check synthflow.toml syntax"),
            SynthError::Io(_) => Some("Check file path and permissions"),
            SynthError::Config { .. } => {
                Some("Use format = \"yaml\" | \"json\" under [output] in synthflow.toml")
            }
            SynthError::UnsupportedFormat { .. } => Some("Use a .yaml, .yml or .json archive"),
            SynthError::InvalidDuration { .. } => {
                Some("Use seconds (10) or a value with unit: \"250 ms\", \"5 min\", \"1.5 h\"")
            }
            SynthError::NegativeDuration { .. } => Some("Durations cannot be negative"),
            SynthError::NotSerial { check } => Some(check.hint()),
            SynthError::ProcessNotFound { .. } => {
                Some("Verify the process name exists under processes:")
            }
            SynthError::StackNotFound { .. } => Some("Verify the stack name exists under stacks:"),
        }
    }
}
