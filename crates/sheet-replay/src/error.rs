use std::path::PathBuf;

use sheet_core::{ConfigError, SheetError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("engine error: {0}")]
    Sheet(#[from] SheetError),

    #[error("trace file does not exist: {path}")]
    MissingTrace { path: PathBuf },

    #[error("invalid trace: {message}")]
    InvalidTrace { message: String },
}

impl ReplayError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingTrace { .. } | Self::InvalidTrace { .. } => 2,
            Self::Config(_) | Self::Sheet(_) => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidTrace {
            message: message.into(),
        }
    }
}
