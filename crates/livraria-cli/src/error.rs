use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] livraria_store::StoreError),

    #[error(transparent)]
    Orders(#[from] livraria_core::OrderSourceError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] livraria_core::HttpError),

    #[error("failed to read custom expedition data from {path}: {reason}")]
    CustomData { path: PathBuf, reason: String },

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::CustomData { .. } => 2,
            Self::Store(_) | Self::Orders(_) => 4,
            Self::Http(_) | Self::Logging(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
