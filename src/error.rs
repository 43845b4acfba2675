use thiserror::Error;

use crate::formatter::ConventionId;

#[derive(Error, Debug)]
pub enum SubfmtError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} root path not exist: {path}")]
    RootNotFound { kind: &'static str, path: String },

    #[error("Unknown subtitle naming convention: {0}")]
    UnknownConvention(String),

    #[error("No formatter registered for convention: {0}")]
    FormatterNotRegistered(ConventionId),

    #[error("Library discovery error: {0}")]
    Discovery(String),
}

pub type Result<T> = std::result::Result<T, SubfmtError>;
