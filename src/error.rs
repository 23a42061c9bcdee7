use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("config root must be a JSON object")]
    NotAnObject,

    #[error("config already has version '{0}'; only unversioned legacy configs can be migrated")]
    AlreadyVersioned(String),

    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' entry {index} must be a [value, probability] pair")]
    InvalidPair { field: &'static str, index: usize },

    #[error("shift_weights sum to zero and cannot be normalized")]
    ZeroWeightSum,

    #[error("field '{0}' did not convert to a consistent probability table")]
    InconsistentTable(&'static str),

    #[error("backup target {} already exists", .0.display())]
    BackupExists(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid json: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MigrateError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "not_an_object",
            Self::AlreadyVersioned(_) => "already_versioned",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidPair { .. } => "invalid_pair",
            Self::ZeroWeightSum => "zero_weight_sum",
            Self::InconsistentTable(_) => "inconsistent_table",
            Self::BackupExists(_) => "backup_exists",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::Serialize(_) => "serialize_error",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;
