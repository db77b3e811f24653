//! Delimited-file loading errors.

use std::path::PathBuf;

use super::{CorrespondenceError, MatrixError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", .path.display())]
    EmptyFile { path: PathBuf },

    #[error("{}:{line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("columns missing from {name}: {}", .columns.join(", "))]
    MissingColumns { name: String, columns: Vec<String> },

    #[error(transparent)]
    Correspondence(#[from] CorrespondenceError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
