use std::path::PathBuf;

/// The dataset could not be produced: the file is missing, unreadable, or
/// does not match the fund schema.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("dataset unavailable at {}: {source:#}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl DataError {
    pub fn unavailable(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        DataError::Unavailable {
            path: path.into(),
            source,
        }
    }
}

/// A symbol lookup that found nothing in the current subset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("symbol {0} is not in the current selection")]
    NotFound(String),
}
