use dramashelf_core::WorkId;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures talking to the slot store. None of these are fatal: readers fall
/// back to defaults and writers report the error as a warning.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read slot `{key}`")]
    Read {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("could not write slot `{key}`")]
    Write {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("could not delete slot `{key}`")]
    Delete {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("could not encode value for slot `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Message suitable for showing to the user as a non-fatal warning.
    pub fn user_message(&self) -> String {
        match self {
            StorageError::Write { .. } | StorageError::Encode { .. } => format!(
                "{self}: changes are kept for this session but may not be saved. \
                 Storage may be full or disabled."
            ),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse catalog {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate work id {0} in catalog")]
    DuplicateId(WorkId),
}
