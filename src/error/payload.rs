use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to read payload file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to list payload directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Payload directory '{path}' contains no files.")]
    NoFiles { path: PathBuf },
    #[error("Body lines file '{path}' was empty.")]
    LinesEmpty { path: PathBuf },
    #[error("Failed to encode payload: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}
