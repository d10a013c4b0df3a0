use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;

use crate::config::PayloadSpec;
use crate::error::PayloadError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// One request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub body: Vec<u8>,
    pub content_type: Option<&'static str>,
}

impl Payload {
    #[must_use]
    pub fn text(body: String) -> Self {
        Self {
            body: body.into_bytes(),
            content_type: None,
        }
    }

    #[must_use]
    pub const fn json(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: Some(JSON_CONTENT_TYPE),
        }
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        u64::try_from(self.body.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Produces the body for the next request. Called once per attempt, including
/// attempts that end up retried.
#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when no body can be produced; the calling worker stops.
    async fn next_payload(&self) -> Result<Payload, PayloadError>;
}

#[derive(Debug)]
pub struct IndexedList {
    items: Vec<String>,
    cursor: AtomicUsize,
}

impl IndexedList {
    const fn new(items: Vec<String>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        let selected = idx.rem_euclid(self.items.len());
        self.items.get(selected).cloned()
    }
}

#[derive(Debug, Clone)]
pub enum BodySource {
    Empty,
    Static(String),
    Lines(Arc<IndexedList>),
    Directory(PathBuf),
}

impl BodySource {
    /// Prepares the source described by `spec`. A lines file is read eagerly.
    ///
    /// # Errors
    ///
    /// Returns an error when the lines file cannot be read or has no lines.
    pub fn from_spec(spec: &PayloadSpec) -> Result<Self, PayloadError> {
        match spec {
            PayloadSpec::Empty => Ok(Self::Empty),
            PayloadSpec::Static(body) => Ok(Self::Static(body.clone())),
            PayloadSpec::Lines(path) => Self::from_lines_file(path),
            PayloadSpec::Directory(path) => Ok(Self::Directory(path.clone())),
        }
    }

    fn from_lines_file(path: &Path) -> Result<Self, PayloadError> {
        let content = std::fs::read_to_string(path).map_err(|err| PayloadError::ReadFile {
            path: path.to_path_buf(),
            source: err,
        })?;
        let lines: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        if lines.is_empty() {
            return Err(PayloadError::LinesEmpty {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!("Loaded {} body lines from {}", lines.len(), path.display());
        Ok(Self::Lines(Arc::new(IndexedList::new(lines))))
    }
}

#[async_trait]
impl PayloadSource for BodySource {
    async fn next_payload(&self) -> Result<Payload, PayloadError> {
        match self {
            BodySource::Empty => Ok(Payload::default()),
            BodySource::Static(body) => Ok(Payload::text(body.clone())),
            BodySource::Lines(list) => Ok(list.next().map(Payload::text).unwrap_or_default()),
            BodySource::Directory(dir) => next_directory_payload(dir).await,
        }
    }
}

async fn next_directory_payload(dir: &Path) -> Result<Payload, PayloadError> {
    let files = list_files(dir).await?;
    let picked = {
        let mut rng = rand::thread_rng();
        files.get(rng.gen_range(0..files.len())).cloned()
    };
    let Some(path) = picked else {
        return Err(PayloadError::NoFiles {
            path: dir.to_path_buf(),
        });
    };
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| PayloadError::ReadFile {
            path: path.clone(),
            source: err,
        })?;
    wrap_data_document(bytes)
}

async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, PayloadError> {
    let read_dir_err = |err| PayloadError::ReadDir {
        path: dir.to_path_buf(),
        source: err,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let file_type = entry.file_type().await.map_err(read_dir_err)?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    if files.is_empty() {
        return Err(PayloadError::NoFiles {
            path: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// `{"data": "<contents>"}`; text is sent as-is, binary content as base64.
pub(crate) fn wrap_data_document(bytes: Vec<u8>) -> Result<Payload, PayloadError> {
    let data = match String::from_utf8(bytes) {
        Ok(text) => text.trim_end_matches(['\r', '\n']).to_owned(),
        Err(err) => BASE64.encode(err.into_bytes()),
    };
    let document = serde_json::json!({ "data": data });
    let body = serde_json::to_vec(&document).map_err(|err| PayloadError::Encode { source: err })?;
    Ok(Payload::json(body))
}
