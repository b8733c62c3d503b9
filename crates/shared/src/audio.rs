//! Audio directory: synthesized clips, staged voice uploads, and the guard
//! that maps requested filenames onto files inside the directory.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

const CLIP_EXTENSION: &str = "mp3";
const UPLOAD_PREFIX: &str = "temp_";
const MAX_UPLOAD_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioPathError {
    #[error("audio file not found or invalid path")]
    Rejected,
}

#[derive(Debug, Clone)]
pub struct AudioDirectory {
    root: PathBuf,
}

impl AudioDirectory {
    /// Creates the directory when missing and pins its canonical location.
    pub async fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir.as_ref()).await?;
        let root = tokio::fs::canonicalize(dir.as_ref()).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Accepts `filename` only if it names an existing file whose canonical
    /// path stays under the audio directory.
    pub async fn resolve(&self, filename: &str) -> Result<PathBuf, AudioPathError> {
        if filename.is_empty() {
            return Err(AudioPathError::Rejected);
        }

        let canonical = tokio::fs::canonicalize(self.root.join(filename))
            .await
            .map_err(|_| AudioPathError::Rejected)?;
        if !canonical.starts_with(&self.root) {
            warn!("rejected audio path outside the audio directory");
            return Err(AudioPathError::Rejected);
        }

        match tokio::fs::metadata(&canonical).await {
            Ok(metadata) if metadata.is_file() => Ok(canonical),
            _ => Err(AudioPathError::Rejected),
        }
    }

    /// Writes a synthesized clip under a fresh name and returns that name.
    pub async fn store_clip(&self, audio: &[u8]) -> io::Result<String> {
        let filename = format!("{}.{CLIP_EXTENSION}", Uuid::new_v4());
        tokio::fs::write(self.root.join(&filename), audio).await?;
        Ok(filename)
    }

    /// Writes an uploaded recording to a temporary file that is removed when
    /// the returned value is discarded or dropped.
    pub async fn stage_upload(
        &self,
        audio: &[u8],
        original_name: Option<&str>,
    ) -> io::Result<StagedUpload> {
        let suffix = format!(".{}", upload_extension(original_name));
        let root = self.root.clone();
        let path = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(UPLOAD_PREFIX)
                .suffix(&suffix)
                .tempfile_in(&root)
                .map(NamedTempFile::into_temp_path)
        })
        .await
        .map_err(io::Error::other)??;

        tokio::fs::write(&path, audio).await?;
        Ok(StagedUpload { path })
    }
}

pub fn audio_url(filename: &str) -> String {
    format!("/audio/{filename}")
}

#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn discard(self) {
        let path = self.path;
        match tokio::task::spawn_blocking(move || path.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("failed to remove staged audio upload: {err}"),
            Err(err) => warn!("staged audio cleanup task failed: {err}"),
        }
    }
}

// Keeps the client's container extension so the transcriber can detect the
// format; anything unusual falls back to mp3.
fn upload_extension(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_UPLOAD_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| CLIP_EXTENSION.to_string())
}
