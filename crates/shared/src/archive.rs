use std::cmp::Reverse;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::models::ChatMessage;
use crate::sessions::{SessionError, SessionStore};

const FILE_PREFIX: &str = "session_";
const FILE_SUFFIX: &str = ".json";
const MAX_TIMESTAMP_BUMPS: i64 = 120;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("session not found")]
    NotFound,
    #[error("session archive io failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<SessionError> for ArchiveError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => Self::NotFound,
        }
    }
}

/// Point-in-time snapshots of session transcripts, one file per save.
#[derive(Debug, Clone)]
pub struct SessionArchive {
    dir: PathBuf,
}

impl SessionArchive {
    pub async fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir.as_ref()).await?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(
        &self,
        sessions: &SessionStore,
        session_id: &str,
    ) -> Result<String, ArchiveError> {
        let session = sessions.get(session_id)?;
        self.save_messages_at(&session.id, &session.messages, Utc::now().timestamp())
            .await
    }

    /// Writes `messages` as `session_<id>_<timestamp>.json`. An existing file
    /// is never overwritten: the timestamp moves forward until a free name is
    /// found.
    pub async fn save_messages_at(
        &self,
        session_id: &str,
        messages: &[ChatMessage],
        timestamp: i64,
    ) -> Result<String, ArchiveError> {
        let body = serde_json::to_vec_pretty(messages)?;

        for bump in 0..MAX_TIMESTAMP_BUMPS {
            let filename = session_file_name(session_id, timestamp.saturating_add(bump));
            let path = self.dir.join(&filename);
            let file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err.into()),
            };

            write_snapshot(file, &path, &body).await?;

            info!(
                session_id = %session_id,
                filename = %filename,
                messages = messages.len(),
                "session saved"
            );
            return Ok(filename);
        }

        Err(ArchiveError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free archive filename for session {session_id}"),
        )))
    }

    /// Saved filenames, most recent save first. Names that do not carry a
    /// save timestamp sort after all that do.
    pub async fn list(&self) -> Result<Vec<String>, ArchiveError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut filenames = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                filenames.push(name.to_string());
            }
        }

        filenames.sort_by_cached_key(|name| (Reverse(saved_timestamp(name)), Reverse(name.clone())));
        Ok(filenames)
    }
}

// A snapshot that cannot be fully written is removed so listings never
// report a truncated file.
async fn write_snapshot<W>(mut file: W, path: &Path, body: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(body).await?;
        file.flush().await
    }
    .await;

    if let Err(err) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(
                "failed to remove partial session file {}: {remove_err}",
                path.display()
            );
        }
        return Err(err);
    }

    Ok(())
}

pub fn session_file_name(session_id: &str, timestamp: i64) -> String {
    format!("{FILE_PREFIX}{session_id}_{timestamp}{FILE_SUFFIX}")
}

fn saved_timestamp(filename: &str) -> Option<i64> {
    let stem = filename
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?;
    let (_, timestamp) = stem.rsplit_once('_')?;
    timestamp.parse().ok()
}
