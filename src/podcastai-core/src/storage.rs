//! Local directory holding generated audio files.
//!
//! Files are named `<sanitized title>_<uuid>.<ext>`, so concurrent requests
//! never write the same path. Retention is left to the deployment.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::audio::AudioFormat;
use crate::error::PodcastError;

const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

impl AudioStore {
    /// Open (and create if needed) the files directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PodcastError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `filename`, atomically from a reader's point of view.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PodcastError> {
        let path = self.resolve(filename)?;
        let partial = self.root.join(format!(".{}.partial", filename));

        if let Err(e) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, &path).await?;

        tracing::info!(file = %path.display(), bytes = bytes.len(), "Audio file written");
        Ok(path)
    }

    /// Read a previously saved file.
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, PodcastError> {
        let path = self.resolve(filename)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(filename, e))
    }

    /// Open a previously saved file for streaming, with its length in bytes.
    pub async fn open(&self, filename: &str) -> Result<(tokio::fs::File, u64), PodcastError> {
        let path = self.resolve(filename)?;
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| not_found_or_io(filename, e))?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Map a bare file name into the store, refusing anything that could escape it.
    fn resolve(&self, filename: &str) -> Result<PathBuf, PodcastError> {
        let is_plain = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\'])
            && !filename.contains("..");

        if !is_plain {
            return Err(PodcastError::FileNotFound(filename.to_string()));
        }

        Ok(self.root.join(filename))
    }
}

fn not_found_or_io(filename: &str, err: std::io::Error) -> PodcastError {
    if err.kind() == std::io::ErrorKind::NotFound {
        PodcastError::FileNotFound(filename.to_string())
    } else {
        err.into()
    }
}

/// Make a title safe for use in a file name.
///
/// Spaces become underscores; anything other than alphanumerics, `_` and `-`
/// is dropped. The result is capped at 200 characters.
pub fn sanitize_filename(title: &str) -> String {
    let sanitized: String = title
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_TITLE_CHARS)
        .collect();

    if sanitized.is_empty() {
        "podcast".to_string()
    } else {
        sanitized
    }
}

/// Unique output file name for a podcast title.
pub fn output_filename(title: &str, format: AudioFormat) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename(title),
        Uuid::new_v4(),
        format.extension()
    )
}
