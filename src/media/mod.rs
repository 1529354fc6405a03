use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

/// Multipart field carrying the pet image
pub const IMAGE_FIELD: &str = "image";

/// URL prefix the upload root is served under; also the prefix of every
/// stored `imageUrl`
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unexpected field")]
    UnexpectedField(String),

    #[error("Not an image! Please upload only images.")]
    NotAnImage,

    #[error("Image upload is required.")]
    Missing,

    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accepts pet images and writes them beneath the upload root under
/// collision-free names.
pub struct MediaIntake {
    root: PathBuf,
    last_stamp: AtomicI64,
}

impl MediaIntake {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_stamp: AtomicI64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), MediaError> {
        if !tokio::fs::try_exists(&self.root).await? {
            tokio::fs::create_dir_all(&self.root).await?;
            info!("Created upload directory {}", self.root.display());
        }
        Ok(())
    }

    /// Accepts only the image field with an `image/*` content type
    pub fn check(&self, field: &str, content_type: Option<&str>) -> Result<(), MediaError> {
        if field != IMAGE_FIELD {
            return Err(MediaError::UnexpectedField(field.to_string()));
        }
        match content_type {
            Some(mime) if mime.starts_with("image/") => Ok(()),
            _ => Err(MediaError::NotAnImage),
        }
    }

    /// Millisecond clock forced to increase strictly across calls
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match self
                .last_stamp
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(current) => last = current,
            }
        }
    }

    /// `<field>-<millis>[.<ext>]`, keeping the original file's extension
    pub fn next_file_name(&self, field: &str, original: Option<&str>) -> String {
        let stamp = self.next_stamp();
        let extension = original
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
        match extension {
            Some(ext) => format!("{}-{}.{}", field, stamp, ext),
            None => format!("{}-{}", field, stamp),
        }
    }

    pub fn public_url(file_name: &str) -> String {
        format!("{}/{}", PUBLIC_PREFIX, file_name)
    }

    /// Writes the file and returns its public relative path
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        tokio::fs::write(self.root.join(file_name), bytes).await?;
        debug!(file = file_name, size = bytes.len(), "Stored upload");
        Ok(Self::public_url(file_name))
    }
}
