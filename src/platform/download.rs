//! Download delivery port for exported collages

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Hands a finished artifact to the user.
pub trait Downloader: Send + Sync {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()>;
}

impl<T: Downloader + ?Sized> Downloader for std::sync::Arc<T> {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        (**self).deliver(filename, bytes)
    }
}

/// Writes downloads into a directory, like a browser's download folder
pub struct DirectoryDownloader {
    dir: PathBuf,
}

impl DirectoryDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Downloader for DirectoryDownloader {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        if filename.contains(['/', '\\']) || filename.starts_with('.') {
            return Err(Error::DeliveryFailure(format!("invalid file name '{}'", filename)));
        }
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.dir.join(filename), bytes))
            .map_err(|e| Error::DeliveryFailure(format!("{}: {}", filename, e)))?;
        log::info!("downloaded {} ({} bytes) to {}", filename, bytes.len(), self.dir.display());
        Ok(())
    }
}

/// A delivered artifact kept in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Records deliveries in memory; used by tests and embedders that post-process output
#[derive(Default)]
pub struct MemoryDownloader {
    downloads: Mutex<Vec<Download>>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Downloader for MemoryDownloader {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<()> {
        let mut d = self
            .downloads
            .lock()
            .map_err(|_| Error::DeliveryFailure("download log poisoned".into()))?;
        d.push(Download {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
