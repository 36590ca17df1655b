//! Collagekit
//!
//! A headless collage composer: pick up to four photos, arrange them in a
//! fixed layout, rasterize the arrangement to PNG, deliver it as a download
//! and archive it in a local object store.
//!
//! # Features
//!
//! - **Draft state**: a single in-progress collage persisted in an injected
//!   key-value storage slot
//! - **Export pipeline**: readiness barrier with per-image timeouts, 2x
//!   capture, delivery and best-effort archival
//! - **Port-based design**: storage, image loading, capture and downloads are
//!   traits so the core runs without a browser host
//! - **HTTP backend** (default `http` feature): Unsplash photo source and
//!   remote image loading via `reqwest`
//!
//! # Example
//!
//! ```no_run
//! use collagekit::platform::MemoryStorage;
//! use collagekit::state::{CollageImage, CollageLayout, DraftStore};
//!
//! # fn main() -> collagekit::Result<()> {
//! let drafts = DraftStore::new(MemoryStorage::new());
//! let state = collagekit::state::create(vec![
//!     CollageImage::new("a", "https://example.com/a.jpg"),
//!     CollageImage::new("b", "https://example.com/b.jpg"),
//! ])?;
//! let state = state.with_layout(CollageLayout::Horizontal);
//! drafts.save(&state)?;
//! assert_eq!(drafts.load(), Some(state));
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod state;
pub mod selection;

// Capability ports standing in for browser globals (storage, image loading, downloads)
pub mod platform;

// Layout table, rasterizer and the export pipeline
pub mod rendering;

// SQLite-backed archive of exported collages
pub mod store;

pub mod gallery;

// Photo source client (HTTP) and search debouncing
pub mod source;

pub use rendering::export::{ExportReport, Exporter};
pub use selection::SelectionController;
pub use state::{CollageImage, CollageLayout, CollageState, DraftStore};
pub use store::{CollageArchive, CollageEntity, StoreHandle};

/// Maximum number of images a collage may hold
pub const MAX_IMAGES: usize = 4;

/// Storage slot holding the draft collage
pub const DRAFT_KEY: &str = "collage-state";

/// Configuration for composing and exporting collages
///
/// The defaults mirror what a browser widget would do: 2x pixel density, a
/// 10 second wait per image and an 800x800 logical canvas.
///
/// # Examples
///
/// ```
/// let cfg = collagekit::CollageConfig::default();
/// assert_eq!(cfg.pixel_ratio, 2.0);
/// assert_eq!(cfg.image_timeout_ms, 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct CollageConfig {
    /// Logical canvas size before the pixel ratio is applied
    pub canvas: Canvas,
    /// Gap between cells in logical pixels
    pub gap: u32,
    /// Canvas background
    pub background: [u8; 4],
    /// Output density multiplier
    pub pixel_ratio: f32,
    /// Per-image readiness timeout in milliseconds
    pub image_timeout_ms: u64,
    /// Append a cache-busting parameter to remote image requests
    pub cache_bust: bool,
    /// Selection capacity
    pub max_selection: usize,
    /// Storage slot for the draft collage
    pub draft_key: String,
    /// Quiet period before a search is dispatched
    pub search_debounce_ms: u64,
    /// Directory holding the draft slot and the collage database
    pub data_dir: PathBuf,
    /// Unsplash API settings
    pub unsplash: UnsplashConfig,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            gap: 8,
            background: [255, 255, 255, 255],
            pixel_ratio: 2.0,
            image_timeout_ms: 10_000,
            cache_bust: true,
            max_selection: MAX_IMAGES,
            draft_key: DRAFT_KEY.to_string(),
            search_debounce_ms: 500,
            data_dir: default_data_dir(),
            unsplash: UnsplashConfig::default(),
        }
    }
}

impl CollageConfig {
    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(Error::ConfigError(format!(
                "pixel_ratio must be positive, got {}",
                self.pixel_ratio
            )));
        }
        if self.image_timeout_ms == 0 {
            return Err(Error::ConfigError("image_timeout_ms must be non-zero".into()));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::ConfigError("canvas must have a non-zero size".into()));
        }
        if self.max_selection == 0 || self.max_selection > MAX_IMAGES {
            return Err(Error::ConfigError(format!(
                "max_selection must be between 1 and {}",
                MAX_IMAGES
            )));
        }
        Ok(())
    }

    /// Path of the SQLite file backing the collage archive
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("collage-db.sqlite3")
    }

    /// Directory used as the draft key-value store
    pub fn session_dir(&self) -> PathBuf {
        self.data_dir.join("session")
    }
}

/// Logical canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

/// Unsplash API settings
#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    pub base_url: String,
    /// Access key sent as `Client-ID`; read from `UNSPLASH_ACCESS_KEY` by default
    pub access_key: Option<String>,
    pub per_page: u32,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".to_string(),
            access_key: std::env::var("UNSPLASH_ACCESS_KEY").ok().filter(|k| !k.is_empty()),
            per_page: 12,
        }
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);
    path.push("collagekit");
    path
}

/// Current time as epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CollageConfig::default();
        assert_eq!(config.canvas.width, 800);
        assert_eq!(config.canvas.height, 800);
        assert_eq!(config.max_selection, 4);
        assert_eq!(config.draft_key, "collage-state");
        assert!(config.cache_bust);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = CollageConfig {
            pixel_ratio: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));

        let cfg = CollageConfig {
            image_timeout_ms: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = CollageConfig {
            max_selection: 5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_database_path_lives_in_data_dir() {
        let cfg = CollageConfig {
            data_dir: PathBuf::from("/tmp/ck"),
            ..Default::default()
        };
        assert_eq!(cfg.database_path(), PathBuf::from("/tmp/ck/collage-db.sqlite3"));
        assert_eq!(cfg.session_dir(), PathBuf::from("/tmp/ck/session"));
    }
}
