//! Platform ports: key-value storage, image loading and downloads
//!
//! These traits stand in for the host environment a collage widget normally
//! leans on (local storage, image elements, the download mechanism), so the
//! state manager and export pipeline can be exercised without one.

pub mod download;
pub mod loader;
pub mod storage;

pub use download::{DirectoryDownloader, Download, Downloader, MemoryDownloader};
#[cfg(feature = "http")]
pub use loader::HttpImageLoader;
pub use loader::{DataUriLoader, DefaultImageLoader, FileLoader, ImageLoader};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
