//! Photo source: the Unsplash client and search debouncing
//!
//! The client lives behind the default `http` feature; the photo types and
//! the debouncer are always available.

#[cfg(feature = "http")]
pub mod client;
pub mod debounce;

#[cfg(feature = "http")]
pub use client::UnsplashClient;
pub use debounce::{SearchDebouncer, Ticket};

use crate::state::CollageImage;
use serde::{Deserialize, Serialize};

/// One browsable photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub preview_uri: String,
    pub alt_text: Option<String>,
}

impl Photo {
    pub fn to_collage_image(&self) -> CollageImage {
        CollageImage {
            id: self.id.clone(),
            src: self.preview_uri.clone(),
            alt: Some(self.alt_text.clone().unwrap_or_default()),
        }
    }
}

/// A page of search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub results: Vec<Photo>,
    pub total: u64,
    pub total_pages: u64,
}

/// Unsplash photo payload, reduced to the fields we read
#[derive(Debug, Deserialize)]
pub(crate) struct UnsplashPhoto {
    id: String,
    urls: UnsplashUrls,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnsplashUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnsplashSearch {
    results: Vec<UnsplashPhoto>,
    total: u64,
    total_pages: u64,
}

impl From<UnsplashPhoto> for Photo {
    fn from(p: UnsplashPhoto) -> Self {
        Photo {
            id: p.id,
            preview_uri: p.urls.regular,
            alt_text: p.alt_description.or(p.description),
        }
    }
}

impl From<UnsplashSearch> for SearchResults {
    fn from(s: UnsplashSearch) -> Self {
        SearchResults {
            results: s.results.into_iter().map(Photo::from).collect(),
            total: s.total,
            total_pages: s.total_pages,
        }
    }
}
