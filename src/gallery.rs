//! Saved collages view model

use crate::store::{CollageArchive, CollageEntity};
use crate::Result;

/// What the saved-collages page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    Empty,
    /// Newest first
    Items(Vec<CollageEntity>),
    /// Storage could not be read
    Error(String),
}

impl GalleryView {
    pub fn items(&self) -> &[CollageEntity] {
        match self {
            GalleryView::Items(items) => items,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GalleryView::Empty)
    }
}

/// Read every archived collage, newest first.
///
/// Storage errors are folded into [`GalleryView::Error`] rather than returned.
pub async fn load(archive: &dyn CollageArchive) -> GalleryView {
    match archive.get_all().await {
        Ok(mut items) if !items.is_empty() => {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            GalleryView::Items(items)
        }
        Ok(_) => GalleryView::Empty,
        Err(e) => {
            log::error!("Failed to load saved collages: {}", e);
            GalleryView::Error(e.to_string())
        }
    }
}

/// Delete one collage and reload the view.
pub async fn delete(archive: &dyn CollageArchive, id: &str) -> Result<GalleryView> {
    archive.delete(id).await?;
    log::info!("deleted collage {}", id);
    Ok(load(archive).await)
}
