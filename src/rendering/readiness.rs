//! Readiness barrier: wait for every image in a view before capture

use crate::platform::ImageLoader;
use crate::rendering::layout::CollageView;
use crate::rendering::LoadedImage;
use crate::{Error, Result};
use futures::future::try_join_all;
use std::time::Duration;

/// Load and decode every image of `view` concurrently.
///
/// Each image gets its own `timeout`. The join is all-or-fail: the first
/// timeout or load failure rejects the whole barrier, and nothing is returned
/// until every image has settled successfully.
pub async fn wait_for_images(
    loader: &dyn ImageLoader,
    view: &CollageView,
    timeout: Duration,
) -> Result<Vec<LoadedImage>> {
    let waits = view
        .state
        .images()
        .iter()
        .map(|img| wait_for_image(loader, &img.src, timeout));
    let loaded = try_join_all(waits).await?;
    log::debug!("readiness barrier passed for {} images", loaded.len());
    Ok(loaded)
}

async fn wait_for_image(loader: &dyn ImageLoader, src: &str, timeout: Duration) -> Result<LoadedImage> {
    let bytes = match tokio::time::timeout(timeout, loader.load(src)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e @ Error::LoadFailure { .. })) => return Err(e),
        Ok(Err(other)) => {
            return Err(Error::LoadFailure {
                src: src.to_string(),
                reason: other.to_string(),
            })
        }
        Err(_) => {
            log::warn!("image load timed out after {:?}: {}", timeout, src);
            return Err(Error::LoadTimeout {
                src: src.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
    };

    let owned_src = src.to_string();
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| Error::LoadFailure {
            src: owned_src.clone(),
            reason: format!("decoder task failed: {}", e),
        })?
        .map_err(|e| Error::LoadFailure {
            src: owned_src.clone(),
            reason: format!("undecodable image: {}", e),
        })?;

    Ok(LoadedImage {
        src: owned_src,
        image,
    })
}
