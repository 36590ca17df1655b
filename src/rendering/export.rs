//! Export pipeline: readiness barrier, capture, delivery, archival
//!
//! The four steps run strictly in order. Failures in the first three abort
//! the export; archival is best effort and can only produce a warning. The
//! draft is never touched here, so every failure leaves it as it was.

use crate::platform::{Downloader, ImageLoader};
use crate::rendering::layout::CollageView;
use crate::rendering::raster::{CaptureEngine, RasterCapture};
use crate::rendering::readiness::wait_for_images;
use crate::rendering::{export_filename, Screenshot};
use crate::state::CollageState;
use crate::store::{CollageArchive, CollageEntity};
use crate::{CollageConfig, Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// `collage-<epoch-millis>.png`
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Id of the archived entity, when archival succeeded
    pub entity_id: Option<String>,
    /// Why archival was skipped or failed; the download still happened
    pub archive_warning: Option<String>,
}

/// Runs exports against injected ports.
///
/// Only one export runs at a time; a second trigger while one is in flight
/// fails with `Error::ExportInProgress` without side effects.
pub struct Exporter {
    config: CollageConfig,
    loader: Arc<dyn ImageLoader>,
    capture: Arc<dyn CaptureEngine>,
    downloader: Arc<dyn Downloader>,
    /// The archive, or why there is none
    archive: std::result::Result<Arc<dyn CollageArchive>, String>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    /// An exporter with the raster capture engine and no archive.
    pub fn new(
        config: CollageConfig,
        loader: Arc<dyn ImageLoader>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            config,
            loader,
            capture: Arc::new(RasterCapture::new()),
            downloader,
            archive: Err(Error::StorageUnavailable("no collage archive configured".into()).to_string()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_capture(mut self, capture: Arc<dyn CaptureEngine>) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_archive(mut self, archive: Arc<dyn CollageArchive>) -> Self {
        self.archive = Ok(archive);
        self
    }

    /// Attach an archive that may have failed to open.
    ///
    /// An open failure does not disable exporting: downloads still happen and
    /// each report carries the open error as its archive warning.
    pub fn with_archive_result<A: CollageArchive + 'static>(mut self, opened: Result<A>) -> Self {
        self.archive = match opened {
            Ok(archive) => Ok(Arc::new(archive)),
            Err(e) => {
                log::warn!("Collage archive unavailable, exports will not be saved: {}", e);
                Err(e.to_string())
            }
        };
        self
    }

    pub fn config(&self) -> &CollageConfig {
        &self.config
    }

    /// Whether a trigger would currently start an export.
    pub fn is_enabled(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ExportInProgress)?;
        Ok(InFlight(&self.in_flight))
    }

    /// Export the draft, if there is one.
    pub async fn export_state(&self, state: Option<&CollageState>) -> Result<ExportReport> {
        let view = state.map(CollageView::from_state);
        self.export(view.as_ref()).await
    }

    /// Export a composed view.
    pub async fn export(&self, view: Option<&CollageView>) -> Result<ExportReport> {
        let _guard = self.begin()?;
        let view = view.ok_or(Error::NoContainerFound)?;
        log::info!("exporting {} collage", view.class_name());

        // 1. Readiness barrier
        let timeout = Duration::from_millis(self.config.image_timeout_ms);
        let images = wait_for_images(self.loader.as_ref(), view, timeout).await?;

        // 2. Capture, off the async threads
        let capture = Arc::clone(&self.capture);
        let capture_view = view.clone();
        let config = self.config.clone();
        let shot = tokio::task::spawn_blocking(move || capture.capture(&capture_view, &images, &config))
            .await
            .map_err(|e| Error::CaptureFailure(format!("capture task failed: {}", e)))??;

        // 3. Delivery
        let created_at = crate::now_millis();
        let filename = export_filename(created_at);
        self.downloader.deliver(&filename, &shot.png_data)?;

        // 4. Archival (best effort)
        let archived = match &self.archive {
            Ok(archive) => archive_capture(archive.as_ref(), &shot, created_at)
                .await
                .map_err(|e| e.to_string()),
            Err(reason) => Err(reason.clone()),
        };
        let (entity_id, archive_warning) = match archived {
            Ok(id) => (Some(id), None),
            Err(reason) => {
                log::warn!("Failed to save collage to storage: {}", reason);
                (None, Some(reason))
            }
        };

        Ok(ExportReport {
            filename,
            width: shot.width,
            height: shot.height,
            entity_id,
            archive_warning,
        })
    }
}

async fn archive_capture(archive: &dyn CollageArchive, shot: &Screenshot, created_at: i64) -> Result<String> {
    let entity = CollageEntity {
        id: uuid::Uuid::new_v4().to_string(),
        image: shot.to_data_uri(),
        created_at,
    };
    let id = entity.id.clone();
    archive.put(entity).await?;
    log::debug!("archived collage {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{DataUriLoader, MemoryDownloader};

    #[tokio::test]
    async fn missing_container_is_reported_and_trigger_reenabled() {
        let exporter = Exporter::new(
            CollageConfig::default(),
            Arc::new(DataUriLoader),
            Arc::new(MemoryDownloader::new()),
        );
        let err = exporter.export(None).await.unwrap_err();
        assert!(matches!(err, Error::NoContainerFound));
        assert!(exporter.is_enabled());
    }

    #[test]
    fn guard_blocks_second_begin() {
        let exporter = Exporter::new(
            CollageConfig::default(),
            Arc::new(DataUriLoader),
            Arc::new(MemoryDownloader::new()),
        );
        let guard = exporter.begin().unwrap();
        assert!(!exporter.is_enabled());
        assert!(matches!(exporter.begin(), Err(Error::ExportInProgress)));
        drop(guard);
        assert!(exporter.is_enabled());
    }
}
