//! Local object store for exported collages
//!
//! `CollageStore` is the synchronous SQLite archive; `StoreHandle` puts it on
//! a worker thread behind an async API. Consumers depend on the
//! `CollageArchive` port so tests can swap in failing or in-memory archives.

pub mod sqlite;
pub mod worker;

pub use sqlite::{CollageStore, SCHEMA_VERSION};
pub use worker::StoreHandle;

use crate::Result;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// A finished, exported collage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollageEntity {
    /// UUID v4, hyphenated
    pub id: String,
    /// `data:image/png;base64,...`
    pub image: String,
    /// Epoch milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl CollageEntity {
    /// A new entity with a fresh id, stamped now.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image: image.into(),
            created_at: crate::now_millis(),
        }
    }
}

/// Async access to archived collages.
///
/// Each call is atomic on its own; no ordering is promised by `get_all`.
pub trait CollageArchive: Send + Sync {
    fn put(&self, entity: CollageEntity) -> BoxFuture<'_, Result<()>>;
    fn get_all(&self) -> BoxFuture<'_, Result<Vec<CollageEntity>>>;
    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>>;
}

impl<T: CollageArchive + ?Sized> CollageArchive for std::sync::Arc<T> {
    fn put(&self, entity: CollageEntity) -> BoxFuture<'_, Result<()>> {
        (**self).put(entity)
    }

    fn get_all(&self) -> BoxFuture<'_, Result<Vec<CollageEntity>>> {
        (**self).get_all()
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        (**self).delete(id)
    }
}
