use super::sqlite::CollageStore;
use super::{CollageArchive, CollageEntity};
use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Put(CollageEntity, oneshot::Sender<Result<()>>),
    GetAll(oneshot::Sender<Result<Vec<CollageEntity>>>),
    Delete(String, oneshot::Sender<Result<()>>),
    Count(oneshot::Sender<Result<i64>>),
    Close(oneshot::Sender<Result<()>>),
}

enum Location {
    File(PathBuf),
    Memory,
}

/// Async handle to the collage archive, backed by a dedicated worker thread.
///
/// The worker thread owns the SQLite connection (which is not `Sync`) and
/// executes one command at a time, so every operation is its own serialized
/// transaction. Handles are cheap to clone.
#[derive(Clone)]
pub struct StoreHandle {
    cmd_tx: Sender<Command>,
}

impl StoreHandle {
    /// Open the archive file at `path` on a new worker thread.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::spawn(Location::File(path.into())).await
    }

    /// Open a private in-memory archive on a new worker thread.
    pub async fn open_in_memory() -> Result<Self> {
        Self::spawn(Location::Memory).await
    }

    async fn spawn(location: Location) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        thread::Builder::new()
            .name("collage-store".into())
            .spawn(move || {
                let opened = match location {
                    Location::File(path) => CollageStore::open(path),
                    Location::Memory => CollageStore::open_in_memory(),
                };
                let mut store = match opened {
                    Ok(store) => store,
                    Err(err) => {
                        let _ = init_tx.send(Err(err));
                        return;
                    }
                };

                // Signal successful open (no-op when the caller stopped waiting)
                let _ = init_tx.send(Ok(()));

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Put(entity, resp) => {
                            let _ = resp.send(store.put(&entity));
                        }
                        Command::GetAll(resp) => {
                            let _ = resp.send(store.get_all());
                        }
                        Command::Delete(id, resp) => {
                            let _ = resp.send(store.delete(&id));
                        }
                        Command::Count(resp) => {
                            let _ = resp.send(store.count());
                        }
                        Command::Close(resp) => {
                            let _ = resp.send(Ok(()));
                            break;
                        }
                    }
                }
                log::debug!("collage store worker stopped");
            })
            .map_err(|e| Error::StorageUnavailable(format!("cannot spawn store worker: {}", e)))?;

        init_rx
            .await
            .map_err(|e| Error::StorageUnavailable(format!("store worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    async fn request<T>(
        &self,
        what: &str,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> Command,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .map_err(|_| Error::StorageUnavailable(format!("{}: store is closed", what)))?;
        rx.await
            .map_err(|e| Error::StorageUnavailable(format!("{} canceled: {}", what, e)))?
    }

    pub async fn put(&self, entity: CollageEntity) -> Result<()> {
        self.request("put", |tx| Command::Put(entity, tx)).await
    }

    pub async fn get_all(&self) -> Result<Vec<CollageEntity>> {
        self.request("getAll", Command::GetAll).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.request("delete", |tx| Command::Delete(id, tx)).await
    }

    pub async fn count(&self) -> Result<i64> {
        self.request("count", Command::Count).await
    }

    /// Stop the worker. Other clones of this handle fail with `StorageUnavailable` afterwards.
    pub async fn close(self) -> Result<()> {
        self.request("close", Command::Close).await
    }
}

impl CollageArchive for StoreHandle {
    fn put(&self, entity: CollageEntity) -> BoxFuture<'_, Result<()>> {
        StoreHandle::put(self, entity).boxed()
    }

    fn get_all(&self) -> BoxFuture<'_, Result<Vec<CollageEntity>>> {
        StoreHandle::get_all(self).boxed()
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<()>> {
        StoreHandle::delete(self, id).boxed()
    }
}
