pub mod catalog;
pub mod films;
pub mod friendship;
pub mod models;
pub mod popularity;
pub mod users;
pub mod validation;

use crate::errors::FilmorateError;
use crate::storage::{SharedStorage, Storage};

/// Runs a storage call on the blocking pool, storages are synchronous.
pub(crate) async fn blocking<T, F>(storage: &SharedStorage, job: F) -> Result<T, FilmorateError>
where
    F: FnOnce(&dyn Storage) -> Result<T, FilmorateError> + Send + 'static,
    T: Send + 'static,
{
    let storage = storage.clone();
    tokio::task::spawn_blocking(move || job(storage.as_ref())).await?
}
