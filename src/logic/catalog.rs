use log::*;

use crate::errors::FilmorateError;
use crate::logic::blocking;
use crate::logic::models::{Genre, Mpa};
use crate::storage::SharedStorage;

/// Reference rows shared by both storages; `migrations/` seeds the same rows.
pub const MPA_RATINGS: [(i32, &str); 5] = [(1, "G"), (2, "PG"), (3, "PG-13"), (4, "R"), (5, "NC-17")];

pub const GENRES: [(i32, &str); 6] = [
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Cartoon"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

pub async fn get_all_mpa(storage: &SharedStorage) -> Result<Vec<Mpa>, FilmorateError> {
    debug!("Requesting all MPA ratings");
    blocking(storage, |s| s.all_mpa()).await
}

pub async fn get_mpa(storage: &SharedStorage, id: i32) -> Result<Mpa, FilmorateError> {
    debug!("Requesting MPA rating with ID: {}", id);
    blocking(storage, move |s| s.mpa(id)).await
}

pub async fn get_genres(storage: &SharedStorage) -> Result<Vec<Genre>, FilmorateError> {
    debug!("Requesting all genres");
    blocking(storage, |s| s.genres()).await
}

pub async fn get_genre(storage: &SharedStorage, id: i32) -> Result<Genre, FilmorateError> {
    debug!("Requesting genre with ID: {}", id);
    blocking(storage, move |s| s.genre(id)).await
}
