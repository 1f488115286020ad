use std::sync::Arc;

use log::*;

use crate::db::repository::DbStorage;
use crate::db_config::{AppConfig, DbConfig, StorageKind};
use crate::errors::{DbError, FilmorateError};
use crate::logic::friendship::{FriendAction, FriendshipOutcome};
use crate::logic::models::{Film, FilmId, Genre, Mpa, User, UserId};
use crate::logic::validation::{ValidFilm, ValidUser};

pub mod in_memory;

use in_memory::InMemoryStorage;

pub type Result<T> = std::result::Result<T, FilmorateError>;

pub trait UserStorage {
    /// All users, ascending by id.
    fn users(&self) -> Result<Vec<User>>;
    fn user(&self, id: UserId) -> Result<User>;
    fn user_exists(&self, id: UserId) -> Result<bool>;
    /// Inserts when `user.id` is absent, updates otherwise. Returns the id.
    fn put_user(&self, user: ValidUser) -> Result<UserId>;
    /// Removes the user with every friendship edge and like referencing it.
    fn delete_user(&self, id: UserId) -> Result<bool>;

    /// Applies one friendship step for `user_id -> friend_id` atomically.
    fn update_friendship(
        &self,
        action: FriendAction,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<FriendshipOutcome>;
    /// Users with an edge from `id`, ascending by id.
    fn friends(&self, id: UserId) -> Result<Vec<User>>;
    fn common_friends(&self, id: UserId, other_id: UserId) -> Result<Vec<User>>;
}

pub trait FilmStorage {
    fn films(&self) -> Result<Vec<Film>>;
    fn film(&self, id: FilmId) -> Result<Film>;
    fn film_exists(&self, id: FilmId) -> Result<bool>;
    fn put_film(&self, film: ValidFilm) -> Result<FilmId>;
    fn delete_film(&self, id: FilmId) -> Result<bool>;

    fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<()>;
    fn remove_like(&self, film_id: FilmId, user_id: UserId) -> Result<()>;
    /// Up to `limit` films by likes descending, then id ascending.
    fn popular(&self, limit: usize) -> Result<Vec<Film>>;
}

pub trait CatalogStorage {
    fn all_mpa(&self) -> Result<Vec<Mpa>>;
    fn mpa(&self, id: i32) -> Result<Mpa>;
    fn genres(&self) -> Result<Vec<Genre>>;
    fn genre(&self, id: i32) -> Result<Genre>;
}

pub trait Storage: UserStorage + FilmStorage + CatalogStorage + Send + Sync {}

impl<T> Storage for T where T: UserStorage + FilmStorage + CatalogStorage + Send + Sync {}

pub type SharedStorage = Arc<dyn Storage>;

pub fn build_storage(config: &AppConfig) -> std::result::Result<SharedStorage, DbError> {
    match config.storage {
        StorageKind::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        StorageKind::Database => {
            info!("Using database storage at {}", config.database_url);
            let pool = DbConfig::get_pool(&config.database_url, config.pool_size)?;
            DbConfig::run_migrations(&pool)?;
            Ok(Arc::new(DbStorage::new(pool)))
        }
    }
}

pub(crate) fn user_not_found(id: UserId) -> FilmorateError {
    FilmorateError::not_found(format!("User with ID: {} does not exist", id))
}

pub(crate) fn film_not_found(id: FilmId) -> FilmorateError {
    FilmorateError::not_found(format!("Film with ID: {} does not exist", id))
}

pub(crate) fn mpa_not_found(id: i32) -> FilmorateError {
    FilmorateError::not_found(format!("MPA with ID: {} does not exist", id))
}

pub(crate) fn genre_not_found(id: i32) -> FilmorateError {
    FilmorateError::not_found(format!("Genre with ID: {} does not exist", id))
}

#[cfg(test)]
pub(crate) mod contract;
