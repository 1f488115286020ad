use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::*;
use r2d2::Pool;
use std::env;
use std::str::FromStr;

use crate::errors::DbError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Database,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageKind::Memory),
            "db" | "database" | "sqlite" => Ok(StorageKind::Database),
            other => Err(format!("Unknown storage kind: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub database_url: String,
    pub pool_size: u32,
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            storage: StorageKind::Database,
            database_url: "filmorate.db".to_owned(),
            pool_size: 15,
            bind_address: "127.0.0.1:8080".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            storage: parse_or(&lookup, "FILMORATE_STORAGE", defaults.storage),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            pool_size: parse_or(&lookup, "DATABASE_POOL_SIZE", defaults.pool_size),
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using {:?}", key, value, default);
            default
        }),
        None => default,
    }
}

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Clone, Debug)]
pub struct DbConfig;

impl DbConfig {
    pub fn get_pool(database_url: &str, pool_size: u32) -> Result<SqlitePool, DbError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let builder = r2d2::Pool::builder().connection_customizer(Box::new(ConnectionOptions));
        // every connection to :memory: is its own database, keep exactly one alive
        let builder = if database_url == IN_MEMORY_DATABASE {
            builder.max_size(1).idle_timeout(None).max_lifetime(None)
        } else {
            builder.max_size(pool_size.max(1))
        };
        Ok(builder.build(manager)?)
    }

    pub fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        let mut connection = pool.get()?;
        let applied = connection.run_pending_migrations(MIGRATIONS)?;
        debug!("Applied {} migrations", applied.len());
        Ok(())
    }

    #[cfg(test)]
    pub fn test_pool() -> SqlitePool {
        let pool = Self::get_pool(IN_MEMORY_DATABASE, 1).expect("in-memory pool");
        Self::run_migrations(&pool).expect("migrations applied");
        pool
    }
}
