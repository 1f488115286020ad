use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::*;
use std::{error, fmt};

use crate::logic::models::ResponseMessage;

pub type MigrationFailure = Box<dyn error::Error + Send + Sync>;

/// ***************
/// Filmorate Errors
/// ***************
#[derive(Debug)]
pub struct FilmorateError(FilmorateErrorKind);

#[derive(Debug)]
pub enum FilmorateErrorKind {
    NotFound(String),
    AlreadyExists(String),
    Validation(String),
    SelfReference(String),
    Db(DbError),
}

impl FilmorateError {
    pub fn not_found(message: impl Into<String>) -> Self {
        FilmorateError(FilmorateErrorKind::NotFound(message.into()))
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        FilmorateError(FilmorateErrorKind::AlreadyExists(message.into()))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        FilmorateError(FilmorateErrorKind::Validation(message.into()))
    }

    pub fn self_reference(message: impl Into<String>) -> Self {
        FilmorateError(FilmorateErrorKind::SelfReference(message.into()))
    }

    pub fn kind(&self) -> &FilmorateErrorKind {
        &self.0
    }
}

impl From<DbError> for FilmorateError {
    fn from(error: DbError) -> Self {
        FilmorateError(FilmorateErrorKind::Db(error))
    }
}

impl From<diesel::result::Error> for FilmorateError {
    fn from(error: diesel::result::Error) -> Self {
        DbError::from(error).into()
    }
}

impl From<r2d2::Error> for FilmorateError {
    fn from(error: r2d2::Error) -> Self {
        DbError::from(error).into()
    }
}

impl From<tokio::task::JoinError> for FilmorateError {
    fn from(error: tokio::task::JoinError) -> Self {
        DbError(DbErrorKind::Blocking(error)).into()
    }
}

impl fmt::Display for FilmorateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            FilmorateErrorKind::NotFound(message) => write!(f, "{}", message),
            FilmorateErrorKind::AlreadyExists(message) => write!(f, "{}", message),
            FilmorateErrorKind::Validation(message) => write!(f, "{}", message),
            FilmorateErrorKind::SelfReference(message) => write!(f, "{}", message),
            FilmorateErrorKind::Db(error) => write!(f, "{}", error),
        }
    }
}

impl error::Error for FilmorateError {}

impl ResponseError for FilmorateError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            FilmorateErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            FilmorateErrorKind::AlreadyExists(_) => StatusCode::CONFLICT,
            FilmorateErrorKind::Validation(_) | FilmorateErrorKind::SelfReference(_) => {
                StatusCode::BAD_REQUEST
            }
            FilmorateErrorKind::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        HttpResponse::build(status).json(ResponseMessage::new(self.to_string(), status))
    }
}

/// ***************
/// DB ERRORS
/// ***************
#[derive(Debug)]
pub enum DbErrorKind {
    DieselError(diesel::result::Error),
    PoolError(r2d2::Error),
    MigrationError(MigrationFailure),
    Blocking(tokio::task::JoinError),
    Poisoned,
}

#[derive(Debug)]
pub struct DbError(pub(crate) DbErrorKind);

impl From<diesel::result::Error> for DbError {
    fn from(error: diesel::result::Error) -> Self {
        DbError(DbErrorKind::DieselError(error))
    }
}

impl From<r2d2::Error> for DbError {
    fn from(error: r2d2::Error) -> Self {
        DbError(DbErrorKind::PoolError(error))
    }
}

impl From<MigrationFailure> for DbError {
    fn from(error: MigrationFailure) -> Self {
        DbError(DbErrorKind::MigrationError(error))
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            DbErrorKind::DieselError(error) => write!(f, "{}", error),
            DbErrorKind::PoolError(error) => write!(f, "{}", error),
            DbErrorKind::MigrationError(error) => write!(f, "Migration failed: {}", error),
            DbErrorKind::Blocking(error) => write!(f, "Storage task failed: {}", error),
            DbErrorKind::Poisoned => write!(f, "In-memory storage lock is poisoned"),
        }
    }
}

impl error::Error for DbError {}
