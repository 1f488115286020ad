use std::collections::BTreeSet;

use actix_web::http::StatusCode;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};

pub type UserId = i32;
pub type FilmId = i32;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
    pub friends: BTreeSet<UserId>,
}

/// Incoming user payload. `id` is absent on create and required on update.
#[derive(Deserialize, Clone, Debug)]
pub struct UserDraft {
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub login: String,
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Mpa {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// `{ "id": n }` reference to an MPA or genre row, names are ignored.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reference {
    pub id: i32,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i32,
    pub mpa: Mpa,
    pub genres: Vec<Genre>,
    pub likes: BTreeSet<UserId>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilmDraft {
    pub id: Option<FilmId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub release_date: Option<NaiveDate>,
    pub duration: Option<i32>,
    pub mpa: Option<Reference>,
    #[serde(default)]
    pub genres: Vec<Reference>,
}

impl FilmDraft {
    /// Genre ids without duplicates, ascending.
    pub fn genre_ids(&self) -> BTreeSet<i32> {
        self.genres.iter().map(|genre| genre.id).collect()
    }
}

/// Body of every non-entity response and every error: `{time, status, message}`.
#[derive(Serialize, Clone, Debug)]
pub struct ResponseMessage {
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveDateTime,
    #[serde(serialize_with = "serialize_status")]
    pub status: StatusCode,
    pub message: String,
}

impl ResponseMessage {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        ResponseMessage {
            time: Local::now().naive_local(),
            status,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        ResponseMessage::new(message, StatusCode::OK)
    }
}

fn serialize_time<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}
