use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::FilmorateError;
use crate::logic::films;
use crate::logic::models::{FilmDraft, FilmId, UserId};

use super::AppStorage;

#[derive(Deserialize, Debug)]
pub struct PopularQuery {
    count: Option<i64>,
}

pub async fn get_films(storage: AppStorage) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::get_films(&storage).await?))
}

pub async fn get_film(
    storage: AppStorage,
    id: web::Path<FilmId>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::get_film(&storage, id.into_inner()).await?))
}

pub async fn create_film(
    storage: AppStorage,
    draft: web::Json<FilmDraft>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::create_film(&storage, draft.into_inner()).await?))
}

pub async fn update_film(
    storage: AppStorage,
    draft: web::Json<FilmDraft>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::update_film(&storage, draft.into_inner()).await?))
}

pub async fn delete_film(
    storage: AppStorage,
    id: web::Path<FilmId>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::delete_film(&storage, id.into_inner()).await?))
}

// LIKES

pub async fn add_like(
    storage: AppStorage,
    path: web::Path<(FilmId, UserId)>,
) -> Result<HttpResponse, FilmorateError> {
    let (film_id, user_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(films::add_like(&storage, film_id, user_id).await?))
}

pub async fn remove_like(
    storage: AppStorage,
    path: web::Path<(FilmId, UserId)>,
) -> Result<HttpResponse, FilmorateError> {
    let (film_id, user_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(films::remove_like(&storage, film_id, user_id).await?))
}

pub async fn get_popular(
    storage: AppStorage,
    query: web::Query<PopularQuery>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(films::get_popular(&storage, query.count).await?))
}
