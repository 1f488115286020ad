use actix_web::{web, HttpResponse};

use crate::errors::FilmorateError;
use crate::logic::catalog;

use super::AppStorage;

pub async fn get_all_mpa(storage: AppStorage) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(catalog::get_all_mpa(&storage).await?))
}

pub async fn get_mpa(storage: AppStorage, id: web::Path<i32>) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(catalog::get_mpa(&storage, id.into_inner()).await?))
}

pub async fn get_genres(storage: AppStorage) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(catalog::get_genres(&storage).await?))
}

pub async fn get_genre(storage: AppStorage, id: web::Path<i32>) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(catalog::get_genre(&storage, id.into_inner()).await?))
}
