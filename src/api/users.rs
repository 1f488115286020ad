use actix_web::{web, HttpResponse};

use crate::errors::FilmorateError;
use crate::logic::models::{UserDraft, UserId};
use crate::logic::users;

use super::AppStorage;

pub async fn get_users(storage: AppStorage) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::get_users(&storage).await?))
}

pub async fn get_user(
    storage: AppStorage,
    id: web::Path<UserId>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::get_user(&storage, id.into_inner()).await?))
}

pub async fn create_user(
    storage: AppStorage,
    draft: web::Json<UserDraft>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::create_user(&storage, draft.into_inner()).await?))
}

pub async fn update_user(
    storage: AppStorage,
    draft: web::Json<UserDraft>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::update_user(&storage, draft.into_inner()).await?))
}

pub async fn delete_user(
    storage: AppStorage,
    id: web::Path<UserId>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::delete_user(&storage, id.into_inner()).await?))
}

// FRIENDS

pub async fn add_friend(
    storage: AppStorage,
    path: web::Path<(UserId, UserId)>,
) -> Result<HttpResponse, FilmorateError> {
    let (id, friend_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(users::add_friend(&storage, id, friend_id).await?))
}

pub async fn remove_friend(
    storage: AppStorage,
    path: web::Path<(UserId, UserId)>,
) -> Result<HttpResponse, FilmorateError> {
    let (id, friend_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(users::remove_friend(&storage, id, friend_id).await?))
}

pub async fn get_friends(
    storage: AppStorage,
    id: web::Path<UserId>,
) -> Result<HttpResponse, FilmorateError> {
    Ok(HttpResponse::Ok().json(users::get_friends(&storage, id.into_inner()).await?))
}

pub async fn get_common_friends(
    storage: AppStorage,
    path: web::Path<(UserId, UserId)>,
) -> Result<HttpResponse, FilmorateError> {
    let (id, other_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(users::get_common_friends(&storage, id, other_id).await?))
}
