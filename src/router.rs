use actix_web::{error, web, HttpRequest, HttpResponse};
use log::*;

use crate::api::{catalog, films, users};
use crate::errors::FilmorateError;
use crate::logic::models::ResponseMessage;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::PathConfig::default().error_handler(|err, req| bad_request(err, req)))
        .app_data(web::QueryConfig::default().error_handler(|err, req| bad_request(err, req)));

    cfg.service(
        web::resource("/users")
            .route(web::get().to(users::get_users))
            .route(web::post().to(users::create_user))
            .route(web::put().to(users::update_user)),
    )
    .service(
        web::resource("/users/{id}")
            .route(web::get().to(users::get_user))
            .route(web::delete().to(users::delete_user)),
    )
    .service(
        web::resource("/users/{id}/friends/{friend_id}")
            .route(web::put().to(users::add_friend))
            .route(web::delete().to(users::remove_friend)),
    )
    .route("/users/{id}/friends", web::get().to(users::get_friends))
    .route(
        "/users/{id}/friends/common/{other_id}",
        web::get().to(users::get_common_friends),
    );

    cfg.service(
        web::resource("/films")
            .route(web::get().to(films::get_films))
            .route(web::post().to(films::create_film))
            .route(web::put().to(films::update_film)),
    )
    .route("/films/popular", web::get().to(films::get_popular))
    .service(
        web::resource("/films/{id}")
            .route(web::get().to(films::get_film))
            .route(web::delete().to(films::delete_film)),
    )
    .service(
        web::resource("/films/{id}/like/{user_id}")
            .route(web::put().to(films::add_like))
            .route(web::delete().to(films::remove_like)),
    );

    cfg.route("/mpa", web::get().to(catalog::get_all_mpa))
        .route("/mpa/{id}", web::get().to(catalog::get_mpa))
        .route("/genres", web::get().to(catalog::get_genres))
        .route("/genres/{id}", web::get().to(catalog::get_genre));
}

fn bad_request<E: std::fmt::Display>(err: E, req: &HttpRequest) -> error::Error {
    debug!("Malformed request {} {}: {}", req.method(), req.path(), err);
    FilmorateError::validation(err.to_string()).into()
}

pub async fn not_found(req: HttpRequest) -> HttpResponse {
    let message = format!("No handler for {} {}", req.method(), req.path());
    warn!("{}", message);
    HttpResponse::NotFound().json(ResponseMessage::new(
        message,
        actix_web::http::StatusCode::NOT_FOUND,
    ))
}
