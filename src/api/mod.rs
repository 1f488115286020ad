use actix_web::web;

use crate::storage::SharedStorage;

pub mod catalog;
pub mod films;
pub mod users;

pub type AppStorage = web::Data<SharedStorage>;
