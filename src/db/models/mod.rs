pub mod catalog;
pub mod film;
pub mod friends;
pub mod user;
