pub mod auth;
pub mod catalog;
pub mod reviews;
pub mod titles;
pub mod users;
