pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod errors;
pub mod state;
pub mod users;

pub use errors::{AppError, AppResult};
