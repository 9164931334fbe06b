use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};
use tracing::error;

use crate::errors::{AppError, AppResult};

/// Layout of `users.created_at`.
pub const DB_LAYOUT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn now_db_format() -> AppResult<String> {
    format_db(OffsetDateTime::now_utc())
}

pub fn format_db(at: OffsetDateTime) -> AppResult<String> {
    at.format(DB_LAYOUT).map_err(|e| {
        error!(error = %e, "format timestamp");
        AppError::Internal("error processing request".into())
    })
}
