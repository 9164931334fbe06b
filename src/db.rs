use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::error;

use crate::config::DbConfig;
use crate::errors::AppError;

/// SQLSTATE raised by Postgres on a unique index violation.
const UNIQUE_VIOLATION: &str = "23505";

pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.url)
        .await
        .context("connect to database")
}

/// Normalizes a raw store error into the service taxonomy.
///
/// This is the only place driver error codes are looked at. Whatever the
/// store said is logged here and never forwarded to the caller.
pub fn translate(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::RowNotFound => {
            AppError::NotFound("no record matching given id".into())
        }
        sqlx::Error::Database(db_err) => {
            classify(db_err.code().as_deref(), db_err.constraint()).unwrap_or_else(|| {
                error!(error = %db_err, "database error");
                internal()
            })
        }
        other => {
            error!(error = %other, "database error");
            internal()
        }
    }
}

fn classify(code: Option<&str>, constraint: Option<&str>) -> Option<AppError> {
    if code != Some(UNIQUE_VIOLATION) {
        return None;
    }
    let message = match constraint {
        Some(name) if name.contains("email") => "email already exists",
        _ => "duplicated key",
    };
    Some(AppError::InvalidArgument(message.into()))
}

fn internal() -> AppError {
    AppError::Internal("error processing request".into())
}
