use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db: DbConfig,
    pub jwt: JwtConfig,
    /// Fixed argon2 salt; keeps credential hashes comparable by equality.
    pub password_salt: String,
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url(
                &std::env::var("USERS_DB_USERNAME").context("USERS_DB_USERNAME")?,
                &std::env::var("USERS_DB_PASSWORD").context("USERS_DB_PASSWORD")?,
                &std::env::var("USERS_DB_HOST").context("USERS_DB_HOST")?,
                &std::env::var("USERS_DB_SCHEMA").context("USERS_DB_SCHEMA")?,
            ),
        };
        let db = DbConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "users-api".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "users-api-clients".into()),
        };
        Ok(Self {
            db,
            jwt,
            password_salt: std::env::var("PASSWORD_SALT").context("PASSWORD_SALT")?,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 8080),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30),
        })
    }
}

/// Postgres URL assembled from discrete host/schema/credential variables.
pub fn database_url(username: &str, password: &str, host: &str, schema: &str) -> String {
    format!("postgres://{username}:{password}@{host}/{schema}")
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
