use data_model_smap::db::{DbPool, establish_connection_pool};

use crate::errors::{Error, Result};

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Retrieves the value for the env var DATABASE_URL.
pub fn get_database_url() -> Result<String> {
    std::env::var(DATABASE_URL_VAR)
        .map(|v| v.trim().to_string())
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} must be set in .env file or present as an env var", DATABASE_URL_VAR)))
}

/// Uses the env var DATABASE_URL to establish a database connection pool using diesel.
pub async fn get_db_pool() -> Result<DbPool> {
    let database_url = get_database_url()?;
    establish_connection_pool(&database_url)
        .await
        .map_err(|e| Error::Config(format!("Couldn't connect to the database: {}", e)))
}
