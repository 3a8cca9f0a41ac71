pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::ConfigError;
use repositories::{SqliteUserRepository, UserRepository};
use services::{CredentialHasher, TokenService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
    pub version: Arc<str>,
}

impl AppState {
    /// Wires repositories and services over an already migrated pool.
    pub fn new(pool: sqlx::SqlitePool, config: &config::AppConfig) -> Result<Self, ConfigError> {
        let hasher = CredentialHasher::new(&config.password)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let user_repository: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool));

        let user_service = Arc::new(UserService::new(user_repository.clone(), hasher.clone()));
        let token_service = Arc::new(TokenService::new(user_repository, hasher, &config.auth)?);

        Ok(Self {
            user_service,
            token_service,
            version: Arc::from(config.version.as_str()),
        })
    }
}
