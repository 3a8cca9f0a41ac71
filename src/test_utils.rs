pub mod test_helpers {
    use crate::config::{AppConfig, AuthConfig, HashingConfig};
    use crate::services::CredentialHasher;
    use crate::AppState;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    pub const TEST_SECRET: &str = "test-signing-secret";

    /// Cheap Argon2 parameters so tests do not spend seconds hashing
    pub fn fast_hashing_config() -> HashingConfig {
        HashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    pub fn fast_hasher() -> CredentialHasher {
        match CredentialHasher::new(&fast_hashing_config()) {
            Ok(hasher) => hasher,
            Err(e) => panic!("Failed to build test hasher: {}", e),
        }
    }

    pub fn test_auth_config() -> AuthConfig {
        AuthConfig {
            secret: TEST_SECRET.to_string(),
            issuer: "userdemo-test".to_string(),
            token_ttl_hours: 72,
        }
    }

    pub fn test_config() -> AppConfig {
        AppConfig {
            version: "0.0.0-test".to_string(),
            server: Default::default(),
            database: Default::default(),
            auth: test_auth_config(),
            password: fast_hashing_config(),
            logging: Default::default(),
            bootstrap: None,
        }
    }

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must see the same data
    pub async fn create_test_db_file(
        max_connections: u32,
    ) -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Application state over `pool` with fast hashing and the test secret
    pub fn create_test_state(pool: SqlitePool) -> AppState {
        match AppState::new(pool, &test_config()) {
            Ok(state) => state,
            Err(e) => panic!("Failed to build test state: {}", e),
        }
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        login: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let password_hash = fast_hasher().hash(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT INTO users (login, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(login)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
