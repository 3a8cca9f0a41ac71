use crate::error::ErrorKind;
use crate::models::user::{NewUser, User, UserFilter};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
    #[error("Database refused to store the user")]
    NotPersisted,
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::AlreadyExists => ErrorKind::Conflict,
            RepositoryError::Database(_) | RepositoryError::NotPersisted => ErrorKind::Unavailable,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User>;
    async fn count_by_login(&self, login: &str) -> RepositoryResult<i64>;
    async fn find_by_login(&self, login: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn update_user(&self, user: User) -> RepositoryResult<User>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
    async fn list_users(&self, filter: UserFilter) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Maps a write failure, turning the `UNIQUE(login)` violation into a conflict.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::AlreadyExists,
        _ => RepositoryError::Database(e),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (login, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.login)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotPersisted);
        }

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotPersisted)
    }

    async fn count_by_login(&self, login: &str) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE login = ?")
            .bind(login)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_by_login(&self, login: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, email, password_hash, created_at, updated_at
            FROM users
            WHERE login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, user: User) -> RepositoryResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET login = ?, email = ?, password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.login)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(&self, filter: UserFilter) -> RepositoryResult<Vec<User>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = filter.limit.unwrap_or(-1);
        let offset = filter.offset.unwrap_or(0).max(0);

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, login, email, password_hash, created_at, updated_at
            FROM users
            WHERE (?1 IS NULL OR login = ?1)
            ORDER BY id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(filter.login)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
