use crate::error::ErrorKind;
use crate::models::user::{NewUser, User, UserFilter};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::password::{CredentialHasher, HashError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("login not recognized")]
    EmptyLogin,
    #[error("password not recognized")]
    EmptyPassword,
    #[error("User not found")]
    UserNotFound,
    #[error("User with such login already exists")]
    LoginTaken,
    #[error(transparent)]
    Hashing(#[from] HashError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl UserServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserServiceError::EmptyLogin | UserServiceError::EmptyPassword => ErrorKind::Invalid,
            UserServiceError::UserNotFound => ErrorKind::NotFound,
            UserServiceError::LoginTaken => ErrorKind::Conflict,
            UserServiceError::Hashing(_) => ErrorKind::Unavailable,
            UserServiceError::Repository(e) => e.kind(),
        }
    }
}

pub struct CreateUserRequest {
    pub login: String,
    pub password: String,
    pub email: Option<String>,
}

/// Empty or missing fields keep the stored value.
pub struct UpdateUserRequest {
    pub user_id: i64,
    pub login: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// User lifecycle rules on top of the repository: validation, hashing,
/// conflict and not-found semantics.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
}

fn now_utc() -> i64 {
    chrono::Utc::now().timestamp()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: CredentialHasher) -> Self {
        Self { repository, hasher }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserServiceError> {
        if request.login.is_empty() {
            return Err(UserServiceError::EmptyLogin);
        }
        if request.password.is_empty() {
            return Err(UserServiceError::EmptyPassword);
        }

        // Fast path; the UNIQUE constraint still catches concurrent inserts
        if self.repository.count_by_login(&request.login).await? != 0 {
            return Err(UserServiceError::LoginTaken);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let new_user = NewUser {
            login: request.login,
            email: non_empty(request.email),
            password_hash,
            created_at: now_utc(),
        };

        match self.repository.create_user(new_user).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, login = %user.login, "user created");
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::LoginTaken),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    pub async fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(filter).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<User>, UserServiceError> {
        self.list_users(UserFilter::default()).await
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)
    }

    pub async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_login(login).await?)
    }

    pub async fn update_user(&self, request: UpdateUserRequest) -> Result<User, UserServiceError> {
        let existing = self.find_user_by_id(request.user_id).await?;

        let password_hash = match non_empty(request.password) {
            Some(password) => self.hasher.hash(&password)?,
            None => existing.password_hash,
        };

        let merged = User {
            id: existing.id,
            login: non_empty(request.login).unwrap_or(existing.login),
            email: non_empty(request.email).or(existing.email),
            password_hash,
            created_at: existing.created_at,
            updated_at: now_utc(),
        };

        match self.repository.update_user(merged).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user updated");
                Ok(user)
            }
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::LoginTaken),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => {
                tracing::info!(user_id = id, "user deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::Repository(e)),
        }
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        self.hasher.verify(password, password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use crate::test_utils::test_helpers::fast_hasher;
    use mockall::predicate::*;

    fn stored_user() -> User {
        User {
            id: 1,
            login: "alice".to_string(),
            email: None,
            password_hash: "old-digest".to_string(),
            created_at: 100,
            updated_at: 100,
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_count_by_login()
            .with(eq("alice"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(0) }));

        mock_repo
            .expect_create_user()
            .times(1)
            .returning(|new_user| {
                Box::pin(async move {
                    Ok(User {
                        id: 1,
                        login: new_user.login,
                        email: new_user.email,
                        password_hash: new_user.password_hash,
                        created_at: new_user.created_at,
                        updated_at: new_user.created_at,
                    })
                })
            });

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = CreateUserRequest {
            login: "alice".to_string(),
            password: "secret1".to_string(),
            email: None,
        };

        let user = service.create_user(request).await.expect("Expected Ok result");
        assert_eq!(user.login, "alice");
        assert_ne!(user.password_hash, "secret1");
        assert!(service.verify_password("secret1", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_empty_login() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = CreateUserRequest {
            login: String::new(),
            password: "secret1".to_string(),
            email: None,
        };

        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::EmptyLogin)));
    }

    #[tokio::test]
    async fn test_create_user_empty_password() {
        let mock_repo = MockUserRepository::new();
        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = CreateUserRequest {
            login: "alice".to_string(),
            password: String::new(),
            email: None,
        };

        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::EmptyPassword)));
    }

    #[tokio::test]
    async fn test_create_user_precheck_conflict() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_count_by_login()
            .with(eq("alice"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(1) }));
        mock_repo.expect_create_user().never();

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = CreateUserRequest {
            login: "alice".to_string(),
            password: "secret1".to_string(),
            email: None,
        };

        let result = service.create_user(request).await;
        assert!(matches!(result, Err(UserServiceError::LoginTaken)));
    }

    #[tokio::test]
    async fn test_create_user_not_persisted_is_unavailable() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_count_by_login()
            .returning(|_| Box::pin(async move { Ok(0) }));
        mock_repo
            .expect_create_user()
            .returning(|_| Box::pin(async move { Err(RepositoryError::NotPersisted) }));

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = CreateUserRequest {
            login: "alice".to_string(),
            password: "secret1".to_string(),
            email: None,
        };

        let err = service.create_user(request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_update_keeps_digest_when_password_omitted() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Box::pin(async move { Ok(Some(stored_user())) }));
        mock_repo
            .expect_update_user()
            .times(1)
            .returning(|user| Box::pin(async move { Ok(user) }));

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = UpdateUserRequest {
            user_id: 1,
            login: Some("alice2".to_string()),
            password: Some(String::new()),
            email: None,
        };

        let user = service.update_user(request).await.unwrap();
        assert_eq!(user.login, "alice2");
        assert_eq!(user.password_hash, "old-digest");
        assert_eq!(user.created_at, 100);
        assert!(user.updated_at >= user.created_at);
    }

    #[tokio::test]
    async fn test_update_rehashes_full_digest() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Box::pin(async move { Ok(Some(stored_user())) }));
        mock_repo
            .expect_update_user()
            .times(1)
            .returning(|user| Box::pin(async move { Ok(user) }));

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = UpdateUserRequest {
            user_id: 1,
            login: None,
            password: Some("new-secret".to_string()),
            email: None,
        };

        let user = service.update_user(request).await.unwrap();
        assert_eq!(user.login, "alice");
        assert!(service.verify_password("new-secret", &user.password_hash));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(99))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo.expect_update_user().never();

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let request = UpdateUserRequest {
            user_id: 99,
            login: Some("nobody".to_string()),
            password: None,
            email: None,
        };

        let result = service.update_user(request).await;
        assert!(matches!(result, Err(UserServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_delete_user()
            .with(eq(99))
            .times(1)
            .returning(|_| Box::pin(async move { Err(RepositoryError::NotFound) }));

        let service = UserService::new(Arc::new(mock_repo), fast_hasher());

        let result = service.delete_user(99).await;
        assert!(matches!(result, Err(UserServiceError::UserNotFound)));
    }
}
