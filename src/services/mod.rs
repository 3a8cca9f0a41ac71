pub mod password;
pub mod token_service;
pub mod user_service;

pub use password::{CredentialHasher, HashError};
pub use token_service::{Claims, TokenService, TokenServiceError};
pub use user_service::{UserService, UserServiceError};
