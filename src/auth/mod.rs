pub mod handlers;
pub mod middleware;

pub use handlers::{auth_handler, AuthInput, AuthResult};
pub use middleware::require_bearer;
