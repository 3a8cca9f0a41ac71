pub mod user_handlers;
pub mod version_handlers;

pub use user_handlers::{
    create_user_handler, delete_user_handler, get_user_handler, list_users_handler,
    update_user_handler, UserInput,
};
pub use version_handlers::{version_handler, VersionResult};
