use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table.
///
/// `password_hash` never leaves the process: it is skipped on serialization,
/// so handlers can return a `User` directly.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "created")]
    pub created_at: i64,
    #[serde(rename = "updated")]
    pub updated_at: i64,
}

/// Values for a user row that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: i64,
}

/// Optional filters for listing users. All `None` lists everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub login: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_has_no_password() {
        let user = User {
            id: 7,
            login: "alice".to_string(),
            email: None,
            password_hash: "$argon2id$secret".to_string(),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["login"], "alice");
        assert_eq!(json["created"], 1_700_000_000);
        assert_eq!(json["updated"], 1_700_000_000);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("argon2"));
    }
}
