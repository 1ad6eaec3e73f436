use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub is_confirmed: bool,
    pub is_disabled: bool,
    pub is_admin: bool,
    pub is_system: bool,
    /// Set when the account is in the trash bin.
    #[serde(default)]
    pub erasure_date: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.erasure_date.is_some()
    }
}

/// Body of an account creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    pub name: String,
    pub is_admin: bool,
    pub is_confirmed: bool,
    pub is_disabled: bool,
}

/// Partial account update; unset fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_confirmed: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.display_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.is_disabled.is_none()
            && self.is_confirmed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let json = r#"{"id": "1001", "name": "alice", "display_name": "Alice", "email": "alice@example.com",
            "is_confirmed": true, "is_disabled": false, "is_admin": false, "is_system": false,
            "erasure_date": "2026-01-02T03:04:05Z"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.name, "alice");
        assert!(user.is_deleted());

        let json = r#"{"id": "1", "name": "root", "display_name": "Root", "email": "root@example.com",
            "is_confirmed": true, "is_disabled": false, "is_admin": true, "is_system": true}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.is_deleted());
    }

    #[test]
    fn test_user_update_sends_only_set_fields() {
        let update = UserUpdate {
            is_disabled: Some(true),
            ..UserUpdate::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"is_disabled":true}"#);
        assert!(UserUpdate::default().is_empty());
    }
}
