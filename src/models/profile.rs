//! User profile model and roles.

use serde::{Deserialize, Serialize};

/// Role assigned to a profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Publisher,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Publisher => "publisher",
            Role::User => "user",
        }
    }
}

/// A registered user's profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Per-publisher permission bit; treated as true when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

impl Profile {
    /// Whether this profile may create or update listings.
    ///
    /// Admins always may; publishers may unless their editable flag has
    /// been explicitly revoked; plain users never may.
    pub fn can_edit(&self) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Publisher => self.editable.unwrap_or(true),
            Role::User => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role, editable: Option<bool>) -> Profile {
        Profile {
            id: "u1".to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            role,
            editable,
        }
    }

    #[test]
    fn test_admin_can_edit_regardless_of_flag() {
        assert!(profile(Role::Admin, None).can_edit());
        assert!(profile(Role::Admin, Some(false)).can_edit());
    }

    #[test]
    fn test_publisher_follows_editable_flag() {
        assert!(profile(Role::Publisher, None).can_edit());
        assert!(profile(Role::Publisher, Some(true)).can_edit());
        assert!(!profile(Role::Publisher, Some(false)).can_edit());
    }

    #[test]
    fn test_plain_user_cannot_edit() {
        assert!(!profile(Role::User, None).can_edit());
        assert!(!profile(Role::User, Some(true)).can_edit());
    }

    #[test]
    fn test_role_serde_lowercase() {
        let p = profile(Role::Publisher, None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["role"], "publisher");
        assert!(json.get("editable").is_none());
    }
}
