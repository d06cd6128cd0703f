use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// The viewer's resolved authentication and entitlement state. One shared
/// instance lives in the session cache; screens read it, never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub credit: u32,
    #[serde(default, rename = "usedCredits")]
    pub used_credits: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn remaining_credits(&self) -> u32 {
        self.credit.saturating_sub(self.used_credits)
    }

    /// Admins are uncapped; everyone else needs at least one unused credit.
    pub fn can_upload(&self) -> bool {
        self.is_admin() || self.remaining_credits() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role, credit: u32, used: u32) -> Session {
        Session {
            id: "u1".to_string(),
            fullname: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role,
            credit,
            used_credits: used,
            image: None,
        }
    }

    #[test]
    fn exhausted_credits_block_upload() {
        assert!(!session(Role::User, 5, 5).can_upload());
        assert!(session(Role::User, 5, 4).can_upload());
    }

    #[test]
    fn admin_uploads_regardless_of_credits() {
        assert!(session(Role::Admin, 0, 0).can_upload());
    }

    #[test]
    fn remaining_credits_saturates() {
        // Backend invariant is used <= credit, but never trust the wire.
        assert_eq!(session(Role::User, 3, 7).remaining_credits(), 0);
    }

    #[test]
    fn deserializes_backend_field_names() {
        let s: Session = serde_json::from_str(
            r#"{"_id":"abc","fullname":"A","email":"a@b.c","role":"admin","credit":10,"usedCredits":2}"#,
        )
        .unwrap();
        assert_eq!(s.id, "abc");
        assert_eq!(s.role, Role::Admin);
        assert_eq!(s.used_credits, 2);
        assert!(s.image.is_none());
    }
}
