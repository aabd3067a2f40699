//! User domain entities and related types.

use serde::{Deserialize, Serialize};

use crate::config::GROUP_JUDGERS;

/// Named role category for users.
///
/// Reference data: looked up by slug, never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: i64,
    /// Short, unique, URL-safe identifier (e.g. "users", "judgers")
    pub slug: String,
    pub name: String,
}

impl UserGroup {
    /// Accounts in the judgers group are reserved for automated grading
    /// workers and may not log in interactively.
    pub fn is_judgers(&self) -> bool {
        self.slug == GROUP_JUDGERS
    }
}

/// Programming-language preference reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on creation
    pub id: i64,
    /// Immutable after creation
    pub username: String,
    /// Always an MD5 hex digest, never plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub user_group: UserGroup,
    pub prefer_language: Language,
}

/// Per-user key/value metadata entry.
///
/// `meta_key` is unique per user. Entries are created lazily on the first
/// non-empty write; an existing entry may be overwritten with an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMeta {
    pub id: i64,
    pub user_id: i64,
    pub meta_key: String,
    pub meta_value: String,
}

/// Fields for inserting a new user row; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// MD5 hex digest of the chosen password
    pub password: String,
    pub email: String,
    pub user_group_id: i64,
    pub prefer_language_id: i64,
}

/// Fields for inserting a new metadata entry.
#[derive(Debug, Clone)]
pub struct NewUserMeta {
    pub user_id: i64,
    pub meta_key: String,
    pub meta_value: String,
}

/// Registration data transfer object
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    /// Plaintext; digested before it reaches the store
    pub password: String,
    pub email: String,
    /// Slug of the preferred language reference
    pub language_slug: String,
}

/// Profile update data transfer object.
///
/// Free-text fields are sanitized before validation; empty strings mean
/// "clear this attribute".
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub location: String,
    pub website: String,
    /// Serialized JSON describing social network links
    pub social_links: String,
    pub about_me: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(slug: &str) -> UserGroup {
        UserGroup {
            id: 1,
            slug: slug.to_string(),
            name: slug.to_string(),
        }
    }

    #[test]
    fn judgers_group_is_detected_by_slug() {
        assert!(group("judgers").is_judgers());
        assert!(!group("users").is_judgers());
        assert!(!group("administrators").is_judgers());
    }

    #[test]
    fn user_serialization_omits_password_digest() {
        let user = User {
            id: 7,
            username: "zosephine".to_string(),
            password: "0123456789abcdef0123456789abcdef".to_string(),
            email: "zosephine@example.com".to_string(),
            user_group: group("users"),
            prefer_language: Language {
                id: 2,
                slug: "cpp".to_string(),
                name: "C++".to_string(),
            },
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("0123456789abcdef"));
    }
}
