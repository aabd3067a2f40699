//! Format legality checks for account fields.
//!
//! Stateless, total predicates: they never fail, they only answer yes or no.
//! Uniqueness checks need the store and therefore live in the account
//! service, not here. "Legal" means the field satisfies its format/length
//! rule, independent of uniqueness.

use once_cell::sync::Lazy;
use regex::Regex;

use super::digest::md5_hex;
use crate::config::{
    EMAIL_MAX_LENGTH, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, WEBSITE_MAX_LENGTH,
};

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{5,15}$").expect("username pattern"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9_-]+\.[A-Za-z0-9._-]+$").expect("email pattern")
});

static WEBSITE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(http|https)://[A-Za-z0-9-]+\.[A-Za-z0-9_.]+$").expect("website pattern")
});

/// Usernames are 6-16 characters, start with a letter, and otherwise contain
/// only letters, digits and underscores.
pub fn is_username_legal(username: &str) -> bool {
    USERNAME_PATTERN.is_match(username)
}

/// Passwords are 6-16 characters with no character-class restriction.
pub fn is_password_legal(password: &str) -> bool {
    let len = password.chars().count();
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len)
}

/// Email addresses are at most 64 characters and loosely RFC-shaped: a local
/// part, an `@`, and a dotted domain.
pub fn is_email_legal(email: &str) -> bool {
    email.chars().count() <= EMAIL_MAX_LENGTH && EMAIL_PATTERN.is_match(email)
}

/// Personal websites may be empty; otherwise at most 64 characters and an
/// http(s) URL with a dotted host.
pub fn is_website_legal(website: &str) -> bool {
    website.is_empty()
        || (website.chars().count() <= WEBSITE_MAX_LENGTH && WEBSITE_PATTERN.is_match(website))
}

/// Verify a submitted old password against the stored digest.
///
/// An empty submitted value counts as correct: callers updating a profile
/// without changing the password submit an empty old password. Preserved
/// platform behavior.
pub fn is_old_password_correct(stored_digest: &str, submitted_plaintext: &str) -> bool {
    if submitted_plaintext.is_empty() {
        return true;
    }
    stored_digest == md5_hex(submitted_plaintext)
}
