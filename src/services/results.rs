//! Per-use-case validation results.
//!
//! Each mutation computes every relevant check by name before touching the
//! store, then derives `is_successful` as the AND of the required checks.
//! The named fields are a stable public contract: a missing check is a
//! compile error, and serialization uses the camelCase names the request
//! layer has always exposed.

use serde::Serialize;

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationCheck {
    pub is_username_empty: bool,
    pub is_username_legal: bool,
    pub is_username_exists: bool,
    pub is_password_empty: bool,
    pub is_password_legal: bool,
    pub is_email_empty: bool,
    pub is_email_legal: bool,
    pub is_email_exists: bool,
    /// The preferred-language slug resolved to a known language
    pub is_language_legal: bool,
    pub is_csrf_token_valid: bool,
    pub is_allow_register: bool,
    pub is_successful: bool,
}

impl RegistrationCheck {
    /// Derive `is_successful` from the individual checks.
    pub fn finalize(mut self) -> Self {
        self.is_successful = !self.is_username_empty
            && self.is_username_legal
            && !self.is_username_exists
            && !self.is_password_empty
            && self.is_password_legal
            && !self.is_email_empty
            && self.is_email_legal
            && !self.is_email_exists
            && self.is_language_legal
            && self.is_csrf_token_valid
            && self.is_allow_register;
        self
    }
}

/// Outcome of a credential check at login.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCheck {
    pub is_username_empty: bool,
    pub is_password_empty: bool,
    /// User exists, the digests match, and the account is not a grading worker
    pub is_account_valid: bool,
    pub is_successful: bool,
}

/// Outcome of a password change attempt.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeCheck {
    pub is_old_password_correct: bool,
    pub is_new_password_empty: bool,
    pub is_new_password_legal: bool,
    pub is_confirm_password_matched: bool,
    pub is_successful: bool,
}

impl PasswordChangeCheck {
    /// Derive `is_successful` from the individual checks.
    pub fn finalize(mut self) -> Self {
        self.is_successful = self.is_old_password_correct
            && !self.is_new_password_empty
            && self.is_new_password_legal
            && self.is_confirm_password_matched;
        self
    }
}

/// Outcome of a profile update attempt.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateCheck {
    pub is_email_empty: bool,
    pub is_email_legal: bool,
    /// Another user already holds the new email (unchanged email never counts)
    pub is_email_exists: bool,
    pub is_location_legal: bool,
    pub is_website_legal: bool,
    pub is_about_me_legal: bool,
    pub is_successful: bool,
}

impl ProfileUpdateCheck {
    /// Derive `is_successful` from the individual checks.
    pub fn finalize(mut self) -> Self {
        self.is_successful = !self.is_email_empty
            && self.is_email_legal
            && !self.is_email_exists
            && self.is_location_legal
            && self.is_website_legal
            && self.is_about_me_legal;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_registration() -> RegistrationCheck {
        RegistrationCheck {
            is_username_legal: true,
            is_password_legal: true,
            is_email_legal: true,
            is_language_legal: true,
            is_csrf_token_valid: true,
            is_allow_register: true,
            ..Default::default()
        }
    }

    #[test]
    fn registration_succeeds_only_when_all_checks_pass() {
        assert!(passing_registration().finalize().is_successful);

        let mut taken = passing_registration();
        taken.is_username_exists = true;
        assert!(!taken.finalize().is_successful);

        let mut no_csrf = passing_registration();
        no_csrf.is_csrf_token_valid = false;
        assert!(!no_csrf.finalize().is_successful);

        let mut closed = passing_registration();
        closed.is_allow_register = false;
        assert!(!closed.finalize().is_successful);
    }

    #[test]
    fn password_change_requires_matching_confirmation() {
        let check = PasswordChangeCheck {
            is_old_password_correct: true,
            is_new_password_legal: true,
            is_confirm_password_matched: false,
            ..Default::default()
        };
        assert!(!check.finalize().is_successful);
    }

    #[test]
    fn profile_update_fails_on_taken_email() {
        let check = ProfileUpdateCheck {
            is_email_legal: true,
            is_email_exists: true,
            is_location_legal: true,
            is_website_legal: true,
            is_about_me_legal: true,
            ..Default::default()
        };
        assert!(!check.finalize().is_successful);
    }

    #[test]
    fn checks_serialize_with_camel_case_names() {
        let json = serde_json::to_string(&passing_registration().finalize()).unwrap();
        assert!(json.contains("\"isUsernameLegal\":true"));
        assert!(json.contains("\"isSuccessful\":true"));

        let json = serde_json::to_string(&LoginCheck::default()).unwrap();
        assert!(json.contains("\"isAccountValid\":false"));
    }
}
