//! Account service - registration, credential checks, password changes and
//! profile updates.
//!
//! Every mutation computes its full check struct first and writes only when
//! `is_successful` is true. Multi-row writes (user + metadata) run inside a
//! single store transaction.

use async_trait::async_trait;
use chrono::{Local, NaiveTime};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{
    ABOUT_ME_MAX_LENGTH, GROUP_USERS, LOCATION_MAX_LENGTH, META_ABOUT_ME, META_LOCATION,
    META_REGISTER_TIME, META_SOCIAL_LINKS, META_WEBSITE, REGISTER_TIME_FORMAT,
};
use crate::domain::digest::md5_hex;
use crate::domain::{validation, NewUser, NewUserMeta, ProfileUpdate, Registration, User, UserGroup};
use crate::errors::{AppError, AppResult};
use crate::infra::account_store::{AccountStore, TxContext};
use crate::infra::UserMetaRepository;
use crate::utils::html;
use crate::utils::SensitiveWordFilter;

use super::results::{LoginCheck, PasswordChangeCheck, ProfileUpdateCheck, RegistrationCheck};

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Get user by unique id
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Get user by username or email address, decided by the presence of `@`
    async fn get_user_by_username_or_email(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Get a user's metadata as a key-value map; the socialLinks value is
    /// parsed back into structured JSON
    async fn get_user_meta(&self, user_id: i64) -> AppResult<HashMap<String, Value>>;

    /// Resolve a user group by its slug
    async fn get_user_group_by_slug(&self, slug: &str) -> AppResult<Option<UserGroup>>;

    /// Check credentials for an interactive login.
    ///
    /// `password_digest` is the digest submitted by the client, compared
    /// verbatim against the stored one.
    async fn verify_account(&self, identifier: &str, password_digest: &str)
        -> AppResult<LoginCheck>;

    /// Validate and create a new account.
    ///
    /// On success the user row and its RegisterTime metadata are written in
    /// one transaction.
    async fn create_user(
        &self,
        registration: Registration,
        is_csrf_token_valid: bool,
        is_allow_register: bool,
    ) -> AppResult<RegistrationCheck>;

    /// Validate the old password and replace it with the digest of the new one
    async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<PasswordChangeCheck>;

    /// Sanitize, validate and apply a profile update.
    ///
    /// On success the email update and the four metadata upserts are written
    /// in one transaction.
    async fn update_profile(
        &self,
        user: &User,
        profile: ProfileUpdate,
    ) -> AppResult<ProfileUpdateCheck>;

    /// [admin] List users in a group, paged by offset id
    async fn list_users_by_group(
        &self,
        group: &UserGroup,
        offset_id: i64,
        limit: u64,
    ) -> AppResult<Vec<User>>;

    /// [admin] Total number of users in a group
    async fn count_users_in_group(&self, group: &UserGroup) -> AppResult<u64>;

    /// [admin] Number of users registered during the current calendar day,
    /// in server-local time
    async fn count_registered_today(&self) -> AppResult<u64>;
}

/// Concrete implementation of AccountService over an account store.
pub struct AccountManager<S: AccountStore> {
    store: Arc<S>,
    word_filter: Arc<dyn SensitiveWordFilter>,
}

impl<S: AccountStore> AccountManager<S> {
    pub fn new(store: Arc<S>, word_filter: Arc<dyn SensitiveWordFilter>) -> Self {
        Self { store, word_filter }
    }

    /// Email existence check for profile edits: keeping one's own address is
    /// never a collision, so an unchanged email short-circuits to false.
    async fn is_email_taken_by_other(
        &self,
        current_email: &str,
        new_email: &str,
    ) -> AppResult<bool> {
        if current_email == new_email {
            return Ok(false);
        }
        Ok(self.store.users().find_by_email(new_email).await?.is_some())
    }
}

/// Metadata upsert: entries are created lazily on the first non-empty write;
/// an existing entry is overwritten unconditionally, including with an empty
/// value.
async fn upsert_meta(
    metas: &dyn UserMetaRepository,
    user_id: i64,
    meta_key: &str,
    meta_value: String,
) -> AppResult<()> {
    match metas.find_by_key(user_id, meta_key).await? {
        None if meta_value.is_empty() => Ok(()),
        None => {
            metas
                .create(NewUserMeta {
                    user_id,
                    meta_key: meta_key.to_string(),
                    meta_value,
                })
                .await?;
            Ok(())
        }
        Some(mut meta) => {
            meta.meta_value = meta_value;
            metas.update(&meta).await
        }
    }
}

#[async_trait]
impl<S: AccountStore> AccountService for AccountManager<S> {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        self.store.users().find_by_id(user_id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> AppResult<Option<User>> {
        if identifier.contains('@') {
            self.store.users().find_by_email(identifier).await
        } else {
            self.store.users().find_by_username(identifier).await
        }
    }

    async fn get_user_meta(&self, user_id: i64) -> AppResult<HashMap<String, Value>> {
        let entries = self.store.user_metas().list_for_user(user_id).await?;

        let mut meta_map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let value = if entry.meta_key == META_SOCIAL_LINKS {
                // Malformed stored JSON falls back to the raw string rather
                // than failing the whole read.
                serde_json::from_str(&entry.meta_value)
                    .unwrap_or_else(|_| Value::String(entry.meta_value))
            } else {
                Value::String(entry.meta_value)
            };
            meta_map.insert(entry.meta_key, value);
        }
        Ok(meta_map)
    }

    async fn get_user_group_by_slug(&self, slug: &str) -> AppResult<Option<UserGroup>> {
        self.store.user_groups().find_by_slug(slug).await
    }

    async fn verify_account(
        &self,
        identifier: &str,
        password_digest: &str,
    ) -> AppResult<LoginCheck> {
        let mut check = LoginCheck {
            is_username_empty: identifier.is_empty(),
            is_password_empty: password_digest.is_empty(),
            ..Default::default()
        };

        if !check.is_username_empty && !check.is_password_empty {
            if let Some(user) = self.get_user_by_username_or_email(identifier).await? {
                if user.password == password_digest && !user.user_group.is_judgers() {
                    check.is_account_valid = true;
                }
            }
        }

        check.is_successful = check.is_account_valid;
        Ok(check)
    }

    async fn create_user(
        &self,
        registration: Registration,
        is_csrf_token_valid: bool,
        is_allow_register: bool,
    ) -> AppResult<RegistrationCheck> {
        let Registration {
            username,
            password,
            email,
            language_slug,
        } = registration;

        let language = self.store.languages().find_by_slug(&language_slug).await?;

        let check = RegistrationCheck {
            is_username_empty: username.is_empty(),
            is_username_legal: validation::is_username_legal(&username),
            is_username_exists: self
                .store
                .users()
                .find_by_username(&username)
                .await?
                .is_some(),
            is_password_empty: password.is_empty(),
            is_password_legal: validation::is_password_legal(&password),
            is_email_empty: email.is_empty(),
            is_email_legal: validation::is_email_legal(&email),
            is_email_exists: self.store.users().find_by_email(&email).await?.is_some(),
            is_language_legal: language.is_some(),
            is_csrf_token_valid,
            is_allow_register,
            ..Default::default()
        }
        .finalize();

        if !check.is_successful {
            debug!(username = %username, "registration rejected by validation");
            return Ok(check);
        }

        let language = match language {
            Some(language) => language,
            // Unreachable: is_language_legal guards the successful path.
            None => return Ok(check),
        };
        let group = self
            .store
            .user_groups()
            .find_by_slug(GROUP_USERS)
            .await?
            .ok_or_else(|| AppError::internal("default user group 'users' is not provisioned"))?;

        let new_user = NewUser {
            username: username.clone(),
            password: md5_hex(&password),
            email,
            user_group_id: group.id,
            prefer_language_id: language.id,
        };
        let register_time = Local::now().format(REGISTER_TIME_FORMAT).to_string();

        // A concurrent registration that wins the username/email race is
        // rejected here by the store's unique constraints as a Conflict.
        self.store
            .transaction(move |ctx: TxContext<'_>| {
                Box::pin(async move {
                    let user = ctx.users.create(new_user).await?;
                    ctx.user_metas
                        .create(NewUserMeta {
                            user_id: user.id,
                            meta_key: META_REGISTER_TIME.to_string(),
                            meta_value: register_time,
                        })
                        .await?;
                    Ok(())
                })
            })
            .await?;

        info!(username = %username, "account created");
        Ok(check)
    }

    async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<PasswordChangeCheck> {
        let check = PasswordChangeCheck {
            is_old_password_correct: validation::is_old_password_correct(
                &user.password,
                old_password,
            ),
            is_new_password_empty: new_password.is_empty(),
            is_new_password_legal: validation::is_password_legal(new_password),
            is_confirm_password_matched: new_password == confirm_password,
            ..Default::default()
        }
        .finalize();

        if check.is_successful {
            let mut updated = user.clone();
            updated.password = md5_hex(new_password);
            self.store.users().update(&updated).await?;
            info!(username = %user.username, "password changed");
        }
        Ok(check)
    }

    async fn update_profile(
        &self,
        user: &User,
        profile: ProfileUpdate,
    ) -> AppResult<ProfileUpdateCheck> {
        // Sanitization happens unconditionally, before validation, so the
        // length checks apply to what would actually be stored.
        let location = html::strip_markup(&profile.location);
        let website = html::strip_markup(&profile.website);
        let social_links = html::strip_markup(&profile.social_links);
        let about_me = self.word_filter.filter(&html::strip_markup(&profile.about_me));
        let email = profile.email;

        let check = ProfileUpdateCheck {
            is_email_empty: email.is_empty(),
            is_email_legal: validation::is_email_legal(&email),
            is_email_exists: self.is_email_taken_by_other(&user.email, &email).await?,
            is_location_legal: location.chars().count() <= LOCATION_MAX_LENGTH,
            is_website_legal: validation::is_website_legal(&website),
            is_about_me_legal: about_me.chars().count() <= ABOUT_ME_MAX_LENGTH,
            ..Default::default()
        }
        .finalize();

        if !check.is_successful {
            debug!(user_id = user.id, "profile update rejected by validation");
            return Ok(check);
        }

        let mut updated = user.clone();
        updated.email = email;
        let user_id = user.id;

        self.store
            .transaction(move |ctx: TxContext<'_>| {
                Box::pin(async move {
                    ctx.users.update(&updated).await?;
                    upsert_meta(ctx.user_metas, user_id, META_LOCATION, location).await?;
                    upsert_meta(ctx.user_metas, user_id, META_WEBSITE, website).await?;
                    upsert_meta(ctx.user_metas, user_id, META_SOCIAL_LINKS, social_links).await?;
                    upsert_meta(ctx.user_metas, user_id, META_ABOUT_ME, about_me).await?;
                    Ok(())
                })
            })
            .await?;

        info!(user_id = user.id, "profile updated");
        Ok(check)
    }

    async fn list_users_by_group(
        &self,
        group: &UserGroup,
        offset_id: i64,
        limit: u64,
    ) -> AppResult<Vec<User>> {
        self.store
            .users()
            .list_by_group(group.id, offset_id, limit)
            .await
    }

    async fn count_users_in_group(&self, group: &UserGroup) -> AppResult<u64> {
        self.store.users().count_by_group(group.id).await
    }

    async fn count_registered_today(&self) -> AppResult<u64> {
        let today = Local::now().date_naive();
        let start = today.and_time(NaiveTime::MIN);
        let end = today.and_time(NaiveTime::from_hms_opt(23, 59, 59).expect("literal time"));

        self.store
            .user_metas()
            .count_registered_between(start, end)
            .await
    }
}
