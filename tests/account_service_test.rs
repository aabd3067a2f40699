//! Account service tests over mocked repositories.
//!
//! `TestStore` implements the account store on top of repository mocks and
//! runs transaction closures directly against them, so the write phase of
//! each use case is observable through ordinary expectations.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, NaiveTime};
use mockall::predicate::eq;
use serde_json::json;

use judge_accounts::domain::digest::md5_hex;
use judge_accounts::domain::{
    Language, ProfileUpdate, Registration, User, UserGroup, UserMeta,
};
use judge_accounts::errors::AppResult;
use judge_accounts::infra::account_store::{AccountStore, TxContext};
use judge_accounts::infra::{
    LanguageRepository, MockLanguageRepository, MockUserGroupRepository, MockUserMetaRepository,
    MockUserRepository, UserGroupRepository, UserMetaRepository, UserRepository,
};
use judge_accounts::services::{AccountManager, AccountService};
use judge_accounts::utils::NoopFilter;

#[derive(Default)]
struct Mocks {
    users: MockUserRepository,
    user_metas: MockUserMetaRepository,
    user_groups: MockUserGroupRepository,
    languages: MockLanguageRepository,
}

struct TestStore {
    users: Arc<MockUserRepository>,
    user_metas: Arc<MockUserMetaRepository>,
    user_groups: Arc<MockUserGroupRepository>,
    languages: Arc<MockLanguageRepository>,
}

#[async_trait]
impl AccountStore for TestStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn user_metas(&self) -> Arc<dyn UserMetaRepository> {
        self.user_metas.clone()
    }

    fn user_groups(&self) -> Arc<dyn UserGroupRepository> {
        self.user_groups.clone()
    }

    fn languages(&self) -> Arc<dyn LanguageRepository> {
        self.languages.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TxContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        let ctx = TxContext {
            users: self.users.as_ref(),
            user_metas: self.user_metas.as_ref(),
        };
        f(ctx).await
    }
}

fn service(mocks: Mocks) -> AccountManager<TestStore> {
    let store = TestStore {
        users: Arc::new(mocks.users),
        user_metas: Arc::new(mocks.user_metas),
        user_groups: Arc::new(mocks.user_groups),
        languages: Arc::new(mocks.languages),
    };
    AccountManager::new(Arc::new(store), Arc::new(NoopFilter))
}

fn users_group() -> UserGroup {
    UserGroup {
        id: 1,
        slug: "users".to_string(),
        name: "Users".to_string(),
    }
}

fn judgers_group() -> UserGroup {
    UserGroup {
        id: 2,
        slug: "judgers".to_string(),
        name: "Judgers".to_string(),
    }
}

fn cpp() -> Language {
    Language {
        id: 3,
        slug: "cpp".to_string(),
        name: "C++".to_string(),
    }
}

fn existing_user(id: i64, group: UserGroup) -> User {
    User {
        id,
        username: "alice_dev".to_string(),
        password: md5_hex("Secret123"),
        email: "alice@example.com".to_string(),
        user_group: group,
        prefer_language: cpp(),
    }
}

fn registration(username: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: "Secret123".to_string(),
        email: "newbie@example.com".to_string(),
        language_slug: "cpp".to_string(),
    }
}

fn empty_profile(email: &str) -> ProfileUpdate {
    ProfileUpdate {
        email: email.to_string(),
        location: String::new(),
        website: String::new(),
        social_links: String::new(),
        about_me: String::new(),
    }
}

#[tokio::test]
async fn create_user_persists_digest_and_register_time() {
    let mut mocks = Mocks::default();

    mocks
        .languages
        .expect_find_by_slug()
        .withf(|slug| slug == "cpp")
        .returning(|_| Ok(Some(cpp())));
    mocks
        .users
        .expect_find_by_username()
        .withf(|u| u == "rust_newbie")
        .returning(|_| Ok(None));
    mocks
        .users
        .expect_find_by_email()
        .withf(|e| e == "newbie@example.com")
        .returning(|_| Ok(None));
    mocks
        .user_groups
        .expect_find_by_slug()
        .withf(|slug| slug == "users")
        .returning(|_| Ok(Some(users_group())));
    mocks
        .users
        .expect_create()
        .withf(|new_user| {
            new_user.username == "rust_newbie"
                && new_user.password == md5_hex("Secret123")
                && new_user.email == "newbie@example.com"
                && new_user.user_group_id == 1
                && new_user.prefer_language_id == 3
        })
        .returning(|new_user| {
            Ok(User {
                id: 42,
                username: new_user.username,
                password: new_user.password,
                email: new_user.email,
                user_group: users_group(),
                prefer_language: cpp(),
            })
        });
    mocks
        .user_metas
        .expect_create()
        .withf(|meta| {
            meta.user_id == 42
                && meta.meta_key == "RegisterTime"
                && NaiveDateTime::parse_from_str(&meta.meta_value, "%Y-%m-%d %H:%M:%S").is_ok()
        })
        .returning(|meta| {
            Ok(UserMeta {
                id: 1,
                user_id: meta.user_id,
                meta_key: meta.meta_key,
                meta_value: meta.meta_value,
            })
        });

    let check = service(mocks)
        .create_user(registration("rust_newbie"), true, true)
        .await
        .unwrap();

    assert!(check.is_successful);
    assert!(!check.is_username_exists);
    assert!(!check.is_email_exists);
}

#[tokio::test]
async fn create_user_rejects_duplicate_username_without_writing() {
    let mut mocks = Mocks::default();

    mocks
        .languages
        .expect_find_by_slug()
        .returning(|_| Ok(Some(cpp())));
    mocks
        .users
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing_user(7, users_group()))));
    mocks.users.expect_find_by_email().returning(|_| Ok(None));
    mocks.users.expect_create().times(0);
    mocks.user_metas.expect_create().times(0);

    let check = service(mocks)
        .create_user(registration("alice_dev"), true, true)
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(check.is_username_exists);
}

#[tokio::test]
async fn create_user_rejects_when_registration_is_closed() {
    let mut mocks = Mocks::default();

    mocks
        .languages
        .expect_find_by_slug()
        .returning(|_| Ok(Some(cpp())));
    mocks.users.expect_find_by_username().returning(|_| Ok(None));
    mocks.users.expect_find_by_email().returning(|_| Ok(None));
    mocks.users.expect_create().times(0);

    let check = service(mocks)
        .create_user(registration("rust_newbie"), true, false)
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_allow_register);
}

#[tokio::test]
async fn create_user_flags_unknown_language() {
    let mut mocks = Mocks::default();

    mocks
        .languages
        .expect_find_by_slug()
        .withf(|slug| slug == "cobol")
        .returning(|_| Ok(None));
    mocks.users.expect_find_by_username().returning(|_| Ok(None));
    mocks.users.expect_find_by_email().returning(|_| Ok(None));
    mocks.users.expect_create().times(0);

    let mut reg = registration("rust_newbie");
    reg.language_slug = "cobol".to_string();

    let check = service(mocks).create_user(reg, true, true).await.unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_language_legal);
}

#[tokio::test]
async fn verify_account_accepts_matching_digest() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_find_by_username()
        .withf(|u| u == "alice_dev")
        .returning(|_| Ok(Some(existing_user(7, users_group()))));

    let check = service(mocks)
        .verify_account("alice_dev", &md5_hex("Secret123"))
        .await
        .unwrap();

    assert!(check.is_successful);
    assert!(check.is_account_valid);
}

#[tokio::test]
async fn verify_account_dispatches_email_identifier_to_email_lookup() {
    let mut mocks = Mocks::default();

    mocks.users.expect_find_by_username().times(0);
    mocks
        .users
        .expect_find_by_email()
        .withf(|e| e == "alice@example.com")
        .returning(|_| Ok(Some(existing_user(7, users_group()))));

    let check = service(mocks)
        .verify_account("alice@example.com", &md5_hex("Secret123"))
        .await
        .unwrap();

    assert!(check.is_account_valid);
}

#[tokio::test]
async fn verify_account_rejects_judgers_group() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing_user(7, judgers_group()))));

    let check = service(mocks)
        .verify_account("alice_dev", &md5_hex("Secret123"))
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_account_valid);
}

#[tokio::test]
async fn verify_account_empty_password_skips_lookup() {
    let mut mocks = Mocks::default();

    mocks.users.expect_find_by_username().times(0);
    mocks.users.expect_find_by_email().times(0);

    let check = service(mocks).verify_account("alice_dev", "").await.unwrap();

    assert!(check.is_password_empty);
    assert!(!check.is_successful);
}

#[tokio::test]
async fn verify_account_rejects_wrong_digest() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_find_by_username()
        .returning(|_| Ok(Some(existing_user(7, users_group()))));

    let check = service(mocks)
        .verify_account("alice_dev", &md5_hex("WrongSecret"))
        .await
        .unwrap();

    assert!(!check.is_account_valid);
}

#[tokio::test]
async fn change_password_stores_digest_of_new_password() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_update()
        .withf(|updated| updated.id == 7 && updated.password == md5_hex("NewSecret1"))
        .returning(|_| Ok(()));

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .change_password(&user, "Secret123", "NewSecret1", "NewSecret1")
        .await
        .unwrap();

    assert!(check.is_successful);
    assert!(check.is_old_password_correct);
}

#[tokio::test]
async fn change_password_rejects_mismatched_confirmation() {
    let mut mocks = Mocks::default();
    mocks.users.expect_update().times(0);

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .change_password(&user, "Secret123", "NewSecret1", "NewSecret2")
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_confirm_password_matched);
}

#[tokio::test]
async fn change_password_rejects_wrong_old_password() {
    let mut mocks = Mocks::default();
    mocks.users.expect_update().times(0);

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .change_password(&user, "WrongSecret", "NewSecret1", "NewSecret1")
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_old_password_correct);
}

#[tokio::test]
async fn change_password_accepts_empty_old_password() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_update()
        .withf(|updated| updated.password == md5_hex("NewSecret1"))
        .returning(|_| Ok(()));

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .change_password(&user, "", "NewSecret1", "NewSecret1")
        .await
        .unwrap();

    assert!(check.is_successful);
}

#[tokio::test]
async fn update_profile_unchanged_email_skips_existence_lookup() {
    let mut mocks = Mocks::default();

    mocks.users.expect_find_by_email().times(0);
    mocks
        .users
        .expect_update()
        .withf(|updated| updated.email == "alice@example.com")
        .returning(|_| Ok(()));
    // All four attributes are absent and submitted empty, so no metadata row
    // is created.
    mocks
        .user_metas
        .expect_find_by_key()
        .returning(|_, _| Ok(None));
    mocks.user_metas.expect_create().times(0);
    mocks.user_metas.expect_update().times(0);

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .update_profile(&user, empty_profile("alice@example.com"))
        .await
        .unwrap();

    assert!(check.is_successful);
    assert!(!check.is_email_exists);
}

#[tokio::test]
async fn update_profile_rejects_email_taken_by_another_account() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_find_by_email()
        .withf(|e| e == "taken@example.com")
        .returning(|_| Ok(Some(existing_user(99, users_group()))));
    mocks.users.expect_update().times(0);
    mocks.user_metas.expect_create().times(0);

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .update_profile(&user, empty_profile("taken@example.com"))
        .await
        .unwrap();

    assert!(!check.is_successful);
    assert!(check.is_email_exists);
}

#[tokio::test]
async fn update_profile_creates_only_non_empty_attributes() {
    let mut mocks = Mocks::default();

    mocks.users.expect_update().returning(|_| Ok(()));
    mocks
        .user_metas
        .expect_find_by_key()
        .returning(|_, _| Ok(None));
    mocks
        .user_metas
        .expect_create()
        .withf(|meta| {
            (meta.meta_key == "location" && meta.meta_value == "Hangzhou")
                || (meta.meta_key == "socialLinks"
                    && meta.meta_value == r#"{"github":"alice"}"#)
        })
        .times(2)
        .returning(|meta| {
            Ok(UserMeta {
                id: 10,
                user_id: meta.user_id,
                meta_key: meta.meta_key,
                meta_value: meta.meta_value,
            })
        });
    mocks.user_metas.expect_update().times(0);

    let user = existing_user(7, users_group());
    let profile = ProfileUpdate {
        email: user.email.clone(),
        location: "Hangzhou".to_string(),
        website: String::new(),
        social_links: r#"{"github":"alice"}"#.to_string(),
        about_me: String::new(),
    };

    let check = service(mocks).update_profile(&user, profile).await.unwrap();
    assert!(check.is_successful);
}

#[tokio::test]
async fn update_profile_overwrites_existing_attribute_with_empty_value() {
    let mut mocks = Mocks::default();

    mocks.users.expect_update().returning(|_| Ok(()));
    mocks
        .user_metas
        .expect_find_by_key()
        .returning(|user_id, meta_key| {
            if meta_key == "location" {
                Ok(Some(UserMeta {
                    id: 9,
                    user_id,
                    meta_key: meta_key.to_string(),
                    meta_value: "Hangzhou".to_string(),
                }))
            } else {
                Ok(None)
            }
        });
    mocks
        .user_metas
        .expect_update()
        .withf(|meta| meta.id == 9 && meta.meta_key == "location" && meta.meta_value.is_empty())
        .times(1)
        .returning(|_| Ok(()));
    mocks.user_metas.expect_create().times(0);

    let user = existing_user(7, users_group());
    let check = service(mocks)
        .update_profile(&user, empty_profile("alice@example.com"))
        .await
        .unwrap();

    assert!(check.is_successful);
}

#[tokio::test]
async fn update_profile_rejects_overlong_location() {
    let mut mocks = Mocks::default();
    mocks.users.expect_update().times(0);
    mocks.user_metas.expect_create().times(0);

    let user = existing_user(7, users_group());
    let mut profile = empty_profile("alice@example.com");
    profile.location = "x".repeat(129);

    let check = service(mocks).update_profile(&user, profile).await.unwrap();

    assert!(!check.is_successful);
    assert!(!check.is_location_legal);
}

#[tokio::test]
async fn social_links_round_trip_through_metadata() {
    let submitted = r#"{"github":"alice","blog":"https://alice.dev"}"#.to_string();

    let mut mocks = Mocks::default();
    let stored = submitted.clone();
    mocks
        .user_metas
        .expect_list_for_user()
        .with(eq(7i64))
        .returning(move |_| {
            Ok(vec![
                UserMeta {
                    id: 1,
                    user_id: 7,
                    meta_key: "socialLinks".to_string(),
                    meta_value: stored.clone(),
                },
                UserMeta {
                    id: 2,
                    user_id: 7,
                    meta_key: "location".to_string(),
                    meta_value: "Hangzhou".to_string(),
                },
            ])
        });

    let meta: HashMap<_, _> = service(mocks).get_user_meta(7).await.unwrap();

    assert_eq!(
        meta["socialLinks"],
        json!({"github": "alice", "blog": "https://alice.dev"})
    );
    assert_eq!(meta["location"], json!("Hangzhou"));
}

#[tokio::test]
async fn malformed_social_links_fall_back_to_raw_string() {
    let mut mocks = Mocks::default();
    mocks.user_metas.expect_list_for_user().returning(|_| {
        Ok(vec![UserMeta {
            id: 1,
            user_id: 7,
            meta_key: "socialLinks".to_string(),
            meta_value: "not json".to_string(),
        }])
    });

    let meta = service(mocks).get_user_meta(7).await.unwrap();
    assert_eq!(meta["socialLinks"], json!("not json"));
}

#[tokio::test]
async fn get_user_by_identifier_dispatches_on_at_sign() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_find_by_username()
        .withf(|u| u == "alice_dev")
        .returning(|_| Ok(Some(existing_user(7, users_group()))));
    mocks.users.expect_find_by_email().times(0);

    let user = service(mocks)
        .get_user_by_username_or_email("alice_dev")
        .await
        .unwrap();

    assert_eq!(user.map(|u| u.id), Some(7));
}

#[tokio::test]
async fn count_registered_today_uses_whole_day_window() {
    let mut mocks = Mocks::default();

    mocks
        .user_metas
        .expect_count_registered_between()
        .withf(|start, end| {
            start.date() == end.date()
                && start.time() == NaiveTime::MIN
                && end.time() == NaiveTime::from_hms_opt(23, 59, 59).unwrap()
        })
        .returning(|_, _| Ok(5));

    let count = service(mocks).count_registered_today().await.unwrap();
    assert_eq!(count, 5);
}

#[tokio::test]
async fn count_users_in_group_delegates_to_store() {
    let mut mocks = Mocks::default();

    mocks
        .users
        .expect_count_by_group()
        .with(eq(1i64))
        .returning(|_| Ok(128));

    let count = service(mocks)
        .count_users_in_group(&users_group())
        .await
        .unwrap();
    assert_eq!(count, 128);
}
