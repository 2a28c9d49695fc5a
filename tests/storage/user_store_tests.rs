//! UserStore contract tests.

use invoice_dashboard::models::{NewUser, Role, UserProfile};
use invoice_dashboard::storage::{Storage, StorageError};

fn new_user(name: &str, email: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        role,
    }
}

pub async fn test_create_and_find_by_email(storage: &Storage) {
    let created = storage
        .users
        .create(new_user("User", "user@nextmail.com", Role::User))
        .await
        .expect("create user");
    assert_eq!(created.role, Role::User);
    assert_eq!(created.profile, UserProfile::default());

    let found = storage
        .users
        .find_by_email("user@nextmail.com")
        .await
        .expect("find")
        .expect("user exists");
    assert_eq!(found.id, created.id);
    assert_eq!(found.password, created.password);

    let by_id = storage.users.get(&created.id).await.expect("get");
    assert_eq!(by_id.map(|u| u.email), Some("user@nextmail.com".to_string()));

    assert!(storage
        .users
        .find_by_email("nobody@nextmail.com")
        .await
        .expect("find")
        .is_none());
}

pub async fn test_duplicate_email_conflicts(storage: &Storage) {
    storage
        .users
        .create(new_user("First", "dup@nextmail.com", Role::User))
        .await
        .expect("create user");

    let err = storage
        .users
        .create(new_user("Second", "dup@nextmail.com", Role::Admin))
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, StorageError::Conflict(_)), "unexpected error: {err}");
}

pub async fn test_update_profile(storage: &Storage) {
    let created = storage
        .users
        .create(new_user("Admin", "admin@nextmail.com", Role::Admin))
        .await
        .expect("create user");

    let profile = UserProfile {
        company: Some("Acme".to_string()),
        location: Some("Lisbon".to_string()),
        phone: None,
        title: Some("CFO".to_string()),
    };
    let updated = storage
        .users
        .update_profile(&created.id, "Admin Person", profile.clone())
        .await
        .expect("update profile");
    assert_eq!(updated.name, "Admin Person");
    assert_eq!(updated.profile, profile);
    assert_eq!(updated.role, Role::Admin);
    assert_eq!(updated.email, "admin@nextmail.com");

    let err = storage
        .users
        .update_profile("no-such-user", "X", UserProfile::default())
        .await
        .expect_err("missing user");
    assert!(err.is_not_found());
}

pub async fn test_list_summaries(storage: &Storage) {
    storage
        .users
        .create(new_user("Zed", "zed@nextmail.com", Role::User))
        .await
        .expect("create user");
    storage
        .users
        .create(new_user("Ann", "ann@nextmail.com", Role::Admin))
        .await
        .expect("create user");

    let summaries = storage.users.list_summaries().await.expect("summaries");
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Ann", "Zed"]);
    assert_eq!(summaries[0].role, Role::Admin);
}

#[macro_export]
macro_rules! run_user_store_tests {
    ($storage:expr) => {{
        use $crate::storage::user_store_tests::*;

        test_create_and_find_by_email(&$storage).await;
        println!("  test_create_and_find_by_email: PASSED");

        test_duplicate_email_conflicts(&$storage).await;
        println!("  test_duplicate_email_conflicts: PASSED");

        test_update_profile(&$storage).await;
        println!("  test_update_profile: PASSED");

        test_list_summaries(&$storage).await;
        println!("  test_list_summaries: PASSED");
    }};
}
