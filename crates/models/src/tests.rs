//! Database-backed tests. They skip when `SKIP_DB_TESTS` is set or when no
//! Postgres instance is reachable at `DATABASE_URL`.

use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{db, errors::ModelError, user};

/// Short timeouts so a missing database skips in seconds.
fn quick_config(url: &str) -> DatabaseConfig {
    DatabaseConfig {
        url: url.to_string(),
        min_connections: 1,
        max_connections: 2,
        connect_timeout_secs: 2,
        acquire_timeout_secs: 2,
        ..Default::default()
    }
}

async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match db::connect_with_config(&quick_config(db::DATABASE_URL.as_str())).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

fn new_user(username: &str) -> user::NewUser {
    user::NewUser {
        username: username.to_string(),
        first_name: "Test".into(),
        last_name: "User".into(),
        email: format!("{username}@example.com"),
        admin: false,
        password_hash: "$argon2id$placeholder".into(),
    }
}

#[tokio::test]
async fn test_user_create_find_delete() {
    let Some(db) = setup_test_db().await else { return };

    let username = format!("user_{}", Uuid::new_v4().simple());
    let created = user::create(&db, new_user(&username)).await.expect("create user");
    assert_eq!(created.username, username);
    assert!(!created.admin);

    let found = user::find_by_username(&db, &username).await.expect("find").expect("present");
    assert_eq!(found.id, created.id);

    assert_eq!(user::hard_delete(&db, created.id).await.expect("delete"), 1);
    assert!(user::Entity::find_by_id(created.id).one(&db).await.expect("lookup").is_none());
    assert_eq!(user::hard_delete(&db, created.id).await.expect("delete again"), 0);
}

#[tokio::test]
async fn test_duplicate_username_is_reported() {
    let Some(db) = setup_test_db().await else { return };

    let username = format!("dup_{}", Uuid::new_v4().simple());
    let first = user::create(&db, new_user(&username)).await.expect("create user");
    let err = user::create(&db, new_user(&username)).await.unwrap_err();
    assert!(matches!(err, ModelError::Duplicate(_)), "unexpected error: {err:?}");

    user::hard_delete(&db, first.id).await.expect("cleanup");
}

#[tokio::test]
async fn unreachable_database_gives_up_quickly() {
    // non-routable address: only the configured timeout ends the attempt
    let cfg = quick_config("postgres://postgres:pw@10.255.255.1:5432/accounts");
    let outcome = tokio::time::timeout(Duration::from_secs(15), db::connect_with_config(&cfg)).await;
    assert!(matches!(outcome, Ok(Err(_))), "connect should fail within its own timeout");
}
