//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p pawpost-db --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `pawpost_test`)
//!   `TEST_DB_PASSWORD` (default: `pawpost_test`)
//!   `TEST_DB_NAME` (default: `pawpost_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use pawpost_db::{
    entities::{
        following, post,
        post::{Category, PostStatus},
        post_like, user,
        user::Role,
    },
    repositories::{FollowingRepository, PostLikeRepository, PostRepository, UserRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::Set;

async fn insert_user(repo: &UserRepository, id: &str, role: Role) -> user::Model {
    repo.create(user::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("user {id}")),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("x".to_string()),
        token: Set(Some(format!("token-{id}"))),
        role: Set(role),
        is_active: Set(true),
        followers_count: Set(0),
        following_count: Set(0),
        posts_count: Set(0),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

async fn insert_post(repo: &PostRepository, id: &str, author: &str) -> post::Model {
    repo.create(post::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(author.to_string()),
        title: Set("Rex".to_string()),
        content: Set("A very good dog".to_string()),
        category: Set(Category::Dogs),
        image_url: Set(None),
        tags: Set(serde_json::json!(["corgi"])),
        status: Set(PostStatus::Pending),
        is_featured: Set(false),
        featured_at: Set(None),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        rejection_reason: Set(None),
        likes_count: Set(0),
        comments_count: Set(0),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_approve_is_compare_and_swap() {
    let db = TestDatabase::create_unique().await.unwrap();
    let users = UserRepository::new(db.conn.clone());
    let posts = PostRepository::new(db.conn.clone());
    insert_user(&users, "editor1", Role::Editor).await;
    insert_user(&users, "admin1", Role::Admin).await;
    insert_post(&posts, "p1", "editor1").await;

    let (a, b) = tokio::join!(
        posts.approve("p1", "admin1", Utc::now()),
        posts.approve("p1", "admin1", Utc::now()),
    );
    assert_eq!(
        [a.unwrap(), b.unwrap()].iter().filter(|won| **won).count(),
        1
    );

    let post = posts.get_by_id("p1").await.unwrap();
    assert_eq!(post.status, PostStatus::Approved);
    assert_eq!(post.reviewed_by.as_deref(), Some("admin1"));
    assert!(!posts.reject("p1", "admin1", "late", Utc::now()).await.unwrap());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_like_toggle_twice_cancels_out() {
    let db = TestDatabase::create_unique().await.unwrap();
    let users = UserRepository::new(db.conn.clone());
    let posts = PostRepository::new(db.conn.clone());
    let likes = PostLikeRepository::new(db.conn.clone());
    insert_user(&users, "editor1", Role::Editor).await;
    insert_user(&users, "u1", Role::User).await;
    insert_post(&posts, "p1", "editor1").await;

    let like = || post_like::Model {
        id: pawpost_common::IdGenerator::new().generate(),
        post_id: "p1".to_string(),
        user_id: "u1".to_string(),
        created_at: Utc::now().into(),
    };

    let first = likes.toggle(like()).await.unwrap();
    assert!(first.liked);
    assert_eq!(first.count, 1);

    let second = likes.toggle(like()).await.unwrap();
    assert!(!second.liked);
    assert_eq!(second.count, 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_follow_toggle_moves_counters() {
    let db = TestDatabase::create_unique().await.unwrap();
    let users = UserRepository::new(db.conn.clone());
    let follows = FollowingRepository::new(db.conn.clone());
    insert_user(&users, "u1", Role::User).await;
    insert_user(&users, "u2", Role::User).await;

    let edge = || following::Model {
        id: pawpost_common::IdGenerator::new().generate(),
        follower_id: "u1".to_string(),
        followee_id: "u2".to_string(),
        created_at: Utc::now().into(),
    };

    let on = follows.toggle(edge()).await.unwrap();
    assert!(on.following);
    assert_eq!(on.followers_count, 1);
    assert_eq!(users.get_by_id("u1").await.unwrap().following_count, 1);

    let off = follows.toggle(edge()).await.unwrap();
    assert!(!off.following);
    assert_eq!(off.followers_count, 0);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
