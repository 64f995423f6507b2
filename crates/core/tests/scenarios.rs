//! End-to-end service scenarios.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p pawpost-core --test scenarios -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pawpost_common::{AppError, Config};
use pawpost_core::{
    Actor, AuditService, CreatePostInput, EngagementService, ListOptions, ModerationService,
    PostQuery, PostService, RegisterInput, Role, TagService, UserService,
};
use pawpost_db::{
    entities::post::{Category, PostStatus},
    repositories::{
        CommentRepository, FollowingRepository, ModerationLogRepository, PostLikeRepository,
        PostRepository, TagRepository, UserRepository,
    },
    test_utils::TestDatabase,
};
use sea_orm::DatabaseConnection;

struct Services {
    users: UserService,
    posts: PostService,
    moderation: ModerationService,
    engagement: EngagementService,
}

fn services(db: Arc<DatabaseConnection>) -> Services {
    let config: Config = serde_json::from_value(serde_json::json!({
        "server": {},
        "database": { "url": "unused" },
        "accounts": { "admin_emails": ["admin@example.com"] },
    }))
    .unwrap();

    let audit = AuditService::new(ModerationLogRepository::new(db.clone()));
    let tags = TagService::new(TagRepository::new(db.clone()));
    let posts = PostService::new(
        PostRepository::new(db.clone()),
        UserRepository::new(db.clone()),
        PostLikeRepository::new(db.clone()),
        tags.clone(),
        audit.clone(),
        &config,
    );
    Services {
        users: UserService::new(
            UserRepository::new(db.clone()),
            PostRepository::new(db.clone()),
            FollowingRepository::new(db.clone()),
            audit.clone(),
            &config,
        ),
        moderation: ModerationService::new(
            PostRepository::new(db.clone()),
            posts.clone(),
            tags,
            audit.clone(),
        ),
        engagement: EngagementService::new(
            posts.clone(),
            PostLikeRepository::new(db.clone()),
            CommentRepository::new(db.clone()),
            FollowingRepository::new(db.clone()),
            UserRepository::new(db),
            audit,
        ),
        posts,
    }
}

async fn register(svc: &Services, name: &str) -> Actor {
    let user = svc
        .users
        .register(RegisterInput {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    Actor::from(&user)
}

async fn admin_and_editor(svc: &Services) -> (Actor, Actor) {
    let admin = register(svc, "admin").await;
    assert_eq!(admin.role, Role::Admin);

    let editor = register(svc, "editor").await;
    let editor = svc
        .users
        .change_role(&admin, &editor.id, Role::Editor)
        .await
        .unwrap();
    (admin, Actor::from(&editor))
}

fn draft(title: &str) -> CreatePostInput {
    CreatePostInput {
        title: title.to_string(),
        content: "Sleeps all day".to_string(),
        category: Category::Cats,
        image_url: None,
        tags: vec!["#Tabby".to_string(), "tabby".to_string()],
    }
}

async fn feed_ids(svc: &Services, actor: Option<&Actor>) -> Vec<String> {
    svc.posts
        .list(actor, &PostQuery::PublicFeed, ListOptions::default())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_rejected_post_stays_with_author() {
    let db = TestDatabase::create_unique().await.unwrap();
    let svc = services(db.conn.clone());
    let (admin, editor) = admin_and_editor(&svc).await;

    let post = svc.posts.create(&editor, draft("Milo")).await.unwrap();
    assert_eq!(post.status, PostStatus::Pending);
    assert_eq!(post.tag_names(), vec!["tabby".to_string()]);
    assert!(!feed_ids(&svc, Some(&admin)).await.contains(&post.id));

    svc.moderation.reject(&admin, &post.id, "spam").await.unwrap();

    let seen = svc.posts.get_visible(Some(&editor), &post.id).await.unwrap();
    assert_eq!(seen.status, PostStatus::Rejected);
    assert_eq!(seen.rejection_reason.as_deref(), Some("spam"));
    assert_eq!(seen.reviewed_by.as_deref(), Some(admin.id.as_str()));

    assert!(matches!(
        svc.posts.get_visible(None, &post.id).await,
        Err(AppError::PostNotFound(_))
    ));
    assert!(matches!(
        svc.moderation.reject(&admin, &post.id, "again").await,
        Err(AppError::InvalidTransition(_))
    ));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_approved_post_can_be_featured() {
    let db = TestDatabase::create_unique().await.unwrap();
    let svc = services(db.conn.clone());
    let (admin, editor) = admin_and_editor(&svc).await;

    let post = svc.posts.create(&editor, draft("Nala")).await.unwrap();
    assert!(matches!(
        svc.moderation.set_featured(&admin, &post.id, true).await,
        Err(AppError::InvalidState(_))
    ));

    svc.moderation.approve(&admin, &post.id).await.unwrap();
    assert!(feed_ids(&svc, None).await.contains(&post.id));

    svc.moderation
        .set_featured(&admin, &post.id, true)
        .await
        .unwrap();

    let read = svc.posts.get_visible(None, &post.id).await.unwrap();
    assert!(read.is_featured);
    assert!(read.featured_at.is_some());
    let featured = svc.posts.featured(None).await.unwrap().unwrap();
    assert_eq!(featured.id, post.id);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_approve_has_one_winner() {
    let db = TestDatabase::create_unique().await.unwrap();
    let svc = services(db.conn.clone());
    let (admin, editor) = admin_and_editor(&svc).await;
    let post = svc.posts.create(&editor, draft("Oscar")).await.unwrap();

    let (a, b) = tokio::join!(
        svc.moderation.approve(&admin, &post.id),
        svc.moderation.approve(&admin, &post.id),
    );

    let outcomes = [a.is_ok(), b.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    assert!(matches!(
        [a, b].into_iter().find(Result::is_err),
        Some(Err(AppError::InvalidTransition(_)))
    ));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_like_and_follow_toggles_cancel_out() {
    let db = TestDatabase::create_unique().await.unwrap();
    let svc = services(db.conn.clone());
    let (admin, editor) = admin_and_editor(&svc).await;
    let reader = register(&svc, "reader").await;

    let post = svc.posts.create(&editor, draft("Pepper")).await.unwrap();
    svc.moderation.approve(&admin, &post.id).await.unwrap();

    let liked = svc.engagement.toggle_like(Some(&reader), &post.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.count, 1);
    let unliked = svc.engagement.toggle_like(Some(&reader), &post.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.count, 0);

    let followed = svc
        .engagement
        .toggle_follow(Some(&reader), &editor.id)
        .await
        .unwrap();
    assert!(followed.following);
    assert_eq!(followed.followers_count, 1);

    let profile = svc.users.profile(Some(&reader), &editor.id).await.unwrap();
    assert!(profile.is_following);
    assert_eq!(profile.posts_count, 1);
    assert!(!profile.show_email);

    let unfollowed = svc
        .engagement
        .toggle_follow(Some(&reader), &editor.id)
        .await
        .unwrap();
    assert!(!unfollowed.following);
    assert_eq!(unfollowed.followers_count, 0);

    db.drop_database().await.unwrap();
}
