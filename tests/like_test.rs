mod common;

use chirp::error::AppError;
use chirp::services::like::LikeService;
use chirp::services::post::PostService;

#[tokio::test]
async fn like_is_idempotent() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let post = common::create_post_at(&db, bob.id, "hello", chrono::Utc::now().naive_utc()).await;
    let service = LikeService::new(db);

    assert!(service.like(alice.id, post.id).await.unwrap());
    assert!(!service.like(alice.id, post.id).await.unwrap());
    assert_eq!(service.count_for_post(post.id).await.unwrap(), 1);
}

#[tokio::test]
async fn unlike_never_goes_negative() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let post = common::create_post_at(&db, bob.id, "hello", chrono::Utc::now().naive_utc()).await;
    let service = LikeService::new(db);

    assert!(!service.unlike(alice.id, post.id).await.unwrap());
    assert_eq!(service.count_for_post(post.id).await.unwrap(), 0);

    service.like(alice.id, post.id).await.unwrap();
    assert!(service.unlike(alice.id, post.id).await.unwrap());
    assert!(!service.unlike(alice.id, post.id).await.unwrap());
    assert_eq!(service.count_for_post(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn toggle_reports_resulting_state() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let post = common::create_post_at(&db, bob.id, "hello", chrono::Utc::now().naive_utc()).await;
    let service = LikeService::new(db);

    assert!(service.toggle(alice.id, post.id).await.unwrap());
    assert!(service.has_liked(alice.id, post.id).await.unwrap());

    assert!(!service.toggle(alice.id, post.id).await.unwrap());
    assert!(!service.has_liked(alice.id, post.id).await.unwrap());
}

#[tokio::test]
async fn liking_missing_post_fails() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = LikeService::new(db);

    let result = service.like(alice.id, 9999).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn likes_are_per_user() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let carol = common::create_user(&db, "carol").await;
    let post = common::create_post_at(&db, carol.id, "hello", chrono::Utc::now().naive_utc()).await;
    let service = LikeService::new(db);

    service.like(alice.id, post.id).await.unwrap();
    service.like(bob.id, post.id).await.unwrap();
    assert_eq!(service.count_for_post(post.id).await.unwrap(), 2);

    service.unlike(alice.id, post.id).await.unwrap();
    assert_eq!(service.count_for_post(post.id).await.unwrap(), 1);
    assert!(service.has_liked(bob.id, post.id).await.unwrap());
}

#[tokio::test]
async fn deleting_post_deletes_its_likes() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let post = common::create_post_at(&db, bob.id, "hello", chrono::Utc::now().naive_utc()).await;

    let likes = LikeService::new(db.clone());
    likes.like(alice.id, post.id).await.unwrap();

    PostService::new(db).delete(post.id, bob.id).await.unwrap();

    assert_eq!(likes.count_for_post(post.id).await.unwrap(), 0);
    assert_eq!(likes.count_for_user(alice.id).await.unwrap(), 0);
}
