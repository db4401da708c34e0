mod common;

use chirp::error::AppError;
use chirp::services::post::PostService;

#[tokio::test]
async fn create_and_fetch() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = PostService::new(db);

    let post = service.create(alice.id, "hello world").await.unwrap();
    let fetched = service.get_by_id(post.id).await.unwrap();
    assert_eq!(fetched.body, "hello world");
    assert_eq!(fetched.user_id, alice.id);
}

#[tokio::test]
async fn empty_body_rejected() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = PostService::new(db);

    assert!(matches!(
        service.create(alice.id, "").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.create(alice.id, "   ").await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;
    let service = PostService::new(db);

    let post = service.create(alice.id, "mine").await.unwrap();

    let by_bob = service.delete(post.id, bob.id).await;
    assert!(matches!(by_bob, Err(AppError::Forbidden)));
    // Still there.
    assert!(service.get_by_id(post.id).await.is_ok());

    let deleted = service.delete(post.id, alice.id).await.unwrap();
    assert_eq!(deleted.id, post.id);
    assert_eq!(deleted.body, "mine");
    assert!(matches!(
        service.get_by_id(post.id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn deleting_missing_post_fails() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = PostService::new(db);

    let result = service.delete(9999, alice.id).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn delete_shrinks_count_by_one() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = PostService::new(db.clone());

    let base = chrono::Utc::now().naive_utc();
    let mut ids = Vec::new();
    for i in 0..3 {
        let post = common::create_post_at(
            &db,
            alice.id,
            &format!("post {i}"),
            base + chrono::Duration::seconds(i),
        )
        .await;
        ids.push(post.id);
    }

    service.delete(ids[1], alice.id).await.unwrap();

    let (posts, total) = service.list_by_user(alice.id, 1, 20).await.unwrap();
    assert_eq!(total, 2);
    let remaining: Vec<i32> = posts.iter().map(|p| p.id).collect();
    assert!(!remaining.contains(&ids[1]));
}

#[tokio::test]
async fn listings_are_newest_first() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;

    let base = chrono::Utc::now().naive_utc();
    let old = common::create_post_at(&db, alice.id, "old", base).await;
    let mid = common::create_post_at(&db, bob.id, "mid", base + chrono::Duration::seconds(1)).await;
    let new = common::create_post_at(&db, alice.id, "new", base + chrono::Duration::seconds(2)).await;

    let service = PostService::new(db);

    let (all, total) = service.list(1, 20).await.unwrap();
    assert_eq!(total, 3);
    let ids: Vec<i32> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![new.id, mid.id, old.id]);

    let (alices, total) = service.list_by_user(alice.id, 1, 20).await.unwrap();
    assert_eq!(total, 2);
    let ids: Vec<i32> = alices.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![new.id, old.id]);
}

#[tokio::test]
async fn listing_for_missing_user_fails() {
    let db = common::setup_db().await;
    let service = PostService::new(db);

    let result = service.list_by_user(9999, 1, 20).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}
