mod common;

use chirp::error::AppError;
use chirp::services::favorite::FavoriteService;
use chirp::services::follow::FollowService;
use chirp::services::like::LikeService;
use chirp::services::post::PostService;
use chirp::services::user::UserService;
use chirp::utils::verify_password;

#[tokio::test]
async fn lookup_by_id_and_username() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = UserService::new(db);

    assert_eq!(service.get_by_id(alice.id).await.unwrap().username, "alice");
    assert_eq!(service.get_by_username("alice").await.unwrap().id, alice.id);
    assert!(matches!(
        service.get_by_username("nobody").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn profile_update() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = UserService::new(db);

    let updated = service
        .update_profile(alice.id, None, None, Some("hello, I post things"))
        .await
        .unwrap();
    assert_eq!(updated.about_me.as_deref(), Some("hello, I post things"));
    assert_eq!(updated.username, "alice");

    let renamed = service
        .update_profile(alice.id, Some("alice2"), None, None)
        .await
        .unwrap();
    assert_eq!(renamed.username, "alice2");
}

#[tokio::test]
async fn profile_update_keeps_username_and_email_unique() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    common::create_user(&db, "bob").await;
    let service = UserService::new(db);

    let taken_name = service
        .update_profile(alice.id, Some("bob"), None, None)
        .await;
    assert!(matches!(taken_name, Err(AppError::Conflict(_))));

    let taken_email = service
        .update_profile(alice.id, None, Some("bob@example.com"), None)
        .await;
    assert!(matches!(taken_email, Err(AppError::Conflict(_))));

    // Re-submitting your own values is not a conflict.
    let own = service
        .update_profile(alice.id, Some("alice"), Some("alice@example.com"), None)
        .await;
    assert!(own.is_ok());
}

#[tokio::test]
async fn set_password_overwrites_hash() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = UserService::new(db);

    let updated = service
        .set_password(alice.id, "completely_new_pw")
        .await
        .unwrap();

    assert!(verify_password("completely_new_pw", &updated.password_hash).unwrap());
    assert!(!verify_password(common::TEST_PASSWORD, &updated.password_hash).unwrap());
}

#[tokio::test]
async fn touch_last_seen_stamps_profile() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let service = UserService::new(db);

    assert!(alice.last_seen.is_none());
    service.touch_last_seen(alice.id).await.unwrap();
    let refreshed = service.get_by_id(alice.id).await.unwrap();
    assert!(refreshed.last_seen.is_some());
}

#[tokio::test]
async fn delete_cascades_through_the_graph() {
    let db = common::setup_db().await;
    let alice = common::create_user(&db, "alice").await;
    let bob = common::create_user(&db, "bob").await;

    let posts = PostService::new(db.clone());
    let follows = FollowService::new(db.clone());
    let likes = LikeService::new(db.clone());
    let favorites = FavoriteService::new(db.clone());

    let alices_post = posts.create(alice.id, "by alice").await.unwrap();
    let bobs_post = posts.create(bob.id, "by bob").await.unwrap();

    follows.follow(alice.id, bob.id).await.unwrap();
    follows.follow(bob.id, alice.id).await.unwrap();
    likes.like(alice.id, bobs_post.id).await.unwrap();
    likes.like(bob.id, alices_post.id).await.unwrap();
    favorites.favorite(alice.id, bobs_post.id).await.unwrap();
    favorites.favorite(bob.id, alices_post.id).await.unwrap();

    let service = UserService::new(db);
    service.delete(alice.id).await.unwrap();

    assert!(matches!(
        service.get_by_id(alice.id).await,
        Err(AppError::NotFound)
    ));
    // Alice's posts are gone, and so is everything referencing them.
    assert!(matches!(
        posts.get_by_id(alices_post.id).await,
        Err(AppError::NotFound)
    ));
    assert!(!likes.has_liked(bob.id, alices_post.id).await.unwrap());
    assert!(!favorites
        .has_favorited(bob.id, alices_post.id)
        .await
        .unwrap());
    // Follow edges in both directions were removed.
    assert!(!follows.is_following(bob.id, alice.id).await.unwrap());
    // Bob's own material is untouched.
    assert!(posts.get_by_id(bobs_post.id).await.is_ok());
    assert_eq!(likes.count_for_post(bobs_post.id).await.unwrap(), 0);
}
