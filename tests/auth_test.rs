mod common;

use chirp::error::AppError;
use chirp::services::auth::{AuthService, LoginOutcome};
use chirp::services::email::EmailService;
use chirp::services::token::TokenService;
use chirp::utils::{claims, totp};

fn current_code(secret: &str) -> String {
    totp::code_at(secret, totp::now_epoch_seconds()).expect("valid secret")
}

fn wrong_code(secret: &str) -> String {
    let code = current_code(secret);
    // Flip the last digit so the code is well-formed but wrong.
    let mut chars: Vec<char> = code.chars().collect();
    let last = chars.last_mut().unwrap();
    *last = if *last == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}

#[tokio::test]
async fn register_then_login() {
    let db = common::setup_db().await;
    let service = AuthService::new(db);

    let (user, secret) = service
        .register("alice", "alice@example.com", common::TEST_PASSWORD, false)
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert!(secret.is_none());

    match service.login("alice", common::TEST_PASSWORD).await.unwrap() {
        LoginOutcome::Authenticated { user, token } => {
            assert_eq!(user.username, "alice");
            assert!(!token.is_empty());
        }
        LoginOutcome::TwoFactorRequired { .. } => panic!("no second factor enrolled"),
    }
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let db = common::setup_db().await;
    let service = AuthService::new(db);

    service
        .register("alice", "alice@example.com", common::TEST_PASSWORD, false)
        .await
        .unwrap();

    let same_username = service
        .register("alice", "other@example.com", common::TEST_PASSWORD, false)
        .await;
    assert!(matches!(same_username, Err(AppError::Conflict(_))));

    let same_email = service
        .register("bob", "alice@example.com", common::TEST_PASSWORD, false)
        .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let db = common::setup_db().await;
    let service = AuthService::new(db);

    service
        .register("alice", "alice@example.com", common::TEST_PASSWORD, false)
        .await
        .unwrap();

    let wrong_password = service.login("alice", "not_the_password").await;
    let unknown_user = service.login("nobody", common::TEST_PASSWORD).await;
    assert!(matches!(wrong_password, Err(AppError::Unauthorized)));
    assert!(matches!(unknown_user, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn enrolled_user_must_answer_challenge() {
    let db = common::setup_db().await;
    let (_, secret) = common::create_user_with_2fa(&db, "alice").await;
    let service = AuthService::new(db);

    let pending = match service.login("alice", common::TEST_PASSWORD).await.unwrap() {
        LoginOutcome::TwoFactorRequired { pending_token } => pending_token,
        LoginOutcome::Authenticated { .. } => panic!("two-factor must not be bypassed"),
    };

    let (user, token) = service
        .complete_two_factor(&pending, &current_code(&secret))
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn invalid_code_keeps_challenge_open() {
    let db = common::setup_db().await;
    let (_, secret) = common::create_user_with_2fa(&db, "alice").await;
    let service = AuthService::new(db);

    let pending = match service.login("alice", common::TEST_PASSWORD).await.unwrap() {
        LoginOutcome::TwoFactorRequired { pending_token } => pending_token,
        LoginOutcome::Authenticated { .. } => panic!("two-factor must not be bypassed"),
    };

    let bad = service
        .complete_two_factor(&pending, &wrong_code(&secret))
        .await;
    assert!(matches!(bad, Err(AppError::Unauthorized)));

    // The same pending token still works with the right code.
    let ok = service
        .complete_two_factor(&pending, &current_code(&secret))
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn garbage_pending_token_rejected() {
    let db = common::setup_db().await;
    let (_, secret) = common::create_user_with_2fa(&db, "alice").await;
    let service = AuthService::new(db);

    let result = service
        .complete_two_factor("garbage", &current_code(&secret))
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn logout_revokes_session() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "alice").await;
    let tokens = TokenService::new(db.clone());
    let service = AuthService::new(db);

    let token = tokens.get_token(user.id).await.unwrap();
    service.logout(user.id).await.unwrap();

    assert!(tokens.check_token(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn forgot_password_is_silent_on_unknown_email() {
    let db = common::setup_db().await;
    let service = AuthService::new(db);
    let email_service = EmailService::from_env();

    let result = service
        .forgot_password("nobody@example.com", &email_service)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn reset_password_changes_credentials_and_revokes_session() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "alice").await;
    let tokens = TokenService::new(db.clone());
    let service = AuthService::new(db);

    let session = tokens.get_token(user.id).await.unwrap();
    let reset = claims::issue_reset_token(user.id).unwrap();

    service
        .reset_password(&reset, "brand_new_password")
        .await
        .unwrap();

    // Old password no longer works, new one does.
    assert!(matches!(
        service.login("alice", common::TEST_PASSWORD).await,
        Err(AppError::Unauthorized)
    ));
    assert!(service.login("alice", "brand_new_password").await.is_ok());

    // The live session was revoked along the way.
    assert!(tokens.check_token(&session).await.unwrap().is_none());
}

#[tokio::test]
async fn reset_with_wrong_purpose_token_rejected() {
    let db = common::setup_db().await;
    let user = common::create_user(&db, "alice").await;
    let service = AuthService::new(db);

    // A pending-2FA claim must not pass as a reset claim.
    let pending = claims::issue_two_factor_token(user.id).unwrap();
    let result = service.reset_password(&pending, "brand_new_password").await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}
