//! Session lifecycle: login, persistence, silent restore, and the global
//! 401 behavior.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stonefire_integration_tests::{MockBackend, temp_state_path};
use stonefire_storefront::config::StorefrontConfig;
use stonefire_storefront::session::AuthError;
use stonefire_storefront::state::App;

#[tokio::test]
async fn login_persists_token_across_restarts() {
    let mock = MockBackend::spawn().await;
    let state_path = temp_state_path();
    let config = StorefrontConfig::with_backend(&mock.base_url, &state_path).unwrap();

    {
        let mut app = App::new(config.clone()).unwrap();
        app.bootstrap().await;
        let user = app
            .session_mut()
            .unwrap()
            .login("ada@example.com", "correct-horse")
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
    }

    // A fresh process restores the session from the persisted token
    let mut app = App::new(config).unwrap();
    app.bootstrap().await;
    let session = app.session().unwrap();
    assert!(session.is_authenticated());
    assert_eq!(
        session.current_user().map(|user| user.name.as_str()),
        Some("Ada Lovelace")
    );
}

#[tokio::test]
async fn login_failure_carries_field_hint() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;

    let result = app
        .session_mut()
        .unwrap()
        .login("ada@example.com", "wrong-password")
        .await;
    let Err(AuthError::Api(e)) = result else {
        panic!("bad credentials must fail");
    };
    assert_eq!(e.field(), Some("password"));
    assert_eq!(e.user_message(), "Invalid credentials");
    assert!(!app.session().unwrap().is_authenticated());
}

#[tokio::test]
async fn stale_token_is_discarded_silently() {
    let mock = MockBackend::spawn().await;
    let state_path = temp_state_path();
    let config = StorefrontConfig::with_backend(&mock.base_url, &state_path).unwrap();

    {
        let mut app = App::new(config.clone()).unwrap();
        app.bootstrap().await;
        app.session_mut()
            .unwrap()
            .login("ada@example.com", "correct-horse")
            .await
            .unwrap();
    }

    // The backend forgets the token (expiry, restart, ...)
    mock.state().tokens.clear();

    let mut app = App::new(config).unwrap();
    app.bootstrap().await;
    let session = app.session().unwrap();
    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn logout_clears_token_and_profile() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    app.session_mut().unwrap().logout().unwrap();
    let session = app.session().unwrap();
    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn unauthorized_fires_hook_once_per_occurrence() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    app.session_mut()
        .unwrap()
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    app.session().unwrap().install_sign_out_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    mock.state().force_unauthorized = true;
    let api = app.api().unwrap();

    assert!(api.orders().await.is_err());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!app.session().unwrap().is_authenticated());

    // Each unauthorized response is its own occurrence
    assert!(api.orders().await.is_err());
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn profile_update_and_password_change() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;
    let session = app.session_mut().unwrap();
    session
        .login("ada@example.com", "correct-horse")
        .await
        .unwrap();

    let updated = session
        .update_profile(&stonefire_storefront::api::types::ProfileUpdate {
            name: Some("Ada King".to_string()),
            phone: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada King");
    assert_eq!(
        session.current_user().map(|user| user.name.as_str()),
        Some("Ada King")
    );

    // Wrong current password is a business error, not a sign-out
    let result = session.change_password("wrong", "new-password-9").await;
    let Err(AuthError::Api(e)) = result else {
        panic!("wrong current password must fail");
    };
    assert_eq!(e.user_message(), "Current password is incorrect");
    assert!(session.is_authenticated());

    session
        .change_password("correct-horse", "new-password-9")
        .await
        .unwrap();
    session.logout().unwrap();
    session
        .login("ada@example.com", "new-password-9")
        .await
        .unwrap();
}

#[tokio::test]
async fn signup_then_login() {
    let mock = MockBackend::spawn().await;
    let mut app = App::new(mock.storefront_config()).unwrap();
    app.bootstrap().await;

    let session = app.session_mut().unwrap();
    session
        .signup("Grace Hopper", "grace@example.com", "subroutine9", "555-0199")
        .await
        .unwrap();
    let user = session
        .login("grace@example.com", "subroutine9")
        .await
        .unwrap();
    assert_eq!(user.name, "Grace Hopper");

    // Duplicate signup surfaces the backend detail text
    let result = session
        .signup("Grace Hopper", "grace@example.com", "subroutine9", "")
        .await;
    let Err(AuthError::Api(e)) = result else {
        panic!("duplicate signup must fail");
    };
    assert_eq!(e.user_message(), "User already exists");
}
