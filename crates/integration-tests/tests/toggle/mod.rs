use std::{sync::Arc, time::Duration};

use config::Role;
use gateway::AuthError;
use integration_tests::{MockAuthority, ToggleMode};
use session::{AccessToken, SessionStore};

#[tokio::test]
async fn toggle_swaps_role_and_token() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let before = client.sign_in("alice", "secret").await.unwrap();
    assert_eq!(before.access_token, AccessToken::new("tok1"));

    let toggled = client.toggle_role().await.unwrap();
    let current = client.session().unwrap();

    assert_eq!(current, toggled.identity);
    assert_eq!(current.role, Role::Admin);
    assert_eq!(current.access_token, AccessToken::new("tok2"));
    assert_eq!(current.subject_id, before.subject_id);
    assert_eq!(current.display_name, before.display_name);
    assert_eq!(current.email, before.email);
    assert_eq!(current.expires_at, before.expires_at);

    insta::assert_snapshot!(toggled.message.unwrap(), @"Role changed to admin");
}

#[tokio::test]
async fn toggling_twice_returns_to_the_first_role() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Admin)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();

    client.toggle_role().await.unwrap();
    assert_eq!(client.role(), Some(Role::Guest));
    assert!(!client.can_access("/admin"));

    client.toggle_role().await.unwrap();
    assert_eq!(client.role(), Some(Role::Admin));
    assert!(client.can_access("/admin"));

    assert_eq!(authority.issued_tokens(), 3);
}

#[tokio::test]
async fn toggle_with_stale_token_fails() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();
    client.toggle_role().await.unwrap();

    let stale = client.gateway().toggle_role(&AccessToken::new("tok1")).await;

    assert_eq!(stale, Err(AuthError::TransportFailure));
}

#[tokio::test]
async fn failed_toggle_leaves_the_session_intact() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_failing_toggle()
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let before = client.sign_in("alice", "secret").await.unwrap();

    assert_eq!(client.toggle_role().await, Err(AuthError::TransportFailure));
    assert_eq!(*client.store().current().unwrap(), before);
    assert!(!client.can_access("/admin"));
}

#[tokio::test]
async fn toggle_without_login_needs_a_session() {
    let authority = MockAuthority::new().spawn().await.unwrap();
    let client = authority.client();

    assert_eq!(client.toggle_role().await, Err(AuthError::NoActiveSession));
    assert_eq!(authority.issued_tokens(), 0);
}

#[tokio::test]
async fn malformed_toggle_leaves_the_session_intact() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_toggle_mode(ToggleMode::Malformed)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let before = client.sign_in("alice", "secret").await.unwrap();

    assert_eq!(client.toggle_role().await, Err(AuthError::MalformedResponse));
    assert_eq!(*client.session().unwrap(), before);
    assert_eq!(client.role(), Some(Role::Guest));
}

#[tokio::test]
async fn late_toggle_answer_is_dropped_after_a_newer_login() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_user("2", "bob", "hunter2", Role::User)
        .with_toggle_delay(Duration::from_millis(300))
        .spawn()
        .await
        .unwrap();

    let client = Arc::new(authority.client());
    client.sign_in("alice", "secret").await.unwrap();

    let toggle = tokio::spawn({
        let client = client.clone();
        async move { client.toggle_role().await }
    });

    // Let the toggle request reach the authority before bob signs in.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let bob = client.sign_in("bob", "hunter2").await.unwrap();

    assert_eq!(toggle.await.unwrap(), Err(AuthError::NoActiveSession));

    let current = client.session().unwrap();
    assert_eq!(*current, bob);
    assert_eq!(current.subject_id, "2");
    assert_eq!(current.role, Role::User);
    assert!(!client.can_access("/admin"));
}

#[tokio::test]
async fn late_toggle_answer_is_dropped_after_sign_out() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_toggle_delay(Duration::from_millis(300))
        .spawn()
        .await
        .unwrap();

    let client = Arc::new(authority.client());
    client.sign_in("alice", "secret").await.unwrap();

    let toggle = tokio::spawn({
        let client = client.clone();
        async move { client.toggle_role().await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.sign_out();

    assert_eq!(toggle.await.unwrap(), Err(AuthError::NoActiveSession));
    assert!(client.session().is_none());
}
