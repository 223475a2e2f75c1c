use config::Role;
use gateway::{AuthError, Credentials, LoginState};
use integration_tests::{LoginMode, MockAuthority};
use session::{AccessToken, SessionStore};

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    assert_eq!(client.sign_in("alice", "wrong").await, Err(AuthError::InvalidCredentials));
    assert!(client.store().current().is_none());
}

#[tokio::test]
async fn unknown_user_is_indistinguishable_from_wrong_password() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    let unknown = client.sign_in("mallory", "secret").await.unwrap_err();
    let wrong = client.sign_in("alice", "wrong").await.unwrap_err();

    assert_eq!(unknown, wrong);
    insta::assert_snapshot!(unknown, @"Invalid username or password");
}

#[tokio::test]
async fn failed_login_keeps_the_previous_session() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let before = client.sign_in("alice", "secret").await.unwrap();

    assert_eq!(client.sign_in("alice", "wrong").await, Err(AuthError::InvalidCredentials));
    assert_eq!(*client.session().unwrap(), before);
}

#[tokio::test]
async fn successful_login_populates_the_session() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let identity = client.sign_in("alice", "secret").await.unwrap();

    let current = client.session().unwrap();
    assert_eq!(*current, identity);

    assert_eq!(current.subject_id, "1");
    assert_eq!(current.display_name, "alice");
    assert_eq!(current.email, "alice@example.com");
    assert_eq!(current.role, Role::Guest);
    assert_eq!(current.access_token, AccessToken::new("tok1"));

    let issued_at = current.issued_at.unwrap();
    let expires_at = current.expires_at.unwrap();
    assert_eq!(expires_at.duration_since(issued_at).as_secs(), 1800);
}

#[tokio::test]
async fn credentials_are_posted_in_an_envelope() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    authority.client().sign_in("alice", "secret").await.unwrap();

    insta::assert_json_snapshot!(authority.login_bodies(), @r#"
    [
      {
        "encrypted": "{\"password\":\"secret\",\"username\":\"alice\"}"
      }
    ]
    "#);
}

#[tokio::test]
async fn empty_credentials_never_reach_the_authority() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    assert_eq!(client.sign_in("", "secret").await, Err(AuthError::InvalidCredentials));
    assert_eq!(client.sign_in("alice", "").await, Err(AuthError::InvalidCredentials));
    assert!(authority.login_bodies().is_empty());
}

#[tokio::test]
async fn numeric_id_without_role_signs_in_as_guest() {
    let authority = MockAuthority::new()
        .with_roleless_user(7, "bob", "hunter2")
        .with_expires_in(None)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    let identity = client.sign_in("bob", "hunter2").await.unwrap();

    assert_eq!(identity.subject_id, "7");
    assert_eq!(identity.role, Role::Guest);
    assert_eq!(identity.expires_at, None);
    assert!(client.can_access("/guest"));
}

#[tokio::test]
async fn missing_token_is_malformed() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_login_mode(LoginMode::Malformed)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    assert_eq!(client.sign_in("alice", "secret").await, Err(AuthError::MalformedResponse));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn non_json_success_is_malformed() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_login_mode(LoginMode::Garbage)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    assert_eq!(client.sign_in("alice", "secret").await, Err(AuthError::MalformedResponse));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn attempt_moves_through_states() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::User)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();

    let attempt = client.gateway().begin_login(Credentials::new("alice", "secret"));
    assert_eq!(attempt.state(), LoginState::Idle);

    let finished = attempt.submit().await;
    assert_eq!(finished.state(), LoginState::Succeeded);
    assert_eq!(finished.into_result().unwrap().role, Role::User);

    let retry = client.gateway().begin_login(Credentials::new("alice", "nope"));
    let finished = retry.submit().await;
    assert_eq!(finished.state(), LoginState::Failed);
    assert_eq!(finished.result(), &Err(AuthError::InvalidCredentials));

    // The gateway never writes the session.
    assert!(client.session().is_none());
}
