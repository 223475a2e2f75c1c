use config::Role;
use integration_tests::MockAuthority;

#[tokio::test]
async fn anonymous_health() {
    let authority = MockAuthority::new().spawn().await.unwrap();

    let status = authority.client().health().await;

    insta::assert_json_snapshot!(status, @r#"
    {
      "status": "ok"
    }
    "#);
}

#[tokio::test]
async fn health_reports_the_caller() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();

    insta::assert_json_snapshot!(client.health().await, @r#"
    {
      "status": "ok",
      "authenticated_as": "alice",
      "auth_type": "user"
    }
    "#);
}

#[tokio::test]
async fn failing_health_degrades() {
    let authority = MockAuthority::new().with_failing_probes().spawn().await.unwrap();

    let status = authority.client().health().await;

    assert!(status.is_degraded());
    insta::assert_snapshot!(status.status, @"not okay");
}

#[tokio::test]
async fn user_details_follow_the_toggled_role() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();
    client.toggle_role().await.unwrap();

    insta::assert_json_snapshot!(client.user_details().await, @r#"
    {
      "id": "1",
      "username": "alice",
      "email": "alice@example.com",
      "role": "admin",
      "auth_type": "user"
    }
    "#);
}

#[tokio::test]
async fn user_details_without_session_are_unavailable() {
    let authority = MockAuthority::new().spawn().await.unwrap();

    assert!(authority.client().user_details().await.is_unavailable());
}

#[tokio::test]
async fn failing_user_details_are_unavailable() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .with_failing_probes()
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();

    let details = client.user_details().await;

    assert!(details.is_unavailable());
    insta::assert_snapshot!(details.username, @"no user information");
}
