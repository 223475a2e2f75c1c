use config::Role;
use integration_tests::MockAuthority;
use route_policy::RouteAccess;

#[tokio::test]
async fn menu_for_signed_in_guest() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    client.sign_in("alice", "secret").await.unwrap();

    let menu: Vec<_> = client
        .menu()
        .into_iter()
        .map(|entry| match entry.access {
            RouteAccess::Granted => format!("{} -> {}", entry.rule.path, entry.rule.label),
            RouteAccess::Denied(reason) => format!("{} (locked: {reason})", entry.rule.path),
        })
        .collect();

    insta::assert_debug_snapshot!(menu, @r#"
    [
        "/home -> Dashboard",
        "/admin (locked: Admin Panel is not available to role 'guest' (requires: admin))",
        "/guest -> Guest Page",
    ]
    "#);
}

#[tokio::test]
async fn accessible_routes_follow_the_session() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::User)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    assert!(client.accessible_routes().is_empty());

    client.sign_in("alice", "secret").await.unwrap();
    let paths: Vec<_> = client.accessible_routes().iter().map(|rule| rule.path.as_str()).collect();
    assert_eq!(paths, ["/home"]);

    client.toggle_role().await.unwrap();
    let paths: Vec<_> = client.accessible_routes().iter().map(|rule| rule.path.as_str()).collect();
    assert_eq!(paths, ["/home", "/admin", "/guest"]);
}

#[tokio::test]
async fn unregistered_paths_need_only_a_session() {
    let authority = MockAuthority::new()
        .with_user("1", "alice", "secret", Role::Guest)
        .spawn()
        .await
        .unwrap();

    let client = authority.client();
    assert!(!client.can_access("/settings"));

    client.sign_in("alice", "secret").await.unwrap();
    assert!(client.can_access("/settings"));
    insta::assert_snapshot!(client.describe_denial("/settings"), @"/settings is not a protected route");
}
