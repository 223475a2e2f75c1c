//! In-process identity authority used by the end-to-end tests.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use client::AuthClient;
use config::{Config, Role};
use indoc::formatdoc;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// The route table shipped in `gatekeeper.toml`.
pub const ROUTES: &str = indoc::indoc! {r#"
    [[routes]]
    path = "/home"
    label = "Dashboard"
    allowed_roles = ["admin", "guest", "user"]
    description = "Main dashboard - accessible to all authenticated users"

    [[routes]]
    path = "/admin"
    label = "Admin Panel"
    allowed_roles = ["admin"]
    description = "Admin only - manage users and settings"

    [[routes]]
    path = "/guest"
    label = "Guest Page"
    allowed_roles = ["guest", "admin"]
    description = "Accessible to guests and admins"
"#};

/// How the mock answers a correct login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// A complete login response.
    Normal,
    /// 200 with a body lacking the access token.
    Malformed,
    /// 200 with a body that is not JSON.
    Garbage,
}

/// How the mock answers a role toggle with a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMode {
    /// A new token for the other role.
    Normal,
    /// 500 without a body.
    Failing,
    /// 200 with a body lacking the user's role.
    Malformed,
}

#[derive(Debug, Clone)]
struct MockUser {
    id: Value,
    username: String,
    password: String,
    email: String,
    role: Option<Role>,
}

/// Builder for the mock identity authority.
pub struct MockAuthority {
    users: Vec<MockUser>,
    login_mode: LoginMode,
    expires_in: Option<i64>,
    toggle_mode: ToggleMode,
    toggle_delay: Duration,
    failing_probes: bool,
}

impl Default for MockAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthority {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            login_mode: LoginMode::Normal,
            expires_in: Some(1800),
            toggle_mode: ToggleMode::Normal,
            toggle_delay: Duration::ZERO,
            failing_probes: false,
        }
    }

    /// Registers an account with a string id.
    pub fn with_user(mut self, id: &str, username: &str, password: &str, role: Role) -> Self {
        self.users.push(MockUser {
            id: json!(id),
            username: username.to_string(),
            password: password.to_string(),
            email: format!("{username}@example.com"),
            role: Some(role),
        });
        self
    }

    /// Registers an account with a numeric id and no role claim.
    pub fn with_roleless_user(mut self, id: i64, username: &str, password: &str) -> Self {
        self.users.push(MockUser {
            id: json!(id),
            username: username.to_string(),
            password: password.to_string(),
            email: format!("{username}@example.com"),
            role: None,
        });
        self
    }

    pub fn with_login_mode(mut self, mode: LoginMode) -> Self {
        self.login_mode = mode;
        self
    }

    pub fn with_expires_in(mut self, seconds: Option<i64>) -> Self {
        self.expires_in = seconds;
        self
    }

    /// Role toggles answer 500.
    pub fn with_failing_toggle(mut self) -> Self {
        self.toggle_mode = ToggleMode::Failing;
        self
    }

    pub fn with_toggle_mode(mut self, mode: ToggleMode) -> Self {
        self.toggle_mode = mode;
        self
    }

    /// Holds every toggle answer back for `delay`.
    pub fn with_toggle_delay(mut self, delay: Duration) -> Self {
        self.toggle_delay = delay;
        self
    }

    /// Health and user-details endpoints answer 503.
    pub fn with_failing_probes(mut self) -> Self {
        self.failing_probes = true;
        self
    }

    pub async fn spawn(self) -> anyhow::Result<TestAuthority> {
        let state = Arc::new(AuthorityState {
            users: self.users,
            login_mode: self.login_mode,
            expires_in: self.expires_in,
            toggle_mode: self.toggle_mode,
            toggle_delay: self.toggle_delay,
            failing_probes: self.failing_probes,
            sessions: Mutex::new(HashMap::new()),
            issued: AtomicUsize::new(0),
            login_bodies: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/toggle-role", post(toggle_role))
            .route("/health", get(health))
            .route("/get_user_details", get(user_details))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        log::debug!("Mock identity authority listening on {address}");

        // Give the server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(TestAuthority { address, state })
    }
}

/// A running mock authority.
pub struct TestAuthority {
    pub address: SocketAddr,
    state: Arc<AuthorityState>,
}

impl TestAuthority {
    /// Configuration pointing at this authority, with the shipped route table.
    pub fn config(&self) -> Config {
        let config = formatdoc! {r#"
            [authority]
            url = "http://{}"
            timeout = "2s"

            {ROUTES}
        "#, self.address};

        toml::from_str(&config).unwrap()
    }

    /// A client with an empty session talking to this authority.
    pub fn client(&self) -> AuthClient {
        AuthClient::from_config(&self.config()).unwrap()
    }

    /// Bodies received on the login endpoint, oldest first.
    pub fn login_bodies(&self) -> Vec<Value> {
        self.state.login_bodies.lock().unwrap().clone()
    }

    /// Number of tokens issued so far.
    pub fn issued_tokens(&self) -> usize {
        self.state.issued.load(Ordering::SeqCst)
    }
}

struct AuthorityState {
    users: Vec<MockUser>,
    login_mode: LoginMode,
    expires_in: Option<i64>,
    toggle_mode: ToggleMode,
    toggle_delay: Duration,
    failing_probes: bool,
    // token -> (username, role)
    sessions: Mutex<HashMap<String, (String, Role)>>,
    issued: AtomicUsize,
    login_bodies: Mutex<Vec<Value>>,
}

impl AuthorityState {
    fn issue(&self, username: &str, role: Role) -> String {
        let token = format!("tok{}", self.issued.fetch_add(1, Ordering::SeqCst) + 1);

        self.sessions
            .lock()
            .unwrap()
            .insert(token.clone(), (username.to_string(), role));

        token
    }

    fn caller(&self, headers: &HeaderMap) -> Option<(String, String, Role)> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .to_string();

        let (username, role) = self.sessions.lock().unwrap().get(&token)?.clone();

        Some((token, username, role))
    }

    fn user(&self, username: &str) -> Option<&MockUser> {
        self.users.iter().find(|user| user.username == username)
    }
}

#[derive(Deserialize)]
struct Envelope {
    encrypted: String,
}

#[derive(Deserialize)]
struct Submitted {
    username: String,
    password: String,
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

async fn login(State(state): State<Arc<AuthorityState>>, Json(body): Json<Value>) -> Response {
    state.login_bodies.lock().unwrap().push(body.clone());

    let Ok(envelope) = serde_json::from_value::<Envelope>(body) else {
        return (StatusCode::UNPROCESSABLE_ENTITY, "missing encrypted field").into_response();
    };

    let Ok(submitted) = serde_json::from_str::<Submitted>(&envelope.encrypted) else {
        return (StatusCode::BAD_REQUEST, "Decryption failed").into_response();
    };

    let Some(user) = state
        .user(&submitted.username)
        .filter(|user| user.password == submitted.password)
    else {
        return unauthorized("Incorrect username or password");
    };

    match state.login_mode {
        LoginMode::Malformed => {
            return Json(json!({ "token_type": "bearer", "user": { "id": user.id, "username": user.username } }))
                .into_response();
        }
        LoginMode::Garbage => return (StatusCode::OK, "<html>maintenance</html>").into_response(),
        LoginMode::Normal => {}
    }

    let token = state.issue(&user.username, user.role.unwrap_or(Role::Guest));

    let mut profile = json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
    });

    if let Some(role) = user.role {
        profile["role"] = json!(role);
    }

    let mut response = json!({
        "access_token": token,
        "token_type": "bearer",
        "user": profile,
    });

    if let Some(expires_in) = state.expires_in {
        response["expires_in"] = json!(expires_in);
    }

    Json(response).into_response()
}

async fn toggle_role(State(state): State<Arc<AuthorityState>>, headers: HeaderMap) -> Response {
    tokio::time::sleep(state.toggle_delay).await;

    if state.toggle_mode == ToggleMode::Failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "role service down").into_response();
    }

    let Some((old_token, username, role)) = state.caller(&headers) else {
        return unauthorized("Could not validate credentials");
    };

    if state.toggle_mode == ToggleMode::Malformed {
        return Json(json!({ "access_token": "tok-malformed", "user": {} })).into_response();
    }

    let next = match role {
        Role::Admin => Role::Guest,
        Role::User | Role::Guest => Role::Admin,
    };

    state.sessions.lock().unwrap().remove(&old_token);
    let token = state.issue(&username, next);

    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": { "username": username, "role": next },
        "message": format!("Role changed to {next}"),
    }))
    .into_response()
}

async fn health(State(state): State<Arc<AuthorityState>>, headers: HeaderMap) -> Response {
    if state.failing_probes {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    match state.caller(&headers) {
        Some((_, username, _)) => {
            Json(json!({ "status": "ok", "authenticated_as": username, "auth_type": "user" })).into_response()
        }
        None => Json(json!({ "status": "ok" })).into_response(),
    }
}

async fn user_details(State(state): State<Arc<AuthorityState>>, headers: HeaderMap) -> Response {
    if state.failing_probes {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let Some((_, username, role)) = state.caller(&headers) else {
        return unauthorized("Not authenticated");
    };

    let Some(user) = state.user(&username) else {
        return unauthorized("Not authenticated");
    };

    let id = match &user.id {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    };

    Json(json!({
        "id": id,
        "username": username,
        "email": user.email,
        "role": role,
        "auth_type": "user",
    }))
    .into_response()
}
