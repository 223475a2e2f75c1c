use std::{fmt, sync::Arc};

use config::{AuthorityConfig, AuthorityEndpoints, Role};
use jiff::{SignedDuration, Timestamp};
use reqwest::{Client, RequestBuilder, header::AUTHORIZATION};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use session::{AccessToken, Identity};

use crate::{
    AuthError, AuthResult, CredentialSealer, Credentials, HealthStatus, LoginAttempt, PlaintextSealer, UserDetails,
    wire::{LoginResponse, ToggleRoleResponse},
};

/// A freshly issued role and the token that carries it.
///
/// The token used to request the toggle is stale as soon as this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// The new role.
    pub role: Role,
    /// Token reissued for the new role.
    pub access_token: AccessToken,
    /// Confirmation text from the authority, if any.
    pub message: Option<String>,
}

/// Client for the identity authority.
///
/// Holds no session state: results are returned to the caller, who decides what to put
/// in the session store. Requests are never retried.
pub struct AuthGateway {
    client: Client,
    base_url: String,
    endpoints: AuthorityEndpoints,
    sealer: Arc<dyn CredentialSealer>,
}

impl fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("base_url", &self.base_url)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl AuthGateway {
    /// Creates a gateway that sends credentials as plain JSON.
    pub fn new(config: &AuthorityConfig) -> anyhow::Result<Self> {
        Self::with_sealer(config, PlaintextSealer)
    }

    /// Creates a gateway that seals credentials with `sealer` before sending them.
    pub fn with_sealer(config: &AuthorityConfig, sealer: impl CredentialSealer + 'static) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for the identity authority: {e}"))?;

        Ok(Self {
            client,
            base_url: config.url.as_str().trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
            sealer: Arc::new(sealer),
        })
    }

    /// Starts a new login attempt. Nothing is sent until the attempt is submitted.
    pub fn begin_login(&self, credentials: Credentials) -> LoginAttempt<'_> {
        LoginAttempt::new(self, credentials)
    }

    /// Exchanges a username and password for an identity.
    ///
    /// Empty input fails with [`AuthError::InvalidCredentials`] without contacting the
    /// authority. Any refusal by the authority is reported the same way, whatever the
    /// reason. The session store is not touched.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<Identity> {
        self.begin_login(Credentials::new(username, password))
            .submit()
            .await
            .into_result()
    }

    pub(crate) async fn exchange(&self, credentials: &Credentials) -> AuthResult<Identity> {
        if !credentials.is_complete() {
            return Err(AuthError::InvalidCredentials);
        }

        let encrypted = self.sealer.seal(credentials).map_err(|e| {
            log::error!("Failed to seal credentials: {e}");
            AuthError::TransportFailure
        })?;

        let request = self
            .client
            .post(self.url(&self.endpoints.login))
            .json(&serde_json::json!({ "encrypted": encrypted }));

        let response = send(request, "login").await?;
        let status = response.status();

        if !status.is_success() {
            log::debug!("Identity authority refused the login ({status})");
            return Err(AuthError::InvalidCredentials);
        }

        let login: LoginResponse = read_json(response, "login").await?;

        identity_from_login(login, Timestamp::now())
    }

    /// Asks the authority to switch the role of the session owning `current_token`.
    ///
    /// Fails with [`AuthError::NoActiveSession`] for an empty token and with
    /// [`AuthError::TransportFailure`] for any network error or non-success status.
    pub async fn toggle_role(&self, current_token: &AccessToken) -> AuthResult<RoleGrant> {
        if current_token.is_empty() {
            return Err(AuthError::NoActiveSession);
        }

        let request = self
            .client
            .post(self.url(&self.endpoints.toggle_role))
            .header(AUTHORIZATION, format!("Bearer {}", current_token.expose()));

        let response = send(request, "role toggle").await?;
        let status = response.status();

        if !status.is_success() {
            log::warn!("Identity authority refused the role toggle ({status})");
            return Err(AuthError::TransportFailure);
        }

        let toggled: ToggleRoleResponse = read_json(response, "role toggle").await?;

        if toggled.access_token.expose_secret().is_empty() {
            log::error!("Role toggle response carries an empty access token");
            return Err(AuthError::MalformedResponse);
        }

        Ok(RoleGrant {
            role: toggled.user.role,
            access_token: AccessToken::from(toggled.access_token),
            message: toggled.message,
        })
    }

    /// Probes the authority's health endpoint. Never fails: problems are reported as
    /// [`HealthStatus::degraded`].
    pub async fn health(&self, token: Option<&AccessToken>) -> HealthStatus {
        let request = self.client.get(self.url(&self.endpoints.health));

        match probe(with_bearer(request, token), "health").await {
            Some(status) => status,
            None => HealthStatus::degraded(),
        }
    }

    /// Fetches the profile of the caller. Never fails: problems are reported as
    /// [`UserDetails::unavailable`].
    pub async fn user_details(&self, token: Option<&AccessToken>) -> UserDetails {
        let request = self.client.get(self.url(&self.endpoints.user_details));

        match probe(with_bearer(request, token), "user details").await {
            Some(details) => details,
            None => UserDetails::unavailable(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&AccessToken>) -> RequestBuilder {
    match token {
        Some(token) if !token.is_empty() => request.header(AUTHORIZATION, format!("Bearer {}", token.expose())),
        _ => request,
    }
}

async fn send(request: RequestBuilder, operation: &str) -> AuthResult<reqwest::Response> {
    request.send().await.map_err(|e| {
        log::warn!("Failed to send {operation} request to the identity authority: {e}");
        AuthError::TransportFailure
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, operation: &str) -> AuthResult<T> {
    let body = response.text().await.map_err(|e| {
        log::warn!("Failed to read {operation} response body: {e}");
        AuthError::TransportFailure
    })?;

    // The body carries a bearer token, so only the parser error is logged.
    serde_json::from_str(&body).map_err(|e| {
        log::error!("Failed to parse {operation} response: {e}");
        AuthError::MalformedResponse
    })
}

async fn probe<T: DeserializeOwned>(request: RequestBuilder, operation: &str) -> Option<T> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Not able to reach the identity authority for {operation}: {e}");
            return None;
        }
    };

    let status = response.status();

    if !status.is_success() {
        log::warn!("Failed to fetch {operation} from the identity authority ({status})");
        return None;
    }

    match response.json().await {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Failed to parse {operation} response: {e}");
            None
        }
    }
}

fn identity_from_login(login: LoginResponse, now: Timestamp) -> AuthResult<Identity> {
    let subject_id = login.user.id.into_string();

    if subject_id.is_empty() || login.user.username.is_empty() || login.access_token.expose_secret().is_empty() {
        log::error!("Login response is missing the user id, username or access token");
        return Err(AuthError::MalformedResponse);
    }

    if let Some(token_type) = login.token_type.as_deref()
        && !token_type.eq_ignore_ascii_case("bearer")
    {
        log::warn!("Identity authority issued a '{token_type}' token, using it as a bearer token");
    }

    let expires_at = match login.expires_in {
        Some(seconds) if seconds < 0 => {
            log::error!("Login response has a negative expires_in");
            return Err(AuthError::MalformedResponse);
        }
        Some(seconds) => Some(
            now.checked_add(SignedDuration::from_secs(seconds))
                .map_err(|_| AuthError::MalformedResponse)?,
        ),
        None => None,
    };

    let role = login.user.role.unwrap_or_else(|| {
        log::debug!("Login response carries no role, defaulting to '{}'", Role::Guest);
        Role::Guest
    });

    Ok(Identity {
        subject_id,
        display_name: login.user.username,
        email: login.user.email.unwrap_or_default(),
        role,
        access_token: AccessToken::from(login.access_token),
        issued_at: Some(now),
        expires_at,
    })
}
