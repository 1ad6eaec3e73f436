//! Auto-authenticating client for the Bondifuzz REST API.
//!
//! Every request goes through [`AutologinClient::send`]. A request answered
//! with `401 Unauthorized` triggers a login exchange and is then resent
//! exactly once with the fresh session. Concurrent tasks share one login:
//! the first task to see a 401 becomes the owner of the exchange, the others
//! wait for it and all of them retry their own request afterwards.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Local;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::response::parse_result;
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::transport::{COOKIE_SESSION_ID, COOKIE_USER_ID};
use crate::auth::{Credentials, Session, SessionStore};
use crate::{ClientError, Result};

const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Placeholder for machine details the OS does not report.
const UNKNOWN: &str = "unknown";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    session_metadata: String,
}

#[derive(Deserialize)]
struct LoginResult {
    user_name: String,
    display_name: String,
    is_admin: bool,
}

/// What a task does after it was answered with 401.
enum Role {
    /// Another task logged in since this request was sent.
    Reuse(Session),
    /// A login exchange is in flight elsewhere.
    Wait,
    /// This task runs the login exchange.
    Login,
}

/// How the last login exchange failed, replayed to the tasks that waited on it.
#[derive(Debug, Clone)]
enum LoginFailure {
    Rejected,
    Network { url: String, message: String },
    Api { code: String, message: String },
    Other(String),
}

impl LoginFailure {
    fn from_error(error: &ClientError) -> Self {
        match error {
            ClientError::AuthenticationFailed => LoginFailure::Rejected,
            ClientError::NetworkUnavailable { url, source } => LoginFailure::Network {
                url: url.clone(),
                message: source.to_string(),
            },
            ClientError::Api { code, message } => LoginFailure::Api {
                code: code.clone(),
                message: message.clone(),
            },
            ClientError::Internal(reason) => LoginFailure::Other(reason.clone()),
            other => LoginFailure::Other(other.to_string()),
        }
    }

    fn to_error(&self) -> ClientError {
        match self {
            LoginFailure::Rejected => ClientError::AuthenticationFailed,
            LoginFailure::Network { url, message } => ClientError::NetworkUnavailable {
                url: url.clone(),
                source: message.clone().into(),
            },
            LoginFailure::Api { code, message } => ClientError::Api {
                code: code.clone(),
                message: message.clone(),
            },
            LoginFailure::Other(reason) => ClientError::Internal(reason.clone()),
        }
    }
}

/// Shared session state. Only mutated while holding the lock.
#[derive(Default)]
struct AuthState {
    session: Option<Session>,
    /// Incremented on every successful login.
    epoch: u64,
    /// True while a login exchange is in flight.
    authenticating: bool,
    /// Set when the last finished exchange failed. Stays `None` after a
    /// success or when the owning task was cancelled.
    last_failure: Option<LoginFailure>,
}

pub struct AutologinClient<T = ReqwestTransport> {
    transport: T,
    credentials: Credentials,
    store: Box<dyn SessionStore>,
    state: Mutex<AuthState>,
    login_done: Notify,
}

impl<T: Transport> AutologinClient<T> {
    /// Create a client. Loads a persisted session if one exists; no network
    /// traffic happens until the first request.
    pub fn new(credentials: Credentials, store: Box<dyn SessionStore>, transport: T) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable persisted session");
                None
            }
        };
        debug!(
            base_url = %credentials.base_url(),
            has_session = session.is_some(),
            "Client created"
        );

        Self {
            transport,
            credentials,
            store,
            state: Mutex::new(AuthState {
                session,
                ..AuthState::default()
            }),
            login_done: Notify::new(),
        }
    }

    /// Enter a session scope: log in now unless a session is already known.
    ///
    /// Every request made through the returned client starts with a session,
    /// though it may still expire and be renewed later. Pooled connections
    /// are released when the client is dropped.
    pub async fn enter(self) -> Result<Self> {
        self.acquire_session(None).await?;
        Ok(self)
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.state().session.clone()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Drop the session from memory and from the store.
    pub fn forget_session(&self) -> Result<()> {
        self.state().session = None;
        self.store
            .clear()
            .map_err(|e| ClientError::internal(format!("failed to remove session: {:#}", e)))
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.credentials.endpoint(path)
    }

    /// Send a request with the current session attached.
    ///
    /// A 401 answer leads to one login exchange (or waiting for the one in
    /// flight) and a single resend of the request. Whatever the resend
    /// returns is handed back as is, including a second 401.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.dispatch(request).await
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::GET, self.url(path)?).query(query.iter().copied());
        self.send(request).await
    }

    /// POST without a body, for action endpoints.
    pub async fn post(&self, path: &str) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::POST, self.url(path)?);
        self.send(request).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::POST, self.url(path)?).json(body)?;
        self.send(request).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::PATCH, self.url(path)?).json(body)?;
        self.send(request).await
    }

    pub async fn delete_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        let request = HttpRequest::new(Method::DELETE, self.url(path)?).query(query.iter().copied());
        self.send(request).await
    }

    async fn dispatch(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let sent_epoch = {
            let state = self.state();
            if let Some(session) = &state.session {
                request.set_session(session)?;
            }
            state.epoch
        };

        let response = self.send_raw(request.clone()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(url = %request.url, "Unauthorized, renewing session");
        let session = self.acquire_session(Some(sent_epoch)).await?;
        request.set_session(&session)?;
        self.send_raw(request).await
    }

    async fn send_raw(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.to_string();
        debug!(method = %request.method, url = %url, "Sending request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| ClientError::NetworkUnavailable { url, source })?;

        debug!(status = %response.status, "Received response");
        Ok(response)
    }

    /// Obtain a usable session by reusing, waiting for, or performing a login.
    ///
    /// With `stale_epoch` set, the session of that epoch was rejected by the
    /// server and only a newer one may be reused. Without it, any present
    /// session is good enough.
    ///
    /// A task that waited gets the owner's error if that login failed. If the
    /// owner was cancelled instead, the waiter runs the login itself.
    async fn acquire_session(&self, stale_epoch: Option<u64>) -> Result<Session> {
        let mut waited = false;
        loop {
            // Registered before the state check so a notify_waiters() issued
            // after the lock is released cannot be missed.
            let login_done = self.login_done.notified();

            let role = {
                let mut state = self.state();
                let reusable = state
                    .session
                    .as_ref()
                    .filter(|_| stale_epoch.map_or(true, |epoch| epoch != state.epoch))
                    .cloned();
                let failed = if waited {
                    state.last_failure.as_ref().map(LoginFailure::to_error)
                } else {
                    None
                };

                if state.authenticating {
                    Role::Wait
                } else if let Some(session) = reusable {
                    Role::Reuse(session)
                } else if let Some(error) = failed {
                    return Err(error);
                } else {
                    state.authenticating = true;
                    state.session = None;
                    state.last_failure = None;
                    Role::Login
                }
            };

            match role {
                Role::Reuse(session) => return Ok(session),
                Role::Login => {
                    let mut guard = LoginGuard {
                        client: self,
                        failure: None,
                    };
                    let result = self.login().await;
                    if let Err(e) = &result {
                        guard.failure = Some(LoginFailure::from_error(e));
                    }
                    return result;
                }
                Role::Wait => {
                    debug!("Waiting for login in progress");
                    login_done.await;
                    waited = true;
                }
            }
        }
    }

    /// Exchange credentials for a new session, then keep and persist it.
    ///
    /// The login request goes straight to the transport rather than through
    /// `dispatch`, so a 401 on it is reported instead of starting another
    /// login.
    async fn login(&self) -> Result<Session> {
        let payload = LoginRequest {
            username: self.credentials.username(),
            password: self.credentials.password(),
            session_metadata: session_metadata(),
        };
        let request = HttpRequest::new(Method::POST, self.url(LOGIN_PATH)?).json(&payload)?;

        let response = self.send_raw(request).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            warn!(username = %self.credentials.username(), "Credentials rejected");
            return Err(ClientError::AuthenticationFailed);
        }

        let parsed: LoginResult = parse_result(&response).map_err(|e| match e {
            ClientError::Internal(reason) => {
                debug!(reason = %reason, "Malformed login response");
                ClientError::AuthenticationFailed
            }
            other => other,
        })?;

        let (user_id, session_token) = match (
            response.cookie(COOKIE_USER_ID),
            response.cookie(COOKIE_SESSION_ID),
        ) {
            (Some(user_id), Some(session_token)) => (user_id, session_token),
            _ => {
                debug!("Login response is missing session cookies");
                return Err(ClientError::AuthenticationFailed);
            }
        };

        let session = Session {
            user_id,
            session_token,
            display_name: parsed.display_name,
            user_name: parsed.user_name,
            is_admin: parsed.is_admin,
        };

        {
            let mut state = self.state();
            state.session = Some(session.clone());
            state.epoch += 1;
        }

        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "Failed to persist session");
        }

        info!(user = %session.user_name, "Logged in");
        Ok(session)
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks the end of a login exchange, even if the exchange failed or its
/// future was dropped, and wakes every waiting task.
struct LoginGuard<'a, T: Transport> {
    client: &'a AutologinClient<T>,
    /// Left `None` when the exchange succeeded or never finished.
    failure: Option<LoginFailure>,
}

impl<T: Transport> Drop for LoginGuard<'_, T> {
    fn drop(&mut self) {
        {
            let mut state = self.client.state();
            state.authenticating = false;
            state.last_failure = self.failure.take();
        }
        self.client.login_done.notify_waiters();
    }
}

/// Free-form description of this machine, shown by the server in the
/// user's session list.
fn session_metadata() -> String {
    let release = System::kernel_version()
        .or_else(System::os_version)
        .unwrap_or_else(|| UNKNOWN.to_string());
    [
        ("host", System::host_name().unwrap_or_else(|| UNKNOWN.to_string())),
        ("date", Local::now().format("%c").to_string()),
        ("system", system_name().to_string()),
        ("release", release),
    ]
    .iter()
    .map(|(key, value)| format!("{}={}", key, value))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Kernel name in the form the server's other clients report it.
fn system_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}
