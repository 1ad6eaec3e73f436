//! Core library for the `bondi` command line client.
//!
//! The centerpiece is [`AutologinClient`], an HTTP client for the Bondifuzz
//! API server which logs in lazily, re-authenticates once when a request is
//! answered with `401 Unauthorized`, and makes sure that concurrent tasks
//! never run more than one login exchange at a time.
//!
//! Around it live the pieces a client needs:
//!
//! - `config`: the persisted `{url, username, password}` record
//! - `auth`: credentials resolution, the `Session` type and session stores
//! - `api`: transport abstraction, the client itself, response envelope
//!   parsing, pagination and typed endpoint helpers
//! - `models`: data returned by the API server

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{AutologinClient, ClientError, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use auth::{Credentials, FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use config::AuthConfig;

/// Result type used throughout the library.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// The user agent sent with every request.
pub const USER_AGENT: &str = concat!("bondi/", env!("CARGO_PKG_VERSION"));
