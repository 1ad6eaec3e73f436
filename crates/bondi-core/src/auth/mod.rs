//! Authentication module for credentials and sessions.
//!
//! This module provides:
//! - `Credentials`: immutable base URL, username and password resolved from
//!   the config file or the environment
//! - `Session`: identity and tokens obtained from a successful login
//! - `SessionStore`: persistence of the session across process invocations

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
