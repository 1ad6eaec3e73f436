//! REST API client module for the Bondifuzz API server.
//!
//! This module provides the `AutologinClient`, which logs in on demand and
//! renews expired sessions transparently, along with the transport seam it
//! sends requests through and helpers for the server's response envelopes.

pub mod client;
pub mod error;
pub mod resources;
pub mod response;
pub mod transport;

pub use client::AutologinClient;
pub use error::{ClientError, FieldError};
pub use response::{collect_all, paginate, parse_empty, parse_result};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
