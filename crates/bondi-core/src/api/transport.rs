//! HTTP transport seam.
//!
//! The client talks to the server through the [`Transport`] trait so the
//! authentication protocol can be exercised without a network. Requests are
//! fully buffered, which lets the client resend one after logging in again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use crate::auth::Session;
use crate::{ClientError, Result};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cookie carrying the server-assigned user id.
pub const COOKIE_USER_ID: &str = "USER_ID";

/// Cookie carrying the session token.
pub const COOKIE_SESSION_ID: &str = "SESSION_ID";

/// Error raised by a transport when a request could not be exchanged at all.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Append query parameters to the URL.
    pub fn query<'a, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pairs = pairs.into_iter().peekable();
        if pairs.peek().is_some() {
            self.url.query_pairs_mut().extend_pairs(pairs);
        }
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| ClientError::internal(format!("failed to encode request body: {}", e)))?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Some(bytes);
        Ok(self)
    }

    /// Attach the session tokens as the request's `Cookie` header,
    /// replacing whatever cookies were attached before.
    pub fn set_session(&mut self, session: &Session) -> Result<()> {
        let cookies = format!(
            "{}={}; {}={}",
            COOKIE_USER_ID, session.user_id, COOKIE_SESSION_ID, session.session_token
        );
        let value = HeaderValue::from_str(&cookies)
            .map_err(|_| ClientError::internal("session token is not a valid header value"))?;
        self.headers.insert(header::COOKIE, value);
        Ok(())
    }

    /// Value of a cookie attached to this request.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.headers.get(header::COOKIE)?.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_json(mut self, body: &serde_json::Value) -> Self {
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = body.to_string().into_bytes();
        self
    }

    /// Add a `Set-Cookie` header. Silently skips values that are not valid
    /// header text.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_value) = HeaderValue::from_str(&format!("{}={}; HttpOnly; Path=/", name, value)) {
            self.headers.append(header::SET_COOKIE, header_value);
        }
        self
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Value of a cookie set by the server through `Set-Cookie`.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
    }
}

/// Something that can exchange one HTTP request for one response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`. Clone is cheap and shares the pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| ClientError::internal(format!("failed to build http client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "42".into(),
            session_token: "s3cr3t".into(),
            display_name: "Alice".into(),
            user_name: "alice".into(),
            is_admin: false,
        }
    }

    #[test]
    fn test_set_session_replaces_cookie_header() {
        let url = Url::parse("http://localhost/api/v1/meta").unwrap();
        let mut request = HttpRequest::new(Method::GET, url);
        request.set_session(&session()).unwrap();

        let mut newer = session();
        newer.session_token = "fresh".into();
        request.set_session(&newer).unwrap();

        assert_eq!(request.cookie(COOKIE_USER_ID).as_deref(), Some("42"));
        assert_eq!(request.cookie(COOKIE_SESSION_ID).as_deref(), Some("fresh"));
        assert_eq!(request.headers.get_all(header::COOKIE).iter().count(), 1);
    }

    #[test]
    fn test_query_appends_pairs() {
        let url = Url::parse("http://localhost/api/v1/users/1/projects").unwrap();
        let request = HttpRequest::new(Method::GET, url).query([("pg_num", "2"), ("name", "a b")]);
        assert_eq!(request.url.query(), Some("pg_num=2&name=a+b"));

        let url = Url::parse("http://localhost/x").unwrap();
        let no_pairs: [(&str, &str); 0] = [];
        let request = HttpRequest::new(Method::GET, url).query(no_pairs);
        assert_eq!(request.url.query(), None);
    }

    #[test]
    fn test_response_cookie_parsing() {
        let response = HttpResponse::new(StatusCode::OK)
            .with_cookie(COOKIE_USER_ID, "7")
            .with_cookie(COOKIE_SESSION_ID, "abc");
        assert_eq!(response.cookie(COOKIE_USER_ID).as_deref(), Some("7"));
        assert_eq!(response.cookie(COOKIE_SESSION_ID).as_deref(), Some("abc"));
        assert_eq!(response.cookie("OTHER"), None);
    }
}
