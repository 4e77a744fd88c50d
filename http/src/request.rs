//! Transport-agnostic request and response values.
//!
//! A [`Transport`] turns an [`ApiRequest`] into an [`ApiResponse`]. The plain
//! [`AjaxClient`](crate::AjaxClient) sends it over the network; the
//! [`SecuredClient`](crate::SecuredClient) wraps another transport and adds
//! bearer authentication. [`RequestMethods`] provides the per-verb helpers on
//! top of any transport.

use crate::error::{HttpError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub use reqwest::Method;

/// A request description, independent of how it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute url, or a path resolved against the transport's base url
    pub url: String,
    /// Header pairs in the order they are sent; names are unique ignoring case
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Per-request timeout, overriding the transport default
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request without headers or body
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Set a header, replacing any header of the same name
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => *slot = (name, value),
            None => self.headers.push((name, value)),
        }
        self
    }

    /// Apply several headers in order
    #[must_use]
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Set the JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value by case-insensitive name
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A successful (status below 400) response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Deserialize the body as JSON
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

/// Something that can execute an [`ApiRequest`]
pub trait Transport: Send + Sync {
    /// Send the request and wait for the response
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] for responses with status 400 or above,
    /// and the other [`HttpError`] variants when no response was obtained.
    fn execute(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse>> + Send;
}

/// Per-verb request helpers, available on every [`Transport`]
///
/// ```ignore
/// let page = client.get("/pokemon?offset=0&limit=10").await?.json::<PokemonPage>()?;
/// ```
pub trait RequestMethods: Transport {
    /// `GET url`
    fn get(&self, url: &str) -> impl Future<Output = Result<ApiResponse>> + Send {
        self.execute(ApiRequest::new(Method::GET, url))
    }

    /// `POST url` with a JSON body
    fn post(&self, url: &str, body: Value) -> impl Future<Output = Result<ApiResponse>> + Send {
        self.execute(ApiRequest::new(Method::POST, url).json(body))
    }

    /// `PUT url` with a JSON body
    fn put(&self, url: &str, body: Value) -> impl Future<Output = Result<ApiResponse>> + Send {
        self.execute(ApiRequest::new(Method::PUT, url).json(body))
    }

    /// `PATCH url` with a JSON body
    fn patch(&self, url: &str, body: Value) -> impl Future<Output = Result<ApiResponse>> + Send {
        self.execute(ApiRequest::new(Method::PATCH, url).json(body))
    }

    /// `DELETE url`
    fn delete(&self, url: &str) -> impl Future<Output = Result<ApiResponse>> + Send {
        self.execute(ApiRequest::new(Method::DELETE, url))
    }
}

impl<T: Transport + ?Sized> RequestMethods for T {}
