//! Exchange types for one round trip with a remote CRUD endpoint.
//!
//! An [`Exchange`] is what a transport hands back once a request finishes:
//! the request as sent, the response head (if one arrived), the raw body and
//! the error (if any). The same value rides along in Save/Fetch/Delete
//! notifications and is passed to completion callbacks.

use crate::{Error, PropertyMap, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// HTTP verb used by the sync orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The canonical upper-case verb.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether parameters travel in the query string rather than the body.
    #[must_use]
    pub const fn uses_query(&self) -> bool {
        matches!(self, Method::Get | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

/// How request parameters are encoded for body-carrying methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// `application/json` body.
    #[default]
    Json,
    /// `application/x-www-form-urlencoded` body.
    Url,
}

/// An outgoing request, built by the orchestrator and annotated by the
/// authenticate hook before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub url: String,
    /// Parameters: query string for GET/DELETE, body for POST/PUT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<PropertyMap>,
    pub encoding: Encoding,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Request {
    /// Creates a request with no parameters and no headers.
    pub fn new(method: Method, url: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            method,
            url: url.into(),
            params: None,
            encoding,
            headers: BTreeMap::new(),
        }
    }

    /// Sets the request parameters.
    pub fn with_params(mut self, params: PropertyMap) -> Self {
        self.params = Some(params);
        self
    }

    /// Adds or replaces a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }
}

/// The head of a response that did arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Response {
    /// A response with the given status and no headers.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure attached to an exchange. Never raised; surfaced only through
/// notifications and completion callbacks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExchangeError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("remote returned status {status}")]
    Status { status: u16, body: Option<String> },

    /// The response was received but the local store could not commit it.
    #[error("storage error: {0}")]
    Storage(String),
}

/// One completed request/response round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub request: Request,
    pub response: Option<Response>,
    /// Raw response body, if any was read.
    pub body: Option<String>,
    pub error: Option<ExchangeError>,
}

impl Exchange {
    /// A successful exchange.
    pub fn success(request: Request, response: Response, body: Option<String>) -> Self {
        Self {
            request,
            response: Some(response),
            body,
            error: None,
        }
    }

    /// A request that was resolved locally and never sent. It has no response
    /// and counts as successful.
    pub fn local(request: Request) -> Self {
        Self {
            request,
            response: None,
            body: None,
            error: None,
        }
    }

    /// A failed exchange.
    pub fn failure(request: Request, response: Option<Response>, error: ExchangeError) -> Self {
        Self {
            request,
            response,
            body: None,
            error: Some(error),
        }
    }

    /// Whether the exchange completed without error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Parses the raw body into a generic value tree.
    ///
    /// Empty bodies and undecodable bodies both yield `None`; the latter is
    /// logged.
    pub fn parsed_body(&self) -> Option<Value> {
        let body = self.body.as_deref()?.trim();
        if body.is_empty() {
            return None;
        }
        match serde_json::from_str(body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("undecodable response body from {}: {e}", self.request.url);
                None
            }
        }
    }
}
