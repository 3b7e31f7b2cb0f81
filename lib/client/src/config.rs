use crate::error::ConfigurationError;
use crate::media_type;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How long the client waits for the endpoint before giving up.
///
/// The transport wait is the only blocking point of a call, so this bound is
/// also the bound on the whole call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The HTTP request method used to submit operations.
///
/// The SPARQL Protocol defines exactly two; anything else is a
/// [`ConfigurationError`] at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Submit the operation as a `query` URL parameter.
    Get,
    /// Submit the operation in the request body.
    #[default]
    Post,
}

impl FromStr for Method {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(ConfigurationError::InvalidMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// The SPARQL Protocol version, which decides how a POST body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// SPARQL Protocol 1.0: form-encoded `query=<text>` bodies.
    #[default]
    V1_0,
    /// SPARQL Protocol 1.1: raw operation text with a dedicated content type.
    V1_1,
}

impl FromStr for ProtocolVersion {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(Self::V1_0),
            "1.1" => Ok(Self::V1_1),
            _ => Err(ConfigurationError::InvalidProtocol(s.to_owned())),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        })
    }
}

/// Whether the pending request carries a query or an update.
///
/// Only used to choose the `Content-Type` of a protocol 1.1 POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// SELECT, ASK, DESCRIBE or CONSTRUCT text.
    Query,
    /// INSERT DATA, DELETE DATA, CLEAR and friends.
    Update,
}

impl Operation {
    /// The protocol 1.1 direct POST content type for this operation kind.
    pub(crate) fn content_type(self) -> &'static str {
        match self {
            Self::Query => media_type::SPARQL_QUERY,
            Self::Update => media_type::SPARQL_UPDATE,
        }
    }
}

/// The immutable configuration of a [`SparqlClient`](crate::SparqlClient).
///
/// Per-call header overrides never mutate it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The request method, `POST` by default.
    pub method: Method,
    /// The protocol version, `1.0` by default.
    pub protocol: ProtocolVersion,
    /// Default headers attached to every request. Always contains `Accept`.
    pub headers: HeaderMap,
    /// Bound on the transport wait.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&media_type::default_accept())
            .unwrap_or(HeaderValue::from_static(media_type::SPARQL_RESULTS_JSON));
        headers.insert(ACCEPT, accept);
        Self {
            method: Method::default(),
            protocol: ProtocolVersion::default(),
            headers,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
