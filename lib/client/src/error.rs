use oxrdf::{IriParseError, LanguageTagParseError, VariableNameParseError};
use reqwest::StatusCode;
use std::error::Error;

/// An error raised while executing a request against a SPARQL endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SparqlClientError {
    /// The endpoint rejected the query or update text itself (HTTP 400).
    #[error("the endpoint rejected the operation: {0}")]
    MalformedQuery(String),
    /// The endpoint rejected the request for another reason (other 4xx).
    ///
    /// Responses outside the 2xx/4xx/5xx classes also end up here since the
    /// SPARQL Protocol defines no other legitimate outcome for a completed
    /// request.
    #[error("client error ({status}): {body}")]
    Client {
        /// The HTTP status code of the response.
        status: StatusCode,
        /// The response body, verbatim, as diagnostic text.
        body: String,
    },
    /// The endpoint failed while evaluating the request (5xx).
    #[error("server error ({status}): {body}")]
    Server {
        /// The HTTP status code of the response.
        status: StatusCode,
        /// The response body, verbatim, as diagnostic text.
        body: String,
    },
    /// The client was configured with invalid values. Detected before any
    /// network call.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The response body did not match the structure expected for its
    /// content type.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
    /// A connection-level failure. This is not an HTTP response at all and is
    /// propagated from the transport essentially unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// An invalid local configuration value, reported before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The request method is neither `GET` nor `POST`.
    #[error("invalid request method '{0}', expected GET or POST")]
    InvalidMethod(String),
    /// The protocol version is neither `1.0` nor `1.1`.
    #[error("invalid protocol version '{0}', expected 1.0 or 1.1")]
    InvalidProtocol(String),
    /// The endpoint is not an absolute URL.
    #[error("invalid endpoint URL '{url}': {source}")]
    InvalidEndpoint {
        /// The rejected URL text.
        url: String,
        /// The parsing error.
        #[source]
        source: url::ParseError,
    },
    /// A header value contains bytes that are not legal in HTTP headers.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
}

/// An error raised while decoding a response body.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    /// The response body is not well-formed JSON.
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The response body is not well-formed XML.
    #[error("response is not valid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// An XML attribute could not be decoded.
    #[error("response contains an invalid XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    /// A bound value declares an IRI that does not parse.
    #[error("invalid IRI in response: {0}")]
    Iri(#[from] IriParseError),
    /// A literal declares a language tag that does not parse.
    #[error("invalid language tag in response: {0}")]
    LanguageTag(#[from] LanguageTagParseError),
    /// A binding refers to a variable with an invalid name.
    #[error("invalid variable name in response: {0}")]
    Variable(#[from] VariableNameParseError),
    /// The document is well-formed but not shaped like a SPARQL result.
    #[error("unexpected document structure: {0}")]
    UnexpectedDocument(&'static str),
    /// The document carries neither a `boolean` nor a `results` field.
    #[error("response declares neither a boolean nor a results field")]
    NoResults,
    /// A `text/boolean` body is neither `true` nor `false`.
    #[error("boolean response body is neither 'true' nor 'false': '{0}'")]
    InvalidBoolean(String),
    /// A typed entry point received a result of a different shape.
    #[error("expected {expected} results but the endpoint returned {actual} results")]
    UnexpectedKind {
        /// The result shape the caller asked for.
        expected: &'static str,
        /// The result shape the endpoint answered with.
        actual: &'static str,
    },
    /// No decoder is registered for the negotiated content type.
    #[error("no decoder registered for content type '{0}'")]
    UnsupportedContentType(String),
    /// The content type names a store-specific binary result format that this
    /// client recognizes but does not decode.
    #[error("'{0}' is a store-specific binary result format that this client does not decode")]
    StoreSpecific(String),
}

/// A connection-level failure raised by the transport: connection refused,
/// TLS failure, DNS failure, timeout.
///
/// Distinct from the HTTP-status-derived categories of
/// [`SparqlClientError`]: no response was received at all.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(Box<dyn Error + Send + Sync>);

impl TransportError {
    /// Wraps an arbitrary transport failure.
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self(error.into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error)
    }
}
