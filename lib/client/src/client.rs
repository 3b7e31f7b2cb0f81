use crate::config::{ClientConfig, Method, Operation, ProtocolVersion};
use crate::error::{ConfigurationError, DecodingError, SparqlClientError};
use crate::media_type;
use crate::request::build_request;
use crate::response::classify;
use crate::results::{decode_boolean, decode_json, decode_xml, BindingRow, BlankNodeTable};
use crate::results::{GraphStatements, QueryResults};
use crate::transport::{ReqwestTransport, Transport};
use oxrdfio::RdfFormat;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A client for one SPARQL Protocol endpoint.
///
/// The endpoint and configuration are immutable after construction. The
/// transport and the blank node identity table are shared across all calls
/// made through the client; calls are expected to run one after another, a
/// call's full lifecycle completes before the next one starts.
///
/// ```no_run
/// use sparql_client::{QueryResults, SparqlClient};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), sparql_client::SparqlClientError> {
/// let client = SparqlClient::new("https://example.org/sparql")?;
/// if let QueryResults::Solutions(rows) =
///     client.query("SELECT * WHERE { ?s ?p ?o } LIMIT 10").execute().await?
/// {
///     for row in &rows {
///         println!("{:?}", row.get("s"));
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct SparqlClient {
    endpoint: Url,
    config: ClientConfig,
    transport: Box<dyn Transport>,
    bnodes: Mutex<BlankNodeTable>,
}

impl SparqlClient {
    /// Creates a client with the default configuration: `POST`, protocol
    /// `1.0`, 60 second timeout.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, SparqlClientError> {
        Self::builder(endpoint)?.build()
    }

    /// Starts configuring a client for the given endpoint.
    ///
    /// The endpoint must be an absolute URL; embedded user-info turns into
    /// HTTP Basic authentication on every request.
    pub fn builder(endpoint: impl AsRef<str>) -> Result<SparqlClientBuilder, SparqlClientError> {
        let endpoint = endpoint.as_ref();
        let endpoint = Url::parse(endpoint).map_err(|source| {
            ConfigurationError::InvalidEndpoint {
                url: endpoint.to_owned(),
                source,
            }
        })?;
        Ok(SparqlClientBuilder {
            endpoint,
            config: ClientConfig::default(),
            transport: None,
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Prepares a query for execution. Options set on the returned value are
    /// scoped to this one call.
    pub fn query(&self, query: impl Into<String>) -> SparqlRequest<'_> {
        SparqlRequest {
            client: self,
            text: query.into(),
            operation: Operation::Query,
            headers: HeaderMap::new(),
            content_type: None,
        }
    }

    /// Prepares an update for execution. Updates have no result payload
    /// beyond success or failure.
    pub fn update(&self, update: impl Into<String>) -> SparqlUpdate<'_> {
        SparqlUpdate(SparqlRequest {
            client: self,
            text: update.into(),
            operation: Operation::Update,
            headers: HeaderMap::new(),
            content_type: None,
        })
    }

    /// Runs an ASK query and returns its boolean answer.
    pub async fn ask(&self, query: impl Into<String>) -> Result<bool, SparqlClientError> {
        match self.query(query).execute().await? {
            QueryResults::Boolean(value) => Ok(value),
            other => Err(unexpected_kind("boolean", &other)),
        }
    }

    /// Runs a SELECT query and returns its solution sequence.
    pub async fn select(
        &self,
        query: impl Into<String>,
    ) -> Result<Vec<BindingRow>, SparqlClientError> {
        match self.query(query).execute().await? {
            QueryResults::Solutions(rows) => Ok(rows),
            other => Err(unexpected_kind("solution", &other)),
        }
    }

    /// Runs a CONSTRUCT or DESCRIBE query and returns the decoded statements.
    pub async fn construct(
        &self,
        query: impl Into<String>,
    ) -> Result<GraphStatements, SparqlClientError> {
        match self.query(query).execute().await? {
            QueryResults::Graph(statements) => Ok(statements),
            other => Err(unexpected_kind("graph", &other)),
        }
    }

    async fn run(&self, call: SparqlRequest<'_>) -> Result<QueryResults, SparqlClientError> {
        // a call-scoped override wins over the response's declared type
        let override_type = call.content_type.clone();
        let response = self.exchange(call).await?;
        let content_type = match override_type {
            Some(content_type) => media_type::strip_parameters(&content_type).to_owned(),
            None => response.content_type().unwrap_or_default().to_owned(),
        };
        self.decode(&content_type, response.body)
    }

    /// Builds, sends and classifies one request: the shared front half of
    /// the query and update paths.
    async fn exchange(
        &self,
        call: SparqlRequest<'_>,
    ) -> Result<crate::transport::HttpResponse, SparqlClientError> {
        let request = build_request(
            &self.endpoint,
            &call.text,
            call.operation,
            &self.config,
            &call.headers,
        )?;
        debug!(method = %request.method, url = %request.url, "sending SPARQL protocol request");

        let response = self.transport.send(request).await?;
        debug!(status = %response.status, "received endpoint response");
        classify(response)
    }

    fn decode(
        &self,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<QueryResults, SparqlClientError> {
        debug!(content_type, "decoding response body");
        let mut bnodes = self.bnodes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(match content_type {
            media_type::SPARQL_RESULTS_JSON => decode_json(&body, &mut bnodes)?,
            media_type::SPARQL_RESULTS_XML => decode_xml(&body, &mut bnodes)?,
            media_type::BOOLEAN_RESULT => QueryResults::Boolean(decode_boolean(&body)?),
            media_type::BINARY_RESULTS_TABLE => {
                return Err(DecodingError::StoreSpecific(content_type.to_owned()).into())
            }
            other => match RdfFormat::from_media_type(other) {
                Some(format) => QueryResults::Graph(GraphStatements::new(format, body)),
                None => {
                    return Err(DecodingError::UnsupportedContentType(other.to_owned()).into())
                }
            },
        })
    }
}

fn unexpected_kind(expected: &'static str, actual: &QueryResults) -> SparqlClientError {
    DecodingError::UnexpectedKind {
        expected,
        actual: actual.kind(),
    }
    .into()
}

/// Configures and builds a [`SparqlClient`].
pub struct SparqlClientBuilder {
    endpoint: Url,
    config: ClientConfig,
    transport: Option<Box<dyn Transport>>,
}

impl SparqlClientBuilder {
    /// Sets the request method. `POST` by default.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Sets the protocol version. `1.0` by default.
    #[must_use]
    pub fn protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Sets a default header sent with every request. Replaces any default
    /// with the same name, including `Accept`.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Bounds the transport wait. 60 seconds by default.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replaces the HTTP transport, mostly useful for tests.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Builds the client. Without an explicit transport this constructs a
    /// [`ReqwestTransport`], resolving proxy configuration from the
    /// environment exactly once.
    pub fn build(self) -> Result<SparqlClient, SparqlClientError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new(&self.endpoint, self.config.timeout)?),
        };
        Ok(SparqlClient {
            endpoint: self.endpoint,
            config: self.config,
            transport,
            bnodes: Mutex::new(BlankNodeTable::default()),
        })
    }
}

/// One pending query, bound to the client that created it.
///
/// Dropping the request without calling [`execute`](Self::execute) sends
/// nothing.
pub struct SparqlRequest<'a> {
    client: &'a SparqlClient,
    text: String,
    operation: Operation,
    headers: HeaderMap,
    content_type: Option<String>,
}

impl SparqlRequest<'_> {
    /// Adds a header for this call only. Overrides win over the client's
    /// default headers on name collisions.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Forces the decoder selection for this call, ignoring the content type
    /// the response declares.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sends the request and decodes the response.
    pub async fn execute(self) -> Result<QueryResults, SparqlClientError> {
        self.client.run(self).await
    }
}

/// One pending update, bound to the client that created it.
pub struct SparqlUpdate<'a>(SparqlRequest<'a>);

impl SparqlUpdate<'_> {
    /// Adds a header for this call only.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.0 = self.0.header(name, value);
        self
    }

    /// Sends the update. The response payload, if any, is discarded; only
    /// the success or error outcome is reported.
    pub async fn execute(self) -> Result<(), SparqlClientError> {
        let client = self.0.client;
        client.exchange(self.0).await.map(|_| ())
    }
}
