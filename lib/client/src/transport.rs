use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Proxy, StatusCode};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A concrete HTTP request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// `GET` or `POST`.
    pub method: reqwest::Method,
    /// The endpoint URL, with the operation merged into the query string for
    /// `GET` requests.
    pub url: Url,
    /// The merged request headers.
    pub headers: HeaderMap,
    /// The request body, absent for `GET`.
    pub body: Option<Vec<u8>>,
}

/// A complete HTTP response as handed back by a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The response status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The full response body. Responses are bounded and decoded in full.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The declared content type with any parameters stripped, if the header
    /// is present and valid.
    pub fn content_type(&self) -> Option<&str> {
        let value = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        Some(crate::media_type::strip_parameters(value))
    }

    /// The body as text, for diagnostics.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The HTTP transport collaborator: one request in, one response out.
///
/// Connection reuse, keep-alive, TLS and timeouts all live behind this seam.
/// A transport is shared across all sequential calls made through one client
/// instance.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and waits for the complete response.
    ///
    /// This is the sole suspension point of a call. Cancelling the future
    /// aborts the call here; no partial decode state escapes.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// The default [`Transport`], backed by a pooled [`reqwest::Client`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the transport for the given endpoint.
    ///
    /// Proxy configuration is resolved from the environment exactly once,
    /// here: `http_proxy` for `http` endpoints, `https_proxy` for `https`
    /// ones. An absent or empty variable means no proxy.
    pub fn new(endpoint: &Url, timeout: Duration) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        let scheme = endpoint.scheme();
        builder = match select_proxy(
            scheme,
            env::var("http_proxy").ok(),
            env::var("https_proxy").ok(),
        ) {
            Some(proxy) if scheme == "https" => builder.proxy(Proxy::https(proxy)?),
            Some(proxy) => builder.proxy(Proxy::http(proxy)?),
            None => builder.no_proxy(),
        };
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
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

fn select_proxy(
    scheme: &str,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
) -> Option<String> {
    let value = match scheme {
        "https" => https_proxy,
        _ => http_proxy,
    };
    value.filter(|proxy| !proxy.is_empty())
}
