use crate::error::SparqlClientError;
use crate::transport::HttpResponse;
use reqwest::StatusCode;

/// Sorts a completed HTTP exchange into the protocol's outcome categories.
///
/// Successful responses pass through for decoding; everything else becomes
/// an error carrying the response body verbatim as diagnostic text. 1xx and
/// 3xx responses are not legitimate outcomes of a completed SPARQL Protocol
/// request and are reported as client errors with the raw status attached.
pub(crate) fn classify(response: HttpResponse) -> Result<HttpResponse, SparqlClientError> {
    if response.status.is_success() {
        return Ok(response);
    }
    let body = response.body_text();
    Err(match response.status {
        StatusCode::BAD_REQUEST => SparqlClientError::MalformedQuery(body),
        status if status.is_server_error() => SparqlClientError::Server { status, body },
        status => SparqlClientError::Client { status, body },
    })
}
