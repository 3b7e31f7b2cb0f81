#![cfg(test)]
#![allow(clippy::panic, reason = "tests assert by panicking")]

use async_trait::async_trait;
use oxrdf::{NamedNode, Term};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use sparql_client::{
    HttpRequest, HttpResponse, Method, ProtocolVersion, QueryResults, SparqlClient,
    SparqlClientError, Transport, TransportError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned responses and records every request it is handed.
#[derive(Default)]
struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    fn replying(responses: impl IntoIterator<Item = HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Err(message.to_owned())])),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => panic!("transport invoked more often than expected"),
        }
    }
}

fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    if !content_type.is_empty() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
    }
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: body.as_bytes().to_vec(),
    }
}

fn client(transport: &Arc<FakeTransport>) -> SparqlClient {
    SparqlClient::builder("http://example.org/sparql")
        .unwrap()
        .transport(Arc::clone(transport))
        .build()
        .unwrap()
}

const SELECT_JSON: &str =
    r#"{"head":{"vars":["x"]},"results":{"bindings":[{"x":{"type":"uri","value":"http://ex/"}}]}}"#;

#[tokio::test]
async fn query_decodes_a_json_solution_sequence() {
    let transport = FakeTransport::replying([response(
        200,
        "application/sparql-results+json",
        SELECT_JSON,
    )]);
    let client = client(&transport);

    let QueryResults::Solutions(rows) =
        client.query("SELECT * WHERE { ?x ?p ?o }").execute().await.unwrap()
    else {
        panic!("expected solutions");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("x"),
        Some(&NamedNode::new("http://ex/").unwrap().into())
    );

    // default configuration: POST under protocol 1.0, form-encoded body
    let requests = transport.recorded();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, reqwest::Method::POST);
    assert_eq!(
        requests[0].headers.get(CONTENT_TYPE).unwrap(),
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn query_decodes_an_xml_boolean() {
    let transport = FakeTransport::replying([response(
        200,
        "application/sparql-results+xml;charset=utf-8",
        r#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><boolean>true</boolean></sparql>"#,
    )]);
    assert!(client(&transport).ask("ASK {}").await.unwrap());
}

#[tokio::test]
async fn query_decodes_a_plain_boolean_body() {
    let transport = FakeTransport::replying([response(200, "text/boolean", "false")]);
    assert!(!client(&transport).ask("ASK {}").await.unwrap());
}

#[tokio::test]
async fn content_type_override_wins_over_the_declared_type() {
    let transport = FakeTransport::replying([response(200, "text/plain", SELECT_JSON)]);
    let client = client(&transport);

    let results = client
        .query("SELECT * WHERE { ?x ?p ?o }")
        .content_type("application/sparql-results+json")
        .execute()
        .await
        .unwrap();
    assert!(matches!(results, QueryResults::Solutions(rows) if rows.len() == 1));
}

#[tokio::test]
async fn graph_responses_fall_back_to_the_format_registry() {
    let transport = FakeTransport::replying([response(
        200,
        "text/turtle",
        "<http://ex/s> <http://ex/p> <http://ex/o> .",
    )]);
    let statements: Vec<_> = client(&transport)
        .construct("CONSTRUCT WHERE { ?s ?p ?o }")
        .await
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].object,
        Term::from(NamedNode::new("http://ex/o").unwrap())
    );
}

#[tokio::test]
async fn unregistered_content_types_are_propagated_as_no_reader() {
    let transport =
        FakeTransport::replying([response(200, "application/octet-stream", "....")]);
    let err = client(&transport).query("ASK {}").execute().await.unwrap_err();
    assert!(matches!(
        err,
        SparqlClientError::Decoding(sparql_client::DecodingError::UnsupportedContentType(ct))
            if ct == "application/octet-stream"
    ));
}

#[tokio::test]
async fn the_binary_results_table_is_recognized_but_opaque() {
    let transport = FakeTransport::replying([response(
        200,
        "application/x-binary-rdf-results-table",
        "BRTR",
    )]);
    let err = client(&transport).query("ASK {}").execute().await.unwrap_err();
    assert!(matches!(
        err,
        SparqlClientError::Decoding(sparql_client::DecodingError::StoreSpecific(_))
    ));
}

#[tokio::test]
async fn http_status_codes_classify_into_the_error_taxonomy() {
    let transport = FakeTransport::replying([
        response(400, "text/plain", "bad syntax"),
        response(403, "text/plain", "forbidden"),
        response(503, "text/plain", "down"),
    ]);
    let client = client(&transport);

    let err = client.query("SELEC 1").execute().await.unwrap_err();
    assert!(matches!(err, SparqlClientError::MalformedQuery(body) if body == "bad syntax"));

    let err = client.query("ASK {}").execute().await.unwrap_err();
    assert!(matches!(err, SparqlClientError::Client { status, .. }
        if status == StatusCode::FORBIDDEN));

    let err = client.query("ASK {}").execute().await.unwrap_err();
    assert!(matches!(err, SparqlClientError::Server { status, .. }
        if status == StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn transport_failures_are_not_http_errors() {
    let transport = FakeTransport::failing("connection refused");
    let err = client(&transport).query("ASK {}").execute().await.unwrap_err();
    assert!(matches!(err, SparqlClientError::Transport(_)));
}

#[tokio::test]
async fn blank_node_identity_is_stable_within_one_client() {
    let bnode_row =
        r#"{"results":{"bindings":[{"x":{"type":"bnode","value":"b0"}}]}}"#;
    let transport = FakeTransport::replying([
        response(200, "application/sparql-results+json", bnode_row),
        response(200, "application/sparql-results+json", bnode_row),
    ]);
    let client = client(&transport);

    let first = client.select("SELECT ?x WHERE {}").await.unwrap();
    let second = client.select("SELECT ?x WHERE {}").await.unwrap();
    assert_eq!(first[0].get("x"), second[0].get("x"));

    // an independent client keeps its own table
    let other_transport = FakeTransport::replying([response(
        200,
        "application/sparql-results+json",
        bnode_row,
    )]);
    let other = self::client(&other_transport);
    let third = other.select("SELECT ?x WHERE {}").await.unwrap();
    assert_ne!(first[0].get("x"), third[0].get("x"));
}

#[tokio::test]
async fn updates_post_raw_text_under_protocol_1_1() {
    let transport = FakeTransport::replying([response(204, "", "")]);
    let client = SparqlClient::builder("http://example.org/sparql")
        .unwrap()
        .protocol(ProtocolVersion::V1_1)
        .transport(Arc::clone(&transport))
        .build()
        .unwrap();

    let update = "INSERT DATA { <http://s> <http://p> <http://o> }";
    client.update(update).execute().await.unwrap();

    let requests = transport.recorded();
    assert_eq!(
        requests[0].headers.get(CONTENT_TYPE).unwrap(),
        "application/sparql-update"
    );
    assert_eq!(requests[0].body.as_deref(), Some(update.as_bytes()));
}

#[tokio::test]
async fn failed_updates_surface_their_category() {
    let transport = FakeTransport::replying([response(500, "text/plain", "disk full")]);
    let err = client(&transport)
        .update("CLEAR ALL")
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, SparqlClientError::Server { body, .. } if body == "disk full"));
}

#[tokio::test]
async fn get_requests_carry_the_query_in_the_url() {
    let transport = FakeTransport::replying([response(200, "text/boolean", "true")]);
    let client = SparqlClient::builder("http://example.org/sparql")
        .unwrap()
        .method(Method::Get)
        .transport(Arc::clone(&transport))
        .build()
        .unwrap();

    client.ask("ASK {}").await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests[0].method, reqwest::Method::GET);
    assert!(requests[0].body.is_none());
    let query = requests[0]
        .url
        .query_pairs()
        .find(|(name, _)| name == "query")
        .map(|(_, value)| value.into_owned());
    assert_eq!(query.as_deref(), Some("ASK {}"));
}

#[tokio::test]
async fn per_call_headers_override_defaults_without_mutating_them() {
    let transport = FakeTransport::replying([
        response(200, "text/boolean", "true"),
        response(200, "text/boolean", "true"),
    ]);
    let client = client(&transport);

    client
        .query("ASK {}")
        .header(ACCEPT, HeaderValue::from_static("text/boolean"))
        .execute()
        .await
        .unwrap();
    client.query("ASK {}").execute().await.unwrap();

    let requests = transport.recorded();
    assert_eq!(requests[0].headers.get(ACCEPT).unwrap(), "text/boolean");
    let default_accept = requests[1].headers.get(ACCEPT).unwrap().to_str().unwrap();
    assert!(default_accept.starts_with("application/sparql-results+json"));
}
