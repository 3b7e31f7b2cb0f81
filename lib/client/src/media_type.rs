//! The closed set of media types this client negotiates.

use oxrdfio::RdfFormat;

/// SPARQL 1.1 Query Results JSON Format.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
/// SPARQL Query Results XML Format.
pub const SPARQL_RESULTS_XML: &str = "application/sparql-results+xml";
/// Plain boolean results, as produced by some stores for ASK queries.
pub const BOOLEAN_RESULT: &str = "text/boolean";
/// A store-specific binary encoding of a result table. Recognized during
/// negotiation but never decoded.
pub const BINARY_RESULTS_TABLE: &str = "application/x-binary-rdf-results-table";

/// Request body type for queries under SPARQL Protocol 1.1 direct POST.
pub const SPARQL_QUERY: &str = "application/sparql-query";
/// Request body type for updates under SPARQL Protocol 1.1 direct POST.
pub const SPARQL_UPDATE: &str = "application/sparql-update";
/// Request body type for SPARQL Protocol 1.0 POST.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Every RDF serialization the format registry can read. Graph responses
/// (DESCRIBE, CONSTRUCT) are negotiated against this set.
pub const RDF_FORMATS: [RdfFormat; 6] = [
    RdfFormat::Turtle,
    RdfFormat::NTriples,
    RdfFormat::NQuads,
    RdfFormat::TriG,
    RdfFormat::N3,
    RdfFormat::RdfXml,
];

/// The default `Accept` value: result formats first, then every RDF
/// serialization known to the registry.
pub fn default_accept() -> String {
    let mut types = vec![
        SPARQL_RESULTS_JSON,
        SPARQL_RESULTS_XML,
        BOOLEAN_RESULT,
        BINARY_RESULTS_TABLE,
    ];
    types.extend(RDF_FORMATS.iter().map(|format| format.media_type()));
    types.join(", ")
}

/// Strips media type parameters such as `;charset=utf-8`, which endpoints
/// routinely append to the declared content type.
pub(crate) fn strip_parameters(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}
