//! Decoded SPARQL results: booleans, solution sequences and RDF graphs.

mod json;
mod xml;

pub(crate) use json::decode_json;
pub(crate) use xml::decode_xml;

use crate::error::DecodingError;
use oxrdf::{BlankNode, Term, Triple, Variable};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser, ReaderQuadParser};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

/// The decoded payload of a successful request.
pub enum QueryResults {
    /// The answer to an ASK query.
    Boolean(bool),
    /// The solution sequence of a SELECT query, in the server's row order.
    Solutions(Vec<BindingRow>),
    /// The statements of a DESCRIBE or CONSTRUCT response, decoded lazily
    /// through the RDF format registry.
    Graph(GraphStatements),
}

// manual impl: the graph variant wraps a parser without a Debug form
impl fmt::Debug for QueryResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => f.debug_tuple("Boolean").field(value).finish(),
            Self::Solutions(rows) => f.debug_tuple("Solutions").field(rows).finish(),
            Self::Graph(_) => f.write_str("Graph(..)"),
        }
    }
}

impl QueryResults {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Solutions(_) => "solution",
            Self::Graph(_) => "graph",
        }
    }
}

/// One solution: an ordered mapping from query variables to RDF terms.
///
/// Unbound variables are simply absent. The entry order is the document
/// order of the response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingRow {
    entries: Vec<(Variable, Term)>,
}

impl BindingRow {
    pub(crate) fn new(entries: Vec<(Variable, Term)>) -> Self {
        Self { entries }
    }

    /// The term bound to the given variable, if any.
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.entries
            .iter()
            .find(|(v, _)| v.as_str() == variable)
            .map(|(_, term)| term)
    }

    /// The variables bound in this row, in document order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter().map(|(variable, _)| variable)
    }

    /// Iterates over the bound `(variable, term)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.entries.iter().map(|(variable, term)| (variable, term))
    }

    /// The number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable is bound in this row.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a BindingRow {
    type Item = &'a (Variable, Term);
    type IntoIter = std::slice::Iter<'a, (Variable, Term)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Maps wire-level blank node labels to stable node identities.
///
/// The table is owned by one client and lives exactly as long as it: the
/// same label always resolves to the same identity within a client's
/// lifetime, distinct labels never alias, and entries are never pruned.
/// Two independent clients resolve the same label to unrelated identities.
#[derive(Debug, Default)]
pub struct BlankNodeTable {
    nodes: HashMap<String, BlankNode>,
}

impl BlankNodeTable {
    /// Resolves a label, creating and storing a fresh identity on first
    /// sight.
    pub(crate) fn resolve(&mut self, label: &str) -> BlankNode {
        self.nodes
            .entry(label.to_owned())
            .or_insert_with(BlankNode::default)
            .clone()
    }
}

/// A lazy sequence of RDF statements decoded from a graph response.
///
/// Produced by the RDF format registry for any negotiated content type that
/// is not a SPARQL result format. Graph names are discarded: a SPARQL
/// protocol response describes a single graph.
pub struct GraphStatements {
    inner: ReaderQuadParser<Cursor<Vec<u8>>>,
}

impl GraphStatements {
    pub(crate) fn new(format: RdfFormat, body: Vec<u8>) -> Self {
        Self {
            inner: RdfParser::from_format(format).for_reader(Cursor::new(body)),
        }
    }
}

impl Iterator for GraphStatements {
    type Item = Result<Triple, RdfParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.map(Triple::from))
    }
}

/// Decodes a `text/boolean` body.
pub(crate) fn decode_boolean(body: &[u8]) -> Result<bool, DecodingError> {
    match String::from_utf8_lossy(body).trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodingError::InvalidBoolean(other.to_owned())),
    }
}
