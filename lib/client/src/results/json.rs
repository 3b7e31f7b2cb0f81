//! Decoder for the SPARQL 1.1 Query Results JSON Format.

use crate::error::DecodingError;
use crate::results::{BindingRow, BlankNodeTable, QueryResults};
use oxrdf::{Literal, NamedNode, Term, Variable};
use serde_json::Value;

/// Decodes a JSON result document into a boolean or a solution sequence.
///
/// Row order and per-row entry order follow the document. A root that
/// carries neither `boolean` nor `results` has no interpretation and is
/// reported as [`DecodingError::NoResults`].
pub(crate) fn decode_json(
    body: &[u8],
    bnodes: &mut BlankNodeTable,
) -> Result<QueryResults, DecodingError> {
    let document: Value = serde_json::from_slice(body)?;
    let root = document
        .as_object()
        .ok_or(DecodingError::UnexpectedDocument("JSON root is not an object"))?;

    if let Some(boolean) = root.get("boolean") {
        let boolean = boolean
            .as_bool()
            .ok_or(DecodingError::UnexpectedDocument("boolean field is not a boolean"))?;
        return Ok(QueryResults::Boolean(boolean));
    }

    if let Some(results) = root.get("results") {
        let bindings = results
            .get("bindings")
            .and_then(Value::as_array)
            .ok_or(DecodingError::UnexpectedDocument("results without a bindings array"))?;
        let mut rows = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let binding = binding
                .as_object()
                .ok_or(DecodingError::UnexpectedDocument("binding is not an object"))?;
            let mut entries = Vec::with_capacity(binding.len());
            for (name, value) in binding {
                if let Some(term) = decode_term(value, bnodes)? {
                    entries.push((Variable::new(name)?, term));
                }
            }
            rows.push(BindingRow::new(entries));
        }
        return Ok(QueryResults::Solutions(rows));
    }

    Err(DecodingError::NoResults)
}

/// Decodes one tagged value record. Unknown kinds decode to `None` so that
/// rows from forward-incompatible servers are skipped, not failed.
fn decode_term(
    value: &Value,
    bnodes: &mut BlankNodeTable,
) -> Result<Option<Term>, DecodingError> {
    let record = value
        .as_object()
        .ok_or(DecodingError::UnexpectedDocument("bound value is not an object"))?;
    let kind = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodingError::UnexpectedDocument("bound value without a type"))?;
    let value = record
        .get("value")
        .and_then(Value::as_str)
        .ok_or(DecodingError::UnexpectedDocument("bound value without a value"))?;

    Ok(match kind {
        "uri" => Some(NamedNode::new(value)?.into()),
        "bnode" => Some(bnodes.resolve(value).into()),
        // "typed-literal" is the SPARQL 1.0 spelling still emitted by some
        // stores; language tag and datatype are mutually exclusive on the wire
        "literal" | "typed-literal" => {
            let literal = if let Some(language) =
                record.get("xml:lang").and_then(Value::as_str)
            {
                Literal::new_language_tagged_literal(value, language)?
            } else if let Some(datatype) = record.get("datatype").and_then(Value::as_str) {
                Literal::new_typed_literal(value, NamedNode::new(datatype)?)
            } else {
                Literal::new_simple_literal(value)
            };
            Some(literal.into())
        }
        _ => None,
    })
}
