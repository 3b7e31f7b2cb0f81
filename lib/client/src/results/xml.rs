//! Decoder for the SPARQL Query Results XML Format.

use crate::error::DecodingError;
use crate::results::{BindingRow, BlankNodeTable, QueryResults};
use oxrdf::{Literal, NamedNode, Term, Variable};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Which value element the cursor is inside of.
enum TermKind {
    Uri,
    BNode,
    Literal {
        datatype: Option<String>,
        language: Option<String>,
    },
}

/// Decodes an XML result document in a single pass over the event stream.
///
/// Produces the same logical results as the JSON decoder for the same
/// result set: booleans short-circuit, rows and their entries keep document
/// order, and a document without `<boolean>` or `<results>` is reported as
/// [`DecodingError::NoResults`].
pub(crate) fn decode_xml(
    body: &[u8],
    bnodes: &mut BlankNodeTable,
) -> Result<QueryResults, DecodingError> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text(true);

    let mut saw_results = false;
    let mut rows: Vec<BindingRow> = Vec::new();
    let mut row: Option<Vec<(Variable, Term)>> = None;
    let mut binding: Option<Variable> = None;
    let mut term: Option<TermKind> = None;
    let mut text = String::new();
    let mut in_boolean = false;
    let mut boolean: Option<bool> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"results" => saw_results = true,
                b"result" => row = Some(Vec::new()),
                b"binding" => binding = Some(binding_variable(&e)?),
                b"boolean" => {
                    in_boolean = true;
                    text.clear();
                }
                b"uri" => {
                    term = Some(TermKind::Uri);
                    text.clear();
                }
                b"bnode" => {
                    term = Some(TermKind::BNode);
                    text.clear();
                }
                b"literal" => {
                    term = Some(literal_kind(&e)?);
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"results" => saw_results = true,
                b"result" => rows.push(BindingRow::default()),
                b"uri" | b"bnode" => {
                    return Err(DecodingError::UnexpectedDocument(
                        "empty uri or bnode element in a binding",
                    ))
                }
                // an empty literal element binds the empty string
                b"literal" => {
                    if let (Some(variable), Some(row)) = (binding.clone(), row.as_mut()) {
                        let kind = literal_kind(&e)?;
                        row.push((variable, finish_term(kind, "", bnodes)?));
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if term.is_some() || in_boolean {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"result" => rows.push(BindingRow::new(row.take().unwrap_or_default())),
                b"binding" => binding = None,
                b"boolean" => {
                    in_boolean = false;
                    boolean = Some(match text.trim() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        other => return Err(DecodingError::InvalidBoolean(other.to_owned())),
                    });
                }
                b"uri" | b"bnode" | b"literal" => {
                    if let Some(kind) = term.take() {
                        if let (Some(variable), Some(row)) = (binding.clone(), row.as_mut()) {
                            row.push((variable, finish_term(kind, &text, bnodes)?));
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(boolean) = boolean {
        Ok(QueryResults::Boolean(boolean))
    } else if saw_results {
        Ok(QueryResults::Solutions(rows))
    } else {
        Err(DecodingError::NoResults)
    }
}

fn binding_variable(element: &BytesStart<'_>) -> Result<Variable, DecodingError> {
    for attribute in element.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == b"name" {
            return Ok(Variable::new(attribute.unescape_value()?.as_ref())?);
        }
    }
    Err(DecodingError::UnexpectedDocument(
        "binding element without a name attribute",
    ))
}

fn literal_kind(element: &BytesStart<'_>) -> Result<TermKind, DecodingError> {
    let mut datatype = None;
    let mut language = None;
    for attribute in element.attributes() {
        let attribute = attribute?;
        match attribute.key.as_ref() {
            b"datatype" => datatype = Some(attribute.unescape_value()?.into_owned()),
            b"xml:lang" => language = Some(attribute.unescape_value()?.into_owned()),
            _ => {}
        }
    }
    Ok(TermKind::Literal { datatype, language })
}

fn finish_term(
    kind: TermKind,
    text: &str,
    bnodes: &mut BlankNodeTable,
) -> Result<Term, DecodingError> {
    Ok(match kind {
        TermKind::Uri => NamedNode::new(text)?.into(),
        TermKind::BNode => bnodes.resolve(text).into(),
        TermKind::Literal { language, datatype } => {
            if let Some(language) = language {
                Literal::new_language_tagged_literal(text, language)?.into()
            } else if let Some(datatype) = datatype {
                Literal::new_typed_literal(text, NamedNode::new(datatype)?).into()
            } else {
                Literal::new_simple_literal(text).into()
            }
        }
    })
}
