#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod client;
mod config;
mod error;
pub mod media_type;
mod request;
mod response;
mod results;
mod transport;

pub use client::{SparqlClient, SparqlClientBuilder, SparqlRequest, SparqlUpdate};
pub use config::{ClientConfig, Method, Operation, ProtocolVersion, DEFAULT_TIMEOUT};
pub use error::{ConfigurationError, DecodingError, SparqlClientError, TransportError};
pub use results::{BindingRow, GraphStatements, QueryResults};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// The RDF value model this client binds results to.
pub mod model {
    pub use oxrdf::*;
}

/// The RDF serialization format registry used for graph responses.
pub mod io {
    pub use oxrdfio::*;
}
