#![allow(clippy::print_stdout, reason = "command line output")]

use crate::cli::{Args, Command, ProtocolOptions};
use anyhow::{bail, Context};
use clap::Parser;
use reqwest::header::{HeaderName, HeaderValue};
use sparql_client::{QueryResults, SparqlClient};
use std::fs;
use std::io::{stdin, Read};
use std::path::PathBuf;
use std::time::Duration;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Query {
            endpoint,
            query,
            file,
            options,
            content_type,
        } => {
            let client = build_client(&endpoint, &options)?;
            let text = operation_text(query, file)?;
            let mut request = client.query(text);
            if let Some(content_type) = content_type {
                request = request.content_type(content_type);
            }
            print_results(request.execute().await?)
        }
        Command::Update {
            endpoint,
            update,
            file,
            options,
        } => {
            let client = build_client(&endpoint, &options)?;
            let text = operation_text(update, file)?;
            client.update(text).execute().await?;
            Ok(())
        }
    }
}

fn build_client(endpoint: &str, options: &ProtocolOptions) -> anyhow::Result<SparqlClient> {
    let mut builder = SparqlClient::builder(endpoint)?
        .method(options.method.parse()?)
        .protocol(options.protocol.parse()?)
        .timeout(Duration::from_secs(options.timeout));
    for header in &options.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header '{header}' is not of the form 'Name: value'"))?;
        builder = builder.header(
            HeaderName::try_from(name.trim())
                .with_context(|| format!("Invalid header name '{name}'"))?,
            HeaderValue::try_from(value.trim())
                .with_context(|| format!("Invalid header value in '{header}'"))?,
        );
    }
    Ok(builder.build()?)
}

fn operation_text(inline: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    match (inline, file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => {
            fs::read_to_string(&path).with_context(|| format!("Could not read {}", path.display()))
        }
        (None, None) => {
            let mut text = String::new();
            stdin()
                .lock()
                .read_to_string(&mut text)
                .context("Could not read the operation from stdin")?;
            Ok(text)
        }
        (Some(_), Some(_)) => bail!("Give the operation inline or with --file, not both"),
    }
}

fn print_results(results: QueryResults) -> anyhow::Result<()> {
    match results {
        QueryResults::Boolean(value) => println!("{value}"),
        QueryResults::Solutions(rows) => {
            for row in &rows {
                let line = row
                    .iter()
                    .map(|(variable, term)| format!("{variable}={term}"))
                    .collect::<Vec<_>>()
                    .join("\t");
                println!("{line}");
            }
        }
        QueryResults::Graph(statements) => {
            for statement in statements {
                println!("{} .", statement?);
            }
        }
    }
    Ok(())
}
