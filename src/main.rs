//! protoc-gen-kdata - A protoc plugin for generating idiomatic Kotlin
//!
//! This binary reads a CodeGeneratorRequest from stdin and writes a
//! CodeGeneratorResponse to stdout, following the protoc plugin protocol.
//! Nothing is written to stdout unless generation succeeded.

use prost::Message;
use protoc_gen_kdata::PluginError;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        tracing::error!(error = %e, "plugin run failed");
        eprintln!("protoc-gen-kdata: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the plugin response
fn init_tracing() {
    let filter = EnvFilter::try_from_env("KDATA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), PluginError> {
    // The whole request is read before anything is generated
    let mut buf = Vec::new();
    io::stdin().read_to_end(&mut buf)?;
    tracing::debug!(bytes = buf.len(), "read CodeGeneratorRequest");

    let response = protoc_gen_kdata::generate_from_bytes(&buf)?;

    for f in &response.file {
        tracing::debug!(name = f.name.as_deref().unwrap_or("<unnamed>"), "generated");
    }

    // The response is fully buffered before it is written
    let mut out = Vec::new();
    response
        .encode(&mut out)
        .map_err(|e| PluginError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
    io::stdout().write_all(&out)?;
    io::stdout().flush()?;

    Ok(())
}
