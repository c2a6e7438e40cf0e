//! protoc-gen-kdata library
//!
//! This crate provides the code generation logic for turning Protocol Buffer
//! definitions into idiomatic Kotlin: data classes, sealed interfaces for
//! oneofs, conversion functions to and from the protobuf-java classes, and
//! coroutine gRPC bindings.

#![deny(warnings)]
#![deny(missing_docs)]

pub mod codegen;
pub mod generator;
pub mod model;
pub mod names;
pub mod options;
pub mod resolve;
pub mod template;
pub mod types;
pub mod well_known;

use prost::Message;
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use thiserror::Error;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Invalid plugin configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A file was handed over before one of its imports
    #[error("File {file} depends on {dependency}, which has not been resolved yet")]
    UnresolvedDependency {
        /// File being resolved
        file: String,
        /// Import that was missing from the pool
        dependency: String,
    },

    /// The descriptor set failed validation
    #[error("Invalid descriptor: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),

    /// `file_to_generate` named a file absent from `proto_file`
    #[error("Unknown file to generate: {0}")]
    UnknownFile(String),

    /// A map field whose entry type lacks the key/value pair
    #[error("Malformed map entry: {0}")]
    MalformedMapEntry(String),

    /// A oneof member that is not a singular field
    #[error("Invalid oneof member: {0}")]
    InvalidOneof(String),

    /// A transform template with more than one hole
    #[error("Invalid transform template {template:?}: {reason}")]
    InvalidTemplate {
        /// The offending template text
        template: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Failure of a whole plugin run, tagged with the stage that failed
#[derive(Error, Debug)]
pub enum PluginError {
    /// The bytes on stdin were not a CodeGeneratorRequest
    #[error("request parsing failed: {0}")]
    Request(#[from] prost::DecodeError),

    /// Generation failed for at least one file
    #[error("generation failed: {0}")]
    Generation(#[from] GeneratorError),

    /// Reading the request or writing the response failed
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate Kotlin sources from a protobuf CodeGeneratorRequest
///
/// This is the main entry point for the code generator.
pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GeneratorError> {
    generator::generate(request)
}

/// Generate Kotlin sources from the raw bytes of a CodeGeneratorRequest
///
/// Decoding and generation failures are tagged with their stage.
pub fn generate_from_bytes(bytes: &[u8]) -> Result<CodeGeneratorResponse, PluginError> {
    let request = CodeGeneratorRequest::decode(bytes)?;
    Ok(generator::generate(request)?)
}
