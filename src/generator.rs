//! Main generator logic for protoc-gen-kdata
//!
//! Resolves every file of the request in dependency order, then emits the
//! Kotlin units of each file named in `file_to_generate`. Any failure aborts
//! the whole run; a partial response is never produced.

use crate::codegen::{self, OutputUnit};
use crate::model::FileUnit;
use crate::options::GeneratorOptions;
use crate::resolve::Resolver;
use crate::GeneratorError;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};

/// Generate Kotlin sources from a CodeGeneratorRequest
pub fn generate(request: CodeGeneratorRequest) -> Result<CodeGeneratorResponse, GeneratorError> {
    let options = GeneratorOptions::parse(request.parameter.as_deref())?;
    tracing::debug!(?options, "parsed plugin parameters");

    let resolver = Resolver::new(&request.proto_file, &options)?;

    let mut files = Vec::new();
    for name in &request.file_to_generate {
        let Some(unit) = resolver.file_unit(name)? else {
            continue;
        };
        for output in file_units(&unit, &options)? {
            tracing::debug!(path = %output.path, "generated unit");
            files.push(File {
                name: Some(output.path),
                content: Some(output.content),
                ..Default::default()
            });
        }
    }

    tracing::info!(files = files.len(), "generation finished");

    Ok(CodeGeneratorResponse {
        file: files,
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    })
}

/// All output units of one lowered file, in declaration order
pub fn file_units(
    file: &FileUnit,
    options: &GeneratorOptions,
) -> Result<Vec<OutputUnit>, GeneratorError> {
    let mut units = Vec::new();

    for message in &file.messages {
        units.push(codegen::message_unit(file, message, options)?);
    }
    for enum_type in &file.enums {
        units.push(codegen::enum_unit(file, enum_type, options));
    }
    if options.services {
        for service in &file.services {
            units.push(codegen::service_unit(file, service, options)?);
        }
    } else if !file.services.is_empty() {
        tracing::debug!(file = %file.proto_name, "services disabled, skipping");
    }

    Ok(units)
}
