//! Code generation modules for Kotlin sources
//!
//! This module turns the lowered [`crate::model`] types into output units:
//! one Kotlin file per top-level message, enum and service.

pub mod convert;
pub mod data_class;
pub mod enums;
pub mod oneof;
pub mod presence;
pub mod service;
pub mod writer;

use crate::model::{EnumType, FileUnit, MessageType, Service};
use crate::options::GeneratorOptions;
use crate::GeneratorError;
use writer::CodeWriter;

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Path relative to the plugin output directory
    pub path: String,
    /// Complete Kotlin source
    pub content: String,
}

/// Directory path for a Kotlin package, `a.b.c` -> `a/b/c`
pub fn package_dir(package: &str) -> String {
    package.replace('.', "/")
}

/// Output path of a file named `file_name` in `package`
pub fn output_path(package: &str, file_name: &str) -> String {
    if package.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", package_dir(package), file_name)
    }
}

/// Data class, conversions and presence accessors of one top-level message
pub fn message_unit(
    file: &FileUnit,
    message: &MessageType,
    options: &GeneratorOptions,
) -> Result<OutputUnit, GeneratorError> {
    let mut w = CodeWriter::new();
    data_class::write_declaration(&mut w, message, options)?;
    w.blank();
    convert::write_conversions(&mut w, message)?;
    presence::write_presence(&mut w, message);

    Ok(OutputUnit {
        path: output_path(&file.kotlin_package, &format!("{}.kt", message.name)),
        content: w.into_file(&file.proto_name, &file.kotlin_package, options),
    })
}

/// Enum class and its conversions
pub fn enum_unit(file: &FileUnit, enum_type: &EnumType, options: &GeneratorOptions) -> OutputUnit {
    let mut w = CodeWriter::new();
    enums::write_declaration(&mut w, enum_type);
    w.blank();
    enums::write_conversions(&mut w, enum_type);

    OutputUnit {
        path: output_path(&file.kotlin_package, &format!("{}.kt", enum_type.name)),
        content: w.into_file(&file.proto_name, &file.kotlin_package, options),
    }
}

/// Server base, client stub and partial server of one service
pub fn service_unit(
    file: &FileUnit,
    service: &Service,
    options: &GeneratorOptions,
) -> Result<OutputUnit, GeneratorError> {
    let mut w = CodeWriter::new();
    service::write_service(&mut w, service)?;

    Ok(OutputUnit {
        path: output_path(&file.kotlin_package, &format!("{}Rpc.kt", service.name)),
        content: w.into_file(&file.proto_name, &file.kotlin_package, options),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("com.ex.kdata", "Person.kt"), "com/ex/kdata/Person.kt");
        assert_eq!(output_path("", "Person.kt"), "Person.kt");
    }
}
