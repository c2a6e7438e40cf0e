//! Value type declarations
//!
//! A message becomes a `data class` whose constructor holds one property per
//! plain field and one nullable property per real oneof. Nested messages,
//! enums and oneof sum types live in the class body.

use super::enums;
use super::oneof;
use super::writer::CodeWriter;
use crate::model::MessageType;
use crate::options::GeneratorOptions;
use crate::types::{map_field, Import, TO_IDIOMATIC_FN};
use crate::GeneratorError;

/// Runtime adapter wrapping a host parser
pub const PARSER_ADAPTER_FN: &str = "asDataClassParser";

/// Emit the declaration of `message` and everything nested in it
pub fn write_declaration(
    w: &mut CodeWriter,
    message: &MessageType,
    options: &GeneratorOptions,
) -> Result<(), GeneratorError> {
    tracing::trace!(message = %message.full_name, "emitting data class");

    let has_properties = !message.fields.is_empty() || !message.oneofs.is_empty();
    if has_properties {
        write_constructor(w, message);
    } else {
        w.line(format!("class {}", message.name));
    }

    let has_body = !has_properties
        || !message.oneofs.is_empty()
        || !message.messages.is_empty()
        || !message.enums.is_empty()
        || options.parsers;
    if !has_body {
        return Ok(());
    }

    w.append(" {");
    w.indent();

    let mut first = true;
    let mut separate = |w: &mut CodeWriter| {
        if !first {
            w.blank();
        }
        first = false;
    };

    if !has_properties {
        separate(w);
        write_value_members(w, message);
    }
    for one in &message.oneofs {
        separate(w);
        oneof::write_sum_type(w, one)?;
    }
    for nested in &message.messages {
        separate(w);
        write_declaration(w, nested, options)?;
    }
    for nested in &message.enums {
        separate(w);
        enums::write_declaration(w, nested);
    }
    if options.parsers {
        separate(w);
        write_parser(w, message);
    }

    w.close("}");
    Ok(())
}

fn write_constructor(w: &mut CodeWriter, message: &MessageType) {
    w.open(format!("data class {}(", message.name));
    for field in &message.fields {
        let mapped = map_field(field);
        w.import_all(&mapped.imports);
        w.line(format!(
            "val {}: {} = {},",
            field.kotlin_name, mapped.kotlin_type, mapped.default_value
        ));
    }
    for one in &message.oneofs {
        w.line(format!(
            "val {}: {} = null,",
            one.kotlin_name,
            oneof::property_type(message, one)
        ));
    }
    w.close(")");
}

/// Data classes need at least one property, so fieldless messages are plain
/// classes with value equality
fn write_value_members(w: &mut CodeWriter, message: &MessageType) {
    w.line(format!(
        "override fun equals(other: Any?): Boolean = other is {}",
        message.kotlin_class
    ));
    w.blank();
    w.line(format!(
        "override fun hashCode(): Int = \"{}\".hashCode()",
        message.full_name
    ));
    w.blank();
    w.line(format!("override fun toString(): String = \"{}()\"", message.name));
}

fn write_parser(w: &mut CodeWriter, message: &MessageType) {
    w.import(Import::Runtime(PARSER_ADAPTER_FN));
    w.open("companion object {");
    w.line(format!(
        "val parser = {}.parser().{} {{ it.{}() }}",
        message.host_class, PARSER_ADAPTER_FN, TO_IDIOMATIC_FN
    ));
    w.close("}");
}
