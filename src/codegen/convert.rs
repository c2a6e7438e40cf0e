//! Conversion function synthesis
//!
//! Every generated message gets a pair of extension functions:
//! `Host.toDataClass()` and `DataClass.toProto()`. Fields are converted one
//! by one; nested messages and enums recurse through their own pair, well-known
//! types go through their templates, and scalars are copied as-is.

use super::oneof;
use super::writer::CodeWriter;
use crate::model::{Field, FieldKind, MessageType, ValueType};
use crate::types::{value_imports, TO_HOST_FN, TO_IDIOMATIC_FN};
use crate::GeneratorError;

/// Expression converting host `expr` into its idiomatic value
pub fn to_idiomatic_expr(value: &ValueType, expr: &str) -> Result<String, GeneratorError> {
    Ok(match value {
        ValueType::Scalar(_) => expr.to_string(),
        ValueType::Enum(r) | ValueType::Message(r) if r.is_passthrough() => expr.to_string(),
        ValueType::Enum(_) | ValueType::Message(_) => format!("{}.{}()", expr, TO_IDIOMATIC_FN),
        ValueType::WellKnown(wkt) => wkt.to_idiomatic()?.apply(expr),
    })
}

/// Expression converting idiomatic `expr` into its host value
pub fn to_host_expr(value: &ValueType, expr: &str) -> Result<String, GeneratorError> {
    Ok(match value {
        ValueType::Scalar(_) => expr.to_string(),
        ValueType::Enum(r) | ValueType::Message(r) if r.is_passthrough() => expr.to_string(),
        ValueType::Enum(_) | ValueType::Message(_) => format!("{}.{}()", expr, TO_HOST_FN),
        ValueType::WellKnown(wkt) => wkt.to_host()?.apply(expr),
    })
}

/// Right-hand side of `name = ...` in the host-to-idiomatic constructor call
pub fn field_to_idiomatic(field: &Field) -> Result<String, GeneratorError> {
    let stem = &field.host_accessor;
    match &field.kind {
        FieldKind::Single(value) => {
            let converted = to_idiomatic_expr(value, &format!("this.get{}()", stem))?;
            if field.presence.is_optional() {
                Ok(format!("if (this.has{}()) {} else null", stem, converted))
            } else {
                Ok(converted)
            }
        }
        FieldKind::Repeated(value) => {
            let list = format!("this.get{}List()", stem);
            if value.is_identity() {
                Ok(list)
            } else {
                Ok(format!("{}.map {{ {} }}", list, to_idiomatic_expr(value, "it")?))
            }
        }
        FieldKind::Map { value, .. } => {
            let map = format!("this.get{}Map()", stem);
            if value.is_identity() {
                Ok(map)
            } else {
                Ok(format!(
                    "{}.mapValues {{ {} }}",
                    map,
                    to_idiomatic_expr(value, "it.value")?
                ))
            }
        }
    }
}

/// Statement copying an idiomatic property into `builder`
///
/// Optional fields are only set when non-null, so an unset property leaves
/// the host field without presence.
pub fn field_to_host(field: &Field) -> Result<String, GeneratorError> {
    let stem = &field.host_accessor;
    let property = format!("this.{}", field.kotlin_name);
    match &field.kind {
        FieldKind::Single(value) => {
            if field.presence.is_optional() {
                Ok(format!(
                    "{}?.let {{ builder.set{}({}) }}",
                    property,
                    stem,
                    to_host_expr(value, "it")?
                ))
            } else {
                Ok(format!("builder.set{}({})", stem, to_host_expr(value, &property)?))
            }
        }
        FieldKind::Repeated(value) => {
            if value.is_identity() {
                Ok(format!("builder.addAll{}({})", stem, property))
            } else {
                Ok(format!(
                    "builder.addAll{}({}.map {{ {} }})",
                    stem,
                    property,
                    to_host_expr(value, "it")?
                ))
            }
        }
        FieldKind::Map { value, .. } => {
            if value.is_identity() {
                Ok(format!("builder.putAll{}({})", stem, property))
            } else {
                Ok(format!(
                    "builder.putAll{}({}.mapValues {{ {} }})",
                    stem,
                    property,
                    to_host_expr(value, "it.value")?
                ))
            }
        }
    }
}

fn field_values(field: &Field) -> Vec<&ValueType> {
    match &field.kind {
        FieldKind::Single(v) | FieldKind::Repeated(v) => vec![v],
        FieldKind::Map { key, value } => vec![key, value],
    }
}

/// Emit both conversion functions for `message`, then recurse into its
/// nested messages and enums
pub fn write_conversions(w: &mut CodeWriter, message: &MessageType) -> Result<(), GeneratorError> {
    for field in &message.fields {
        for value in field_values(field) {
            w.import_all(&value_imports(value));
        }
    }
    for oneof in &message.oneofs {
        for member in &oneof.fields {
            w.import_all(&value_imports(oneof::member_value(member)?));
        }
    }

    write_to_idiomatic(w, message)?;
    w.blank();
    write_to_host(w, message)?;

    for nested in &message.messages {
        w.blank();
        write_conversions(w, nested)?;
    }
    for nested in &message.enums {
        w.blank();
        super::enums::write_conversions(w, nested);
    }

    Ok(())
}

fn write_to_idiomatic(w: &mut CodeWriter, message: &MessageType) -> Result<(), GeneratorError> {
    let signature = format!(
        "fun {}.{}(): {}",
        message.host_class, TO_IDIOMATIC_FN, message.kotlin_class
    );

    if message.fields.is_empty() && message.oneofs.is_empty() {
        w.line(format!("{} = {}()", signature, message.kotlin_class));
        return Ok(());
    }

    w.open(format!("{} = {}(", signature, message.kotlin_class));
    for field in &message.fields {
        w.line(format!("{} = {},", field.kotlin_name, field_to_idiomatic(field)?));
    }
    for oneof in &message.oneofs {
        oneof::write_to_idiomatic(w, message, oneof)?;
    }
    w.close(")");
    Ok(())
}

fn write_to_host(w: &mut CodeWriter, message: &MessageType) -> Result<(), GeneratorError> {
    w.open(format!(
        "fun {}.{}(): {} {{",
        message.kotlin_class, TO_HOST_FN, message.host_class
    ));
    w.line(format!("val builder = {}.newBuilder()", message.host_class));
    for field in &message.fields {
        w.line(field_to_host(field)?);
    }
    for oneof in &message.oneofs {
        oneof::write_to_host(w, message, oneof)?;
    }
    w.line("return builder.build()");
    w.close("}");
    Ok(())
}
