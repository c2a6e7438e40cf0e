//! Oneof code generation
//!
//! A real oneof becomes a sealed interface nested in its data class, with
//! one data class variant per member, and a single nullable property on the
//! data class. `null` means "no member set".

use super::convert::{to_host_expr, to_idiomatic_expr};
use super::writer::CodeWriter;
use crate::model::{FieldKind, MessageType, OneOf, OneOfField, ValueType};
use crate::types::map_value;
use crate::GeneratorError;

/// Kotlin type of the property holding a oneof
pub fn property_type(message: &MessageType, oneof: &OneOf) -> String {
    format!("{}.{}?", message.kotlin_class, oneof.sum_type)
}

/// Fully-qualified variant class
pub fn variant_class(message: &MessageType, oneof: &OneOf, member: &OneOfField) -> String {
    format!("{}.{}.{}", message.kotlin_class, oneof.sum_type, member.variant)
}

/// The single value a oneof member holds
pub fn member_value(member: &OneOfField) -> Result<&ValueType, GeneratorError> {
    match &member.field.kind {
        FieldKind::Single(value) => Ok(value),
        _ => Err(GeneratorError::InvalidOneof(member.field.name.clone())),
    }
}

/// Emit the sealed interface for one oneof
pub fn write_sum_type(w: &mut CodeWriter, oneof: &OneOf) -> Result<(), GeneratorError> {
    w.open(format!("sealed interface {} {{", oneof.sum_type));
    for member in &oneof.fields {
        let mapped = map_value(member_value(member)?);
        w.import_all(&mapped.imports);
        w.line(format!(
            "data class {}(val {}: {}) : {}",
            member.variant, member.field.kotlin_name, mapped.kotlin_type, oneof.sum_type
        ));
    }
    w.close("}");
    Ok(())
}

/// Emit `name = when (case) { ... }` inside a host-to-idiomatic constructor
/// call
///
/// A case that is neither declared nor the not-set sentinel falls through
/// to `null`.
pub fn write_to_idiomatic(
    w: &mut CodeWriter,
    message: &MessageType,
    oneof: &OneOf,
) -> Result<(), GeneratorError> {
    let case_class = format!("{}.{}Case", message.host_class, oneof.host_accessor);

    w.open(format!(
        "{} = when (this.get{}Case()) {{",
        oneof.kotlin_name, oneof.host_accessor
    ));
    for member in &oneof.fields {
        let getter = format!("this.get{}()", member.field.host_accessor);
        w.line(format!(
            "{}.{} -> {}({})",
            case_class,
            member.host_case,
            variant_class(message, oneof, member),
            to_idiomatic_expr(member_value(member)?, &getter)?
        ));
    }
    w.line("else -> null");
    w.close("},");
    Ok(())
}

/// Emit the exhaustive `when` that copies the set variant into the builder
///
/// `null` leaves the host oneof unset.
pub fn write_to_host(
    w: &mut CodeWriter,
    message: &MessageType,
    oneof: &OneOf,
) -> Result<(), GeneratorError> {
    w.open(format!("when (val value = this.{}) {{", oneof.kotlin_name));
    for member in &oneof.fields {
        let held = format!("value.{}", member.field.kotlin_name);
        w.line(format!(
            "is {} -> builder.set{}({})",
            variant_class(message, oneof, member),
            member.field.host_accessor,
            to_host_expr(member_value(member)?, &held)?
        ));
    }
    w.line("null -> Unit");
    w.close("}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, Presence, Scalar, TypeRef};

    fn member(name: &str, variant: &str, value: ValueType) -> OneOfField {
        OneOfField {
            field: Field {
                name: name.to_string(),
                number: 1,
                kotlin_name: crate::names::field_name(name),
                host_accessor: crate::names::java_accessor_stem(name),
                kind: FieldKind::Single(value),
                presence: Presence::None,
            },
            variant: variant.to_string(),
            host_case: name.to_uppercase(),
        }
    }

    fn sample() -> (MessageType, OneOf) {
        let address = TypeRef {
            full_name: "ex.Address".to_string(),
            host_class: "com.ex.Address".to_string(),
            kotlin_class: Some("com.ex.kdata.Address".to_string()),
            kotlin_package: Some("com.ex.kdata".to_string()),
            first_value: None,
        };
        let oneof = OneOf {
            name: "contact".to_string(),
            kotlin_name: "contact".to_string(),
            sum_type: "Contact".to_string(),
            host_accessor: "Contact".to_string(),
            fields: vec![
                member("phone", "Phone", ValueType::Scalar(Scalar::String)),
                member("address", "Address", ValueType::Message(address)),
            ],
        };
        let message = MessageType {
            name: "Person".to_string(),
            full_name: "ex.Person".to_string(),
            host_class: "com.ex.Person".to_string(),
            kotlin_class: "com.ex.kdata.Person".to_string(),
            fields: vec![],
            oneofs: vec![oneof.clone()],
            messages: vec![],
            enums: vec![],
        };
        (message, oneof)
    }

    fn render(w: CodeWriter) -> String {
        w.into_file("x.proto", "", &crate::options::GeneratorOptions::default())
    }

    #[test]
    fn test_sum_type_variants() {
        let (_, oneof) = sample();
        let mut w = CodeWriter::new();
        write_sum_type(&mut w, &oneof).unwrap();
        let out = render(w);
        assert!(out.contains("sealed interface Contact {"));
        assert!(out.contains("    data class Phone(val phone: String) : Contact"));
        assert!(out.contains("    data class Address(val address: com.ex.kdata.Address) : Contact"));
    }

    #[test]
    fn test_to_idiomatic_switches_on_case() {
        let (message, oneof) = sample();
        let mut w = CodeWriter::new();
        write_to_idiomatic(&mut w, &message, &oneof).unwrap();
        let out = render(w);
        assert!(out.contains("contact = when (this.getContactCase()) {"));
        assert!(out.contains(
            "com.ex.Person.ContactCase.PHONE -> com.ex.kdata.Person.Contact.Phone(this.getPhone())"
        ));
        assert!(out.contains(
            "com.ex.Person.ContactCase.ADDRESS -> com.ex.kdata.Person.Contact.Address(this.getAddress().toDataClass())"
        ));
        assert!(out.contains("else -> null"));
    }

    #[test]
    fn test_to_host_matches_every_variant() {
        let (message, oneof) = sample();
        let mut w = CodeWriter::new();
        write_to_host(&mut w, &message, &oneof).unwrap();
        let out = render(w);
        assert!(out.contains("when (val value = this.contact) {"));
        assert!(out.contains("is com.ex.kdata.Person.Contact.Phone -> builder.setPhone(value.phone)"));
        assert!(out.contains(
            "is com.ex.kdata.Person.Contact.Address -> builder.setAddress(value.address.toProto())"
        ));
        assert!(out.contains("null -> Unit"));
    }
}
