//! Presence accessors
//!
//! Every optional plain field gets `fun DataClass.hasX(): Boolean`, mirroring
//! the host `hasX()`. Oneof members have no accessor of their own; the
//! nullable sum-type property already answers the question.

use super::writer::CodeWriter;
use crate::model::MessageType;
use crate::names;

/// Emit presence accessors for `message` and its nested messages
pub fn write_presence(w: &mut CodeWriter, message: &MessageType) {
    for field in message.fields.iter().filter(|f| f.presence.is_optional()) {
        w.blank();
        w.line(format!(
            "fun {}.has{}(): Boolean = this.{} != null",
            message.kotlin_class,
            names::type_name(&field.name),
            field.kotlin_name
        ));
    }
    for nested in &message.messages {
        write_presence(w, nested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldKind, Presence, Scalar, ValueType};

    fn field(name: &str, presence: Presence) -> Field {
        Field {
            name: name.to_string(),
            number: 1,
            kotlin_name: crate::names::field_name(name),
            host_accessor: crate::names::java_accessor_stem(name),
            kind: FieldKind::Single(ValueType::Scalar(Scalar::String)),
            presence,
        }
    }

    #[test]
    fn test_only_optional_fields_get_accessors() {
        let message = MessageType {
            name: "User".to_string(),
            full_name: "ex.User".to_string(),
            host_class: "com.ex.User".to_string(),
            kotlin_class: "com.ex.kdata.User".to_string(),
            fields: vec![
                field("name", Presence::None),
                field("nick_name", Presence::Explicit),
                field("when", Presence::Explicit),
                field("class", Presence::Explicit),
            ],
            oneofs: vec![],
            messages: vec![],
            enums: vec![],
        };
        let mut w = CodeWriter::new();
        write_presence(&mut w, &message);
        let out = w.into_file("ex.proto", "com.ex.kdata", &Default::default());
        assert!(!out.contains("hasName"));
        assert!(out.contains("fun com.ex.kdata.User.hasNickName(): Boolean = this.nickName != null"));
        assert!(out.contains("fun com.ex.kdata.User.hasWhen(): Boolean = this.`when` != null"));
        assert!(out.contains("fun com.ex.kdata.User.hasClass(): Boolean = this.`class` != null"));
        assert!(!out.contains("hasClass_"));
    }
}
