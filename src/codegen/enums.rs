//! Enum generation
//!
//! Each proto enum becomes a Kotlin `enum class` with the declared values
//! plus `UNRECOGNIZED`. Conversion is 1:1 on declared values; any host value
//! the generated code does not know maps to `UNRECOGNIZED`. Closed (proto2)
//! enums have no host `UNRECOGNIZED`, so the sentinel goes back as the
//! first declared value.

use super::writer::CodeWriter;
use crate::model::{EnumType, UNRECOGNIZED};
use crate::names::escape;
use crate::types::{TO_HOST_FN, TO_IDIOMATIC_FN};

/// Emit the enum class declaration
pub fn write_declaration(w: &mut CodeWriter, enum_type: &EnumType) {
    w.open(format!("enum class {} {{", enum_type.name));
    for value in &enum_type.values {
        w.line(format!("{},", escape(&value.name)));
    }
    w.line(format!("{},", UNRECOGNIZED));
    w.close("}");
}

/// Emit both conversion functions
pub fn write_conversions(w: &mut CodeWriter, enum_type: &EnumType) {
    let host = &enum_type.host_class;
    let kotlin = &enum_type.kotlin_class;

    w.open(format!(
        "fun {}.{}(): {} = when (this) {{",
        host, TO_IDIOMATIC_FN, kotlin
    ));
    for value in enum_type.values.iter().filter(|v| !v.is_alias) {
        let name = escape(&value.name);
        w.line(format!("{}.{} -> {}.{}", host, name, kotlin, name));
    }
    if enum_type.open {
        w.line(format!("{}.{} -> {}.{}", host, UNRECOGNIZED, kotlin, UNRECOGNIZED));
    }
    w.line(format!("else -> {}.{}", kotlin, UNRECOGNIZED));
    w.close("}");

    w.blank();

    w.open(format!(
        "fun {}.{}(): {} = when (this) {{",
        kotlin, TO_HOST_FN, host
    ));
    for value in &enum_type.values {
        let name = escape(&value.name);
        w.line(format!("{}.{} -> {}.{}", kotlin, name, host, name));
    }
    let fallback = match enum_type.values.first() {
        Some(first) if !enum_type.open => escape(&first.name),
        _ => UNRECOGNIZED.to_string(),
    };
    w.line(format!("{}.{} -> {}.{}", kotlin, UNRECOGNIZED, host, fallback));
    w.close("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnumValue;

    fn color() -> EnumType {
        EnumType {
            name: "Color".to_string(),
            full_name: "ex.Color".to_string(),
            host_class: "com.ex.Color".to_string(),
            kotlin_class: "com.ex.kdata.Color".to_string(),
            values: vec![
                EnumValue {
                    name: "COLOR_UNSPECIFIED".to_string(),
                    number: 0,
                    is_alias: false,
                },
                EnumValue {
                    name: "RED".to_string(),
                    number: 1,
                    is_alias: false,
                },
                EnumValue {
                    name: "CRIMSON".to_string(),
                    number: 1,
                    is_alias: true,
                },
            ],
            open: true,
        }
    }

    fn render(w: CodeWriter) -> String {
        w.into_file("x.proto", "com.ex.kdata", &Default::default())
    }

    #[test]
    fn test_declaration_gains_unrecognized() {
        let mut w = CodeWriter::new();
        write_declaration(&mut w, &color());
        let out = render(w);
        assert!(out.contains(
            "enum class Color {\n    COLOR_UNSPECIFIED,\n    RED,\n    CRIMSON,\n    UNRECOGNIZED,\n}\n"
        ));
    }

    #[test]
    fn test_unknown_host_values_map_to_unrecognized() {
        let mut w = CodeWriter::new();
        write_conversions(&mut w, &color());
        let out = render(w);
        assert!(out.contains("fun com.ex.Color.toDataClass(): com.ex.kdata.Color = when (this) {"));
        assert!(out.contains("    com.ex.Color.RED -> com.ex.kdata.Color.RED\n"));
        assert!(out.contains(
            "    com.ex.Color.UNRECOGNIZED -> com.ex.kdata.Color.UNRECOGNIZED\n    else -> com.ex.kdata.Color.UNRECOGNIZED\n"
        ));
        // aliases are not enum constants on the host side
        assert!(!out.contains("com.ex.Color.CRIMSON -> "));
    }

    #[test]
    fn test_to_host_is_total() {
        let mut w = CodeWriter::new();
        write_conversions(&mut w, &color());
        let out = render(w);
        assert!(out.contains("fun com.ex.kdata.Color.toProto(): com.ex.Color = when (this) {"));
        assert!(out.contains("    com.ex.kdata.Color.CRIMSON -> com.ex.Color.CRIMSON\n"));
        assert!(out.contains("    com.ex.kdata.Color.UNRECOGNIZED -> com.ex.Color.UNRECOGNIZED\n"));
    }

    #[test]
    fn test_closed_enum_falls_back_to_first_value() {
        let mut closed = color();
        closed.open = false;
        let mut w = CodeWriter::new();
        write_conversions(&mut w, &closed);
        let out = render(w);
        assert!(!out.contains("com.ex.Color.UNRECOGNIZED"));
        assert!(out.contains("    else -> com.ex.kdata.Color.UNRECOGNIZED\n"));
        assert!(out.contains(
            "    com.ex.kdata.Color.UNRECOGNIZED -> com.ex.Color.COLOR_UNSPECIFIED\n"
        ));
    }
}
