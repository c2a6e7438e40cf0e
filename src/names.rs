//! Identifier rules for both sides of the generated bridge
//!
//! Idiomatic names are built with `heck` and escaped against Kotlin's hard
//! keywords. Host names follow the protobuf-java code generator, which has
//! its own camel-casing and a list of field names it renames.

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Kotlin hard keywords; these can never be bare identifiers
static KOTLIN_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
        "interface", "is", "null", "object", "package", "return", "super", "this", "throw",
        "true", "try", "typealias", "typeof", "val", "var", "when", "while",
    ]
    .into_iter()
    .collect()
});

/// Field names protobuf-java suffixes with `_` because the accessor would
/// clash with a member of `Object` or `GeneratedMessage`
static JAVA_FORBIDDEN_FIELD_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "class",
        "cached_size",
        "serialized_size",
        "initialized",
        "initialization_error_string",
        "all_fields",
        "unknown_fields",
        "default_instance_for_type",
        "descriptor_for_type",
        "parser_for_type",
        "serialized_size_as_int",
    ]
    .into_iter()
    .collect()
});

/// Members inherited by generated stubs and server bases, the helpers the
/// generated service object declares and the parameter names of adapters
static RPC_RESERVED_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bind",
        "bindService",
        "build",
        "callOptions",
        "channel",
        "context",
        "coroutineContext",
        "equals",
        "hashCode",
        "headers",
        "request",
        "requests",
        "response",
        "toString",
        "unimplemented",
        "withCallCredentials",
        "withDeadline",
        "withDeadlineAfter",
        "withExecutor",
        "withInterceptors",
        "withOption",
        "withWaitForReady",
    ]
    .into_iter()
    .collect()
});

/// Escape an identifier so it is legal Kotlin
pub fn escape(name: &str) -> String {
    if KOTLIN_KEYWORDS.contains(name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

/// Kotlin property name for a proto field
pub fn field_name(proto_name: &str) -> String {
    escape(&proto_name.to_lower_camel_case())
}

/// Kotlin type name (sum types, variants) derived from a proto name
pub fn type_name(proto_name: &str) -> String {
    proto_name.to_upper_camel_case()
}

/// Kotlin function name for an RPC method
pub fn rpc_function_name(method: &str) -> String {
    let name = decapitalize(method);
    if RPC_RESERVED_NAMES.contains(name.as_str()) {
        format!("{}Rpc", name)
    } else {
        escape(&name)
    }
}

/// protobuf-java's underscore-to-camel conversion
///
/// Separators are dropped and force the next letter upper case; a digit
/// does the same. Existing upper case letters are kept.
pub fn java_camel_case(input: &str, capitalize_first: bool) -> String {
    let mut result = String::with_capacity(input.len());
    let mut cap_next = capitalize_first;

    for (i, c) in input.chars().enumerate() {
        if c.is_ascii_lowercase() {
            if cap_next {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
            cap_next = false;
        } else if c.is_ascii_uppercase() {
            if i == 0 && !capitalize_first {
                result.push(c.to_ascii_lowercase());
            } else {
                result.push(c);
            }
            cap_next = false;
        } else if c.is_ascii_digit() {
            result.push(c);
            cap_next = true;
        } else {
            cap_next = true;
        }
    }

    result
}

/// Capitalised accessor stem protobuf-java uses for a field (`getX`, `hasX`)
pub fn java_accessor_stem(proto_name: &str) -> String {
    let stem = java_camel_case(proto_name, true);
    if JAVA_FORBIDDEN_FIELD_NAMES.contains(proto_name.to_snake_case().as_str()) {
        format!("{}_", stem)
    } else {
        stem
    }
}

/// Outer class protobuf-java wraps a file's types in
///
/// `taken` holds every message and enum name of the file, nested ones
/// included, plus its service names.
pub fn java_outer_class_name<'a>(
    file_name: &str,
    explicit: Option<&str>,
    taken: impl IntoIterator<Item = &'a str>,
) -> String {
    if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
        return explicit.to_string();
    }

    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let base = base.strip_suffix(".proto").unwrap_or(base);
    let name = java_camel_case(base, true);

    if taken.into_iter().any(|t| t == name) {
        format!("{}OuterClass", name)
    } else {
        name
    }
}

/// Lower-case the first character, as grpc-kotlin does for method names
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Static method grpc-java generates for a method descriptor,
/// `say_hello` -> `getSayHelloMethod`
///
/// Underscores are dropped and upper-case the following character; every
/// other character is kept as written.
pub fn grpc_method_getter(method: &str) -> String {
    let mut getter = String::from("get");
    let mut upper_next = true;
    for c in method.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            getter.extend(c.to_uppercase());
            upper_next = false;
        } else {
            getter.push(c);
        }
    }
    getter.push_str("Method");
    getter
}

/// Join non-empty segments with `.`
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_keywords() {
        assert_eq!(escape("in"), "`in`");
        assert_eq!(escape("object"), "`object`");
        assert_eq!(escape("value"), "value");
        assert_eq!(field_name("when"), "`when`");
        assert_eq!(field_name("user_name"), "userName");
    }

    #[test]
    fn test_java_camel_case() {
        assert_eq!(java_camel_case("foo_bar", true), "FooBar");
        assert_eq!(java_camel_case("foo_bar", false), "fooBar");
        assert_eq!(java_camel_case("field2name", true), "Field2Name");
        assert_eq!(java_camel_case("HTTPCode", false), "hTTPCode");
        assert_eq!(java_camel_case("person-v2", true), "PersonV2");
    }

    #[test]
    fn test_java_accessor_stem_forbidden() {
        assert_eq!(java_accessor_stem("class"), "Class_");
        assert_eq!(java_accessor_stem("cached_size"), "CachedSize_");
        assert_eq!(java_accessor_stem("name"), "Name");
    }

    #[test]
    fn test_outer_class_name() {
        assert_eq!(
            java_outer_class_name("example/person_api.proto", None, ["Person"]),
            "PersonApi"
        );
        assert_eq!(
            java_outer_class_name("example/person.proto", None, ["Person"]),
            "PersonOuterClass"
        );
        assert_eq!(
            java_outer_class_name("shop/item.proto", None, ["Order", "Item"]),
            "ItemOuterClass"
        );
        assert_eq!(
            java_outer_class_name("a.proto", Some("Protos"), ["A"]),
            "Protos"
        );
    }

    #[test]
    fn test_rpc_function_name() {
        assert_eq!(rpc_function_name("SayHello"), "sayHello");
        assert_eq!(rpc_function_name("Build"), "buildRpc");
        assert_eq!(rpc_function_name("In"), "`in`");
        assert_eq!(rpc_function_name("Request"), "requestRpc");
        assert_eq!(rpc_function_name("Headers"), "headersRpc");
    }

    #[test]
    fn test_grpc_method_getter() {
        assert_eq!(grpc_method_getter("SayHello"), "getSayHelloMethod");
        assert_eq!(grpc_method_getter("say_hello"), "getSayHelloMethod");
        assert_eq!(grpc_method_getter("list_v2Items"), "getListV2ItemsMethod");
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("a.b", "Foo"), "a.b.Foo");
    }
}
