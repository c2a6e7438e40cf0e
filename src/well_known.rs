//! Well-known type mappings
//!
//! A fixed set of `google.protobuf` messages is not mirrored as a data
//! class. They map onto Kotlin/Java domain types instead, converted through
//! functions of the runtime support library.

use crate::template::TransformTemplate;
use crate::GeneratorError;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The closed set of message types with hand-written conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WellKnownType {
    /// `google.protobuf.Timestamp` as `java.time.Instant`
    Timestamp,
    /// `google.protobuf.Duration` as `java.time.Duration`
    Duration,
    /// `google.protobuf.Empty` as `Unit`
    Empty,
    /// `google.protobuf.DoubleValue` as `Double?`
    DoubleValue,
    /// `google.protobuf.FloatValue` as `Float?`
    FloatValue,
    /// `google.protobuf.Int64Value` as `Long?`
    Int64Value,
    /// `google.protobuf.UInt64Value` as `Long?`
    UInt64Value,
    /// `google.protobuf.Int32Value` as `Int?`
    Int32Value,
    /// `google.protobuf.UInt32Value` as `Int?`
    UInt32Value,
    /// `google.protobuf.BoolValue` as `Boolean?`
    BoolValue,
    /// `google.protobuf.StringValue` as `String?`
    StringValue,
    /// `google.protobuf.BytesValue` as `ByteString?`
    BytesValue,
}

static BY_FULL_NAME: Lazy<HashMap<&'static str, WellKnownType>> = Lazy::new(|| {
    WellKnownType::ALL
        .iter()
        .map(|wkt| (wkt.full_name(), *wkt))
        .collect()
});

impl WellKnownType {
    /// Every table entry
    pub const ALL: [WellKnownType; 12] = [
        WellKnownType::Timestamp,
        WellKnownType::Duration,
        WellKnownType::Empty,
        WellKnownType::DoubleValue,
        WellKnownType::FloatValue,
        WellKnownType::Int64Value,
        WellKnownType::UInt64Value,
        WellKnownType::Int32Value,
        WellKnownType::UInt32Value,
        WellKnownType::BoolValue,
        WellKnownType::StringValue,
        WellKnownType::BytesValue,
    ];

    /// Look up a message by its fully-qualified proto name (no leading dot)
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        BY_FULL_NAME.get(full_name.trim_start_matches('.')).copied()
    }

    /// Fully-qualified proto name
    pub fn full_name(&self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "google.protobuf.Timestamp",
            WellKnownType::Duration => "google.protobuf.Duration",
            WellKnownType::Empty => "google.protobuf.Empty",
            WellKnownType::DoubleValue => "google.protobuf.DoubleValue",
            WellKnownType::FloatValue => "google.protobuf.FloatValue",
            WellKnownType::Int64Value => "google.protobuf.Int64Value",
            WellKnownType::UInt64Value => "google.protobuf.UInt64Value",
            WellKnownType::Int32Value => "google.protobuf.Int32Value",
            WellKnownType::UInt32Value => "google.protobuf.UInt32Value",
            WellKnownType::BoolValue => "google.protobuf.BoolValue",
            WellKnownType::StringValue => "google.protobuf.StringValue",
            WellKnownType::BytesValue => "google.protobuf.BytesValue",
        }
    }

    /// protobuf-java class
    pub fn host_class(&self) -> String {
        format!("com.{}", self.full_name())
    }

    /// Kotlin type, before nullability is applied
    pub fn kotlin_type(&self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "java.time.Instant",
            WellKnownType::Duration => "java.time.Duration",
            WellKnownType::Empty => "Unit",
            WellKnownType::DoubleValue => "Double",
            WellKnownType::FloatValue => "Float",
            WellKnownType::Int64Value | WellKnownType::UInt64Value => "Long",
            WellKnownType::Int32Value | WellKnownType::UInt32Value => "Int",
            WellKnownType::BoolValue => "Boolean",
            WellKnownType::StringValue => "String",
            WellKnownType::BytesValue => "com.google.protobuf.ByteString",
        }
    }

    /// Whether the mapped type is nullable in its base form
    ///
    /// Wrappers stand for nullable primitives; the rest have real defaults.
    pub fn is_nullable(&self) -> bool {
        !matches!(
            self,
            WellKnownType::Timestamp | WellKnownType::Duration | WellKnownType::Empty
        )
    }

    /// Default value expression for the base type
    pub fn default_value(&self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "java.time.Instant.EPOCH",
            WellKnownType::Duration => "java.time.Duration.ZERO",
            WellKnownType::Empty => "Unit",
            _ => "null",
        }
    }

    fn to_idiomatic_source(&self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "%L.toInstant()",
            WellKnownType::Duration => "%L.toJavaDuration()",
            WellKnownType::Empty => "Unit",
            _ => "%L.getValue()",
        }
    }

    fn to_host_source(&self) -> &'static str {
        match self {
            WellKnownType::Timestamp => "%L.toTimestamp()",
            WellKnownType::Duration => "%L.toProtoDuration()",
            WellKnownType::Empty => "com.google.protobuf.Empty.getDefaultInstance()",
            WellKnownType::DoubleValue => "%L.toDoubleValue()",
            WellKnownType::FloatValue => "%L.toFloatValue()",
            WellKnownType::Int64Value => "%L.toInt64Value()",
            WellKnownType::UInt64Value => "%L.toUInt64Value()",
            WellKnownType::Int32Value => "%L.toInt32Value()",
            WellKnownType::UInt32Value => "%L.toUInt32Value()",
            WellKnownType::BoolValue => "%L.toBoolValue()",
            WellKnownType::StringValue => "%L.toStringValue()",
            WellKnownType::BytesValue => "%L.toBytesValue()",
        }
    }

    /// Template converting a host value into the idiomatic one
    pub fn to_idiomatic(&self) -> Result<TransformTemplate, GeneratorError> {
        TransformTemplate::parse(self.to_idiomatic_source())
    }

    /// Template converting an idiomatic value into the host one
    pub fn to_host(&self) -> Result<TransformTemplate, GeneratorError> {
        TransformTemplate::parse(self.to_host_source())
    }

    /// Runtime library function used by the to-idiomatic template
    pub fn to_idiomatic_runtime_fn(&self) -> Option<&'static str> {
        match self {
            WellKnownType::Timestamp => Some("toInstant"),
            WellKnownType::Duration => Some("toJavaDuration"),
            _ => None,
        }
    }

    /// Runtime library function used by the to-host template
    pub fn to_host_runtime_fn(&self) -> Option<&'static str> {
        match self {
            WellKnownType::Empty => None,
            other => {
                let source = other.to_host_source();
                source
                    .strip_prefix("%L.")
                    .and_then(|rest| rest.strip_suffix("()"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            WellKnownType::from_full_name("google.protobuf.Timestamp"),
            Some(WellKnownType::Timestamp)
        );
        assert_eq!(
            WellKnownType::from_full_name(".google.protobuf.StringValue"),
            Some(WellKnownType::StringValue)
        );
        assert_eq!(WellKnownType::from_full_name("google.protobuf.Any"), None);
        assert_eq!(WellKnownType::from_full_name("example.Timestamp"), None);
    }

    #[test]
    fn test_defaults_and_nullability() {
        assert!(!WellKnownType::Timestamp.is_nullable());
        assert_eq!(WellKnownType::Empty.default_value(), "Unit");
        assert!(WellKnownType::Int32Value.is_nullable());
        assert_eq!(WellKnownType::Int32Value.default_value(), "null");
        assert_eq!(WellKnownType::UInt64Value.kotlin_type(), "Long");
    }

    #[test]
    fn test_templates_parse() {
        for wkt in WellKnownType::ALL {
            assert!(wkt.to_idiomatic().is_ok(), "{:?}", wkt);
            assert!(wkt.to_host().is_ok(), "{:?}", wkt);
        }
        let t = WellKnownType::Timestamp.to_idiomatic().unwrap();
        assert_eq!(t.apply("ts"), "ts.toInstant()");
        let e = WellKnownType::Empty.to_host().unwrap();
        assert_eq!(e.apply("x"), "com.google.protobuf.Empty.getDefaultInstance()");
    }

    #[test]
    fn test_runtime_functions() {
        assert_eq!(
            WellKnownType::BoolValue.to_host_runtime_fn(),
            Some("toBoolValue")
        );
        assert_eq!(WellKnownType::BoolValue.to_idiomatic_runtime_fn(), None);
        assert_eq!(WellKnownType::Empty.to_host_runtime_fn(), None);
        assert_eq!(
            WellKnownType::Duration.to_idiomatic_runtime_fn(),
            Some("toJavaDuration")
        );
    }

    #[test]
    fn test_host_class() {
        assert_eq!(
            WellKnownType::Duration.host_class(),
            "com.google.protobuf.Duration"
        );
    }
}
