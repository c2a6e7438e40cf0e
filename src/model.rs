//! Intermediate representation handed to the code builders
//!
//! Built once per run by [`crate::resolve`] from the descriptor pool. Every
//! type reference is already resolved to both its protobuf-java class and
//! its Kotlin class, so builders never look anything up.

use crate::well_known::WellKnownType;

/// One `.proto` file selected for generation
#[derive(Debug, Clone)]
pub struct FileUnit {
    /// File path as protoc names it, e.g. `example/person.proto`
    pub proto_name: String,
    /// Proto package
    pub proto_package: String,
    /// Package of the protobuf-java classes
    pub host_package: String,
    /// Package of the generated Kotlin code
    pub kotlin_package: String,
    /// Top-level messages, map entries and well-known types excluded
    pub messages: Vec<MessageType>,
    /// Top-level enums
    pub enums: Vec<EnumType>,
    /// Services
    pub services: Vec<Service>,
}

/// A message rendered as a data class
#[derive(Debug, Clone)]
pub struct MessageType {
    /// Simple proto name
    pub name: String,
    /// Fully-qualified proto name
    pub full_name: String,
    /// Fully-qualified protobuf-java class
    pub host_class: String,
    /// Fully-qualified Kotlin class
    pub kotlin_class: String,
    /// Plain fields; members of real oneofs never appear here
    pub fields: Vec<Field>,
    /// Real oneofs (synthetic proto3-optional oneofs are plain fields)
    pub oneofs: Vec<OneOf>,
    /// Nested messages
    pub messages: Vec<MessageType>,
    /// Nested enums
    pub enums: Vec<EnumType>,
}

/// A field of a message or a member of a oneof
#[derive(Debug, Clone)]
pub struct Field {
    /// Proto field name
    pub name: String,
    /// Wire number
    pub number: u32,
    /// Escaped Kotlin property name
    pub kotlin_name: String,
    /// Capitalised protobuf-java accessor stem (`getX`, `setX`, ...)
    pub host_accessor: String,
    /// Structural shape of the field
    pub kind: FieldKind,
    /// Whether the field tracks presence
    pub presence: Presence,
}

/// Structural classification of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A single value
    Single(ValueType),
    /// `repeated`, not a map
    Repeated(ValueType),
    /// `map<K, V>`
    Map {
        /// Key type, always a scalar
        key: ValueType,
        /// Value type
        value: ValueType,
    },
}

/// Presence tracking of a singular field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Plain scalars, repeated and map fields
    None,
    /// proto3 `optional` or proto2 `optional` scalars
    Explicit,
    /// Singular message-typed fields
    Implicit,
}

impl Presence {
    /// Whether the field maps to a nullable property guarded by `has`
    pub fn is_optional(&self) -> bool {
        !matches!(self, Presence::None)
    }
}

/// What a single value holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// Built-in scalar
    Scalar(Scalar),
    /// Enum with a generated counterpart (or a passthrough)
    Enum(TypeRef),
    /// Message with a generated counterpart (or a passthrough)
    Message(TypeRef),
    /// Message from the well-known table
    WellKnown(WellKnownType),
}

impl ValueType {
    /// Whether converting between host and idiomatic form is a no-op
    pub fn is_identity(&self) -> bool {
        match self {
            ValueType::Scalar(_) => true,
            ValueType::Enum(r) | ValueType::Message(r) => r.is_passthrough(),
            ValueType::WellKnown(_) => false,
        }
    }
}

/// Proto scalar types, grouped by their Kotlin representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// `double`
    Double,
    /// `float`
    Float,
    /// `int32`, `uint32`, `sint32`, `fixed32`, `sfixed32`
    Int,
    /// `int64`, `uint64`, `sint64`, `fixed64`, `sfixed64`
    Long,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `bytes`
    Bytes,
}

/// A resolved reference to a message or enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Fully-qualified proto name
    pub full_name: String,
    /// Fully-qualified protobuf-java class
    pub host_class: String,
    /// Fully-qualified Kotlin class; `None` for passthrough types
    pub kotlin_class: Option<String>,
    /// Kotlin package holding the conversion functions
    pub kotlin_package: Option<String>,
    /// First declared value, for enums
    pub first_value: Option<String>,
}

impl TypeRef {
    /// Types without a generated counterpart are used as-is
    pub fn is_passthrough(&self) -> bool {
        self.kotlin_class.is_none()
    }

    /// Kotlin type used on the idiomatic side
    pub fn idiomatic_type(&self) -> &str {
        self.kotlin_class.as_deref().unwrap_or(&self.host_class)
    }
}

/// A real oneof, rendered as a sealed interface
#[derive(Debug, Clone)]
pub struct OneOf {
    /// Proto oneof name
    pub name: String,
    /// Escaped Kotlin property name
    pub kotlin_name: String,
    /// Name of the sealed interface inside the data class
    pub sum_type: String,
    /// Capitalised protobuf-java stem (`getXCase`, `XCase`)
    pub host_accessor: String,
    /// Members; each holds a single value
    pub fields: Vec<OneOfField>,
}

/// A member of a oneof
#[derive(Debug, Clone)]
pub struct OneOfField {
    /// The field itself
    pub field: Field,
    /// Name of the sum-type variant
    pub variant: String,
    /// Constant of the host `XCase` enum
    pub host_case: String,
}

/// An enum rendered as a Kotlin enum class
#[derive(Debug, Clone)]
pub struct EnumType {
    /// Simple proto name
    pub name: String,
    /// Fully-qualified proto name
    pub full_name: String,
    /// Fully-qualified protobuf-java class
    pub host_class: String,
    /// Fully-qualified Kotlin class
    pub kotlin_class: String,
    /// Declared values in order
    pub values: Vec<EnumValue>,
    /// proto3 enums are open: the host class has its own `UNRECOGNIZED`
    pub open: bool,
}

/// One declared enum constant
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// Constant name
    pub name: String,
    /// Wire number
    pub number: i32,
    /// Set for every value after the first with the same number
    pub is_alias: bool,
}

/// Sentinel every generated enum gains
pub const UNRECOGNIZED: &str = "UNRECOGNIZED";

/// A service and its RPCs
#[derive(Debug, Clone)]
pub struct Service {
    /// Simple proto name
    pub name: String,
    /// Fully-qualified proto name
    pub full_name: String,
    /// grpc-java `*Grpc` class
    pub grpc_class: String,
    /// Methods in declaration order
    pub methods: Vec<Method>,
}

/// One RPC
#[derive(Debug, Clone)]
pub struct Method {
    /// Proto method name
    pub name: String,
    /// `package.Service/Method`
    pub full_name: String,
    /// Escaped Kotlin function name
    pub kotlin_name: String,
    /// grpc-java descriptor getter, e.g. `getSayHelloMethod`
    pub descriptor_getter: String,
    /// Request payload
    pub input: ValueType,
    /// Response payload
    pub output: ValueType,
    /// Streaming shape
    pub shape: MethodShape,
}

/// The four RPC shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodShape {
    /// One request, one response
    Unary,
    /// Request stream, one response
    ClientStreaming,
    /// One request, response stream
    ServerStreaming,
    /// Streams both ways
    BidiStreaming,
}

impl MethodShape {
    /// Classify by the two streaming flags
    pub fn from_flags(client_streaming: bool, server_streaming: bool) -> Self {
        match (client_streaming, server_streaming) {
            (false, false) => MethodShape::Unary,
            (true, false) => MethodShape::ClientStreaming,
            (false, true) => MethodShape::ServerStreaming,
            (true, true) => MethodShape::BidiStreaming,
        }
    }

    /// Whether the request side is a stream
    pub fn streams_requests(&self) -> bool {
        matches!(self, MethodShape::ClientStreaming | MethodShape::BidiStreaming)
    }

    /// Whether the response side is a stream
    pub fn streams_responses(&self) -> bool {
        matches!(self, MethodShape::ServerStreaming | MethodShape::BidiStreaming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_flags() {
        assert_eq!(MethodShape::from_flags(false, false), MethodShape::Unary);
        assert_eq!(
            MethodShape::from_flags(true, false),
            MethodShape::ClientStreaming
        );
        assert_eq!(
            MethodShape::from_flags(false, true),
            MethodShape::ServerStreaming
        );
        assert_eq!(MethodShape::from_flags(true, true), MethodShape::BidiStreaming);
        assert!(MethodShape::BidiStreaming.streams_requests());
        assert!(!MethodShape::ClientStreaming.streams_responses());
    }

    #[test]
    fn test_passthrough_identity() {
        let any = TypeRef {
            full_name: "google.protobuf.Any".to_string(),
            host_class: "com.google.protobuf.Any".to_string(),
            kotlin_class: None,
            kotlin_package: None,
            first_value: None,
        };
        assert!(any.is_passthrough());
        assert_eq!(any.idiomatic_type(), "com.google.protobuf.Any");
        assert!(ValueType::Message(any).is_identity());
        assert!(ValueType::Scalar(Scalar::Int).is_identity());
        assert!(!ValueType::WellKnown(WellKnownType::Timestamp).is_identity());
    }
}
