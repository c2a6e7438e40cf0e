//! Type mapping from proto field shapes to Kotlin types
//!
//! Every field maps to a Kotlin type, a default-value expression for the
//! data class constructor, and the imports its conversions need.

use crate::model::{Field, FieldKind, Scalar, TypeRef, ValueType};
use crate::names;
use crate::options::GeneratorOptions;
use std::collections::BTreeSet;

/// Something a generated file must import
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Import {
    /// A fully-qualified symbol, e.g. `io.grpc.Status`
    Symbol(&'static str),
    /// A function of the runtime support library
    Runtime(&'static str),
    /// A conversion extension function living in another Kotlin package
    Extension {
        /// Kotlin package declaring the function
        package: String,
        /// `toDataClass` or `toProto`
        function: &'static str,
    },
}

/// Name of the host-to-idiomatic extension functions
pub const TO_IDIOMATIC_FN: &str = "toDataClass";

/// Name of the idiomatic-to-host extension functions
pub const TO_HOST_FN: &str = "toProto";

/// Ordered, de-duplicated set of imports for one output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Imports(BTreeSet<Import>);

impl Imports {
    /// Add one import
    pub fn insert(&mut self, import: Import) {
        self.0.insert(import);
    }

    /// Add every import of another set
    pub fn extend(&mut self, other: &Imports) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Whether nothing needs importing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render `import` lines, dropping imports from `current_package`
    pub fn render(&self, current_package: &str, options: &GeneratorOptions) -> Vec<String> {
        let lines: BTreeSet<String> = self
            .0
            .iter()
            .filter_map(|import| match import {
                Import::Symbol(symbol) => Some((*symbol).to_string()),
                Import::Runtime(function) => {
                    (options.runtime_package != current_package)
                        .then(|| format!("{}.{}", options.runtime_package, function))
                }
                Import::Extension { package, function } => (package != current_package)
                    .then(|| names::qualify(package, function)),
            })
            .collect();

        lines.into_iter().map(|l| format!("import {}", l)).collect()
    }
}

/// Result of mapping a field or value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Kotlin type, including `?` when nullable
    pub kotlin_type: String,
    /// Default value expression
    pub default_value: String,
    /// Imports conversions of this type need
    pub imports: Imports,
}

/// Kotlin type of a scalar
pub fn scalar_type(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::Double => "Double",
        Scalar::Float => "Float",
        Scalar::Int => "Int",
        Scalar::Long => "Long",
        Scalar::Bool => "Boolean",
        Scalar::String => "String",
        Scalar::Bytes => "com.google.protobuf.ByteString",
    }
}

/// Zero value of a scalar
pub fn scalar_default(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::Double => "0.0",
        Scalar::Float => "0.0f",
        Scalar::Int => "0",
        Scalar::Long => "0L",
        Scalar::Bool => "false",
        Scalar::String => "\"\"",
        Scalar::Bytes => "com.google.protobuf.ByteString.EMPTY",
    }
}

/// Map a single value to its non-null Kotlin type
///
/// Well-known wrappers keep their base default (`null`) even though the
/// type itself is returned without `?`; callers decide on nullability.
pub fn map_value(value: &ValueType) -> MappedType {
    let (kotlin_type, default_value) = match value {
        ValueType::Scalar(s) => (scalar_type(*s).to_string(), scalar_default(*s).to_string()),
        ValueType::Enum(r) => {
            let first = r.first_value.as_deref().unwrap_or(crate::model::UNRECOGNIZED);
            let default = if r.is_passthrough() {
                format!("{}.{}", r.host_class, first)
            } else {
                format!("{}.{}", r.idiomatic_type(), names::escape(first))
            };
            (r.idiomatic_type().to_string(), default)
        }
        ValueType::Message(r) => {
            let default = if r.is_passthrough() {
                format!("{}.getDefaultInstance()", r.host_class)
            } else {
                format!("{}()", r.idiomatic_type())
            };
            (r.idiomatic_type().to_string(), default)
        }
        ValueType::WellKnown(wkt) => (
            wkt.kotlin_type().to_string(),
            wkt.default_value().to_string(),
        ),
    };

    MappedType {
        kotlin_type,
        default_value,
        imports: value_imports(value),
    }
}

/// Map a field to its constructor property type and default
pub fn map_field(field: &Field) -> MappedType {
    match &field.kind {
        FieldKind::Single(value) => {
            let mut mapped = map_value(value);
            let nullable = field.presence.is_optional()
                || matches!(value, ValueType::WellKnown(wkt) if wkt.is_nullable());
            if nullable {
                mapped.kotlin_type.push('?');
                mapped.default_value = "null".to_string();
            }
            mapped
        }
        FieldKind::Repeated(value) => {
            let element = map_value(value);
            MappedType {
                kotlin_type: format!("List<{}>", element.kotlin_type),
                default_value: "emptyList()".to_string(),
                imports: element.imports,
            }
        }
        FieldKind::Map { key, value } => {
            let key = map_value(key);
            let value = map_value(value);
            let mut imports = key.imports;
            imports.extend(&value.imports);
            MappedType {
                kotlin_type: format!("Map<{}, {}>", key.kotlin_type, value.kotlin_type),
                default_value: "emptyMap()".to_string(),
                imports,
            }
        }
    }
}

/// Imports needed to convert a value in both directions
pub fn value_imports(value: &ValueType) -> Imports {
    let mut imports = Imports::default();
    match value {
        ValueType::Scalar(_) => {}
        ValueType::Enum(r) | ValueType::Message(r) => extension_imports(r, &mut imports),
        ValueType::WellKnown(wkt) => {
            for function in [wkt.to_idiomatic_runtime_fn(), wkt.to_host_runtime_fn()]
                .into_iter()
                .flatten()
            {
                imports.insert(Import::Runtime(function));
            }
        }
    }
    imports
}

fn extension_imports(r: &TypeRef, imports: &mut Imports) {
    if let Some(package) = &r.kotlin_package {
        for function in [TO_IDIOMATIC_FN, TO_HOST_FN] {
            imports.insert(Import::Extension {
                package: package.clone(),
                function,
            });
        }
    }
}
