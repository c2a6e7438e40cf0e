//! Descriptor resolution
//!
//! Files are added to a `prost_reflect::DescriptorPool` strictly in the order
//! protoc hands them over, which is dependency order. A file whose import
//! has not been added yet is a fatal configuration error. The pool is then
//! lowered into the [`crate::model`] types the builders consume.

use crate::model::{
    EnumType, EnumValue, Field, FieldKind, FileUnit, MessageType, Method, MethodShape, OneOf,
    OneOfField, Presence, Scalar, Service, TypeRef, ValueType,
};
use crate::names;
use crate::options::GeneratorOptions;
use crate::well_known::WellKnownType;
use crate::GeneratorError;
use prost_reflect::{
    DescriptorPool, EnumDescriptor, FieldDescriptor, FileDescriptor, Kind, MessageDescriptor,
    OneofDescriptor, ServiceDescriptor,
};
use prost_types::{DescriptorProto, FileDescriptorProto};
use std::collections::HashSet;

/// Packages never generated: well-known types and annotation/validation
/// packages that only carry options
const EXCLUDED_PACKAGES: &[&str] = &["google.protobuf", "google.api", "validate", "buf.validate"];

/// Whether files in `package` are skipped
pub fn is_excluded_package(package: &str) -> bool {
    EXCLUDED_PACKAGES.iter().any(|excluded| {
        package == *excluded
            || package
                .strip_prefix(excluded)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// A oneof protoc synthesised for a proto3 `optional` field
fn is_synthetic(oneof: &OneofDescriptor) -> bool {
    oneof
        .fields()
        .all(|f| f.field_descriptor_proto().proto3_optional())
}

/// Fields of `message` in declaration order; the pool orders them by number
fn declared_fields(message: &MessageDescriptor) -> Vec<FieldDescriptor> {
    message
        .descriptor_proto()
        .field
        .iter()
        .filter_map(|f| u32::try_from(f.number()).ok())
        .filter_map(|number| message.get_field(number))
        .collect()
}

/// Every message and enum name declared in `messages`, at any depth
fn collect_type_names<'a>(messages: &'a [DescriptorProto], out: &mut Vec<&'a str>) {
    for message in messages {
        out.push(message.name());
        out.extend(message.enum_type.iter().map(|e| e.name()));
        collect_type_names(&message.nested_type, out);
    }
}

/// Add files to a pool in the given order, failing on the first file whose
/// dependency is missing
pub fn build_pool(files: &[FileDescriptorProto]) -> Result<DescriptorPool, GeneratorError> {
    let mut pool = DescriptorPool::new();

    for file in files {
        if let Some(missing) = file
            .dependency
            .iter()
            .find(|dep| pool.get_file_by_name(dep).is_none())
        {
            return Err(GeneratorError::UnresolvedDependency {
                file: file.name().to_string(),
                dependency: missing.clone(),
            });
        }

        pool.add_file_descriptor_proto(file.clone())?;
        tracing::trace!(file = file.name(), "resolved file descriptor");
    }

    Ok(pool)
}

/// Package and class naming for the types of one file
struct FileNaming {
    java_package: String,
    outer_class: Option<String>,
    kotlin_package: String,
    proto_package: String,
}

impl FileNaming {
    fn relative<'n>(&self, full_name: &'n str) -> &'n str {
        if self.proto_package.is_empty() {
            full_name
        } else {
            full_name
                .strip_prefix(self.proto_package.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(full_name)
        }
    }

    fn host_class(&self, full_name: &str) -> String {
        let container = match &self.outer_class {
            Some(outer) => names::qualify(&self.java_package, outer),
            None => self.java_package.clone(),
        };
        names::qualify(&container, self.relative(full_name))
    }

    fn kotlin_class(&self, full_name: &str) -> String {
        names::qualify(&self.kotlin_package, self.relative(full_name))
    }
}

/// Resolved descriptors plus the options that shape naming
pub struct Resolver<'a> {
    pool: DescriptorPool,
    options: &'a GeneratorOptions,
}

impl<'a> Resolver<'a> {
    /// Resolve every file of the request, in order
    pub fn new(
        files: &[FileDescriptorProto],
        options: &'a GeneratorOptions,
    ) -> Result<Self, GeneratorError> {
        Ok(Self {
            pool: build_pool(files)?,
            options,
        })
    }

    /// Lower one file; `None` when the file lives in an excluded package
    pub fn file_unit(&self, name: &str) -> Result<Option<FileUnit>, GeneratorError> {
        let file = self
            .pool
            .get_file_by_name(name)
            .ok_or_else(|| GeneratorError::UnknownFile(name.to_string()))?;

        if is_excluded_package(file.package_name()) {
            tracing::debug!(file = name, "skipping excluded package");
            return Ok(None);
        }

        let naming = self.naming(&file);
        tracing::debug!(
            file = name,
            host_package = %naming.java_package,
            kotlin_package = %naming.kotlin_package,
            "lowering file"
        );

        let messages = file
            .messages()
            .filter(|m| !m.is_map_entry() && WellKnownType::from_full_name(m.full_name()).is_none())
            .map(|m| self.lower_message(&m))
            .collect::<Result<Vec<_>, _>>()?;
        let enums = file.enums().map(|e| self.lower_enum(&e)).collect();
        let services = file.services().map(|s| self.lower_service(&s)).collect();

        Ok(Some(FileUnit {
            proto_name: name.to_string(),
            proto_package: file.package_name().to_string(),
            host_package: naming.java_package,
            kotlin_package: naming.kotlin_package,
            messages,
            enums,
            services,
        }))
    }

    fn naming(&self, file: &FileDescriptor) -> FileNaming {
        let proto = file.file_descriptor_proto();
        let opts = proto.options.as_ref();

        let java_package = opts
            .and_then(|o| o.java_package.clone())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| proto.package().to_string());

        let multiple_files = opts.map(|o| o.java_multiple_files()).unwrap_or(false);
        let outer_class = if multiple_files {
            None
        } else {
            let mut taken = Vec::new();
            collect_type_names(&proto.message_type, &mut taken);
            taken.extend(proto.enum_type.iter().map(|e| e.name()));
            taken.extend(proto.service.iter().map(|s| s.name()));
            Some(names::java_outer_class_name(
                proto.name(),
                opts.and_then(|o| o.java_outer_classname.as_deref()),
                taken,
            ))
        };

        FileNaming {
            kotlin_package: self.options.kotlin_package(&java_package),
            java_package,
            outer_class,
            proto_package: proto.package().to_string(),
        }
    }

    fn lower_message(&self, message: &MessageDescriptor) -> Result<MessageType, GeneratorError> {
        let naming = self.naming(&message.parent_file());

        let declared = declared_fields(message);

        let mut fields = Vec::new();
        for field in &declared {
            if field
                .containing_oneof()
                .is_some_and(|oneof| !is_synthetic(&oneof))
            {
                continue;
            }
            fields.push(self.lower_field(field)?);
        }

        let nested_names: HashSet<String> = message
            .child_messages()
            .map(|m| m.name().to_string())
            .chain(message.child_enums().map(|e| e.name().to_string()))
            .collect();

        let oneofs = message
            .oneofs()
            .filter(|o| !is_synthetic(o))
            .map(|o| self.lower_oneof(&o, &declared, &nested_names))
            .collect::<Result<Vec<_>, _>>()?;

        let messages = message
            .child_messages()
            .filter(|m| !m.is_map_entry())
            .map(|m| self.lower_message(&m))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MessageType {
            name: message.name().to_string(),
            full_name: message.full_name().to_string(),
            host_class: naming.host_class(message.full_name()),
            kotlin_class: naming.kotlin_class(message.full_name()),
            fields,
            oneofs,
            messages,
            enums: message.child_enums().map(|e| self.lower_enum(&e)).collect(),
        })
    }

    fn lower_field(&self, field: &FieldDescriptor) -> Result<Field, GeneratorError> {
        let kind = if field.is_map() {
            let Kind::Message(entry) = field.kind() else {
                return Err(GeneratorError::MalformedMapEntry(field.full_name().to_string()));
            };
            let (Some(key), Some(value)) = (entry.get_field(1), entry.get_field(2)) else {
                return Err(GeneratorError::MalformedMapEntry(entry.full_name().to_string()));
            };
            FieldKind::Map {
                key: self.value_type(key.kind()),
                value: self.value_type(value.kind()),
            }
        } else if field.is_list() {
            FieldKind::Repeated(self.value_type(field.kind()))
        } else {
            FieldKind::Single(self.value_type(field.kind()))
        };

        let in_real_oneof = field
            .containing_oneof()
            .is_some_and(|oneof| !is_synthetic(&oneof));

        let presence = if field.is_list() || field.is_map() || in_real_oneof {
            Presence::None
        } else if matches!(field.kind(), Kind::Message(_)) {
            Presence::Implicit
        } else if field.supports_presence() {
            Presence::Explicit
        } else {
            Presence::None
        };

        Ok(Field {
            name: field.name().to_string(),
            number: field.number(),
            kotlin_name: names::field_name(field.name()),
            host_accessor: names::java_accessor_stem(field.name()),
            kind,
            presence,
        })
    }

    fn lower_oneof(
        &self,
        oneof: &OneofDescriptor,
        declared: &[FieldDescriptor],
        nested_names: &HashSet<String>,
    ) -> Result<OneOf, GeneratorError> {
        let mut sum_type = names::type_name(oneof.name());
        if nested_names.contains(&sum_type) {
            sum_type.push_str("Oneof");
        }

        let mut fields = Vec::new();
        let members = declared.iter().filter(|f| {
            f.containing_oneof()
                .is_some_and(|o| o.full_name() == oneof.full_name())
        });
        for field in members {
            let mut variant = names::type_name(field.name());
            if variant == sum_type {
                variant.push_str("Value");
            }
            fields.push(OneOfField {
                field: self.lower_field(field)?,
                variant,
                host_case: field.name().to_uppercase(),
            });
        }

        Ok(OneOf {
            name: oneof.name().to_string(),
            kotlin_name: names::field_name(oneof.name()),
            sum_type,
            host_accessor: names::java_camel_case(oneof.name(), true),
            fields,
        })
    }

    fn lower_enum(&self, enum_desc: &EnumDescriptor) -> EnumType {
        let file = enum_desc.parent_file();
        let naming = self.naming(&file);
        let mut seen = HashSet::new();

        EnumType {
            name: enum_desc.name().to_string(),
            full_name: enum_desc.full_name().to_string(),
            host_class: naming.host_class(enum_desc.full_name()),
            kotlin_class: naming.kotlin_class(enum_desc.full_name()),
            values: enum_desc
                .enum_descriptor_proto()
                .value
                .iter()
                .map(|v| EnumValue {
                    name: v.name().to_string(),
                    number: v.number(),
                    is_alias: !seen.insert(v.number()),
                })
                .collect(),
            open: file.file_descriptor_proto().syntax() == "proto3",
        }
    }

    fn lower_service(&self, service: &ServiceDescriptor) -> Service {
        let naming = self.naming(&service.parent_file());

        let methods = service
            .methods()
            .map(|m| Method {
                name: m.name().to_string(),
                full_name: format!("{}/{}", service.full_name(), m.name()),
                kotlin_name: names::rpc_function_name(m.name()),
                descriptor_getter: names::grpc_method_getter(m.name()),
                input: self.message_value(&m.input()),
                output: self.message_value(&m.output()),
                shape: MethodShape::from_flags(m.is_client_streaming(), m.is_server_streaming()),
            })
            .collect();

        Service {
            name: service.name().to_string(),
            full_name: service.full_name().to_string(),
            grpc_class: names::qualify(&naming.java_package, &format!("{}Grpc", service.name())),
            methods,
        }
    }

    fn value_type(&self, kind: Kind) -> ValueType {
        match kind {
            Kind::Double => ValueType::Scalar(Scalar::Double),
            Kind::Float => ValueType::Scalar(Scalar::Float),
            Kind::Int32 | Kind::Uint32 | Kind::Sint32 | Kind::Fixed32 | Kind::Sfixed32 => {
                ValueType::Scalar(Scalar::Int)
            }
            Kind::Int64 | Kind::Uint64 | Kind::Sint64 | Kind::Fixed64 | Kind::Sfixed64 => {
                ValueType::Scalar(Scalar::Long)
            }
            Kind::Bool => ValueType::Scalar(Scalar::Bool),
            Kind::String => ValueType::Scalar(Scalar::String),
            Kind::Bytes => ValueType::Scalar(Scalar::Bytes),
            Kind::Message(message) => self.message_value(&message),
            Kind::Enum(enum_desc) => ValueType::Enum(self.enum_ref(&enum_desc)),
        }
    }

    fn message_value(&self, message: &MessageDescriptor) -> ValueType {
        if let Some(wkt) = WellKnownType::from_full_name(message.full_name()) {
            return ValueType::WellKnown(wkt);
        }

        let file = message.parent_file();
        let naming = self.naming(&file);
        let generated = !is_excluded_package(file.package_name());

        ValueType::Message(TypeRef {
            full_name: message.full_name().to_string(),
            host_class: naming.host_class(message.full_name()),
            kotlin_class: generated.then(|| naming.kotlin_class(message.full_name())),
            kotlin_package: generated.then(|| naming.kotlin_package.clone()),
            first_value: None,
        })
    }

    fn enum_ref(&self, enum_desc: &EnumDescriptor) -> TypeRef {
        let file = enum_desc.parent_file();
        let naming = self.naming(&file);
        let generated = !is_excluded_package(file.package_name());

        TypeRef {
            full_name: enum_desc.full_name().to_string(),
            host_class: naming.host_class(enum_desc.full_name()),
            kotlin_class: generated.then(|| naming.kotlin_class(enum_desc.full_name())),
            kotlin_package: generated.then(|| naming.kotlin_package.clone()),
            first_value: enum_desc
                .enum_descriptor_proto()
                .value
                .first()
                .map(|v| v.name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Presence;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{FieldDescriptorProto, FileOptions, OneofDescriptorProto};

    fn file(name: &str, package: &str, deps: &[&str]) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            dependency: deps.iter().map(|d| d.to_string()).collect(),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_excluded_packages() {
        assert!(is_excluded_package("google.protobuf"));
        assert!(is_excluded_package("buf.validate"));
        assert!(is_excluded_package("google.api.expr"));
        assert!(!is_excluded_package("google.apis"));
        assert!(!is_excluded_package("example"));
    }

    #[test]
    fn test_dependency_order_enforced() {
        let files = vec![file("b.proto", "b", &["a.proto"]), file("a.proto", "a", &[])];
        match build_pool(&files) {
            Err(GeneratorError::UnresolvedDependency { file, dependency }) => {
                assert_eq!(file, "b.proto");
                assert_eq!(dependency, "a.proto");
            }
            other => panic!("expected resolution error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_dependency_order_accepted() {
        let files = vec![file("a.proto", "a", &[]), file("b.proto", "b", &["a.proto"])];
        let pool = build_pool(&files).unwrap();
        assert!(pool.get_file_by_name("b.proto").is_some());
    }

    #[test]
    fn test_host_and_kotlin_class_names() {
        let mut f = file("example/person.proto", "example", &[]);
        f.message_type.push(DescriptorProto {
            name: Some("Person".to_string()),
            ..Default::default()
        });
        f.options = Some(FileOptions {
            java_package: Some("com.example".to_string()),
            ..Default::default()
        });

        let options = GeneratorOptions::default();
        let resolver = Resolver::new(&[f], &options).unwrap();
        let unit = resolver.file_unit("example/person.proto").unwrap().unwrap();

        assert_eq!(unit.kotlin_package, "com.example.kdata");
        let person = &unit.messages[0];
        assert_eq!(person.host_class, "com.example.PersonOuterClass.Person");
        assert_eq!(person.kotlin_class, "com.example.kdata.Person");
    }

    #[test]
    fn test_multiple_files_drops_outer_class() {
        let mut f = file("shop.proto", "shop", &[]);
        f.message_type.push(DescriptorProto {
            name: Some("Order".to_string()),
            ..Default::default()
        });
        f.options = Some(FileOptions {
            java_multiple_files: Some(true),
            ..Default::default()
        });

        let options = GeneratorOptions::default();
        let resolver = Resolver::new(&[f], &options).unwrap();
        let unit = resolver.file_unit("shop.proto").unwrap().unwrap();
        assert_eq!(unit.messages[0].host_class, "shop.Order");
        assert_eq!(unit.messages[0].kotlin_class, "shop.kdata.Order");
    }

    #[test]
    fn test_proto3_optional_is_a_plain_field() {
        let field = |name: &str, number: i32, oneof: i32, optional: bool| FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional.into()),
            r#type: Some(Type::String.into()),
            oneof_index: Some(oneof),
            proto3_optional: Some(optional),
            ..Default::default()
        };
        let oneof = |name: &str| OneofDescriptorProto {
            name: Some(name.to_string()),
            ..Default::default()
        };

        let mut f = file("user.proto", "user", &[]);
        f.message_type.push(DescriptorProto {
            name: Some("User".to_string()),
            field: vec![
                field("email", 1, 0, false),
                field("phone", 2, 0, false),
                field("nick", 3, 1, true),
            ],
            oneof_decl: vec![oneof("contact"), oneof("_nick")],
            ..Default::default()
        });

        let options = GeneratorOptions::default();
        let resolver = Resolver::new(&[f], &options).unwrap();
        let unit = resolver.file_unit("user.proto").unwrap().unwrap();
        let user = &unit.messages[0];

        assert_eq!(user.fields.len(), 1);
        assert_eq!(user.fields[0].name, "nick");
        assert_eq!(user.fields[0].presence, Presence::Explicit);
        assert_eq!(user.oneofs.len(), 1);
        assert_eq!(user.oneofs[0].name, "contact");
        assert_eq!(user.oneofs[0].fields.len(), 2);
    }

    #[test]
    fn test_unknown_file() {
        let options = GeneratorOptions::default();
        let resolver = Resolver::new(&[file("a.proto", "a", &[])], &options).unwrap();
        assert!(matches!(
            resolver.file_unit("missing.proto"),
            Err(GeneratorError::UnknownFile(_))
        ));
    }

    #[test]
    fn test_excluded_file_yields_nothing() {
        let options = GeneratorOptions::default();
        let resolver = Resolver::new(
            &[file("google/protobuf/empty.proto", "google.protobuf", &[])],
            &options,
        )
        .unwrap();
        assert!(resolver
            .file_unit("google/protobuf/empty.proto")
            .unwrap()
            .is_none());
    }
}
