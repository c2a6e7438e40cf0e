//! RPC surface generation
//!
//! Each service becomes `object <Service>Rpc` holding three classes built on
//! grpc-kotlin:
//!
//! - `<Service>CoroutineImplBase`: one `open` function per RPC that fails
//!   with `UNIMPLEMENTED`, plus a final `bindService()` wrapping each
//!   function in host-type adapters.
//! - `<Service>CoroutineStub`: a client stub converting requests to host
//!   messages and responses back.
//! - `<Service>PartialServer`: the RPCs as constructor lambdas, so callers
//!   implement only a subset. Adapters are picked at bind time from the
//!   method type the descriptor reports.
//!
//! The shape of every method is known while generating, so the base and
//! the stub are specialised per shape here. The partial server carries the
//! shape as a tagged handler instead and matches it against the descriptor.

use super::convert::{to_host_expr, to_idiomatic_expr};
use super::writer::CodeWriter;
use crate::model::{Method, MethodShape, Service, ValueType};
use crate::types::{map_value, value_imports, Import};
use crate::GeneratorError;

const GRPC_IMPORTS: &[&str] = &[
    "io.grpc.CallOptions",
    "io.grpc.Channel",
    "io.grpc.Metadata",
    "io.grpc.MethodDescriptor",
    "io.grpc.ServerMethodDefinition",
    "io.grpc.ServerServiceDefinition",
    "io.grpc.ServiceDescriptor",
    "io.grpc.Status",
    "io.grpc.StatusException",
    "io.grpc.kotlin.AbstractCoroutineServerImpl",
    "io.grpc.kotlin.AbstractCoroutineStub",
    "io.grpc.kotlin.ClientCalls",
    "io.grpc.kotlin.ServerCalls",
    "kotlin.coroutines.CoroutineContext",
    "kotlin.coroutines.EmptyCoroutineContext",
    "kotlinx.coroutines.flow.Flow",
];

const FLOW_MAP_IMPORT: &str = "kotlinx.coroutines.flow.map";

/// Direction of a conversion applied to a call result
#[derive(Debug, Clone, Copy)]
enum Direction {
    ToIdiomatic,
    ToHost,
}

impl Direction {
    fn convert(self, value: &ValueType, expr: &str) -> Result<String, GeneratorError> {
        match self {
            Direction::ToIdiomatic => to_idiomatic_expr(value, expr),
            Direction::ToHost => to_host_expr(value, expr),
        }
    }

    /// Some well-known conversions (`Empty`) produce a constant and would
    /// drop the expression they are handed
    fn ignores_input(self, value: &ValueType) -> Result<bool, GeneratorError> {
        let ValueType::WellKnown(wkt) = value else {
            return Ok(false);
        };
        let template = match self {
            Direction::ToIdiomatic => wkt.to_idiomatic()?,
            Direction::ToHost => wkt.to_host()?,
        };
        Ok(!template.has_hole())
    }
}

/// Convert the result of `call`, keeping the call even when the conversion
/// does not use its input
fn convert_result(
    direction: Direction,
    value: &ValueType,
    call: &str,
) -> Result<String, GeneratorError> {
    if direction.ignores_input(value)? {
        Ok(format!("{}.let {{ {} }}", call, direction.convert(value, "it")?))
    } else {
        direction.convert(value, call)
    }
}

/// Convert every element of the flow `expr`
fn convert_flow(
    direction: Direction,
    value: &ValueType,
    expr: &str,
) -> Result<String, GeneratorError> {
    if value.is_identity() {
        Ok(expr.to_string())
    } else {
        Ok(format!("{}.map {{ {} }}", expr, direction.convert(value, "it")?))
    }
}

fn idiomatic_type(value: &ValueType) -> String {
    map_value(value).kotlin_type
}

fn host_type(value: &ValueType) -> String {
    match value {
        ValueType::Scalar(_) => map_value(value).kotlin_type,
        ValueType::Enum(r) | ValueType::Message(r) => r.host_class.clone(),
        ValueType::WellKnown(wkt) => wkt.host_class(),
    }
}

fn descriptor_call(service: &Service, method: &Method) -> String {
    format!("{}.{}()", service.grpc_class, method.descriptor_getter)
}

/// Kotlin parameter list and return type of the idiomatic function
fn signature(method: &Method) -> (String, String) {
    let input = idiomatic_type(&method.input);
    let output = idiomatic_type(&method.output);
    let params = if method.shape.streams_requests() {
        format!("requests: Flow<{}>", input)
    } else {
        format!("request: {}", input)
    };
    let returns = if method.shape.streams_responses() {
        format!("Flow<{}>", output)
    } else {
        output
    };
    (params, returns)
}

/// Kotlin function type of the idiomatic implementation
fn function_type(method: &Method) -> String {
    let input = idiomatic_type(&method.input);
    let output = idiomatic_type(&method.output);
    match method.shape {
        MethodShape::Unary => format!("suspend ({}) -> {}", input, output),
        MethodShape::ClientStreaming => format!("suspend (Flow<{}>) -> {}", input, output),
        MethodShape::ServerStreaming => format!("({}) -> Flow<{}>", input, output),
        MethodShape::BidiStreaming => format!("(Flow<{}>) -> Flow<{}>", input, output),
    }
}

/// Lambda adapting host requests to `target` and its result back to host
/// responses, e.g. `{ request -> sayHello(request.toDataClass()).toProto() }`
fn server_adapter(method: &Method, target: &str) -> Result<String, GeneratorError> {
    let (param, argument) = if method.shape.streams_requests() {
        (
            "requests",
            convert_flow(Direction::ToIdiomatic, &method.input, "requests")?,
        )
    } else {
        (
            "request",
            Direction::ToIdiomatic.convert(&method.input, "request")?,
        )
    };
    let call = format!("{}({})", target, argument);
    let body = if method.shape.streams_responses() {
        convert_flow(Direction::ToHost, &method.output, &call)?
    } else {
        convert_result(Direction::ToHost, &method.output, &call)?
    };
    Ok(format!("{{ {} -> {} }}", param, body))
}

fn server_definition_fn(shape: MethodShape) -> &'static str {
    match shape {
        MethodShape::Unary => "unaryServerMethodDefinition",
        MethodShape::ClientStreaming => "clientStreamingServerMethodDefinition",
        MethodShape::ServerStreaming => "serverStreamingServerMethodDefinition",
        MethodShape::BidiStreaming => "bidiStreamingServerMethodDefinition",
    }
}

fn client_call_fn(shape: MethodShape) -> &'static str {
    match shape {
        MethodShape::Unary => "unaryRpc",
        MethodShape::ClientStreaming => "clientStreamingRpc",
        MethodShape::ServerStreaming => "serverStreamingRpc",
        MethodShape::BidiStreaming => "bidiStreamingRpc",
    }
}

fn handler_variant(shape: MethodShape) -> &'static str {
    match shape {
        MethodShape::Unary => "Unary",
        MethodShape::ClientStreaming => "ClientStreaming",
        MethodShape::ServerStreaming => "ServerStreaming",
        MethodShape::BidiStreaming => "BidiStreaming",
    }
}

fn unimplemented_call(method: &Method) -> String {
    format!("unimplemented(\"{}\")", method.full_name)
}

/// Emit the complete `<Service>Rpc` object
pub fn write_service(w: &mut CodeWriter, service: &Service) -> Result<(), GeneratorError> {
    tracing::trace!(service = %service.full_name, methods = service.methods.len(), "emitting service");

    for symbol in GRPC_IMPORTS {
        w.import(Import::Symbol(*symbol));
    }
    if service
        .methods
        .iter()
        .any(|m| m.shape.streams_requests() || m.shape.streams_responses())
    {
        w.import(Import::Symbol(FLOW_MAP_IMPORT));
    }
    for method in &service.methods {
        w.import_all(&value_imports(&method.input));
        w.import_all(&value_imports(&method.output));
    }

    w.open(format!("object {}Rpc {{", service.name));
    w.line("val serviceDescriptor: ServiceDescriptor");
    w.indent();
    w.line(format!("get() = {}.getServiceDescriptor()", service.grpc_class));
    w.dedent();
    w.blank();
    write_server_base(w, service)?;
    w.blank();
    write_client_stub(w, service)?;
    w.blank();
    write_partial_server(w, service)?;
    w.blank();
    w.line("private fun unimplemented(method: String): StatusException =");
    w.indent();
    w.line("StatusException(Status.UNIMPLEMENTED.withDescription(\"Method $method is unimplemented\"))");
    w.dedent();
    w.close("}");
    Ok(())
}

fn write_server_base(w: &mut CodeWriter, service: &Service) -> Result<(), GeneratorError> {
    w.open(format!("abstract class {}CoroutineImplBase(", service.name));
    w.line("coroutineContext: CoroutineContext = EmptyCoroutineContext,");
    w.close(") : AbstractCoroutineServerImpl(coroutineContext) {");
    w.indent();

    for method in &service.methods {
        let (params, returns) = signature(method);
        let modifier = if method.shape.streams_responses() {
            "open fun"
        } else {
            "open suspend fun"
        };
        w.line(format!(
            "{} {}({}): {} =",
            modifier, method.kotlin_name, params, returns
        ));
        w.indent();
        w.line(format!("throw {}", unimplemented_call(method)));
        w.dedent();
        w.blank();
    }

    w.line("final override fun bindService(): ServerServiceDefinition =");
    w.indent();
    w.line(format!(
        "ServerServiceDefinition.builder({}.getServiceDescriptor())",
        service.grpc_class
    ));
    w.indent();
    for method in &service.methods {
        w.open(".addMethod(");
        w.open(format!("ServerCalls.{}(", server_definition_fn(method.shape)));
        w.line("context = this.context,");
        w.line(format!("descriptor = {},", descriptor_call(service, method)));
        w.line(format!(
            "implementation = {},",
            server_adapter(method, &method.kotlin_name)?
        ));
        w.close("),");
        w.close(")");
    }
    w.line(".build()");
    w.dedent();
    w.dedent();
    w.close("}");
    Ok(())
}

fn write_client_stub(w: &mut CodeWriter, service: &Service) -> Result<(), GeneratorError> {
    let stub = format!("{}CoroutineStub", service.name);
    w.open(format!("class {} @JvmOverloads constructor(", stub));
    w.line("channel: Channel,");
    w.line("callOptions: CallOptions = CallOptions.DEFAULT,");
    w.close(format!(
        ") : AbstractCoroutineStub<{}>(channel, callOptions) {{",
        stub
    ));
    w.indent();

    w.line(format!(
        "override fun build(channel: Channel, callOptions: CallOptions): {} =",
        stub
    ));
    w.indent();
    w.line(format!("{}(channel, callOptions)", stub));
    w.dedent();

    for method in &service.methods {
        w.blank();
        write_client_method(w, service, method)?;
    }

    w.close("}");
    Ok(())
}

fn write_client_method(
    w: &mut CodeWriter,
    service: &Service,
    method: &Method,
) -> Result<(), GeneratorError> {
    let (params, returns) = signature(method);
    let modifier = if method.shape.streams_responses() {
        "fun"
    } else {
        "suspend fun"
    };
    let request = if method.shape.streams_requests() {
        convert_flow(Direction::ToHost, &method.input, "requests")?
    } else {
        Direction::ToHost.convert(&method.input, "request")?
    };

    w.open(format!(
        "{} {}({}, headers: Metadata = Metadata()): {} {{",
        modifier, method.kotlin_name, params, returns
    ));
    w.open(format!("val response = ClientCalls.{}(", client_call_fn(method.shape)));
    w.line("channel,");
    w.line(format!("{},", descriptor_call(service, method)));
    w.line(format!("{},", request));
    w.line("callOptions,");
    w.line("headers,");
    w.close(")");
    let result = if method.shape.streams_responses() {
        convert_flow(Direction::ToIdiomatic, &method.output, "response")?
    } else {
        convert_result(Direction::ToIdiomatic, &method.output, "response")?
    };
    w.line(format!("return {}", result));
    w.close("}");
    Ok(())
}

fn write_partial_server(w: &mut CodeWriter, service: &Service) -> Result<(), GeneratorError> {
    w.open(format!("class {}PartialServer(", service.name));
    for method in &service.methods {
        w.line(format!(
            "private val {}: {} = {{ throw {} }},",
            method.kotlin_name,
            function_type(method),
            unimplemented_call(method)
        ));
    }
    w.line("coroutineContext: CoroutineContext = EmptyCoroutineContext,");
    w.close(") : AbstractCoroutineServerImpl(coroutineContext) {");
    w.indent();

    w.line("override fun bindService(): ServerServiceDefinition =");
    w.indent();
    w.line(format!(
        "ServerServiceDefinition.builder({}.getServiceDescriptor())",
        service.grpc_class
    ));
    w.indent();
    for method in &service.methods {
        w.open(".addMethod(");
        w.open("bind(");
        w.line(format!("{},", descriptor_call(service, method)));
        w.line(format!(
            "Handler.{}<{}, {}> {},",
            handler_variant(method.shape),
            host_type(&method.input),
            host_type(&method.output),
            server_adapter(method, &method.kotlin_name)?
        ));
        w.close("),");
        w.close(")");
    }
    w.line(".build()");
    w.dedent();
    w.dedent();
    w.blank();

    write_handler(w);
    w.blank();
    write_bind(w);
    w.close("}");
    Ok(())
}

/// Tagged implementation; the tag must agree with the descriptor's type
fn write_handler(w: &mut CodeWriter) {
    w.open("private sealed interface Handler<ReqT, RespT> {");
    w.line("class Unary<ReqT, RespT>(val call: suspend (ReqT) -> RespT) : Handler<ReqT, RespT>");
    w.line("class ClientStreaming<ReqT, RespT>(val call: suspend (Flow<ReqT>) -> RespT) : Handler<ReqT, RespT>");
    w.line("class ServerStreaming<ReqT, RespT>(val call: (ReqT) -> Flow<RespT>) : Handler<ReqT, RespT>");
    w.line("class BidiStreaming<ReqT, RespT>(val call: (Flow<ReqT>) -> Flow<RespT>) : Handler<ReqT, RespT>");
    w.close("}");
}

/// Dispatch on the method type; every known type is matched and anything
/// else fails at bind time
fn write_bind(w: &mut CodeWriter) {
    w.open("private fun <ReqT, RespT> bind(");
    w.line("descriptor: MethodDescriptor<ReqT, RespT>,");
    w.line("handler: Handler<ReqT, RespT>,");
    w.close("): ServerMethodDefinition<ReqT, RespT> = when (descriptor.type) {");
    w.indent();
    for (method_type, shape) in [
        ("UNARY", MethodShape::Unary),
        ("CLIENT_STREAMING", MethodShape::ClientStreaming),
        ("SERVER_STREAMING", MethodShape::ServerStreaming),
        ("BIDI_STREAMING", MethodShape::BidiStreaming),
    ] {
        w.line(format!("MethodDescriptor.MethodType.{} ->", method_type));
        w.indent();
        w.line(format!(
            "if (handler is Handler.{}) ServerCalls.{}(context, descriptor, handler.call)",
            handler_variant(shape),
            server_definition_fn(shape)
        ));
        w.line("else throw shapeMismatch(descriptor)");
        w.dedent();
    }
    w.line("else -> throw IllegalStateException(");
    w.indent();
    w.line("\"Unrecognized method type ${descriptor.type} for ${descriptor.fullMethodName}\",");
    w.dedent();
    w.line(")");
    w.close("}");
    w.blank();
    w.line("private fun shapeMismatch(descriptor: MethodDescriptor<*, *>): IllegalStateException =");
    w.indent();
    w.line("IllegalStateException(\"Handler does not match ${descriptor.type} method ${descriptor.fullMethodName}\")");
    w.dedent();
}
