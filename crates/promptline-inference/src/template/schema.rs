//! `TypeScript`-style function schema shown to the model

use std::fmt::Write;

use serde_json::Value;

use crate::types::{FunctionDefinition, Message};

/// System turn placed after the function schema
pub const DEFAULT_SYSTEM_MESSAGE: &str = "A chat between a curious user and an artificial intelligence assistant. \
     The assistant gives helpful, detailed, and polite answers to the user's questions. \
     The assistant calls functions with appropriate input when necessary";

const NAMESPACE_HEADER: &str =
    "// Supported function definitions that should be called when necessary.\nnamespace functions {\n\n";
const NAMESPACE_FOOTER: &str = "} // namespace functions";

/// Render functions as a `namespace functions { ... }` block
pub fn render_namespace(functions: &[FunctionDefinition]) -> String {
    let mut out = String::from(NAMESPACE_HEADER);

    for function in functions {
        render_function(&mut out, function);
    }

    out.push_str(NAMESPACE_FOOTER);
    out
}

/// Schema and default system turns that open every conversation
pub(crate) fn system_messages(functions: &[FunctionDefinition]) -> [Message; 2] {
    [
        Message::system(render_namespace(functions)),
        Message::system(DEFAULT_SYSTEM_MESSAGE),
    ]
}

fn render_function(out: &mut String, function: &FunctionDefinition) {
    if let Some(description) = function.description.as_deref().filter(|d| !d.is_empty()) {
        write_comment(out, description);
    }

    let properties = function
        .parameters
        .as_ref()
        .and_then(|params| params.get("properties"))
        .and_then(Value::as_object)
        .filter(|props| !props.is_empty());

    let Some(properties) = properties else {
        let _ = write!(out, "type {} = () => any;\n\n", function.name);
        return;
    };

    let required: Vec<&str> = function
        .parameters
        .as_ref()
        .and_then(|params| params.get("required"))
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let _ = writeln!(out, "type {} = (_: {{", function.name);

    for (name, property) in properties {
        if let Some(description) = property.get("description").and_then(Value::as_str) {
            write_comment(out, description);
        }

        let optional = if required.contains(&name.as_str()) { "" } else { "?" };
        let _ = write!(out, "{name}{optional}: {},", type_of(property));

        if let Some(default) = property.get("default") {
            let _ = write!(out, " // default: {default}");
        }

        out.push('\n');
    }

    out.push_str("}) => any;\n\n");
}

fn write_comment(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "// {line}");
    }
}

fn type_of(schema: &Value) -> String {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return values.iter().map(Value::to_string).collect::<Vec<_>>().join(" | ");
    }

    match schema.get("type") {
        Some(Value::String(name)) => named_type(name, schema),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(|name| named_type(name, schema))
            .collect::<Vec<_>>()
            .join(" | "),
        _ => "any".to_owned(),
    }
}

fn named_type(name: &str, schema: &Value) -> String {
    match name {
        "string" => "string".to_owned(),
        "number" | "integer" => "number".to_owned(),
        "boolean" => "boolean".to_owned(),
        "null" => "null".to_owned(),
        "object" => "object".to_owned(),
        "array" => {
            let item = schema.get("items").map_or_else(|| "any".to_owned(), type_of);
            if item.contains(' ') {
                format!("({item})[]")
            } else {
                format!("{item}[]")
            }
        }
        _ => "any".to_owned(),
    }
}
