//! Solidity interface rendering from a resolved ABI.

use crate::annotations::Annotations;
use crate::ast::{CompoundType, EventItem, FunctionItem, ResolvedAbi, Value};
use crate::compound::array_suffix;

/// Version stamped into the generated banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const INDENT: &str = "\t";

/// Everything the renderer needs to emit one interface.
#[derive(Debug, Clone)]
pub struct InterfaceSpecification<'a> {
    /// Interface identifier (`interface <name> { ... }`).
    pub name: &'a str,
    /// Flattened ABI and the struct definitions it refers to.
    pub resolved: &'a ResolvedAbi,
    /// Selector annotations; rendered only when `Some`.
    pub annotations: Option<&'a Annotations>,
    /// SPDX identifier for the leading license comment.
    pub license: Option<&'a str>,
    /// Version constraint for the `pragma solidity` line.
    pub pragma: Option<&'a str>,
}

/// Returns `true` if `solidity_type` needs a data location (`memory`) when used
/// as a function parameter or return value.
///
/// Only elementary value types are exempt; struct names and arrays of anything
/// are reference types.
pub fn requires_location(solidity_type: &str) -> bool {
    if !array_suffix(solidity_type).is_empty() {
        return true;
    }
    !is_value_type(solidity_type)
}

fn is_value_type(ty: &str) -> bool {
    match ty {
        "bool" | "address" | "address payable" | "int" | "uint" | "fixed" | "ufixed" => true,
        "string" | "bytes" => false,
        _ => {
            if let Some(bits) = ty.strip_prefix("uint").or_else(|| ty.strip_prefix("int")) {
                return is_decimal(bits);
            }
            if let Some(width) = ty.strip_prefix("bytes") {
                return is_decimal(width);
            }
            if let Some(rest) = ty.strip_prefix("ufixed").or_else(|| ty.strip_prefix("fixed")) {
                return rest
                    .split_once('x')
                    .map(|(m, n)| is_decimal(m) && is_decimal(n))
                    .unwrap_or(false);
            }
            false
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Renders the full interface source text.
pub fn render_interface(spec: &InterfaceSpecification<'_>) -> String {
    let mut out = String::new();

    if let Some(license) = spec.license {
        out.push_str(&format!("// SPDX-License-Identifier: {license}\n"));
    }
    if let Some(pragma) = spec.pragma {
        out.push_str(&format!("pragma solidity {pragma};\n"));
    }
    if spec.license.is_some() || spec.pragma.is_some() {
        out.push('\n');
    }

    out.push_str("// Interface generated by solface\n");
    out.push_str(&format!("// solface version: {VERSION}\n"));
    if let Some(annotations) = spec.annotations {
        out.push_str(&format!(
            "// Interface ID: {}\n",
            annotations.interface_id_hex()
        ));
    }

    let abi = &spec.resolved.enriched_abi;
    out.push_str(&format!("interface {} {{\n", spec.name));

    out.push_str(&format!("{INDENT}// structs\n"));
    for compound in &spec.resolved.compound_types {
        out.push_str(&render_struct(compound));
    }

    out.push_str(&format!("\n{INDENT}// events\n"));
    for event in &abi.events {
        out.push_str(&render_event(event));
    }

    out.push_str(&format!("\n{INDENT}// functions\n"));
    for (index, function) in abi.functions.iter().enumerate() {
        if let Some(selector) = spec.annotations.and_then(|a| a.selector_hex(index)) {
            out.push_str(&format!("{INDENT}// Selector: {selector}\n"));
        }
        out.push_str(&render_function(function));
    }

    out.push_str(&format!("\n{INDENT}// errors\n"));
    for error in &abi.errors {
        out.push_str(&format!(
            "{INDENT}error {}({});\n",
            error.name,
            render_parameters(&error.inputs, false)
        ));
    }

    out.push_str("}\n");
    out
}

fn render_struct(compound: &CompoundType) -> String {
    let mut out = format!("{INDENT}struct {} {{\n", compound.type_name);
    for member in &compound.members {
        out.push_str(&format!(
            "{INDENT}{INDENT}{};\n",
            declaration(&member.value.ty, None, &member.name)
        ));
    }
    out.push_str(&format!("{INDENT}}}\n"));
    out
}

fn render_event(event: &EventItem) -> String {
    let params: Vec<String> = event
        .inputs
        .iter()
        .map(|arg| {
            let modifier = arg.indexed.then_some("indexed");
            declaration(&arg.value.ty, modifier, &arg.value.name)
        })
        .collect();
    let anonymous = if event.anonymous { " anonymous" } else { "" };
    format!(
        "{INDENT}event {}({}){anonymous};\n",
        event.name,
        params.join(", ")
    )
}

fn render_function(function: &FunctionItem) -> String {
    let mut out = format!(
        "{INDENT}function {}({}) external",
        function.name,
        render_parameters(&function.inputs, true)
    );
    if let Some(keyword) = function.state_mutability.and_then(|m| m.keyword()) {
        out.push(' ');
        out.push_str(keyword);
    }
    if !function.outputs.is_empty() {
        out.push_str(&format!(
            " returns ({})",
            render_parameters(&function.outputs, true)
        ));
    }
    out.push_str(";\n");
    out
}

fn render_parameters(values: &[Value], with_location: bool) -> String {
    values
        .iter()
        .map(|value| {
            let location = (with_location && requires_location(&value.ty)).then_some("memory");
            declaration(&value.ty, location, &value.name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn declaration(ty: &str, modifier: Option<&str>, name: &str) -> String {
    let mut out = ty.to_string();
    if let Some(modifier) = modifier {
        out.push(' ');
        out.push_str(modifier);
    }
    if !name.is_empty() {
        out.push(' ');
        out.push_str(name);
    }
    out
}
