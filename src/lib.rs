pub mod annotations;
pub mod ast;
pub mod compound;
pub mod decode;
pub mod error;
pub mod flatten;
pub mod solidity_codegen;

use std::fs;
use std::path::Path;

use semver::VersionReq;
use tracing::debug;

use annotations::annotate;
pub use ast::{CompoundType, DecodedAbi, NamedValue, ResolvedAbi, Value};
pub use compound::{find_compound_types, resolve_value, NamingPolicy, ResolutionContext};
pub use decode::decode_abi;
pub use error::SolfaceError;
pub use flatten::resolve_compounds;
use flatten::synthesized_name_collisions;
use solidity_codegen::{render_interface, InterfaceSpecification};

/// Options controlling the generated Solidity interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceOptions {
    /// Name of the generated `interface`. Must be non-empty.
    pub name: String,
    /// SPDX license identifier for the header comment.
    pub license: Option<String>,
    /// Constraint for the `pragma solidity` line (for example `^0.8.20`).
    pub pragma: Option<String>,
    /// Whether to emit the interface ID and per-function selectors as comments.
    pub include_annotations: bool,
}

impl InterfaceOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
/// Generated interface source plus non-fatal diagnostics.
pub struct GeneratedInterface {
    /// Solidity source text.
    pub source: String,
    /// Diagnostic messages (name collisions, unrecognized pragma).
    pub warnings: Vec<String>,
}

/// Decodes and flattens an ABI given as JSON text.
pub fn resolve_abi(input: &str) -> Result<ResolvedAbi, SolfaceError> {
    let abi = decode_abi(input)?;
    Ok(resolve_compounds(&abi))
}

/// Decodes and flattens an ABI, returning the resolution result as JSON text.
pub fn resolve_abi_to_json(input: &str, pretty: bool) -> Result<String, SolfaceError> {
    resolve_abi(input)?.to_json_string(pretty)
}

/// Generates a Solidity interface from ABI JSON text.
pub fn generate_interface(
    input: &str,
    options: &InterfaceOptions,
) -> Result<GeneratedInterface, SolfaceError> {
    if options.name.trim().is_empty() {
        return Err(SolfaceError::OptionError(
            "interface name must be a non-empty string".to_string(),
        ));
    }

    let abi = decode_abi(input)?;
    let annotations = options.include_annotations.then(|| annotate(&abi));
    let resolved = resolve_compounds(&abi);

    let mut warnings = Vec::new();
    for name in synthesized_name_collisions(&resolved) {
        warnings.push(format!(
            "generated struct name '{name}' is also declared by the ABI; \
             the interface may not compile"
        ));
    }
    if let Some(pragma) = options.pragma.as_deref() {
        warnings.extend(pragma_warning(pragma));
    }

    let spec = InterfaceSpecification {
        name: &options.name,
        resolved: &resolved,
        annotations: annotations.as_ref(),
        license: options.license.as_deref(),
        pragma: options.pragma.as_deref(),
    };
    let source = render_interface(&spec);

    debug!(
        interface = %options.name,
        structs = resolved.compound_types.len(),
        warnings = warnings.len(),
        "generated interface"
    );

    Ok(GeneratedInterface { source, warnings })
}

/// Generates a Solidity interface from an ABI JSON file.
pub fn generate_interface_from_path(
    path: impl AsRef<Path>,
    options: &InterfaceOptions,
) -> Result<GeneratedInterface, SolfaceError> {
    let input = fs::read_to_string(path.as_ref())?;
    generate_interface(&input, options)
}

/// Checks that a pragma looks like a version constraint.
///
/// Solidity separates comparators with whitespace, so they are joined with
/// commas before parsing.
fn pragma_warning(pragma: &str) -> Option<String> {
    let normalized = pragma.split_whitespace().collect::<Vec<_>>().join(", ");
    match VersionReq::parse(&normalized) {
        Ok(_) => None,
        Err(e) => Some(format!(
            "pragma '{pragma}' is not a recognizable version constraint: {e}"
        )),
    }
}
