//! Compound (tuple/struct) detection and recursive resolution into named types.
//!
//! A parameter is compound exactly when it declares components. Resolving a
//! compound parameter walks its members bottom-up, synthesizes one
//! [`CompoundType`] per compound node, and replaces the node with a plain
//! parameter whose type is the synthesized name.
//!
//! A base name that ends in a digit is joined to the counter with `_`
//! (`Asset1_0`), so no two synthesized names can spell the same string.
//! Placeholder member names skip any name a sibling member already uses.
//!
//! Synthesized names are not checked against structs the ABI itself declares
//! through `internalType`, and structurally identical compounds are never
//! merged: each occurrence gets its own type. See
//! [`crate::flatten::synthesized_name_collisions`] for the collision report.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::ast::{CompoundType, DecodedAbi, NamedValue, Value};

const GENERIC_TYPE_BASE: &str = "Compound";
const PLACEHOLDER_MEMBER_BASE: &str = "Attribute";

impl Value {
    /// Returns `true` if this parameter is an aggregate (it has components).
    ///
    /// Arrays of scalars such as `uint256[]` are not compound.
    pub fn is_compound(&self) -> bool {
        !self.components.is_empty()
    }
}

/// How unnamed members of synthesized types are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Unnamed members get a fresh `Attribute<N>` name.
    GeneratePlaceholders,
    /// Unnamed members keep an empty name (function return values).
    LeaveUnnamed,
}

/// Counters shared by every resolution call within one ABI run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionContext {
    type_counter: usize,
    name_counter: usize,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of type names handed out so far.
    pub fn types_generated(&self) -> usize {
        self.type_counter
    }

    /// Returns a fresh type name based on the `internalType` hint.
    ///
    /// `Asset` with counter 10 gives `Asset10`; `Asset1` with counter 0 gives
    /// `Asset1_0`.
    pub fn next_type_name(&mut self, internal_type: Option<&str>) -> String {
        let base = parse_internal_type(internal_type);
        let name = if base.ends_with(|c: char| c.is_ascii_digit()) {
            format!("{base}_{}", self.type_counter)
        } else {
            format!("{base}{}", self.type_counter)
        };
        self.type_counter += 1;
        name
    }

    /// Returns a fresh placeholder member name.
    pub fn next_member_name(&mut self) -> String {
        let name = format!("{PLACEHOLDER_MEMBER_BASE}{}", self.name_counter);
        self.name_counter += 1;
        name
    }
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"))
}

fn array_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\[[0-9]*\])*$").expect("valid regex"))
}

/// Returns the trailing array dimensions of a type string (`"[]"`, `"[2][]"`, or `""`).
pub fn array_suffix(ty: &str) -> &str {
    match array_suffix_re().find(ty) {
        Some(m) => &ty[m.start()..],
        None => "",
    }
}

/// Extracts the unqualified struct name from an `internalType` string.
///
/// `struct IDiamondCut.FacetCut[]` yields `Some("FacetCut")`; anything that is
/// not a struct, or whose name is not a valid identifier, yields `None`.
pub fn struct_name_from_internal_type(internal_type: &str) -> Option<&str> {
    let qualified = internal_type.trim().strip_prefix("struct ")?.trim();
    let qualified = &qualified[..qualified.len() - array_suffix(qualified).len()];
    let name = qualified.rsplit('.').next()?;
    identifier_re().is_match(name).then_some(name)
}

/// Base name used for a synthesized type: the struct name from the hint, or `Compound`.
pub fn parse_internal_type(internal_type: Option<&str>) -> &str {
    internal_type
        .and_then(struct_name_from_internal_type)
        .unwrap_or(GENERIC_TYPE_BASE)
}

/// Resolves one parameter.
///
/// Scalars come back unchanged with no new types. A compound parameter comes
/// back as a non-compound reference to a synthesized type, together with every
/// type synthesized for it, innermost first.
pub fn resolve_value(
    value: &Value,
    ctx: &mut ResolutionContext,
    policy: NamingPolicy,
) -> (Value, Vec<CompoundType>) {
    if !value.is_compound() {
        return (value.clone(), Vec::new());
    }
    resolve_compound(value, ctx, policy)
}

/// Resolves `value` as an aggregate regardless of whether it has components.
///
/// A component-less value still yields one type with no members.
pub fn resolve_compound(
    value: &Value,
    ctx: &mut ResolutionContext,
    policy: NamingPolicy,
) -> (Value, Vec<CompoundType>) {
    let mut new_types = Vec::new();
    let mut resolved_components = Vec::with_capacity(value.components.len());

    for component in &value.components {
        let (resolved, sub_types) = resolve_value(component, ctx, policy);
        resolved_components.push(resolved);
        new_types.extend(sub_types);
    }

    let type_name = ctx.next_type_name(value.internal_type.as_deref());

    let taken: BTreeSet<String> = resolved_components
        .iter()
        .filter(|component| !component.name.is_empty())
        .map(|component| component.name.clone())
        .collect();

    let mut members = Vec::with_capacity(resolved_components.len());
    for component in resolved_components {
        let name = if component.name.is_empty() && policy == NamingPolicy::GeneratePlaceholders {
            next_free_member_name(ctx, &taken)
        } else {
            component.name.clone()
        };
        members.push(NamedValue {
            name,
            value: component,
        });
    }

    debug!(
        type_name = %type_name,
        members = members.len(),
        "synthesized compound type"
    );

    let replacement = Value::new(
        value.name.clone(),
        format!("{type_name}{}", array_suffix(&value.ty)),
    );
    new_types.push(CompoundType { type_name, members });

    (replacement, new_types)
}

fn next_free_member_name(ctx: &mut ResolutionContext, taken: &BTreeSet<String>) -> String {
    loop {
        let name = ctx.next_member_name();
        if !taken.contains(&name) {
            return name;
        }
    }
}

/// Position of a parameter: index of the ABI item, then of the parameter within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemValueIndex {
    pub item_index: usize,
    pub value_index: usize,
}

/// Locations of compound parameters in an ABI, grouped by context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundLocations {
    pub event_inputs: Vec<ItemValueIndex>,
    pub function_inputs: Vec<ItemValueIndex>,
    pub function_outputs: Vec<ItemValueIndex>,
    pub error_inputs: Vec<ItemValueIndex>,
}

impl CompoundLocations {
    /// `true` when the ABI has no compound parameter anywhere.
    pub fn is_empty(&self) -> bool {
        self.event_inputs.is_empty()
            && self.function_inputs.is_empty()
            && self.function_outputs.is_empty()
            && self.error_inputs.is_empty()
    }
}

/// Finds every top-level compound parameter in the ABI.
pub fn find_compound_types(abi: &DecodedAbi) -> CompoundLocations {
    fn scan<'a>(
        out: &mut Vec<ItemValueIndex>,
        item_index: usize,
        values: impl IntoIterator<Item = &'a Value>,
    ) {
        for (value_index, value) in values.into_iter().enumerate() {
            if value.is_compound() {
                out.push(ItemValueIndex {
                    item_index,
                    value_index,
                });
            }
        }
    }

    let mut locations = CompoundLocations::default();
    for (i, event) in abi.events.iter().enumerate() {
        scan(
            &mut locations.event_inputs,
            i,
            event.inputs.iter().map(|arg| &arg.value),
        );
    }
    for (i, function) in abi.functions.iter().enumerate() {
        scan(&mut locations.function_inputs, i, &function.inputs);
        scan(&mut locations.function_outputs, i, &function.outputs);
    }
    for (i, error) in abi.errors.iter().enumerate() {
        scan(&mut locations.error_inputs, i, &error.inputs);
    }
    locations
}

/// Collects every struct name the ABI declares through `internalType`, at any depth.
pub fn declared_struct_names(abi: &DecodedAbi) -> BTreeSet<String> {
    fn walk(value: &Value, names: &mut BTreeSet<String>) {
        if let Some(name) = value
            .internal_type
            .as_deref()
            .and_then(struct_name_from_internal_type)
        {
            names.insert(name.to_string());
        }
        for component in &value.components {
            walk(component, names);
        }
    }

    let mut names = BTreeSet::new();
    for event in &abi.events {
        for arg in &event.inputs {
            walk(&arg.value, &mut names);
        }
    }
    for function in &abi.functions {
        for value in function.inputs.iter().chain(&function.outputs) {
            walk(value, &mut names);
        }
    }
    for error in &abi.errors {
        for value in &error.inputs {
            walk(value, &mut names);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lol() -> Value {
        Value::tuple(
            "lol",
            "tuple",
            vec![Value::new("rofl", "uint256"), Value::new("omg", "address")],
        )
    }

    #[test]
    fn scalar_and_scalar_array_are_not_compound() {
        assert!(!Value::new("x", "uint256").is_compound());
        assert!(!Value::new("xs", "uint256[]").is_compound());
        assert!(lol().is_compound());
    }

    #[test]
    fn scalar_resolves_to_itself() {
        let mut ctx = ResolutionContext::new();
        let value = Value::new("amount", "uint256");
        let (resolved, types) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        assert_eq!(resolved, value);
        assert!(types.is_empty());
        assert_eq!(ctx.types_generated(), 0);
    }

    #[test]
    fn flat_tuple_yields_one_type() {
        let mut ctx = ResolutionContext::new();
        let (resolved, types) = resolve_value(&lol(), &mut ctx, NamingPolicy::GeneratePlaceholders);

        assert_eq!(types.len(), 1);
        assert_eq!(types[0].type_name, "Compound0");
        let names: Vec<&str> = types[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["rofl", "omg"]);
        assert_eq!(resolved.name, "lol");
        assert_eq!(resolved.ty, types[0].type_name);
        assert!(!resolved.is_compound());
    }

    #[test]
    fn nested_tuple_is_emitted_innermost_first() {
        let value = Value::tuple(
            "lol",
            "tuple",
            vec![
                Value::new("rofl", "uint256"),
                Value::tuple(
                    "omg",
                    "tuple",
                    vec![Value::new("wtf", "address"), Value::new("bbq", "uint256")],
                ),
            ],
        );

        let mut ctx = ResolutionContext::new();
        let (resolved, types) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);

        assert_eq!(types.len(), 2);
        let (inner, outer) = (&types[0], &types[1]);
        assert_eq!(inner.members.len(), 2);
        assert_eq!(outer.members[1].name, "omg");
        assert_eq!(outer.members[1].value.ty, inner.type_name);
        assert_eq!(resolved.ty, outer.type_name);
    }

    #[test]
    fn array_of_tuples_keeps_suffix_on_reference_only() {
        let mut ctx = ResolutionContext::new();
        let mut value = lol();
        value.ty = "tuple[]".to_string();

        let (resolved, types) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        assert_eq!(resolved.ty, format!("{}[]", types[0].type_name));
        assert!(!types[0].type_name.ends_with("[]"));
    }

    #[test]
    fn fixed_and_nested_array_suffixes_are_preserved() {
        assert_eq!(array_suffix("tuple"), "");
        assert_eq!(array_suffix("tuple[]"), "[]");
        assert_eq!(array_suffix("tuple[3]"), "[3]");
        assert_eq!(array_suffix("tuple[2][]"), "[2][]");
        assert_eq!(array_suffix("uint8[2]"), "[2]");
    }

    #[test]
    fn placeholder_names_are_unique_and_optional() {
        let value = Value::tuple(
            "",
            "tuple",
            vec![Value::new("", "uint256"), Value::new("", "address")],
        );

        let mut ctx = ResolutionContext::new();
        let (_, named) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        let names: Vec<&str> = named[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Attribute0", "Attribute1"]);

        let (_, unnamed) = resolve_value(&value, &mut ctx, NamingPolicy::LeaveUnnamed);
        assert!(unnamed[0].members.iter().all(|m| m.name.is_empty()));
        assert_eq!(unnamed[0].type_name, "Compound1");
    }

    #[test]
    fn placeholder_skips_names_used_by_siblings() {
        let value = Value::tuple(
            "",
            "tuple",
            vec![Value::new("", "uint256"), Value::new("Attribute0", "address")],
        );

        let mut ctx = ResolutionContext::new();
        let (_, types) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        let names: Vec<&str> = types[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Attribute1", "Attribute0"]);
    }

    #[test]
    fn empty_compound_yields_type_without_members() {
        let mut ctx = ResolutionContext::new();
        let value = Value::new("nothing", "tuple");
        let (resolved, types) =
            resolve_compound(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        assert_eq!(types.len(), 1);
        assert!(types[0].members.is_empty());
        assert_eq!(resolved.ty, "Compound0");
    }

    #[test]
    fn counters_continue_across_calls() {
        let mut ctx = ResolutionContext::new();
        let (_, first) = resolve_value(&lol(), &mut ctx, NamingPolicy::GeneratePlaceholders);
        let (_, second) = resolve_value(&lol(), &mut ctx, NamingPolicy::GeneratePlaceholders);
        assert_eq!(first[0].type_name, "Compound0");
        assert_eq!(second[0].type_name, "Compound1");
    }

    #[test]
    fn internal_type_hint_names_the_type() {
        assert_eq!(parse_internal_type(Some("struct IDiamondCut.FacetCut[]")), "FacetCut");
        assert_eq!(parse_internal_type(Some("struct Order")), "Order");
        assert_eq!(parse_internal_type(Some("contract IERC20")), "Compound");
        assert_eq!(parse_internal_type(Some("struct ")), "Compound");
        assert_eq!(parse_internal_type(None), "Compound");

        let mut ctx = ResolutionContext::new();
        let value = lol().with_internal_type("struct Lib.Pair");
        let (resolved, types) = resolve_value(&value, &mut ctx, NamingPolicy::GeneratePlaceholders);
        assert_eq!(types[0].type_name, "Pair0");
        assert_eq!(resolved.ty, "Pair0");
    }

    #[test]
    fn digit_suffixed_hint_is_separated_from_counter() {
        let mut ctx = ResolutionContext::new();
        assert_eq!(ctx.next_type_name(Some("struct Asset1")), "Asset1_0");
        assert_eq!(ctx.next_type_name(Some("struct Asset")), "Asset1");
        assert_eq!(ctx.next_type_name(Some("struct Lib.Uint256[]")), "Uint256_2");
        assert_eq!(ctx.next_type_name(None), "Compound3");
    }

    #[test]
    fn finds_compound_locations_by_context() {
        let abi = DecodedAbi {
            events: vec![],
            functions: vec![crate::ast::FunctionItem {
                name: "f".to_string(),
                inputs: vec![Value::new("a", "uint256"), lol()],
                outputs: vec![lol()],
                state_mutability: None,
            }],
            errors: vec![],
        };

        let locations = find_compound_types(&abi);
        assert_eq!(
            locations.function_inputs,
            [ItemValueIndex {
                item_index: 0,
                value_index: 1
            }]
        );
        assert_eq!(locations.function_outputs.len(), 1);
        assert!(locations.event_inputs.is_empty());
        assert!(!locations.is_empty());
    }
}
