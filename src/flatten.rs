//! Flattening of every compound parameter in an ABI into named types.

use tracing::debug;

use crate::ast::{
    CompoundType, DecodedAbi, ErrorItem, EventArgument, EventItem, FunctionItem, ResolvedAbi,
    Value,
};
use crate::compound::{declared_struct_names, resolve_value, NamingPolicy, ResolutionContext};

/// Resolves all compound parameters of all items in `abi`.
///
/// Items are visited events first, then functions, then errors, each in
/// declaration order; inputs come before outputs. Compound types are collected
/// in that visiting order. Function outputs keep unnamed members unnamed; every
/// other context gets placeholder member names.
pub fn resolve_compounds(abi: &DecodedAbi) -> ResolvedAbi {
    let mut ctx = ResolutionContext::new();
    let mut compound_types = Vec::new();

    let mut events = Vec::with_capacity(abi.events.len());
    for event in &abi.events {
        let mut inputs = Vec::with_capacity(event.inputs.len());
        for arg in &event.inputs {
            let value = resolve_into(
                &arg.value,
                &mut ctx,
                NamingPolicy::GeneratePlaceholders,
                &mut compound_types,
            );
            inputs.push(EventArgument {
                value,
                indexed: arg.indexed,
            });
        }
        events.push(EventItem {
            name: event.name.clone(),
            inputs,
            anonymous: event.anonymous,
        });
    }

    let mut functions = Vec::with_capacity(abi.functions.len());
    for function in &abi.functions {
        let inputs = resolve_all(
            &function.inputs,
            &mut ctx,
            NamingPolicy::GeneratePlaceholders,
            &mut compound_types,
        );
        let outputs = resolve_all(
            &function.outputs,
            &mut ctx,
            NamingPolicy::LeaveUnnamed,
            &mut compound_types,
        );
        functions.push(FunctionItem {
            name: function.name.clone(),
            inputs,
            outputs,
            state_mutability: function.state_mutability,
        });
    }

    let errors = abi
        .errors
        .iter()
        .map(|error| ErrorItem {
            name: error.name.clone(),
            inputs: resolve_all(
                &error.inputs,
                &mut ctx,
                NamingPolicy::GeneratePlaceholders,
                &mut compound_types,
            ),
        })
        .collect();

    debug!(
        compound_types = compound_types.len(),
        "resolved compound types"
    );

    ResolvedAbi {
        original_abi: abi.clone(),
        compound_types,
        enriched_abi: DecodedAbi {
            events,
            functions,
            errors,
        },
    }
}

fn resolve_into(
    value: &Value,
    ctx: &mut ResolutionContext,
    policy: NamingPolicy,
    compound_types: &mut Vec<CompoundType>,
) -> Value {
    let (resolved, new_types) = resolve_value(value, ctx, policy);
    compound_types.extend(new_types);
    resolved
}

fn resolve_all(
    values: &[Value],
    ctx: &mut ResolutionContext,
    policy: NamingPolicy,
    compound_types: &mut Vec<CompoundType>,
) -> Vec<Value> {
    values
        .iter()
        .map(|value| resolve_into(value, ctx, policy, compound_types))
        .collect()
}

/// Synthesized type names that coincide with a struct the original ABI declares.
///
/// Resolution does not rename around these; callers decide whether to warn.
pub fn synthesized_name_collisions(resolved: &ResolvedAbi) -> Vec<String> {
    let declared = declared_struct_names(&resolved.original_abi);
    resolved
        .compound_types
        .iter()
        .filter(|compound| declared.contains(&compound.type_name))
        .map(|compound| compound.type_name.clone())
        .collect()
}
