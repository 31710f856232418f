//! JSON ABI decoding into the typed [`DecodedAbi`] model.
//!
//! Follows the Solidity contract ABI JSON format: a top-level array of items,
//! each tagged by `type`. Only `event`, `function`, and `error` items are kept.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::ast::{DecodedAbi, ErrorItem, EventItem, FunctionItem, StateMutability, Value};
use crate::error::SolfaceError;

/// Function item as it appears on the wire, including pre-0.4.16 mutability flags.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFunctionItem {
    name: String,
    #[serde(default)]
    inputs: Vec<Value>,
    #[serde(default)]
    outputs: Vec<Value>,
    #[serde(default)]
    state_mutability: Option<StateMutability>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
}

impl RawFunctionItem {
    fn into_item(self) -> FunctionItem {
        let state_mutability = self.state_mutability.or_else(|| {
            match (self.constant, self.payable) {
                (Some(true), _) => Some(StateMutability::View),
                (_, Some(true)) => Some(StateMutability::Payable),
                (None, None) => None,
                _ => Some(StateMutability::Nonpayable),
            }
        });

        FunctionItem {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            state_mutability,
        }
    }
}

/// Decodes an ABI from its JSON text.
///
/// Items of any kind other than `event`, `function`, and `error` (constructors,
/// fallback and receive functions) are skipped. An item without a `type` key is
/// a function, as the ABI format allows.
pub fn decode_abi(input: &str) -> Result<DecodedAbi, SolfaceError> {
    let root: JsonValue = serde_json::from_str(input)
        .map_err(|e| SolfaceError::DecodeError(format!("invalid JSON: {e}")))?;

    let items = root.as_array().ok_or_else(|| {
        SolfaceError::DecodeError("ABI must be a JSON array of items".to_string())
    })?;

    let mut decoded = DecodedAbi::default();
    let mut skipped = 0usize;

    for (index, item) in items.iter().enumerate() {
        let object = item.as_object().ok_or_else(|| {
            SolfaceError::DecodeError(format!("item {index} must be a JSON object"))
        })?;

        let kind = match object.get("type") {
            None => "function",
            Some(JsonValue::String(kind)) => kind.as_str(),
            Some(other) => {
                return Err(SolfaceError::DecodeError(format!(
                    "item {index} has non-string type discriminator {other}"
                )))
            }
        };

        match kind {
            "event" => {
                let event: EventItem = decode_item(index, kind, item)?;
                decoded.events.push(event);
            }
            "function" => {
                let raw: RawFunctionItem = decode_item(index, kind, item)?;
                decoded.functions.push(raw.into_item());
            }
            "error" => {
                let error: ErrorItem = decode_item(index, kind, item)?;
                decoded.errors.push(error);
            }
            _ => skipped += 1,
        }
    }

    debug!(
        events = decoded.events.len(),
        functions = decoded.functions.len(),
        errors = decoded.errors.len(),
        skipped,
        "decoded ABI"
    );

    Ok(decoded)
}

fn decode_item<T: for<'de> Deserialize<'de>>(
    index: usize,
    kind: &str,
    item: &JsonValue,
) -> Result<T, SolfaceError> {
    T::deserialize(item)
        .map_err(|e| SolfaceError::DecodeError(format!("item {index} ({kind}): {e}")))
}
