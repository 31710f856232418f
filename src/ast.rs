//! Public ABI model used by the decoder, the compound resolver, and the renderer.

use serde::{Deserialize, Serialize};

use crate::error::SolfaceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single named, typed parameter in an ABI item.
///
/// Aggregate (tuple/struct) parameters carry their members in `components`;
/// scalars and arrays of scalars have none.
pub struct Value {
    /// Parameter name; may be empty (return values usually are).
    #[serde(default)]
    pub name: String,
    /// ABI type string (`uint256`, `address[]`, `tuple`, `tuple[]`, ...).
    #[serde(rename = "type")]
    pub ty: String,
    /// Compiler-provided source type (`struct IDiamondCut.FacetCut[]`, `address`, ...).
    #[serde(
        rename = "internalType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub internal_type: Option<String>,
    /// Ordered member parameters of a tuple type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
}

impl Value {
    /// Builds a scalar parameter without an internal type.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            internal_type: None,
            components: Vec::new(),
        }
    }

    /// Builds a tuple parameter from its members.
    pub fn tuple(name: impl Into<String>, ty: impl Into<String>, components: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            internal_type: None,
            components,
        }
    }

    /// Attaches an `internalType` hint.
    pub fn with_internal_type(mut self, internal_type: impl Into<String>) -> Self {
        self.internal_type = Some(internal_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Event input: a parameter plus its `indexed` flag.
pub struct EventArgument {
    #[serde(flatten)]
    pub value: Value,
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Declared state mutability of a function.
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

impl StateMutability {
    /// Solidity keyword emitted after `external`, if any.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            StateMutability::Pure => Some("pure"),
            StateMutability::View => Some("view"),
            StateMutability::Payable => Some("payable"),
            StateMutability::Nonpayable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A log event declaration.
pub struct EventItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<EventArgument>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A callable contract method.
pub struct FunctionItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Value>,
    #[serde(default)]
    pub outputs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A custom error declaration.
pub struct ErrorItem {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Decoded ABI grouped by item kind, each list in declaration order.
pub struct DecodedAbi {
    #[serde(default)]
    pub events: Vec<EventItem>,
    #[serde(default)]
    pub functions: Vec<FunctionItem>,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Struct member: the member name paired with its (already flattened) parameter.
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Named aggregate type synthesized during compound resolution.
pub struct CompoundType {
    pub type_name: String,
    pub members: Vec<NamedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Result of flattening an ABI.
///
/// `compound_types` is ordered so that every type appears after the types it
/// uses as members; `enriched_abi` contains no compound parameters.
pub struct ResolvedAbi {
    pub original_abi: DecodedAbi,
    pub compound_types: Vec<CompoundType>,
    pub enriched_abi: DecodedAbi,
}

impl ResolvedAbi {
    /// Serializes the resolution result to JSON text.
    ///
    /// When `pretty` is `true`, output is formatted with indentation.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, SolfaceError> {
        if pretty {
            serde_json::to_string_pretty(self)
                .map_err(|e| SolfaceError::SerializationError(e.to_string()))
        } else {
            serde_json::to_string(self).map_err(|e| SolfaceError::SerializationError(e.to_string()))
        }
    }
}
