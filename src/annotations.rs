//! Function selector and ERC-165 interface ID annotations.

use sha3::{Digest, Keccak256};

use crate::ast::{DecodedAbi, FunctionItem, Value};
use crate::compound::array_suffix;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Selector annotations for one ABI.
pub struct Annotations {
    /// XOR of every function selector.
    pub interface_id: [u8; 4],
    /// One selector per function, in declaration order.
    pub function_selectors: Vec<[u8; 4]>,
}

impl Annotations {
    pub fn interface_id_hex(&self) -> String {
        hex::encode(self.interface_id)
    }

    pub fn selector_hex(&self, function_index: usize) -> Option<String> {
        self.function_selectors.get(function_index).map(hex::encode)
    }
}

/// Canonical ABI type of a parameter as used in signatures.
///
/// Tuples expand to their member types: `tuple[]` with members `address` and
/// `bytes4[]` becomes `(address,bytes4[])[]`.
pub fn canonical_type(value: &Value) -> String {
    if !value.is_compound() {
        return value.ty.clone();
    }
    let members: Vec<String> = value.components.iter().map(canonical_type).collect();
    format!("({}){}", members.join(","), array_suffix(&value.ty))
}

/// Canonical signature `name(type1,type2,...)`.
pub fn function_signature(function: &FunctionItem) -> String {
    let types: Vec<String> = function.inputs.iter().map(canonical_type).collect();
    format!("{}({})", function.name, types.join(","))
}

/// First four bytes of the keccak-256 hash of the function signature.
pub fn method_selector(function: &FunctionItem) -> [u8; 4] {
    let digest = Keccak256::digest(function_signature(function).as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

/// Computes selectors and the interface ID for all functions of `abi`.
///
/// Must be given the original ABI: selectors depend on the expanded tuple
/// types, which the enriched ABI no longer carries.
pub fn annotate(abi: &DecodedAbi) -> Annotations {
    let mut annotations = Annotations::default();
    for function in &abi.functions {
        let selector = method_selector(function);
        for (id_byte, selector_byte) in annotations.interface_id.iter_mut().zip(selector) {
            *id_byte ^= selector_byte;
        }
        annotations.function_selectors.push(selector);
    }
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, inputs: &[&str]) -> FunctionItem {
        FunctionItem {
            name: name.to_string(),
            inputs: inputs.iter().map(|ty| Value::new("", *ty)).collect(),
            outputs: vec![],
            state_mutability: None,
        }
    }

    #[test]
    fn known_erc20_selectors() {
        let transfer = function("transfer", &["address", "uint256"]);
        assert_eq!(hex::encode(method_selector(&transfer)), "a9059cbb");
        assert_eq!(hex::encode(method_selector(&function("totalSupply", &[]))), "18160ddd");
        assert_eq!(hex::encode(method_selector(&function("balanceOf", &["address"]))), "70a08231");
    }

    #[test]
    fn erc20_interface_id() {
        let abi = DecodedAbi {
            events: vec![],
            functions: vec![
                function("totalSupply", &[]),
                function("balanceOf", &["address"]),
                function("transfer", &["address", "uint256"]),
                function("allowance", &["address", "address"]),
                function("approve", &["address", "uint256"]),
                function("transferFrom", &["address", "address", "uint256"]),
            ],
            errors: vec![],
        };

        let annotations = annotate(&abi);
        assert_eq!(annotations.interface_id_hex(), "36372b07");
        assert_eq!(annotations.function_selectors.len(), 6);
        assert_eq!(annotations.selector_hex(2).as_deref(), Some("a9059cbb"));
        assert_eq!(annotations.selector_hex(6), None);
    }

    #[test]
    fn no_functions_gives_zero_interface_id() {
        assert_eq!(annotate(&DecodedAbi::default()).interface_id_hex(), "00000000");
    }

    #[test]
    fn tuples_expand_in_signature() {
        let cut = Value::tuple(
            "_diamondCut",
            "tuple[]",
            vec![
                Value::new("facetAddress", "address"),
                Value::new("action", "uint8"),
                Value::new("functionSelectors", "bytes4[]"),
            ],
        );
        let diamond_cut = FunctionItem {
            name: "diamondCut".to_string(),
            inputs: vec![cut, Value::new("_init", "address"), Value::new("_calldata", "bytes")],
            outputs: vec![],
            state_mutability: None,
        };

        assert_eq!(
            function_signature(&diamond_cut),
            "diamondCut((address,uint8,bytes4[])[],address,bytes)"
        );
        assert_eq!(hex::encode(method_selector(&diamond_cut)), "1f931c1c");
    }
}
