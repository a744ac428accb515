//! Output types for decoded function calls and the per-parameter record
//! shared with decoded event logs.

use alloy_primitives::Selector;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::{AbiValue, Param, ParamType};

/// One decoded parameter, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedParam {
    /// Declared name (may be empty)
    pub name: String,
    /// Declared ABI type, e.g. "uint256" or "tuple[]"
    #[serde(rename = "type")]
    pub ty: String,
    /// Formatted value; `None` when the value could not be decoded
    pub value: Option<String>,
    /// Event parameters only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub indexed: Option<bool>,
    /// Tuple parameters only: the decoded fields
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub components: Option<Vec<DecodedParam>>,
}

impl DecodedParam {
    /// Pair a declared parameter with its decode outcome.
    pub fn from_result(param: &Param, result: &Result<AbiValue, DecodeError>) -> Self {
        match result {
            Ok(value) => Self::from_value(param, value),
            Err(_) => Self::absent(param),
        }
    }

    /// Build the display record for a successfully decoded value, recursing
    /// into tuple components.
    pub fn from_value(param: &Param, value: &AbiValue) -> Self {
        let components = match (&param.kind, value) {
            (ParamType::Tuple(fields), AbiValue::Tuple(values)) => Some(
                fields
                    .iter()
                    .zip(values.iter())
                    .map(|(field, (_, v))| DecodedParam::from_value(field, v))
                    .collect(),
            ),
            _ => None,
        };
        Self {
            name: param.name.clone(),
            ty: param.kind.declared(),
            value: Some(value.to_string()),
            indexed: None,
            components,
        }
    }

    /// A parameter whose value could not be recovered.
    pub fn absent(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            ty: param.kind.declared(),
            value: None,
            indexed: None,
            components: None,
        }
    }

    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = Some(indexed);
        self
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// Label used for a parameter in `decode_errors`: its name, or `arg{i}` when
/// unnamed.
pub fn param_label(param: &Param, index: usize) -> String {
    if param.name.is_empty() {
        format!("arg{index}")
    } else {
        param.name.clone()
    }
}

/// Result of decoding a function call's calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name (e.g. "transfer")
    pub name: String,
    /// Canonical signature of the matched function
    pub signature: String,
    /// First 4 bytes of calldata
    pub selector: Selector,
    /// Decoded inputs in declaration order
    pub params: Vec<DecodedParam>,
    /// Inputs that failed to decode (label → reason)
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub decode_errors: IndexMap<String, String>,
}

impl DecodedCall {
    /// Selector as a hex string ("0xaabbccdd")
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector.as_slice()))
    }

    /// Look up a decoded input by name
    pub fn param(&self, name: &str) -> Option<&DecodedParam> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Returns true if every input decoded
    pub fn is_complete(&self) -> bool {
        self.decode_errors.is_empty()
    }
}
