//! The ABI type model and decoded value representation.
//!
//! Corpus documents describe types as loose strings (`"uint256"`,
//! `"tuple[]"`, ...). abiscope resolves them once, at registry build time,
//! into the closed [`ParamType`] variant so that the decoder can walk the
//! layout exhaustively instead of matching strings.

use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;

/// A resolved Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// 20-byte account address
    Address,
    /// Unsigned integer. Width in bits (8 ..= 256, multiple of 8).
    Uint(u16),
    /// Signed two's-complement integer. Width in bits.
    Int(u16),
    Bool,
    /// Fixed-size byte array (bytes1 .. bytes32). Length in bytes.
    FixedBytes(u8),
    /// Variable-length byte array
    Bytes,
    /// UTF-8 string
    String,
    /// 24-byte external function reference (address + selector)
    Function,
    /// Variable-length array `T[]`
    Array(Box<ParamType>),
    /// Fixed-length array `T[k]`
    FixedArray(Box<ParamType>, usize),
    /// Tuple / struct with ordered, named components
    Tuple(Vec<Param>),
}

/// One input slot of a function, one field of an event, or one component
/// of a tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    /// Declared name; empty for positional parameters.
    pub name: String,
    pub kind: ParamType,
    /// Event parameters only: stored in `topics[1..]` rather than `data`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: true,
        }
    }
}

impl ParamType {
    /// Resolve a declared ABI type string.
    ///
    /// `components` are the already-resolved fields for `tuple` types
    /// (including `tuple[]`, `tuple[2][]`, ...). They must be non-empty for
    /// tuples and empty for everything else.
    pub fn parse(ty: &str, components: Vec<Param>) -> Result<Self, TypeError> {
        let ty = ty.trim();

        if let Some(stripped) = ty.strip_suffix(']') {
            let open = stripped.rfind('[').ok_or_else(|| TypeError::Unsupported {
                ty: ty.to_string(),
            })?;
            let inner = Self::parse(&stripped[..open], components)?;
            let dim = &stripped[open + 1..];
            if dim.is_empty() {
                return Ok(ParamType::Array(Box::new(inner)));
            }
            let len: usize = dim.parse().map_err(|_| TypeError::InvalidSize {
                ty: ty.to_string(),
            })?;
            if len == 0 {
                return Err(TypeError::InvalidSize { ty: ty.to_string() });
            }
            return Ok(ParamType::FixedArray(Box::new(inner), len));
        }

        if ty == "tuple" {
            if components.is_empty() {
                return Err(TypeError::MissingComponents { ty: ty.to_string() });
            }
            return Ok(ParamType::Tuple(components));
        }

        if !components.is_empty() {
            return Err(TypeError::UnexpectedComponents { ty: ty.to_string() });
        }

        match ty {
            "address" => return Ok(ParamType::Address),
            "bool" => return Ok(ParamType::Bool),
            "string" => return Ok(ParamType::String),
            "bytes" => return Ok(ParamType::Bytes),
            "function" => return Ok(ParamType::Function),
            "uint" => return Ok(ParamType::Uint(256)),
            "int" => return Ok(ParamType::Int(256)),
            "byte" => return Ok(ParamType::FixedBytes(1)),
            _ => {}
        }

        if let Some(bits) = ty.strip_prefix("uint") {
            return Ok(ParamType::Uint(parse_int_width(ty, bits)?));
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return Ok(ParamType::Int(parse_int_width(ty, bits)?));
        }
        if let Some(len) = ty.strip_prefix("bytes") {
            let n: u8 = len.parse().map_err(|_| TypeError::Unsupported {
                ty: ty.to_string(),
            })?;
            if !(1..=32).contains(&n) {
                return Err(TypeError::InvalidSize { ty: ty.to_string() });
            }
            return Ok(ParamType::FixedBytes(n));
        }

        Err(TypeError::Unsupported { ty: ty.to_string() })
    }

    /// Check a type built outside [`parse`](Self::parse), e.g. deserialized
    /// from an artifact, against the same size and shape rules.
    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                if *bits == 0 || *bits > 256 || *bits % 8 != 0 {
                    return Err(TypeError::InvalidSize { ty: self.declared() });
                }
                Ok(())
            }
            ParamType::FixedBytes(n) => {
                if !(1..=32).contains(n) {
                    return Err(TypeError::InvalidSize { ty: self.declared() });
                }
                Ok(())
            }
            ParamType::Array(elem) => elem.validate(),
            ParamType::FixedArray(elem, len) => {
                if *len == 0 {
                    return Err(TypeError::InvalidSize { ty: self.declared() });
                }
                elem.validate()
            }
            ParamType::Tuple(components) => {
                if components.is_empty() {
                    return Err(TypeError::MissingComponents { ty: self.declared() });
                }
                components.iter().try_for_each(|c| c.kind.validate())
            }
            ParamType::Address
            | ParamType::Bool
            | ParamType::Bytes
            | ParamType::String
            | ParamType::Function => Ok(()),
        }
    }

    /// Whether values of this type are referenced by offset from the head.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(elem, _) => elem.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Number of head bytes a value of this type occupies in its enclosing
    /// sequence. Dynamic types always take a single offset slot.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            ParamType::FixedArray(elem, len) => elem.head_size().saturating_mul(*len),
            ParamType::Tuple(components) => components
                .iter()
                .fold(0usize, |acc, c| acc.saturating_add(c.kind.head_size())),
            _ => 32,
        }
    }

    /// Elementary value types fit in a single 32-byte word and are stored
    /// verbatim when indexed; everything else is stored as its hash.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            ParamType::Address
                | ParamType::Uint(_)
                | ParamType::Int(_)
                | ParamType::Bool
                | ParamType::FixedBytes(_)
                | ParamType::Function
        )
    }

    /// The type as it is declared in interface JSON: tuples appear as
    /// `tuple`, `tuple[]`, ... rather than in expanded form.
    pub fn declared(&self) -> String {
        let mut out = String::new();
        self.write_type(&mut out, false);
        out
    }

    fn write_type(&self, out: &mut String, expand_tuples: bool) {
        match self {
            ParamType::Address => out.push_str("address"),
            ParamType::Uint(bits) => out.push_str(&format!("uint{bits}")),
            ParamType::Int(bits) => out.push_str(&format!("int{bits}")),
            ParamType::Bool => out.push_str("bool"),
            ParamType::FixedBytes(n) => out.push_str(&format!("bytes{n}")),
            ParamType::Bytes => out.push_str("bytes"),
            ParamType::String => out.push_str("string"),
            ParamType::Function => out.push_str("function"),
            ParamType::Array(elem) => {
                elem.write_type(out, expand_tuples);
                out.push_str("[]");
            }
            ParamType::FixedArray(elem, len) => {
                elem.write_type(out, expand_tuples);
                out.push_str(&format!("[{len}]"));
            }
            ParamType::Tuple(components) => {
                if !expand_tuples {
                    out.push_str("tuple");
                    return;
                }
                out.push('(');
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    c.kind.write_type(out, true);
                }
                out.push(')');
            }
        }
    }
}

fn parse_int_width(ty: &str, bits: &str) -> Result<u16, TypeError> {
    let n: u16 = bits.parse().map_err(|_| TypeError::Unsupported {
        ty: ty.to_string(),
    })?;
    if n == 0 || n > 256 || n % 8 != 0 {
        return Err(TypeError::InvalidSize { ty: ty.to_string() });
    }
    Ok(n)
}

/// Canonical form, with tuples recursively expanded. This is the string that
/// is hashed into selectors and topics.
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_type(&mut out, true);
        f.write_str(&out)
    }
}

/// A decoded, typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Int(I256),
    Bool(bool),
    /// bytesN, already cut down to N bytes
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Function([u8; 24]),
    Array(Vec<AbiValue>),
    /// Array too large to expand; only the element count is kept.
    ArraySummary(usize),
    Tuple(Vec<(String, AbiValue)>),
    /// Indexed reference-type event parameter: only its hash is on chain.
    Hashed(B256),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "0x{}", hex::encode(a.as_slice())),
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => f.write_str(s),
            AbiValue::Function(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::ArraySummary(len) => write!(f, "[{len} elements]"),
            AbiValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(_, v)| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            AbiValue::Hashed(h) => write!(f, "0x{}", hex::encode(h.as_slice())),
        }
    }
}
