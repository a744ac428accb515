//! Function and event signature records plus their hash-derived identifiers.
//!
//! The identifier of a function is the first four bytes of
//! `keccak256(canonical_signature)`; the identifier of an event (its topic)
//! is the full 32-byte hash:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef

use alloy_primitives::{Selector, B256};
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use crate::types::Param;

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Build the canonical signature `name(type1,type2,...)` with every tuple
/// expanded into its parenthesized component list.
pub fn canonical_signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{name}({})", types.join(","))
}

/// Parse a 4-byte selector from hex. The `0x` prefix is optional and the
/// comparison is case-insensitive.
pub fn selector_from_hex(s: &str) -> Option<Selector> {
    let bytes = decode_prefixed_hex(s)?;
    Selector::try_from(bytes.as_slice()).ok()
}

/// Parse a 32-byte topic from hex. The `0x` prefix is optional.
pub fn topic_from_hex(s: &str) -> Option<B256> {
    let bytes = decode_prefixed_hex(s)?;
    B256::try_from(bytes.as_slice()).ok()
}

/// Decode `0x`-prefixed (or bare) hex into bytes.
pub fn decode_prefixed_hex(s: &str) -> Option<Vec<u8>> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(s).ok()
}

/// A function known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name, e.g. "transfer"
    pub name: String,
    /// Canonical signature, e.g. "transfer(address,uint256)"
    pub signature: String,
    /// keccak256(signature)[..4]
    pub selector: Selector,
    /// Declared inputs in order
    pub inputs: Vec<Param>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &inputs);
        let hash = keccak256(signature.as_bytes());
        Self {
            name,
            signature,
            selector: Selector::from([hash[0], hash[1], hash[2], hash[3]]),
            inputs,
        }
    }

    /// Selector as a hex string ("0xa9059cbb")
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector.as_slice()))
    }
}

/// An event known to the registry.
///
/// Two events may share a topic while differing in which parameters are
/// indexed; the registry keeps them as separate variants distinguished by
/// [`indexed_count`](Self::indexed_count).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSignature {
    /// Event name, e.g. "Transfer"
    pub name: String,
    /// Canonical signature, e.g. "Transfer(address,address,uint256)"
    pub signature: String,
    /// keccak256(signature)
    pub topic: B256,
    /// Number of top-level parameters marked `indexed`
    pub indexed_count: usize,
    /// Declared inputs in order
    pub inputs: Vec<Param>,
}

impl EventSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &inputs);
        let topic = B256::from(keccak256(signature.as_bytes()));
        let indexed_count = inputs.iter().filter(|p| p.indexed).count();
        Self {
            name,
            signature,
            topic,
            indexed_count,
            inputs,
        }
    }

    /// Topic as a hex string ("0xddf252ad...")
    pub fn topic_hex(&self) -> String {
        format!("0x{}", hex::encode(self.topic.as_slice()))
    }
}

/// Read-only view over a signature registry.
///
/// Decoders receive the registry explicitly through this trait, so several
/// registries (per test, per corpus version) can coexist. Concrete
/// implementations live in `abiscope-registry`.
pub trait SignatureLookup: Send + Sync {
    /// The function registered for `selector`, if any.
    fn function(&self, selector: &Selector) -> Option<&FunctionSignature>;

    /// All event variants registered for `topic`, in insertion order.
    /// Empty when the topic is unknown.
    fn event_variants(&self, topic: &B256) -> &[EventSignature];
}
