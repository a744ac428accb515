//! The frozen signature registry and a swappable shared handle to it.
//!
//! A [`SignatureRegistry`] is produced once by
//! [`RegistryBuilder`](crate::builder::RegistryBuilder) (or loaded from an
//! artifact) and never mutated afterwards. Rebuilding means constructing a
//! fresh registry and swapping it into a [`SharedRegistry`].

use abiscope_core::signature::{
    selector_from_hex, topic_from_hex, EventSignature, FunctionSignature, SignatureLookup,
};
use alloy_primitives::{Selector, B256};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable topic → event variants and selector → function tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureRegistry {
    events_by_topic: IndexMap<B256, Vec<EventSignature>>,
    functions_by_selector: IndexMap<Selector, FunctionSignature>,
}

/// Size summary of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub functions: usize,
    pub topics: usize,
    pub event_variants: usize,
}

impl SignatureRegistry {
    pub(crate) fn from_parts(
        events_by_topic: IndexMap<B256, Vec<EventSignature>>,
        functions_by_selector: IndexMap<Selector, FunctionSignature>,
    ) -> Self {
        Self {
            events_by_topic,
            functions_by_selector,
        }
    }

    /// Look up a function by its 4-byte selector.
    pub fn function_by_selector(&self, selector: &Selector) -> Option<&FunctionSignature> {
        self.functions_by_selector.get(selector)
    }

    /// Look up a function by selector hex ("0xa9059cbb", case-insensitive).
    pub fn function_by_selector_hex(&self, selector: &str) -> Option<&FunctionSignature> {
        self.function_by_selector(&selector_from_hex(selector)?)
    }

    /// All variants registered for `topic`, in insertion order.
    pub fn events_by_topic(&self, topic: &B256) -> &[EventSignature] {
        self.events_by_topic
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Variants for a topic given as hex. Empty for unknown or malformed input.
    pub fn events_by_topic_hex(&self, topic: &str) -> &[EventSignature] {
        match topic_from_hex(topic) {
            Some(t) => self.events_by_topic(&t),
            None => &[],
        }
    }

    /// All functions, in the order they were registered.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.functions_by_selector.values()
    }

    /// All event variants, grouped by topic, in the order they were registered.
    pub fn events(&self) -> impl Iterator<Item = &EventSignature> {
        self.events_by_topic.values().flatten()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            functions: self.functions_by_selector.len(),
            topics: self.events_by_topic.len(),
            event_variants: self.events_by_topic.values().map(Vec::len).sum(),
        }
    }

    /// Total number of functions plus event variants.
    pub fn len(&self) -> usize {
        let stats = self.stats();
        stats.functions + stats.event_variants
    }

    pub fn is_empty(&self) -> bool {
        self.functions_by_selector.is_empty() && self.events_by_topic.is_empty()
    }
}

impl SignatureLookup for SignatureRegistry {
    fn function(&self, selector: &Selector) -> Option<&FunctionSignature> {
        self.function_by_selector(selector)
    }

    fn event_variants(&self, topic: &B256) -> &[EventSignature] {
        self.events_by_topic(topic)
    }
}

/// A process-wide handle to the current registry.
///
/// Readers take a cheap `Arc` snapshot and decode against it without holding
/// the lock; a rebuild installs a whole new registry in one step.
#[derive(Debug, Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<SignatureRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: SignatureRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Snapshot of the registry currently installed.
    pub fn current(&self) -> Arc<SignatureRegistry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `registry`, returning the one it replaces. Snapshots taken
    /// earlier keep seeing the old tables.
    pub fn replace(&self, registry: SignatureRegistry) -> Arc<SignatureRegistry> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(registry))
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(SignatureRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RegistryBuilder;
    use abiscope_core::types::{Param, ParamType};

    fn erc20() -> SignatureRegistry {
        let mut builder = RegistryBuilder::new();
        builder.add_function(FunctionSignature::new(
            "transfer",
            vec![
                Param::new("to", ParamType::Address),
                Param::new("amount", ParamType::Uint(256)),
            ],
        ));
        builder.add_event(EventSignature::new(
            "Transfer",
            vec![
                Param::indexed("from", ParamType::Address),
                Param::indexed("to", ParamType::Address),
                Param::new("value", ParamType::Uint(256)),
            ],
        ));
        builder.build()
    }

    #[test]
    fn hex_lookups_are_case_insensitive() {
        let reg = erc20();
        assert!(reg.function_by_selector_hex("0xA9059CBB").is_some());
        assert!(reg.function_by_selector_hex("a9059cbb").is_some());
        assert!(reg.function_by_selector_hex("0xdeadbeef").is_none());
        assert!(reg.function_by_selector_hex("nothex").is_none());
        assert_eq!(
            reg.events_by_topic_hex(
                "0xDDF252AD1BE2C89B69C2B068FC378DAA952BA7F163C4A11628F55A4DF523B3EF"
            )
            .len(),
            1
        );
        assert!(reg.events_by_topic_hex("0x1234").is_empty());
    }

    #[test]
    fn stats_count_tables() {
        let reg = erc20();
        assert_eq!(
            reg.stats(),
            RegistryStats {
                functions: 1,
                topics: 1,
                event_variants: 1
            }
        );
        assert_eq!(reg.len(), 2);
        assert!(!reg.is_empty());
        assert!(SignatureRegistry::default().is_empty());
    }

    #[test]
    fn shared_registry_swaps_atomically() {
        let shared = SharedRegistry::default();
        let before = shared.current();
        assert!(before.is_empty());

        let old = shared.replace(erc20());
        assert!(old.is_empty());
        assert_eq!(shared.current().stats().functions, 1);
        // Earlier snapshot is unaffected.
        assert!(before.is_empty());
    }
}
