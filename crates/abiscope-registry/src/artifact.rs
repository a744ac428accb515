//! JSON persistence for a built registry.
//!
//! The artifact lists functions and event variants in registration order.
//! Loading checks every parameter type, recomputes signatures, selectors,
//! topics and indexed counts from the names and inputs, and replays the
//! entries through the builder's collision rules. A loaded registry is
//! identical to the one that was saved, and a hand-edited artifact either
//! satisfies the registry invariants or is rejected.

use abiscope_core::{
    error::RegistryError,
    signature::{EventSignature, FunctionSignature},
    types::Param,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builder::RegistryBuilder;
use crate::registry::SignatureRegistry;

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

/// On-disk representation of a [`SignatureRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryArtifact {
    pub version: u32,
    pub functions: Vec<FunctionSignature>,
    pub events: Vec<EventSignature>,
}

impl SignatureRegistry {
    pub fn to_artifact(&self) -> RegistryArtifact {
        RegistryArtifact {
            version: ARTIFACT_VERSION,
            functions: self.functions().cloned().collect(),
            events: self.events().cloned().collect(),
        }
    }

    pub fn from_artifact(artifact: RegistryArtifact) -> Result<Self, RegistryError> {
        if artifact.version != ARTIFACT_VERSION {
            return Err(RegistryError::ArtifactVersion {
                found: artifact.version,
                expected: ARTIFACT_VERSION,
            });
        }
        let mut builder = RegistryBuilder::new();
        for f in artifact.functions {
            check_inputs(&f.name, &f.inputs)?;
            builder.add_function(FunctionSignature::new(f.name, f.inputs));
        }
        for e in artifact.events {
            check_inputs(&e.name, &e.inputs)?;
            builder.add_event(EventSignature::new(e.name, e.inputs));
        }
        Ok(builder.build())
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string_pretty(&self.to_artifact())?)
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), RegistryError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn check_inputs(name: &str, inputs: &[Param]) -> Result<(), RegistryError> {
    for p in inputs {
        p.kind
            .validate()
            .map_err(|source| RegistryError::InvalidEntry {
                source_name: "registry artifact".to_string(),
                entry: name.to_string(),
                source,
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiscope_core::error::TypeError;
    use alloy_primitives::{Selector, B256};

    const CORPUS: &str = r#"[
        {"type":"function","name":"transfer","inputs":[
            {"name":"to","type":"address"},{"name":"amount","type":"uint256"}]},
        {"type":"function","name":"multicall","inputs":[
            {"name":"calls","type":"tuple[]","components":[
                {"name":"target","type":"address"},{"name":"data","type":"bytes"}]}]},
        {"type":"event","name":"Transfer","inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256"}]},
        {"type":"event","name":"Transfer","inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"tokenId","type":"uint256","indexed":true}]}
    ]"#;

    fn build() -> SignatureRegistry {
        let mut b = RegistryBuilder::new();
        assert!(b.add_document("corpus.json", CORPUS));
        b.build()
    }

    #[test]
    fn artifact_reload_is_identical() {
        let reg = build();
        let json = reg.to_json().unwrap();
        let back = SignatureRegistry::from_json(&json).unwrap();
        assert_eq!(reg, back);
        assert_eq!(back.stats().event_variants, 2);
    }

    #[test]
    fn artifact_file_roundtrip() {
        let reg = build();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        reg.save_json(&path).unwrap();
        let back = SignatureRegistry::load_json(&path).unwrap();
        assert_eq!(
            back.function_by_selector_hex("0xa9059cbb").unwrap().signature,
            "transfer(address,uint256)"
        );
    }

    #[test]
    fn artifact_renders_hex_identifiers() {
        let value: serde_json::Value = serde_json::from_str(&build().to_json().unwrap()).unwrap();
        assert_eq!(value["functions"][0]["selector"], "0xa9059cbb");
        assert_eq!(
            value["events"][0]["topic"],
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn rejects_out_of_range_types() {
        let json = r#"{"version":1,"functions":[{
            "name":"g","signature":"g(bytes64)","selector":"0x11223344",
            "inputs":[{"name":"b","kind":{"fixed_bytes":64}}]}],"events":[]}"#;
        match SignatureRegistry::from_json(json) {
            Err(RegistryError::InvalidEntry { entry, source, .. }) => {
                assert_eq!(entry, "g");
                assert!(matches!(source, TypeError::InvalidSize { .. }));
            }
            other => panic!("expected InvalidEntry, got {other:?}"),
        }
    }

    #[test]
    fn recomputes_identifiers_from_inputs() {
        let mut artifact = build().to_artifact();
        artifact.functions[0].selector = Selector::from([0x11, 0x22, 0x33, 0x44]);
        artifact.functions[0].signature = "bogus()".to_string();
        artifact.events[0].topic = B256::ZERO;
        artifact.events[0].indexed_count = 3;

        let reg = SignatureRegistry::from_artifact(artifact).unwrap();
        assert!(reg.function_by_selector_hex("0x11223344").is_none());
        assert_eq!(
            reg.function_by_selector_hex("0xa9059cbb").unwrap().signature,
            "transfer(address,uint256)"
        );
        let counts: Vec<usize> = reg
            .events_by_topic_hex(
                "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
            )
            .iter()
            .map(|v| v.indexed_count)
            .collect();
        assert_eq!(counts, vec![2, 3]);
        assert_eq!(reg, build());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut artifact = build().to_artifact();
        artifact.version = 99;
        assert!(matches!(
            SignatureRegistry::from_artifact(artifact),
            Err(RegistryError::ArtifactVersion { found: 99, .. })
        ));
    }
}
