//! Interface-definition corpus parser.
//!
//! A corpus document is standard Ethereum ABI JSON, either a bare array of
//! entries or a compiler artifact object carrying the array under `abi`
//! (Hardhat, Foundry and Truffle all emit this shape). Each function and
//! event entry is resolved into a [`FunctionSignature`] / [`EventSignature`]
//! with its types parsed into [`ParamType`].
//!
//! Parsing is lenient at entry granularity: one bad entry is reported and
//! skipped, the rest of the document still counts.

use abiscope_core::{
    error::{RegistryError, TypeError},
    signature::{EventSignature, FunctionSignature},
    types::{Param, ParamType},
};
use serde::Deserialize;

// ─── Raw ABI JSON serde types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentRaw {
    Entries(Vec<serde_json::Value>),
    Artifact { abi: Vec<serde_json::Value> },
}

#[derive(Debug, Deserialize)]
struct EntryRaw {
    // Pre-0.4 compilers omitted `type` for functions.
    #[serde(rename = "type", default = "default_entry_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<ParamRaw>,
    #[serde(default)]
    anonymous: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct ParamRaw {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    indexed: Option<bool>,
    #[serde(default)]
    components: Vec<ParamRaw>,
}

// ─── Parsed output ────────────────────────────────────────────────────────────

/// A function or event extracted from a corpus document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiItem {
    Function(FunctionSignature),
    Event(EventSignature),
}

/// Everything extracted from one document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    /// Functions and events in document order
    pub items: Vec<AbiItem>,
    /// Entries that were well-formed but carry no selector or topic
    /// (constructors, errors, fallback/receive, anonymous events)
    pub ignored: usize,
    /// Entries that could not be resolved, one message each
    pub skipped: Vec<String>,
}

/// Parse one corpus document.
///
/// Returns an error only when the document as a whole is not ABI JSON;
/// individual bad entries land in [`ParsedDocument::skipped`].
pub fn parse_document(source_name: &str, json: &str) -> Result<ParsedDocument, RegistryError> {
    let raw: DocumentRaw = serde_json::from_str(json).map_err(|e| RegistryError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;
    let entries = match raw {
        DocumentRaw::Entries(entries) => entries,
        DocumentRaw::Artifact { abi } => abi,
    };

    let mut doc = ParsedDocument::default();
    for (idx, value) in entries.into_iter().enumerate() {
        let entry: EntryRaw = match serde_json::from_value(value) {
            Ok(e) => e,
            Err(e) => {
                doc.skipped.push(format!("{source_name}: entry #{idx}: {e}"));
                continue;
            }
        };
        match parse_entry(source_name, entry) {
            Ok(Some(item)) => doc.items.push(item),
            Ok(None) => doc.ignored += 1,
            Err(e) => doc.skipped.push(e.to_string()),
        }
    }
    Ok(doc)
}

fn parse_entry(source_name: &str, entry: EntryRaw) -> Result<Option<AbiItem>, RegistryError> {
    let is_event = match entry.kind.as_str() {
        "function" => false,
        "event" if entry.anonymous => return Ok(None),
        "event" => true,
        "constructor" | "error" | "fallback" | "receive" => return Ok(None),
        other => {
            return Err(RegistryError::Parse {
                source_name: source_name.to_string(),
                reason: format!("unknown entry type '{other}'"),
            })
        }
    };
    if entry.name.is_empty() {
        return Err(RegistryError::Parse {
            source_name: source_name.to_string(),
            reason: format!("{} entry without a name", entry.kind),
        });
    }

    let inputs = entry
        .inputs
        .iter()
        .map(|p| resolve_param(p, is_event))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| RegistryError::InvalidEntry {
            source_name: source_name.to_string(),
            entry: entry.name.clone(),
            source,
        })?;

    Ok(Some(if is_event {
        AbiItem::Event(EventSignature::new(entry.name, inputs))
    } else {
        AbiItem::Function(FunctionSignature::new(entry.name, inputs))
    }))
}

/// Resolve a raw parameter. `indexed` is honoured only for top-level event
/// parameters; tuple components never carry it.
fn resolve_param(raw: &ParamRaw, top_level_event: bool) -> Result<Param, TypeError> {
    let components = raw
        .components
        .iter()
        .map(|c| resolve_param(c, false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Param {
        name: raw.name.clone(),
        kind: ParamType::parse(&raw.ty, components)?,
        indexed: top_level_event && raw.indexed.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERC20_ABI: &str = r#"[
        {
            "type": "function",
            "name": "transfer",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "anonymous": false,
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        },
        {"type": "constructor", "inputs": [{"name": "supply", "type": "uint256"}]},
        {"type": "error", "name": "InsufficientBalance", "inputs": []}
    ]"#;

    #[test]
    fn parses_functions_and_events() {
        let doc = parse_document("erc20.json", ERC20_ABI).unwrap();
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.ignored, 2);
        assert!(doc.skipped.is_empty());

        match &doc.items[0] {
            AbiItem::Function(f) => assert_eq!(f.selector_hex(), "0xa9059cbb"),
            other => panic!("expected function, got {other:?}"),
        }
        match &doc.items[1] {
            AbiItem::Event(e) => {
                assert_eq!(e.signature, "Transfer(address,address,uint256)");
                assert_eq!(e.indexed_count, 2);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn accepts_artifact_shape() {
        let json = format!(r#"{{"contractName": "Token", "abi": {ERC20_ABI}}}"#);
        let doc = parse_document("Token.json", &json).unwrap();
        assert_eq!(doc.items.len(), 2);
    }

    #[test]
    fn expands_nested_tuples() {
        let json = r#"[{
            "type": "function",
            "name": "fill",
            "inputs": [{
                "name": "orders",
                "type": "tuple[]",
                "components": [
                    {"name": "maker", "type": "address"},
                    {"name": "terms", "type": "tuple", "components": [
                        {"name": "amount", "type": "uint256"},
                        {"name": "memo", "type": "string"}
                    ]}
                ]
            }]
        }]"#;
        let doc = parse_document("fill.json", json).unwrap();
        match &doc.items[0] {
            AbiItem::Function(f) => {
                assert_eq!(f.signature, "fill((address,(uint256,string))[])");
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn bad_entry_is_skipped_not_fatal() {
        let json = r#"[
            {"type": "function", "name": "weird", "inputs": [{"name": "m", "type": "mapping(address => uint256)"}]},
            {"type": "function", "name": "broken", "inputs": [{"name": "t", "type": "tuple"}]},
            {"type": "function", "inputs": []},
            {"type": "function", "name": "ok", "inputs": []}
        ]"#;
        let doc = parse_document("mixed.json", json).unwrap();
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.skipped.len(), 3);
    }

    #[test]
    fn component_indexed_flags_are_ignored() {
        let json = r#"[{
            "type": "event",
            "name": "Posted",
            "inputs": [{
                "name": "post", "type": "tuple", "indexed": false,
                "components": [{"name": "id", "type": "uint256", "indexed": true}]
            }]
        }]"#;
        let doc = parse_document("posted.json", json).unwrap();
        match &doc.items[0] {
            AbiItem::Event(e) => {
                assert_eq!(e.indexed_count, 0);
                match &e.inputs[0].kind {
                    ParamType::Tuple(c) => assert!(!c[0].indexed),
                    other => panic!("expected tuple, got {other:?}"),
                }
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn canonical_signatures_match_alloy() {
        let json = r#"[
            {"type":"function","name":"execute","inputs":[
                {"name":"ops","type":"tuple[]","components":[
                    {"name":"target","type":"address"},
                    {"name":"values","type":"uint256[3]"},
                    {"name":"inner","type":"tuple","components":[
                        {"name":"flag","type":"bool"},{"name":"payload","type":"bytes"}]}]},
                {"name":"deadline","type":"uint64"}]},
            {"type":"event","name":"Executed","inputs":[
                {"name":"id","type":"bytes32","indexed":true},
                {"name":"result","type":"tuple","components":[
                    {"name":"ok","type":"bool"},{"name":"ret","type":"bytes[]"}]}]}
        ]"#;
        let ours = parse_document("exec.json", json).unwrap();
        let alloy: alloy_json_abi::JsonAbi = serde_json::from_str(json).unwrap();

        let alloy_fn = alloy.functions().next().unwrap();
        let alloy_ev = alloy.events().next().unwrap();
        match (&ours.items[0], &ours.items[1]) {
            (AbiItem::Function(f), AbiItem::Event(e)) => {
                assert_eq!(f.signature, alloy_fn.signature());
                assert_eq!(f.selector, alloy_fn.selector());
                assert_eq!(e.signature, alloy_ev.signature());
                assert_eq!(e.topic, alloy_ev.selector());
            }
            other => panic!("unexpected items {other:?}"),
        }
    }

    #[test]
    fn not_json_is_a_document_error() {
        assert!(matches!(
            parse_document("junk.json", "{ not json"),
            Err(RegistryError::Parse { .. })
        ));
    }
}
