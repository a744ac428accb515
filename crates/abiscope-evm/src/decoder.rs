//! `EvmDecoder`: call data and event log decoding against a signature registry.
//!
//! Both entry points return `None` when the selector / topic is not in the
//! registry. A recognised signature always yields a record; parameters that
//! could not be recovered carry `value: None` plus an entry in
//! `decode_errors`.

use abiscope_core::{
    call::{param_label, DecodedCall, DecodedParam},
    error::DecodeError,
    event::{DecodedLog, RawLog},
    signature::{topic_from_hex, EventSignature, SignatureLookup},
    types::{AbiValue, Param},
};
use alloy_primitives::Selector;
use indexmap::IndexMap;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::cursor::Cursor;
use crate::layout::{self, Limits};

/// The ABI decoder.
/// Stateless apart from its limits; cheap to copy and share across threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvmDecoder {
    config: DecoderConfig,
}

impl EvmDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode transaction input from `0x`-prefixed hex.
    ///
    /// Returns `None` for input that is not hex, shorter than a selector, or
    /// whose selector is not registered.
    pub fn decode_function_input(
        &self,
        registry: &dyn SignatureLookup,
        raw_hex: &str,
    ) -> Option<DecodedCall> {
        let bytes = lenient_hex(raw_hex).ok()?;
        self.decode_call_bytes(registry, &bytes)
    }

    /// Decode transaction input from raw bytes (selector included).
    pub fn decode_call_bytes(
        &self,
        registry: &dyn SignatureLookup,
        calldata: &[u8],
    ) -> Option<DecodedCall> {
        if calldata.len() < 4 {
            return None;
        }
        let selector = Selector::from_slice(&calldata[..4]);
        let func = registry.function(&selector)?;

        let mut limits = Limits::new(&self.config);
        let results = layout::decode_sequence(
            func.inputs.iter().map(|p| &p.kind),
            Cursor::new(&calldata[4..]),
            &mut limits,
        );

        let mut params = Vec::with_capacity(func.inputs.len());
        let mut decode_errors = IndexMap::new();
        for (idx, (param, result)) in func.inputs.iter().zip(results.iter()).enumerate() {
            if let Err(e) = result {
                decode_errors.insert(param_label(param, idx), e.to_string());
            }
            params.push(DecodedParam::from_result(param, result));
        }

        Some(DecodedCall {
            name: func.name.clone(),
            signature: func.signature.clone(),
            selector,
            params,
            decode_errors,
        })
    }

    /// Decode an event log.
    ///
    /// Returns `None` when `topics` is empty, `topics[0]` is not a valid
    /// topic, or no event is registered for it.
    pub fn decode_event_log(
        &self,
        registry: &dyn SignatureLookup,
        log: &RawLog,
    ) -> Option<DecodedLog> {
        let topic = topic_from_hex(log.signature_topic()?)?;
        let event = select_variant(registry.event_variants(&topic), log.indexed_topic_count())?;

        // Non-indexed parameters are one head/tail sequence over `data`.
        let data_results: Vec<Result<AbiValue, DecodeError>> = match lenient_hex(&log.data) {
            Ok(data) => {
                let mut limits = Limits::new(&self.config);
                layout::decode_sequence(
                    event.inputs.iter().filter(|p| !p.indexed).map(|p| &p.kind),
                    Cursor::new(&data),
                    &mut limits,
                )
            }
            Err(e) => event
                .inputs
                .iter()
                .filter(|p| !p.indexed)
                .map(|_| Err(e.clone()))
                .collect(),
        };
        let mut data_results = data_results.into_iter();

        let mut params = Vec::with_capacity(event.inputs.len());
        let mut decode_errors = IndexMap::new();
        let mut topic_idx = 1;
        for (idx, param) in event.inputs.iter().enumerate() {
            let result = if param.indexed {
                let r = decode_topic(param, log.topics.get(topic_idx).map(String::as_str), topic_idx);
                topic_idx += 1;
                r
            } else {
                data_results.next().unwrap_or(Err(DecodeError::Truncated {
                    offset: 0,
                    needed: param.kind.head_size(),
                    available: 0,
                }))
            };
            if let Err(e) = &result {
                decode_errors.insert(param_label(param, idx), e.to_string());
            }
            params.push(DecodedParam::from_result(param, &result).with_indexed(param.indexed));
        }

        Some(DecodedLog {
            name: event.name.clone(),
            signature: event.signature.clone(),
            topic,
            params,
            decode_errors,
        })
    }
}

/// Pick the variant whose indexed count matches the topics carried by the
/// log, falling back to the first registered variant.
fn select_variant(variants: &[EventSignature], indexed_topics: usize) -> Option<&EventSignature> {
    let first = variants.first()?;
    match variants.iter().find(|v| v.indexed_count == indexed_topics) {
        Some(exact) => Some(exact),
        None => {
            debug!(
                signature = %first.signature,
                indexed_topics,
                variants = variants.len(),
                "no variant with matching indexed count, using first registered"
            );
            Some(first)
        }
    }
}

/// Decode one indexed parameter from its topic.
///
/// Value types are stored in the topic word directly. Reference types are
/// stored as the Keccak-256 of their encoding, so only the hash is returned.
fn decode_topic(param: &Param, topic: Option<&str>, index: usize) -> Result<AbiValue, DecodeError> {
    let topic = topic.ok_or(DecodeError::MissingTopic { index })?;
    let word = topic_from_hex(topic).ok_or_else(|| DecodeError::InvalidHex {
        reason: format!("topic {index} is not a 32-byte hex value"),
    })?;
    if param.kind.is_value_type() {
        layout::decode_word(&param.kind, &word.0)
    } else {
        Ok(AbiValue::Hashed(word))
    }
}

/// Hex decoding for payloads: the `0x` prefix is optional and a dangling
/// final nibble is dropped rather than rejecting the whole buffer.
fn lenient_hex(s: &str) -> Result<Vec<u8>, DecodeError> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if !s.is_ascii() {
        return Err(DecodeError::InvalidHex {
            reason: "non-ASCII input".into(),
        });
    }
    let even = &s[..s.len() - s.len() % 2];
    hex::decode(even).map_err(|e| DecodeError::InvalidHex {
        reason: e.to_string(),
    })
}

/// Decode call data with the default configuration.
pub fn decode_function_input(registry: &dyn SignatureLookup, raw_hex: &str) -> Option<DecodedCall> {
    EvmDecoder::new().decode_function_input(registry, raw_hex)
}

/// Decode an event log with the default configuration.
pub fn decode_event_log(registry: &dyn SignatureLookup, log: &RawLog) -> Option<DecodedLog> {
    EvmDecoder::new().decode_event_log(registry, log)
}
