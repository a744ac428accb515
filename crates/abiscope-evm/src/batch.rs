//! Rayon-powered batch decoding.
//!
//! Each item is decoded independently against the same immutable registry.
//! Output order matches input order, with `None` where the item's selector or
//! topic is unknown.

use abiscope_core::{
    call::DecodedCall,
    event::{DecodedLog, RawLog},
    signature::SignatureLookup,
};
use rayon::prelude::*;
use tracing::debug;

use crate::decoder::EvmDecoder;

/// Decode a slice of event logs in parallel.
pub fn decode_logs_parallel(
    decoder: &EvmDecoder,
    registry: &dyn SignatureLookup,
    logs: &[RawLog],
) -> Vec<Option<DecodedLog>> {
    let out: Vec<_> = logs
        .par_iter()
        .map(|log| decoder.decode_event_log(registry, log))
        .collect();
    debug!(
        total = logs.len(),
        decoded = out.iter().filter(|d| d.is_some()).count(),
        "batch log decode finished"
    );
    out
}

/// Decode a slice of call-data hex strings in parallel.
pub fn decode_calls_parallel<S>(
    decoder: &EvmDecoder,
    registry: &dyn SignatureLookup,
    calls: &[S],
) -> Vec<Option<DecodedCall>>
where
    S: AsRef<str> + Sync,
{
    let out: Vec<_> = calls
        .par_iter()
        .map(|raw| decoder.decode_function_input(registry, raw.as_ref()))
        .collect();
    debug!(
        total = calls.len(),
        decoded = out.iter().filter(|d| d.is_some()).count(),
        "batch call decode finished"
    );
    out
}

/// Decode logs in fixed-size chunks, one parallel pass per chunk.
/// Bounds how many logs are in flight at once; the size of each decoded log
/// is bounded separately by [`DecoderConfig::max_decoded_bytes`].
///
/// [`DecoderConfig::max_decoded_bytes`]: crate::config::DecoderConfig::max_decoded_bytes
pub fn decode_logs_chunked(
    decoder: &EvmDecoder,
    registry: &dyn SignatureLookup,
    logs: &[RawLog],
    chunk_size: usize,
) -> Vec<Option<DecodedLog>> {
    let mut out = Vec::with_capacity(logs.len());
    for chunk in logs.chunks(chunk_size.max(1)) {
        out.extend(decode_logs_parallel(decoder, registry, chunk));
    }
    out
}
