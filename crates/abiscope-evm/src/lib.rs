//! # abiscope-evm
//!
//! Ethereum ABI decoding against an abiscope signature registry.
//!
//! ## Implementation notes
//! - call data: bytes `[0..4]` select the function, the rest is the
//!   head/tail-encoded input sequence
//! - logs: `topics[0]` selects the event, `topics[1..]` carry indexed
//!   parameters, `data` carries the non-indexed ones as one sequence
//! - the layout walk is hand-written over an explicit [`cursor::Cursor`] so
//!   that malformed input degrades per parameter instead of failing the whole
//!   record

pub mod batch;
pub mod config;
pub mod cursor;
pub mod decoder;
pub mod layout;

pub use batch::{decode_calls_parallel, decode_logs_chunked, decode_logs_parallel};
pub use config::DecoderConfig;
pub use decoder::{decode_event_log, decode_function_input, EvmDecoder};
