//! # abiscope-core
//!
//! Core types shared across the abiscope crates: the resolved ABI type
//! model, function/event signature records, the read-only registry trait
//! the decoder consumes, and the decoded output records.

pub mod call;
pub mod error;
pub mod event;
pub mod signature;
pub mod types;

pub use call::{DecodedCall, DecodedParam};
pub use error::{DecodeError, RegistryError, TypeError};
pub use event::{DecodedLog, RawLog};
pub use signature::{EventSignature, FunctionSignature, SignatureLookup};
pub use types::{AbiValue, Param, ParamType};
