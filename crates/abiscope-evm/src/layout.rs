//! The ABI head/tail layout walk.
//!
//! Values are packed into 32-byte words. A parameter sequence (function
//! inputs, non-indexed event fields, tuple components, array elements) has a
//! head with [`ParamType::head_size`] bytes per member:
//!
//! - **static** members sit in the head directly; static tuples and static
//!   fixed arrays inline all of their members
//! - **dynamic** members (`string`, `bytes`, `T[]`, and tuples / `T[k]` with
//!   a dynamic member) hold an offset, relative to the start of the
//!   sequence, into the tail
//!
//! At the offset, `string`/`bytes` are a length word followed by the padded
//! bytes, `T[]` is a count word followed by a nested sequence of elements,
//! and dynamic tuples / `T[k]` are a nested sequence with their own head and
//! tail.

use abiscope_core::{
    error::DecodeError,
    types::{AbiValue, Param, ParamType},
};
use alloy_primitives::{Address, I256, U256};

use crate::config::DecoderConfig;
use crate::cursor::{Cursor, WORD};

/// Expansion budget for one top-level decode.
#[derive(Debug)]
pub struct Limits {
    max_array_elements: usize,
    remaining: usize,
    max_decoded_bytes: usize,
    bytes_remaining: usize,
}

impl Limits {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_array_elements: config.max_array_elements,
            remaining: config.max_total_elements,
            max_decoded_bytes: config.max_decoded_bytes,
            bytes_remaining: config.max_decoded_bytes,
        }
    }

    /// Reserve `count` elements at one word each; `false` means summarize
    /// instead of expanding.
    fn take(&mut self, count: usize) -> bool {
        let bytes = count.saturating_mul(WORD);
        if count > self.max_array_elements
            || count > self.remaining
            || bytes > self.bytes_remaining
        {
            return false;
        }
        self.remaining -= count;
        self.bytes_remaining -= bytes;
        true
    }

    /// Reserve `len` bytes of copied tail data.
    fn charge(&mut self, len: usize) -> Result<(), DecodeError> {
        if len > self.bytes_remaining {
            return Err(DecodeError::BudgetExceeded {
                limit: self.max_decoded_bytes,
            });
        }
        self.bytes_remaining -= len;
        Ok(())
    }
}

/// Decode a parameter sequence starting at `frame`.
///
/// Every member yields its own result; a member that fails still advances
/// the head by its declared size, so later static members keep reading
/// from the right slot.
pub fn decode_sequence<'p>(
    types: impl IntoIterator<Item = &'p ParamType>,
    frame: Cursor<'_>,
    limits: &mut Limits,
) -> Vec<Result<AbiValue, DecodeError>> {
    let mut cursor = frame;
    let mut out = Vec::new();
    for ty in types {
        match decode_value(ty, cursor, limits) {
            Ok((value, consumed)) => {
                out.push(Ok(value));
                cursor = cursor.advance(consumed);
            }
            Err(e) => {
                out.push(Err(e));
                cursor = cursor.advance(ty.head_size());
            }
        }
    }
    out
}

/// Decode one value whose head slot(s) start at `cursor`.
///
/// Returns the value and the number of head bytes it consumed: 32 for a
/// dynamic value (its offset slot), [`ParamType::head_size`] otherwise.
pub fn decode_value(
    ty: &ParamType,
    cursor: Cursor<'_>,
    limits: &mut Limits,
) -> Result<(AbiValue, usize), DecodeError> {
    if ty.is_dynamic() {
        let offset = cursor.read_usize()?;
        let target = cursor.follow(offset)?;
        let value = decode_tail(ty, target, limits)?;
        Ok((value, WORD))
    } else {
        let value = decode_static(ty, cursor, limits)?;
        Ok((value, ty.head_size()))
    }
}

/// Decode a static value in place.
pub fn decode_static(
    ty: &ParamType,
    cursor: Cursor<'_>,
    limits: &mut Limits,
) -> Result<AbiValue, DecodeError> {
    match ty {
        ParamType::FixedArray(elem, len) => {
            decode_elements(elem, *len, cursor, limits)
        }
        ParamType::Tuple(components) => decode_fields(components, cursor, limits),
        _ => decode_word(ty, cursor.word()?),
    }
}

/// Format a single-word value. Reference types never reach this point.
pub fn decode_word(ty: &ParamType, word: &[u8; WORD]) -> Result<AbiValue, DecodeError> {
    Ok(match ty {
        ParamType::Address => AbiValue::Address(Address::from_slice(&word[12..])),
        ParamType::Uint(_) => AbiValue::Uint(U256::from_be_bytes(*word)),
        ParamType::Int(bits) => AbiValue::Int(sign_extend(U256::from_be_bytes(*word), *bits)),
        ParamType::Bool => AbiValue::Bool(word.iter().any(|b| *b != 0)),
        ParamType::FixedBytes(n) => {
            let bytes = word.get(..usize::from(*n)).ok_or_else(|| DecodeError::NotAWord {
                ty: ty.declared(),
            })?;
            AbiValue::FixedBytes(bytes.to_vec())
        }
        ParamType::Function => {
            let mut f = [0u8; 24];
            f.copy_from_slice(&word[..24]);
            AbiValue::Function(f)
        }
        ParamType::Bytes
        | ParamType::String
        | ParamType::Array(_)
        | ParamType::FixedArray(..)
        | ParamType::Tuple(_) => {
            return Err(DecodeError::NotAWord {
                ty: ty.declared(),
            })
        }
    })
}

/// Interpret the low `bits` of `raw` as a two's-complement integer.
fn sign_extend(raw: U256, bits: u16) -> I256 {
    if bits >= 256 || bits == 0 {
        return I256::from_raw(raw);
    }
    let shift = 256 - usize::from(bits);
    I256::from_raw(raw << shift).asr(shift)
}

/// Decode a dynamic value whose encoding starts at `frame`.
fn decode_tail(
    ty: &ParamType,
    frame: Cursor<'_>,
    limits: &mut Limits,
) -> Result<AbiValue, DecodeError> {
    match ty {
        ParamType::Bytes => Ok(AbiValue::Bytes(read_length_prefixed(frame, limits)?.to_vec())),
        ParamType::String => Ok(AbiValue::String(
            String::from_utf8_lossy(read_length_prefixed(frame, limits)?).into_owned(),
        )),
        ParamType::Array(elem) => {
            let count = frame.read_usize()?;
            decode_elements(elem, count, frame.advance(WORD).enter(), limits)
        }
        ParamType::FixedArray(elem, len) => decode_elements(elem, *len, frame, limits),
        ParamType::Tuple(components) => decode_fields(components, frame, limits),
        _ => decode_static(ty, frame, limits),
    }
}

fn read_length_prefixed<'a>(
    frame: Cursor<'a>,
    limits: &mut Limits,
) -> Result<&'a [u8], DecodeError> {
    let len = frame.read_usize()?;
    let bytes = frame.advance(WORD).bytes(len)?;
    limits.charge(len)?;
    Ok(bytes)
}

/// Decode `count` elements of `elem` laid out as one sequence at `frame`.
fn decode_elements(
    elem: &ParamType,
    count: usize,
    frame: Cursor<'_>,
    limits: &mut Limits,
) -> Result<AbiValue, DecodeError> {
    // Every element needs at least its head; reject counts the buffer cannot hold.
    let needed = count.checked_mul(elem.head_size()).ok_or_else(|| {
        DecodeError::LengthOverflow {
            length: count.to_string(),
        }
    })?;
    if needed > frame.remaining() {
        return Err(DecodeError::Truncated {
            offset: frame.offset(),
            needed,
            available: frame.remaining(),
        });
    }
    if !limits.take(count) {
        return Ok(AbiValue::ArraySummary(count));
    }

    let mut cursor = frame;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let (value, consumed) = decode_value(elem, cursor, limits)?;
        items.push(value);
        cursor = cursor.advance(consumed);
    }
    Ok(AbiValue::Array(items))
}

/// Decode tuple components laid out as one sequence at `frame`.
fn decode_fields(
    components: &[Param],
    frame: Cursor<'_>,
    limits: &mut Limits,
) -> Result<AbiValue, DecodeError> {
    let mut cursor = frame;
    let mut fields = Vec::with_capacity(components.len());
    for c in components {
        let (value, consumed) = decode_value(&c.kind, cursor, limits)?;
        fields.push((c.name.clone(), value));
        cursor = cursor.advance(consumed);
    }
    Ok(AbiValue::Tuple(fields))
}
