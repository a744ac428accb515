//! Read cursor over an ABI-encoded buffer.
//!
//! A [`Cursor`] is the triple (buffer, frame base, position within the
//! frame). The frame base is the start of the enclosing parameter sequence;
//! every offset stored in a head slot is relative to it. Cursors are `Copy`
//! and every operation returns a new one, so a recursive decode can never
//! disturb its caller's position.

use abiscope_core::error::DecodeError;

/// Size of one ABI word.
pub const WORD: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// A cursor at the start of `buf`, which is also the outermost frame.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, base: 0, pos: 0 }
    }

    /// Start of the current frame, as an absolute buffer offset.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Read position relative to the frame base.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Absolute read position.
    pub fn offset(&self) -> usize {
        self.base.saturating_add(self.pos)
    }

    /// Bytes left in the buffer from the read position.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset())
    }

    /// The same frame, `n` bytes further along.
    pub fn advance(self, n: usize) -> Self {
        Self {
            pos: self.pos.saturating_add(n),
            ..self
        }
    }

    /// A new frame that starts at the current read position.
    pub fn enter(self) -> Self {
        Self {
            buf: self.buf,
            base: self.offset(),
            pos: 0,
        }
    }

    /// A new frame starting `offset` bytes after this frame's base: the
    /// target of a head-slot offset.
    pub fn follow(self, offset: usize) -> Result<Self, DecodeError> {
        let base = self
            .base
            .checked_add(offset)
            .filter(|b| *b <= self.buf.len())
            .ok_or_else(|| DecodeError::OffsetOutOfRange {
                offset: offset.to_string(),
                len: self.buf.len(),
            })?;
        Ok(Self {
            buf: self.buf,
            base,
            pos: 0,
        })
    }

    /// `len` bytes at the read position.
    pub fn bytes(&self, len: usize) -> Result<&'a [u8], DecodeError> {
        let start = self.offset();
        start
            .checked_add(len)
            .and_then(|end| self.buf.get(start..end))
            .ok_or(DecodeError::Truncated {
                offset: start,
                needed: len,
                available: self.remaining(),
            })
    }

    /// The 32-byte word at the read position.
    pub fn word(&self) -> Result<&'a [u8; WORD], DecodeError> {
        let bytes = self.bytes(WORD)?;
        bytes.try_into().map_err(|_| DecodeError::Truncated {
            offset: self.offset(),
            needed: WORD,
            available: self.remaining(),
        })
    }

    /// The word at the read position interpreted as an offset or length.
    /// Values that cannot possibly index into memory are rejected.
    pub fn read_usize(&self) -> Result<usize, DecodeError> {
        let word = self.word()?;
        word_to_usize(word).ok_or_else(|| DecodeError::LengthOverflow {
            length: format!("0x{}", hex::encode(word)),
        })
    }
}

/// Interpret a big-endian word as a `usize`, if it fits.
pub fn word_to_usize(word: &[u8; WORD]) -> Option<usize> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD - 8..]);
    usize::try_from(u64::from_be_bytes(low)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_of(n: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&n.to_be_bytes());
        w
    }

    #[test]
    fn advance_and_follow_are_frame_relative() {
        let mut buf = vec![0u8; 128];
        buf[64..96].copy_from_slice(&word_of(7));
        let root = Cursor::new(&buf);

        let inner = root.advance(32).enter();
        assert_eq!(inner.base(), 32);
        // Offset 32 from the inner frame lands at absolute 64.
        let target = inner.follow(32).unwrap();
        assert_eq!(target.offset(), 64);
        assert_eq!(target.read_usize().unwrap(), 7);
        // The original cursor is untouched.
        assert_eq!(root.offset(), 0);
    }

    #[test]
    fn reads_past_end_are_truncation_errors() {
        let buf = [0u8; 40];
        let c = Cursor::new(&buf).advance(32);
        assert_eq!(c.remaining(), 8);
        assert!(matches!(
            c.word(),
            Err(DecodeError::Truncated { offset: 32, needed: 32, available: 8 })
        ));
        assert!(Cursor::new(&buf).follow(41).is_err());
        assert!(Cursor::new(&buf).follow(usize::MAX).is_err());
    }

    #[test]
    fn oversized_words_do_not_become_lengths() {
        let mut w = [0u8; 32];
        w[0] = 1;
        assert_eq!(word_to_usize(&w), None);
        assert_eq!(word_to_usize(&word_of(96)), Some(96));
        assert!(matches!(
            Cursor::new(&w).read_usize(),
            Err(DecodeError::LengthOverflow { .. })
        ));
    }
}
