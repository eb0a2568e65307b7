//! Streaming UTF-8 decoding for chunked byte input.
//!
//! Chunks coming off a socket can end in the middle of a multi-byte
//! sequence. The decoder holds back such an incomplete tail (at most three
//! bytes) and completes it with the next chunk.

use crate::error::{Error, ErrorKind, Result};

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Incremental UTF-8 decoder.
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    /// Set once the first bytes have been examined for a byte order mark.
    started: bool,
}

impl Utf8Decoder {
    /// Creates a decoder at the start of a stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` and appends the complete code points to `out`.
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) -> Result<()> {
        if self.pending.is_empty() {
            self.decode_from(bytes, out)
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(bytes);
            self.decode_from(&joined, out)
        }
    }

    fn decode_from(&mut self, mut bytes: &[u8], out: &mut String) -> Result<()> {
        if !self.started {
            if bytes.len() < BOM.len() && BOM.starts_with(bytes) {
                self.pending.extend_from_slice(bytes);
                return Ok(());
            }
            self.started = true;
            if let Some(rest) = bytes.strip_prefix(BOM) {
                bytes = rest;
            }
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => {
                out.push_str(text);
                Ok(())
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // Validated by `from_utf8` up to `valid_up_to`.
                let valid =
                    std::str::from_utf8(valid).map_err(|_| Error::new(ErrorKind::InvalidUtf8))?;
                out.push_str(valid);
                match e.error_len() {
                    // Incomplete sequence at the end of the chunk.
                    None => {
                        self.pending.extend_from_slice(rest);
                        Ok(())
                    }
                    Some(_) => Err(Error::new(ErrorKind::InvalidUtf8)),
                }
            }
        }
    }

    /// Returns `true` if an incomplete sequence is waiting for more bytes.
    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Signals the end of the stream.
    ///
    /// Fails if the stream ended inside a multi-byte sequence.
    pub fn finish(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            self.pending.clear();
            Err(Error::new(ErrorKind::InvalidUtf8))
        }
    }

    /// Resets the decoder to the start of a new stream.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.started = false;
    }
}
