//! Keyed Stream Codec
//!
//! Transparent wrapper that XORs every byte moving through it with a keystream
//! derived from the key and the byte's absolute stream position. The
//! transform is its own inverse, so one type both encrypts and decrypts.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::config::OpvmConfig;

use super::length::StreamLength;

/// Mixed into every keystream byte alongside the key and position
pub const KEYSTREAM_CONSTANT: u64 = 0xC3;

/// Keystream byte for one absolute stream position
pub fn keystream_byte(key: u8, position: u64) -> u8 {
    (key as u64 ^ KEYSTREAM_CONSTANT ^ position) as u8
}

/// Transform `bytes` in place as if they sat at `position` in the stream.
pub fn apply_keystream(key: u8, position: u64, bytes: &mut [u8]) {
    for (i, b) in bytes.iter_mut().enumerate() {
        *b ^= keystream_byte(key, position.wrapping_add(i as u64));
    }
}

/// Stream wrapper applying the positional keystream on read and write
///
/// The wrapper does not manage the inner stream's lifetime; pass `&mut S`
/// to keep ownership with the caller.
pub struct KeyedStream<S> {
    inner: S,
    key: u8,
    scratch: Vec<u8>,
}

impl<S> KeyedStream<S> {
    pub fn new(inner: S, key: u8) -> Self {
        debug!("keyed stream attached");
        KeyedStream {
            inner,
            key,
            scratch: Vec::new(),
        }
    }

    /// Wrap using the configured stream key
    pub fn from_config(inner: S, config: &OpvmConfig) -> Self {
        Self::new(inner, config.stream_key)
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: StreamLength> KeyedStream<S> {
    pub fn byte_len(&mut self) -> io::Result<u64> {
        self.inner.byte_len()
    }

    pub fn set_byte_len(&mut self, len: u64) -> io::Result<()> {
        self.inner.set_byte_len(len)
    }
}

impl<S: Read + Seek> Read for KeyedStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.inner.stream_position()?;
        let n = self.inner.read(buf)?;
        apply_keystream(self.key, position, &mut buf[..n]);
        Ok(n)
    }
}

impl<S: Write + Seek> Write for KeyedStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let position = self.inner.stream_position()?;
        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        apply_keystream(self.key, position, &mut self.scratch);
        self.inner.write(&self.scratch)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: Seek> Seek for KeyedStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }
}

impl<S> fmt::Debug for KeyedStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStream").finish_non_exhaustive()
    }
}
