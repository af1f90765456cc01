//! Protected Blob Reader
//!
//! Reads big-endian operands and base-85 offset literals from a byte source,
//! usually a [`KeyedStream`](super::KeyedStream) over the protected blob.
//! This layer performs structural reads only.

use std::io::Read;

use crate::encoding::base85;
use crate::error::{OpvmError, OpvmResult};

/// Sequential reader over a protected byte source
#[derive(Debug)]
pub struct BlobReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> BlobReader<R> {
    pub fn new(inner: R) -> Self {
        BlobReader { inner, consumed: 0 }
    }

    /// Bytes consumed through this reader so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_u8(&mut self) -> OpvmResult<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> OpvmResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> OpvmResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> OpvmResult<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> OpvmResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        self.consumed += len as u64;
        Ok(buf)
    }

    /// Read a length-prefixed base-85 literal and decode it to a 32-bit offset.
    pub fn read_offset_literal(&mut self) -> OpvmResult<u32> {
        let start = self.consumed as usize;
        let len = self.read_u8()? as usize;
        let text = self.read_bytes(len)?;
        let mut word = Vec::with_capacity(4);
        base85::decode_into(&text, &mut word).map_err(|e| match e {
            OpvmError::MalformedEncoding { offset, reason } => OpvmError::MalformedEncoding {
                offset: start + 1 + offset,
                reason,
            },
            other => other,
        })?;
        match word.as_slice() {
            [a, b, c, d] => Ok(u32::from_be_bytes([*a, *b, *c, *d])),
            _ => Err(OpvmError::malformed(
                start,
                "offset literal must decode to exactly four bytes",
            )),
        }
    }

    fn read_array<const N: usize>(&mut self) -> OpvmResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        self.consumed += N as u64;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn reads_big_endian_operands() {
        let mut bytes = vec![0x01, 0x02, 0x03, 0xDE, 0xAD, 0xBE, 0xEF];
        bytes.extend_from_slice(&1.5f64.to_be_bytes());
        let mut reader = BlobReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_u8().expect("u8"), 0x01);
        assert_eq!(reader.read_u16().expect("u16"), 0x0203);
        assert_eq!(reader.read_u32().expect("u32"), 0xDEAD_BEEF);
        assert_eq!(reader.read_f64().expect("f64"), 1.5);
        assert_eq!(reader.consumed(), 15);
    }

    #[test]
    fn offset_literal_decodes_to_word() {
        let mut bytes = vec![5u8];
        bytes.extend_from_slice(b"!!!!\"");
        bytes.push(1);
        bytes.push(b'z');
        let mut reader = BlobReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_offset_literal().expect("literal"), 1);
        assert_eq!(reader.read_offset_literal().expect("literal"), 0);
    }

    #[test]
    fn short_literal_is_malformed() {
        let mut bytes = vec![3u8];
        bytes.extend_from_slice(b"@:B");
        let mut reader = BlobReader::new(Cursor::new(bytes));
        assert!(matches!(
            reader.read_offset_literal(),
            Err(OpvmError::MalformedEncoding { offset: 0, .. })
        ));
    }

    #[test]
    fn truncated_source_is_stream_failure() {
        let mut reader = BlobReader::new(Cursor::new(vec![0x00]));
        match reader.read_u32() {
            Err(OpvmError::Stream(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
