//! Operand model for the protected-code reference VM - Core Library
//!
//! Public API surface: tagged operands, the operand stack, the keyed stream
//! codec and the base-85 offset decoder.

pub mod error;
pub mod config;
pub mod encoding;
pub mod stack;
pub mod stream;
pub mod variant;

// Re-export commonly used types
pub use error::{OpvmError, OpvmResult};
pub use config::OpvmConfig;
pub use stack::{Advance, CursorState, OperandStack, StackCursor};
pub use stream::{BlobReader, KeyedStream};
pub use variant::{classify, NativeValue, TypeDesc, Variant, VariantFactory, VariantKind};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Seek, SeekFrom, Write};

    #[test]
    fn protected_offsets_flow_onto_stack() {
        let config = OpvmConfig {
            stream_key: 0x5A,
            ..OpvmConfig::default()
        };

        // Protector side: two length-prefixed offset literals, encrypted at rest
        let mut blob = KeyedStream::from_config(Cursor::new(Vec::new()), &config);
        blob.write_all(&[5]).expect("write failed");
        blob.write_all(b"!!!\"!").expect("write failed");
        blob.write_all(&[1, b'z']).expect("write failed");
        let raw = blob.into_inner().into_inner();
        assert_ne!(&raw[1..6], b"!!!\"!");

        // VM side
        let mut source = KeyedStream::from_config(Cursor::new(raw), &config);
        source.seek(SeekFrom::Start(0)).expect("seek failed");
        let mut reader = BlobReader::new(source);
        let mut stack = OperandStack::from_config(&config);
        for _ in 0..2 {
            let offset = reader.read_offset_literal().expect("literal failed");
            stack.push(classify(Some(NativeValue::UInt32(offset)), None));
        }

        let top = stack.pop().expect("pop failed");
        assert_eq!(top.kind(), VariantKind::UInt32);
        assert_eq!(top.payload(), Some(&NativeValue::UInt32(0)));
        let next = stack.pop().expect("pop failed");
        assert_eq!(next.payload(), Some(&NativeValue::UInt32(85)));
        assert!(stack.is_empty());
    }
}
