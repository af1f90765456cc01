use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use opvm_core::stream::{keystream_byte, KeyedStream};

#[test]
fn round_trip_with_same_key() {
    let message: Vec<u8> = (0u8..=255).cycle().take(700).collect();

    let mut writer = KeyedStream::new(Cursor::new(Vec::new()), 0x9E);
    writer.write_all(&message).expect("write failed");
    writer.flush().expect("flush failed");
    let stored = writer.into_inner().into_inner();
    assert_ne!(stored, message);

    let mut reader = KeyedStream::new(Cursor::new(stored), 0x9E);
    let mut decoded = vec![0u8; message.len()];
    reader.read_exact(&mut decoded).expect("read failed");
    assert_eq!(decoded, message);
}

#[test]
fn different_key_does_not_decode() {
    let mut writer = KeyedStream::new(Cursor::new(Vec::new()), 1);
    writer.write_all(b"operand").expect("write failed");
    let stored = writer.into_inner().into_inner();

    let mut reader = KeyedStream::new(Cursor::new(stored), 2);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).expect("read failed");
    assert_ne!(out, b"operand");
}

// Data written at position P only decodes when read back from P.
#[test]
fn position_must_match_between_writer_and_reader() {
    let mut backing = Cursor::new(vec![0u8; 32]);
    {
        let mut writer = KeyedStream::new(&mut backing, 0x33);
        writer.seek(SeekFrom::Start(10)).expect("seek failed");
        writer.write_all(b"offset").expect("write failed");
        assert_eq!(writer.stream_position().expect("position failed"), 16);
    }

    {
        let mut reader = KeyedStream::new(&mut backing, 0x33);
        reader.seek(SeekFrom::Start(10)).expect("seek failed");
        let mut aligned = [0u8; 6];
        reader.read_exact(&mut aligned).expect("read failed");
        assert_eq!(&aligned, b"offset");
    }

    let shifted = backing.get_ref()[10..16].to_vec();
    let mut wrong_origin = KeyedStream::new(Cursor::new(shifted), 0x33);
    let mut misaligned = [0u8; 6];
    wrong_origin.read_exact(&mut misaligned).expect("read failed");
    assert_ne!(&misaligned, b"offset");
}

#[test]
fn untouched_bytes_are_not_disturbed() {
    let mut backing = Cursor::new(vec![0xAAu8; 8]);
    {
        let mut codec = KeyedStream::new(&mut backing, 0);
        codec.seek(SeekFrom::Start(4)).expect("seek failed");
        codec.write_all(&[1]).expect("write failed");
    }
    let raw = backing.into_inner();
    assert_eq!(&raw[..4], &[0xAA; 4]);
    assert_eq!(raw[4], 1 ^ keystream_byte(0, 4));
    assert_eq!(&raw[5..], &[0xAA; 3]);
}

struct FailingStream;

impl Read for FailingStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "device timeout"))
    }
}

impl Seek for FailingStream {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

#[test]
fn underlying_failures_propagate_unchanged() {
    let mut codec = KeyedStream::new(FailingStream, 5);
    let mut buf = [0u8; 4];
    let err = codec.read(&mut buf).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert_eq!(err.to_string(), "device timeout");
}
