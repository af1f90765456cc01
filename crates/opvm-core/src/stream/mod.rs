pub mod keyed;
pub mod length;
pub mod reader;

pub use keyed::{apply_keystream, keystream_byte, KeyedStream, KEYSTREAM_CONSTANT};
pub use length::StreamLength;
pub use reader::BlobReader;
