pub mod base85;

pub use base85::{decode, decode_into, decode_words};
