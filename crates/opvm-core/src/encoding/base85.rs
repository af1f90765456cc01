//! Base-85 Decoder
//!
//! Decodes the printable base-85 form used for offsets embedded in protected
//! artifacts. Five characters `'!'..='u'` carry one big-endian 32-bit word;
//! a lone `'z'` at a group boundary stands for four zero bytes. A short final
//! group of n characters (2 to 4) is padded with `'u'` and yields n-1 bytes.

use crate::error::{OpvmError, OpvmResult};

const FIRST_DIGIT: u8 = b'!';
const LAST_DIGIT: u8 = b'u';
const ZERO_WORD: u8 = b'z';
const GROUP_LEN: usize = 5;
const MAX_DIGIT: u8 = LAST_DIGIT - FIRST_DIGIT;

/// Positional weights 85^4 .. 85^0
const WEIGHTS: [u32; GROUP_LEN] = [52_200_625, 614_125, 7_225, 85, 1];

/// Decode a base-85 string into bytes
pub fn decode(input: &str) -> OpvmResult<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / GROUP_LEN * 4 + 4);
    decode_into(input.as_bytes(), &mut out)?;
    Ok(out)
}

/// Decode `input`, appending to `out`. On failure `out` may hold the groups
/// decoded before the bad character.
pub fn decode_into(input: &[u8], out: &mut Vec<u8>) -> OpvmResult<()> {
    let mut acc: u32 = 0;
    let mut group = 0usize;

    for (offset, &c) in input.iter().enumerate() {
        if c == ZERO_WORD && group == 0 {
            out.extend_from_slice(&[0u8; 4]);
            continue;
        }
        if !(FIRST_DIGIT..=LAST_DIGIT).contains(&c) {
            return Err(OpvmError::malformed(offset, "character outside '!'..'u'"));
        }
        acc = fold(acc, group, c - FIRST_DIGIT)
            .ok_or_else(|| OpvmError::malformed(offset, "group value exceeds 32 bits"))?;
        group += 1;
        if group == GROUP_LEN {
            out.extend_from_slice(&acc.to_be_bytes());
            acc = 0;
            group = 0;
        }
    }

    match group {
        0 => Ok(()),
        1 => Err(OpvmError::malformed(
            input.len(),
            "final group of a single character",
        )),
        leftover => {
            for position in leftover..GROUP_LEN {
                acc = fold(acc, position, MAX_DIGIT).ok_or_else(|| {
                    OpvmError::malformed(input.len(), "group value exceeds 32 bits")
                })?;
            }
            // Only the bytes carried by real characters survive; one per
            // character beyond the first.
            out.extend_from_slice(&acc.to_be_bytes()[..leftover - 1]);
            Ok(())
        }
    }
}

/// Decode and reinterpret the output as big-endian 32-bit words
pub fn decode_words(input: &str) -> OpvmResult<Vec<u32>> {
    let bytes = decode(input)?;
    if bytes.len() % 4 != 0 {
        return Err(OpvmError::malformed(
            input.len(),
            "decoded length is not a whole number of words",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
        .collect())
}

fn fold(acc: u32, position: usize, digit: u8) -> Option<u32> {
    WEIGHTS[position]
        .checked_mul(digit as u32)
        .and_then(|term| acc.checked_add(term))
}
