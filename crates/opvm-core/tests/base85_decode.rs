use opvm_core::encoding::{decode, decode_into, decode_words};
use opvm_core::OpvmError;

#[test]
fn zero_shorthand_and_all_zero_group_agree() {
    assert_eq!(decode("z").expect("decode failed"), vec![0, 0, 0, 0]);
    assert_eq!(decode("!!!!!").expect("decode failed"), vec![0, 0, 0, 0]);
}

#[test]
fn single_out_of_range_character_is_malformed() {
    for bad in ["v", "~", " ", "\n"] {
        assert!(
            matches!(decode(bad), Err(OpvmError::MalformedEncoding { offset: 0, .. })),
            "input {:?}",
            bad
        );
    }
}

#[test]
fn single_trailing_character_is_malformed() {
    assert!(matches!(
        decode("!"),
        Err(OpvmError::MalformedEncoding { offset: 1, .. })
    ));
    assert!(matches!(
        decode("9jqo^F"),
        Err(OpvmError::MalformedEncoding { offset: 6, .. })
    ));
}

#[test]
fn empty_input_decodes_to_nothing() {
    assert!(decode("").expect("decode failed").is_empty());
}

#[test]
fn multi_group_text() {
    let decoded = decode("9jqo^BlbD-BleB1DJ+*+F(f,q").expect("decode failed");
    assert_eq!(decoded, b"Man is distinguished");
}

#[test]
fn decode_into_appends() {
    let mut out = vec![0xEE];
    decode_into(b"9jqo^", &mut out).expect("decode failed");
    assert_eq!(out, [0xEE, b'M', b'a', b'n', b' ']);
}

#[test]
fn offsets_decode_as_words() {
    // 0x0000_0055 and 0x0100_0000
    assert_eq!(
        decode_words("!!!\"!!<<*\"").expect("decode failed"),
        vec![0x55, 0x0100_0000]
    );
}
