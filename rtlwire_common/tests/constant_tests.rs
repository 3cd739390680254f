#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use rstest::rstest;
use rtlwire_common::{ErrorKind, Literal, checked_constant, decode_signed, encode_literal};

mod common;

#[rstest]
#[case(Literal::from("8'hFF"), None, 255, 8)]
#[case(Literal::from("4'd-3"), None, 13, 4)]
#[case(Literal::from("16'b1111_0000_1010_0101"), None, 0xF0A5, 16)]
#[case(Literal::from(5u32), None, 5, 3)]
#[case(Literal::from(5u32), Some(4), 5, 4)]
#[case(Literal::from(-2i32), Some(8), 254, 8)]
#[case(Literal::from(true), None, 1, 1)]
fn encodes_literals(
    #[case] literal: Literal,
    #[case] bitwidth: Option<usize>,
    #[case] magnitude: u128,
    #[case] width: usize,
) {
    let encoded = checked_constant(&literal, bitwidth).expect("literal should encode");
    assert_eq!(encoded.magnitude, magnitude);
    assert_eq!(encoded.bitwidth, width);
}

#[rstest]
#[case(Literal::from("8 hFF"), None, ErrorKind::Shape)]
#[case(Literal::from("8'sd1"), None, ErrorKind::Shape)]
#[case(Literal::from("8'd1"), Some(8), ErrorKind::Shape)]
#[case(Literal::from(false), Some(2), ErrorKind::Shape)]
#[case(Literal::from(3u8), Some(0), ErrorKind::Shape)]
#[case(Literal::from(16u8), Some(4), ErrorKind::Range)]
#[case(Literal::from(-9i8), Some(4), ErrorKind::Range)]
#[case(Literal::from(-1i8), None, ErrorKind::Range)]
#[case(Literal::from("3'd9"), None, ErrorKind::Range)]
fn rejects_literals(
    #[case] literal: Literal,
    #[case] bitwidth: Option<usize>,
    #[case] kind: ErrorKind,
) {
    assert_err_kind!(checked_constant(&literal, bitwidth), kind);
}

#[test]
fn encoder_alone_does_not_check_fit() {
    // fit is the caller's re-validation step
    let encoded = encode_literal(&Literal::from(300u32), Some(8)).unwrap();
    assert_eq!(encoded.magnitude, 300);
    assert_err_kind!(checked_constant(&Literal::from(300u32), Some(8)), ErrorKind::Range);
}

#[test]
fn negative_patterns_decode_back() {
    for width in 1..=16usize {
        let lo = -(1i64 << (width - 1));
        for value in lo..0 {
            let encoded = checked_constant(&Literal::from(value), Some(width)).unwrap();
            assert_eq!(encoded.magnitude, (i128::from(value) + (1i128 << width)) as u128);
            assert_eq!(decode_signed(encoded.magnitude, width), Some(i128::from(value)));
        }
    }
}
