#![cfg(test)]
use crate::payload::{Arg, Function, Invocation};
use commonware_codec::Encode;

#[test]
fn buy_ticket_encoding_is_stable() {
    let invocation = Invocation::new(
        "CID",
        Function::BuyTicket,
        vec![
            Arg::U64(7),
            Arg::Address("GA".to_string()),
            Arg::I128(100),
            Arg::BytesN32([0xaa; 32]),
        ]
        .into(),
    )
    .expect("valid invocation");

    let expected = hex::decode(format!(
        "{}{}{}{}{}{}{}",
        "00000003434944", // contract id
        "0104",           // function, arg count
        "010000000000000007",
        "03000000024741",
        "0200000000000000000000000000000064",
        "05",
        "aa".repeat(32),
    ))
    .expect("valid hex");
    assert_eq!(invocation.encode().as_ref(), expected.as_slice());
}

#[test]
fn approve_encoding_is_stable() {
    let invocation = Invocation::new(
        "T",
        Function::Approve,
        vec![
            Arg::Address("A".to_string()),
            Arg::Address("S".to_string()),
            Arg::I128(-1),
            Arg::U32(2_000_000),
        ]
        .into(),
    )
    .expect("valid invocation");

    let expected = hex::decode(format!(
        "{}{}{}{}{}{}",
        "0000000154",
        "0004",
        "030000000141",
        "030000000153",
        "02ffffffffffffffffffffffffffffffff",
        "00001e8480",
    ))
    .expect("valid hex");
    assert_eq!(invocation.encode().as_ref(), expected.as_slice());
}
