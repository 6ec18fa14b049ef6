//! Projecting decoded values onto caller records

use std::collections::BTreeMap;

use abicodec::{decode_into, encode, Error, Type, Value};
use alloy_primitives::{Address, FixedBytes, U256};

#[test]
fn test_decode_into_primitives() {
    let ty = Type::parse("uint64[]").unwrap();
    let data = encode(&ty, &Value::Array(vec![Value::from(1u8), Value::from(u64::MAX)])).unwrap();
    let values: Vec<u64> = decode_into(&ty, &data).unwrap();
    assert_eq!(values, vec![1, u64::MAX]);

    let narrow = decode_into::<Vec<u8>>(&ty, &data).unwrap_err();
    assert!(matches!(narrow, Error::Mapping(_)));
    assert!(narrow.to_string().contains("[1]"), "{}", narrow);
}

#[test]
fn test_decode_into_maps() {
    let ty = Type::parse("tuple(uint256 a, uint256 b)").unwrap();
    let data = encode(&ty, &Value::Array(vec![Value::from(1u8), Value::from(2u8)])).unwrap();
    let map: BTreeMap<String, U256> = decode_into(&ty, &data).unwrap();
    assert_eq!(map["b"], U256::from(2u32));
}

#[test]
fn test_decode_into_fixed_targets() {
    let ty = Type::parse("tuple(bytes32 id, address[2] pair)").unwrap();
    let value = Value::tuple([
        ("id", Value::FixedBytes(vec![0x11; 32])),
        (
            "pair",
            Value::Array(vec![
                Value::Address(Address::repeat_byte(1)),
                Value::Address(Address::repeat_byte(2)),
            ]),
        ),
    ]);
    let data = encode(&ty, &value).unwrap();

    let decoded: Value = decode_into(&ty, &data).unwrap();
    let id: FixedBytes<32> = abicodec::FromValue::from_value(decoded.get("id").unwrap()).unwrap();
    assert_eq!(id, FixedBytes::repeat_byte(0x11));
    let pair: [Address; 2] = abicodec::FromValue::from_value(decoded.get("pair").unwrap()).unwrap();
    assert_eq!(pair[1], Address::repeat_byte(2));
}
