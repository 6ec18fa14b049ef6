//! ABI decode command for decoding calldata and raw encoded values

use abicodec::{Abi, Decoder, Method, Type};

use super::{parse_hex, ToolResult};

/// Decode function calldata using a manual declaration or a known description
pub fn decode(
    calldata: &str,
    manual_signature: Option<&str>,
    known: &Abi,
    decoder: &Decoder,
) -> Result<ToolResult, String> {
    let data = parse_hex(calldata)?;
    if data.len() < 4 {
        return Err("Calldata too short: must be at least 4 bytes (8 hex chars)".to_string());
    }
    let selector_hex = format!("0x{}", hex::encode(&data[..4]));

    // Get the function - either from the manual override or the known description
    let parsed;
    let method = match manual_signature {
        Some(signature) => {
            parsed = Method::parse(signature).map_err(|e| e.to_string())?;
            &parsed
        }
        None => known.method_by_selector_hex(&selector_hex).ok_or_else(|| {
            format!(
                "Unknown selector {}. Use: decode {} --signature <function_sig>",
                selector_hex, calldata
            )
        })?,
    };

    let call = method
        .decode_call_with(decoder, &data)
        .map_err(|e| format!("Failed to decode parameters: {}", e))?;

    let mut result = ToolResult::new("ABI Decode")
        .add("signature", call.signature)
        .add("selector", selector_hex);
    for arg in call.arguments {
        result = result.add(format!("{} ({})", arg.name, arg.kind), arg.value);
    }
    Ok(result)
}

/// Decode raw encoded data as an instance of `signature`
pub fn decode_value(signature: &str, data: &str, decoder: &Decoder) -> Result<ToolResult, String> {
    let ty = Type::parse(signature).map_err(|e| e.to_string())?;
    let bytes = parse_hex(data)?;
    let value = decoder.decode(&ty, &bytes).map_err(|e| e.to_string())?;

    Ok(ToolResult::new("ABI Decode")
        .add("type", ty.format(true))
        .add("value", value.to_string()))
}

#[cfg(test)]
mod tests {
    use abicodec::DecodeLimits;

    use super::*;

    const TRANSFER: &str = "0xa9059cbb000000000000000000000000742d35cc6634c0532925a3b844bc9e7595f0beb000000000000000000000000000000000000000000000000000000000000f4240";

    fn known() -> Abi {
        Abi::from_human_readable(&["function transfer(address to, uint256 amount)"]).unwrap()
    }

    #[test]
    fn test_decode_known_selector() {
        let result = decode(TRANSFER, None, &known(), &Decoder::default()).unwrap();
        assert_eq!(result.get("signature"), Some("transfer(address,uint256)"));
        assert_eq!(result.get("amount (uint256)"), Some("1000000"));
        assert!(result
            .get("to (address)")
            .unwrap()
            .eq_ignore_ascii_case("0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0"));
    }

    #[test]
    fn test_decode_manual_signature() {
        let result = decode(
            TRANSFER,
            Some("transfer(address,uint256)"),
            &Abi::new(),
            &Decoder::default(),
        )
        .unwrap();
        assert_eq!(result.get("arg1 (uint256)"), Some("1000000"));
    }

    #[test]
    fn test_unknown_selector() {
        let err = decode("0xdeadbeef", None, &known(), &Decoder::default()).unwrap_err();
        assert!(err.contains("Unknown selector 0xdeadbeef"));

        let err = decode("0xdead", None, &known(), &Decoder::default()).unwrap_err();
        assert!(err.contains("too short"));
    }

    #[test]
    fn test_decode_value_respects_limits() {
        let data = format!("0x{:064x}{:064x}", 0x20, 1u64 << 40);
        let lenient = Decoder::default();
        let err = decode_value("uint8[]", &data, &lenient).unwrap_err();
        assert!(err.contains("out of bounds"), "{}", err);

        let strict = Decoder::new(DecodeLimits { max_offset_bits: 16 });
        let err = decode_value("uint8[]", &data, &strict).unwrap_err();
        assert!(err.contains("out of bounds"), "{}", err);

        let ok = decode_value("uint8[]", &format!("0x{:064x}{:064x}{:064x}", 0x20, 1, 7), &lenient)
            .unwrap();
        assert_eq!(ok.get("value"), Some("[7]"));
    }
}
