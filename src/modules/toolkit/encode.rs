//! ABI encode command for encoding function calldata

use abicodec::{Method, Type, TypeKind, Value};
use alloy_primitives::{Address, I256, U256};

use super::{parse_hex, ToolResult};

/// Encode function call data from a declaration and textual arguments
pub fn encode(signature: &str, args: &[String]) -> Result<ToolResult, String> {
    let method = Method::parse(signature).map_err(|e| e.to_string())?;
    let calldata = encode_calldata(&method, args)?;

    Ok(ToolResult::new("ABI Encode")
        .add("signature", method.signature())
        .add("selector", method.selector_hex())
        .add("calldata", format!("0x{}", hex::encode(&calldata))))
}

/// Encode a single value of an arbitrary type, without a selector
pub fn encode_value(signature: &str, arg: &str) -> Result<ToolResult, String> {
    let ty = Type::parse(signature).map_err(|e| e.to_string())?;
    let value = parse_value(&ty, arg)?;
    let encoded = abicodec::encode(&ty, &value).map_err(|e| e.to_string())?;

    Ok(ToolResult::new("ABI Encode")
        .add("type", ty.format(true))
        .add("value", value.to_string())
        .add("encoded", format!("0x{}", hex::encode(encoded))))
}

fn encode_calldata(method: &Method, args: &[String]) -> Result<Vec<u8>, String> {
    let fields = method.inputs.fields();

    // Check argument count matches parameter count
    if args.len() != fields.len() {
        return Err(format!(
            "Argument count mismatch: expected {} arguments, got {}",
            fields.len(),
            args.len()
        ));
    }

    let values = fields
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (field, arg))| {
            parse_value(&field.ty, arg)
                .map_err(|e| format!("Failed to parse argument {} (type {}): {}", i + 1, field.ty, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    method
        .encode_call(&Value::Array(values))
        .map_err(|e| e.to_string())
}

/// Parse a single value according to its type
pub(crate) fn parse_value(ty: &Type, arg: &str) -> Result<Value, String> {
    let arg = arg.trim();
    match ty.kind() {
        TypeKind::Address => {
            let bytes = parse_hex(arg)?;
            if bytes.len() != 20 {
                return Err("Invalid address: expected 40 hex characters".to_string());
            }
            Ok(Value::Address(Address::from_slice(&bytes)))
        }

        TypeKind::Bool => {
            let value = match arg.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(format!("Invalid bool: expected true/false, got '{}'", arg)),
            };
            Ok(Value::Bool(value))
        }

        TypeKind::Int => {
            let value = if is_hex(arg) {
                I256::from_be_bytes(parse_hex_word(arg)?)
            } else {
                arg.parse::<I256>()
                    .map_err(|e| format!("Invalid integer: {}", e))?
            };
            Ok(Value::Int(value))
        }

        TypeKind::UInt => {
            let value = if is_hex(arg) {
                U256::from_be_bytes(parse_hex_word(arg)?)
            } else {
                arg.parse::<U256>()
                    .map_err(|e| format!("Invalid unsigned integer: {}", e))?
            };
            Ok(Value::Uint(value))
        }

        TypeKind::Bytes => Ok(Value::Bytes(parse_hex(arg)?)),

        TypeKind::FixedBytes => {
            let bytes = parse_hex(arg)?;
            let size = ty.byte_size().unwrap_or_default();
            if bytes.len() != size {
                return Err(format!(
                    "Invalid bytes length: expected {} bytes, got {}",
                    size,
                    bytes.len()
                ));
            }
            Ok(Value::FixedBytes(bytes))
        }

        TypeKind::Function => {
            let bytes = parse_hex(arg)?;
            let func: [u8; 24] = bytes
                .try_into()
                .map_err(|_| "Invalid function: expected 24 bytes (address + selector)".to_string())?;
            Ok(Value::Function(func))
        }

        TypeKind::String => {
            // Remove quotes if present
            let s = if arg.len() >= 2
                && ((arg.starts_with('"') && arg.ends_with('"'))
                    || (arg.starts_with('\'') && arg.ends_with('\'')))
            {
                &arg[1..arg.len() - 1]
            } else {
                arg
            };
            Ok(Value::String(s.to_string()))
        }

        TypeKind::Slice | TypeKind::Array => {
            let inner = arg
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| "Array must be enclosed in brackets: [val1,val2,...]".to_string())?;
            let elem = ty.elem().ok_or_else(|| format!("{} has no element type", ty))?;

            let elements = split_top_level(inner)?;
            if let Some(size) = ty.len() {
                if elements.len() != size {
                    return Err(format!(
                        "Fixed array size mismatch: expected {} elements, got {}",
                        size,
                        elements.len()
                    ));
                }
            }

            let values = elements
                .iter()
                .map(|elem_str| parse_value(elem, elem_str))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }

        TypeKind::Tuple => {
            let inner = arg
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| "Tuple must be enclosed in parentheses: (val1,val2,...)".to_string())?;

            let fields = ty.fields();
            let elements = split_top_level(inner)?;
            if elements.len() != fields.len() {
                return Err(format!(
                    "Tuple size mismatch: expected {} elements, got {}",
                    fields.len(),
                    elements.len()
                ));
            }

            let values = fields
                .iter()
                .zip(&elements)
                .map(|(field, elem_str)| parse_value(&field.ty, elem_str))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        }
    }
}

fn is_hex(arg: &str) -> bool {
    arg.starts_with("0x") || arg.starts_with("0X")
}

/// Parse a hex literal into a left-padded 32-byte word
fn parse_hex_word(arg: &str) -> Result<[u8; 32], String> {
    let bytes = parse_hex(arg)?;
    if bytes.len() > 32 {
        return Err(format!(
            "Hex value too large: expected max 32 bytes, got {}",
            bytes.len()
        ));
    }

    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// Split on commas that are not nested inside brackets, parentheses or quotes
fn split_top_level(input: &str) -> Result<Vec<&str>, String> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in input.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => {
                depth -= 1;
                if depth < 0 {
                    return Err(format!("Unbalanced '{}' in '{}'", c, input));
                }
            }
            (None, ',') if depth == 0 => {
                parts.push(input[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return Err(format!("Unterminated group in '{}'", input));
    }
    parts.push(input[start..].trim());
    Ok(parts)
}
