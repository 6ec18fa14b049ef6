//! Value -> bytes

use alloy_primitives::U256;
use tracing::trace;

use super::{words_for, Word, WORD_SIZE};
use crate::core::types::{Shape, FUNCTION_SIZE};
use crate::core::{Type, Value};
use crate::{Error, Result};

/// Encode `value` as an instance of `ty`
///
/// Call arguments are encoded by passing the argument tuple; callers prepend
/// a selector themselves when building calldata.
pub fn encode(ty: &Type, value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ty.head_words() * WORD_SIZE);
    encode_into(ty, value, &mut out)?;
    trace!(ty = %ty, bytes = out.len(), "encoded value");
    Ok(out)
}

fn encode_into(ty: &Type, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (&ty.shape, value) {
        (Shape::Bool, Value::Bool(b)) => {
            let mut word = [0u8; WORD_SIZE];
            word[WORD_SIZE - 1] = u8::from(*b);
            out.extend_from_slice(&word);
        }
        (Shape::Int(bits), value) => out.extend_from_slice(&signed_word(*bits, value)?),
        (Shape::UInt(bits), value) => out.extend_from_slice(&unsigned_word(*bits, value)?),
        (Shape::Address, Value::Address(addr)) => {
            let mut word = [0u8; WORD_SIZE];
            word[WORD_SIZE - addr.len()..].copy_from_slice(addr.as_slice());
            out.extend_from_slice(&word);
        }
        (Shape::FixedBytes(size), Value::FixedBytes(bytes) | Value::Bytes(bytes)) => {
            if bytes.len() != *size {
                return Err(Error::validation(format!(
                    "bytes{} expects {} bytes, got {}",
                    size,
                    size,
                    bytes.len()
                )));
            }
            let mut word = [0u8; WORD_SIZE];
            word[..bytes.len()].copy_from_slice(bytes);
            out.extend_from_slice(&word);
        }
        (Shape::Function, Value::Function(func)) => {
            let mut word = [0u8; WORD_SIZE];
            word[..FUNCTION_SIZE].copy_from_slice(func);
            out.extend_from_slice(&word);
        }
        (Shape::String, Value::String(s)) => encode_packed_bytes(s.as_bytes(), out),
        (Shape::Bytes, Value::Bytes(bytes)) => encode_packed_bytes(bytes, out),
        (Shape::Slice(elem), Value::Array(items)) => {
            out.extend_from_slice(&length_word(items.len()));
            let entries: Vec<(&Type, &Value)> = items.iter().map(|item| (&**elem, item)).collect();
            encode_sequence(&entries, out)?;
        }
        (Shape::Array(elem, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(Error::validation(format!(
                    "{} expects {} elements, got {}",
                    ty,
                    len,
                    items.len()
                )));
            }
            let entries: Vec<(&Type, &Value)> = items.iter().map(|item| (&**elem, item)).collect();
            encode_sequence(&entries, out)?;
        }
        (Shape::Tuple(fields), Value::Tuple(entries)) => {
            let items = fields
                .iter()
                .enumerate()
                .map(|(position, field)| {
                    let key = field.key(position);
                    entries
                        .get(&key)
                        .map(|value| (&field.ty, value))
                        .ok_or_else(|| Error::validation(format!("missing tuple field '{}'", key)))
                })
                .collect::<Result<Vec<_>>>()?;
            encode_sequence(&items, out)?;
        }
        (Shape::Tuple(fields), Value::Array(values)) => {
            if values.len() != fields.len() {
                return Err(Error::validation(format!(
                    "{} expects {} values, got {}",
                    ty,
                    fields.len(),
                    values.len()
                )));
            }
            let items: Vec<(&Type, &Value)> =
                fields.iter().map(|field| &field.ty).zip(values.iter()).collect();
            encode_sequence(&items, out)?;
        }
        (_, value) => {
            return Err(Error::validation(format!(
                "cannot encode {} value as {}",
                value.kind_name(),
                ty
            )))
        }
    }
    Ok(())
}

/// Head/tail layout of a sequence of items
///
/// Offsets are relative to the start of this sequence's head region, so
/// nested sequences start counting from zero again.
fn encode_sequence(items: &[(&Type, &Value)], out: &mut Vec<u8>) -> Result<()> {
    let head_size: usize = items.iter().map(|(ty, _)| ty.head_words() * WORD_SIZE).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (ty, value) in items {
        if ty.is_dynamic() {
            head.extend_from_slice(&length_word(head_size + tail.len()));
            encode_into(ty, value, &mut tail)?;
        } else {
            encode_into(ty, value, &mut head)?;
        }
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

/// Length word followed by the payload, zero-padded to a word boundary
fn encode_packed_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&length_word(bytes.len()));
    out.extend_from_slice(bytes);
    let padded = words_for(bytes.len()) * WORD_SIZE;
    out.resize(out.len() + padded - bytes.len(), 0);
}

fn length_word(len: usize) -> Word {
    U256::from(len as u64).to_be_bytes::<WORD_SIZE>()
}

/// Two's complement word for a signed integer of `bits` width
fn signed_word(bits: usize, value: &Value) -> Result<Word> {
    let word = match value {
        Value::Int(i) => i.to_be_bytes::<WORD_SIZE>(),
        Value::Uint(u) => {
            let word = u.to_be_bytes::<WORD_SIZE>();
            if word[0] & 0x80 != 0 {
                return Err(overflow(value, "int", bits));
            }
            word
        }
        other => {
            return Err(Error::validation(format!(
                "cannot encode {} value as int{}",
                other.kind_name(),
                bits
            )))
        }
    };

    let fill = if word[0] & 0x80 != 0 { 0xff } else { 0x00 };
    let pad = WORD_SIZE - bits / 8;
    let fits = word[..pad].iter().all(|b| *b == fill)
        && (pad == 0 || (word[pad] & 0x80) == (fill & 0x80));
    if !fits {
        return Err(overflow(value, "int", bits));
    }
    Ok(word)
}

/// Zero-extended word for an unsigned integer of `bits` width
fn unsigned_word(bits: usize, value: &Value) -> Result<Word> {
    let word = match value {
        Value::Uint(u) => u.to_be_bytes::<WORD_SIZE>(),
        Value::Int(i) if !i.is_negative() => i.to_be_bytes::<WORD_SIZE>(),
        Value::Int(_) => return Err(overflow(value, "uint", bits)),
        other => {
            return Err(Error::validation(format!(
                "cannot encode {} value as uint{}",
                other.kind_name(),
                bits
            )))
        }
    };

    let pad = WORD_SIZE - bits / 8;
    if word[..pad].iter().any(|b| *b != 0) {
        return Err(overflow(value, "uint", bits));
    }
    Ok(word)
}

fn overflow(value: &Value, prefix: &str, bits: usize) -> Error {
    Error::validation(format!("{} does not fit in {}{}", value, prefix, bits))
}
