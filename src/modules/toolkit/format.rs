//! Type signature normalization and layout summary

use abicodec::Type;

use super::ToolResult;

/// Parse a type signature and report its canonical forms and head size
pub fn format(signature: &str) -> Result<ToolResult, String> {
    let ty = Type::parse(signature).map_err(|e| e.to_string())?;

    let static_size = match ty.static_words() {
        Some(words) => format!("{} words", words),
        None => "dynamic".to_string(),
    };

    Ok(ToolResult::new("Type")
        .add("canonical", ty.format(true))
        .add("compact", ty.format(false))
        .add("selector form", ty.signature())
        .add("head", format!("{} words", ty.head_words()))
        .add("size", static_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summary() {
        let result = format("(uint a, bytes32[2] b)").unwrap();
        assert_eq!(result.get("canonical"), Some("tuple(uint256 a,bytes32[2] b)"));
        assert_eq!(result.get("compact"), Some("(uint a,bytes32[2] b)"));
        assert_eq!(result.get("selector form"), Some("(uint256,bytes32[2])"));
        assert_eq!(result.get("head"), Some("3 words"));
        assert_eq!(result.get("size"), Some("3 words"));

        let result = format("string[]").unwrap();
        assert_eq!(result.get("size"), Some("dynamic"));
        assert_eq!(result.get("head"), Some("1 words"));
    }
}
