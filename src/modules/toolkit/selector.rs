//! Function selector and event topic calculation

use abicodec::{Event, Method};

use super::ToolResult;

/// Compute the selector of a function or the topic of an event declaration
pub fn selector(declaration: &str) -> Result<ToolResult, String> {
    let declaration = declaration.trim();
    if declaration.is_empty() {
        return Err("Usage: selector 'transfer(address,uint256)'".to_string());
    }

    if declaration.starts_with("event ") {
        let event = Event::parse(declaration).map_err(|e| e.to_string())?;
        return Ok(ToolResult::new("Event topic")
            .add("signature", event.signature())
            .add("topic", format!("0x{}", hex::encode(event.topic()))));
    }

    let method = Method::parse(declaration).map_err(|e| e.to_string())?;
    Ok(ToolResult::new("Selector")
        .add("signature", method.signature())
        .add("selector", method.selector_hex()))
}
