//! Human-readable declarations such as `function transfer(address to, uint256 amount) returns (bool)`

use super::{ErrorDef, Event, Method, StateMutability};
use crate::core::Type;
use crate::{Error, Result};

/// One parsed declaration line
#[derive(Debug, Clone)]
pub(super) enum Declaration {
    Function(Method),
    Constructor(Method),
    Event(Event),
    Error(ErrorDef),
}

/// Parse a full declaration line, keyword included
pub(super) fn parse_declaration(line: &str) -> Result<Declaration> {
    let trimmed = line.trim().trim_end_matches(';');
    let (keyword, body) = trimmed
        .split_once(|c: char| c.is_whitespace() || c == '(')
        .map(|(keyword, _)| (keyword, &trimmed[keyword.len()..]))
        .unwrap_or((trimmed, ""));

    match keyword {
        "function" => parse_method(body, line).map(Declaration::Function),
        "constructor" => {
            let (args, rest) = split_args(body, line)?;
            let mut method = Method::new("constructor", args, Type::tuple(vec![]));
            method.state_mutability = modifiers(rest, line)?.0;
            Ok(Declaration::Constructor(method))
        }
        "event" => parse_event(body, line).map(Declaration::Event),
        "error" => {
            let (name, body) = split_name(body, line)?;
            let (args, rest) = split_args(body, line)?;
            if !rest.trim().is_empty() {
                return Err(Error::parse(line, format!("unexpected '{}'", rest.trim())));
            }
            Ok(Declaration::Error(ErrorDef::new(name, args)))
        }
        other => Err(Error::parse(line, format!("unknown declaration '{}'", other))),
    }
}

/// `name(args) [modifiers] [returns (args)]`
pub(super) fn parse_method(body: &str, line: &str) -> Result<Method> {
    let (name, body) = split_name(body, line)?;
    let (inputs, rest) = split_args(body, line)?;
    let (state_mutability, outputs) = modifiers(rest, line)?;

    let mut method = Method::new(name, inputs, outputs.unwrap_or_else(|| Type::tuple(vec![])));
    method.state_mutability = state_mutability;
    Ok(method)
}

/// `Name(args) [anonymous]`
pub(super) fn parse_event(body: &str, line: &str) -> Result<Event> {
    let (name, body) = split_name(body, line)?;
    let (inputs, rest) = split_args(body, line)?;

    let mut event = Event::new(name, inputs);
    match rest.trim() {
        "" => {}
        "anonymous" => event.anonymous = true,
        other => return Err(Error::parse(line, format!("unexpected '{}'", other))),
    }
    Ok(event)
}

fn split_name<'a>(body: &'a str, line: &str) -> Result<(&'a str, &'a str)> {
    let body = body.trim_start();
    let open = body
        .find('(')
        .ok_or_else(|| Error::parse(line, "missing argument list"))?;
    let name = body[..open].trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if !valid {
        return Err(Error::parse(line, format!("invalid name '{}'", name)));
    }
    Ok((name, &body[open..]))
}

/// Split a leading parenthesized argument list off `body` and parse it as a tuple
fn split_args<'a>(body: &'a str, line: &str) -> Result<(Type, &'a str)> {
    let body = body.trim_start();
    if !body.starts_with('(') {
        return Err(Error::parse(line, "missing argument list"));
    }

    let mut depth = 0usize;
    for (index, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let args = Type::parse(&body[..=index])?;
                    return Ok((args, &body[index + 1..]));
                }
            }
            _ => {}
        }
    }
    Err(Error::parse(line, "unbalanced parentheses"))
}

/// Visibility, mutability and an optional `returns (...)` clause
fn modifiers(mut rest: &str, line: &str) -> Result<(StateMutability, Option<Type>)> {
    let mut state_mutability = StateMutability::default();
    let mut outputs = None;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok((state_mutability, outputs));
        }

        let end = rest
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(rest.len());
        let word = &rest[..end];
        rest = &rest[end..];

        match word {
            "returns" => {
                if outputs.is_some() {
                    return Err(Error::parse(line, "duplicate returns clause"));
                }
                let (args, remaining) = split_args(rest, line)?;
                outputs = Some(args);
                rest = remaining;
            }
            "external" | "public" | "internal" | "private" | "virtual" | "override" => {}
            other => {
                state_mutability = StateMutability::from_keyword(other)
                    .ok_or_else(|| Error::parse(line, format!("unexpected modifier '{}'", other)))?;
            }
        }
    }
}
