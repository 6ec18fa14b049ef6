//! Recursive-descent parser for type signatures and field descriptions

use super::{FieldDescription, Shape, TupleField, Type};
use crate::{Error, Result};

/// Deepest nesting of tuples and array suffixes a type may have
pub const MAX_DEPTH: usize = 128;

const TOO_DEEP: &str = "type nesting too deep";

/// Parse a complete type signature, rejecting trailing input
pub(super) fn parse(signature: &str) -> Result<Type> {
    parse_at(signature, 0)
}

fn parse_at(signature: &str, depth: usize) -> Result<Type> {
    let mut parser = Parser::new(signature);
    parser.depth = depth;
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error(format!("unexpected trailing input at offset {}", parser.pos)));
    }
    Ok(ty)
}

/// Build a type from a field description, recursing into its components
pub(super) fn from_description(field: &FieldDescription) -> Result<Type> {
    describe(field, 0)
}

fn describe(field: &FieldDescription, depth: usize) -> Result<Type> {
    let ty_str = field.ty.trim();
    if depth >= MAX_DEPTH {
        return Err(Error::parse(ty_str, TOO_DEEP));
    }

    let ty = match ty_str.strip_prefix("tuple") {
        // `tuple`, `tuple[]`, `tuple[2][]`: the shape comes from the components
        Some(suffix) if !suffix.trim_start().starts_with('(') => {
            let fields = field
                .components
                .iter()
                .map(|component| {
                    Ok(TupleField::new(component.name.clone(), describe(component, depth + 1)?)
                        .indexed(component.indexed))
                })
                .collect::<Result<Vec<_>>>()?;

            let mut parser = Parser::new(ty_str);
            parser.pos = "tuple".len();
            parser.depth = depth + 1;
            let ty = parser.parse_suffixes(Type::tuple(fields))?;
            parser.skip_ws();
            if !parser.at_end() {
                return Err(parser.error("malformed array suffix"));
            }
            ty
        }
        _ => {
            if !field.components.is_empty() {
                return Err(Error::parse(
                    ty_str,
                    format!(
                        "{} components given for a non-tuple type",
                        field.components.len()
                    ),
                ));
            }
            parse_at(ty_str, depth)?
        }
    };

    Ok(match &field.internal_type {
        Some(label) => ty.with_internal_type(label.clone()),
        None => ty,
    })
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::parse(self.src, reason)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$') {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    /// Enter one more level of nesting
    fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error(TOO_DEEP));
        }
        Ok(())
    }

    fn parse_type(&mut self) -> Result<Type> {
        self.descend()?;
        let ty = self.parse_nested_type();
        self.depth -= 1;
        ty
    }

    fn parse_nested_type(&mut self) -> Result<Type> {
        self.skip_ws();
        let base = if self.peek() == Some(b'(') {
            self.pos += 1;
            Type::tuple(self.parse_components()?)
        } else {
            let ident = self.ident();
            match ident {
                "" => return Err(self.error(format!("expected a type at offset {}", self.pos))),
                "tuple" => {
                    if !self.eat(b'(') {
                        return Err(self.error("tuple must be followed by its components"));
                    }
                    Type::tuple(self.parse_components()?)
                }
                other => self.base_type(other)?,
            }
        };
        self.parse_suffixes(base)
    }

    /// Components after an opening parenthesis, up to and including the closing one
    fn parse_components(&mut self) -> Result<Vec<TupleField>> {
        let mut fields = Vec::new();
        self.skip_ws();
        if self.eat(b')') {
            return Ok(fields);
        }

        loop {
            let ty = self.parse_type()?;
            let mut field = TupleField::new(String::new(), ty);

            loop {
                self.skip_ws();
                let word = self.ident();
                match word {
                    "" => break,
                    "indexed" => field.indexed = true,
                    // data locations are accepted in human-readable declarations
                    "memory" | "calldata" | "storage" => {}
                    name if field.name.is_empty() => field.name = name.to_string(),
                    name => {
                        return Err(self.error(format!("unexpected token '{}' after field name", name)))
                    }
                }
            }
            fields.push(field);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(fields);
                }
                Some(other) => {
                    return Err(self.error(format!("unexpected character '{}'", other as char)))
                }
                None => return Err(self.error("unbalanced parentheses")),
            }
        }
    }

    /// Zero or more `[]` / `[N]` suffixes
    fn parse_suffixes(&mut self, mut ty: Type) -> Result<Type> {
        let entry_depth = self.depth;
        loop {
            self.skip_ws();
            if !self.eat(b'[') {
                self.depth = entry_depth;
                return Ok(ty);
            }
            // each suffix wraps the type one level deeper
            self.descend()?;

            let start = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits = &self.src[start..self.pos];

            if !self.eat(b']') {
                return Err(self.error("malformed array suffix"));
            }

            ty = if digits.is_empty() {
                Type::slice(ty)
            } else {
                let len: usize = digits
                    .parse()
                    .map_err(|_| self.error(format!("array length '{}' is too large", digits)))?;
                if len == 0 {
                    return Err(self.error("fixed array length must be positive"));
                }
                Type::array(ty, len)
            };
        }
    }

    fn base_type(&self, ident: &str) -> Result<Type> {
        let ty = match ident {
            "bool" => Type::bool(),
            "address" => Type::address(),
            "string" => Type::string(),
            "bytes" => Type::bytes(),
            "function" => Type::function(),
            "int" => {
                let mut ty = Type::from_shape(Shape::Int(256));
                ty.bare = true;
                ty
            }
            "uint" => {
                let mut ty = Type::from_shape(Shape::UInt(256));
                ty.bare = true;
                ty
            }
            _ => {
                if let Some(bits) = ident.strip_prefix("uint") {
                    Type::uint(self.width(bits)?)?
                } else if let Some(bits) = ident.strip_prefix("int") {
                    Type::int(self.width(bits)?)?
                } else if let Some(size) = ident.strip_prefix("bytes") {
                    Type::fixed_bytes(self.width(size)?)?
                } else {
                    return Err(self.error(format!("unknown type '{}'", ident)));
                }
            }
        };
        Ok(ty)
    }

    fn width(&self, digits: &str) -> Result<usize> {
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(self.error(format!("invalid size '{}'", digits)));
        }
        digits
            .parse()
            .map_err(|_| self.error(format!("invalid size '{}'", digits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(ty: &str) -> FieldDescription {
        FieldDescription::new("", ty)
    }

    #[test]
    fn test_description_matches_signature() {
        for input in ["bool", "uint32", "int[]", "bytes[2]", "string[2][]", "address[]"] {
            let parsed = Type::parse(input).unwrap();
            let built = Type::from_description(&simple(input)).unwrap();
            assert_eq!(parsed, built, "input {}", input);
        }
    }

    #[test]
    fn test_description_tuples() {
        let field = FieldDescription::new("", "tuple[2]")
            .with_components(vec![FieldDescription::new("arg_0", "int64")]);
        let ty = Type::from_description(&field).unwrap();
        assert_eq!(ty, Type::parse("tuple(int64 arg_0)[2]").unwrap());

        let field = FieldDescription::new("", "tuple").with_components(vec![
            FieldDescription::new("arg0", "int32").indexed(true),
            FieldDescription::new("b_2", "tuple")
                .with_components(vec![FieldDescription::new("c", "int32")]),
        ]);
        let ty = Type::from_description(&field).unwrap();
        assert_eq!(
            ty,
            Type::parse("tuple(int32 indexed arg0,tuple(int32 c) b_2)").unwrap()
        );

        let field = FieldDescription::new("", "tuple");
        assert_eq!(Type::from_description(&field).unwrap(), Type::tuple(vec![]));
    }

    #[test]
    fn test_description_internal_types() {
        let field = FieldDescription::new("", "tuple").with_components(vec![
            FieldDescription::new("", "tuple[]")
                .with_components(vec![
                    FieldDescription::new("", "int32").with_internal_type("c")
                ])
                .with_internal_type("b"),
        ]);

        let ty = Type::from_description(&field).unwrap();
        let inner = &ty.fields()[0];
        assert_eq!(inner.internal_type(), Some("b"));

        let elem = inner.ty.elem().unwrap();
        assert_eq!(elem.fields()[0].internal_type(), Some("c"));
    }

    #[test]
    fn test_description_errors() {
        let field = FieldDescription::new("", "uint256")
            .with_components(vec![FieldDescription::new("a", "bool")]);
        assert!(matches!(
            Type::from_description(&field),
            Err(Error::Parse { .. })
        ));

        let field = FieldDescription::new("", "tuple[x]")
            .with_components(vec![FieldDescription::new("a", "bool")]);
        assert!(Type::from_description(&field).is_err());

        let field = FieldDescription::new("", "tuple")
            .with_components(vec![FieldDescription::new("a", "uint9")]);
        assert!(Type::from_description(&field).is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| {
            format!("{}uint8{}", "(".repeat(levels), ")".repeat(levels))
        };
        assert!(Type::parse(&nested(MAX_DEPTH - 1)).is_ok());

        let too_deep = [
            nested(5000),
            "(".repeat(200_000),
            format!("uint8{}", "[]".repeat(500_000)),
            format!("uint8{}", "[2]".repeat(MAX_DEPTH)),
        ];
        for input in &too_deep {
            let err = Type::parse(input).unwrap_err();
            assert!(
                matches!(&err, Error::Parse { reason, .. } if reason == "type nesting too deep"),
                "{:?}",
                err
            );
        }
        assert!(Type::parse(&format!("uint8{}", "[]".repeat(MAX_DEPTH - 1))).is_ok());
    }

    #[test]
    fn test_description_nesting_limit() {
        let mut field = FieldDescription::new("leaf", "uint8");
        for _ in 0..MAX_DEPTH + 1 {
            field = FieldDescription::new("", "tuple").with_components(vec![field]);
        }
        assert!(matches!(
            Type::from_description(&field),
            Err(Error::Parse { .. })
        ));

        let deep_suffix = FieldDescription::new("", format!("tuple{}", "[]".repeat(MAX_DEPTH)))
            .with_components(vec![FieldDescription::new("a", "bool")]);
        assert!(Type::from_description(&deep_suffix).is_err());
    }

    #[test]
    fn test_labelled_description_reparses_from_format() {
        let field = FieldDescription::new("", "tuple[]")
            .with_internal_type("struct PoolKey[]")
            .with_components(vec![
                FieldDescription::new("currency0", "address").with_internal_type("Currency"),
                FieldDescription::new("fee", "uint24").with_internal_type("uint24"),
            ]);
        let ty = Type::from_description(&field).unwrap();
        assert_eq!(ty.internal_type(), Some("struct PoolKey[]"));

        let reparsed = Type::parse(&ty.format(true)).unwrap();
        assert_eq!(reparsed, ty);
        assert_eq!(reparsed.internal_type(), None);
    }

    #[test]
    fn test_whitespace_and_locations() {
        let ty = Type::parse(" tuple( string memory name , uint256[] calldata ids ) ").unwrap();
        assert_eq!(ty.format(true), "tuple(string name,uint256[] ids)");
    }
}
