//! Static word counts

use crate::core::types::Shape;
use crate::core::Type;

impl Type {
    /// Number of 32-byte words a static type occupies, `None` for dynamic types
    ///
    /// Computed once per node and memoized; concurrent first calls compute the
    /// same value and only one result is kept.
    pub fn static_words(&self) -> Option<usize> {
        *self.static_words.get_or_init(|| self.compute_static_words())
    }

    /// Words this type occupies in its parent's head region
    ///
    /// Dynamic types take a single offset slot.
    pub fn head_words(&self) -> usize {
        self.static_words().unwrap_or(1)
    }

    fn compute_static_words(&self) -> Option<usize> {
        match &self.shape {
            Shape::String | Shape::Bytes | Shape::Slice(_) => None,
            Shape::Array(elem, len) => elem.static_words().and_then(|words| words.checked_mul(*len)),
            Shape::Tuple(fields) => fields
                .iter()
                .try_fold(0usize, |total, field| total.checked_add(field.ty.static_words()?)),
            Shape::Bool
            | Shape::Int(_)
            | Shape::UInt(_)
            | Shape::FixedBytes(_)
            | Shape::Address
            | Shape::Function => Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use crate::core::Type;

    #[test]
    fn test_head_words() {
        // (signature, head words)
        let cases = [
            ("int32", 1),
            ("int32[]", 1),
            ("int32[2]", 2),
            ("int32[2][2]", 4),
            ("string", 1),
            ("string[]", 1),
            ("tuple(uint8 a, uint32 b)[1]", 2),
        ];

        for (input, words) in cases {
            let ty = Type::parse(input).unwrap();
            assert_eq!(ty.head_words(), words, "input {}", input);
        }
    }

    #[test]
    fn test_static_words() {
        assert_eq!(Type::parse("address").unwrap().static_words(), Some(1));
        assert_eq!(Type::parse("tuple(bool,bytes32[3])").unwrap().static_words(), Some(4));
        assert_eq!(Type::parse("tuple(bool,bytes)").unwrap().static_words(), None);
        assert_eq!(Type::parse("string[2]").unwrap().static_words(), None);
        assert_eq!(Type::parse("tuple()").unwrap().static_words(), Some(0));
    }

    #[test]
    fn test_static_words_stable_across_threads() {
        let ty = Arc::new(Type::parse("tuple(uint8,tuple(address,bytes4)[3])[2]").unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ty = Arc::clone(&ty);
                thread::spawn(move || ty.static_words())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(14));
        }
        assert_eq!(ty.static_words(), Some(14));
    }
}
