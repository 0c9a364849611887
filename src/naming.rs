//! Collision-free names for synthesized intermediates, and the validators
//! that decide whether a user-supplied name or path can appear in a script.

use std::cell::Cell;

/// Issues `var1`, `var2`, ... in order.
///
/// One allocator lives for exactly one generation pass, so two passes over
/// the same input produce the same names.
#[derive(Debug)]
pub struct NameAllocator {
    prefix: String,
    next: Cell<u32>,
}

impl Default for NameAllocator {
    fn default() -> Self {
        Self::new("var")
    }
}

impl NameAllocator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: Cell::new(1),
        }
    }

    /// Allocate the next unique name.
    pub fn allocate(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{}", self.prefix, n)
    }

    /// How many names have been handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next.get() - 1
    }

    /// Whether `name` has the shape of a name this allocator issues.
    pub fn owns(&self, name: &str) -> bool {
        match name.strip_prefix(self.prefix.as_str()) {
            Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

/// Decides whether a string may be used as a variable name in the script.
pub trait NameValidator {
    fn is_valid_name(&self, name: &str) -> bool;
}

/// Decides whether a string may be embedded as a file path literal.
pub trait PathValidator {
    fn is_valid_path(&self, path: &str) -> bool;
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// ASCII Python identifiers, excluding keywords and the lone underscore.
#[derive(Clone, Copy, Debug, Default)]
pub struct PythonNameValidator;

impl NameValidator for PythonNameValidator {
    fn is_valid_name(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return false,
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return false;
        }
        if name == "_" || PYTHON_KEYWORDS.contains(&name) {
            return false;
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

/// Accepts any path that can sit inside a double-quoted Python string
/// without escaping.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiteralPathValidator;

impl PathValidator for LiteralPathValidator {
    fn is_valid_path(&self, path: &str) -> bool {
        !path.trim().is_empty()
            && !path
                .chars()
                .any(|c| c == '\0' || c == '\n' || c == '\r' || c == '"' || c == '\\')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_sequential() {
        let names = NameAllocator::default();
        assert_eq!(names.allocate(), "var1");
        assert_eq!(names.allocate(), "var2");
        assert_eq!(names.allocate(), "var3");
        assert_eq!(names.allocated(), 3);
    }

    #[test]
    fn test_owns_generated_shape() {
        let names = NameAllocator::default();
        assert!(names.owns("var7"));
        assert!(!names.owns("var"));
        assert!(!names.owns("variance"));
        assert!(!names.owns("model1"));
    }

    #[test]
    fn test_fresh_allocators_repeat() {
        let a = NameAllocator::new("layer");
        let b = NameAllocator::new("layer");
        assert_eq!(a.allocate(), b.allocate());
    }

    #[test]
    fn test_python_names() {
        let v = PythonNameValidator;
        let cases = [
            ("a", true),
            ("A", true),
            ("a_", true),
            ("_a", true),
            ("a0", true),
            ("a-", false),
            ("a-b", false),
            ("-a", false),
            ("_", false),
            ("0", false),
            ("", false),
            ("*", false),
            ("<", false),
            ("!", false),
            ("lambda", false),
        ];
        for (name, valid) in cases {
            assert_eq!(v.is_valid_name(name), valid, "name {:?}", name);
        }
    }

    #[test]
    fn test_literal_paths() {
        let v = LiteralPathValidator;
        assert!(v.is_valid_path("models/base.h5"));
        assert!(v.is_valid_path("/tmp/out.h5"));
        assert!(!v.is_valid_path(""));
        assert!(!v.is_valid_path("   "));
        assert!(!v.is_valid_path("a\"b.h5"));
        assert!(!v.is_valid_path("a\nb.h5"));
    }
}
