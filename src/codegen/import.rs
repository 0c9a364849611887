//! Python import statements.

use std::fmt;

/// One of the four import forms. Two imports are the same import exactly
/// when they render to the same text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Import {
    /// `import module`
    Module { module: String },
    /// `from module import item`
    Item { module: String, item: String },
    /// `import module as alias`
    ModuleAs { module: String, alias: String },
    /// `from module import item as alias`
    ItemAs {
        module: String,
        item: String,
        alias: String,
    },
}

impl Import {
    pub fn module(module: &str) -> Self {
        Import::Module {
            module: module.to_string(),
        }
    }

    pub fn item(module: &str, item: &str) -> Self {
        Import::Item {
            module: module.to_string(),
            item: item.to_string(),
        }
    }

    pub fn module_as(module: &str, alias: &str) -> Self {
        Import::ModuleAs {
            module: module.to_string(),
            alias: alias.to_string(),
        }
    }

    pub fn item_as(module: &str, item: &str, alias: &str) -> Self {
        Import::ItemAs {
            module: module.to_string(),
            item: item.to_string(),
            alias: alias.to_string(),
        }
    }

    /// `import tensorflow as tf`, which nearly every task needs.
    pub fn tensorflow() -> Self {
        Self::module_as("tensorflow", "tf")
    }

    /// Parse one import line.
    pub fn parse(text: &str) -> Result<Import, String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        match words.as_slice() {
            ["import", m] if is_dotted_name(m) => Ok(Import::module(m)),
            ["import", m, "as", a] if is_dotted_name(m) && is_name(a) => Ok(Import::module_as(m, a)),
            ["from", m, "import", i] if is_dotted_name(m) && is_name(i) => Ok(Import::item(m, i)),
            ["from", m, "import", i, "as", a] if is_dotted_name(m) && is_name(i) && is_name(a) => {
                Ok(Import::item_as(m, i, a))
            }
            _ => Err(format!("'{}' is not a recognized import statement", text.trim())),
        }
    }

    /// The import form, used in debug comments.
    pub fn form(&self) -> &'static str {
        match self {
            Import::Module { .. } => "module",
            Import::Item { .. } => "item",
            Import::ModuleAs { .. } => "module alias",
            Import::ItemAs { .. } => "item alias",
        }
    }
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Import::Module { module } => write!(f, "import {}", module),
            Import::Item { module, item } => write!(f, "from {} import {}", module, item),
            Import::ModuleAs { module, alias } => write!(f, "import {} as {}", module, alias),
            Import::ItemAs {
                module,
                item,
                alias,
            } => write!(f, "from {} import {} as {}", module, item, alias),
        }
    }
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_dotted_name(s: &str) -> bool {
    s.split('.').all(is_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_four_forms() {
        assert_eq!(Import::parse("import os").unwrap(), Import::module("os"));
        assert_eq!(
            Import::parse("import tensorflow as tf").unwrap(),
            Import::tensorflow()
        );
        assert_eq!(
            Import::parse("from pathlib import Path").unwrap(),
            Import::item("pathlib", "Path")
        );
        assert_eq!(
            Import::parse("from  os.path   import join as pjoin").unwrap(),
            Import::item_as("os.path", "join", "pjoin")
        );
    }

    #[test]
    fn test_parse_rejects_other_text() {
        for bad in [
            "",
            "import",
            "from x import *",
            "import a, b",
            "print('hi')",
            "import 9lives",
            "import a..b",
        ] {
            assert!(Import::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_display_round_trips_text() {
        let text = "from os.path import join as pjoin";
        assert_eq!(Import::parse(text).unwrap().to_string(), text);
    }
}
