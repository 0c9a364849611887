//! Ordered, name-keyed registry of heterogeneous members.
//!
//! Members are created through a factory keyed by the requested variant
//! type: `tasks.create::<Train>("train", |t| ...)` builds a default `Train`
//! payload, runs the configuration closure against it, and stores the
//! resulting member under its name. Iteration follows insertion order.

use std::collections::HashMap;

use crate::error::RegistryError;

/// Something that can be stored in a [`Registry`].
pub trait Member {
    fn name(&self) -> &str;
}

/// A variant payload that can be turned into a member of type `M`.
pub trait Variant<M: Member>: Default {
    fn into_member(self, name: &str) -> M;
}

/// Insertion-ordered name -> member map with a creating factory.
#[derive(Clone, Debug)]
pub struct Registry<M> {
    members: Vec<M>,
    index: HashMap<String, usize>,
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<M: Member> Registry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a member of variant `V` named `name`, configured by `configure`.
    pub fn create<V, F>(&mut self, name: &str, configure: F) -> Result<&M, RegistryError>
    where
        V: Variant<M>,
        F: FnOnce(&mut V),
    {
        if self.index.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let mut payload = V::default();
        configure(&mut payload);
        self.insert(payload.into_member(name))
    }

    /// Store an already-built member.
    pub fn insert(&mut self, member: M) -> Result<&M, RegistryError> {
        let name = member.name().to_string();
        if name.is_empty() {
            return Err(RegistryError::InvalidName(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        let slot = self.members.len();
        self.index.insert(name, slot);
        self.members.push(member);
        Ok(&self.members[slot])
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.members.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a, M: Member> IntoIterator for &'a Registry<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Shape {
        Circle { name: String, radius: u32 },
        Square { name: String, side: u32 },
    }

    impl Member for Shape {
        fn name(&self) -> &str {
            match self {
                Shape::Circle { name, .. } | Shape::Square { name, .. } => name,
            }
        }
    }

    #[derive(Default)]
    struct Circle {
        radius: u32,
    }

    #[derive(Default)]
    struct Square {
        side: u32,
    }

    impl Variant<Shape> for Circle {
        fn into_member(self, name: &str) -> Shape {
            Shape::Circle {
                name: name.to_string(),
                radius: self.radius,
            }
        }
    }

    impl Variant<Shape> for Square {
        fn into_member(self, name: &str) -> Shape {
            Shape::Square {
                name: name.to_string(),
                side: self.side,
            }
        }
    }

    #[test]
    fn test_create_runs_configuration() {
        let mut shapes: Registry<Shape> = Registry::new();
        let made = shapes.create::<Circle, _>("c", |c| c.radius = 3).unwrap();
        assert_eq!(
            made,
            &Shape::Circle {
                name: "c".to_string(),
                radius: 3
            }
        );
    }

    #[test]
    fn test_heterogeneous_members_keep_order() {
        let mut shapes: Registry<Shape> = Registry::new();
        shapes.create::<Square, _>("b", |s| s.side = 2).unwrap();
        shapes.create::<Circle, _>("a", |_| {}).unwrap();
        let names: Vec<&str> = shapes.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(matches!(shapes.get("b"), Some(Shape::Square { side: 2, .. })));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut shapes: Registry<Shape> = Registry::new();
        shapes.create::<Square, _>("s", |_| {}).unwrap();
        let err = shapes.create::<Circle, _>("s", |_| {}).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("s".to_string()));
        assert_eq!(shapes.len(), 1);
    }

    #[test]
    fn test_duplicate_check_runs_before_configuration() {
        let mut shapes: Registry<Shape> = Registry::new();
        shapes.create::<Square, _>("s", |_| {}).unwrap();
        let mut configured = false;
        let _ = shapes.create::<Circle, _>("s", |_| configured = true);
        assert!(!configured);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut shapes: Registry<Shape> = Registry::new();
        let err = shapes.create::<Circle, _>("", |_| {}).unwrap_err();
        assert_eq!(err, RegistryError::InvalidName(String::new()));
    }
}
