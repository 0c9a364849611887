//! Named data handles linking a producing task to its consumers.

use crate::error::RegistryError;
use crate::registry::{Member, Registry, Variant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
}

impl Member for Variable {
    fn name(&self) -> &str {
        &self.name
    }
}

/// The only variable variant: a bare name.
#[derive(Default)]
pub struct Plain;

impl Variant<Variable> for Plain {
    fn into_member(self, name: &str) -> Variable {
        Variable {
            name: name.to_string(),
        }
    }
}

impl Registry<Variable> {
    /// Declare a variable named `name`.
    pub fn declare(&mut self, name: &str) -> Result<&Variable, RegistryError> {
        self.create::<Plain, _>(name, |_| {})
    }
}
