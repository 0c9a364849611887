//! Typed errors for graph construction, rendering, and registries.
//!
//! Every error converts into a [`Diagnostic`] so callers only ever see one
//! error channel: `Vec<Diagnostic>`.

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::span::Span;

/// Structural failure while building a layer graph or a code graph.
///
/// Always fatal to the construction call that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} '{name}' declares itself as an input")]
    SelfReference { kind: &'static str, name: String },

    #[error("{kind} '{name}' references unknown {kind} '{missing}'")]
    UnresolvedReference {
        kind: &'static str,
        name: String,
        missing: String,
    },

    #[error("circular dependency detected involving {kind} '{name}'")]
    Cycle { kind: &'static str, name: String },

    #[error("the following {kind}s are not reachable: {}", .unreachable.join(", "))]
    Island {
        kind: &'static str,
        unreachable: Vec<String>,
    },

    #[error("more than one {kind} has no inputs: {}", .names.join(", "))]
    MultipleEntryPoints {
        kind: &'static str,
        names: Vec<String>,
    },

    #[error("variable '{variable}' is produced by both '{first}' and '{second}'")]
    MultipleProducers {
        variable: String,
        first: String,
        second: String,
    },
}

impl From<GraphError> for Diagnostic {
    fn from(err: GraphError) -> Self {
        let help = match &err {
            GraphError::DuplicateName { .. } => Some("names must be unique within one graph"),
            GraphError::Cycle { .. } => Some("remove one of the dependencies forming the cycle"),
            GraphError::Island { .. } => {
                Some("connect every node through a dependency or a shared variable")
            }
            GraphError::MultipleProducers { .. } => {
                Some("a variable may be written by at most one task")
            }
            _ => None,
        };
        let diag = Diagnostic::error(err.to_string(), Span::dummy());
        match help {
            Some(h) => diag.with_help(h.to_string()),
            None => diag,
        }
    }
}

/// Failure while rendering otherwise-valid configuration.
///
/// Scoped to the task being rendered; aborts only that generation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("cannot construct an unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("cannot construct an unknown activation function '{0}'")]
    UnknownActivation(String),

    #[error("layer '{layer}' uses input '{input}' before it is emitted")]
    InputNotYetEmitted { layer: String, input: String },

    #[error("layer '{0}' does not declare its inputs")]
    MissingInputs(String),

    #[error("the first layer '{0}' is not an input layer")]
    MissingEntryPoint(String),

    #[error("cannot build a model with no layers")]
    EmptyModel,

    #[error("task '{task}' failed to render: {source}")]
    InTask {
        task: String,
        #[source]
        source: Box<RenderError>,
    },
}

impl RenderError {
    /// Attribute this error to the task that was rendering.
    pub fn in_task(self, task: &str) -> Self {
        RenderError::InTask {
            task: task.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<RenderError> for Diagnostic {
    fn from(err: RenderError) -> Self {
        Diagnostic::error(err.to_string(), Span::dummy())
    }
}

/// Failure while adding a member to a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a member named '{0}' already exists")]
    Duplicate(String),

    #[error("'{0}' is not a valid member name")]
    InvalidName(String),
}

impl From<RegistryError> for Diagnostic {
    fn from(err: RegistryError) -> Self {
        Diagnostic::error(err.to_string(), Span::dummy())
    }
}
