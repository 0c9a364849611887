//! Declarative plan files.
//!
//! A plan is a JSON document naming variables and tasks:
//!
//! ```json
//! {
//!   "variables": ["base_model"],
//!   "tasks": [
//!     {"name": "load", "kind": "load_model", "path": "m.h5", "model_output": "base_model"}
//!   ],
//!   "terminal": "load"
//! }
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codegen::{GenerateOptions, ScriptGenerator};
use crate::diagnostic::Diagnostic;
use crate::layer::Layer;
use crate::outcome::Outcome;
use crate::render::Renderers;
use crate::span::Span;
use crate::task::Task;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub variables: Vec<String>,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prelude: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default)]
    pub debug_comments: bool,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid plan: {message}")]
    Syntax { message: String, span: Span },
}

impl From<PlanError> for Diagnostic {
    fn from(err: PlanError) -> Self {
        let span = match &err {
            PlanError::Syntax { span, .. } => *span,
            PlanError::Io { .. } => Span::dummy(),
        };
        Diagnostic::error(err.to_string(), span)
    }
}

/// Parse a JSON document, locating syntax and schema errors in `source`.
pub fn parse_json<T: DeserializeOwned>(source: &str) -> Result<T, PlanError> {
    serde_json::from_str(source).map_err(|e| {
        let span = Span::at_line_column(source, e.line(), e.column());
        // serde_json appends " at line L column C"; the span carries that.
        let full = e.to_string();
        let message = match full.rfind(" at line ") {
            Some(cut) => full[..cut].to_string(),
            None => full,
        };
        PlanError::Syntax { message, span }
    })
}

pub fn parse_plan(source: &str) -> Result<Plan, PlanError> {
    parse_json(source)
}

/// A JSON array of layers, as consumed by the `delta` command.
pub fn parse_layers(source: &str) -> Result<Vec<Layer>, PlanError> {
    parse_json(source)
}

pub fn read_source(path: &Path) -> Result<String, PlanError> {
    std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl Plan {
    /// Populate a generator. Duplicate variable or task names are reported
    /// together.
    pub fn into_generator(self, renderers: Renderers) -> Outcome<ScriptGenerator> {
        let mut gen = ScriptGenerator::new(renderers).with_options(GenerateOptions {
            debug_comments: self.debug_comments,
        });
        let mut errors = Vec::new();

        for name in &self.variables {
            if let Err(e) = gen.variables.declare(name) {
                errors.push(Diagnostic::from(e).with_note(format!("in variable '{}'", name)));
            }
        }
        for task in self.tasks {
            let name = task.name.clone();
            if let Err(e) = gen.tasks.insert(task) {
                errors.push(Diagnostic::from(e).with_note(format!("in task '{}'", name)));
            }
        }
        if let Some(terminal) = &self.terminal {
            gen.set_terminal(terminal);
        }
        if let Some(prelude) = &self.prelude {
            gen.set_prelude(prelude);
        }
        for variable in &self.required {
            gen.require(variable);
        }

        if errors.is_empty() {
            Ok(gen)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
  "variables": ["base_model", "new_model"],
  "tasks": [
    {"name": "load", "kind": "load_model", "path": "base.h5", "model_output": "base_model"},
    {
      "name": "rebuild",
      "kind": "apply_linear_delta",
      "model_input": "base_model",
      "model_output": "new_model",
      "old_layers": [{"name": "d1", "type": "dense", "units": 10}],
      "new_layers": [
        {"name": "d1", "type": "dense", "units": 10, "trainable": false},
        {"name": "d2", "type": "dense", "units": 5, "activation": "softmax"}
      ]
    },
    {"name": "save", "kind": "save_model", "model_input": "new_model", "path": "out.h5"}
  ],
  "terminal": "save"
}"#;

    #[test]
    fn test_parse_plan() {
        let plan = parse_plan(PLAN).unwrap();
        assert_eq!(plan.variables.len(), 2);
        assert_eq!(plan.tasks.len(), 3);
        assert_eq!(plan.terminal.as_deref(), Some("save"));
        assert!(!plan.debug_comments);
    }

    #[test]
    fn test_plan_generates() {
        let gen = parse_plan(PLAN)
            .unwrap()
            .into_generator(Renderers::keras())
            .unwrap();
        let script = gen.generate().unwrap();
        assert!(script.starts_with("import tensorflow as tf\n\nbase_model = "));
        assert!(script.contains("new_model.get_layer(\"d1\").trainable = False"));
        assert!(script.contains("activation=tf.keras.activations.softmax"));
        assert!(script.ends_with("new_model.save(\"out.h5\")\n"));
    }

    #[test]
    fn test_syntax_error_has_span() {
        let source = "{\n  \"tasks\": [,]\n}";
        let err = parse_plan(source).unwrap_err();
        match err {
            PlanError::Syntax { span, ref message } => {
                assert!(!span.is_dummy());
                assert!(!message.contains(" at line "));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_task_kind() {
        let source = r#"{"tasks": [{"name": "x", "kind": "teleport"}]}"#;
        let err = parse_plan(source).unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_unknown_plan_field_rejected() {
        let source = r#"{"tasks": [], "terminus": "x"}"#;
        assert!(parse_plan(source).is_err());
    }

    #[test]
    fn test_duplicates_reported_together() {
        let source = r#"{
  "variables": ["a", "a"],
  "tasks": [
    {"name": "t", "kind": "barrier"},
    {"name": "t", "kind": "barrier"}
  ]
}"#;
        let errors = parse_plan(source)
            .unwrap()
            .into_generator(Renderers::keras())
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_parse_layers() {
        let layers =
            parse_layers(r#"[{"name": "in", "inputs": [], "type": "input", "shape": [4]}]"#)
                .unwrap();
        assert!(layers[0].is_entry_point());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }
}
