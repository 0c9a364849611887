//! Tasks that are not tied to a model: runtime switches, ordering-only
//! barriers, and hand-written code.

use serde::{Deserialize, Serialize};

use crate::codegen::Import;
use crate::error::RenderError;
use crate::render::Renderers;

use super::{TaskCode, TaskContext};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnableEagerExecution {}

impl TaskCode for EnableEagerExecution {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        Vec::new()
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        Ok("tf.compat.v1.enable_eager_execution()".to_string())
    }
}

/// Emits nothing; exists to join several tasks under one name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Barrier {}

impl TaskCode for Barrier {
    fn imports(&self) -> Vec<Import> {
        Vec::new()
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        Vec::new()
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        Ok(String::new())
    }
}

/// Verbatim code with declared imports and data flow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Custom {
    pub code: String,
    /// Import lines, e.g. `from pathlib import Path`.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl TaskCode for Custom {
    fn imports(&self) -> Vec<Import> {
        self.imports
            .iter()
            .filter_map(|line| Import::parse(line).ok())
            .collect()
    }

    fn inputs(&self) -> Vec<&str> {
        self.inputs.iter().map(String::as_str).collect()
    }

    fn outputs(&self) -> Vec<&str> {
        self.outputs.iter().map(String::as_str).collect()
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        let mut out: Vec<String> = self
            .imports
            .iter()
            .filter_map(|line| Import::parse(line).err())
            .collect();
        if self.code.trim().is_empty() {
            out.push("custom code must not be blank".to_string());
        }
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        Ok(self.code.trim_end().to_string())
    }
}
