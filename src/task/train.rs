//! Fitting a compiled model, and the checkpoint callback it can use.

use serde::{Deserialize, Serialize};

use crate::codegen::Import;
use crate::error::RenderError;
use crate::render::python::{call_multiline, kwarg, py_bool, py_float, py_list, py_opt, py_str};
use crate::render::Renderers;

use super::{check_path, TaskCode, TaskContext};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub model_input: String,
    pub x_train: String,
    pub y_train: String,
    #[serde(default)]
    pub x_validation: Option<String>,
    #[serde(default)]
    pub y_validation: Option<String>,
    #[serde(default)]
    pub callbacks: Vec<String>,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default = "one")]
    pub epochs: u32,
    #[serde(default = "two")]
    pub verbose: u8,
    #[serde(default)]
    pub validation_split: f64,
    #[serde(default = "yes")]
    pub shuffle: bool,
    /// Variable receiving the returned history object.
    #[serde(default)]
    pub history: Option<String>,
}

fn one() -> u32 {
    1
}

fn two() -> u8 {
    2
}

fn yes() -> bool {
    true
}

impl Default for Train {
    fn default() -> Self {
        Self {
            model_input: String::new(),
            x_train: String::new(),
            y_train: String::new(),
            x_validation: None,
            y_validation: None,
            callbacks: Vec::new(),
            batch_size: None,
            epochs: one(),
            verbose: two(),
            validation_split: 0.0,
            shuffle: yes(),
            history: None,
        }
    }
}

impl TaskCode for Train {
    fn imports(&self) -> Vec<Import> {
        Vec::new()
    }

    fn inputs(&self) -> Vec<&str> {
        let mut out = vec![
            self.model_input.as_str(),
            self.x_train.as_str(),
            self.y_train.as_str(),
        ];
        out.extend(self.x_validation.as_deref());
        out.extend(self.y_validation.as_deref());
        out.extend(self.callbacks.iter().map(String::as_str));
        out
    }

    fn outputs(&self) -> Vec<&str> {
        self.history.as_deref().into_iter().collect()
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        let mut out = Vec::new();
        if self.x_validation.is_some() != self.y_validation.is_some() {
            out.push(
                "validation inputs and validation targets must be given together".to_string(),
            );
        }
        if self.epochs == 0 {
            out.push("epochs must be at least 1".to_string());
        }
        if self.verbose > 2 {
            out.push(format!("verbose must be 0, 1, or 2, got {}", self.verbose));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            out.push(format!(
                "validation_split must be in [0, 1), got {}",
                self.validation_split
            ));
        }
        if self.batch_size == Some(0) {
            out.push("batch_size must be positive".to_string());
        }
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let validation = match (&self.x_validation, &self.y_validation) {
            (Some(x), Some(y)) => format!("({}, {})", x, y),
            _ => "None".to_string(),
        };
        let fit = call_multiline(
            &format!("{}.fit", self.model_input),
            &[
                self.x_train.clone(),
                self.y_train.clone(),
                kwarg("batch_size", py_opt(self.batch_size)),
                kwarg("epochs", self.epochs.to_string()),
                kwarg("verbose", self.verbose.to_string()),
                kwarg("callbacks", py_list(&self.callbacks)),
                kwarg("validation_split", py_float(self.validation_split)),
                kwarg("validation_data", validation),
                kwarg("shuffle", py_bool(self.shuffle)),
            ],
        );
        Ok(match &self.history {
            Some(h) => format!("{} = {}", h, fit),
            None => fit,
        })
    }
}

/// Saves the model (or its weights) during training.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointCallback {
    pub path: String,
    pub output: String,
    #[serde(default = "val_loss")]
    pub monitor: String,
    #[serde(default)]
    pub save_best_only: bool,
    #[serde(default)]
    pub save_weights_only: bool,
}

fn val_loss() -> String {
    "val_loss".to_string()
}

impl Default for CheckpointCallback {
    fn default() -> Self {
        Self {
            path: String::new(),
            output: String::new(),
            monitor: val_loss(),
            save_best_only: false,
            save_weights_only: false,
        }
    }
}

impl TaskCode for CheckpointCallback {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow(), Import::module("os")]
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.output.as_str()]
    }

    fn check(&self, renderers: &Renderers) -> Vec<String> {
        let mut out = Vec::new();
        check_path(renderers, "checkpoint path", &self.path, &mut out);
        if self.monitor.trim().is_empty() {
            out.push("checkpoint monitor must not be blank".to_string());
        }
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let path = py_str(&self.path);
        let callback = call_multiline(
            "tf.keras.callbacks.ModelCheckpoint",
            &[
                path.clone(),
                kwarg("monitor", py_str(&self.monitor)),
                kwarg("save_best_only", py_bool(self.save_best_only)),
                kwarg("save_weights_only", py_bool(self.save_weights_only)),
            ],
        );
        Ok(format!(
            "os.makedirs(os.path.dirname({}) or \".\", exist_ok=True)\n{} = {}",
            path, self.output, callback
        ))
    }
}
