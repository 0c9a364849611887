//! Dataset loading and preprocessing.

use serde::{Deserialize, Serialize};

use crate::codegen::Import;
use crate::error::RenderError;
use crate::render::python::{py_float, py_tuple};
use crate::render::Renderers;
use crate::training::ExampleDataset;

use super::{TaskCode, TaskContext};

/// Load one of the bundled example datasets into four variables.
///
/// The loader is wrapped in a generated function so a later task can swap
/// the source without touching the unpacking line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadExampleDataset {
    #[serde(default)]
    pub dataset: ExampleDataset,
    #[serde(default = "x_train")]
    pub x_train: String,
    #[serde(default = "y_train")]
    pub y_train: String,
    #[serde(default = "x_test")]
    pub x_test: String,
    #[serde(default = "y_test")]
    pub y_test: String,
}

fn x_train() -> String {
    "x_train".to_string()
}

fn y_train() -> String {
    "y_train".to_string()
}

fn x_test() -> String {
    "x_test".to_string()
}

fn y_test() -> String {
    "y_test".to_string()
}

impl Default for LoadExampleDataset {
    fn default() -> Self {
        Self {
            dataset: ExampleDataset::default(),
            x_train: x_train(),
            y_train: y_train(),
            x_test: x_test(),
            y_test: y_test(),
        }
    }
}

impl TaskCode for LoadExampleDataset {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        vec![
            self.x_train.as_str(),
            self.y_train.as_str(),
            self.x_test.as_str(),
            self.y_test.as_str(),
        ]
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        let mut outputs = self.outputs();
        outputs.sort_unstable();
        outputs
            .windows(2)
            .filter(|w| w[0] == w[1])
            .map(|w| format!("dataset output '{}' is used more than once", w[0]))
            .collect()
    }

    fn render(&self, cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let loader = cx.names.allocate();
        Ok(format!(
            "def {loader}():\n    return {body}\n\n\n({xtr}, {ytr}), ({xte}, {yte}) = {loader}()",
            loader = loader,
            body = cx.renderers.datasets.render_dataset(&self.dataset),
            xtr = self.x_train,
            ytr = self.y_train,
            xte = self.x_test,
            yte = self.y_test,
        ))
    }
}

/// `output = input.reshape(shape) / scale`, either part optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReshapeAndScale {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub shape: Option<Vec<i64>>,
    #[serde(default)]
    pub scale: Option<f64>,
}

impl TaskCode for ReshapeAndScale {
    fn imports(&self) -> Vec<Import> {
        Vec::new()
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.output.as_str()]
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(shape) = &self.shape {
            if shape.is_empty() {
                out.push("reshape target must have at least one dimension".to_string());
            }
            if shape.iter().filter(|&&d| d == -1).count() > 1 {
                out.push("reshape target may infer at most one dimension".to_string());
            }
            if shape.iter().any(|&d| d == 0 || d < -1) {
                out.push(format!("reshape target {:?} has an invalid dimension", shape));
            }
        }
        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale == 0.0 {
                out.push(format!("scale must be finite and non-zero, got {}", scale));
            }
        }
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let mut expr = self.input.clone();
        if let Some(shape) = &self.shape {
            let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
            expr = format!("{}.reshape({})", expr, py_tuple(&dims));
        }
        if let Some(scale) = self.scale {
            expr = format!("{} / {}", expr, py_float(scale));
        }
        Ok(format!("{} = {}", self.output, expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NameAllocator;

    #[test]
    fn test_dataset_loader_function() {
        let renderers = Renderers::keras();
        let names = NameAllocator::default();
        let cx = TaskContext {
            renderers: &renderers,
            names: &names,
        };
        let task = LoadExampleDataset::default();
        insta::assert_snapshot!(task.render(&cx).unwrap(), @r###"
        def var1():
            return tf.keras.datasets.mnist.load_data()


        (x_train, y_train), (x_test, y_test) = var1()
        "###);
    }

    #[test]
    fn test_duplicate_dataset_outputs() {
        let task = LoadExampleDataset {
            x_test: "x_train".to_string(),
            ..LoadExampleDataset::default()
        };
        assert_eq!(
            task.check(&Renderers::keras()),
            vec!["dataset output 'x_train' is used more than once".to_string()]
        );
    }

    #[test]
    fn test_reshape_and_scale() {
        let renderers = Renderers::keras();
        let names = NameAllocator::default();
        let cx = TaskContext {
            renderers: &renderers,
            names: &names,
        };
        let task = ReshapeAndScale {
            input: "x_train".to_string(),
            output: "x_train_scaled".to_string(),
            shape: Some(vec![-1, 28, 28, 1]),
            scale: Some(255.0),
        };
        assert_eq!(
            task.render(&cx).unwrap(),
            "x_train_scaled = x_train.reshape((-1, 28, 28, 1)) / 255.0"
        );
        let plain = ReshapeAndScale {
            shape: None,
            scale: None,
            ..task
        };
        assert_eq!(plain.render(&cx).unwrap(), "x_train_scaled = x_train");
    }

    #[test]
    fn test_reshape_checks() {
        let task = ReshapeAndScale {
            input: "a".to_string(),
            output: "b".to_string(),
            shape: Some(vec![-1, -1, 0]),
            scale: Some(0.0),
        };
        assert_eq!(task.check(&Renderers::keras()).len(), 3);
    }
}
