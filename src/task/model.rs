//! Loading, rebuilding, compiling, and saving models.

use serde::{Deserialize, Serialize};

use crate::codegen::Import;
use crate::error::RenderError;
use crate::layer::delta::{general_problems, linear_problems, render_general, render_linear};
use crate::layer::{compute_delta, Layer};
use crate::render::python::{call_multiline, kwarg, py_list, py_str};
use crate::render::Renderers;
use crate::training::{Loss, Optimizer};

use super::{check_path, TaskCode, TaskContext};

/// `model_output = tf.keras.models.load_model(path)`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadModel {
    pub path: String,
    pub model_output: String,
}

impl TaskCode for LoadModel {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.model_output.as_str()]
    }

    fn check(&self, renderers: &Renderers) -> Vec<String> {
        let mut out = Vec::new();
        check_path(renderers, "model path", &self.path, &mut out);
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        Ok(format!(
            "{} = tf.keras.models.load_model({})",
            self.model_output,
            py_str(&self.path)
        ))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveModel {
    pub model_input: String,
    pub path: String,
}

impl TaskCode for SaveModel {
    fn imports(&self) -> Vec<Import> {
        Vec::new()
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.model_input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn check(&self, renderers: &Renderers) -> Vec<String> {
        let mut out = Vec::new();
        check_path(renderers, "model path", &self.path, &mut out);
        out
    }

    fn render(&self, _cx: &TaskContext<'_>) -> Result<String, RenderError> {
        Ok(format!("{}.save({})", self.model_input, py_str(&self.path)))
    }
}

// ─── Delta application ─────────────────────────────────────────────

/// Rebuild a sequential model: copy matching layers from `model_input`,
/// create the rest, in `new_layers` order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyLinearDelta {
    pub model_input: String,
    pub old_layers: Vec<Layer>,
    pub new_layers: Vec<Layer>,
    pub model_output: String,
}

impl TaskCode for ApplyLinearDelta {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.model_input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.model_output.as_str()]
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        linear_problems(&self.old_layers, &self.new_layers)
    }

    fn render(&self, cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let ops = compute_delta(&self.old_layers, &self.new_layers);
        render_linear(
            &self.model_input,
            &ops,
            &self.model_output,
            cx.renderers.layers.as_ref(),
        )
    }
}

/// Rebuild a functional model whose layers declare their inputs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyGeneralDelta {
    pub model_input: String,
    pub old_layers: Vec<Layer>,
    pub new_layers: Vec<Layer>,
    pub model_output: String,
}

impl TaskCode for ApplyGeneralDelta {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.model_input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.model_output.as_str()]
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        general_problems(&self.old_layers, &self.new_layers)
    }

    fn render(&self, cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let ops = compute_delta(&self.old_layers, &self.new_layers);
        render_general(
            &self.model_input,
            &ops,
            &self.model_output,
            cx.renderers.layers.as_ref(),
            cx.names,
        )
    }
}

// ─── Compile ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompileModel {
    pub model_input: String,
    #[serde(default)]
    pub optimizer: Optimizer,
    #[serde(default)]
    pub loss: Loss,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
}

fn default_metrics() -> Vec<String> {
    vec!["accuracy".to_string()]
}

impl Default for CompileModel {
    fn default() -> Self {
        Self {
            model_input: String::new(),
            optimizer: Optimizer::default(),
            loss: Loss::default(),
            metrics: default_metrics(),
        }
    }
}

impl TaskCode for CompileModel {
    fn imports(&self) -> Vec<Import> {
        vec![Import::tensorflow()]
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.model_input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn check(&self, _renderers: &Renderers) -> Vec<String> {
        let mut out = self.optimizer.problems();
        if self.metrics.iter().any(|m| m.trim().is_empty()) {
            out.push("metric names must not be blank".to_string());
        }
        out
    }

    fn render(&self, cx: &TaskContext<'_>) -> Result<String, RenderError> {
        let metrics: Vec<String> = self.metrics.iter().map(|m| py_str(m)).collect();
        Ok(call_multiline(
            &format!("{}.compile", self.model_input),
            &[
                kwarg(
                    "optimizer",
                    cx.renderers.optimizers.render_optimizer(&self.optimizer),
                ),
                kwarg("loss", cx.renderers.losses.render_loss(&self.loss)),
                kwarg("metrics", py_list(&metrics)),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{Activation, LayerKind};
    use crate::naming::NameAllocator;

    fn render(code: &dyn TaskCode) -> Result<String, RenderError> {
        let renderers = Renderers::keras();
        let names = NameAllocator::default();
        code.render(&TaskContext {
            renderers: &renderers,
            names: &names,
        })
    }

    #[test]
    fn test_load_and_save() {
        let load = LoadModel {
            path: "models/base.h5".to_string(),
            model_output: "base_model".to_string(),
        };
        assert_eq!(
            render(&load).unwrap(),
            "base_model = tf.keras.models.load_model(\"models/base.h5\")"
        );
        let save = SaveModel {
            model_input: "new_model".to_string(),
            path: "out.h5".to_string(),
        };
        assert_eq!(render(&save).unwrap(), "new_model.save(\"out.h5\")");
    }

    #[test]
    fn test_bad_path_is_reported() {
        let load = LoadModel {
            path: " ".to_string(),
            model_output: "m".to_string(),
        };
        let problems = load.check(&Renderers::keras());
        assert_eq!(problems, vec!["model path ' ' is not a valid path".to_string()]);
    }

    #[test]
    fn test_compile() {
        let compile = CompileModel {
            model_input: "new_model".to_string(),
            ..CompileModel::default()
        };
        insta::assert_snapshot!(render(&compile).unwrap(), @r###"
        new_model.compile(
            optimizer=tf.keras.optimizers.Adam(0.001, 0.9, 0.999, 1e-7, False),
            loss=tf.keras.losses.sparse_categorical_crossentropy,
            metrics=["accuracy"]
        )
        "###);
    }

    #[test]
    fn test_linear_delta_check_reports_wiring() {
        let task = ApplyLinearDelta {
            model_input: "base".to_string(),
            old_layers: vec![],
            new_layers: vec![
                Layer::new("in", LayerKind::input(&[Some(3)])).entry(),
                Layer::new("d", LayerKind::dense(1, Activation::Relu)).with_inputs(&["in"]),
            ],
            model_output: "new".to_string(),
        };
        assert_eq!(task.check(&Renderers::keras()).len(), 2);
    }

    #[test]
    fn test_general_delta_render_uses_shared_allocator() {
        let layers = vec![
            Layer::new("in", LayerKind::input(&[Some(3)])).entry(),
            Layer::new("d", LayerKind::dense(1, Activation::Relu)).with_inputs(&["in"]),
        ];
        let task = ApplyGeneralDelta {
            model_input: "base".to_string(),
            old_layers: layers.clone(),
            new_layers: layers,
            model_output: "new".to_string(),
        };
        let renderers = Renderers::keras();
        let names = NameAllocator::default();
        names.allocate();
        let code = task
            .render(&TaskContext {
                renderers: &renderers,
                names: &names,
            })
            .unwrap();
        assert!(code.starts_with("var2 = base.input\nvar3 = base.get_layer(\"d\")(var2)"));
    }
}
