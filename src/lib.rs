pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod layer;
pub mod naming;
pub mod outcome;
pub mod plan;
pub mod registry;
pub mod render;
pub mod span;
pub mod task;
pub mod training;

use std::path::Path;

use diagnostic::{render_diagnostics, Diagnostic};
use layer::Layer;
use naming::NameAllocator;
use outcome::{first_failure, Outcome};
use render::Renderers;
use span::Span;
use task::{ApplyGeneralDelta, ApplyLinearDelta, TaskCode, TaskContext};

pub use codegen::{GenerateOptions, ScriptGenerator};
pub use plan::Plan;

/// How a layer delta is expressed in the generated code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeltaStyle {
    /// One `tf.keras.Sequential` over the layers in order.
    #[default]
    Linear,
    /// Functional-API calls following each layer's declared inputs.
    General,
}

/// Generate a training script from a JSON plan.
pub fn generate(source: &str, filename: &str) -> Result<String, Vec<Diagnostic>> {
    generate_silent(source, filename).map_err(|errors| {
        render_diagnostics(&errors, filename, source);
        errors
    })
}

/// Validate a plan without rendering the script.
pub fn check(source: &str, filename: &str) -> Result<(), Vec<Diagnostic>> {
    check_silent(source, filename).map_err(|errors| {
        render_diagnostics(&errors, filename, source);
        errors
    })
}

/// Generate without rendering diagnostics to stderr.
pub fn generate_silent(source: &str, _filename: &str) -> Result<String, Vec<Diagnostic>> {
    load_generator(source)?.generate()
}

/// Validate without rendering diagnostics to stderr.
pub fn check_silent(source: &str, _filename: &str) -> Result<(), Vec<Diagnostic>> {
    load_generator(source)?.check()
}

/// Generate with `debug_comments` forced on, whatever the plan says.
pub fn generate_with_options(
    source: &str,
    filename: &str,
    options: GenerateOptions,
) -> Result<String, Vec<Diagnostic>> {
    let result = load_generator(source).and_then(|gen| {
        let merged = GenerateOptions {
            debug_comments: gen.options().debug_comments || options.debug_comments,
        };
        gen.with_options(merged).generate()
    });
    result.map_err(|errors| {
        render_diagnostics(&errors, filename, source);
        errors
    })
}

fn load_generator(source: &str) -> Outcome<ScriptGenerator> {
    let plan = plan::parse_plan(source).map_err(|e| vec![Diagnostic::from(e)])?;
    plan.into_generator(Renderers::keras())
}

// ─── Layer deltas ──────────────────────────────────────────────────

/// Read and parse a JSON array of layers, rendering diagnostics on failure.
pub fn load_layers(path: &Path) -> Result<Vec<Layer>, Vec<Diagnostic>> {
    let filename = path.display().to_string();
    let source = plan::read_source(path).map_err(|e| {
        let errors = vec![Diagnostic::from(e)];
        render_diagnostics(&errors, &filename, "");
        errors
    })?;
    plan::parse_layers(&source).map_err(|e| {
        let errors = vec![Diagnostic::from(e)];
        render_diagnostics(&errors, &filename, &source);
        errors
    })
}

/// Read two layer files, stopping at the first that fails.
pub fn load_layer_pair(old: &Path, new: &Path) -> Result<(Vec<Layer>, Vec<Layer>), Vec<Diagnostic>> {
    let mut loaded = first_failure([old, new].into_iter().map(load_layers))?;
    let new_layers = loaded.pop().unwrap_or_default();
    let old_layers = loaded.pop().unwrap_or_default();
    Ok((old_layers, new_layers))
}

/// Render the code that rebuilds `model_input` (built from `old`) into
/// `model_output` with the layers of `new`.
pub fn delta(
    old: &[Layer],
    new: &[Layer],
    style: DeltaStyle,
    model_input: &str,
    model_output: &str,
) -> Result<String, Vec<Diagnostic>> {
    let renderers = Renderers::keras();
    let names = NameAllocator::default();
    let cx = TaskContext {
        renderers: &renderers,
        names: &names,
    };

    let linear;
    let general;
    let code: &dyn TaskCode = match style {
        DeltaStyle::Linear => {
            linear = ApplyLinearDelta {
                model_input: model_input.to_string(),
                old_layers: old.to_vec(),
                new_layers: new.to_vec(),
                model_output: model_output.to_string(),
            };
            &linear
        }
        DeltaStyle::General => {
            general = ApplyGeneralDelta {
                model_input: model_input.to_string(),
                old_layers: old.to_vec(),
                new_layers: new.to_vec(),
                model_output: model_output.to_string(),
            };
            &general
        }
    };

    let problems = code.check(&renderers);
    if !problems.is_empty() {
        let diag = problems.into_iter().fold(
            Diagnostic::error("the layer delta cannot be rendered".to_string(), Span::dummy()),
            |d, p| d.with_note(p),
        );
        return Err(vec![diag]);
    }
    code.render(&cx).map_err(|e| vec![Diagnostic::from(e)])
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    const PIPELINE: &str = r#"{
  "variables": ["base_model", "model", "x_train", "y_train", "x_test", "y_test"],
  "tasks": [
    {"name": "load", "kind": "load_model", "path": "base.h5", "model_output": "base_model"},
    {
      "name": "rebuild",
      "kind": "apply_linear_delta",
      "model_input": "base_model",
      "model_output": "model",
      "old_layers": [{"name": "dense_1", "type": "dense", "units": 10}],
      "new_layers": [{"name": "dense_1", "type": "dense", "units": 10}]
    },
    {"name": "compile", "kind": "compile_model", "model_input": "model"},
    {"name": "data", "kind": "load_example_dataset"},
    {
      "name": "train",
      "kind": "train",
      "after": ["compile"],
      "model_input": "model",
      "x_train": "x_train",
      "y_train": "y_train"
    }
  ]
}"#;

    #[test]
    fn test_generate_pipeline() {
        let script = generate_silent(PIPELINE, "plan.json").unwrap();
        assert!(script.starts_with("import tensorflow as tf\n"));
        let load = script.find("tf.keras.models.load_model").unwrap();
        let compile = script.find("model.compile(").unwrap();
        let fit = script.find("model.fit(").unwrap();
        assert!(load < compile && compile < fit);
    }

    #[test]
    fn test_check_accepts_valid_plan() {
        assert!(check_silent(PIPELINE, "plan.json").is_ok());
    }

    #[test]
    fn test_debug_comments_forced_on() {
        let script =
            generate_with_options(PIPELINE, "plan.json", GenerateOptions { debug_comments: true })
                .unwrap();
        assert!(script.contains("# task: train\n"));
        assert!(script.contains("# import: module alias\nimport tensorflow as tf"));
    }

    #[test]
    fn test_plan_syntax_error() {
        let errors = generate_silent("{\"tasks\": [", "plan.json").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("invalid plan:"));
        assert!(!errors[0].span.is_dummy());
    }

    #[test]
    fn test_delta_linear() {
        let old = vec![Layer::new("a", layer::LayerKind::dense(4, layer::Activation::Relu))];
        let mut new = old.clone();
        new.push(Layer::new("b", layer::LayerKind::dense(2, layer::Activation::Softmax)));
        let code = delta(&old, &new, DeltaStyle::Linear, "base_model", "new_model").unwrap();
        assert!(code.starts_with("new_model = tf.keras.Sequential([\n    base_model.get_layer(\"a\"),\n"));
        assert!(code.ends_with("new_model.get_layer(\"b\").trainable = True"));
    }

    #[test]
    fn test_delta_general_requires_entry_point() {
        let layers = vec![Layer::new("a", layer::LayerKind::dense(4, layer::Activation::Relu))];
        let errors = delta(&layers, &layers, DeltaStyle::General, "m", "out").unwrap_err();
        assert!(errors[0]
            .notes
            .iter()
            .any(|n| n.contains("must be an input layer")));
    }

    #[test]
    fn test_load_layer_pair() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.json");
        let new = dir.path().join("new.json");
        std::fs::write(&old, r#"[{"name": "a", "type": "flatten"}]"#).unwrap();
        std::fs::write(&new, r#"[{"name": "a", "type": "flatten"}, {"name": "b", "type": "dense", "units": 3}]"#)
            .unwrap();
        let (old_layers, new_layers) = load_layer_pair(&old, &new).unwrap();
        assert_eq!(old_layers.len(), 1);
        assert_eq!(new_layers.len(), 2);
    }
}
