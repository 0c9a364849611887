//! Copy-or-create classification of a target model against a source model,
//! and the two renderers that turn the classification into model-building
//! code.
//!
//! A copied layer is fetched from the source model by name so its trained
//! weights survive; a created layer is constructed fresh from its
//! configuration.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::RenderError;
use crate::naming::NameAllocator;
use crate::render::python::{py_bool, py_list, py_str};
use crate::render::LayerRenderer;

use super::graph::build_layer_graph;
use super::{Activation, Layer, LayerKind};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerOperation<'a> {
    /// Reuse the source model's layer of the same name.
    Copy(&'a Layer),
    /// Construct the layer from its configuration.
    Create(&'a Layer),
}

impl<'a> LayerOperation<'a> {
    pub fn layer(&self) -> &'a Layer {
        match self {
            LayerOperation::Copy(l) | LayerOperation::Create(l) => l,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, LayerOperation::Copy(_))
    }
}

/// Classify every layer of `new`, in `new`'s order.
pub fn compute_delta<'a>(old: &[Layer], new: &'a [Layer]) -> Vec<LayerOperation<'a>> {
    let ops: Vec<LayerOperation<'a>> = new
        .iter()
        .map(|layer| {
            if old.iter().any(|o| o.same_structure(layer)) {
                LayerOperation::Copy(layer)
            } else {
                LayerOperation::Create(layer)
            }
        })
        .collect();
    debug!(
        copied = ops.iter().filter(|op| op.is_copy()).count(),
        created = ops.iter().filter(|op| !op.is_copy()).count(),
        "computed layer delta"
    );
    ops
}

// ─── Preconditions ─────────────────────────────────────────────────

/// Problems that keep `old` -> `new` from being rendered as a linear model.
pub fn linear_problems(old: &[Layer], new: &[Layer]) -> Vec<String> {
    let mut out = Vec::new();
    if new.is_empty() {
        out.push("the target model has no layers".to_string());
    }
    for (which, layers) in [("source", old), ("target", new)] {
        for layer in layers.iter().filter(|l| l.inputs.is_some()) {
            out.push(format!(
                "{} layer '{}' declares inputs, which a linear model cannot use",
                which, layer.name
            ));
        }
        if let Err(e) = build_layer_graph(layers) {
            out.push(format!("{} model: {}", which, e));
        }
    }
    out.extend(creation_problems(old, new));
    out
}

/// Problems that keep `old` -> `new` from being rendered as a general model.
pub fn general_problems(old: &[Layer], new: &[Layer]) -> Vec<String> {
    let mut out = Vec::new();
    if new.is_empty() {
        out.push("the target model has no layers".to_string());
    }
    for (which, layers) in [("source", old), ("target", new)] {
        let Some((first, rest)) = layers.split_first() else {
            continue;
        };
        if !first.is_entry_point() {
            out.push(format!(
                "the first {} layer '{}' must be an input layer",
                which, first.name
            ));
        }
        for layer in rest {
            if layer.is_entry_point() {
                out.push(format!(
                    "{} layer '{}' is an input layer but is not first",
                    which, layer.name
                ));
            } else if layer.inputs.as_ref().map_or(true, Vec::is_empty) {
                out.push(format!(
                    "{} layer '{}' must declare its inputs",
                    which, layer.name
                ));
            }
        }
        if let Err(e) = build_layer_graph(layers) {
            out.push(format!("{} model: {}", which, e));
        }
    }

    // Producers must come before their consumers in the target's order.
    let declared: HashSet<&str> = new.iter().map(|l| l.name.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(new.len());
    for layer in new {
        for input in layer.inputs.iter().flatten() {
            if declared.contains(input.as_str()) && !seen.contains(input.as_str()) {
                out.push(format!(
                    "target layer '{}' uses input '{}' before it is declared",
                    layer.name, input
                ));
            }
        }
        seen.insert(layer.name.as_str());
    }

    out.extend(creation_problems(old, new));
    out
}

/// Layers that would have to be constructed but have no known configuration.
fn creation_problems(old: &[Layer], new: &[Layer]) -> Vec<String> {
    compute_delta(old, new)
        .into_iter()
        .filter(|op| !op.is_copy())
        .filter_map(|op| {
            let layer = op.layer();
            let unknown_activation = match &layer.kind {
                LayerKind::Dense { activation, .. } | LayerKind::Conv2D { activation, .. } => {
                    matches!(activation, Activation::Unknown(_))
                }
                _ => false,
            };
            if matches!(layer.kind, LayerKind::Unknown) {
                Some(format!(
                    "layer '{}' is not in the source model and its type is unknown",
                    layer.name
                ))
            } else if unknown_activation {
                Some(format!(
                    "layer '{}' is not in the source model and its activation is unknown",
                    layer.name
                ))
            } else {
                None
            }
        })
        .collect()
}

// ─── Linear renderer ───────────────────────────────────────────────

/// Render `ops` as one `tf.keras.Sequential` call followed by one
/// trainable-flag statement per layer.
pub fn render_linear(
    model_input: &str,
    ops: &[LayerOperation<'_>],
    model_output: &str,
    layers: &dyn LayerRenderer,
) -> Result<String, RenderError> {
    if ops.is_empty() {
        return Err(RenderError::EmptyModel);
    }

    let mut items = Vec::with_capacity(ops.len());
    for op in ops {
        items.push(layer_expression(model_input, op, layers)?);
    }

    let construction = match items.as_slice() {
        [single] => format!("{} = tf.keras.Sequential([{}])", model_output, single),
        _ => {
            let body: Vec<String> = items.iter().map(|i| format!("    {}", i)).collect();
            format!(
                "{} = tf.keras.Sequential([\n{}\n])",
                model_output,
                body.join(",\n")
            )
        }
    };

    let mut lines = vec![construction];
    lines.extend(
        ops.iter()
            .map(|op| trainable_flag(model_output, op.layer())),
    );
    Ok(lines.join("\n"))
}

// ─── General renderer ──────────────────────────────────────────────

/// Render `ops` as functional-API calls, one fresh variable per layer,
/// closed by a `tf.keras.Model` over the first and last variables.
///
/// Producers must appear earlier in `ops` than their consumers.
pub fn render_general(
    model_input: &str,
    ops: &[LayerOperation<'_>],
    model_output: &str,
    layers: &dyn LayerRenderer,
    names: &NameAllocator,
) -> Result<String, RenderError> {
    let first = match ops.first() {
        Some(op) => op.layer(),
        None => return Err(RenderError::EmptyModel),
    };
    if !first.is_entry_point() {
        return Err(RenderError::MissingEntryPoint(first.name.clone()));
    }

    let mut emitted: HashMap<&str, String> = HashMap::with_capacity(ops.len());
    let mut lines = Vec::with_capacity(ops.len() * 2 + 1);
    let mut first_var = None;
    let mut last_var = String::new();

    for op in ops {
        let layer = op.layer();
        let var = names.allocate();

        let statement = if layer.is_entry_point() {
            match op {
                LayerOperation::Copy(_) => format!("{} = {}.input", var, model_input),
                LayerOperation::Create(_) => format!("{} = {}", var, layers.render_layer(layer)?),
            }
        } else {
            let inputs = match &layer.inputs {
                Some(inputs) if !inputs.is_empty() => inputs,
                _ => return Err(RenderError::MissingInputs(layer.name.clone())),
            };
            let mut upstream = Vec::with_capacity(inputs.len());
            for input in inputs {
                match emitted.get(input.as_str()) {
                    Some(v) => upstream.push(v.clone()),
                    None => {
                        return Err(RenderError::InputNotYetEmitted {
                            layer: layer.name.clone(),
                            input: input.clone(),
                        })
                    }
                }
            }
            let argument = match upstream.as_slice() {
                [single] => single.clone(),
                _ => py_list(&upstream),
            };
            format!(
                "{} = {}({})",
                var,
                layer_expression(model_input, op, layers)?,
                argument
            )
        };

        lines.push(statement);
        emitted.insert(layer.name.as_str(), var.clone());
        first_var.get_or_insert_with(|| var.clone());
        last_var = var;
    }

    let first_var = first_var.unwrap_or_default();
    lines.push(format!(
        "{} = tf.keras.Model(inputs=[{}], outputs=[{}])",
        model_output, first_var, last_var
    ));
    lines.extend(
        ops.iter()
            .map(|op| op.layer())
            .filter(|l| !l.is_entry_point())
            .map(|l| trainable_flag(model_output, l)),
    );
    Ok(lines.join("\n"))
}

fn layer_expression(
    model_input: &str,
    op: &LayerOperation<'_>,
    layers: &dyn LayerRenderer,
) -> Result<String, RenderError> {
    match op {
        LayerOperation::Copy(l) => Ok(format!("{}.get_layer({})", model_input, py_str(&l.name))),
        LayerOperation::Create(l) => layers.render_layer(l),
    }
}

fn trainable_flag(model: &str, layer: &Layer) -> String {
    format!(
        "{}.get_layer({}).trainable = {}",
        model,
        py_str(&layer.name),
        py_bool(layer.trainable)
    )
}
