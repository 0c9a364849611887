//! Neural-network layers as consumed from the model loader or from a
//! user-authored target architecture.
//!
//! `graph` turns a layer list into a validated DAG; `delta` classifies the
//! layers of a target model against a source model and renders the code
//! that builds the target.

pub mod delta;
pub mod graph;

use serde::{Deserialize, Serialize};

pub use delta::{compute_delta, LayerOperation};
pub use graph::{build_layer_graph, LayerGraph};

/// A named layer with its producers, trainable flag, and configuration.
///
/// `inputs` has three states:
/// - `None`: chain from the previous layer in list order
/// - `Some([])`: a true entry point
/// - `Some([a, b])`: explicit producers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<String>>,
    #[serde(default = "default_trainable")]
    pub trainable: bool,
    #[serde(flatten)]
    pub kind: LayerKind,
}

fn default_trainable() -> bool {
    true
}

impl Layer {
    pub fn new(name: &str, kind: LayerKind) -> Self {
        Self {
            name: name.to_string(),
            inputs: None,
            trainable: true,
            kind,
        }
    }

    /// Declare explicit producers.
    pub fn with_inputs(mut self, inputs: &[&str]) -> Self {
        self.inputs = Some(inputs.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Declare this layer as an entry point (no producers).
    pub fn entry(mut self) -> Self {
        self.inputs = Some(Vec::new());
        self
    }

    pub fn with_trainable(mut self, trainable: bool) -> Self {
        self.trainable = trainable;
        self
    }

    /// Same name and same configuration. Declared inputs and the trainable
    /// flag do not take part, so a reused layer keeps its trained weights
    /// even when it is rewired or frozen.
    pub fn same_structure(&self, other: &Layer) -> bool {
        self.name == other.name && self.kind == other.kind
    }

    /// Entry-point variants: the model's input placeholders.
    pub fn is_entry_point(&self) -> bool {
        matches!(self.kind, LayerKind::Input { .. })
    }
}

/// Variant-specific layer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Input {
        /// Shape excluding the batch dimension; `None` is an unknown size.
        shape: Vec<Option<u32>>,
        #[serde(default)]
        batch_size: Option<u32>,
        #[serde(default)]
        dtype: Option<String>,
        #[serde(default)]
        sparse: bool,
    },
    Dense {
        units: u32,
        #[serde(default)]
        activation: Activation,
    },
    Dropout {
        rate: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
    Flatten {
        #[serde(default)]
        data_format: Option<DataFormat>,
    },
    #[serde(rename = "conv2d")]
    Conv2D {
        filters: u32,
        kernel_size: (u32, u32),
        #[serde(default = "unit_stride")]
        strides: (u32, u32),
        #[serde(default)]
        padding: Padding,
        #[serde(default)]
        activation: Activation,
    },
    #[serde(rename = "max_pooling2d")]
    MaxPooling2D {
        #[serde(default = "default_pool")]
        pool_size: (u32, u32),
        #[serde(default)]
        strides: Option<(u32, u32)>,
        #[serde(default)]
        padding: Padding,
    },
    BatchNormalization {
        #[serde(default = "default_axis")]
        axis: i32,
        #[serde(default = "default_momentum")]
        momentum: f64,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
        #[serde(default = "default_trainable")]
        center: bool,
        #[serde(default = "default_trainable")]
        scale: bool,
    },
    /// A layer the loader could not classify. It can be copied from a
    /// source model but never constructed fresh.
    Unknown,
}

fn unit_stride() -> (u32, u32) {
    (1, 1)
}

fn default_pool() -> (u32, u32) {
    (2, 2)
}

fn default_axis() -> i32 {
    -1
}

fn default_momentum() -> f64 {
    0.99
}

fn default_epsilon() -> f64 {
    0.001
}

impl LayerKind {
    pub fn input(shape: &[Option<u32>]) -> Self {
        LayerKind::Input {
            shape: shape.to_vec(),
            batch_size: None,
            dtype: None,
            sparse: false,
        }
    }

    pub fn dense(units: u32, activation: Activation) -> Self {
        LayerKind::Dense { units, activation }
    }

    /// Short variant name used in logs and CLI output.
    pub fn variant_name(&self) -> &'static str {
        match self {
            LayerKind::Input { .. } => "Input",
            LayerKind::Dense { .. } => "Dense",
            LayerKind::Dropout { .. } => "Dropout",
            LayerKind::Flatten { .. } => "Flatten",
            LayerKind::Conv2D { .. } => "Conv2D",
            LayerKind::MaxPooling2D { .. } => "MaxPooling2D",
            LayerKind::BatchNormalization { .. } => "BatchNormalization",
            LayerKind::Unknown => "Unknown",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Softmax,
    Sigmoid,
    Tanh,
    Unknown(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    #[default]
    Valid,
    Same,
}

impl Padding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Padding::Valid => "valid",
            Padding::Same => "same",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    ChannelsFirst,
    ChannelsLast,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::ChannelsFirst => "channels_first",
            DataFormat::ChannelsLast => "channels_last",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_structure_ignores_inputs_and_trainable() {
        let a = Layer::new("d1", LayerKind::dense(10, Activation::Relu));
        let b = a.clone().with_inputs(&["x"]).with_trainable(false);
        assert!(a.same_structure(&b));
    }

    #[test]
    fn test_same_structure_requires_same_config() {
        let a = Layer::new("d1", LayerKind::dense(10, Activation::Relu));
        let b = Layer::new("d1", LayerKind::dense(5, Activation::Relu));
        assert!(!a.same_structure(&b));
    }

    #[test]
    fn test_same_structure_requires_same_name() {
        let a = Layer::new("d1", LayerKind::dense(10, Activation::Relu));
        let b = Layer::new("d2", LayerKind::dense(10, Activation::Relu));
        assert!(!a.same_structure(&b));
    }

    #[test]
    fn test_deserialize_three_input_states() {
        let chained: Layer =
            serde_json::from_str(r#"{"name": "d", "type": "dense", "units": 3}"#).unwrap();
        assert_eq!(chained.inputs, None);
        assert!(chained.trainable);
        assert_eq!(chained.kind, LayerKind::dense(3, Activation::Linear));

        let entry: Layer = serde_json::from_str(
            r#"{"name": "in", "inputs": [], "type": "input", "shape": [null, 4]}"#,
        )
        .unwrap();
        assert_eq!(entry.inputs, Some(vec![]));
        assert_eq!(entry.kind, LayerKind::input(&[None, Some(4)]));

        let wired: Layer = serde_json::from_str(
            r#"{"name": "c", "inputs": ["a", "b"], "trainable": false, "type": "conv2d", "filters": 8, "kernel_size": [3, 3]}"#,
        )
        .unwrap();
        assert_eq!(wired.inputs, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(!wired.trainable);
        assert!(matches!(
            wired.kind,
            LayerKind::Conv2D {
                strides: (1, 1),
                padding: Padding::Valid,
                ..
            }
        ));
    }

    #[test]
    fn test_deserialize_unknown_layer() {
        let layer: Layer = serde_json::from_str(r#"{"name": "odd", "type": "unknown"}"#).unwrap();
        assert_eq!(layer.kind, LayerKind::Unknown);
    }

    #[test]
    fn test_entry_point_variant() {
        assert!(Layer::new("in", LayerKind::input(&[Some(1)])).is_entry_point());
        assert!(!Layer::new("d", LayerKind::dense(1, Activation::Relu)).is_entry_point());
    }
}
