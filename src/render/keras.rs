//! Default renderers targeting `tf.keras`.

use crate::error::RenderError;
use crate::layer::{Activation, Layer, LayerKind};
use crate::training::{ExampleDataset, Loss, Optimizer};

use super::python::{call, kwarg, py_bool, py_float, py_opt, py_pair, py_shape, py_str};
use super::{
    ActivationRenderer, DatasetRenderer, LayerRenderer, LossRenderer, OptimizerRenderer,
};

pub struct KerasLayerRenderer {
    activations: Box<dyn ActivationRenderer>,
}

impl Default for KerasLayerRenderer {
    fn default() -> Self {
        Self::new(Box::new(KerasActivationRenderer))
    }
}

impl KerasLayerRenderer {
    pub fn new(activations: Box<dyn ActivationRenderer>) -> Self {
        Self { activations }
    }

    fn activation(&self, activation: &Activation) -> Result<String, RenderError> {
        self.activations
            .render_activation(activation)
            .map(|a| kwarg("activation", a))
    }
}

impl LayerRenderer for KerasLayerRenderer {
    fn render_layer(&self, layer: &Layer) -> Result<String, RenderError> {
        let name = kwarg("name", py_str(&layer.name));
        let text = match &layer.kind {
            LayerKind::Input {
                shape,
                batch_size,
                dtype,
                sparse,
            } => {
                let mut args = vec![kwarg("shape", py_shape(shape))];
                if let Some(b) = batch_size {
                    args.push(kwarg("batch_size", b.to_string()));
                }
                if let Some(d) = dtype {
                    args.push(kwarg("dtype", py_str(d)));
                }
                if *sparse {
                    args.push(kwarg("sparse", py_bool(true)));
                }
                args.push(name);
                call("tf.keras.Input", &args)
            }
            LayerKind::Dense { units, activation } => call(
                "tf.keras.layers.Dense",
                &[
                    kwarg("units", units.to_string()),
                    self.activation(activation)?,
                    name,
                ],
            ),
            LayerKind::Dropout { rate, seed } => {
                let mut args = vec![kwarg("rate", py_float(*rate))];
                if let Some(s) = seed {
                    args.push(kwarg("seed", s.to_string()));
                }
                args.push(name);
                call("tf.keras.layers.Dropout", &args)
            }
            LayerKind::Flatten { data_format } => {
                let mut args = Vec::new();
                if let Some(f) = data_format {
                    args.push(kwarg("data_format", py_str(f.as_str())));
                }
                args.push(name);
                call("tf.keras.layers.Flatten", &args)
            }
            LayerKind::Conv2D {
                filters,
                kernel_size,
                strides,
                padding,
                activation,
            } => call(
                "tf.keras.layers.Conv2D",
                &[
                    kwarg("filters", filters.to_string()),
                    kwarg("kernel_size", py_pair(*kernel_size)),
                    kwarg("strides", py_pair(*strides)),
                    kwarg("padding", py_str(padding.as_str())),
                    self.activation(activation)?,
                    name,
                ],
            ),
            LayerKind::MaxPooling2D {
                pool_size,
                strides,
                padding,
            } => call(
                "tf.keras.layers.MaxPooling2D",
                &[
                    kwarg("pool_size", py_pair(*pool_size)),
                    kwarg("strides", py_opt(strides.map(py_pair))),
                    kwarg("padding", py_str(padding.as_str())),
                    name,
                ],
            ),
            LayerKind::BatchNormalization {
                axis,
                momentum,
                epsilon,
                center,
                scale,
            } => call(
                "tf.keras.layers.BatchNormalization",
                &[
                    kwarg("axis", axis.to_string()),
                    kwarg("momentum", py_float(*momentum)),
                    kwarg("epsilon", py_float(*epsilon)),
                    kwarg("center", py_bool(*center)),
                    kwarg("scale", py_bool(*scale)),
                    name,
                ],
            ),
            LayerKind::Unknown => return Err(RenderError::UnknownLayer(layer.name.clone())),
        };
        Ok(text)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KerasActivationRenderer;

impl ActivationRenderer for KerasActivationRenderer {
    fn render_activation(&self, activation: &Activation) -> Result<String, RenderError> {
        let name = match activation {
            Activation::Linear => "linear",
            Activation::Relu => "relu",
            Activation::Softmax => "softmax",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Unknown(other) => {
                return Err(RenderError::UnknownActivation(other.clone()))
            }
        };
        Ok(format!("tf.keras.activations.{}", name))
    }
}

/// Positional arguments in constructor order.
#[derive(Clone, Copy, Debug, Default)]
pub struct KerasOptimizerRenderer;

impl OptimizerRenderer for KerasOptimizerRenderer {
    fn render_optimizer(&self, optimizer: &Optimizer) -> String {
        match optimizer {
            Optimizer::Adam(o) => call(
                "tf.keras.optimizers.Adam",
                &[
                    py_float(o.learning_rate),
                    py_float(o.beta_1),
                    py_float(o.beta_2),
                    py_float(o.epsilon),
                    py_bool(o.amsgrad).to_string(),
                ],
            ),
            Optimizer::Rmsprop(o) => call(
                "tf.keras.optimizers.RMSprop",
                &[
                    py_float(o.learning_rate),
                    py_float(o.rho),
                    py_float(o.momentum),
                    py_float(o.epsilon),
                    py_bool(o.centered).to_string(),
                ],
            ),
            Optimizer::Ftrl(o) => call(
                "tf.keras.optimizers.Ftrl",
                &[
                    py_float(o.learning_rate),
                    py_float(o.learning_rate_power),
                    py_float(o.initial_accumulator_value),
                    py_float(o.l1_regularization_strength),
                    py_float(o.l2_regularization_strength),
                    kwarg(
                        "l2_shrinkage_regularization_strength",
                        py_float(o.l2_shrinkage_regularization_strength),
                    ),
                ],
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KerasLossRenderer;

impl LossRenderer for KerasLossRenderer {
    fn render_loss(&self, loss: &Loss) -> String {
        let name = match loss {
            Loss::SparseCategoricalCrossentropy => "sparse_categorical_crossentropy",
            Loss::CategoricalCrossentropy => "categorical_crossentropy",
            Loss::MeanSquaredError => "mean_squared_error",
        };
        format!("tf.keras.losses.{}", name)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KerasDatasetRenderer;

impl DatasetRenderer for KerasDatasetRenderer {
    fn render_dataset(&self, dataset: &ExampleDataset) -> String {
        format!("tf.keras.datasets.{}.load_data()", dataset.module_name())
    }
}
