//! Injected rendering collaborators.
//!
//! The generator and the delta engine never hard-code library calls; they
//! receive these traits at construction time. `keras` holds the defaults,
//! `python` the literal helpers they share.

pub mod keras;
pub mod python;

use crate::error::RenderError;
use crate::layer::{Activation, Layer};
use crate::naming::{LiteralPathValidator, NameValidator, PathValidator, PythonNameValidator};
use crate::training::{ExampleDataset, Loss, Optimizer};

/// Renders a layer constructor expression.
pub trait LayerRenderer {
    fn render_layer(&self, layer: &Layer) -> Result<String, RenderError>;
}

/// Renders an activation function reference.
pub trait ActivationRenderer {
    fn render_activation(&self, activation: &Activation) -> Result<String, RenderError>;
}

pub trait OptimizerRenderer {
    fn render_optimizer(&self, optimizer: &Optimizer) -> String;
}

pub trait LossRenderer {
    fn render_loss(&self, loss: &Loss) -> String;
}

/// Renders the expression that loads a dataset as
/// `((x_train, y_train), (x_test, y_test))`.
pub trait DatasetRenderer {
    fn render_dataset(&self, dataset: &ExampleDataset) -> String;
}

/// Every collaborator a generation pass needs, wired once at assembly time.
pub struct Renderers {
    pub layers: Box<dyn LayerRenderer>,
    pub optimizers: Box<dyn OptimizerRenderer>,
    pub losses: Box<dyn LossRenderer>,
    pub datasets: Box<dyn DatasetRenderer>,
    pub names: Box<dyn NameValidator>,
    pub paths: Box<dyn PathValidator>,
}

impl Renderers {
    /// TensorFlow Keras renderers with Python validators.
    pub fn keras() -> Self {
        Self {
            layers: Box::new(keras::KerasLayerRenderer::default()),
            optimizers: Box::new(keras::KerasOptimizerRenderer),
            losses: Box::new(keras::KerasLossRenderer),
            datasets: Box::new(keras::KerasDatasetRenderer),
            names: Box::new(PythonNameValidator),
            paths: Box::new(LiteralPathValidator),
        }
    }

    /// Swap the layer renderer, keeping the rest.
    pub fn with_layers(mut self, layers: Box<dyn LayerRenderer>) -> Self {
        self.layers = layers;
        self
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self::keras()
    }
}

impl std::fmt::Debug for Renderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderers").finish_non_exhaustive()
    }
}
