//! Training hyperparameter choices: optimizers, losses, and the bundled
//! example datasets.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Optimizer {
    Adam(Adam),
    Rmsprop(Rmsprop),
    Ftrl(Ftrl),
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer::Adam(Adam::default())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta_1: f64,
    pub beta_2: f64,
    pub epsilon: f64,
    pub amsgrad: bool,
}

impl Default for Adam {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-7,
            amsgrad: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rmsprop {
    pub learning_rate: f64,
    pub rho: f64,
    pub momentum: f64,
    pub epsilon: f64,
    pub centered: bool,
}

impl Default for Rmsprop {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            rho: 0.9,
            momentum: 0.0,
            epsilon: 1e-7,
            centered: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ftrl {
    pub learning_rate: f64,
    pub learning_rate_power: f64,
    pub initial_accumulator_value: f64,
    pub l1_regularization_strength: f64,
    pub l2_regularization_strength: f64,
    pub l2_shrinkage_regularization_strength: f64,
}

impl Default for Ftrl {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            learning_rate_power: -0.5,
            initial_accumulator_value: 0.1,
            l1_regularization_strength: 0.0,
            l2_regularization_strength: 0.0,
            l2_shrinkage_regularization_strength: 0.0,
        }
    }
}

impl Optimizer {
    /// Hyperparameters outside their valid ranges.
    pub fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        let lr = match self {
            Optimizer::Adam(o) => o.learning_rate,
            Optimizer::Rmsprop(o) => o.learning_rate,
            Optimizer::Ftrl(o) => o.learning_rate,
        };
        if lr.is_nan() || lr <= 0.0 {
            out.push(format!("learning rate must be positive, got {}", lr));
        }
        if let Optimizer::Adam(o) = self {
            for (name, beta) in [("beta_1", o.beta_1), ("beta_2", o.beta_2)] {
                if !(0.0..1.0).contains(&beta) {
                    out.push(format!("{} must be in [0, 1), got {}", name, beta));
                }
            }
        }
        if let Optimizer::Ftrl(o) = self {
            if o.learning_rate_power > 0.0 {
                out.push(format!(
                    "learning_rate_power must not be positive, got {}",
                    o.learning_rate_power
                ));
            }
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    #[default]
    SparseCategoricalCrossentropy,
    CategoricalCrossentropy,
    MeanSquaredError,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleDataset {
    #[default]
    Mnist,
    FashionMnist,
    Cifar10,
    Cifar100,
    BostonHousing,
    Imdb,
    Reuters,
}

impl ExampleDataset {
    /// The module name under `tf.keras.datasets`.
    pub fn module_name(&self) -> &'static str {
        match self {
            ExampleDataset::Mnist => "mnist",
            ExampleDataset::FashionMnist => "fashion_mnist",
            ExampleDataset::Cifar10 => "cifar10",
            ExampleDataset::Cifar100 => "cifar100",
            ExampleDataset::BostonHousing => "boston_housing",
            ExampleDataset::Imdb => "imdb",
            ExampleDataset::Reuters => "reuters",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_optimizer_is_valid() {
        assert!(Optimizer::default().problems().is_empty());
    }

    #[test]
    fn test_optimizer_problems() {
        let bad = Optimizer::Adam(Adam {
            learning_rate: 0.0,
            beta_1: 1.5,
            ..Adam::default()
        });
        assert_eq!(bad.problems().len(), 2);
    }

    #[test]
    fn test_optimizer_from_json_fills_defaults() {
        let opt: Optimizer =
            serde_json::from_str(r#"{"type": "rmsprop", "learning_rate": 0.01}"#).unwrap();
        assert_eq!(
            opt,
            Optimizer::Rmsprop(Rmsprop {
                learning_rate: 0.01,
                ..Rmsprop::default()
            })
        );
    }

    #[test]
    fn test_dataset_names() {
        let ds: ExampleDataset = serde_json::from_str(r#""fashion_mnist""#).unwrap();
        assert_eq!(ds.module_name(), "fashion_mnist");
    }
}
