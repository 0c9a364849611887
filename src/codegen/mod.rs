//! Turning a set of tasks and variables into one script.
//!
//! - `import`: the four Python import forms
//! - `variable`: named data handles
//! - `graph`: the task DAG (explicit and variable-mediated edges)
//! - `generator`: validation, the backward walk, and assembly

pub mod generator;
pub mod graph;
pub mod import;
pub mod variable;

pub use generator::{GenerateOptions, ScriptGenerator};
pub use graph::{build_code_graph, CodeGraph};
pub use import::Import;
pub use variable::Variable;
