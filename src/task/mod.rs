//! Tasks: named units that each emit one block of the generated script.
//!
//! A task declares the imports its code needs, the variables it reads and
//! writes, the tasks it must run after, and a predicate over its own
//! fields. Variant payloads live in the submodules; [`TaskBody`] is the
//! closed union over them and the one place that dispatches.

mod data;
mod model;
mod script;
mod train;

use serde::{Deserialize, Serialize};

use crate::codegen::Import;
use crate::error::{RegistryError, RenderError};
use crate::naming::NameAllocator;
use crate::registry::{Member, Registry, Variant};
use crate::render::Renderers;

pub use data::{LoadExampleDataset, ReshapeAndScale};
pub use model::{ApplyGeneralDelta, ApplyLinearDelta, CompileModel, LoadModel, SaveModel};
pub use script::{Barrier, Custom, EnableEagerExecution};
pub use train::{CheckpointCallback, Train};

/// What a generation pass hands to each task as it renders.
pub struct TaskContext<'a> {
    pub renderers: &'a Renderers,
    /// Shared by every task in the pass.
    pub names: &'a NameAllocator,
}

/// Behavior every task variant provides.
pub trait TaskCode {
    fn imports(&self) -> Vec<Import>;
    fn inputs(&self) -> Vec<&str>;
    fn outputs(&self) -> Vec<&str>;
    /// Everything wrong with this task's own configuration.
    fn check(&self, renderers: &Renderers) -> Vec<String>;
    fn render(&self, cx: &TaskContext<'_>) -> Result<String, RenderError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Tasks that must run first even though no variable links them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(flatten)]
    pub body: TaskBody,
}

impl Member for Task {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Task {
    pub fn code(&self) -> &dyn TaskCode {
        self.body.code()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskBody {
    LoadModel(LoadModel),
    LoadExampleDataset(LoadExampleDataset),
    ReshapeAndScale(ReshapeAndScale),
    ApplyLinearDelta(ApplyLinearDelta),
    ApplyGeneralDelta(ApplyGeneralDelta),
    CompileModel(CompileModel),
    CheckpointCallback(CheckpointCallback),
    Train(Train),
    SaveModel(SaveModel),
    EnableEagerExecution(EnableEagerExecution),
    Barrier(Barrier),
    Custom(Custom),
}

impl TaskBody {
    pub fn code(&self) -> &dyn TaskCode {
        match self {
            TaskBody::LoadModel(t) => t,
            TaskBody::LoadExampleDataset(t) => t,
            TaskBody::ReshapeAndScale(t) => t,
            TaskBody::ApplyLinearDelta(t) => t,
            TaskBody::ApplyGeneralDelta(t) => t,
            TaskBody::CompileModel(t) => t,
            TaskBody::CheckpointCallback(t) => t,
            TaskBody::Train(t) => t,
            TaskBody::SaveModel(t) => t,
            TaskBody::EnableEagerExecution(t) => t,
            TaskBody::Barrier(t) => t,
            TaskBody::Custom(t) => t,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TaskBody::LoadModel(_) => "load_model",
            TaskBody::LoadExampleDataset(_) => "load_example_dataset",
            TaskBody::ReshapeAndScale(_) => "reshape_and_scale",
            TaskBody::ApplyLinearDelta(_) => "apply_linear_delta",
            TaskBody::ApplyGeneralDelta(_) => "apply_general_delta",
            TaskBody::CompileModel(_) => "compile_model",
            TaskBody::CheckpointCallback(_) => "checkpoint_callback",
            TaskBody::Train(_) => "train",
            TaskBody::SaveModel(_) => "save_model",
            TaskBody::EnableEagerExecution(_) => "enable_eager_execution",
            TaskBody::Barrier(_) => "barrier",
            TaskBody::Custom(_) => "custom",
        }
    }
}

macro_rules! task_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl Variant<Task> for $variant {
                fn into_member(self, name: &str) -> Task {
                    Task {
                        name: name.to_string(),
                        after: Vec::new(),
                        body: TaskBody::$variant(self),
                    }
                }
            }
        )*
    };
}

task_variants!(
    LoadModel,
    LoadExampleDataset,
    ReshapeAndScale,
    ApplyLinearDelta,
    ApplyGeneralDelta,
    CompileModel,
    CheckpointCallback,
    Train,
    SaveModel,
    EnableEagerExecution,
    Barrier,
    Custom,
);

impl Registry<Task> {
    /// Like [`Registry::create`], additionally ordering the new task after
    /// the tasks named in `after`.
    pub fn create_after<V, F>(
        &mut self,
        name: &str,
        after: &[&str],
        configure: F,
    ) -> Result<&Task, RegistryError>
    where
        V: Variant<Task>,
        F: FnOnce(&mut V),
    {
        if self.contains(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let mut payload = V::default();
        configure(&mut payload);
        let mut task = payload.into_member(name);
        task.after = after.iter().map(|s| s.to_string()).collect();
        self.insert(task)
    }
}

fn check_path(renderers: &Renderers, role: &str, path: &str, out: &mut Vec<String>) {
    if !renderers.paths.is_valid_path(path) {
        out.push(format!("{} '{}' is not a valid path", role, path));
    }
}
