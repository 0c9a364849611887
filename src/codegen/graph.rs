//! The execution DAG over tasks.
//!
//! An edge X -> Y exists when Y names X in `after`, when X writes a
//! variable Y reads, or when the generator adds one (prelude, required
//! variables).

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::GraphError;
use crate::graph::{build_dag, Dag, DagNode};
use crate::task::Task;

#[derive(Debug)]
pub struct TaskNode<'a> {
    pub task: &'a Task,
    predecessors: Vec<&'a str>,
}

impl DagNode for TaskNode<'_> {
    fn node_name(&self) -> &str {
        &self.task.name
    }

    fn predecessor_names(&self) -> Vec<&str> {
        self.predecessors.clone()
    }
}

#[derive(Debug)]
pub struct CodeGraph<'a> {
    dag: Dag<TaskNode<'a>>,
}

/// Map every variable to the one task that writes it.
pub fn producers<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
) -> Result<HashMap<&'a str, &'a str>, GraphError> {
    let mut out: HashMap<&'a str, &'a str> = HashMap::new();
    for task in tasks {
        for variable in task.code().outputs() {
            if let Some(first) = out.insert(variable, &task.name) {
                return Err(GraphError::MultipleProducers {
                    variable: variable.to_string(),
                    first: first.to_string(),
                    second: task.name.clone(),
                });
            }
        }
    }
    Ok(out)
}

fn task_nodes<'a>(
    tasks: &[&'a Task],
    extra: &[(&'a str, &'a str)],
) -> Result<Vec<TaskNode<'a>>, GraphError> {
    let writers = producers(tasks.iter().copied())?;

    Ok(tasks
        .iter()
        .map(|&task| {
            let mut predecessors: Vec<&'a str> = task.after.iter().map(String::as_str).collect();
            for input in task.code().inputs() {
                if let Some(&writer) = writers.get(input) {
                    if !predecessors.contains(&writer) {
                        predecessors.push(writer);
                    }
                }
            }
            for &(from, to) in extra {
                if to == task.name && !predecessors.contains(&from) {
                    predecessors.push(from);
                }
            }
            TaskNode { task, predecessors }
        })
        .collect())
}

/// Build the code graph. `extra` holds additional `(from, to)` edges by
/// task name.
pub fn build_code_graph<'a>(
    tasks: &[&'a Task],
    extra: &[(&'a str, &'a str)],
) -> Result<CodeGraph<'a>, GraphError> {
    let nodes = task_nodes(tasks, extra)?;
    let dag = build_dag("task", nodes)?;
    debug!(tasks = dag.len(), edges = dag.edge_count(), "built code graph");
    debug!("code graph:\n{}", dag.adjacency_list());
    Ok(CodeGraph { dag })
}

/// Tasks no other task depends on, in declaration order, computed without
/// validating the graph.
pub fn sink_names<'a>(
    tasks: &[&'a Task],
    extra: &[(&'a str, &'a str)],
) -> Result<Vec<&'a str>, GraphError> {
    let nodes = task_nodes(tasks, extra)?;
    let depended_on: HashSet<&str> = nodes
        .iter()
        .flat_map(|n| n.predecessors.iter().copied())
        .collect();
    Ok(tasks
        .iter()
        .map(|t| t.name.as_str())
        .filter(|name| !depended_on.contains(name))
        .collect())
}

impl<'a> CodeGraph<'a> {
    pub fn len(&self) -> usize {
        self.dag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.dag.edge_count()
    }

    pub fn get(&self, name: &str) -> Option<&'a Task> {
        self.dag.get(name).map(|n| n.task)
    }

    /// Direct predecessors of `name`, sorted by task name.
    pub fn predecessors(&self, name: &str) -> Vec<&'a Task> {
        let mut out: Vec<&'a Task> = match self.dag.position(name) {
            Some(pos) => self
                .dag
                .predecessors(pos)
                .into_iter()
                .map(|i| self.dag.node(i).task)
                .collect(),
            None => Vec::new(),
        };
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Direct successors of `name`, in declaration order.
    pub fn successors(&self, name: &str) -> Vec<&'a Task> {
        match self.dag.position(name) {
            Some(pos) => self
                .dag
                .successors(pos)
                .into_iter()
                .map(|i| self.dag.node(i).task)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Tasks nothing depends on, in declaration order.
    pub fn sinks(&self) -> Vec<&'a Task> {
        self.dag
            .sinks()
            .into_iter()
            .map(|i| self.dag.node(i).task)
            .collect()
    }

    pub fn adjacency_list(&self) -> String {
        self.dag.adjacency_list()
    }
}
