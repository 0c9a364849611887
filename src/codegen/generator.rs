//! Script generation: validate every task, build the code graph, then walk
//! it backward from the terminal task, rendering each task once.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::diagnostic::Diagnostic;
use crate::error::RenderError;
use crate::naming::NameAllocator;
use crate::outcome::{all_failures, Outcome};
use crate::registry::Registry;
use crate::render::Renderers;
use crate::span::Span;
use crate::task::{Task, TaskContext};

use super::graph::{build_code_graph, sink_names, CodeGraph};
use super::variable::Variable;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Prefix each import with its form and each task body with its name.
    pub debug_comments: bool,
}

/// Owns the declared variables and tasks and turns them into one script.
///
/// Each `generate` call is independent: names allocated during one pass
/// start over in the next, so identical inputs give identical output.
#[derive(Debug)]
pub struct ScriptGenerator {
    renderers: Renderers,
    pub variables: Registry<Variable>,
    pub tasks: Registry<Task>,
    terminal: Option<String>,
    prelude: Option<String>,
    required: Vec<String>,
    options: GenerateOptions,
}

/// A validated code graph and the task the walk starts from.
struct Prepared<'a> {
    graph: CodeGraph<'a>,
    terminal: &'a Task,
}

impl ScriptGenerator {
    pub fn new(renderers: Renderers) -> Self {
        Self {
            renderers,
            variables: Registry::new(),
            tasks: Registry::new(),
            terminal: None,
            prelude: None,
            required: Vec::new(),
            options: GenerateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> GenerateOptions {
        self.options
    }

    pub fn renderers(&self) -> &Renderers {
        &self.renderers
    }

    /// Designate the task the walk starts from. Without one, the single
    /// task nothing depends on is used.
    pub fn set_terminal(&mut self, task: &str) {
        self.terminal = Some(task.to_string());
    }

    /// Designate a task that every other task runs after.
    pub fn set_prelude(&mut self, task: &str) {
        self.prelude = Some(task.to_string());
    }

    /// Require the producer of `variable` to run before the terminal task.
    pub fn require(&mut self, variable: &str) {
        if !self.required.iter().any(|v| v == variable) {
            self.required.push(variable.to_string());
        }
    }

    /// Validate and build the code graph without rendering anything.
    pub fn check(&self) -> Outcome<()> {
        self.prepare().map(|_| ())
    }

    /// Generate the whole script.
    pub fn generate(&self) -> Outcome<String> {
        let prepared = self.prepare()?;
        let script = self.render(&prepared).map_err(|e| vec![Diagnostic::from(e)])?;
        info!(
            tasks = prepared.graph.len(),
            bytes = script.len(),
            "generated script"
        );
        debug!("generated script:\n{}", script);
        Ok(script)
    }

    // ─── Validation ────────────────────────────────────────────────

    fn prepare(&self) -> Outcome<Prepared<'_>> {
        self.validate()?;

        let tasks: Vec<&Task> = self.tasks.iter().collect();
        let mut extra = self.prelude_edges();
        let terminal_name = match &self.terminal {
            Some(name) => name.as_str(),
            None => self.derive_terminal(&tasks, &extra)?,
        };
        extra.extend(self.required_edges(terminal_name));

        let graph = build_code_graph(&tasks, &extra).map_err(|e| vec![Diagnostic::from(e)])?;
        let terminal = match graph.get(terminal_name) {
            Some(task) => task,
            None => return Err(vec![missing_task("terminal", terminal_name)]),
        };
        debug!(terminal = %terminal.name, "selected terminal task");

        Ok(Prepared { graph, terminal })
    }

    /// The single task nothing depends on. Producers of required variables
    /// are not candidates: they feed the terminal once it is known.
    fn derive_terminal<'a>(
        &'a self,
        tasks: &[&'a Task],
        extra: &[(&'a str, &'a str)],
    ) -> Outcome<&'a str> {
        let sinks = sink_names(tasks, extra).map_err(|e| vec![Diagnostic::from(e)])?;
        let candidates: Vec<&str> = sinks
            .into_iter()
            .filter(|name| !self.produces_required(name))
            .collect();
        if let [only] = candidates.as_slice() {
            return Ok(*only);
        }

        // A structural fault explains a missing or ambiguous sink better.
        build_code_graph(tasks, extra).map_err(|e| vec![Diagnostic::from(e)])?;
        Err(vec![Diagnostic::error(
            format!(
                "cannot choose a terminal task: {} tasks have no dependents ({})",
                candidates.len(),
                candidates.join(", ")
            ),
            Span::dummy(),
        )
        .with_help("designate the terminal task explicitly".to_string())])
    }

    fn produces_required(&self, task: &str) -> bool {
        self.tasks.get(task).is_some_and(|t| {
            t.code()
                .outputs()
                .iter()
                .any(|v| self.required.iter().any(|r| r.as_str() == *v))
        })
    }

    /// Every configuration problem, accumulated across tasks.
    fn validate(&self) -> Outcome<()> {
        if self.tasks.is_empty() {
            return Err(vec![Diagnostic::error(
                "nothing to generate: no tasks are declared".to_string(),
                Span::dummy(),
            )]);
        }

        let generated = NameAllocator::default();
        let written: HashSet<&str> = self
            .tasks
            .iter()
            .flat_map(|t| t.code().outputs())
            .collect();

        let mut checks: Vec<Outcome<()>> = Vec::new();

        for variable in &self.variables {
            let name = variable.name.as_str();
            if !self.renderers.names.is_valid_name(name) {
                checks.push(Err(vec![Diagnostic::error(
                    format!("variable '{}' is not a valid identifier", name),
                    Span::dummy(),
                )]));
            } else if generated.owns(name) {
                checks.push(Err(vec![Diagnostic::error(
                    format!("variable '{}' collides with generated names", name),
                    Span::dummy(),
                )
                .with_help("choose a name that is not 'var' followed by digits".to_string())]));
            }
        }

        let terminal = self.terminal.as_deref().and_then(|n| self.tasks.get(n));
        let terminal_outputs: Vec<&str> = terminal.map(|t| t.code().outputs()).unwrap_or_default();

        for task in &self.tasks {
            let code = task.code();
            let mut problems = code.check(&self.renderers);

            for variable in code.inputs().into_iter().chain(code.outputs()) {
                if !self.variables.contains(variable) {
                    problems.push(format!("variable '{}' is not declared", variable));
                }
            }
            for variable in code.inputs() {
                if self.variables.contains(variable) && !written.contains(variable) {
                    problems.push(format!(
                        "reads variable '{}', which no task writes",
                        variable
                    ));
                }
            }
            if let Some(terminal) = terminal {
                if task.name != terminal.name {
                    if task.after.iter().any(|a| *a == terminal.name) {
                        problems.push(format!(
                            "depends on the terminal task '{}'",
                            terminal.name
                        ));
                    }
                    for variable in code.inputs() {
                        if terminal_outputs.contains(&variable) {
                            problems.push(format!(
                                "reads '{}', written by the terminal task '{}'",
                                variable, terminal.name
                            ));
                        }
                    }
                }
            }

            if problems.is_empty() {
                checks.push(Ok(()));
            } else {
                let diag = problems.into_iter().fold(
                    Diagnostic::error(
                        format!("task '{}' is configured incorrectly", task.name),
                        Span::dummy(),
                    ),
                    |d, p| d.with_note(p),
                );
                checks.push(Err(vec![diag]));
            }
        }

        if let Some(name) = &self.terminal {
            if !self.tasks.contains(name) {
                checks.push(Err(vec![missing_task("terminal", name)]));
            }
        }

        if let Some(name) = &self.prelude {
            match self.tasks.get(name) {
                None => checks.push(Err(vec![missing_task("prelude", name)])),
                Some(task) => {
                    if !task.after.is_empty() || !task.code().inputs().is_empty() {
                        checks.push(Err(vec![Diagnostic::error(
                            format!("prelude task '{}' must not depend on other tasks", name),
                            Span::dummy(),
                        )]));
                    }
                    if self.terminal.as_deref() == Some(name.as_str()) && self.tasks.len() > 1 {
                        checks.push(Err(vec![Diagnostic::error(
                            format!("task '{}' cannot be both prelude and terminal", name),
                            Span::dummy(),
                        )]));
                    }
                }
            }
        }

        for variable in &self.required {
            if !self.variables.contains(variable) {
                checks.push(Err(vec![Diagnostic::error(
                    format!("required variable '{}' is not declared", variable),
                    Span::dummy(),
                )]));
            } else if !written.contains(variable.as_str()) {
                checks.push(Err(vec![Diagnostic::error(
                    format!("required variable '{}' is never written", variable),
                    Span::dummy(),
                )]));
            }
        }

        all_failures(checks).map(|_| ())
    }

    /// The prelude runs before every other task.
    fn prelude_edges(&self) -> Vec<(&str, &str)> {
        let Some(prelude) = &self.prelude else {
            return Vec::new();
        };
        self.tasks
            .iter()
            .filter(|t| t.name != *prelude)
            .map(|t| (prelude.as_str(), t.name.as_str()))
            .collect()
    }

    /// Producers of required variables run before the terminal.
    fn required_edges<'a>(&'a self, terminal: &'a str) -> Vec<(&'a str, &'a str)> {
        debug!(required = ?self.required, terminal, "required variables");
        let mut edges = Vec::new();
        for variable in &self.required {
            let producer = self
                .tasks
                .iter()
                .find(|t| t.code().outputs().contains(&variable.as_str()));
            if let Some(producer) = producer {
                if producer.name != terminal {
                    edges.push((producer.name.as_str(), terminal));
                }
            }
        }
        edges
    }

    // ─── Rendering ─────────────────────────────────────────────────

    fn render(&self, prepared: &Prepared<'_>) -> Result<String, RenderError> {
        let names = NameAllocator::default();
        let cx = TaskContext {
            renderers: &self.renderers,
            names: &names,
        };

        let mut memo: HashMap<&str, String> = HashMap::new();
        let mut order: Vec<&Task> = Vec::new();
        visit(prepared.terminal, &prepared.graph, &cx, &mut memo, &mut order)?;

        for task in &self.tasks {
            if !memo.contains_key(task.name.as_str()) {
                warn!(
                    task = %task.name,
                    terminal = %prepared.terminal.name,
                    "task is not upstream of the terminal task and was not rendered"
                );
            }
        }

        let mut imports: BTreeMap<String, &'static str> = BTreeMap::new();
        for task in &order {
            for import in task.code().imports() {
                imports.entry(import.to_string()).or_insert(import.form());
            }
        }

        let mut sections: Vec<String> = Vec::new();
        if !imports.is_empty() {
            let header: Vec<String> = imports
                .iter()
                .map(|(line, form)| {
                    if self.options.debug_comments {
                        format!("# import: {}\n{}", form, line)
                    } else {
                        line.clone()
                    }
                })
                .collect();
            sections.push(header.join("\n"));
        }
        for task in &order {
            let body = &memo[task.name.as_str()];
            if body.is_empty() {
                continue;
            }
            if self.options.debug_comments {
                sections.push(format!("# task: {}\n{}", task.name, body));
            } else {
                sections.push(body.clone());
            }
        }

        if sections.is_empty() {
            return Ok(String::new());
        }
        let mut script = sections.join("\n\n");
        script.push('\n');
        Ok(script)
    }
}

/// Post-order walk: predecessors (by name) first, then `task`. A task
/// already in `memo` is not rendered again.
fn visit<'a>(
    task: &'a Task,
    graph: &CodeGraph<'a>,
    cx: &TaskContext<'_>,
    memo: &mut HashMap<&'a str, String>,
    order: &mut Vec<&'a Task>,
) -> Result<(), RenderError> {
    if memo.contains_key(task.name.as_str()) {
        return Ok(());
    }
    for pred in graph.predecessors(&task.name) {
        visit(pred, graph, cx, memo, order)?;
    }
    debug!(task = %task.name, kind = task.body.kind_name(), "rendering task");
    let text = task.code().render(cx).map_err(|e| e.in_task(&task.name))?;
    memo.insert(task.name.as_str(), text);
    order.push(task);
    Ok(())
}

fn missing_task(role: &str, name: &str) -> Diagnostic {
    Diagnostic::error(
        format!("{} task '{}' does not exist", role, name),
        Span::dummy(),
    )
}
