//! Validated DAG construction shared by layer graphs and code graphs.
//!
//! Any node type that can name itself and its predecessors goes through the
//! same checks, in this order, each stopping construction at the first fault:
//!
//! 1. duplicate node name
//! 2. node naming itself as a predecessor
//! 3. predecessor name that resolves to no node
//! 4. cycle
//! 5. more than one weakly connected component ("island")

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::Direction;

use crate::error::GraphError;
use crate::outcome::first_failure;

/// A node that declares its predecessors by name.
pub trait DagNode {
    fn node_name(&self) -> &str;
    fn predecessor_names(&self) -> Vec<&str>;
}

/// An immutable, validated DAG. Node positions follow input order.
#[derive(Debug)]
pub struct Dag<N> {
    kind: &'static str,
    nodes: Vec<N>,
    graph: DiGraph<usize, ()>,
    index: HashMap<String, usize>,
}

/// Build and validate a DAG over `nodes`.
///
/// `kind` names the node type in error messages ("layer", "task").
pub fn build_dag<N: DagNode>(kind: &'static str, nodes: Vec<N>) -> Result<Dag<N>, GraphError> {
    let mut graph = DiGraph::with_capacity(nodes.len(), nodes.len());
    let mut index = HashMap::with_capacity(nodes.len());

    for (i, node) in nodes.iter().enumerate() {
        let name = node.node_name();
        if index.insert(name.to_string(), i).is_some() {
            return Err(GraphError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
        graph.add_node(i);
    }

    first_failure(nodes.iter().map(|node| check_self_reference(kind, node)))?;
    first_failure(nodes.iter().map(|node| check_references(kind, node, &index)))?;

    for (i, node) in nodes.iter().enumerate() {
        for pred in node.predecessor_names() {
            let from = index[pred];
            graph.update_edge(NodeIndex::new(from), NodeIndex::new(i), ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        let at = graph[cycle.node_id()];
        return Err(GraphError::Cycle {
            kind,
            name: nodes[at].node_name().to_string(),
        });
    }

    if nodes.len() > 1 {
        let mut components = UnionFind::new(nodes.len());
        for edge in graph.raw_edges() {
            components.union(edge.source().index(), edge.target().index());
        }
        let main = components.find(0);
        let unreachable: Vec<String> = (0..nodes.len())
            .filter(|&i| components.find(i) != main)
            .map(|i| nodes[i].node_name().to_string())
            .collect();
        if !unreachable.is_empty() {
            return Err(GraphError::Island { kind, unreachable });
        }
    }

    Ok(Dag {
        kind,
        nodes,
        graph,
        index,
    })
}

fn check_self_reference<N: DagNode>(kind: &'static str, node: &N) -> Result<(), GraphError> {
    let name = node.node_name();
    if node.predecessor_names().contains(&name) {
        return Err(GraphError::SelfReference {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_references<N: DagNode>(
    kind: &'static str,
    node: &N,
    index: &HashMap<String, usize>,
) -> Result<(), GraphError> {
    match node
        .predecessor_names()
        .into_iter()
        .find(|pred| !index.contains_key(*pred))
    {
        Some(missing) => Err(GraphError::UnresolvedReference {
            kind,
            name: node.node_name().to_string(),
            missing: missing.to_string(),
        }),
        None => Ok(()),
    }
}

impl<N: DagNode> Dag<N> {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn node(&self, position: usize) -> &N {
        &self.nodes[position]
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&N> {
        self.position(name).map(|i| &self.nodes[i])
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Positions of the direct predecessors of `position`, ascending.
    pub fn predecessors(&self, position: usize) -> Vec<usize> {
        self.neighbors(position, Direction::Incoming)
    }

    /// Positions of the direct successors of `position`, ascending.
    pub fn successors(&self, position: usize) -> Vec<usize> {
        self.neighbors(position, Direction::Outgoing)
    }

    fn neighbors(&self, position: usize, dir: Direction) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors_directed(NodeIndex::new(position), dir)
            .map(|n| self.graph[n])
            .collect();
        out.sort_unstable();
        out
    }

    /// Nodes with no predecessors, in input order.
    pub fn sources(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.predecessors(i).is_empty())
            .collect()
    }

    /// Nodes with no successors, in input order.
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.successors(i).is_empty())
            .collect()
    }

    /// Every position in a topological order. Ties break toward input order,
    /// so the result depends only on the input sequence.
    pub fn topological_order(&self) -> Vec<usize> {
        let mut in_degree: Vec<usize> = (0..self.len())
            .map(|i| self.predecessors(i).len())
            .collect();
        let mut ready: BinaryHeap<Reverse<usize>> = (0..self.len())
            .filter(|&i| in_degree[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for succ in self.successors(i) {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.push(Reverse(succ));
                }
            }
        }
        order
    }

    /// `name -> successor, successor` lines, one per node.
    pub fn adjacency_list(&self) -> String {
        (0..self.len())
            .map(|i| {
                let succ: Vec<&str> = self
                    .successors(i)
                    .into_iter()
                    .map(|s| self.nodes[s].node_name())
                    .collect();
                format!("{} -> {}", self.nodes[i].node_name(), succ.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
