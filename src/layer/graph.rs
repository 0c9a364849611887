//! Layer lists to validated layer DAGs.

use crate::error::GraphError;
use crate::graph::{build_dag, Dag, DagNode};

use super::Layer;

/// One layer plus its effective producers after implicit chaining.
#[derive(Debug)]
pub struct LayerNode<'a> {
    pub layer: &'a Layer,
    producers: Vec<&'a str>,
}

impl DagNode for LayerNode<'_> {
    fn node_name(&self) -> &str {
        &self.layer.name
    }

    fn predecessor_names(&self) -> Vec<&str> {
        self.producers.clone()
    }
}

/// A validated DAG over a model's layers.
#[derive(Debug)]
pub struct LayerGraph<'a> {
    dag: Dag<LayerNode<'a>>,
}

/// Build the layer DAG for `layers`.
///
/// A layer whose inputs are absent chains from the layer before it (the
/// first such layer has no producers). After the shared structural checks,
/// a graph of more than one layer must have exactly one layer without
/// producers.
pub fn build_layer_graph(layers: &[Layer]) -> Result<LayerGraph<'_>, GraphError> {
    let nodes: Vec<LayerNode<'_>> = layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            let producers = match &layer.inputs {
                Some(inputs) => inputs.iter().map(String::as_str).collect(),
                None if i == 0 => Vec::new(),
                None => vec![layers[i - 1].name.as_str()],
            };
            LayerNode { layer, producers }
        })
        .collect();

    let dag = build_dag("layer", nodes)?;

    if dag.len() > 1 {
        let entries = dag.sources();
        if entries.len() > 1 {
            return Err(GraphError::MultipleEntryPoints {
                kind: "layer",
                names: entries
                    .into_iter()
                    .map(|i| dag.node(i).layer.name.clone())
                    .collect(),
            });
        }
    }

    Ok(LayerGraph { dag })
}

impl<'a> LayerGraph<'a> {
    pub fn len(&self) -> usize {
        self.dag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.dag.edge_count()
    }

    /// Layers in declaration order.
    pub fn layers(&self) -> impl Iterator<Item = &'a Layer> + '_ {
        self.dag.nodes().iter().map(|n| n.layer)
    }

    pub fn get(&self, name: &str) -> Option<&'a Layer> {
        self.dag.get(name).map(|n| n.layer)
    }

    /// The layer without producers, if the graph is non-empty.
    pub fn entry(&self) -> Option<&'a Layer> {
        self.dag.sources().first().map(|&i| self.dag.node(i).layer)
    }

    /// Layers nothing consumes: the model outputs.
    pub fn outputs(&self) -> Vec<&'a Layer> {
        self.dag
            .sinks()
            .into_iter()
            .map(|i| self.dag.node(i).layer)
            .collect()
    }

    /// Effective producers of `name`, in declared order.
    pub fn producers_of(&self, name: &str) -> Vec<&'a Layer> {
        match self.dag.get(name) {
            Some(node) => node
                .producers
                .iter()
                .filter_map(|p| self.dag.get(p).map(|n| n.layer))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Layers in dependency order, ties broken by declaration order.
    pub fn topological_order(&self) -> Vec<&'a Layer> {
        self.dag
            .topological_order()
            .into_iter()
            .map(|i| self.dag.node(i).layer)
            .collect()
    }

    pub fn adjacency_list(&self) -> String {
        self.dag.adjacency_list()
    }
}
