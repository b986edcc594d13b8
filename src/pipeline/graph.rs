use super::{PipelineError, Stage};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A validated set of stages forming a directed acyclic graph
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
    /// Stage name -> declaration index
    index: HashMap<String, usize>,
    /// Declaration indices in dependency order
    order: Vec<usize>,
}

/// Stages selected for a run, grouped into layers.
///
/// Every stage's dependencies live in earlier layers, so the stages of one
/// layer are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    layers: Vec<Vec<String>>,
}

impl Pipeline {
    /// Validate names, dependencies and acyclicity
    pub fn new(stages: Vec<Stage>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }

        let mut index = HashMap::with_capacity(stages.len());
        for (i, stage) in stages.iter().enumerate() {
            if index.insert(stage.name.clone(), i).is_some() {
                return Err(PipelineError::DuplicateStage(stage.name.clone()));
            }
        }

        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(stages.len(), 0);
        let nodes: Vec<NodeIndex> = (0..stages.len()).map(|i| graph.add_node(i)).collect();

        for (i, stage) in stages.iter().enumerate() {
            for dep in &stage.depends_on {
                let &d = index.get(dep).ok_or_else(|| PipelineError::UnknownDependency {
                    stage: stage.name.clone(),
                    dependency: dep.clone(),
                })?;
                graph.add_edge(nodes[d], nodes[i], ());
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| PipelineError::Cycle(stages[graph[cycle.node_id()]].name.clone()))?
            .into_iter()
            .map(|node| graph[node])
            .collect();

        Ok(Self {
            stages,
            index,
            order,
        })
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.index.get(name).map(|&i| &self.stages[i])
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Plan the dependency closure of `targets`; every stage when empty
    pub fn plan(&self, targets: &[String]) -> Result<Plan, PipelineError> {
        let selected: HashSet<usize> = if targets.is_empty() {
            (0..self.stages.len()).collect()
        } else {
            let mut selected = HashSet::new();
            let mut stack = Vec::new();
            for target in targets {
                let &i = self
                    .index
                    .get(target)
                    .ok_or_else(|| PipelineError::UnknownStage(target.clone()))?;
                stack.push(i);
            }
            while let Some(i) = stack.pop() {
                if selected.insert(i) {
                    stack.extend(self.stages[i].depends_on.iter().map(|d| self.index[d]));
                }
            }
            selected
        };

        // Longest-path depth from any root
        let mut depth: HashMap<usize, usize> = HashMap::new();
        for &i in self.order.iter().filter(|i| selected.contains(i)) {
            let d = self.stages[i]
                .depends_on
                .iter()
                .map(|dep| depth[&self.index[dep]] + 1)
                .max()
                .unwrap_or(0);
            depth.insert(i, d);
        }

        let layer_count = depth.values().copied().max().map_or(0, |d| d + 1);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for (&i, &d) in &depth {
            layers[d].push(i);
        }

        let layers = layers
            .into_iter()
            .map(|mut layer| {
                layer.sort_unstable();
                layer
                    .into_iter()
                    .map(|i| self.stages[i].name.clone())
                    .collect()
            })
            .collect();

        Ok(Plan { layers })
    }
}

impl Plan {
    pub fn layers(&self) -> &[Vec<String>] {
        &self.layers
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().flatten().map(String::as_str)
    }

    pub fn stage_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }
}
