use std::collections::HashMap;

use mvnforge_coord::{Component, Project, Scope};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// The transitive dependency graph: one node per resolved `(groupId,
/// artifactId)`, carrying its winning [`Component`]; edges carry the
/// effective scope under which the edge's target was reached.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Component, Scope>,
    index: HashMap<Project, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or updates, if already present) the node for this
    /// component's project, returning its index.
    pub fn node_for(&mut self, component: &Component) -> NodeIndex {
        if let Some(&idx) = self.index.get(&component.project) {
            self.graph[idx] = component.clone();
            return idx;
        }
        let idx = self.graph.add_node(component.clone());
        self.index.insert(component.project.clone(), idx);
        idx
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, scope: Scope) {
        self.graph.add_edge(from, to, scope);
    }

    pub fn root_index(&self, project: &Project) -> Option<NodeIndex> {
        self.index.get(project).copied()
    }

    pub fn children_of(&self, idx: NodeIndex) -> impl Iterator<Item = (&Component, Scope)> {
        self.graph
            .edges(idx)
            .map(|edge| (&self.graph[edge.target()], *edge.weight()))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.graph.node_weights()
    }

    pub fn contains(&self, project: &Project) -> bool {
        self.index.contains_key(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvnforge_coord::Project;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_for_reuses_existing_node() {
        let mut graph = DependencyGraph::new();
        let project = Project::new("org.example", "lib").unwrap();
        let c1 = Component::new(project.clone(), "1.0").unwrap();
        let c2 = Component::new(project, "2.0").unwrap();
        let idx1 = graph.node_for(&c1);
        let idx2 = graph.node_for(&c2);
        assert_eq!(idx1, idx2);
        assert_eq!(graph.len(), 1);
    }
}
