//! Transitive dependency enumeration: breadth-first, nearest-wins,
//! first-seen-at-a-given-depth conflict resolution, honoring exclusions,
//! optional flags, and Maven's scope-propagation rules.

use std::collections::{BTreeSet, HashMap, VecDeque};

use mvnforge_coord::{Component, Dependency, Project, Scope};
use petgraph::graph::NodeIndex;

use crate::builder::{self, Model};
use crate::conflict::ConflictReport;
use crate::environment::Environment;
use crate::graph::DependencyGraph;
use mvnforge_util::errors::MvnError;

/// One entry in the final nearest-wins resolved set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedDependency {
    pub component: Component,
    pub scope: Scope,
    pub depth: usize,
}

pub struct EnumerationResult {
    pub resolved: Vec<EnumeratedDependency>,
    pub graph: DependencyGraph,
    pub conflicts: ConflictReport,
}

struct QueueItem {
    parent_idx: NodeIndex,
    dependency: Dependency,
    depth: usize,
    inherited_exclusions: BTreeSet<Project>,
    parent_scope: Option<Scope>,
}

/// Combines a parent edge's effective scope with a child's own declared
/// scope. `None` means the child does not propagate under this parent at
/// all (Maven does not carry `provided`/`test`/`system`-scoped dependencies
/// further than the project that declares them).
fn combine_scope(parent: Scope, child: Scope) -> Option<Scope> {
    match child {
        Scope::Provided | Scope::Test | Scope::System | Scope::Import => None,
        _ => match parent {
            Scope::Compile => Some(child),
            Scope::Runtime => Some(Scope::Runtime),
            _ => None,
        },
    }
}

/// The direct "runtime view": `model.dependencies` filtered to the scopes
/// that actually ship at runtime (`compile`, `runtime`), with no traversal.
pub fn runtime_view(model: &Model) -> Vec<&Dependency> {
    model
        .dependencies
        .iter()
        .filter(|dep| matches!(dep.scope, Scope::Compile | Scope::Runtime))
        .collect()
}

/// Enumerates `root`'s dependencies. When `transitive` is `false`, this is
/// just the depth-1 [`runtime_view`] wrapped in an [`EnumerationResult`] (no
/// traversal, no conflicts). When `true`, performs the full breadth-first
/// nearest-wins walk described in this module's header.
pub fn enumerate(
    root: &Model,
    env: &Environment,
    transitive: bool,
) -> Result<EnumerationResult, MvnError> {
    let mut graph = DependencyGraph::new();
    let root_idx = graph.node_for(&root.component);

    if !transitive {
        let mut resolved_list = Vec::new();
        for dep in runtime_view(root) {
            let component = dep.artifact.component.clone();
            let node_idx = graph.node_for(&component);
            graph.add_edge(root_idx, node_idx, dep.scope);
            resolved_list.push(EnumeratedDependency {
                component,
                scope: dep.scope,
                depth: 1,
            });
        }
        resolved_list.sort_by(|a, b| a.component.to_string().cmp(&b.component.to_string()));
        return Ok(EnumerationResult {
            resolved: resolved_list,
            graph,
            conflicts: ConflictReport::new(),
        });
    }

    let mut conflicts = ConflictReport::new();
    let mut resolved: HashMap<Project, (Component, Scope, usize)> = HashMap::new();

    let mut queue: VecDeque<QueueItem> = VecDeque::new();
    for dep in &root.dependencies {
        queue.push_back(QueueItem {
            parent_idx: root_idx,
            dependency: dep.clone(),
            depth: 1,
            inherited_exclusions: dep.exclusions.clone(),
            parent_scope: None,
        });
    }

    while let Some(item) = queue.pop_front() {
        let component = item.dependency.artifact.component.clone();
        let project = component.project.clone();

        if item.inherited_exclusions.contains(&project) {
            continue;
        }

        let effective_scope = match item.parent_scope {
            None => item.dependency.scope,
            Some(parent_scope) => match combine_scope(parent_scope, item.dependency.scope) {
                Some(scope) => scope,
                None => continue,
            },
        };

        let (node_idx, is_winning_occurrence) = match resolved.get(&project) {
            Some((existing_component, _, existing_depth)) => {
                if existing_component.version != component.version {
                    conflicts.record_loss(
                        &project,
                        &existing_component.version,
                        *existing_depth,
                        &component.version,
                        item.depth,
                    );
                }
                (graph.node_for(existing_component), false)
            }
            None => {
                resolved.insert(project.clone(), (component.clone(), effective_scope, item.depth));
                (graph.node_for(&component), true)
            }
        };
        graph.add_edge(item.parent_idx, node_idx, effective_scope);

        let propagates = matches!(effective_scope, Scope::Compile | Scope::Runtime);
        if is_winning_occurrence && propagates && !item.dependency.optional {
            let child_model = builder::build(&component, env)?;
            let mut child_exclusions = item.inherited_exclusions.clone();
            child_exclusions.extend(item.dependency.exclusions.iter().cloned());
            for child_dep in child_model.dependencies {
                queue.push_back(QueueItem {
                    parent_idx: node_idx,
                    dependency: child_dep,
                    depth: item.depth + 1,
                    inherited_exclusions: child_exclusions.clone(),
                    parent_scope: Some(effective_scope),
                });
            }
        }
    }

    let mut resolved_list: Vec<EnumeratedDependency> = resolved
        .into_values()
        .map(|(component, scope, depth)| EnumeratedDependency {
            component,
            scope,
            depth,
        })
        .collect();
    resolved_list.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.component.to_string().cmp(&b.component.to_string()))
    });

    Ok(EnumerationResult {
        resolved: resolved_list,
        graph,
        conflicts,
    })
}
