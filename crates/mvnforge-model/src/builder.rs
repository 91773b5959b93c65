//! The model builder: turns a requested coordinate into an effective
//! [`Model`] by walking the parent chain, activating default profiles,
//! interpolating properties, importing BOMs, and injecting managed
//! versions — phases A through G.

use std::collections::BTreeMap;

use mvnforge_coord::{Artifact, Component, Dependency, DependencyKey, Project, Scope};
use mvnforge_descriptor::{Descriptor, RawDependency};
use mvnforge_util::errors::MvnError;

use crate::environment::Environment;

/// The effective model for one coordinate: its own resolved identity, its
/// fully-interpolated properties, its (import-resolved) dependency
/// management table, and its final direct dependency list.
#[derive(Debug, Clone)]
pub struct Model {
    pub component: Component,
    pub packaging: String,
    pub properties: BTreeMap<String, String>,
    pub dependency_management: BTreeMap<DependencyKey, Dependency>,
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone)]
struct WorkingDependency {
    group_id: String,
    artifact_id: String,
    version: Option<String>,
    classifier: Option<String>,
    packaging: Option<String>,
    scope: Option<String>,
    optional: bool,
    exclusions: Vec<(String, String)>,
}

impl From<RawDependency> for WorkingDependency {
    fn from(raw: RawDependency) -> Self {
        WorkingDependency {
            group_id: raw.group_id,
            artifact_id: raw.artifact_id,
            version: raw.version,
            classifier: raw.classifier,
            packaging: raw.packaging,
            scope: raw.scope,
            optional: raw.optional,
            exclusions: raw
                .exclusions
                .into_iter()
                .map(|e| (e.group_id, e.artifact_id))
                .collect(),
        }
    }
}

fn management_key(w: &WorkingDependency) -> DependencyKey {
    (
        w.group_id.clone(),
        w.artifact_id.clone(),
        w.classifier.clone().unwrap_or_default(),
        w.packaging.clone().unwrap_or_else(|| "jar".to_string()),
    )
}

/// Builds the effective model for `component`. This is the single entry
/// point used both for the requested project itself and, recursively, for
/// every BOM a dependency-management `import` refers to.
pub fn build(component: &Component, env: &Environment) -> Result<Model, MvnError> {
    // Phase A + C: seed and walk the parent chain, leaf first.
    let chain = load_inheritance_chain(component, env)?;

    let mut properties: BTreeMap<String, String> = BTreeMap::new();
    let mut management: Vec<WorkingDependency> = Vec::new();
    let mut management_index: BTreeMap<DependencyKey, usize> = BTreeMap::new();
    let mut dependencies: Vec<WorkingDependency> = Vec::new();
    let mut dependency_index: BTreeMap<DependencyKey, usize> = BTreeMap::new();
    let mut packaging = "jar".to_string();

    // Root to leaf, so a descendant's declarations override its ancestor's.
    for descriptor in chain.iter().rev() {
        let (own_properties, own_deps, own_mgmt) = effective_own(descriptor);

        for (k, v) in own_properties {
            properties.insert(k, v);
        }

        for raw in own_mgmt {
            let working: WorkingDependency = raw.into();
            let key = management_key(&working);
            match management_index.get(&key) {
                Some(&idx) => management[idx] = working,
                None => {
                    management_index.insert(key, management.len());
                    management.push(working);
                }
            }
        }

        for raw in own_deps {
            let working: WorkingDependency = raw.into();
            let key = management_key(&working);
            match dependency_index.get(&key) {
                Some(&idx) => dependencies[idx] = working,
                None => {
                    dependency_index.insert(key, dependencies.len());
                    dependencies.push(working);
                }
            }
        }

        packaging = descriptor.packaging();
    }

    // Phase D: interpolate properties over themselves and project well-knowns.
    let well_known = well_known_properties(component, &packaging);
    let properties = interpolate_properties(&properties, &well_known)?;

    // Phase E: interpolate property references inside dependency coordinates.
    for dep in management.iter_mut().chain(dependencies.iter_mut()) {
        dep.group_id = substitute(&dep.group_id, &properties, &well_known);
        dep.artifact_id = substitute(&dep.artifact_id, &properties, &well_known);
        dep.version = dep
            .version
            .as_deref()
            .map(|v| substitute(v, &properties, &well_known));
        dep.classifier = dep
            .classifier
            .as_deref()
            .map(|v| substitute(v, &properties, &well_known));
    }

    // Phase F: resolve dependency-management `scope=import, type=pom` entries.
    let management = resolve_bom_imports(management, env)?;
    let mut management_table: BTreeMap<DependencyKey, Dependency> = BTreeMap::new();
    for working in management {
        let key = management_key(&working);
        if let Ok(dep) = finish_dependency(&working) {
            management_table.entry(key).or_insert(dep);
        }
    }

    // Phase G: inject managed versions into dependencies that omit one.
    let mut resolved_dependencies = Vec::with_capacity(dependencies.len());
    for mut working in dependencies {
        let key = management_key(&working);
        if working.version.is_none() {
            if let Some(managed) = management_table.get(&key) {
                working.version = Some(managed.artifact.component.version.clone());
                if working.scope.is_none() {
                    working.scope = Some(managed.scope.to_string());
                }
                if working.exclusions.is_empty() {
                    working.exclusions = managed
                        .exclusions
                        .iter()
                        .map(|p| (p.group_id.clone(), p.artifact_id.clone()))
                        .collect();
                }
            }
        }
        resolved_dependencies.push(finish_dependency(&working)?);
    }

    Ok(Model {
        component: component.clone(),
        packaging,
        properties,
        dependency_management: management_table,
        dependencies: resolved_dependencies,
    })
}

fn finish_dependency(w: &WorkingDependency) -> Result<Dependency, MvnError> {
    let project = Project::new(w.group_id.clone(), w.artifact_id.clone()).ok_or_else(|| {
        MvnError::DescriptorMalformed {
            coordinate: format!("{}:{}", w.group_id, w.artifact_id),
            message: "empty groupId or artifactId".to_string(),
        }
    })?;
    let version = w.version.clone().ok_or_else(|| MvnError::UnresolvedVersion {
        coordinate: project.to_string(),
    })?;
    let component = Component::new(project, version.clone()).ok_or_else(|| {
        MvnError::UnresolvedVersion {
            coordinate: format!("{}:{}", w.group_id, w.artifact_id),
        }
    })?;
    let artifact = Artifact::new(component, w.classifier.clone(), w.packaging.clone());
    let scope = w
        .scope
        .as_deref()
        .and_then(|s| s.parse::<Scope>().ok())
        .unwrap_or_default();
    let exclusions = w
        .exclusions
        .iter()
        .filter_map(|(g, a)| Project::new(g.clone(), a.clone()))
        .collect();

    Ok(Dependency {
        artifact,
        scope,
        optional: w.optional,
        exclusions,
    })
}

fn raw_dependency_key(raw: &RawDependency) -> DependencyKey {
    (
        raw.group_id.clone(),
        raw.artifact_id.clone(),
        raw.classifier.clone().unwrap_or_default(),
        raw.packaging.clone().unwrap_or_else(|| "jar".to_string()),
    )
}

/// Collects a descriptor's own properties/dependencies/dependency-management,
/// folding in every `activeByDefault` profile's contributions. Profiles never
/// override a value the descriptor itself already declares — a profile entry
/// only fills in a key D's own declarations leave absent. No other
/// activation condition (`os`/`jdk`/`property`/`file`) is evaluated.
fn effective_own(
    descriptor: &Descriptor,
) -> (BTreeMap<String, String>, Vec<RawDependency>, Vec<RawDependency>) {
    let mut properties = descriptor.properties();
    let mut dependencies = descriptor.dependencies();
    let mut management = descriptor.managed_dependencies();

    let mut dependency_keys: std::collections::HashSet<DependencyKey> =
        dependencies.iter().map(raw_dependency_key).collect();
    let mut management_keys: std::collections::HashSet<DependencyKey> =
        management.iter().map(raw_dependency_key).collect();

    for profile in descriptor.profiles() {
        if !profile.active_by_default {
            continue;
        }
        for (k, v) in profile.properties {
            properties.entry(k).or_insert(v);
        }
        for dep in profile.dependencies {
            let key = raw_dependency_key(&dep);
            if dependency_keys.insert(key) {
                dependencies.push(dep);
            }
        }
        for dep in profile.dependency_management {
            let key = raw_dependency_key(&dep);
            if management_keys.insert(key) {
                management.push(dep);
            }
        }
    }

    (properties, dependencies, management)
}

/// Loads the descriptor for `component` and every ancestor's, leaf first.
/// Detects cycles in the parent chain itself (a malformed or adversarial
/// repository could otherwise loop forever). A parent reference is resolved
/// via its `relativePath` first, but only trusted if the file found there
/// declares exactly the `(groupId, artifactId, version)` the reference
/// names; any absence or identity mismatch falls back to a repository
/// lookup by coordinate.
fn load_inheritance_chain(
    component: &Component,
    env: &Environment,
) -> Result<Vec<Descriptor>, MvnError> {
    let mut chain = Vec::new();
    let mut visited = std::collections::HashSet::new();
    let mut current = component.clone();
    let mut current_path = env.descriptor_path_for(&current)?;

    loop {
        let marker = current.to_string();
        if !visited.insert(marker) {
            return Err(MvnError::ParentCycle {
                coordinate: component.to_string(),
            });
        }

        let descriptor = Descriptor::parse(&current_path)?;
        let parent = descriptor.parent();
        chain.push(descriptor);

        let parent_ref = match parent {
            Some(parent_ref) => parent_ref,
            None => break,
        };

        let project = Project::new(parent_ref.group_id.clone(), parent_ref.artifact_id.clone())
            .ok_or_else(|| MvnError::DescriptorMalformed {
                coordinate: current.to_string(),
                message: "parent reference missing groupId/artifactId".to_string(),
            })?;
        let parent_component = Component::new(project, parent_ref.version.clone()).ok_or_else(|| {
            MvnError::DescriptorMalformed {
                coordinate: current.to_string(),
                message: "parent reference missing version".to_string(),
            }
        })?;

        let via_relative_path = parent_ref.relative_path.as_deref().and_then(|rel| {
            let mut candidate = current_path.parent()?.join(rel);
            if candidate.is_dir() {
                candidate = candidate.join("pom.xml");
            }
            let parsed = Descriptor::parse(&candidate).ok()?;
            let identity_matches = parsed.group_id().as_deref()
                == Some(parent_component.project.group_id.as_str())
                && parsed.artifact_id().as_deref()
                    == Some(parent_component.project.artifact_id.as_str())
                && parsed.version().as_deref() == Some(parent_component.version.as_str());
            identity_matches.then_some(candidate)
        });

        current_path = match via_relative_path {
            Some(path) => path,
            None => env.descriptor_path_for(&parent_component)?,
        };
        current = parent_component;
    }

    Ok(chain)
}

fn well_known_properties(component: &Component, packaging: &str) -> BTreeMap<String, String> {
    let mut well_known = BTreeMap::new();
    well_known.insert("project.groupId".to_string(), component.project.group_id.clone());
    well_known.insert(
        "project.artifactId".to_string(),
        component.project.artifact_id.clone(),
    );
    well_known.insert("project.version".to_string(), component.version.clone());
    well_known.insert("project.packaging".to_string(), packaging.to_string());
    well_known.insert("pom.version".to_string(), component.version.clone());
    well_known
}

/// Expands `${...}` references in every property value, reading from both
/// the project's well-known fields and the (still-unexpanded) property map
/// itself, detecting self-referential cycles as they're discovered.
fn interpolate_properties(
    raw: &BTreeMap<String, String>,
    well_known: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, MvnError> {
    let mut resolved = BTreeMap::new();
    for key in raw.keys() {
        let mut visiting = Vec::new();
        let value = resolve_property(key, raw, well_known, &mut resolved, &mut visiting)?;
        resolved.insert(key.clone(), value);
    }
    Ok(resolved)
}

fn resolve_property(
    name: &str,
    raw: &BTreeMap<String, String>,
    well_known: &BTreeMap<String, String>,
    resolved: &mut BTreeMap<String, String>,
    visiting: &mut Vec<String>,
) -> Result<String, MvnError> {
    if let Some(value) = resolved.get(name) {
        return Ok(value.clone());
    }
    if visiting.contains(&name.to_string()) {
        return Err(MvnError::InterpolationCycle {
            property: name.to_string(),
        });
    }
    let raw_value = match raw.get(name) {
        Some(v) => v.clone(),
        None => return Ok(format!("${{{name}}}")),
    };
    visiting.push(name.to_string());
    let expanded = expand(&raw_value, raw, well_known, resolved, visiting)?;
    visiting.pop();
    resolved.insert(name.to_string(), expanded.clone());
    Ok(expanded)
}

fn expand(
    text: &str,
    raw: &BTreeMap<String, String>,
    well_known: &BTreeMap<String, String>,
    resolved: &mut BTreeMap<String, String>,
    visiting: &mut Vec<String>,
) -> Result<String, MvnError> {
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                let value = if let Some(v) = well_known.get(name) {
                    v.clone()
                } else if raw.contains_key(name) {
                    resolve_property(name, raw, well_known, resolved, visiting)?
                } else {
                    format!("${{{name}}}")
                };
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            None => {
                out.push_str("${");
                rest = after;
                break;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// A single-shot substitution against already-fully-interpolated maps, used
/// for dependency coordinates (phase E) where no new cycle can arise.
fn substitute(text: &str, properties: &BTreeMap<String, String>, well_known: &BTreeMap<String, String>) -> String {
    let mut resolved = properties.clone();
    let mut visiting = Vec::new();
    expand(text, properties, well_known, &mut resolved, &mut visiting)
        .unwrap_or_else(|_| text.to_string())
}

/// Replaces every `scope=import, type=pom` dependency-management entry with
/// the imported BOM's own (fully resolved) management table, in place.
/// Entries the importing descriptor already declares win over an imported
/// one; among competing imports, the earlier import wins — both are
/// "first seen wins" at this merge step.
fn resolve_bom_imports(
    entries: Vec<WorkingDependency>,
    env: &Environment,
) -> Result<Vec<WorkingDependency>, MvnError> {
    let mut merged: Vec<WorkingDependency> = Vec::new();
    let mut seen: std::collections::HashSet<DependencyKey> = std::collections::HashSet::new();

    for entry in entries {
        let is_import = entry.scope.as_deref() == Some("import")
            && entry.packaging.as_deref() == Some("pom");

        if !is_import {
            let key = management_key(&entry);
            if seen.insert(key) {
                merged.push(entry);
            }
            continue;
        }

        let project = Project::new(entry.group_id.clone(), entry.artifact_id.clone()).ok_or_else(
            || MvnError::DescriptorMalformed {
                coordinate: format!("{}:{}", entry.group_id, entry.artifact_id),
                message: "BOM import missing groupId/artifactId".to_string(),
            },
        )?;
        let version = entry.version.clone().ok_or_else(|| MvnError::UnresolvedVersion {
            coordinate: project.to_string(),
        })?;
        let component = Component::new(project, version).ok_or_else(|| MvnError::UnresolvedVersion {
            coordinate: format!("{}:{}", entry.group_id, entry.artifact_id),
        })?;

        let imported = build(&component, env).map_err(|e| MvnError::ImportFailure {
            coordinate: component.to_string(),
            source: Box::new(e),
        })?;

        for (key, dep) in imported.dependency_management {
            if seen.insert(key) {
                merged.push(WorkingDependency {
                    group_id: dep.artifact.component.project.group_id,
                    artifact_id: dep.artifact.component.project.artifact_id,
                    version: Some(dep.artifact.component.version),
                    classifier: Some(dep.artifact.classifier),
                    packaging: Some(dep.artifact.packaging),
                    scope: Some(dep.scope.to_string()),
                    optional: dep.optional,
                    exclusions: dep
                        .exclusions
                        .into_iter()
                        .map(|p| (p.group_id, p.artifact_id))
                        .collect(),
                });
            }
        }
    }

    Ok(merged)
}
