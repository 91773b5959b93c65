//! Typed accessor over a raw project descriptor (a POM-shaped document).
//!
//! This crate never interprets inheritance, property interpolation, or
//! dependency-management import — it only exposes the descriptor's own
//! literal content as typed values. The model builder composes several
//! descriptors (walking up the parent chain, importing BOMs) and is where
//! those semantics live.

use std::collections::BTreeMap;
use std::path::Path;

use mvnforge_util::errors::MvnError;
use mvnforge_xml::{XmlDocument, XmlElement};

/// A `<parent>` reference: the coordinate of the descriptor one level up the
/// inheritance chain, plus the filesystem hint for locating it locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExclusion {
    pub group_id: String,
    pub artifact_id: String,
}

/// A `<dependency>` exactly as written: no coordinate defaulting, no
/// inherited scope, no property expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub packaging: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub exclusions: Vec<RawExclusion>,
}

/// A `<developer>` or `<contributor>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Person {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
}

/// A `<profile>`, with its own conditionally-applied properties,
/// dependencies, and dependency management. Activation conditions
/// (`os`/`jdk`/`property`/`file`) are parsed but never evaluated; only
/// `activeByDefault` drives activation, per this workspace's scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProfile {
    pub id: String,
    pub active_by_default: bool,
    pub activators: Vec<Activator>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<RawDependency>,
    pub dependency_management: Vec<RawDependency>,
}

/// A recognized, but never evaluated, activation condition. Parsed purely
/// so a profile's intent is visible (`mvnforge describe` can show it); only
/// `activeByDefault` actually drives activation in this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activator {
    Os { name: Option<String>, family: Option<String>, arch: Option<String> },
    Jdk { version: String },
    Property { name: String, value: Option<String> },
    File { exists: Option<String>, missing: Option<String> },
}

fn parse_activators(activation: &XmlElement) -> Vec<Activator> {
    let mut activators = Vec::new();
    if let Some(os) = activation.element("os").ok().flatten() {
        activators.push(Activator::Os {
            name: os.value("name"),
            family: os.value("family"),
            arch: os.value("arch"),
        });
    }
    if let Some(version) = activation.value("jdk") {
        activators.push(Activator::Jdk { version });
    }
    if let Some(property) = activation.element("property").ok().flatten() {
        activators.push(Activator::Property {
            name: property.value("name").unwrap_or_default(),
            value: property.value("value"),
        });
    }
    if let Some(file) = activation.element("file").ok().flatten() {
        activators.push(Activator::File {
            exists: file.value("exists"),
            missing: file.value("missing"),
        });
    }
    activators
}

/// A parsed project descriptor, exposing its own literal fields.
#[derive(Debug, Clone)]
pub struct Descriptor {
    root: XmlElement,
}

impl Descriptor {
    pub fn parse(path: &Path) -> Result<Self, MvnError> {
        let doc = XmlDocument::parse(path)?;
        Ok(Descriptor { root: doc.root })
    }

    pub fn parse_str(input: &str) -> Result<Self, MvnError> {
        let doc = XmlDocument::parse_str(input)?;
        Ok(Descriptor { root: doc.root })
    }

    /// `groupId`, falling back to the parent's if the descriptor omits its
    /// own (standard Maven inheritance shorthand).
    pub fn group_id(&self) -> Option<String> {
        self.root
            .value("groupId")
            .or_else(|| self.root.value("parent/groupId"))
    }

    pub fn artifact_id(&self) -> Option<String> {
        self.root.value("artifactId")
    }

    /// `version`, falling back to the parent's.
    pub fn version(&self) -> Option<String> {
        self.root
            .value("version")
            .or_else(|| self.root.value("parent/version"))
    }

    pub fn packaging(&self) -> String {
        self.root.value("packaging").unwrap_or_else(|| "jar".to_string())
    }

    pub fn parent(&self) -> Option<ParentRef> {
        let parent = self.root.elements("parent").into_iter().next()?;
        Some(ParentRef {
            group_id: parent.value("groupId").unwrap_or_default(),
            artifact_id: parent.value("artifactId").unwrap_or_default(),
            version: parent.value("version").unwrap_or_default(),
            relative_path: parent.value("relativePath"),
        })
    }

    /// This descriptor's own `<properties>`, as a literal name→text map
    /// (unexpanded — `${...}` references are left untouched).
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for props in self.root.elements("properties") {
            for child in &props.children {
                out.insert(child.name.clone(), child.text.clone());
            }
        }
        out
    }

    pub fn dependencies(&self) -> Vec<RawDependency> {
        self.root
            .elements("dependencies/dependency")
            .into_iter()
            .map(parse_dependency)
            .collect()
    }

    pub fn managed_dependencies(&self) -> Vec<RawDependency> {
        self.root
            .elements("dependencyManagement/dependencies/dependency")
            .into_iter()
            .map(parse_dependency)
            .collect()
    }

    pub fn profiles(&self) -> Vec<RawProfile> {
        self.root
            .elements("profiles/profile")
            .into_iter()
            .map(parse_profile)
            .collect()
    }

    /// `<developers><developer>...` or `<contributors><contributor>...`,
    /// in document order (founders-first, per convention).
    pub fn people(&self, path: &str) -> Vec<Person> {
        self.root.elements(path).into_iter().map(parse_person).collect()
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

fn parse_dependency(el: &XmlElement) -> RawDependency {
    RawDependency {
        group_id: el.value("groupId").unwrap_or_default(),
        artifact_id: el.value("artifactId").unwrap_or_default(),
        version: el.value("version"),
        classifier: el.value("classifier"),
        packaging: el.value("type"),
        scope: el.value("scope"),
        optional: el.value("optional").as_deref() == Some("true"),
        exclusions: el
            .elements("exclusions/exclusion")
            .into_iter()
            .map(|e| RawExclusion {
                group_id: e.value("groupId").unwrap_or_default(),
                artifact_id: e.value("artifactId").unwrap_or_default(),
            })
            .collect(),
    }
}

fn parse_profile(el: &XmlElement) -> RawProfile {
    let mut properties = BTreeMap::new();
    for props in el.elements("properties") {
        for child in &props.children {
            properties.insert(child.name.clone(), child.text.clone());
        }
    }
    let activators = el
        .element("activation")
        .ok()
        .flatten()
        .map(parse_activators)
        .unwrap_or_default();

    RawProfile {
        id: el.value("id").unwrap_or_default(),
        active_by_default: el
            .value("activation/activeByDefault")
            .as_deref()
            == Some("true"),
        activators,
        properties,
        dependencies: el
            .elements("dependencies/dependency")
            .into_iter()
            .map(parse_dependency)
            .collect(),
        dependency_management: el
            .elements("dependencyManagement/dependencies/dependency")
            .into_iter()
            .map(parse_dependency)
            .collect(),
    }
}

fn parse_person(el: &XmlElement) -> Person {
    Person {
        id: el.value("id"),
        name: el.value("name"),
        email: el.value("email"),
        roles: el
            .elements("roles/role")
            .into_iter()
            .map(|r| r.text.clone())
            .collect(),
    }
}
