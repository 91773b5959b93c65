//! Coordinate algebra: value types identifying a Maven-style artifact and
//! its dependency relationships, with structural equality, hashing, and a
//! canonical string rendering that round-trips through [`std::str::FromStr`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A groupId/artifactId pair. Identity is `(group_id, artifact_id)`.
///
/// Invariant: both fields are non-empty. Constructed only via [`Project::new`],
/// which enforces this.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Project {
    pub group_id: String,
    pub artifact_id: String,
}

impl Project {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Option<Self> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        if group_id.is_empty() || artifact_id.is_empty() {
            return None;
        }
        Some(Self {
            group_id,
            artifact_id,
        })
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A [`Project`] at a specific version.
///
/// Invariant: version is non-empty. A snapshot component's version ends in
/// the literal `-SNAPSHOT`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component {
    pub project: Project,
    pub version: String,
}

impl Component {
    pub fn new(project: Project, version: impl Into<String>) -> Option<Self> {
        let version = version.into();
        if version.is_empty() {
            return None;
        }
        Some(Self { project, version })
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with("-SNAPSHOT")
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.version)
    }
}

/// A [`Component`] plus classifier and packaging.
///
/// Classifier may be empty (normalized from `None`); packaging defaults to
/// `jar` for code artifacts and `pom` when referring to a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Artifact {
    pub component: Component,
    pub classifier: String,
    pub packaging: String,
}

impl Artifact {
    pub fn new(
        component: Component,
        classifier: Option<impl Into<String>>,
        packaging: Option<impl Into<String>>,
    ) -> Self {
        Self {
            component,
            classifier: classifier.map(Into::into).unwrap_or_default(),
            packaging: packaging.map(Into::into).unwrap_or_else(|| "jar".to_string()),
        }
    }

    /// The filesystem filename for this artifact:
    /// `artifactId-version[-classifier].packaging`.
    pub fn filename(&self) -> String {
        let a = &self.component.project.artifact_id;
        let v = &self.component.version;
        if self.classifier.is_empty() {
            format!("{a}-{v}.{}", self.packaging)
        } else {
            format!("{a}-{v}-{}.{}", self.classifier, self.packaging)
        }
    }

    /// The path suffix under a repository root:
    /// `g1/g2/…/artifactId/version/filename`.
    pub fn path_suffix(&self) -> String {
        let g = self.component.project.group_id.replace('.', "/");
        let a = &self.component.project.artifact_id;
        let v = &self.component.version;
        format!("{g}/{a}/{v}/{}", self.filename())
    }
}

impl fmt::Display for Artifact {
    /// Canonical form `g:a:p[:c]:v` — packaging, then classifier (if any),
    /// then version; matches [`FromStr`]'s reading order exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.component.project, self.packaging)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.component.version)
    }
}

/// Dependency scope. Defaults to `Compile` when absent from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    Import,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Compile
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized scope: {0}")]
pub struct ScopeParseError(String);

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "import" => Ok(Scope::Import),
            other => Err(ScopeParseError(other.to_string())),
        }
    }
}

/// A dependency edge: an [`Artifact`] with a scope, an optionality flag, and
/// an exclusion set of [`Project`]s that must never be traversed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub artifact: Artifact,
    pub scope: Scope,
    pub optional: bool,
    pub exclusions: BTreeSet<Project>,
}

/// The four-tuple key Maven uses to match a direct dependency against a
/// `dependencyManagement` entry: `(groupId, artifactId, classifier, type)`.
pub type DependencyKey = (String, String, String, String);

impl Dependency {
    pub fn key(&self) -> DependencyKey {
        (
            self.artifact.component.project.group_id.clone(),
            self.artifact.component.project.artifact_id.clone(),
            self.artifact.classifier.clone(),
            self.artifact.packaging.clone(),
        )
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact)?;
        write!(f, ":{}", self.scope)?;
        if self.optional {
            write!(f, " (optional)")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinateParseError {
    #[error("coordinate string must have at least groupId:artifactId, got '{0}'")]
    TooFewParts(String),
    #[error("empty groupId or artifactId in '{0}'")]
    EmptyIdentity(String),
    #[error(transparent)]
    Scope(#[from] ScopeParseError),
}

impl FromStr for Dependency {
    type Err = CoordinateParseError;

    /// Parses the canonical form this crate renders via [`Display`]:
    /// `g:a:p[:c]:v:s[ (optional)]`, as well as the shorter forms
    /// `g:a:v` and `g:a:p:v` (packaging defaults to `jar`, scope to
    /// `compile`, classifier to empty) for convenience when reading
    /// hand-written coordinates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, optional) = match s.strip_suffix(" (optional)") {
            Some(stripped) => (stripped, true),
            None => (s, false),
        };
        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() < 2 {
            return Err(CoordinateParseError::TooFewParts(s.to_string()));
        }
        let group_id = parts[0];
        let artifact_id = parts[1];
        if group_id.is_empty() || artifact_id.is_empty() {
            return Err(CoordinateParseError::EmptyIdentity(s.to_string()));
        }

        let (packaging, classifier, version, scope) = match parts.len() {
            2 => ("jar", "", "", Scope::Compile),
            3 => ("jar", "", parts[2], Scope::Compile),
            4 => (parts[2], "", parts[3], Scope::Compile),
            5 => {
                if let Ok(scope) = parts[4].parse::<Scope>() {
                    (parts[2], "", parts[3], scope)
                } else {
                    (parts[2], parts[3], parts[4], Scope::Compile)
                }
            }
            _ => (parts[2], parts[3], parts[4], parts[5].parse::<Scope>()?),
        };

        let project = Project::new(group_id, artifact_id)
            .ok_or_else(|| CoordinateParseError::EmptyIdentity(s.to_string()))?;
        let component = Component::new(project, version).unwrap_or_else(|| Component {
            project: Project {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
            },
            version: String::new(),
        });
        let artifact = Artifact::new(
            component,
            Some(classifier).filter(|c| !c.is_empty()),
            Some(packaging),
        );

        Ok(Dependency {
            artifact,
            scope,
            optional,
            exclusions: BTreeSet::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_rejects_empty_fields() {
        assert!(Project::new("", "a").is_none());
        assert!(Project::new("g", "").is_none());
        assert!(Project::new("g", "a").is_some());
    }

    #[test]
    fn artifact_filename_omits_empty_classifier() {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "1.0.0").unwrap();
        let artifact = Artifact::new(component, None::<String>, None::<String>);
        assert_eq!(artifact.filename(), "lib-1.0.0.jar");
    }

    #[test]
    fn artifact_filename_includes_classifier() {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "1.0.0").unwrap();
        let artifact = Artifact::new(component, Some("sources"), None::<String>);
        assert_eq!(artifact.filename(), "lib-1.0.0-sources.jar");
    }

    #[test]
    fn path_suffix_replaces_dots() {
        let project = Project::new("org.example.sub", "lib").unwrap();
        let component = Component::new(project, "1.0.0").unwrap();
        let artifact = Artifact::new(component, None::<String>, None::<String>);
        assert_eq!(
            artifact.path_suffix(),
            "org/example/sub/lib/1.0.0/lib-1.0.0.jar"
        );
    }

    #[test]
    fn scope_defaults_to_compile() {
        assert_eq!(Scope::default(), Scope::Compile);
    }

    #[test]
    fn coordinate_round_trip_full_form() {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "1.0.0").unwrap();
        let artifact = Artifact::new(component, Some("linux-x86_64"), Some("so"));
        let dep = Dependency {
            artifact,
            scope: Scope::Runtime,
            optional: true,
            exclusions: BTreeSet::new(),
        };
        let rendered = dep.to_string();
        let parsed: Dependency = rendered.parse().unwrap();
        assert_eq!(parsed.artifact, dep.artifact);
        assert_eq!(parsed.scope, dep.scope);
        assert_eq!(parsed.optional, dep.optional);
        assert_eq!(parsed.to_string(), rendered);
    }

    #[test]
    fn coordinate_round_trip_no_classifier() {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "2.3.4").unwrap();
        let artifact = Artifact::new(component, None::<String>, Some("jar"));
        let dep = Dependency {
            artifact,
            scope: Scope::Compile,
            optional: false,
            exclusions: BTreeSet::new(),
        };
        let rendered = dep.to_string();
        assert_eq!(rendered, "org.example:lib:jar:2.3.4:compile");
        let parsed: Dependency = rendered.parse().unwrap();
        assert_eq!(parsed, dep);
    }

    #[test]
    fn short_form_parses_with_defaults() {
        let dep: Dependency = "org.example:lib:1.0.0".parse().unwrap();
        assert_eq!(dep.artifact.packaging, "jar");
        assert_eq!(dep.artifact.classifier, "");
        assert_eq!(dep.scope, Scope::Compile);
        assert!(!dep.optional);
    }

    #[test]
    fn dependency_key_matches_four_tuple() {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "1.0.0").unwrap();
        let artifact = Artifact::new(component, Some("sources"), Some("jar"));
        let dep = Dependency {
            artifact,
            scope: Scope::Compile,
            optional: false,
            exclusions: BTreeSet::new(),
        };
        assert_eq!(
            dep.key(),
            (
                "org.example".to_string(),
                "lib".to_string(),
                "sources".to_string(),
                "jar".to_string()
            )
        );
    }
}
