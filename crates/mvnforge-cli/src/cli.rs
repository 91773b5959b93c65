use clap::{Parser, Subcommand};
use mvnforge_coord::{Component, Project};
use mvnforge_util::errors::{MvnError, MvnResult};

#[derive(Debug, Parser)]
#[command(name = "mvnforge", about = "Maven model builder and dependency enumerator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build and print the effective model for a coordinate.
    Describe {
        /// groupId:artifactId:version
        gav: String,
    },
    /// Print the direct (or transitive) dependencies of a coordinate.
    Resolve {
        gav: String,
        #[arg(long)]
        transitive: bool,
    },
    /// Print the transitive dependency tree of a coordinate.
    Tree { gav: String },
}

/// Parses a bare `groupId:artifactId:version` triple, the form this CLI's
/// commands accept (not the full canonical rendering `g:a:p:v:s` used
/// internally by [`mvnforge_coord::Dependency`]).
pub fn parse_gav(gav: &str) -> MvnResult<Component> {
    let parts: Vec<&str> = gav.split(':').collect();
    let [group_id, artifact_id, version] = parts[..] else {
        return Err(MvnError::Generic {
            message: format!("expected groupId:artifactId:version, got '{gav}'"),
        }
        .into());
    };
    let project = Project::new(group_id, artifact_id).ok_or_else(|| MvnError::Generic {
        message: format!("empty groupId or artifactId in '{gav}'"),
    })?;
    let component = Component::new(project, version).ok_or_else(|| MvnError::Generic {
        message: format!("empty version in '{gav}'"),
    })?;
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_gav() {
        let c = parse_gav("org.example:lib:1.0").unwrap();
        assert_eq!(c.project.group_id, "org.example");
        assert_eq!(c.version, "1.0");
    }

    #[test]
    fn rejects_wrong_part_count() {
        assert!(parse_gav("org.example:lib").is_err());
    }
}
