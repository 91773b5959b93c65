use mvnforge_coord::Artifact;

/// A single remote Maven repository: an id (used for credential lookup and
/// diagnostics) plus a base URL. Repositories are tried in configuration
/// order until one serves the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenRepository {
    pub id: String,
    pub base_url: String,
    pub snapshots_enabled: bool,
}

impl MavenRepository {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        MavenRepository {
            id: id.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            snapshots_enabled: true,
        }
    }

    pub fn without_snapshots(mut self) -> Self {
        self.snapshots_enabled = false;
        self
    }

    /// The URL of the artifact's file itself.
    pub fn artifact_url(&self, artifact: &Artifact) -> String {
        format!("{}/{}", self.base_url, artifact.path_suffix())
    }

    /// The URL of a sidecar checksum file for the artifact (`.sha256`,
    /// `.sha1`, or `.md5`).
    pub fn checksum_url(&self, artifact: &Artifact, extension: &str) -> String {
        format!("{}.{extension}", self.artifact_url(artifact))
    }

    /// The URL of the `(groupId, artifactId)`-level `maven-metadata.xml`.
    pub fn project_metadata_url(&self, group_id: &str, artifact_id: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            self.base_url,
            group_id.replace('.', "/"),
            artifact_id
        )
    }

    /// The URL of the per-version `maven-metadata.xml` used to resolve
    /// `-SNAPSHOT` timestamped builds.
    pub fn version_metadata_url(&self, group_id: &str, artifact_id: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/{}/maven-metadata.xml",
            self.base_url,
            group_id.replace('.', "/"),
            artifact_id,
            version
        )
    }
}
