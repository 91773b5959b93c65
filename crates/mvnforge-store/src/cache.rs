use std::path::{Path, PathBuf};

use mvnforge_coord::Artifact;
use mvnforge_util::errors::MvnError;
use mvnforge_util::fs as ufs;
use tracing::debug;

use crate::checksum::{self, ChecksumKind};
use crate::download::Downloader;
use crate::repository::MavenRepository;

/// The on-disk local repository cache:
/// `<root>/g1/g2/.../artifactId/version/artifactId-version[-classifier].packaging`,
/// matching the layout Maven itself uses for `~/.m2/repository`.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// The `M2_REPO`-rooted default store, falling back to `~/.m2/repository`.
    pub fn from_env() -> Self {
        let root = std::env::var("M2_REPO")
            .map(PathBuf::from)
            .unwrap_or_else(|_| ufs::home_dir().join(".m2").join("repository"));
        LocalStore::new(root)
    }

    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        self.root.join(artifact.path_suffix())
    }

    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.path_for(artifact).is_file()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the cached path if present. Otherwise consults each read-only
    /// local repository root in order (a hit there is returned directly, no
    /// copy into the writable cache), then fetches from each remote
    /// repository in order (first success wins), verifying a checksum
    /// sidecar when the remote publishes one, then writes the bytes into
    /// the cache atomically (temp file + rename) before returning the path.
    pub async fn resolve(
        &self,
        artifact: &Artifact,
        local_repositories: &[PathBuf],
        repositories: &[MavenRepository],
        downloader: &dyn Downloader,
    ) -> Result<PathBuf, MvnError> {
        let dest = self.path_for(artifact);
        if dest.is_file() {
            debug!(path = %dest.display(), "artifact already cached");
            return Ok(dest);
        }

        for local_root in local_repositories {
            let candidate = local_root.join(artifact.path_suffix());
            if candidate.is_file() {
                debug!(path = %candidate.display(), "artifact found in local repository");
                return Ok(candidate);
            }
        }

        if artifact.component.is_snapshot() {
            return Err(MvnError::SnapshotUnsupported {
                coordinate: artifact.to_string(),
            });
        }

        for repo in repositories {
            let url = repo.artifact_url(artifact);
            let bytes = match downloader.fetch(&url, &repo.id).await {
                Ok(bytes) => bytes,
                Err(_) => continue,
            };

            if let Some(kind) = self.verify_against_sidecars(&url, &bytes, repo, downloader).await {
                if !kind {
                    continue;
                }
            }

            ufs::ensure_dir(dest.parent().unwrap_or(&self.root))
                .map_err(MvnError::Io)?;
            let tmp = dest.with_extension("tmp-download");
            std::fs::write(&tmp, &bytes).map_err(MvnError::Io)?;
            std::fs::rename(&tmp, &dest).map_err(MvnError::Io)?;
            return Ok(dest);
        }

        Err(MvnError::DownloadFailed {
            coordinate: artifact.to_string(),
        })
    }

    /// Blocking facade over [`resolve`](Self::resolve), for callers in the
    /// synchronous model-building core that need an artifact on disk
    /// without becoming async themselves.
    pub fn resolve_blocking(
        &self,
        artifact: &Artifact,
        local_repositories: &[PathBuf],
        repositories: &[MavenRepository],
        downloader: &dyn Downloader,
    ) -> Result<PathBuf, MvnError> {
        let runtime = tokio::runtime::Runtime::new().map_err(MvnError::Io)?;
        runtime.block_on(self.resolve(artifact, local_repositories, repositories, downloader))
    }

    /// Tries each checksum kind's sidecar in turn; returns `None` if no
    /// sidecar was published by any kind (nothing to verify against),
    /// `Some(true)` if a sidecar matched, `Some(false)` if one was found
    /// but didn't match.
    async fn verify_against_sidecars(
        &self,
        artifact_url: &str,
        bytes: &[u8],
        repo: &MavenRepository,
        downloader: &dyn Downloader,
    ) -> Option<bool> {
        for kind in ChecksumKind::fallback_chain() {
            let sidecar_url = format!("{artifact_url}.{}", kind.extension());
            if let Ok(sidecar) = downloader.fetch(&sidecar_url, &repo.id).await {
                let content = String::from_utf8_lossy(&sidecar).into_owned();
                return Some(checksum::verify(kind, bytes, &content));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::tests::FakeDownloader;
    use mvnforge_coord::{Component, Project};
    use pretty_assertions::assert_eq;

    fn artifact() -> Artifact {
        let project = Project::new("org.example", "lib").unwrap();
        let component = Component::new(project, "1.0").unwrap();
        Artifact::new(component, None::<String>, None::<String>)
    }

    #[test]
    fn path_for_matches_m2_layout() {
        let store = LocalStore::new("/repo");
        let path = store.path_for(&artifact());
        assert_eq!(path, PathBuf::from("/repo/org/example/lib/1.0/lib-1.0.jar"));
    }

    #[tokio::test]
    async fn resolve_downloads_and_caches_on_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let repo = MavenRepository::new("central", "https://example.invalid/maven2");
        let downloader = FakeDownloader {
            body: b"jar-bytes".to_vec(),
        };

        let path = store
            .resolve(&artifact(), &[], &[repo], &downloader)
            .await
            .unwrap();
        assert!(path.is_file());
        assert_eq!(std::fs::read(&path).unwrap(), b"jar-bytes");
    }

    #[tokio::test]
    async fn resolve_reuses_cached_artifact_without_refetching(
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let cached_path = store.path_for(&artifact());
        ufs::ensure_dir(cached_path.parent().unwrap()).unwrap();
        std::fs::write(&cached_path, b"already-here").unwrap();

        let repo = MavenRepository::new("central", "https://example.invalid/maven2");
        let downloader = FakeDownloader { body: Vec::new() };
        let path = store
            .resolve(&artifact(), &[], &[repo], &downloader)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"already-here");
    }

    #[tokio::test]
    async fn resolve_prefers_local_repository_over_download() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let local_root = tempfile::tempdir().unwrap();
        let local_path = local_root.path().join(artifact().path_suffix());
        ufs::ensure_dir(local_path.parent().unwrap()).unwrap();
        std::fs::write(&local_path, b"from-local-repo").unwrap();

        let repo = MavenRepository::new("central", "https://example.invalid/maven2");
        let downloader = FakeDownloader { body: Vec::new() };
        let path = store
            .resolve(
                &artifact(),
                &[local_root.path().to_path_buf()],
                &[repo],
                &downloader,
            )
            .await
            .unwrap();
        assert_eq!(path, local_path);
        assert_eq!(std::fs::read(&path).unwrap(), b"from-local-repo");
        assert!(!store.path_for(&artifact()).exists());
    }
}
