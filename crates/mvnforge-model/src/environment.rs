use std::path::PathBuf;
use std::sync::Arc;

use mvnforge_coord::{Artifact, Component};
use mvnforge_descriptor::Descriptor;
use mvnforge_store::{Downloader, HttpDownloader, LocalStore, MavenRepository};
use mvnforge_util::errors::MvnError;
use mvnforge_util::fs as ufs;
use serde::Deserialize;

const DEFAULT_CENTRAL: &str = "https://repo.maven.apache.org/maven2";

/// On-disk shape of `~/.mvnforge/config.toml`. Every field is optional —
/// an absent or missing file means "use the built-in defaults".
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    repositories: Vec<RepositoryConfig>,
    cache_root: Option<PathBuf>,
    #[serde(default)]
    local_repositories: Vec<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RepositoryConfig {
    id: String,
    url: String,
    #[serde(default = "default_true")]
    snapshots: bool,
}

fn default_true() -> bool {
    true
}

/// The resolved set of repositories, cache location, and downloader an
/// invocation of the model builder operates against. Mirrors the
/// load-or-default pattern used for this workspace's own configuration:
/// a `~/.mvnforge/config.toml` is read if present, environment variables
/// override it, and built-in defaults (Maven Central, `~/.m2/repository`)
/// fill in the rest.
pub struct Environment {
    pub store: LocalStore,
    /// Read-only local repository roots, consulted in order after the
    /// writable cache and before any remote repository.
    pub local_repositories: Vec<PathBuf>,
    pub repositories: Vec<MavenRepository>,
    pub downloader: Arc<dyn Downloader>,
}

impl Environment {
    pub fn load() -> Result<Self, MvnError> {
        let config_path = ufs::home_dir().join(".mvnforge").join("config.toml");
        let config = if config_path.is_file() {
            let text = std::fs::read_to_string(&config_path).map_err(MvnError::Io)?;
            toml::from_str(&text).map_err(|e| MvnError::Generic {
                message: format!("invalid config at {}: {e}", config_path.display()),
            })?
        } else {
            ConfigFile::default()
        };

        let cache_root = std::env::var("M2_REPO")
            .map(PathBuf::from)
            .ok()
            .or(config.cache_root)
            .unwrap_or_else(|| ufs::home_dir().join(".m2").join("repository"));

        let repositories = if config.repositories.is_empty() {
            vec![MavenRepository::new("central", DEFAULT_CENTRAL)]
        } else {
            config
                .repositories
                .into_iter()
                .map(|r| {
                    let repo = MavenRepository::new(r.id, r.url);
                    if r.snapshots {
                        repo
                    } else {
                        repo.without_snapshots()
                    }
                })
                .collect()
        };

        Ok(Environment {
            store: LocalStore::new(cache_root),
            local_repositories: config.local_repositories,
            repositories,
            downloader: Arc::new(HttpDownloader::new()),
        })
    }

    /// A minimal in-memory environment for tests: no config file, no
    /// network, a temp-directory cache, and a caller-supplied downloader.
    pub fn for_test(cache_root: PathBuf, downloader: Arc<dyn Downloader>) -> Self {
        Environment {
            store: LocalStore::new(cache_root),
            local_repositories: Vec::new(),
            repositories: vec![MavenRepository::new("central", DEFAULT_CENTRAL)],
            downloader,
        }
    }

    /// Resolves the on-disk path of `component`'s descriptor, fetching it
    /// into the local cache first if necessary. No repository serving the
    /// POM is reported as a missing descriptor, distinct from a download
    /// failure on an already-located binary artifact.
    pub fn descriptor_path_for(&self, component: &Component) -> Result<PathBuf, MvnError> {
        let artifact = Artifact::new(component.clone(), None::<String>, Some("pom"));
        self.store
            .resolve_blocking(
                &artifact,
                &self.local_repositories,
                &self.repositories,
                self.downloader.as_ref(),
            )
            .map_err(|err| match err {
                MvnError::DownloadFailed { coordinate } => {
                    MvnError::DescriptorAbsent { coordinate }
                }
                other => other,
            })
    }

    /// Resolves and parses the descriptor for `component`, fetching it into
    /// the local cache first if necessary.
    pub fn descriptor_for(&self, component: &Component) -> Result<Descriptor, MvnError> {
        let path = self.descriptor_path_for(component)?;
        Descriptor::parse(&path)
    }
}
