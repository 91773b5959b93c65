//! End-to-end scenarios over the full seed → profile activation → parent
//! inheritance → interpolation → BOM import → managed-version injection →
//! enumeration pipeline, against an in-memory fake repository.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use mvnforge_coord::{Artifact, Component, Project};
use mvnforge_model::{builder, enumerator, Environment};
use mvnforge_store::{Downloader, LocalStore, MavenRepository};
use mvnforge_util::errors::MvnError;
use pretty_assertions::assert_eq;

struct MapDownloader {
    files: HashMap<String, Vec<u8>>,
}

impl Downloader for MapDownloader {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        _repo_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, MvnError>> + Send + 'a>> {
        let result = self.files.get(url).cloned();
        Box::pin(async move {
            result.ok_or_else(|| MvnError::DownloadFailed {
                coordinate: url.to_string(),
            })
        })
    }
}

struct Fixture {
    env: Environment,
}

impl Fixture {
    fn new(poms: &[(&str, &str, &str, &str)]) -> Self {
        let repo = MavenRepository::new("test", "https://repo.test/maven2");
        let mut files = HashMap::new();
        for (group_id, artifact_id, version, xml) in poms {
            let project = Project::new(*group_id, *artifact_id).unwrap();
            let component = Component::new(project, *version).unwrap();
            let artifact = Artifact::new(component, None::<String>, Some("pom"));
            files.insert(repo.artifact_url(&artifact), xml.as_bytes().to_vec());
        }
        let downloader: Arc<dyn Downloader> = Arc::new(MapDownloader { files });
        let dir = tempfile::tempdir().unwrap();
        let env = Environment {
            store: LocalStore::new(dir.path()),
            local_repositories: Vec::new(),
            repositories: vec![repo],
            downloader,
        };
        Fixture { env }
    }

    fn component(&self, group_id: &str, artifact_id: &str, version: &str) -> Component {
        Component::new(Project::new(group_id, artifact_id).unwrap(), version).unwrap()
    }
}

#[test]
fn scenario_plain_descriptor_has_no_surprises() {
    let fixture = Fixture::new(&[(
        "org.example",
        "lib",
        "1.0",
        r#"<project>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <version>1.0</version>
</project>"#,
    )]);
    let model = builder::build(&fixture.component("org.example", "lib", "1.0"), &fixture.env).unwrap();
    assert_eq!(model.packaging, "jar");
    assert!(model.dependencies.is_empty());
}

#[test]
fn scenario_parent_inheritance_merges_properties_and_management() {
    let fixture = Fixture::new(&[
        (
            "org.example",
            "parent",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>parent</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <properties>
    <shared.version>4.5</shared.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.other</groupId>
        <artifactId>thing</artifactId>
        <version>${shared.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#,
        ),
        (
            "org.example",
            "child",
            "1.0",
            r#"<project>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>child</artifactId>
  <dependencies>
    <dependency>
      <groupId>org.other</groupId>
      <artifactId>thing</artifactId>
    </dependency>
  </dependencies>
</project>"#,
        ),
    ]);

    let model = builder::build(&fixture.component("org.example", "child", "1.0"), &fixture.env).unwrap();
    assert_eq!(model.properties.get("shared.version").unwrap(), "4.5");
    assert_eq!(model.dependencies.len(), 1);
    assert_eq!(model.dependencies[0].artifact.component.version, "4.5");
}

#[test]
fn scenario_active_by_default_profile_contributes_property() {
    let fixture = Fixture::new(&[(
        "org.example",
        "lib",
        "1.0",
        r#"<project>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <version>1.0</version>
  <profiles>
    <profile>
      <id>defaults</id>
      <activation><activeByDefault>true</activeByDefault></activation>
      <properties>
        <from.profile>yes</from.profile>
      </properties>
    </profile>
    <profile>
      <id>inactive</id>
      <properties>
        <from.inactive>no</from.inactive>
      </properties>
    </profile>
  </profiles>
</project>"#,
    )]);

    let model = builder::build(&fixture.component("org.example", "lib", "1.0"), &fixture.env).unwrap();
    assert_eq!(model.properties.get("from.profile").unwrap(), "yes");
    assert!(model.properties.get("from.inactive").is_none());
}

#[test]
fn scenario_interpolation_cycle_surfaces_as_error() {
    let fixture = Fixture::new(&[(
        "org.example",
        "lib",
        "1.0",
        r#"<project>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <version>1.0</version>
  <properties>
    <a>${b}</a>
    <b>${a}</b>
  </properties>
</project>"#,
    )]);

    let result = builder::build(&fixture.component("org.example", "lib", "1.0"), &fixture.env);
    assert!(result.is_err());
}

#[test]
fn scenario_bom_import_supplies_managed_version() {
    let fixture = Fixture::new(&[
        (
            "org.example",
            "bom",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>bom</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.other</groupId>
        <artifactId>thing</artifactId>
        <version>7.0</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#,
        ),
        (
            "org.example",
            "app",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.example</groupId>
        <artifactId>bom</artifactId>
        <version>1.0</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>org.other</groupId>
      <artifactId>thing</artifactId>
    </dependency>
  </dependencies>
</project>"#,
        ),
    ]);

    let model = builder::build(&fixture.component("org.example", "app", "1.0"), &fixture.env).unwrap();
    assert_eq!(model.dependencies.len(), 1);
    assert_eq!(model.dependencies[0].artifact.component.version, "7.0");
}

#[test]
fn scenario_bom_managed_version_ignores_consumer_property_override() {
    // The BOM declares foo.version itself and resolves its own managed entry
    // against it; the consumer overriding foo.version to a different value
    // must not affect the value the BOM already baked into its own model.
    let fixture = Fixture::new(&[
        (
            "org.example",
            "bom",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>bom</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <properties>
    <foo.version>1.0.0</foo.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.other</groupId>
        <artifactId>foo</artifactId>
        <version>${foo.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#,
        ),
        (
            "org.example",
            "app",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>app</artifactId>
  <version>1.0</version>
  <properties>
    <foo.version>2.0.0</foo.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.example</groupId>
        <artifactId>bom</artifactId>
        <version>1.0</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>org.other</groupId>
      <artifactId>foo</artifactId>
    </dependency>
  </dependencies>
</project>"#,
        ),
    ]);

    let model = builder::build(&fixture.component("org.example", "app", "1.0"), &fixture.env).unwrap();
    assert_eq!(model.dependencies.len(), 1);
    assert_eq!(model.dependencies[0].artifact.component.version, "1.0.0");
}

#[test]
fn scenario_parent_cycle_is_detected() {
    let fixture = Fixture::new(&[
        (
            "org.example",
            "a",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>a</artifactId>
  <version>1.0</version>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>b</artifactId>
    <version>1.0</version>
  </parent>
</project>"#,
        ),
        (
            "org.example",
            "b",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>b</artifactId>
  <version>1.0</version>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>a</artifactId>
    <version>1.0</version>
  </parent>
</project>"#,
        ),
    ]);

    let result = builder::build(&fixture.component("org.example", "a", "1.0"), &fixture.env);
    assert!(matches!(result, Err(MvnError::ParentCycle { .. })));
}

#[test]
fn scenario_diamond_dependency_nearest_wins() {
    let fixture = Fixture::new(&[
        (
            "org.example",
            "root",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>root</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>near</artifactId>
      <version>1.0</version>
    </dependency>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>far</artifactId>
      <version>1.0</version>
    </dependency>
  </dependencies>
</project>"#,
        ),
        (
            "org.example",
            "near",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>near</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>shared</artifactId>
      <version>2.0</version>
    </dependency>
  </dependencies>
</project>"#,
        ),
        (
            "org.example",
            "far",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>far</artifactId>
  <version>1.0</version>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>shared</artifactId>
      <version>1.0</version>
    </dependency>
  </dependencies>
</project>"#,
        ),
        (
            "org.example",
            "shared",
            "2.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>shared</artifactId>
  <version>2.0</version>
</project>"#,
        ),
        (
            "org.example",
            "shared",
            "1.0",
            r#"<project>
  <groupId>org.example</groupId>
  <artifactId>shared</artifactId>
  <version>1.0</version>
</project>"#,
        ),
    ]);

    let model = builder::build(&fixture.component("org.example", "root", "1.0"), &fixture.env).unwrap();
    let result = enumerator::enumerate(&model, &fixture.env, true).unwrap();

    let shared = result
        .resolved
        .iter()
        .find(|d| d.component.project.artifact_id == "shared")
        .unwrap();
    assert_eq!(shared.component.version, "2.0");
    assert!(!result.conflicts.is_empty());
}
