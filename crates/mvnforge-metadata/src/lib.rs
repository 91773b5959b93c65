//! Accessor over a single `maven-metadata.xml` document, and an aggregator
//! that merges one such document per configured remote repository into a
//! single view (remotes disagree about `latest`/`release` more often than
//! not; the aggregator's merge policy is what the local store queries).

use std::path::Path;

use mvnforge_util::errors::MvnError;
use mvnforge_xml::XmlDocument;

/// A single `<snapshotVersion>` entry: which artifact extension/classifier
/// combination resolves to which timestamped snapshot build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub classifier: Option<String>,
    pub extension: String,
    pub value: String,
    pub updated: String,
}

/// The `<snapshot>` + `<snapshotVersions>` block present only on
/// per-version `maven-metadata.xml` documents for `-SNAPSHOT` artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotVersioning {
    pub timestamp: Option<String>,
    pub build_number: Option<u32>,
    pub last_updated: Option<String>,
    pub versions: Vec<SnapshotVersion>,
}

/// One repository's `maven-metadata.xml`.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
    pub last_updated: Option<String>,
    pub snapshot: Option<SnapshotVersioning>,
}

impl Metadata {
    pub fn parse(path: &Path) -> Result<Self, MvnError> {
        let doc = XmlDocument::parse(path)?;
        Self::from_document(&doc)
    }

    pub fn parse_str(input: &str) -> Result<Self, MvnError> {
        let doc = XmlDocument::parse_str(input)?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &XmlDocument) -> Result<Self, MvnError> {
        let root = &doc.root;
        let group_id = root
            .value("groupId")
            .ok_or_else(|| MvnError::Xml("metadata missing groupId".to_string()))?;
        let artifact_id = root
            .value("artifactId")
            .ok_or_else(|| MvnError::Xml("metadata missing artifactId".to_string()))?;
        let versioning = root.element("versioning")?;

        let (latest, release, versions, last_updated, snapshot) = match versioning {
            Some(v) => {
                let versions = v
                    .elements("versions/version")
                    .into_iter()
                    .map(|e| e.text.clone())
                    .collect();
                let snapshot = v
                    .element("snapshot")?
                    .map(|s| -> Result<SnapshotVersioning, MvnError> {
                        let timestamp = s.value("timestamp");
                        if let Some(ts) = &timestamp {
                            if !is_valid_timestamp(ts) {
                                return Err(MvnError::Xml(format!(
                                    "invalid snapshot timestamp: {ts}"
                                )));
                            }
                        }
                        Ok(SnapshotVersioning {
                            timestamp,
                            build_number: s.value("buildNumber").and_then(|n| n.parse().ok()),
                            last_updated: v.value("lastUpdated"),
                            versions: v
                                .elements("snapshotVersions/snapshotVersion")
                                .into_iter()
                                .map(|e| SnapshotVersion {
                                    classifier: e.value("classifier"),
                                    extension: e.value("extension").unwrap_or_default(),
                                    value: e.value("value").unwrap_or_default(),
                                    updated: e.value("updated").unwrap_or_default(),
                                })
                                .collect(),
                        })
                    })
                    .transpose()?;

                let last_updated = v.value("lastUpdated");
                if let Some(ts) = &last_updated {
                    if !is_valid_timestamp(ts) {
                        return Err(MvnError::Xml(format!("invalid lastUpdated timestamp: {ts}")));
                    }
                }

                (v.value("latest"), v.value("release"), versions, last_updated, snapshot)
            }
            None => (None, None, Vec::new(), None, None),
        };

        Ok(Metadata {
            group_id,
            artifact_id,
            version: root.value("version"),
            latest,
            release,
            versions,
            last_updated,
            snapshot,
        })
    }
}

/// Merged view across every remote repository's `maven-metadata.xml` for one
/// `(groupId, artifactId)`. Union the known versions; prefer the
/// most-recently-updated repository's `latest`/`release` pointer.
#[derive(Debug, Clone)]
pub struct AggregatedMetadata {
    pub group_id: String,
    pub artifact_id: String,
    pub versions: Vec<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
}

impl AggregatedMetadata {
    /// Merges several `Metadata` documents, which must all describe the
    /// same `(groupId, artifactId)` — mixing coordinates is a programming
    /// error in the caller, surfaced as an error rather than silently
    /// merging unrelated components.
    pub fn from_documents(docs: &[Metadata]) -> Result<Self, MvnError> {
        let first = docs
            .first()
            .ok_or_else(|| MvnError::Xml("no metadata documents to aggregate".to_string()))?;
        let group_id = first.group_id.clone();
        let artifact_id = first.artifact_id.clone();

        for doc in docs {
            if doc.group_id != group_id || doc.artifact_id != artifact_id {
                return Err(MvnError::Xml(format!(
                    "cannot aggregate metadata for mismatched coordinates: {}:{} vs {}:{}",
                    group_id, artifact_id, doc.group_id, doc.artifact_id
                )));
            }
        }

        // Concatenation (duplicates included), in lastUpdated-ascending
        // order — not a union — per this workspace's aggregation contract.
        let mut ascending: Vec<&Metadata> = docs.iter().collect();
        ascending.sort_by(|a, b| a.last_updated.cmp(&b.last_updated));
        let versions: Vec<String> = ascending
            .iter()
            .flat_map(|doc| doc.versions.iter().cloned())
            .collect();

        // Prefer the entry from whichever document was updated most
        // recently (lexicographic comparison is valid because
        // lastUpdated is a fixed-width yyyyMMddHHmmss timestamp).
        let newest = ascending
            .iter()
            .rev()
            .find(|d| d.last_updated.is_some());

        let (latest, release) = match newest {
            Some(d) => (d.latest.clone(), d.release.clone()),
            None => (
                docs.iter().find_map(|d| d.latest.clone()),
                docs.iter().find_map(|d| d.release.clone()),
            ),
        };

        Ok(AggregatedMetadata {
            group_id,
            artifact_id,
            versions,
            latest,
            release,
        })
    }
}

/// Validates the two grammars `lastUpdated` and snapshot `timestamp` fields
/// legally take: the compact `yyyyMMddHHmmss` (14 digits) and the dotted
/// `yyyyMMdd.HHmmss` (8 digits, `.`, 6 digits) forms.
pub fn is_valid_timestamp(s: &str) -> bool {
    let compact = s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit());
    let dotted = s.len() == 15
        && s.as_bytes().get(8) == Some(&b'.')
        && s[..8].bytes().all(|b| b.is_ascii_digit())
        && s[9..].bytes().all(|b| b.is_ascii_digit());
    compact || dotted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <latest>2.0</latest>
    <release>1.9</release>
    <versions>
      <version>1.0</version>
      <version>1.9</version>
      <version>2.0</version>
    </versions>
    <lastUpdated>20260101120000</lastUpdated>
  </versioning>
</metadata>"#;

    #[test]
    fn parses_versioning_block() {
        let m = Metadata::parse_str(SAMPLE).unwrap();
        assert_eq!(m.latest.as_deref(), Some("2.0"));
        assert_eq!(m.release.as_deref(), Some("1.9"));
        assert_eq!(m.versions, vec!["1.0", "1.9", "2.0"]);
    }

    #[test]
    fn aggregates_concatenate_in_last_updated_ascending_order() {
        let a = Metadata::parse_str(SAMPLE).unwrap();
        let b = Metadata::parse_str(
            r#"<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <latest>2.1</latest>
    <versions><version>1.9</version><version>2.1</version></versions>
    <lastUpdated>20260201120000</lastUpdated>
  </versioning>
</metadata>"#,
        )
        .unwrap();
        // Pass out of order; the aggregator must sort by lastUpdated itself.
        let agg = AggregatedMetadata::from_documents(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(agg.versions, vec!["1.0", "1.9", "2.0", "1.9", "2.1"]);
        assert_eq!(agg.latest.as_deref(), Some("2.1"));
    }

    #[test]
    fn rejects_mismatched_coordinates() {
        let a = Metadata::parse_str(SAMPLE).unwrap();
        let b = Metadata::parse_str(
            r#"<metadata><groupId>org.other</groupId><artifactId>x</artifactId></metadata>"#,
        )
        .unwrap();
        assert!(AggregatedMetadata::from_documents(&[a, b]).is_err());
    }

    #[test]
    fn timestamp_validity() {
        assert!(is_valid_timestamp("20260101120000"));
        assert!(!is_valid_timestamp("2026-01-01"));
    }
}
