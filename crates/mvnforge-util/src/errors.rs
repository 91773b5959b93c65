use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all mvnforge operations.
///
/// Variants correspond one-to-one with the error kinds named in the model
/// builder's error handling design: retrieval-layer failures are recovered
/// locally by falling through to the next source and only surface here once
/// every source is exhausted; model-layer failures (cycles, unresolved
/// versions) always surface immediately.
#[derive(Debug, Error, Diagnostic)]
pub enum MvnError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing failed.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// A requested descriptor or metadata document could not be located or
    /// downloaded from any configured source.
    #[error("descriptor absent: {coordinate}")]
    #[diagnostic(help("check that a matching POM exists in one of the configured repositories"))]
    DescriptorAbsent { coordinate: String },

    /// A descriptor failed to parse or is missing required identity fields.
    #[error("descriptor malformed for {coordinate}: {message}")]
    DescriptorMalformed { coordinate: String, message: String },

    /// The parent chain revisits a `(groupId, artifactId, version)` triple.
    #[error("parent cycle detected, revisiting {coordinate}")]
    #[diagnostic(help("check for a <parent> that (transitively) names itself"))]
    ParentCycle { coordinate: String },

    /// Property evaluation revisits a property name on its own expansion
    /// stack.
    #[error("interpolation cycle detected for property '{property}'")]
    #[diagnostic(help("check for properties that reference each other, e.g. x=${{y}}, y=${{x}}"))]
    InterpolationCycle { property: String },

    /// A direct dependency has no version after managed-version injection.
    #[error("unresolved version for dependency {coordinate}")]
    #[diagnostic(help(
        "add an explicit <version> or a matching <dependencyManagement> entry"
    ))]
    UnresolvedVersion { coordinate: String },

    /// A bill-of-materials import's own build raised a model-layer error.
    #[error("import of BOM {coordinate} failed: {source}")]
    ImportFailure {
        coordinate: String,
        #[source]
        source: Box<MvnError>,
    },

    /// A download was requested for a non-timestamp-locked snapshot.
    #[error("snapshot resolution unsupported for {coordinate} (no timestamp lock)")]
    SnapshotUnsupported { coordinate: String },

    /// Every configured remote repository declined the request.
    #[error("download failed for {coordinate}: all configured repositories declined")]
    DownloadFailed { coordinate: String },

    /// Network request failed at the transport layer.
    #[error("network error: {message}")]
    Network { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type MvnResult<T> = miette::Result<T>;
