use std::path::PathBuf;
use thiserror::Error;

/// Canonical result for the estimation pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions only. Unrecognized filter combinations, unresolved field
/// types, and malformed schema nodes all degrade to documented defaults and
/// are reported through `tracing::debug!`, never through this enum.
#[derive(Debug, Error)]
pub enum Error {
    /// A logical collection did not resolve, after embedding-aware name
    /// resolution, to any physical collection known to the active design.
    #[error(
        "collection '{collection}' (resolves to '{resolved}') not found in {signature}; \
         available collections: {available}"
    )]
    CollectionNotFound {
        collection: String,
        resolved: String,
        signature: String,
        available: String,
    },

    /// A design signature absent from a size cache or design map.
    #[error("design signature '{signature}' not found; available: {available}")]
    SignatureNotFound {
        signature: String,
        available: String,
    },

    /// A statistics, schema, or collection-size cache file missing on disk.
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid query: {0}")]
    Query(String),
}
