//! Persisted collection-size records, keyed by design signature.
//!
//! The on-disk shape is one JSON object mapping each signature to its
//! record. Updates are read-modify-write of a whole signature's record;
//! callers embedding this in a concurrent service serialize writers per
//! file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sizecast_core::{Error, Result};

use crate::sizer::DatabaseSizes;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCollection {
    pub collection: String,
    pub doc_size_bytes: u64,
    pub num_docs: u64,
    pub collection_size: u64,
}

/// One design's full size record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignRecord {
    pub description: String,
    pub database_total: u64,
    pub collections: Vec<CachedCollection>,
}

impl DesignRecord {
    /// Build a record from freshly computed sizes.
    pub fn from_sizes(description: impl Into<String>, sizes: &DatabaseSizes) -> Self {
        Self {
            description: description.into(),
            database_total: sizes.total_bytes,
            collections: sizes
                .collections
                .iter()
                .map(|(name, c)| CachedCollection {
                    collection: name.clone(),
                    doc_size_bytes: c.doc_size_bytes,
                    num_docs: c.num_docs,
                    collection_size: c.collection_size,
                })
                .collect(),
        }
    }

    /// Case-insensitive collection lookup within this record.
    pub fn collection(&self, name: &str) -> Option<&CachedCollection> {
        self.collections
            .iter()
            .find(|c| c.collection.eq_ignore_ascii_case(name))
    }
}

/// In-memory copy of the size cache file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeCache {
    records: BTreeMap<String, DesignRecord>,
}

impl SizeCache {
    /// Load a cache file. A missing file is fatal; the caller decides
    /// whether an empty cache is an acceptable substitute.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SourceNotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file if it exists, otherwise start empty. Used by writers
    /// so the first save of a fresh file works.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn get(&self, signature: &str) -> Result<&DesignRecord> {
        self.records
            .get(signature)
            .ok_or_else(|| Error::SignatureNotFound {
                signature: signature.to_string(),
                available: self.signatures().join(", "),
            })
    }

    /// The `{doc_size_bytes, num_docs}` pair the cost model needs, resolved
    /// case-insensitively within one signature's record.
    pub fn collection(&self, signature: &str, collection: &str) -> Result<&CachedCollection> {
        let record = self.get(signature)?;
        record
            .collection(collection)
            .ok_or_else(|| Error::CollectionNotFound {
                collection: collection.to_string(),
                resolved: collection.to_string(),
                signature: signature.to_string(),
                available: record
                    .collections
                    .iter()
                    .map(|c| c.collection.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Replace or insert one signature's record. Idempotent.
    pub fn upsert(&mut self, signature: impl Into<String>, record: DesignRecord) {
        self.records.insert(signature.into(), record);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.records).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, raw).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn signatures(&self) -> Vec<String> {
        self.records.keys().cloned().collect()
    }
}
