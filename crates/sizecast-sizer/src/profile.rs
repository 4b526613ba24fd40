//! Denormalization profiles and manual count overrides.

use serde::{Deserialize, Serialize};
use sizecast_core::stats;

/// How a related entity is physically stored relative to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Storage {
    /// Only foreign-key fields are stored, `fields` numbers worth.
    Fk {
        #[serde(default = "default_fk_fields")]
        fields: u64,
    },
    /// The child document is inlined once.
    EmbedOne,
    /// The child document is inlined as an array with the given average
    /// multiplicity.
    EmbedMany { avg: f64 },
}

fn default_fk_fields() -> u64 {
    1
}

/// One declared relationship of a denormalization profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(flatten)]
    pub storage: Storage,
}

/// A named physical layout: which entities exist as collections and how
/// they relate. Relationships naming entities absent from the graph are
/// inert, not fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenormProfile {
    pub name: String,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl DenormProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relationships: Vec::new(),
        }
    }

    pub fn with_relationship(mut self, rel: Relationship) -> Self {
        self.relationships.push(rel);
        self
    }

    /// Relationships whose owning side is `entity`, case-insensitive.
    pub fn relationships_from<'a>(
        &'a self,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .iter()
            .filter(move |r| r.from.eq_ignore_ascii_case(entity))
    }
}

/// Exact per-type field counts for one entity, mirroring the sizing
/// spreadsheet columns. When present these bypass automatic counting
/// entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCounts {
    pub integer: u64,
    pub string: u64,
    pub date: u64,
    pub longstring: u64,
    pub array_int: u64,
    pub array_string: u64,
    pub array_date: u64,
    pub array_longstring: u64,
    pub avg_array_length: u64,
    pub keys: u64,
}

impl FieldCounts {
    /// The spreadsheet formula:
    /// `integers*8 + strings*80 + dates*20 + longstrings*200
    ///  + avg_array_length * (array columns at the same per-type sizes)
    ///  + keys*12`.
    pub fn document_size(&self) -> u64 {
        let per_item = self.array_int * stats::SIZE_NUMBER
            + self.array_string * stats::SIZE_STRING
            + self.array_date * stats::SIZE_DATE
            + self.array_longstring * stats::SIZE_LONGSTRING;
        self.integer * stats::SIZE_NUMBER
            + self.string * stats::SIZE_STRING
            + self.date * stats::SIZE_DATE
            + self.longstring * stats::SIZE_LONGSTRING
            + self.avg_array_length * per_item
            + self.keys * stats::SIZE_KEY
    }
}
