//! Recursive average-document-size estimation.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use sizecast_core::stats::{self, DatasetStatistics};
use sizecast_core::LogicalType;
use sizecast_schema::{ArrayItems, Attribute, Entity, EntityGraph};

use crate::profile::{DenormProfile, FieldCounts, Storage};

/// Size record for one physical collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionSize {
    pub num_docs: u64,
    pub doc_size_bytes: u64,
    pub collection_size: u64,
}

/// All root collections of a design plus the database total.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseSizes {
    pub collections: BTreeMap<String, CollectionSize>,
    pub total_bytes: u64,
}

/// Average document size per entity.
///
/// Borrows the entity graph and statistics; holds the active profile and
/// manual overrides. `size` memoizes per entity name for the lifetime of
/// one instance; changing the profile or the overrides clears the memo.
pub struct Sizer<'a> {
    graph: &'a EntityGraph,
    stats: &'a DatasetStatistics,
    profile: Option<DenormProfile>,
    manual: BTreeMap<String, FieldCounts>,
    memo: RefCell<HashMap<String, u64>>,
}

impl<'a> Sizer<'a> {
    pub fn new(graph: &'a EntityGraph, stats: &'a DatasetStatistics) -> Self {
        Self {
            graph,
            stats,
            profile: None,
            manual: BTreeMap::new(),
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_profile(mut self, profile: DenormProfile) -> Self {
        self.profile = Some(profile);
        self.memo.get_mut().clear();
        self
    }

    pub fn with_manual_counts(mut self, counts: BTreeMap<String, FieldCounts>) -> Self {
        self.manual = counts;
        self.memo.get_mut().clear();
        self
    }

    /// Average document size of `entity_name` in bytes.
    ///
    /// Unknown entities size to 0. Cycles in the graph terminate: an entity
    /// found on the in-progress path contributes its intrinsic size only.
    pub fn size(&self, entity_name: &str) -> u64 {
        let Some(entity) = self.graph.get(entity_name) else {
            return 0;
        };
        if let Some(cached) = self.memo.borrow().get(&entity.name) {
            return *cached;
        }
        let mut in_progress = BTreeSet::new();
        let (size, _) = self.size_entity(entity, &mut in_progress);
        size
    }

    /// Sizes of every root collection under the active configuration.
    /// Nested entities are folded into their parents, not listed.
    pub fn collection_sizes(&self) -> DatabaseSizes {
        let mut sizes = DatabaseSizes::default();
        for entity in self.graph.roots() {
            let num_docs = self.stats.collection_count(&entity.name);
            let doc_size_bytes = self.size(&entity.name);
            let collection_size = num_docs * doc_size_bytes;
            sizes.total_bytes += collection_size;
            sizes.collections.insert(
                entity.name.clone(),
                CollectionSize {
                    num_docs,
                    doc_size_bytes,
                    collection_size,
                },
            );
        }
        sizes
    }

    /// Returns (size, cycle_hit). Results touched by a cycle fallback are
    /// path-dependent, so only cycle-free results enter the memo.
    fn size_entity(&self, entity: &Entity, in_progress: &mut BTreeSet<String>) -> (u64, bool) {
        if let Some(counts) = self.manual.get(&entity.name) {
            return (counts.document_size(), false);
        }
        if let Some(cached) = self.memo.borrow().get(&entity.name) {
            return (*cached, false);
        }
        if in_progress.contains(&entity.name) {
            tracing::debug!(entity = %entity.name, "cycle detected, intrinsic size only");
            return (self.intrinsic_size(entity), true);
        }

        in_progress.insert(entity.name.clone());
        let mut total = 0u64;
        let mut cycle_hit = false;

        for attr in &entity.attributes {
            if attr.required() {
                total += stats::SIZE_KEY;
            }
            match attr {
                Attribute::Primitive { .. } => {
                    total += attr.logical_type().byte_size();
                }
                Attribute::Array { name, items, .. } => {
                    let avg_len = self.avg_array_len(name);
                    match items {
                        ArrayItems::Objects => {
                            // The nested entity carries the capitalized
                            // attribute name; lookup is case-insensitive.
                            let child = match self.graph.get(name) {
                                Some(c) => {
                                    let (s, c_hit) = self.size_entity(c, in_progress);
                                    cycle_hit |= c_hit;
                                    s
                                }
                                None => 0,
                            };
                            total += avg_len * child;
                        }
                        ArrayItems::Primitive { declared } => {
                            total += avg_len * Self::array_item_size(name, declared.as_deref());
                        }
                    }
                }
                Attribute::Reference { target, .. } => match self.graph.get(target) {
                    Some(child) => {
                        let (s, c_hit) = self.size_entity(child, in_progress);
                        cycle_hit |= c_hit;
                        total += s;
                    }
                    None => {
                        tracing::debug!(entity = %entity.name, target = %target,
                            "referenced entity not in graph, contributes nothing");
                    }
                },
                // Object without properties: key overhead only.
                Attribute::InlineObject { .. } => {}
            }
        }

        if let Some(profile) = &self.profile {
            for rel in profile.relationships_from(&entity.name) {
                let child = self.graph.get(&rel.to);
                match (&rel.storage, child) {
                    (Storage::Fk { fields }, _) => {
                        total += fields * stats::SIZE_NUMBER;
                    }
                    (Storage::EmbedOne, Some(child)) => {
                        let (s, c_hit) = self.size_entity(child, in_progress);
                        cycle_hit |= c_hit;
                        total += s;
                    }
                    (Storage::EmbedMany { avg }, Some(child)) => {
                        let (s, c_hit) = self.size_entity(child, in_progress);
                        cycle_hit |= c_hit;
                        total += (avg * s as f64).floor() as u64;
                    }
                    (_, None) => {
                        tracing::debug!(from = %rel.from, to = %rel.to,
                            "relationship target not in graph, fallback number cost");
                        total += stats::SIZE_NUMBER;
                    }
                }
            }
        }

        in_progress.remove(&entity.name);
        if !cycle_hit {
            self.memo.borrow_mut().insert(entity.name.clone(), total);
        }
        (total, cycle_hit)
    }

    /// Non-recursive size: keys and primitive values only, no child
    /// expansion. Used as the cycle fallback.
    fn intrinsic_size(&self, entity: &Entity) -> u64 {
        let mut total = 0u64;
        for attr in &entity.attributes {
            if attr.required() {
                total += stats::SIZE_KEY;
            }
            match attr {
                Attribute::Primitive { .. } => total += attr.logical_type().byte_size(),
                Attribute::Array {
                    name,
                    items: ArrayItems::Primitive { declared },
                    ..
                } => {
                    total +=
                        self.avg_array_len(name) * Self::array_item_size(name, declared.as_deref());
                }
                _ => {}
            }
        }
        total
    }

    /// Per-item byte cost of a primitive array. A missing item type
    /// defaults to string for category-like arrays, unknown otherwise.
    fn array_item_size(attr_name: &str, declared: Option<&str>) -> u64 {
        let item_type = declared.unwrap_or_else(|| {
            if attr_name.to_ascii_lowercase().contains("categories") {
                "string"
            } else {
                "unknown"
            }
        });
        LogicalType::from_name(item_type).byte_size()
    }

    /// Average array length by attribute-name heuristic: category-like
    /// arrays use the configured fan-out, order-line-like arrays the
    /// order-lines-per-product ratio, everything else 1.
    fn avg_array_len(&self, attr_name: &str) -> u64 {
        let an = attr_name.to_ascii_lowercase();
        if an.contains("categories") {
            self.stats.avg_categories_per_product
        } else if an.contains("orderline") {
            self.stats.nb_orderlines / self.stats.nb_products.max(1)
        } else {
            1
        }
    }
}

/// Human-readable byte count: B, KB, MB, GB with two decimals. Zero and
/// negative inputs render as "0.00 GB".
pub fn format_bytes(size_in_bytes: u64) -> String {
    if size_in_bytes == 0 {
        return "0.00 GB".to_string();
    }
    let units = ["B", "KB", "MB", "GB"];
    let mut size = size_in_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < units.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, units[unit])
}
