#![forbid(unsafe_code)]
//! sizecast-sizer: average document size per entity, and from there the
//! storage footprint of every physical collection.
//!
//! Two sizing modes share one recursive core: schema-only (intrinsic
//! attribute walk) and profile-driven (intrinsic base plus declared
//! denormalization relationships). Manually supplied field counts bypass
//! both. Results are memoized per [`Sizer`] instance and cycles in the
//! entity graph degrade to an intrinsic-only size instead of recursing.

pub mod cache;
pub mod profile;
pub mod sizer;

pub use cache::{CachedCollection, DesignRecord, SizeCache};
pub use profile::{DenormProfile, FieldCounts, Relationship, Storage};
pub use sizer::{format_bytes, CollectionSize, DatabaseSizes, Sizer};
