#![forbid(unsafe_code)]
//! sizecast-schema: from a declarative (draft-04-style) schema tree to a
//! flat graph of entities and embedding relationships.
//!
//! Top-level schema properties become root entities; embedded objects and
//! arrays of objects are materialized as *nested* entities parented to the
//! entity that declares them. Extraction never fails: malformed nodes are
//! skipped (observable via `tracing::debug!`), so a broken schema degrades
//! to fewer attributes rather than an error.

pub mod entity;
pub mod extract;

pub use entity::{ArrayItems, Attribute, Entity, EntityGraph};
pub use extract::extract;
