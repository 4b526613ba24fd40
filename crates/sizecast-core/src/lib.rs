#![forbid(unsafe_code)]
//! sizecast-core: shared vocabulary for the estimation pipeline.
//!
//! Everything downstream (extractor, sizer, cost model) agrees on three
//! things that live here:
//! - the logical type system and its byte-size table ([`types`]),
//! - the immutable dataset statistics passed explicitly to every component
//!   ([`stats`]) — there are no implicit singletons,
//! - the error taxonomy ([`error`]): fatal lookups fail loudly with the set
//!   of valid alternatives, everything else degrades to a default.

pub mod error;
pub mod measure;
pub mod stats;
pub mod types;

pub use error::{Error, Result};
pub use measure::Measure;
pub use stats::DatasetStatistics;
pub use types::LogicalType;
