#![forbid(unsafe_code)]
//! sizecast-query: the analytical query cost model.
//!
//! Stateless, pure functions of the structured query, the entity graph,
//! the sizer, the design map, and one dataset-statistics value. Three
//! query shapes share one dispatch point: plain filter, two-collection
//! join (as a broadcast filter plus per-result point lookups, or a single
//! filter when the active design embeds one side in the other), and
//! grouped aggregate. Every report figure carries its unit.

pub mod design;
pub mod model;
pub mod query;
pub mod report;
pub mod selectivity;

pub use design::DesignMap;
pub use model::CostModel;
pub use query::{AggregateFn, AggregateOp, JoinCondition, Query, QueryField};
pub use report::{CostReport, Costs, Distribution, JoinPhases, QuerySizes, Volumes};
pub use selectivity::selectivity;
