//! The cost report: every figure paired with its unit.

use serde::Serialize;
use sizecast_core::Measure;

/// Byte sizes of the query exchange and of one stored document.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuerySizes {
    /// Query sent to each contacted server.
    pub size_input: Measure,
    /// One result message.
    pub size_msg: Measure,
    /// One stored document of the physical collection.
    pub size_doc: Measure,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Distribution {
    /// Servers contacted (the fan-out S).
    pub servers: Measure,
    pub selectivity: Measure,
    /// Result count: matched documents, join pairs, or groups.
    pub results: Measure,
    pub docs_total: Measure,
    pub docs_per_server: Measure,
    /// Aggregates only: documents surviving the filter before grouping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Measure>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Volumes {
    pub network: Measure,
    /// RAM touched on one working server.
    pub ram_per_server: Measure,
    /// RAM across the whole cluster, idle-but-indexed servers included.
    pub ram_total: Measure,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Costs {
    pub time: Measure,
    pub carbon_network: Measure,
    pub carbon_ram: Measure,
    pub carbon_total: Measure,
    pub budget: Measure,
}

/// The two phases of a cross-collection join.
#[derive(Debug, Clone, Serialize)]
pub struct JoinPhases {
    /// Broadcast filter on the driving collection.
    pub outer: Box<CostReport>,
    /// One point lookup on the other collection, executed `iterations`
    /// times.
    pub inner: Box<CostReport>,
    pub iterations: Measure,
}

/// Complete estimation output. All-or-nothing: fatal errors yield no
/// report at all.
#[derive(Debug, Clone, Serialize)]
pub struct CostReport {
    pub sizes: QuerySizes,
    pub distribution: Distribution,
    pub volumes: Volumes,
    pub costs: Costs,
    /// Present only for two-phase joins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinPhases>,
}
