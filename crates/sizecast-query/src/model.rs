//! Cost estimation for the three query shapes.

use serde::Serialize;
use sizecast_core::stats::{self, DatasetStatistics};
use sizecast_core::{Error, LogicalType, Measure, Result};
use sizecast_schema::{Attribute, EntityGraph};
use sizecast_sizer::{CachedCollection, DesignRecord, Sizer};

use crate::design::DesignMap;
use crate::query::{AggregateQuery, FilterQuery, JoinQuery, Query, QueryField};
use crate::report::{CostReport, Costs, Distribution, JoinPhases, QuerySizes, Volumes};
use crate::selectivity::selectivity;

/// Filter attributes recognized as foreign keys, and the collection each
/// one references. Drives the phase-1 output estimate of a join.
const FOREIGN_KEYS: &[(&str, &str)] = &[
    ("IDW", "Warehouse"),
    ("IDP", "Product"),
    ("IDC", "Client"),
    ("IDS", "Supplier"),
];

/// All raw figures of one filter-shaped operation. Reports are derived
/// from this; joins combine two of them before reporting.
#[derive(Debug, Clone, Copy, Serialize)]
struct PhaseMetrics {
    servers: u64,
    selectivity: f64,
    results: u64,
    nb_docs: u64,
    docs_per_server: f64,
    size_input: u64,
    size_msg: u64,
    size_doc: u64,
    vol_network: f64,
    vol_ram: f64,
    vol_ram_total: f64,
}

/// The query cost model. Stateless beyond its borrowed inputs; one
/// instance serves any number of `estimate` calls.
pub struct CostModel<'a> {
    stats: &'a DatasetStatistics,
    graph: &'a EntityGraph,
    sizer: &'a Sizer<'a>,
    design: &'a DesignMap,
    signature: String,
    sizes: &'a DesignRecord,
}

impl<'a> CostModel<'a> {
    pub fn new(
        stats: &'a DatasetStatistics,
        graph: &'a EntityGraph,
        sizer: &'a Sizer<'a>,
        design: &'a DesignMap,
        signature: impl Into<String>,
        sizes: &'a DesignRecord,
    ) -> Self {
        Self {
            stats,
            graph,
            sizer,
            design,
            signature: signature.into(),
            sizes,
        }
    }

    /// The single dispatch point: estimate any query shape.
    pub fn estimate(&self, query: &Query) -> Result<CostReport> {
        match query {
            Query::Filter(q) => self.estimate_filter(q),
            Query::Join(q) => self.estimate_join(q),
            Query::Aggregate(q) => self.estimate_aggregate(q),
        }
    }

    fn estimate_filter(&self, query: &FilterQuery) -> Result<CostReport> {
        let metrics = self.filter_metrics(
            &query.collection,
            &query.filter_fields,
            &query.project_fields,
            query.sharding_key.as_deref(),
            query.has_index,
            None,
        )?;
        Ok(self.report(&metrics, None, None))
    }

    fn estimate_join(&self, query: &JoinQuery) -> Result<CostReport> {
        let [collection1, collection2] = query.collections.as_slice() else {
            return Err(Error::Query(format!(
                "join requires exactly 2 collections, got {}",
                query.collections.len()
            )));
        };
        let Some(condition) = query.join_conditions.first() else {
            return Err(Error::Query("join requires a join condition".to_string()));
        };
        let (join_field1, join_field2) =
            if condition.left_collection.eq_ignore_ascii_case(collection1) {
                (&condition.left_field, &condition.right_field)
            } else {
                (&condition.right_field, &condition.left_field)
            };

        let ff1: Vec<QueryField> = query
            .filter_fields
            .iter()
            .filter(|f| f.belongs_to(collection1))
            .cloned()
            .collect();
        let ff2: Vec<QueryField> = query
            .filter_fields
            .iter()
            .filter(|f| f.belongs_to(collection2))
            .cloned()
            .collect();
        let proj1: Vec<QueryField> = query
            .project_fields
            .iter()
            .filter(|f| f.belongs_to(collection1))
            .cloned()
            .collect();
        let proj2: Vec<QueryField> = query
            .project_fields
            .iter()
            .filter(|f| f.belongs_to(collection2))
            .cloned()
            .collect();

        // Phase 1 always ships the join key back, whether projected or not.
        let mut proj1_with_key = proj1.clone();
        if !proj1.iter().any(|f| f.name == *join_field1) {
            proj1_with_key.push(
                QueryField::new(join_field1.clone(), self.field_type(collection1, join_field1))
                    .in_collection(collection1.clone()),
            );
        }
        // Phase 2 routes and filters by the join key.
        let join_filter = QueryField::new(
            join_field2.clone(),
            self.field_type(collection2, join_field2),
        )
        .in_collection(collection2.clone());

        let physical1 = self.design.resolve(&self.signature, collection1);
        let physical2 = self.design.resolve(&self.signature, collection2);

        if physical1 == physical2 {
            // One side is embedded in the other: a single filter on the
            // shared physical collection, with the two phases' input and
            // message sizes summed.
            let (input1, msg1) = self.query_sizes(collection1, &ff1, &proj1_with_key);
            let (input2, msg2) =
                self.query_sizes(collection2, std::slice::from_ref(&join_filter), &proj2);
            let metrics = self.filter_metrics(
                collection1,
                &ff1,
                &query.project_fields,
                query.sharding_key.as_deref(),
                query.has_index,
                Some((input1 + input2, msg1 + msg2)),
            )?;
            return Ok(self.report(&metrics, None, None));
        }

        // Separate collections: broadcast filter, then per-result lookups.
        let mut outer = self.filter_metrics(
            collection1,
            &ff1,
            &proj1_with_key,
            query.sharding_key.as_deref(),
            query.has_index,
            None,
        )?;
        let iterations = self.phase1_output(collection1, &ff1, outer.results);
        // The refined output estimate changes what phase 1 ships back; its
        // RAM volumes keep the selectivity-based figure.
        outer.results = iterations;
        outer.vol_network = (outer.servers * outer.size_input) as f64
            + (iterations * outer.size_msg) as f64;

        let mut ff2_with_key = ff2;
        ff2_with_key.push(join_filter);
        let inner = self.filter_metrics(
            collection2,
            &ff2_with_key,
            &proj2,
            Some(join_field2),
            query.has_index,
            None,
        )?;

        let n = iterations as f64;
        let combined = PhaseMetrics {
            servers: outer.servers,
            selectivity: outer.selectivity,
            results: iterations,
            nb_docs: outer.nb_docs,
            docs_per_server: outer.docs_per_server,
            size_input: outer.size_input,
            size_msg: inner.size_msg,
            size_doc: outer.size_doc,
            vol_network: outer.vol_network + n * inner.vol_network,
            vol_ram: outer.vol_ram + n * inner.vol_ram,
            vol_ram_total: outer.vol_ram_total + n * inner.vol_ram_total,
        };
        let phases = JoinPhases {
            outer: Box::new(self.report(&outer, None, None)),
            inner: Box::new(self.report(&inner, None, None)),
            iterations: Measure::docs(iterations),
        };
        Ok(self.report(&combined, None, Some(phases)))
    }

    fn estimate_aggregate(&self, query: &AggregateQuery) -> Result<CostReport> {
        let (info, physical) = self.collection_info(&query.collection)?;
        let sel = selectivity(&query.collection, &physical, &query.filter_fields, self.stats);
        let servers = self.fan_out(&query.filter_fields, query.sharding_key.as_deref());
        let filtered = (sel * info.num_docs as f64) as u64;

        let groups = if query.group_by_fields.is_empty() {
            1
        } else {
            // Distinct-value estimate per group-by field, product across
            // fields, groups floored at 1.
            let distinct: f64 = query
                .group_by_fields
                .iter()
                .map(|_| (info.num_docs / 100).max(1) as f64)
                .product();
            ((filtered as f64 / distinct) as u64).max(1)
        };

        let mut output_fields = query.project_fields.clone();
        output_fields.extend(query.aggregate_functions.iter().map(|a| a.output_field()));
        let (size_input, size_msg) =
            self.query_sizes(&query.collection, &query.filter_fields, &output_fields);

        let metrics = self.assemble(
            info,
            servers,
            sel,
            groups,
            filtered,
            size_input,
            size_msg,
            query.has_index,
        );
        Ok(self.report(&metrics, Some(filtered), None))
    }

    // ------------------------------------------------------------------
    // Building blocks
    // ------------------------------------------------------------------

    /// One filter-shaped operation, end to end. `size_override` replaces
    /// the computed input/message sizes (embedded joins sum two phases').
    fn filter_metrics(
        &self,
        collection: &str,
        filter_fields: &[QueryField],
        project_fields: &[QueryField],
        sharding_key: Option<&str>,
        has_index: bool,
        size_override: Option<(u64, u64)>,
    ) -> Result<PhaseMetrics> {
        let (info, physical) = self.collection_info(collection)?;
        let sel = selectivity(collection, &physical, filter_fields, self.stats);
        let servers = self.fan_out(filter_fields, sharding_key);
        let results = (sel * info.num_docs as f64) as u64;
        let (size_input, size_msg) = size_override
            .unwrap_or_else(|| self.query_sizes(collection, filter_fields, project_fields));
        Ok(self.assemble(info, servers, sel, results, results, size_input, size_msg, has_index))
    }

    /// Volumes from counts: the common tail of every shape. `ram_results`
    /// is what each working server materializes (filtered documents for
    /// aggregates, result documents otherwise).
    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        info: &CachedCollection,
        servers: u64,
        sel: f64,
        results: u64,
        ram_results: u64,
        size_input: u64,
        size_msg: u64,
        has_index: bool,
    ) -> PhaseMetrics {
        let index = u64::from(has_index);
        let index_bytes = (index * self.stats.index_size_bytes) as f64;
        let vol_ram =
            index_bytes + (ram_results as f64 / servers as f64) * info.doc_size_bytes as f64;
        let vol_ram_total = self.ram_total(servers, vol_ram, index_bytes);
        let vol_network = (servers * size_input) as f64 + (results * size_msg) as f64;
        PhaseMetrics {
            servers,
            selectivity: sel,
            results,
            nb_docs: info.num_docs,
            docs_per_server: info.num_docs as f64 / self.stats.nb_servers as f64,
            size_input,
            size_msg,
            size_doc: info.doc_size_bytes,
            vol_network,
            vol_ram,
            vol_ram_total,
        }
    }

    /// Cluster-wide RAM: every working server pays the per-server volume,
    /// the idle rest pay only their index, if any.
    fn ram_total(&self, servers: u64, vol_ram: f64, index_bytes: f64) -> f64 {
        if servers == 1 {
            vol_ram
        } else {
            let working = self.stats.servers_working(servers);
            working as f64 * vol_ram + (servers - working) as f64 * index_bytes
        }
    }

    /// Phase-1 output count. A filter on a recognized foreign key yields
    /// one driving document per referenced document; otherwise the
    /// selectivity-based estimate stands.
    fn phase1_output(&self, collection: &str, filters: &[QueryField], fallback: u64) -> u64 {
        let nb_docs = self.stats.collection_count(collection);
        if nb_docs == 0 {
            return fallback;
        }
        for field in filters {
            let referenced = FOREIGN_KEYS
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&field.name))
                .map(|(_, target)| *target);
            if let Some(referenced) = referenced {
                let referenced_docs = self.stats.collection_count(referenced);
                if referenced_docs > 0 {
                    return (nb_docs as f64 / referenced_docs as f64) as u64;
                }
            }
        }
        fallback
    }

    /// Servers contacted: 1 when the sharding key is among the filter
    /// attribute names, the whole cluster otherwise.
    fn fan_out(&self, filter_fields: &[QueryField], sharding_key: Option<&str>) -> u64 {
        let Some(key) = sharding_key else {
            return self.stats.nb_servers;
        };
        if filter_fields
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case(key))
        {
            1
        } else {
            self.stats.nb_servers
        }
    }

    /// `size_input` and `size_msg` in bytes.
    ///
    /// Input: key + value per filter, key + inclusion marker per
    /// projection, one nesting level. Message: key + actual value per
    /// projection, embedded projections sized through their entity.
    fn query_sizes(
        &self,
        collection: &str,
        filter_fields: &[QueryField],
        project_fields: &[QueryField],
    ) -> (u64, u64) {
        let mut size_input = 0;
        for field in filter_fields {
            size_input += stats::SIZE_KEY + field.ty.byte_size();
        }
        size_input += project_fields.len() as u64 * (stats::SIZE_KEY + stats::SIZE_NUMBER);
        size_input += stats::SIZE_KEY;

        let mut size_msg = 0;
        for field in project_fields {
            let target = field.collection.as_deref().unwrap_or(collection);
            size_msg += stats::SIZE_KEY + self.value_size(target, &field.name);
        }
        (size_input, size_msg)
    }

    /// Byte size of one projected value, per the schema. Embedded objects
    /// expand to their entity's document size; anything unresolvable
    /// defaults to the number size.
    fn value_size(&self, collection: &str, field_name: &str) -> u64 {
        match self.graph.field_type(collection, field_name) {
            Some(LogicalType::Reference | LogicalType::Object) => {
                self.object_size(collection, field_name)
            }
            Some(ty) => ty.byte_size(),
            None => {
                tracing::debug!(
                    collection,
                    field = field_name,
                    "projected field not in schema, default number size"
                );
                stats::SIZE_NUMBER
            }
        }
    }

    fn object_size(&self, collection: &str, field_name: &str) -> u64 {
        let attr = self
            .graph
            .get(collection)
            .and_then(|e| e.attribute(field_name));
        match attr {
            Some(Attribute::Reference { target, .. }) if self.graph.get(target).is_some() => {
                self.sizer.size(target)
            }
            _ => stats::SIZE_NUMBER,
        }
    }

    fn field_type(&self, collection: &str, field_name: &str) -> LogicalType {
        self.graph
            .field_type(collection, field_name)
            .unwrap_or(LogicalType::Integer)
    }

    fn collection_info(&self, logical: &str) -> Result<(&'a CachedCollection, String)> {
        let physical = self.design.resolve(&self.signature, logical);
        match self.sizes.collection(&physical) {
            Some(info) => Ok((info, physical)),
            None => Err(Error::CollectionNotFound {
                collection: logical.to_string(),
                resolved: physical,
                signature: self.signature.clone(),
                available: self
                    .sizes
                    .collections
                    .iter()
                    .map(|c| c.collection.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn report(
        &self,
        metrics: &PhaseMetrics,
        filtered: Option<u64>,
        join: Option<JoinPhases>,
    ) -> CostReport {
        let time = metrics.vol_network / self.stats.network_bandwidth
            + metrics.vol_ram / self.stats.memory_bandwidth;
        let carbon_network = metrics.vol_network * self.stats.network_carbon_per_byte;
        let carbon_ram = metrics.vol_ram_total * self.stats.memory_carbon_per_byte;
        let budget = metrics.vol_network * self.stats.network_price_per_byte;
        CostReport {
            sizes: QuerySizes {
                size_input: Measure::bytes(metrics.size_input as f64),
                size_msg: Measure::bytes(metrics.size_msg as f64),
                size_doc: Measure::bytes(metrics.size_doc as f64),
            },
            distribution: Distribution {
                servers: Measure::servers(metrics.servers),
                selectivity: Measure::ratio(metrics.selectivity),
                results: Measure::docs(metrics.results),
                docs_total: Measure::docs(metrics.nb_docs),
                docs_per_server: Measure::new(metrics.docs_per_server, sizecast_core::measure::UNIT_DOCS),
                filtered: filtered.map(Measure::docs),
            },
            volumes: Volumes {
                network: Measure::bytes(metrics.vol_network),
                ram_per_server: Measure::bytes(metrics.vol_ram),
                ram_total: Measure::bytes(metrics.vol_ram_total),
            },
            costs: Costs {
                time: Measure::seconds(time),
                carbon_network: Measure::carbon(carbon_network),
                carbon_ram: Measure::carbon(carbon_ram),
                carbon_total: Measure::carbon(carbon_network + carbon_ram),
                budget: Measure::euros(budget),
            },
            join,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{AggregateFn, AggregateOp, JoinCondition};
    use serde_json::json;
    use sizecast_schema::extract;

    fn stock_product_graph() -> EntityGraph {
        extract(&json!({
            "properties": {
                "Stock": {
                    "type": "object",
                    "properties": {
                        "IDP": {"type": "number"},
                        "IDW": {"type": "number"},
                        "quantity": {"type": "number"},
                        "location": {"type": "string"}
                    },
                    "required": ["IDP", "IDW", "quantity", "location"]
                },
                "Product": {
                    "type": "object",
                    "properties": {
                        "IDP": {"type": "number"},
                        "name": {"type": "string"}
                    },
                    "required": ["IDP", "name"]
                }
            }
        }))
    }

    fn record_for(graph: &EntityGraph, stats: &DatasetStatistics) -> DesignRecord {
        let sizer = Sizer::new(graph, stats);
        DesignRecord::from_sizes("test design", &sizer.collection_sizes())
    }

    fn field(name: &str, ty: LogicalType) -> QueryField {
        QueryField::new(name, ty)
    }

    #[test]
    fn point_routed_filter_on_both_stock_keys() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Filter(FilterQuery {
                collection: "Stock".to_string(),
                filter_fields: vec![
                    field("IDP", LogicalType::Number),
                    field("IDW", LogicalType::Number),
                ],
                project_fields: vec![
                    field("quantity", LogicalType::Unknown),
                    field("location", LogicalType::Unknown),
                ],
                sharding_key: Some("IDP".to_string()),
                has_index: false,
            }))
            .unwrap();

        // Two filtered numbers, two projection markers, one nesting level.
        assert_eq!(report.sizes.size_input.value, (2 * 20 + 2 * 20 + 12) as f64);
        // Actual types from the schema: number + string.
        assert_eq!(report.sizes.size_msg.value, (20 + 92) as f64);
        assert_eq!(report.sizes.size_doc.value, 152.0);

        assert_eq!(report.distribution.servers.value, 1.0);
        assert_eq!(
            report.distribution.selectivity.value,
            1.0 / (stats.nb_products * stats.nb_warehouses) as f64
        );
        assert_eq!(report.distribution.results.value, 1.0);

        // One server queried, one matching document returned.
        assert_eq!(report.volumes.network.value, 92.0 + 112.0);
        // No index: one document materialized on the one server.
        assert_eq!(report.volumes.ram_per_server.value, 152.0);
        assert_eq!(report.volumes.ram_total.value, 152.0);
        assert_eq!(
            report.costs.time.value,
            204.0 / stats.network_bandwidth + 152.0 / stats.memory_bandwidth
        );
    }

    #[test]
    fn non_shard_key_filter_broadcasts_to_every_server() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Filter(FilterQuery {
                collection: "Stock".to_string(),
                filter_fields: vec![
                    field("IDP", LogicalType::Number),
                    field("IDW", LogicalType::Number),
                ],
                project_fields: vec![field("quantity", LogicalType::Unknown)],
                sharding_key: Some("IDC".to_string()),
                has_index: false,
            }))
            .unwrap();
        assert_eq!(report.distribution.servers.value, stats.nb_servers as f64);
    }

    #[test]
    fn indexed_broadcast_charges_idle_servers_their_index() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Filter(FilterQuery {
                collection: "Stock".to_string(),
                filter_fields: vec![field("IDW", LogicalType::Number)],
                project_fields: vec![field("quantity", LogicalType::Unknown)],
                sharding_key: None,
                has_index: true,
            }))
            .unwrap();

        let s = stats.nb_servers as f64;
        let results = (20_000_000.0 / stats.nb_warehouses as f64).floor();
        let per_server =
            stats.index_size_bytes as f64 + (results / s) * 152.0;
        assert_eq!(report.volumes.ram_per_server.value, per_server);
        assert_eq!(
            report.volumes.ram_total.value,
            50.0 * per_server + (s - 50.0) * stats.index_size_bytes as f64
        );
    }

    #[test]
    fn unknown_collection_is_fatal_and_names_alternatives() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let err = model
            .estimate(&Query::Filter(FilterQuery {
                collection: "Invoice".to_string(),
                filter_fields: vec![],
                project_fields: vec![],
                sharding_key: None,
                has_index: false,
            }))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Invoice"));
        assert!(msg.contains("Stock"));
        assert!(msg.contains("Product"));
    }

    #[test]
    fn two_phase_join_multiplies_inner_volume_by_outer_output() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Join(JoinQuery {
                collections: vec!["Stock".to_string(), "Product".to_string()],
                join_conditions: vec![JoinCondition {
                    left_collection: "Stock".to_string(),
                    left_field: "IDP".to_string(),
                    right_collection: "Product".to_string(),
                    right_field: "IDP".to_string(),
                }],
                filter_fields: vec![
                    field("IDW", LogicalType::Number).in_collection("Stock")
                ],
                project_fields: vec![
                    field("name", LogicalType::Unknown).in_collection("Product")
                ],
                sharding_key: None,
                has_index: false,
                aggregate_functions: vec![],
                group_by_fields: vec![],
            }))
            .unwrap();

        let phases = report.join.as_ref().expect("two-phase join detail");
        // IDW is a recognized warehouse key: stock rows per warehouse.
        let expected_iter =
            (stats.collection_count("Stock") / stats.nb_warehouses) as f64;
        assert_eq!(phases.iterations.value, expected_iter);
        assert_eq!(report.distribution.results.value, expected_iter);

        // Phase 2 is a point lookup.
        assert_eq!(phases.inner.distribution.servers.value, 1.0);
        // Only phase 1 broadcasts.
        assert_eq!(report.distribution.servers.value, stats.nb_servers as f64);
        assert_eq!(
            report.volumes.network.value,
            phases.outer.volumes.network.value
                + expected_iter * phases.inner.volumes.network.value
        );
        assert_eq!(
            report.volumes.ram_total.value,
            phases.outer.volumes.ram_total.value
                + expected_iter * phases.inner.volumes.ram_total.value
        );
    }

    #[test]
    fn embedded_join_collapses_to_one_filter_with_summed_sizes() {
        let stats = DatasetStatistics::default();
        // Stock embedded in Product, as DB2 lays it out.
        let graph = extract(&json!({
            "properties": {
                "Product": {
                    "type": "object",
                    "properties": {
                        "IDP": {"type": "number"},
                        "name": {"type": "string"},
                        "stock": {
                            "type": "array",
                            "items": {
                                "properties": {
                                    "IDW": {"type": "number"},
                                    "quantity": {"type": "number"}
                                },
                                "required": ["IDW", "quantity"]
                            }
                        }
                    },
                    "required": ["IDP", "name", "stock"]
                }
            }
        }));
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB2", &record);

        let report = model
            .estimate(&Query::Join(JoinQuery {
                collections: vec!["Stock".to_string(), "Product".to_string()],
                join_conditions: vec![JoinCondition {
                    left_collection: "Stock".to_string(),
                    left_field: "IDP".to_string(),
                    right_collection: "Product".to_string(),
                    right_field: "IDP".to_string(),
                }],
                filter_fields: vec![
                    field("IDW", LogicalType::Number).in_collection("Stock")
                ],
                project_fields: vec![
                    field("quantity", LogicalType::Unknown).in_collection("Stock"),
                    field("name", LogicalType::Unknown).in_collection("Product"),
                ],
                sharding_key: None,
                has_index: false,
                aggregate_functions: vec![],
                group_by_fields: vec![],
            }))
            .unwrap();

        // No phase detail: the join ran as one filter on Product.
        assert!(report.join.is_none());

        // Phase 1: IDW filter (20) + quantity marker (20) + join-key
        // marker (20) + nesting (12) = 72.
        // Phase 2: IDP join filter (20) + name marker (20) + nesting = 52.
        assert_eq!(report.sizes.size_input.value, 72.0 + 52.0);
        // Messages: quantity (20) + IDP (20), then name (12 + 80).
        assert_eq!(report.sizes.size_msg.value, 40.0 + 92.0);

        // Selectivity of the embedded-stock IDW filter, applied to the
        // physical Product collection.
        assert_eq!(
            report.distribution.selectivity.value,
            1.0 / stats.nb_warehouses as f64
        );
        let res = (stats.nb_products as f64 / stats.nb_warehouses as f64).floor();
        assert_eq!(report.distribution.results.value, res);
        assert_eq!(
            report.volumes.network.value,
            stats.nb_servers as f64 * 124.0 + res * 132.0
        );
    }

    #[test]
    fn aggregate_groups_bound_the_result_count() {
        let stats = DatasetStatistics::default();
        let graph = extract(&json!({
            "properties": {
                "OrderLine": {
                    "type": "object",
                    "properties": {
                        "IDC": {"type": "number"},
                        "IDP": {"type": "number"},
                        "quantity": {"type": "number"},
                        "orderDate": {"type": "string"}
                    },
                    "required": ["IDC", "IDP", "quantity", "orderDate"]
                }
            }
        }));
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Aggregate(AggregateQuery {
                collection: "OrderLine".to_string(),
                filter_fields: vec![field("date", LogicalType::Date)],
                project_fields: vec![field("IDP", LogicalType::Unknown)],
                aggregate_functions: vec![AggregateFn {
                    function: AggregateOp::Sum,
                    field: "quantity".to_string(),
                }],
                group_by_fields: vec![field("IDP", LogicalType::Unknown)],
                sharding_key: None,
                has_index: false,
            }))
            .unwrap();

        let filtered = report.distribution.filtered.expect("filtered count");
        assert!(report.distribution.results.value <= filtered.value);
        assert!(report.distribution.results.value >= 1.0);

        // Output per group: the projected IDP plus one synthetic numeric
        // aggregate field.
        assert_eq!(report.sizes.size_msg.value, (12 + 8) as f64 + (12 + 8) as f64);
    }

    #[test]
    fn aggregate_without_group_by_returns_one_group() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let report = model
            .estimate(&Query::Aggregate(AggregateQuery {
                collection: "Stock".to_string(),
                filter_fields: vec![field("IDW", LogicalType::Number)],
                project_fields: vec![],
                aggregate_functions: vec![AggregateFn {
                    function: AggregateOp::Count,
                    field: "IDP".to_string(),
                }],
                group_by_fields: vec![],
                sharding_key: None,
                has_index: false,
            }))
            .unwrap();
        assert_eq!(report.distribution.results.value, 1.0);
    }

    #[test]
    fn join_with_wrong_arity_is_rejected() {
        let stats = DatasetStatistics::default();
        let graph = stock_product_graph();
        let sizer = Sizer::new(&graph, &stats);
        let design = DesignMap::default();
        let record = record_for(&graph, &stats);
        let model = CostModel::new(&stats, &graph, &sizer, &design, "DB0", &record);

        let err = model
            .estimate(&Query::Join(JoinQuery {
                collections: vec!["Stock".to_string()],
                join_conditions: vec![],
                filter_fields: vec![],
                project_fields: vec![],
                sharding_key: None,
                has_index: false,
                aggregate_functions: vec![],
                group_by_fields: vec![],
            }))
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }
}
