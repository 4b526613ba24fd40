//! Dataset and infrastructure statistics that downstream crates consume.
//!
//! One immutable value is constructed per estimation session and passed
//! explicitly to the extractor, the sizer, and the cost model. Nothing here
//! is mutated after construction.

use serde::{Deserialize, Serialize};

// Approximate per-value byte sizes (MongoDB-style, single source of truth).
pub const SIZE_NUMBER: u64 = 8;
pub const SIZE_STRING: u64 = 80;
pub const SIZE_DATE: u64 = 20;
pub const SIZE_LONGSTRING: u64 = 200;
pub const SIZE_ARRAY: u64 = 0;
/// Key overhead: key string + colon + type header.
pub const SIZE_KEY: u64 = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStatistics {
    // Core dataset volumes.
    pub nb_clients: u64,
    pub nb_products: u64,
    pub nb_orderlines: u64,
    pub nb_warehouses: u64,

    // Behavioural averages and skew constants.
    pub avg_orders_per_customer: u64,
    pub avg_products_per_customer: u64,
    pub avg_categories_per_product: u64,
    pub nb_distinct_brands: u64,
    /// Products carrying the one popular brand the selectivity table models.
    pub nb_popular_brand_products: u64,
    pub nb_days: u64,

    // Infrastructure.
    pub nb_servers: u64,
    /// Servers assumed to actually hold matching data when a query fans out.
    pub nb_servers_working: u64,
    /// Fixed per-server index footprint in bytes.
    pub index_size_bytes: u64,
    /// Network throughput, bytes per second.
    pub network_bandwidth: f64,
    /// Memory throughput, bytes per second.
    pub memory_bandwidth: f64,
    /// kgCO2eq emitted per byte moved over the network.
    pub network_carbon_per_byte: f64,
    /// kgCO2eq emitted per byte touched in RAM.
    pub memory_carbon_per_byte: f64,
    /// Euros charged per byte moved over the network.
    pub network_price_per_byte: f64,
}

impl Default for DatasetStatistics {
    fn default() -> Self {
        Self {
            nb_clients: 10_u64.pow(7),
            nb_products: 10_u64.pow(5),
            nb_orderlines: 4 * 10_u64.pow(9),
            nb_warehouses: 200,

            avg_orders_per_customer: 100,
            avg_products_per_customer: 20,
            avg_categories_per_product: 2,
            nb_distinct_brands: 5_000,
            nb_popular_brand_products: 50,
            nb_days: 365,

            nb_servers: 1_000,
            nb_servers_working: 50,
            index_size_bytes: 1_000_000,
            network_bandwidth: 1e9,
            memory_bandwidth: 1e10,
            network_carbon_per_byte: 1.1e-11,
            memory_carbon_per_byte: 1.0e-12,
            network_price_per_byte: 1.1e-11,
        }
    }
}

impl DatasetStatistics {
    /// Expected document count for a logical collection, case-insensitive.
    /// Unknown collections count zero rather than erroring.
    pub fn collection_count(&self, name: &str) -> u64 {
        match name.to_ascii_lowercase().as_str() {
            "client" => self.nb_clients,
            "product" => self.nb_products,
            "orderline" => self.nb_orderlines,
            "warehouse" => self.nb_warehouses,
            // One stock row per product per warehouse.
            "stock" => self.nb_products * self.nb_warehouses,
            _ => 0,
        }
    }

    /// `nb_srv_working` for a given fan-out: 1 when the query is routed to a
    /// single server, a fixed constant otherwise.
    pub fn servers_working(&self, fan_out: u64) -> u64 {
        if fan_out == 1 {
            1
        } else {
            self.nb_servers_working
        }
    }
}
