//! The selectivity table.
//!
//! A hard-coded enumeration of (collection, filter-attribute set) pairs.
//! The cases are reproduced exactly as modeled for the order-management
//! dataset; anything unrecognized falls back to a fixed moderate fraction.

use sizecast_core::stats::DatasetStatistics;

use crate::query::QueryField;

pub const DEFAULT_SELECTIVITY: f64 = 0.01;

/// Fraction of `collection`'s documents expected to match the filter.
///
/// `physical` is the collection the logical name resolves to under the
/// active design; it only matters for Stock, whose fractions change when
/// it is embedded in Product (one matching product document instead of
/// one matching stock row).
pub fn selectivity(
    collection: &str,
    physical: &str,
    filter_fields: &[QueryField],
    stats: &DatasetStatistics,
) -> f64 {
    let names: Vec<String> = filter_fields
        .iter()
        .map(|f| f.name.to_ascii_lowercase())
        .collect();
    let has = |n: &str| names.iter().any(|x| x == n);

    match collection.to_ascii_lowercase().as_str() {
        "stock" if physical.eq_ignore_ascii_case("product") => {
            // Stock embedded in Product: the unit of selection is a
            // product document.
            if has("idp") {
                return 1.0 / stats.nb_products as f64;
            }
            if has("idw") {
                return 1.0 / stats.nb_warehouses as f64;
            }
        }
        "stock" => {
            if has("idp") && has("idw") {
                return 1.0 / (stats.nb_products * stats.nb_warehouses) as f64;
            }
            if has("idp") {
                return 1.0 / stats.nb_products as f64;
            }
            if has("idw") {
                return 1.0 / stats.nb_warehouses as f64;
            }
        }
        "product" => {
            if has("brand") {
                // One popular brand dominates the modeled workload.
                return stats.nb_popular_brand_products as f64 / stats.nb_products as f64;
            }
            if has("idp") {
                return 1.0 / stats.nb_products as f64;
            }
        }
        "orderline" => {
            if has("date") {
                return 1.0 / stats.nb_days as f64;
            }
            if has("idc") {
                return 1.0 / stats.nb_clients as f64;
            }
            if has("idp") {
                return 1.0 / stats.nb_products as f64;
            }
        }
        _ => {}
    }

    tracing::debug!(
        collection,
        filters = ?names,
        "no selectivity rule, using default"
    );
    DEFAULT_SELECTIVITY
}
