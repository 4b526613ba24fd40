//! Structured query input, as produced by the external query parser.

use serde::{Deserialize, Serialize};
use sizecast_core::LogicalType;

/// One filter or projection field. The parser pre-resolves `ty` from the
/// schema; anything it could not resolve deserializes to
/// [`LogicalType::Unknown`] and sizes as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: LogicalType,
    /// Which side of a join the field belongs to; absent for
    /// single-collection queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl QueryField {
    pub fn new(name: impl Into<String>, ty: LogicalType) -> Self {
        Self {
            name: name.into(),
            ty,
            collection: None,
        }
    }

    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Whether this field belongs to `collection` (fields without a
    /// collection tag belong to none).
    pub fn belongs_to(&self, collection: &str) -> bool {
        self.collection
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(collection))
    }
}

/// Equi-join condition between two collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinCondition {
    pub left_collection: String,
    pub left_field: String,
    pub right_collection: String,
    pub right_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// One aggregate expression, e.g. `SUM(quantity)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFn {
    pub function: AggregateOp,
    pub field: String,
}

impl AggregateFn {
    /// The synthetic numeric output field this aggregate adds to every
    /// result row.
    pub fn output_field(&self) -> QueryField {
        QueryField::new(
            format!("{}_{}", self.function.as_str(), self.field),
            LogicalType::Integer,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub collection: String,
    #[serde(default)]
    pub filter_fields: Vec<QueryField>,
    #[serde(default)]
    pub project_fields: Vec<QueryField>,
    #[serde(default)]
    pub sharding_key: Option<String>,
    #[serde(default)]
    pub has_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinQuery {
    /// Exactly two logical collections, driving side first.
    pub collections: Vec<String>,
    pub join_conditions: Vec<JoinCondition>,
    #[serde(default)]
    pub filter_fields: Vec<QueryField>,
    #[serde(default)]
    pub project_fields: Vec<QueryField>,
    #[serde(default)]
    pub sharding_key: Option<String>,
    #[serde(default)]
    pub has_index: bool,
    /// Present for join-with-aggregation queries; does not change the join
    /// cost itself.
    #[serde(default)]
    pub aggregate_functions: Vec<AggregateFn>,
    #[serde(default)]
    pub group_by_fields: Vec<QueryField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateQuery {
    pub collection: String,
    #[serde(default)]
    pub filter_fields: Vec<QueryField>,
    #[serde(default)]
    pub project_fields: Vec<QueryField>,
    #[serde(default)]
    pub aggregate_functions: Vec<AggregateFn>,
    #[serde(default)]
    pub group_by_fields: Vec<QueryField>,
    #[serde(default)]
    pub sharding_key: Option<String>,
    #[serde(default)]
    pub has_index: bool,
}

/// The three query shapes, tagged the way the parser emits them. All cost
/// estimation goes through [`crate::CostModel::estimate`], the single
/// dispatch point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query_type", rename_all = "snake_case")]
pub enum Query {
    Filter(FilterQuery),
    #[serde(alias = "join_aggregate")]
    Join(JoinQuery),
    Aggregate(AggregateQuery),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_deserializes_from_parser_output() {
        let q: Query = serde_json::from_str(
            r#"{
                "query_type": "filter",
                "collection": "Stock",
                "filter_fields": [
                    {"name": "IDP", "type": "number"},
                    {"name": "IDW", "type": "number"}
                ],
                "project_fields": [
                    {"name": "quantity", "type": "boolean"},
                    {"name": "location", "type": "boolean"}
                ],
                "sharding_key": "IDP",
                "has_index": true
            }"#,
        )
        .unwrap();
        let Query::Filter(f) = q else {
            panic!("expected filter");
        };
        assert_eq!(f.collection, "Stock");
        // The parser's boolean projection markers size as numbers.
        assert_eq!(f.project_fields[0].ty, LogicalType::Unknown);
        assert_eq!(f.project_fields[0].ty.byte_size(), 8);
    }

    #[test]
    fn join_aggregate_tag_is_an_alias_for_join() {
        let q: Query = serde_json::from_str(
            r#"{
                "query_type": "join_aggregate",
                "collections": ["Stock", "Product"],
                "join_conditions": [{
                    "left_collection": "Stock", "left_field": "IDP",
                    "right_collection": "Product", "right_field": "IDP"
                }],
                "aggregate_functions": [{"function": "sum", "field": "quantity"}]
            }"#,
        )
        .unwrap();
        let Query::Join(j) = q else {
            panic!("expected join");
        };
        assert_eq!(j.aggregate_functions.len(), 1);
        assert_eq!(
            j.aggregate_functions[0].output_field().name,
            "sum_quantity"
        );
    }

    #[test]
    fn fields_belong_to_their_tagged_collection() {
        let field = QueryField::new("IDW", LogicalType::Number).in_collection("Stock");
        assert!(field.belongs_to("stock"));
        assert!(!field.belongs_to("Product"));
        assert!(!QueryField::new("IDW", LogicalType::Number).belongs_to("Stock"));
    }
}
