//! Design signatures and logical-to-physical collection resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-signature mapping from logical collection names to the physical
/// collection that actually stores them under that design. A logical name
/// absent from its signature's mapping is physical itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignMap {
    mappings: BTreeMap<String, BTreeMap<String, String>>,
}

impl DesignMap {
    pub fn new(mappings: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { mappings }
    }

    /// Resolve a logical collection under a signature. Identity for
    /// unmapped names and unknown signatures.
    pub fn resolve(&self, signature: &str, logical: &str) -> String {
        self.mappings
            .get(signature)
            .and_then(|m| m.get(logical))
            .cloned()
            .unwrap_or_else(|| logical.to_string())
    }

    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }
}

impl Default for DesignMap {
    /// The six reference designs of the order-management dataset.
    fn default() -> Self {
        fn embeds(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
            pairs
                .iter()
                .map(|(l, p)| (l.to_string(), p.to_string()))
                .collect()
        }

        let mut mappings = BTreeMap::new();
        // DB0: fully normalized, nothing embedded.
        mappings.insert("DB0".to_string(), BTreeMap::new());
        // DB1: categories and supplier embedded in Product.
        mappings.insert(
            "DB1".to_string(),
            embeds(&[("Categories", "Product"), ("Supplier", "Product")]),
        );
        // DB2: DB1 plus stock embedded in Product.
        mappings.insert(
            "DB2".to_string(),
            embeds(&[
                ("Stock", "Product"),
                ("Categories", "Product"),
                ("Supplier", "Product"),
            ]),
        );
        // DB3: product (with its categories and supplier) embedded in Stock.
        mappings.insert(
            "DB3".to_string(),
            embeds(&[
                ("Product", "Stock"),
                ("Categories", "Stock"),
                ("Supplier", "Stock"),
            ]),
        );
        // DB4: product embedded in OrderLine.
        mappings.insert(
            "DB4".to_string(),
            embeds(&[
                ("Product", "OrderLine"),
                ("Categories", "OrderLine"),
                ("Supplier", "OrderLine"),
            ]),
        );
        // DB5: order lines and stock embedded in Product.
        mappings.insert(
            "DB5".to_string(),
            embeds(&[
                ("OrderLine", "Product"),
                ("Stock", "Product"),
                ("Categories", "Product"),
                ("Supplier", "Product"),
            ]),
        );
        Self { mappings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_collections_resolve_to_their_parent() {
        let map = DesignMap::default();
        assert_eq!(map.resolve("DB2", "Stock"), "Product");
        assert_eq!(map.resolve("DB3", "Product"), "Stock");
        assert_eq!(map.resolve("DB5", "OrderLine"), "Product");
    }

    #[test]
    fn unmapped_names_and_signatures_resolve_to_themselves() {
        let map = DesignMap::default();
        assert_eq!(map.resolve("DB0", "Stock"), "Stock");
        assert_eq!(map.resolve("DB2", "Client"), "Client");
        assert_eq!(map.resolve("DB99", "Stock"), "Stock");
    }
}
