//! Visibility filters supplied by the filtering UI.
//!
//! A table is visible when its layer is enabled, its category is allowed
//! (an empty allow-list admits every category) and, while a search query is
//! active, it matches the query.

use crate::model::{Layer, Model, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-layer visibility toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerFilter {
    pub l1: bool,
    pub l2: bool,
    pub l3: bool,
}

impl Default for LayerFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl LayerFilter {
    pub fn all() -> Self {
        Self {
            l1: true,
            l2: true,
            l3: true,
        }
    }

    pub fn only(layer: Layer) -> Self {
        Self {
            l1: layer == Layer::L1,
            l2: layer == Layer::L2,
            l3: layer == Layer::L3,
        }
    }

    pub fn allows(&self, layer: Layer) -> bool {
        match layer {
            Layer::L1 => self.l1,
            Layer::L2 => self.l2,
            Layer::L3 => self.l3,
        }
    }

    pub fn set(&mut self, layer: Layer, visible: bool) {
        match layer {
            Layer::L1 => self.l1 = visible,
            Layer::L2 => self.l2 = visible,
            Layer::L3 => self.l3 = visible,
        }
    }
}

/// Combined layer, category and search filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFilter {
    #[serde(default)]
    pub layers: LayerFilter,
    /// Allowed categories, empty = all
    #[serde(default)]
    pub categories: BTreeSet<String>,
    #[serde(default)]
    pub search: String,
}

impl ModelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_search_active(&self) -> bool {
        !self.search.trim().is_empty()
    }

    pub fn allows_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.contains(category)
    }

    /// Case-insensitive match on table name, key or any field name
    pub fn matches_search(&self, table: &Table) -> bool {
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        table.name.to_lowercase().contains(&query)
            || table.key.to_lowercase().contains(&query)
            || table
                .fields
                .iter()
                .any(|f| f.name.to_lowercase().contains(&query))
    }

    pub fn is_visible(&self, table: &Table) -> bool {
        self.layers.allows(table.layer)
            && self.allows_category(&table.category)
            && self.matches_search(table)
    }

    /// Visible tables in model order
    pub fn visible_tables<'a>(&self, model: &'a Model) -> Vec<&'a Table> {
        model.tables.iter().filter(|t| self.is_visible(t)).collect()
    }

    /// Visible table keys in model order
    pub fn visible_keys(&self, model: &Model) -> Vec<String> {
        self.visible_tables(model)
            .into_iter()
            .map(|t| t.key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use pretty_assertions::assert_eq;

    fn model() -> Model {
        Model::new(
            vec![
                Table::new(Layer::L1, "customers", "crm")
                    .with_fields(vec![Field::new("customer_id"), Field::new("email")]),
                Table::new(Layer::L2, "orders", "sales").with_fields(vec![Field::new("order_id")]),
                Table::new(Layer::L3, "revenue", "finance"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_default_filter_shows_everything() {
        let filter = ModelFilter::new();
        assert_eq!(filter.visible_keys(&model()).len(), 3);
    }

    #[test]
    fn test_layer_and_category_filters_combine() {
        let mut filter = ModelFilter::new();
        filter.layers.set(Layer::L3, false);
        filter.categories.insert("sales".to_string());
        assert_eq!(filter.visible_keys(&model()), vec!["L2.orders".to_string()]);
    }

    #[test]
    fn test_search_matches_field_names() {
        let filter = ModelFilter {
            search: "EMAIL".to_string(),
            ..ModelFilter::default()
        };
        assert!(filter.is_search_active());
        assert_eq!(filter.visible_keys(&model()), vec!["L1.customers".to_string()]);
    }

    #[test]
    fn test_whitespace_query_is_inactive() {
        let filter = ModelFilter {
            search: "   ".to_string(),
            ..ModelFilter::default()
        };
        assert!(!filter.is_search_active());
        assert_eq!(filter.visible_keys(&model()).len(), 3);
    }

    #[test]
    fn test_layer_filter_only() {
        let only = LayerFilter::only(Layer::L2);
        assert!(!only.allows(Layer::L1));
        assert!(only.allows(Layer::L2));
    }
}
