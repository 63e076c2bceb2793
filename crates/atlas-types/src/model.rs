//! Data dictionary model: tables grouped into domains across three layers.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LAYER
// ============================================================================

/// Stratum a table belongs to (L1 raw, L2 enriched, L3 derived)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    L1,
    L2,
    L3,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::L1 => "L1",
            Layer::L2 => "L2",
            Layer::L3 => "L3",
        }
    }

    /// Zero-based row index used by layered layouts
    pub fn index(&self) -> usize {
        match self {
            Layer::L1 => 0,
            Layer::L2 => 1,
            Layer::L3 => 2,
        }
    }

    pub fn all() -> &'static [Layer] {
        &[Layer::L1, Layer::L2, Layer::L3]
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L1" => Ok(Layer::L1),
            "L2" => Ok(Layer::L2),
            "L3" => Ok(Layer::L3),
            _ => Err(TypeError::UnknownLayer(s.to_string())),
        }
    }
}

/// Build the canonical table key `"{layer}.{name}"`
pub fn table_key(layer: Layer, name: &str) -> String {
    format!("{}.{}", layer, name)
}

// ============================================================================
// TABLES
// ============================================================================

/// A column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            is_primary_key: false,
            is_foreign_key: false,
        }
    }

    pub fn with_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }
}

/// A table node of the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Unique key, `"{layer}.{name}"`
    pub key: String,
    /// Display name
    pub name: String,
    pub layer: Layer,
    /// Domain the table belongs to
    pub category: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Table {
    pub fn new(layer: Layer, name: impl Into<String>, category: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: table_key(layer, &name),
            name,
            layer,
            category: category.into(),
            fields: Vec::new(),
            description: None,
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Row index of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// ============================================================================
// RELATIONSHIPS
// ============================================================================

/// Kind of link between two tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// Direct key reference
    #[default]
    Primary,
    /// Derived or cross-layer lineage
    Secondary,
}

impl FromStr for RelationshipKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(RelationshipKind::Primary),
            "secondary" => Ok(RelationshipKind::Secondary),
            _ => Err(TypeError::UnknownRelationshipKind(s.to_string())),
        }
    }
}

/// Directed link from a source table (optionally a field) to a target table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    #[serde(default)]
    pub source_field: Option<String>,
    pub target: String,
    #[serde(default)]
    pub target_field: Option<String>,
    #[serde(default)]
    pub kind: RelationshipKind,
    #[serde(default)]
    pub cross_layer: bool,
}

impl Relationship {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_field: None,
            target: target.into(),
            target_field: None,
            kind: RelationshipKind::Primary,
            cross_layer: false,
        }
    }

    pub fn with_fields(
        mut self,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        self.source_field = Some(source_field.into());
        self.target_field = Some(target_field.into());
        self
    }

    pub fn secondary(mut self) -> Self {
        self.kind = RelationshipKind::Secondary;
        self
    }

    pub fn cross_layer(mut self) -> Self {
        self.cross_layer = true;
        self
    }

    /// True if either endpoint is `key`
    pub fn touches(&self, key: &str) -> bool {
        self.source == key || self.target == key
    }

    /// Self-loops carry no connectivity information
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// The complete data dictionary handed over by the model builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Tables in insertion order
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Declared category list (may be empty)
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Model {
    pub fn new(tables: Vec<Table>, relationships: Vec<Relationship>) -> Self {
        Self {
            tables,
            relationships,
            categories: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = String>) -> Self {
        self.categories = categories.into_iter().collect();
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn table(&self, key: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Categories in display order: declared ones first, then undeclared ones
    /// in order of first appearance among the tables.
    pub fn category_order(&self) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let declared = self.categories.iter().map(String::as_str);
        let discovered = self.tables.iter().map(|t| t.category.as_str());
        for category in declared.chain(discovered) {
            if seen.insert(category) {
                order.push(category);
            }
        }
        order
    }

    pub fn tables_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Table> {
        self.tables.iter().filter(move |t| t.category == category)
    }

    pub fn relationships_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().filter(move |r| r.touches(key))
    }
}
