//! View settings the UI can change: layout strategy, card size and detail level.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout strategy for positioning table nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Category blocks packed into rows
    #[default]
    Grid,
    /// Connected components in three layer rows
    Hierarchical,
    /// One container per domain, sized to content
    Domain,
    /// Dense domain containers with small cards
    DomainOverview,
    /// Spring refinement seeded from the grid
    Force,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::Hierarchical => "hierarchical",
            LayoutMode::Domain => "domain",
            LayoutMode::DomainOverview => "domain-overview",
            LayoutMode::Force => "force",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LayoutMode::Grid => "Grid",
            LayoutMode::Hierarchical => "Hierarchical",
            LayoutMode::Domain => "Domains",
            LayoutMode::DomainOverview => "Domain Overview",
            LayoutMode::Force => "Force",
        }
    }

    /// Overview modes use their own zoom bands when fitting
    pub fn is_overview(&self) -> bool {
        matches!(self, LayoutMode::DomainOverview)
    }

    /// Whether positions from manual drags survive a relayout
    pub fn preserves_manual_positions(&self) -> bool {
        !self.is_overview()
    }

    /// Modes whose renderer frames domains in containers
    pub fn shows_domain_containers(&self) -> bool {
        matches!(self, LayoutMode::Domain | LayoutMode::DomainOverview)
    }

    pub fn all() -> &'static [LayoutMode] {
        &[
            LayoutMode::Grid,
            LayoutMode::Hierarchical,
            LayoutMode::Domain,
            LayoutMode::DomainOverview,
            LayoutMode::Force,
        ]
    }
}

impl FromStr for LayoutMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| TypeError::UnknownLayoutMode(s.to_string()))
    }
}

/// Card size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TableSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableSize::Small => "small",
            TableSize::Medium => "medium",
            TableSize::Large => "large",
        }
    }

    pub fn all() -> &'static [TableSize] {
        &[TableSize::Small, TableSize::Medium, TableSize::Large]
    }
}

impl FromStr for TableSize {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableSize::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| TypeError::UnknownTableSize(s.to_string()))
    }
}

/// Card detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Header plus a few fields, table-level edges
    Compact,
    #[default]
    Standard,
    /// Tall cards with most fields visible
    Detailed,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Compact => "compact",
            ViewMode::Standard => "standard",
            ViewMode::Detailed => "detailed",
        }
    }

    /// Whether edges attach to individual field rows
    pub fn field_level_edges(&self) -> bool {
        !matches!(self, ViewMode::Compact)
    }

    pub fn all() -> &'static [ViewMode] {
        &[ViewMode::Compact, ViewMode::Standard, ViewMode::Detailed]
    }
}

impl FromStr for ViewMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| TypeError::UnknownViewMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_mode_strings_roundtrip() {
        for mode in LayoutMode::all() {
            assert_eq!(mode.as_str().parse::<LayoutMode>(), Ok(*mode));
        }
        assert_eq!(
            serde_json::to_string(&LayoutMode::DomainOverview).unwrap(),
            "\"domain-overview\""
        );
    }

    #[test]
    fn test_only_overview_discards_manual_positions() {
        assert!(!LayoutMode::DomainOverview.preserves_manual_positions());
        assert!(LayoutMode::Force.preserves_manual_positions());
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!("huge".parse::<TableSize>().is_err());
        assert!("minimal".parse::<ViewMode>().is_err());
        assert!(!ViewMode::Compact.field_level_edges());
    }
}
