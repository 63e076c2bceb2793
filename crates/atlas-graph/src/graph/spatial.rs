//! Spatial Index for world-space hit testing
//!
//! Uses R-tree (via `rstar`) so hover/click lookups stay O(log n) on large
//! dictionaries. Holds two kinds of entries: table cards and domain header
//! strips. Cards win over headers when both contain a point.

use super::grouping::DomainBox;
use super::layout::PositionMap;
use super::sizing::NodeGeometry;
use egui::{Pos2, Rect};
use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

/// What an index entry stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpatialKind {
    Table,
    DomainHeader,
}

/// Spatial index entry
#[derive(Debug, Clone)]
pub struct SpatialNode {
    /// Table key or category name
    pub id: String,
    pub kind: SpatialKind,
    bounds: AABB<[f32; 2]>,
    pub center: [f32; 2],
}

impl SpatialNode {
    pub fn from_rect(id: impl Into<String>, kind: SpatialKind, rect: Rect) -> Self {
        let center = rect.center();
        Self {
            id: id.into(),
            kind,
            bounds: AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]),
            center: [center.x, center.y],
        }
    }

    pub fn rect(&self) -> Rect {
        let lower = self.bounds.lower();
        let upper = self.bounds.upper();
        Rect::from_min_max(Pos2::new(lower[0], lower[1]), Pos2::new(upper[0], upper[1]))
    }
}

impl RTreeObject for SpatialNode {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for SpatialNode {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        self.bounds.distance_2(point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.bounds.contains_point(point)
    }
}

/// Raw hit before field rows are mapped to field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpatialHit {
    Table {
        key: String,
        /// Content row under the point, when field-level rows are shown
        row: Option<usize>,
    },
    DomainHeader(String),
}

#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialNode>,
    count: usize,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the current positions and domain containers
    pub fn build(
        positions: &PositionMap,
        geometry: &NodeGeometry,
        domains: &[DomainBox],
        header_offset: f32,
    ) -> Self {
        let mut nodes: Vec<SpatialNode> = positions
            .iter()
            .filter(|(_, pos)| pos.x.is_finite() && pos.y.is_finite())
            .map(|(key, pos)| SpatialNode::from_rect(key.clone(), SpatialKind::Table, geometry.rect_at(*pos)))
            .collect();
        nodes.extend(domains.iter().map(|domain| {
            SpatialNode::from_rect(
                domain.category.clone(),
                SpatialKind::DomainHeader,
                domain.header_rect(header_offset),
            )
        }));
        let count = nodes.len();
        Self {
            tree: RTree::bulk_load(nodes),
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Topmost entry at a world point.
    ///
    /// Overlapping cards resolve to the one whose center is closest, ties to the
    /// smaller key, so the answer does not depend on tree layout.
    pub fn hit_test(&self, point: Pos2, geometry: &NodeGeometry) -> Option<SpatialHit> {
        let p = [point.x, point.y];
        let mut table: Option<&SpatialNode> = None;
        let mut header: Option<&SpatialNode> = None;

        for node in self.tree.locate_all_at_point(&p) {
            let slot = match node.kind {
                SpatialKind::Table => &mut table,
                SpatialKind::DomainHeader => &mut header,
            };
            let better = match slot {
                None => true,
                Some(current) => closer(node, current, p),
            };
            if better {
                *slot = Some(node);
            }
        }

        if let Some(node) = table {
            let row = geometry.field_row_at(node.rect().min, point);
            return Some(SpatialHit::Table {
                key: node.id.clone(),
                row,
            });
        }
        header.map(|node| SpatialHit::DomainHeader(node.id.clone()))
    }

    /// Table keys whose cards intersect a world rect
    pub fn tables_in_rect(&self, rect: Rect) -> Vec<&str> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);
        let mut keys: Vec<&str> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|n| n.kind == SpatialKind::Table)
            .map(|n| n.id.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

fn closer(candidate: &SpatialNode, current: &SpatialNode, p: [f32; 2]) -> bool {
    let da = center_distance_2(candidate, p);
    let db = center_distance_2(current, p);
    da < db || (da == db && candidate.id < current.id)
}

fn center_distance_2(node: &SpatialNode, p: [f32; 2]) -> f32 {
    let dx = p[0] - node.center[0];
    let dy = p[1] - node.center[1];
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::config::SizingConfig;
    use atlas_types::{LayoutMode, TableSize, ViewMode};
    use egui::Vec2;
    use pretty_assertions::assert_eq;

    fn geometry(view: ViewMode) -> NodeGeometry {
        NodeGeometry::new(&SizingConfig::default(), TableSize::Medium, view, LayoutMode::Grid, false)
    }

    fn positions() -> PositionMap {
        let mut p = PositionMap::new();
        p.insert("L1.a".into(), Pos2::new(0.0, 0.0));
        p.insert("L1.b".into(), Pos2::new(300.0, 0.0));
        p
    }

    #[test]
    fn test_hit_table_and_field_row() {
        let geo = geometry(ViewMode::Standard);
        let index = SpatialIndex::build(&positions(), &geo, &[], 40.0);
        assert_eq!(index.len(), 2);

        let y = geo.header_height + geo.row_height() * 1.5;
        assert_eq!(
            index.hit_test(Pos2::new(310.0, y), &geo),
            Some(SpatialHit::Table {
                key: "L1.b".into(),
                row: Some(1)
            })
        );
        assert_eq!(
            index.hit_test(Pos2::new(10.0, 2.0), &geo),
            Some(SpatialHit::Table {
                key: "L1.a".into(),
                row: None
            })
        );
        assert_eq!(index.hit_test(Pos2::new(270.0, 50.0), &geo), None);
    }

    #[test]
    fn test_domain_header_hit_below_cards() {
        let geo = geometry(ViewMode::Compact);
        let domain = DomainBox {
            category: "sales".into(),
            rect: Rect::from_min_size(Pos2::new(-24.0, -64.0), Vec2::new(588.0, 300.0)),
            member_count: 2,
        };
        let index = SpatialIndex::build(&positions(), &geo, &[domain], 40.0);

        assert_eq!(
            index.hit_test(Pos2::new(100.0, -50.0), &geo),
            Some(SpatialHit::DomainHeader("sales".into()))
        );
        // inside the container body but not on the header
        assert_eq!(index.hit_test(Pos2::new(270.0, 50.0), &geo), None);
    }

    #[test]
    fn test_tables_in_rect() {
        let geo = geometry(ViewMode::Standard);
        let index = SpatialIndex::build(&positions(), &geo, &[], 40.0);
        let keys = index.tables_in_rect(Rect::from_min_max(Pos2::new(250.0, 10.0), Pos2::new(400.0, 20.0)));
        assert_eq!(keys, vec!["L1.b"]);
    }
}
