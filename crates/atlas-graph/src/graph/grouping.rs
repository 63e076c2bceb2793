//! Domain grouping - container rectangles around each category's tables
//!
//! Read-only view over the position map: the union of a domain's member cards,
//! grown by the padding plus a header strip above and a footer strip below.
//! Domains with no positioned member get no rectangle.

use super::config::GroupingConfig;
use super::layout::PositionMap;
use super::sizing::NodeGeometry;
use atlas_types::{Model, ModelFilter};
use egui::{Rect, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct DomainBox {
    pub category: String,
    pub rect: Rect,
    pub member_count: usize,
}

impl DomainBox {
    /// Title strip at the top of the container
    pub fn header_rect(&self, header_offset: f32) -> Rect {
        Rect::from_min_max(
            self.rect.min,
            egui::pos2(self.rect.max.x, (self.rect.min.y + header_offset).min(self.rect.max.y)),
        )
    }
}

/// Member card rects of one category that currently have a position
pub fn member_rects(
    model: &Model,
    filter: &ModelFilter,
    positions: &PositionMap,
    geometry: &NodeGeometry,
    category: &str,
) -> Vec<Rect> {
    model
        .tables_in_category(category)
        .filter(|t| filter.is_visible(t))
        .filter_map(|t| positions.get(&t.key))
        .map(|pos| geometry.rect_at(*pos))
        .collect()
}

/// Container rectangle for every category with at least one positioned,
/// visible member, in model category order
pub fn compute_domain_boxes(
    model: &Model,
    filter: &ModelFilter,
    positions: &PositionMap,
    geometry: &NodeGeometry,
    config: &GroupingConfig,
) -> Vec<DomainBox> {
    model
        .category_order()
        .into_iter()
        .filter_map(|category| {
            let rects = member_rects(model, filter, positions, geometry, category);
            let first = *rects.first()?;
            let union = rects.iter().skip(1).fold(first, |acc, r| acc.union(*r));
            let rect = Rect::from_min_max(
                union.min - Vec2::new(config.padding, config.padding + config.header_offset),
                union.max + Vec2::new(config.padding, config.padding + config.footer_offset),
            );
            Some(DomainBox {
                category: category.to_string(),
                rect,
                member_count: rects.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::config::SizingConfig;
    use atlas_types::{Layer, LayerFilter, LayoutMode, Table, TableSize, ViewMode};
    use egui::Pos2;
    use pretty_assertions::assert_eq;

    fn geometry() -> NodeGeometry {
        NodeGeometry::new(
            &SizingConfig::default(),
            TableSize::Medium,
            ViewMode::Standard,
            LayoutMode::Domain,
            false,
        )
    }

    fn model() -> Model {
        Model::new(
            vec![
                Table::new(Layer::L1, "a", "sales"),
                Table::new(Layer::L2, "b", "sales"),
                Table::new(Layer::L1, "c", "empty"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_box_wraps_members_with_header_and_footer() {
        let mut positions = PositionMap::new();
        positions.insert("L1.a".into(), Pos2::new(0.0, 0.0));
        positions.insert("L2.b".into(), Pos2::new(300.0, 100.0));

        let boxes = compute_domain_boxes(
            &model(),
            &ModelFilter::default(),
            &positions,
            &geometry(),
            &GroupingConfig::default(),
        );

        assert_eq!(boxes.len(), 1);
        let sales = &boxes[0];
        assert_eq!(sales.category, "sales");
        assert_eq!(sales.member_count, 2);
        assert_eq!(sales.rect.min, Pos2::new(-24.0, -64.0));
        assert_eq!(sales.rect.max, Pos2::new(564.0, 316.0));
        assert_eq!(sales.header_rect(40.0).max.y, -24.0);
    }

    #[test]
    fn test_hidden_members_excluded() {
        let mut positions = PositionMap::new();
        positions.insert("L1.a".into(), Pos2::new(0.0, 0.0));
        positions.insert("L2.b".into(), Pos2::new(300.0, 100.0));
        let filter = ModelFilter {
            layers: LayerFilter::only(Layer::L2),
            ..ModelFilter::default()
        };

        let boxes = compute_domain_boxes(&model(), &filter, &positions, &geometry(), &GroupingConfig::default());
        assert_eq!(boxes[0].member_count, 1);
        assert_eq!(boxes[0].rect.min, Pos2::new(276.0, 36.0));
    }

    #[test]
    fn test_no_positions_no_boxes() {
        let boxes = compute_domain_boxes(
            &model(),
            &ModelFilter::default(),
            &PositionMap::new(),
            &geometry(),
            &GroupingConfig::default(),
        );
        assert!(boxes.is_empty());
    }
}
