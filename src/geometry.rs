// src/geometry.rs

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Metrics of a regular polygon with a given number of edges and a fixed side length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonMetrics {
    pub edge_count: u32,
    pub circumradius: f32,
    pub inradius: f32,
    pub angular_step: f32,
    pub half_step: f32,
}

impl PolygonMetrics {
    pub fn new(edge_count: u32, side_length: f32) -> Self {
        let n = edge_count as f32;
        Self {
            edge_count,
            circumradius: 0.5 * side_length / (PI / n).sin(),
            inradius: 0.5 * side_length / (PI / n).tan(),
            angular_step: 2.0 * PI / n,
            half_step: PI / n,
        }
    }

    pub fn name(&self) -> String {
        polygon_name(self.edge_count)
    }
}

pub fn polygon_name(edge_count: u32) -> String {
    match edge_count {
        3 => "Triangle".to_string(),
        4 => "Square".to_string(),
        5 => "Pentagon".to_string(),
        6 => "Hexagon".to_string(),
        7 => "Heptagon".to_string(),
        8 => "Octagon".to_string(),
        9 => "Nonagon".to_string(),
        10 => "Decagon".to_string(),
        n => format!("{n}-sided polygon"),
    }
}

/// Lookup table of `PolygonMetrics` for every edge count a level may use.
/// Built once before placement; never recomputed.
#[derive(Clone, Debug)]
pub struct PolygonConstants {
    min_edge_count: u32,
    side_length: f32,
    metrics: Vec<PolygonMetrics>,
}

impl PolygonConstants {
    /// Callers are expected to have validated `min_edge_count >= 3`.
    pub fn new(min_edge_count: u32, max_edge_count: u32, side_length: f32) -> Self {
        let metrics = (min_edge_count..=max_edge_count)
            .map(|edge_count| PolygonMetrics::new(edge_count, side_length))
            .collect();
        Self {
            min_edge_count,
            side_length,
            metrics,
        }
    }

    pub fn get(&self, edge_count: u32) -> Option<&PolygonMetrics> {
        let offset = edge_count.checked_sub(self.min_edge_count)?;
        self.metrics.get(offset as usize)
    }

    pub fn side_length(&self) -> f32 {
        self.side_length
    }

    pub fn min_edge_count(&self) -> u32 {
        self.min_edge_count
    }

    pub fn max_edge_count(&self) -> u32 {
        self.min_edge_count + (self.metrics.len() as u32).saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolygonMetrics> {
        self.metrics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn square_metrics() {
        let square = PolygonMetrics::new(4, 10.0);
        assert!((square.inradius - 5.0).abs() < EPS);
        assert!((square.circumradius - 5.0 * 2f32.sqrt()).abs() < EPS);
        assert!((square.angular_step - PI / 2.0).abs() < EPS);
        assert!((square.half_step - PI / 4.0).abs() < EPS);
    }

    #[test]
    fn triangle_metrics() {
        let triangle = PolygonMetrics::new(3, 10.0);
        assert!((triangle.circumradius - 10.0 / 3f32.sqrt()).abs() < EPS);
        assert!((triangle.inradius - 10.0 / (2.0 * 3f32.sqrt())).abs() < EPS);
    }

    #[test]
    fn hexagon_circumradius_equals_side() {
        let hexagon = PolygonMetrics::new(6, 10.0);
        assert!((hexagon.circumradius - 10.0).abs() < EPS);
    }

    #[test]
    fn lookup_is_bounded_by_range() {
        let constants = PolygonConstants::new(3, 6, 10.0);
        assert!(constants.get(2).is_none());
        assert!(constants.get(7).is_none());
        assert_eq!(constants.get(5).map(|m| m.edge_count), Some(5));
        assert_eq!(constants.max_edge_count(), 6);
        assert_eq!(constants.iter().count(), 4);
    }

    #[test]
    fn names() {
        assert_eq!(polygon_name(3), "Triangle");
        assert_eq!(polygon_name(10), "Decagon");
        assert_eq!(polygon_name(12), "12-sided polygon");
    }
}
