// src/config.rs

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};
use crate::geometry::PolygonMetrics;

pub const MIN_EDGE_COUNT: u32 = 3;
/// Largest edge count a room may have. Past this a room is a circle in all but name.
pub const MAX_EDGE_COUNT: u32 = 64;

/// Every knob of a generation run. Missing fields fall back to `Default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// How many rooms to generate.
    pub room_count: usize,
    /// Smallest edge count a room may draw.
    pub min_edge_count: u32,
    /// Largest edge count a room may draw.
    pub max_edge_count: u32,
    /// Length of every polygon side.
    pub side_length: f32,
    /// Horizontal gap between two connected rooms.
    pub room_spacing: f32,
    /// Largest rise over run a connecting tunnel may have.
    pub incline_max: f32,
    /// Wall height of every room.
    pub height: f32,
    pub seed: u64,
    /// Rejected placements tolerated per room before giving up.
    pub max_placement_attempts: usize,
    /// Skip walls, ceilings and tunnels.
    pub floor_only: bool,
    /// Padding added around the meshes when computing the level bounds.
    pub bounds_margin: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            room_count: 5,
            min_edge_count: MIN_EDGE_COUNT,
            max_edge_count: 6,
            side_length: 10.0,
            room_spacing: 1.0,
            incline_max: 0.5,
            height: 10.0,
            seed: 0,
            max_placement_attempts: 10_000,
            floor_only: false,
            bounds_margin: 20.0,
        }
    }
}

impl LevelConfig {
    pub fn new(
        room_count: usize,
        edge_count_range: RangeInclusive<u32>,
        side_length: f32,
        room_spacing: f32,
        incline_max: f32,
        height: f32,
        seed: u64,
    ) -> Self {
        Self {
            room_count,
            min_edge_count: *edge_count_range.start(),
            max_edge_count: *edge_count_range.end(),
            side_length,
            room_spacing,
            incline_max,
            height,
            seed,
            ..Self::default()
        }
    }

    pub fn edge_count_range(&self) -> RangeInclusive<u32> {
        self.min_edge_count..=self.max_edge_count
    }

    /// Largest vertical offset a room may take relative to the room it branches from.
    pub fn max_height_delta(&self) -> f32 {
        self.incline_max * self.room_spacing
    }

    /// Farthest a level can stretch from the first room along any axis, assuming
    /// every room lines up with the largest polygon and the steepest rise.
    pub fn max_reach(&self) -> f32 {
        let largest = PolygonMetrics::new(self.max_edge_count, self.side_length);
        let step = 2.0 * largest.circumradius + self.room_spacing + self.max_height_delta();
        step * self.room_count as f32
    }

    /// Rejects anything placement could not run with. A zero side length is left to
    /// the geometry stage, which reports degenerate rings per room.
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |message: String| -> Result<()> { Err(LevelError::InvalidConfiguration(message)) };

        if self.room_count < 1 {
            return invalid("room count must be at least 1".to_string());
        }
        if self.min_edge_count < MIN_EDGE_COUNT {
            return invalid(format!(
                "edge counts start at {MIN_EDGE_COUNT}, got {}",
                self.min_edge_count
            ));
        }
        if self.max_edge_count > MAX_EDGE_COUNT {
            return invalid(format!(
                "edge counts stop at {MAX_EDGE_COUNT}, got {}",
                self.max_edge_count
            ));
        }
        if self.min_edge_count > self.max_edge_count {
            return invalid(format!(
                "edge count range {}..={} is empty",
                self.min_edge_count, self.max_edge_count
            ));
        }
        if !self.room_spacing.is_finite() || self.room_spacing < 0.0 {
            return invalid(format!(
                "room spacing must be finite and non-negative, got {}",
                self.room_spacing
            ));
        }
        if !(0.0..=1.0).contains(&self.incline_max) {
            return invalid(format!(
                "incline must lie in [0, 1], got {}",
                self.incline_max
            ));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return invalid(format!(
                "height must be finite and positive, got {}",
                self.height
            ));
        }
        if !self.side_length.is_finite() || self.side_length < 0.0 {
            return invalid(format!(
                "side length must be finite and non-negative, got {}",
                self.side_length
            ));
        }
        if self.max_placement_attempts == 0 {
            return invalid("at least one placement attempt per room is required".to_string());
        }
        if !self.max_reach().is_finite() {
            return invalid(format!(
                "{} rooms of side {} spaced {} apart overflow level coordinates",
                self.room_count, self.side_length, self.room_spacing
            ));
        }
        Ok(())
    }
}
