// src/level.rs

use glam::Vec3;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::builder::GeometryBuilder;
use crate::config::LevelConfig;
use crate::error::{GenerationError, Stage};
use crate::mesh::{RoomMesh, Surface};
use crate::placement::PlacementEngine;
use crate::room::{Room, RoomGraph, RoomId};

/// Axis-aligned box around the whole level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LevelBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn encapsulate(&self, min: Vec3, max: Vec3) -> Self {
        Self::new(self.min.min(min), self.max.max(max))
    }

    /// Grows the box by `amount` in total along every axis.
    pub fn expand(&self, amount: f32) -> Self {
        let half = Vec3::splat(amount * 0.5);
        Self::new(self.min - half, self.max + half)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// A generated level: the room graph plus one mesh per room.
#[derive(Clone, Debug)]
pub struct Level {
    config: LevelConfig,
    graph: RoomGraph,
    meshes: Vec<RoomMesh>,
    bounds: Option<LevelBounds>,
}

impl Level {
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn rooms(&self) -> &[Room] {
        self.graph.rooms()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.graph.room(id)
    }

    pub fn mesh(&self, id: RoomId) -> Option<&RoomMesh> {
        self.meshes.get(id)
    }

    pub fn meshes(&self) -> &[RoomMesh] {
        &self.meshes
    }

    pub fn room_centers(&self) -> Vec<Vec3> {
        self.graph.room_centers().collect()
    }

    pub fn leaves(&self) -> Vec<RoomId> {
        self.rooms()
            .iter()
            .map(|room| room.id)
            .filter(|&id| self.graph.is_leaf(id))
            .collect()
    }

    pub fn bounds(&self) -> Option<LevelBounds> {
        self.bounds
    }

    /// Faces tagged `surface` across every room.
    pub fn surface_count(&self, surface: Surface) -> usize {
        self.meshes.iter().map(|m| m.surface_count(surface)).sum()
    }
}

/// Validates `config`, places the rooms, and builds their geometry.
///
/// Deterministic for a given config. A failure in any stage aborts the whole
/// generation; no partial level is returned.
pub fn generate_level(config: &LevelConfig) -> Result<Level, GenerationError> {
    let fail = |stage: Stage| move |source| GenerationError::new(stage, config.seed, source);

    config.validate().map_err(fail(Stage::Configuration))?;

    let graph = PlacementEngine::new(config)
        .and_then(PlacementEngine::run)
        .map_err(fail(Stage::Placement))?;

    let meshes = GeometryBuilder::from_config(config)
        .build(&graph)
        .map_err(fail(Stage::Geometry))?;

    let bounds = meshes
        .iter()
        .filter_map(RoomMesh::bounds)
        .fold(None, |acc: Option<LevelBounds>, (min, max)| match acc {
            None => Some(LevelBounds::new(min, max)),
            Some(bounds) => Some(bounds.encapsulate(min, max)),
        })
        .map(|bounds| bounds.expand(config.bounds_margin));

    let level = Level {
        config: config.clone(),
        graph,
        meshes,
        bounds,
    };

    let tunnels = level.surface_count(Surface::Tunnel);
    if tunnels == 0 && level.graph.len() > 1 && !config.floor_only && config.room_spacing > 0.0 {
        warn!("No tunnels were built for {} connected rooms", level.graph.len());
    }
    info!(
        "Generated level from seed {}: {} rooms, {} leaves, {} tunnel faces",
        config.seed,
        level.graph.len(),
        level.leaves().len(),
        tunnels
    );
    Ok(level)
}
