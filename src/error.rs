// src/error.rs

use std::fmt;

use glam::Vec3;
use thiserror::Error;

use crate::room::{PortId, RoomId};

/// Everything that can go wrong while generating a level.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no valid spot found for room {room_index} after {attempts} attempts")]
    PlacementExhausted { room_index: usize, attempts: usize },

    #[error("room {room} has a degenerate vertex ring (circumradius {circumradius})")]
    DegenerateGeometry { room: RoomId, circumradius: f32 },

    #[error("ports {a} and {b} cannot be paired")]
    PortPairing { a: PortId, b: PortId },

    #[error("no wall of room {room} faces port {port} at {position}")]
    TunnelFaceNotFound { room: RoomId, port: PortId, position: Vec3 },

    #[error("room {room} has no upward-facing cap after welding the ceiling")]
    CeilingNotFound { room: RoomId },

    #[error("face {face} of room {room} has no surface")]
    UntaggedFace { room: RoomId, face: usize },

    #[error("face {face} of room {room} already has a surface")]
    SurfaceReassigned { room: RoomId, face: usize },
}

/// The pipeline stage a generation attempt failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Placement,
    Geometry,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::Placement => "placement",
            Stage::Geometry => "geometry",
        };
        f.write_str(name)
    }
}

/// A failed `generate_level` call. Carries the seed so the failure can be replayed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("level generation failed during {stage} (seed {seed}): {source}")]
pub struct GenerationError {
    pub stage: Stage,
    pub seed: u64,
    #[source]
    pub source: LevelError,
}

impl GenerationError {
    pub fn new(stage: Stage, seed: u64, source: LevelError) -> Self {
        Self { stage, seed, source }
    }
}

pub type Result<T, E = LevelError> = std::result::Result<T, E>;
