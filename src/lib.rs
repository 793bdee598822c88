// src/lib.rs

pub mod builder;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod intersection;
pub mod level;
pub mod mesh;
pub mod placement;
pub mod room;
pub mod vertex;

pub use builder::GeometryBuilder;
pub use config::LevelConfig;
pub use error::{GenerationError, LevelError, Stage};
pub use geometry::{PolygonConstants, PolygonMetrics};
pub use level::{generate_level, Level, LevelBounds};
pub use mesh::{RoomMesh, Surface};
pub use placement::{PlacementEngine, PlacementState};
pub use room::{Port, PortId, Room, RoomGraph, RoomId};
pub use vertex::{MeshBuffers, Vertex};
