// src/placement.rs

use std::ops::RangeInclusive;

use glam::Vec3;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::LevelConfig;
use crate::error::{LevelError, Result};
use crate::generator::RingGenerator;
use crate::geometry::{PolygonConstants, PolygonMetrics};
use crate::room::{PortId, RoomGraph, RoomId};

/// A room that has been sampled but not yet checked against the existing layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Open port the candidate branches from. Already taken out of the pool.
    pub port: PortId,
    pub parent: RoomId,
    pub metrics: PolygonMetrics,
    pub center: Vec3,
    pub floor_vertices: Vec<Vec3>,
    pub port_positions: Vec<Vec3>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlacementState {
    Sampling,
    Validating(Candidate),
    Committed(RoomId),
    Exhausted { room_index: usize, attempts: usize },
}

/// Randomized incremental room placement.
///
/// Each call to [`PlacementEngine::advance`] performs a single state transition, so a
/// host can spread placement over several frames. Rejected candidates only put their
/// port back in the pool; a placed room is never undone.
pub struct PlacementEngine {
    constants: PolygonConstants,
    room_count: usize,
    room_spacing: f32,
    max_height_delta: f32,
    edge_counts: RangeInclusive<u32>,
    max_attempts: usize,
    rng: ChaCha8Rng,
    graph: RoomGraph,
    open_ports: Vec<PortId>,
    attempts: usize,
    rejections: usize,
    state: PlacementState,
}

impl PlacementEngine {
    pub fn new(config: &LevelConfig) -> Result<Self> {
        config.validate()?;
        let constants = PolygonConstants::new(
            config.min_edge_count,
            config.max_edge_count,
            config.side_length,
        );

        Ok(Self {
            constants,
            room_count: config.room_count,
            room_spacing: config.room_spacing,
            max_height_delta: config.max_height_delta(),
            edge_counts: config.edge_count_range(),
            max_attempts: config.max_placement_attempts,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            graph: RoomGraph::with_capacity(config.room_count),
            open_ports: Vec::new(),
            attempts: 0,
            rejections: 0,
            state: PlacementState::Sampling,
        })
    }

    pub fn state(&self) -> &PlacementState {
        &self.state
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn constants(&self) -> &PolygonConstants {
        &self.constants
    }

    pub fn open_ports(&self) -> &[PortId] {
        &self.open_ports
    }

    pub fn rejections(&self) -> usize {
        self.rejections
    }

    pub fn is_complete(&self) -> bool {
        self.graph.len() >= self.room_count
    }

    /// Moves the state machine one step. Entering or sitting in `Exhausted` is an error.
    pub fn advance(&mut self) -> Result<&PlacementState> {
        let current = std::mem::replace(&mut self.state, PlacementState::Sampling);
        self.state = match current {
            PlacementState::Sampling => self.sample()?,
            PlacementState::Validating(candidate) => self.validate(candidate)?,
            PlacementState::Committed(room) if self.is_complete() => {
                PlacementState::Committed(room)
            }
            PlacementState::Committed(_) => PlacementState::Sampling,
            exhausted @ PlacementState::Exhausted { .. } => exhausted,
        };

        if let PlacementState::Exhausted {
            room_index,
            attempts,
        } = self.state
        {
            return Err(LevelError::PlacementExhausted {
                room_index,
                attempts,
            });
        }
        Ok(&self.state)
    }

    /// Drives placement to completion and hands back the finished graph.
    pub fn run(mut self) -> Result<RoomGraph> {
        while !self.is_complete() {
            self.advance()?;
        }
        Ok(self.finish())
    }

    /// Drops the open port pool and scratch state.
    pub fn finish(self) -> RoomGraph {
        info!(
            "Placed {} rooms ({} rejected candidates, {} ports left open)",
            self.graph.len(),
            self.rejections,
            self.open_ports.len()
        );
        self.graph
    }

    fn draw_metrics(&mut self) -> Result<PolygonMetrics> {
        let edge_count = self.rng.gen_range(self.edge_counts.clone());
        self.constants.get(edge_count).copied().ok_or_else(|| {
            LevelError::InvalidConfiguration(format!("no polygon metrics for {edge_count} edges"))
        })
    }

    fn sample(&mut self) -> Result<PlacementState> {
        if self.graph.is_empty() {
            return self.place_first_room();
        }

        if self.open_ports.is_empty() {
            return Ok(PlacementState::Exhausted {
                room_index: self.graph.len(),
                attempts: self.attempts,
            });
        }

        self.open_ports.shuffle(&mut self.rng);
        let port_id = self.open_ports.remove(0);
        let (port_position, parent, parent_center) = match self.graph.port(port_id) {
            Some(port) => match self.graph.room(port.native_room) {
                Some(room) => (port.position, room.id, room.floor_center),
                None => return Err(LevelError::PortPairing { a: port_id, b: port_id }),
            },
            None => return Err(LevelError::PortPairing { a: port_id, b: port_id }),
        };

        let direction = (port_position - parent_center).normalize_or_zero();
        let metrics = self.draw_metrics()?;
        let mut center = port_position + direction * (metrics.inradius + self.room_spacing);
        center.y += self.max_height_delta * self.rng.gen_range(-1.0f32..=1.0);

        let frame = RingGenerator::look_at_frame(center, parent_center);
        Ok(PlacementState::Validating(Candidate {
            port: port_id,
            parent,
            metrics,
            center,
            floor_vertices: RingGenerator::floor_vertices(&metrics, &frame),
            port_positions: RingGenerator::port_positions(&metrics, &frame),
        }))
    }

    fn place_first_room(&mut self) -> Result<PlacementState> {
        let metrics = self.draw_metrics()?;
        let frame = RingGenerator::look_at_frame(Vec3::ZERO, Vec3::Z);
        let room = self.graph.add_room(
            RingGenerator::floor_vertices(&metrics, &frame),
            &RingGenerator::port_positions(&metrics, &frame),
            &metrics,
        );
        self.open_ports.extend(self.graph.ports_of(room).map(|p| p.id));

        debug!("Room {room}: {} at the origin", metrics.name());
        Ok(PlacementState::Committed(room))
    }

    fn validate(&mut self, candidate: Candidate) -> Result<PlacementState> {
        let is_valid_spot = self
            .graph
            .rooms()
            .iter()
            .filter(|room| room.id != candidate.parent)
            .all(|room| !room.intersects(candidate.center, candidate.metrics.circumradius));

        if !is_valid_spot {
            self.open_ports.push(candidate.port);
            self.attempts += 1;
            self.rejections += 1;
            trace!(
                "Rejected {} at {} off port {} (attempt {})",
                candidate.metrics.name(),
                candidate.center,
                candidate.port,
                self.attempts
            );

            if self.attempts >= self.max_attempts {
                return Ok(PlacementState::Exhausted {
                    room_index: self.graph.len(),
                    attempts: self.attempts,
                });
            }
            return Ok(PlacementState::Sampling);
        }

        self.commit(candidate)
    }

    fn commit(&mut self, candidate: Candidate) -> Result<PlacementState> {
        let origin = match self.graph.port(candidate.port) {
            Some(port) => port.position,
            None => {
                return Err(LevelError::PortPairing {
                    a: candidate.port,
                    b: candidate.port,
                })
            }
        };

        let room = self.graph.add_room(
            candidate.floor_vertices,
            &candidate.port_positions,
            &candidate.metrics,
        );

        // Ties keep the first port in ring order
        let mut nearest: Option<(PortId, f32)> = None;
        for port in self.graph.ports_of(room) {
            let distance = port.position.distance(origin);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((port.id, distance));
            }
        }
        let Some((port_to_close, _)) = nearest else {
            return Err(LevelError::PortPairing {
                a: candidate.port,
                b: candidate.port,
            });
        };

        let new_open: Vec<PortId> = self
            .graph
            .ports_of(room)
            .map(|p| p.id)
            .filter(|&id| id != port_to_close)
            .collect();
        self.open_ports.extend(new_open);
        self.graph.pair_ports(port_to_close, candidate.port)?;

        debug!(
            "Room {room}: {} at {} branching from room {} after {} rejections",
            candidate.metrics.name(),
            candidate.center,
            candidate.parent,
            self.attempts
        );
        self.attempts = 0;
        Ok(PlacementState::Committed(room))
    }
}
