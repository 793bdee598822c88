// src/room.rs

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{LevelError, Result};
use crate::geometry::{polygon_name, PolygonMetrics};
use crate::intersection::BoundingCircle;

// Handles into the RoomGraph arena
pub type RoomId = usize;
pub type PortId = usize;

/// The other end of a paired port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLink {
    pub sister_port: PortId,
    pub connected_room: RoomId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    /// Ground level of the native room, regardless of where the tunnel ends up vertically.
    pub position: Vec3,
    pub native_room: RoomId,
    link: Option<PortLink>,
}

impl Port {
    pub fn has_connection(&self) -> bool {
        self.link.is_some()
    }

    pub fn sister_port(&self) -> Option<PortId> {
        self.link.map(|link| link.sister_port)
    }

    pub fn connected_room(&self) -> Option<RoomId> {
        self.link.map(|link| link.connected_room)
    }

    pub fn link(&self) -> Option<PortLink> {
        self.link
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Anchor point on the ground. Also `floor_vertices[0]`.
    pub floor_center: Vec3,
    /// Center followed by the corners, `edge_count + 1` entries.
    pub floor_vertices: Vec<Vec3>,
    pub edge_count: u32,
    pub inradius: f32,
    pub circumradius: f32,
    pub ports: Vec<PortId>,
}

impl Room {
    pub fn bounding_circle(&self) -> BoundingCircle {
        BoundingCircle::new(self.floor_center, self.circumradius)
    }

    /// Would a room centered at `center` with `circumradius` overlap this one?
    pub fn intersects(&self, center: Vec3, circumradius: f32) -> bool {
        self.bounding_circle()
            .intersects(&BoundingCircle::new(center, circumradius))
    }

    pub fn corners(&self) -> &[Vec3] {
        &self.floor_vertices[1..]
    }

    pub fn name(&self) -> String {
        polygon_name(self.edge_count)
    }
}

/// Arena holding every room and port of a level. Rooms and ports refer to each
/// other through `RoomId`/`PortId` indices.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomGraph {
    rooms: Vec<Room>,
    ports: Vec<Port>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rooms: usize) -> Self {
        Self {
            rooms: Vec::with_capacity(rooms),
            ports: Vec::new(),
        }
    }

    /// Adds a room with one unpaired port per position. Returns the new room's id.
    pub fn add_room(
        &mut self,
        floor_vertices: Vec<Vec3>,
        port_positions: &[Vec3],
        metrics: &PolygonMetrics,
    ) -> RoomId {
        let id = self.rooms.len();
        let first_port = self.ports.len();

        for (offset, &position) in port_positions.iter().enumerate() {
            self.ports.push(Port {
                id: first_port + offset,
                position,
                native_room: id,
                link: None,
            });
        }

        self.rooms.push(Room {
            id,
            floor_center: floor_vertices.first().copied().unwrap_or(Vec3::ZERO),
            floor_vertices,
            edge_count: metrics.edge_count,
            inradius: metrics.inradius,
            circumradius: metrics.circumradius,
            ports: (first_port..first_port + port_positions.len()).collect(),
        });
        id
    }

    /// Connects two unpaired ports of different rooms. Pairing is symmetric and final.
    pub fn pair_ports(&mut self, a: PortId, b: PortId) -> Result<()> {
        let invalid = LevelError::PortPairing { a, b };
        if a == b {
            return Err(invalid);
        }
        let (room_a, room_b) = match (self.ports.get(a), self.ports.get(b)) {
            (Some(pa), Some(pb)) if !pa.has_connection() && !pb.has_connection() => {
                (pa.native_room, pb.native_room)
            }
            _ => return Err(invalid),
        };
        if room_a == room_b {
            return Err(invalid);
        }

        self.ports[a].link = Some(PortLink {
            sister_port: b,
            connected_room: room_b,
        });
        self.ports[b].link = Some(PortLink {
            sister_port: a,
            connected_room: room_a,
        });
        Ok(())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn ports_of(&self, room: RoomId) -> impl Iterator<Item = &Port> + '_ {
        self.rooms
            .get(room)
            .into_iter()
            .flat_map(move |r| r.ports.iter().filter_map(move |&p| self.ports.get(p)))
    }

    /// Rooms reachable through one paired port of `room`.
    pub fn neighbors(&self, room: RoomId) -> impl Iterator<Item = RoomId> + '_ {
        self.ports_of(room).filter_map(Port::connected_room)
    }

    pub fn connection_count(&self, room: RoomId) -> usize {
        self.ports_of(room).filter(|p| p.has_connection()).count()
    }

    /// A room with exactly one connection.
    pub fn is_leaf(&self, room: RoomId) -> bool {
        self.connection_count(room) == 1
    }

    /// Every paired relationship once, lower port id first.
    pub fn connections(&self) -> impl Iterator<Item = (PortId, PortId)> + '_ {
        self.ports.iter().filter_map(|port| match port.sister_port() {
            Some(sister) if port.id < sister => Some((port.id, sister)),
            _ => None,
        })
    }

    pub fn room_centers(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.rooms.iter().map(|room| room.floor_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::RingGenerator;

    fn graph_with_two_squares() -> RoomGraph {
        let square = PolygonMetrics::new(4, 2.0);
        let mut graph = RoomGraph::new();
        for center in [Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)] {
            let frame = RingGenerator::look_at_frame(center, Vec3::new(1.0, 0.0, 0.0));
            graph.add_room(
                RingGenerator::floor_vertices(&square, &frame),
                &RingGenerator::port_positions(&square, &frame),
                &square,
            );
        }
        graph
    }

    #[test]
    fn rooms_own_their_ports() {
        let graph = graph_with_two_squares();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.ports().len(), 8);
        for room in graph.rooms() {
            assert_eq!(room.ports.len(), room.edge_count as usize);
            assert!(graph.ports_of(room.id).all(|p| p.native_room == room.id));
            assert_eq!(room.floor_vertices[0], room.floor_center);
        }
    }

    #[test]
    fn pairing_is_symmetric() {
        let mut graph = graph_with_two_squares();
        graph.pair_ports(0, 4).unwrap();

        let a = graph.port(0).unwrap();
        let b = graph.port(4).unwrap();
        assert_eq!(a.sister_port(), Some(4));
        assert_eq!(b.sister_port(), Some(0));
        assert_eq!(a.connected_room(), Some(1));
        assert_eq!(b.connected_room(), Some(0));
        assert!(graph.is_leaf(0));
        assert!(graph.is_leaf(1));
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(graph.connections().collect::<Vec<_>>(), vec![(0, 4)]);
    }

    #[test]
    fn ports_pair_only_once() {
        let mut graph = graph_with_two_squares();
        graph.pair_ports(0, 4).unwrap();
        assert_eq!(
            graph.pair_ports(0, 5),
            Err(LevelError::PortPairing { a: 0, b: 5 })
        );
        assert!(graph.pair_ports(1, 1).is_err());
        // same room
        assert!(graph.pair_ports(1, 2).is_err());
        assert!(graph.pair_ports(1, 99).is_err());
        assert_eq!(graph.port(5).unwrap().sister_port(), None);
    }

    #[test]
    fn unconnected_room_is_not_a_leaf() {
        let graph = graph_with_two_squares();
        assert!(!graph.is_leaf(0));
        assert_eq!(graph.connections().count(), 0);
    }

    #[test]
    fn adjacent_squares_intersect_by_bounding_circle() {
        let graph = graph_with_two_squares();
        let a = graph.room(0).unwrap();
        let b = graph.room(1).unwrap();
        assert!(a.intersects(b.floor_center, b.circumradius));
        assert!(!a.intersects(Vec3::new(10.0, 0.0, 0.0), b.circumradius));
    }
}
