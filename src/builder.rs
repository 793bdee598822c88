// src/builder.rs

use glam::Vec3;
use log::{debug, trace};

use crate::config::LevelConfig;
use crate::error::{LevelError, Result};
use crate::mesh::{Edge, Face, FaceId, RoomMesh, Surface, VertexIndex};
use crate::room::{Port, Room, RoomGraph, RoomId};

/// Smallest dot product between a face normal and a reference direction for the two
/// to count as aligned.
pub const NORMAL_ALIGNMENT: f32 = 0.99;
/// Paired ports closer than this need no tunnel.
pub const TUNNEL_EPSILON: f32 = 0.02;
const MIN_CIRCUMRADIUS: f32 = 1e-6;

/// Turns a finished room graph into one mesh per room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryBuilder {
    pub height: f32,
    pub floor_only: bool,
}

impl GeometryBuilder {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            floor_only: false,
        }
    }

    pub fn from_config(config: &LevelConfig) -> Self {
        Self {
            height: config.height,
            floor_only: config.floor_only,
        }
    }

    /// Meshes are returned in room order, so `meshes[room.id]` belongs to `room`.
    pub fn build(&self, graph: &RoomGraph) -> Result<Vec<RoomMesh>> {
        let mut meshes = Vec::with_capacity(graph.len());
        for room in graph.rooms() {
            let mut mesh = self.build_floor(room)?;
            if !self.floor_only {
                self.build_walls_and_ceiling(room, &mut mesh)?;
            }
            meshes.push(mesh);
        }

        if !self.floor_only {
            self.connect_rooms(graph, &mut meshes)?;
        }

        for (room, mesh) in graph.rooms().iter().zip(&meshes) {
            if let Some(&face) = mesh.untagged_faces().first() {
                return Err(LevelError::UntaggedFace {
                    room: room.id,
                    face,
                });
            }
        }
        Ok(meshes)
    }

    /// Triangle fan around the room center, merged into a single floor face.
    pub fn build_floor(&self, room: &Room) -> Result<RoomMesh> {
        let edge_count = room.edge_count as usize;
        if !room.circumradius.is_finite()
            || room.circumradius < MIN_CIRCUMRADIUS
            || edge_count < 3
            || room.floor_vertices.len() != edge_count + 1
        {
            return Err(LevelError::DegenerateGeometry {
                room: room.id,
                circumradius: room.circumradius,
            });
        }

        let mut mesh = RoomMesh::new(room.name(), room.floor_vertices.clone());
        // Vertex 0 is the center, corners run 1..=edge_count in ring order.
        let fan: Vec<FaceId> = (0..edge_count)
            .map(|i| {
                let j = if i + 1 == edge_count { 0 } else { i + 1 };
                mesh.add_face(Face::new(vec![[0, i as VertexIndex + 1, j as VertexIndex + 1]]))
            })
            .collect();

        let floor = mesh
            .merge_faces(&fan)
            .ok_or(LevelError::DegenerateGeometry {
                room: room.id,
                circumradius: room.circumradius,
            })?;
        tag(&mut mesh, room.id, floor, Surface::Floor)?;
        Ok(mesh)
    }

    /// Raises walls from the open floor outline, then closes the top with a welded cap.
    /// Walls and ceiling are wound to face the room interior, like the floor.
    pub fn build_walls_and_ceiling(&self, room: &Room, mesh: &mut RoomMesh) -> Result<()> {
        let outline: Vec<Edge> = mesh.open_edges().into_iter().map(|[a, b]| [b, a]).collect();
        let (walls, top) = mesh.extrude_edges(&outline);
        let top_vertices: Vec<VertexIndex> = top.iter().flatten().copied().collect();
        mesh.translate_vertices(&top_vertices, Vec3::Y * self.height);
        for wall in walls {
            tag(mesh, room.id, wall, Surface::Wall)?;
        }

        // Second extrusion collapses into a single vertex to form the cap
        let (_, cap_edges) = mesh.extrude_edges(&top);
        let cap_ring: Vec<VertexIndex> = cap_edges.iter().map(|&[a, _]| a).collect();
        mesh.weld_vertices(&cap_ring);

        let cap: Vec<FaceId> = mesh
            .untagged_faces()
            .into_iter()
            .filter(|&face| mesh.face_normal(face).dot(Vec3::NEG_Y) >= NORMAL_ALIGNMENT)
            .collect();
        let ceiling = mesh
            .merge_faces(&cap)
            .ok_or(LevelError::CeilingNotFound { room: room.id })?;
        tag(mesh, room.id, ceiling, Surface::Ceiling)?;

        trace!(
            "Room {}: {} walls, ceiling welded from {} faces",
            room.id,
            mesh.surface_count(Surface::Wall),
            cap.len()
        );
        Ok(())
    }

    /// Opens a half-tunnel on both sides of every paired port. Returns how many
    /// half-tunnels were extruded.
    pub fn connect_rooms(&self, graph: &RoomGraph, meshes: &mut [RoomMesh]) -> Result<usize> {
        let mut built = 0;
        let mut skipped = 0;

        for (a, b) in graph.connections() {
            for port in [a, b].into_iter().filter_map(|id| graph.port(id)) {
                let Some(mesh) = meshes.get_mut(port.native_room) else {
                    continue;
                };
                if open_port(graph, port, mesh)? {
                    built += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        debug!("Built {built} half-tunnels, skipped {skipped} flush connections");
        Ok(built)
    }
}

/// Extrudes the wall a paired port faces halfway toward its sister port and removes
/// the far end. Returns false when the ports are flush and no tunnel is needed.
pub fn open_port(graph: &RoomGraph, port: &Port, mesh: &mut RoomMesh) -> Result<bool> {
    let Some(link) = port.link() else {
        return Ok(false);
    };
    let (Some(room), Some(sister)) = (graph.room(port.native_room), graph.port(link.sister_port))
    else {
        return Ok(false);
    };

    // Walls face inward, so the opened wall looks from the port back at the center
    let inward = (room.floor_center - port.position).normalize_or_zero();
    let wall = mesh
        .faces_with(Surface::Wall)
        .find(|&face| mesh.face_normal(face).dot(inward) >= NORMAL_ALIGNMENT)
        .ok_or(LevelError::TunnelFaceNotFound {
            room: room.id,
            port: port.id,
            position: port.position,
        })?;

    if port.position.distance(sister.position) < TUNNEL_EPSILON {
        trace!("Port {} of room {} is flush with its sister", port.id, room.id);
        return Ok(false);
    }

    let sides = mesh
        .extrude_face(wall)
        .ok_or(LevelError::TunnelFaceNotFound {
            room: room.id,
            port: port.id,
            position: port.position,
        })?;
    for side in sides {
        tag(mesh, room.id, side, Surface::Tunnel)?;
    }

    let far_end = mesh
        .face(wall)
        .map(Face::vertices)
        .unwrap_or_default();
    mesh.translate_vertices(&far_end, 0.5 * (sister.position - port.position));
    mesh.delete_face(wall);
    Ok(true)
}

fn tag(mesh: &mut RoomMesh, room: RoomId, face: FaceId, surface: Surface) -> Result<()> {
    if mesh.set_surface(face, surface) {
        Ok(())
    } else {
        Err(LevelError::SurfaceReassigned { room, face })
    }
}
