// src/vertex.rs

use bytemuck::{Pod, Zeroable};

use crate::mesh::{RoomMesh, Surface};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Index range of one surface inside `MeshBuffers::indices`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submesh {
    pub surface: Surface,
    pub first_index: u32,
    pub index_count: u32,
}

/// Flat-shaded vertex and index buffers of a room, grouped by surface so each
/// submesh can be drawn with its own material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<Submesh>,
}

impl MeshBuffers {
    pub fn from_mesh(mesh: &RoomMesh) -> Self {
        let mut buffers = MeshBuffers::default();

        for surface in Surface::ALL {
            let first_index = buffers.indices.len() as u32;
            for face_id in mesh.faces_with(surface) {
                let Some(face) = mesh.face(face_id) else {
                    continue;
                };
                let normal = mesh.face_normal(face_id).to_array();
                for triangle in &face.triangles {
                    for &index in triangle {
                        let Some(position) = mesh.position(index) else {
                            continue;
                        };
                        buffers.indices.push(buffers.vertices.len() as u32);
                        buffers.vertices.push(Vertex::new(position.to_array(), normal));
                    }
                }
            }

            let index_count = buffers.indices.len() as u32 - first_index;
            if index_count > 0 {
                buffers.submeshes.push(Submesh {
                    surface,
                    first_index,
                    index_count,
                });
            }
        }
        buffers
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn submesh(&self, surface: Surface) -> Option<&Submesh> {
        self.submeshes.iter().find(|s| s.surface == surface)
    }
}

impl RoomMesh {
    pub fn vertex_buffers(&self) -> MeshBuffers {
        MeshBuffers::from_mesh(self)
    }
}
