// src/mesh.rs

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub type VertexIndex = u32;
pub type FaceId = usize;
/// Directed edge between two vertex indices.
pub type Edge = [VertexIndex; 2];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Floor,
    Wall,
    Ceiling,
    Tunnel,
}

impl Surface {
    pub const ALL: [Surface; 4] = [
        Surface::Floor,
        Surface::Wall,
        Surface::Ceiling,
        Surface::Tunnel,
    ];

    /// Material slot an engine should render this surface with.
    pub fn submesh_index(self) -> u32 {
        match self {
            Surface::Floor => 0,
            Surface::Wall => 1,
            Surface::Ceiling => 2,
            Surface::Tunnel => 3,
        }
    }
}

/// A logical face: one or more triangles sharing a surface tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub triangles: Vec<[VertexIndex; 3]>,
    surface: Option<Surface>,
}

impl Face {
    pub fn new(triangles: Vec<[VertexIndex; 3]>) -> Self {
        Self {
            triangles,
            surface: None,
        }
    }

    /// Fans a convex vertex loop from its first vertex.
    pub fn from_loop(indices: &[VertexIndex]) -> Self {
        let triangles = (1..indices.len().saturating_sub(1))
            .map(|i| [indices[0], indices[i], indices[i + 1]])
            .collect();
        Self::new(triangles)
    }

    pub fn surface(&self) -> Option<Surface> {
        self.surface
    }

    /// Distinct vertices in first-seen order.
    pub fn vertices(&self) -> Vec<VertexIndex> {
        let mut seen = Vec::new();
        for &index in self.triangles.iter().flatten() {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
        seen
    }

    /// Directed edges on the outline of the face. Edges shared by two of its own
    /// triangles are internal and left out.
    pub fn perimeter(&self) -> Vec<Edge> {
        let mut counts: HashMap<(VertexIndex, VertexIndex), usize> = HashMap::new();
        for edge in self.directed_edges() {
            *counts.entry(undirected(edge)).or_default() += 1;
        }
        self.directed_edges()
            .filter(|&edge| counts.get(&undirected(edge)) == Some(&1))
            .collect()
    }

    fn directed_edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.triangles
            .iter()
            .flat_map(|&[a, b, c]| [[a, b], [b, c], [c, a]])
    }
}

fn undirected([a, b]: Edge) -> (VertexIndex, VertexIndex) {
    (a.min(b), a.max(b))
}

/// Editable polygon mesh of a single room.
///
/// Face ids are positions in the face list: deleting or merging faces shifts the
/// ids of every face after the removed ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMesh {
    pub name: String,
    positions: Vec<Vec3>,
    faces: Vec<Face>,
}

impl RoomMesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            faces: Vec::new(),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn position(&self, index: VertexIndex) -> Option<Vec3> {
        self.positions.get(index as usize).copied()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id)
    }

    pub fn add_face(&mut self, face: Face) -> FaceId {
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Tags a face. Returns false if the face does not exist or already has a surface.
    pub fn set_surface(&mut self, id: FaceId, surface: Surface) -> bool {
        match self.faces.get_mut(id) {
            Some(face) if face.surface.is_none() => {
                face.surface = Some(surface);
                true
            }
            _ => false,
        }
    }

    pub fn faces_with(&self, surface: Surface) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(move |(_, face)| face.surface == Some(surface))
            .map(|(id, _)| id)
    }

    pub fn surface_count(&self, surface: Surface) -> usize {
        self.faces_with(surface).count()
    }

    pub fn untagged_faces(&self) -> Vec<FaceId> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.surface.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Area-weighted unit normal. Zero for degenerate faces.
    pub fn face_normal(&self, id: FaceId) -> Vec3 {
        let Some(face) = self.faces.get(id) else {
            return Vec3::ZERO;
        };
        face.triangles
            .iter()
            .filter_map(|&[a, b, c]| {
                let (a, b, c) = (self.position(a)?, self.position(b)?, self.position(c)?);
                Some((b - a).cross(c - a))
            })
            .sum::<Vec3>()
            .normalize_or_zero()
    }

    /// Moves the triangles of every listed face into the lowest id and removes the rest.
    pub fn merge_faces(&mut self, ids: &[FaceId]) -> Option<FaceId> {
        let mut ids: Vec<FaceId> = ids.iter().copied().filter(|&id| id < self.faces.len()).collect();
        ids.sort_unstable();
        ids.dedup();
        let (&target, rest) = ids.split_first()?;

        for &id in rest.iter().rev() {
            let face = self.faces.remove(id);
            self.faces[target].triangles.extend(face.triangles);
        }
        Some(target)
    }

    pub fn delete_face(&mut self, id: FaceId) -> Option<Face> {
        (id < self.faces.len()).then(|| self.faces.remove(id))
    }

    /// Face outline edges not shared with any other face.
    pub fn open_edges(&self) -> Vec<Edge> {
        let perimeters: Vec<Vec<Edge>> = self.faces.iter().map(Face::perimeter).collect();
        let mut counts: HashMap<(VertexIndex, VertexIndex), usize> = HashMap::new();
        for &edge in perimeters.iter().flatten() {
            *counts.entry(undirected(edge)).or_default() += 1;
        }
        perimeters
            .into_iter()
            .flatten()
            .filter(|&edge| counts.get(&undirected(edge)) == Some(&1))
            .collect()
    }

    fn duplicate_vertex(
        &mut self,
        index: VertexIndex,
        copies: &mut HashMap<VertexIndex, VertexIndex>,
    ) -> VertexIndex {
        if let Some(&copy) = copies.get(&index) {
            return copy;
        }
        let position = self.position(index).unwrap_or(Vec3::ZERO);
        self.positions.push(position);
        let copy = (self.positions.len() - 1) as VertexIndex;
        copies.insert(index, copy);
        copy
    }

    /// Extrudes edges as a group with zero displacement. Edges sharing a vertex share
    /// its copy. Each edge `a -> b` gains the quad `a, b, b', a'`.
    /// Returns the new side faces and the new edges `a' -> b'`.
    pub fn extrude_edges(&mut self, edges: &[Edge]) -> (Vec<FaceId>, Vec<Edge>) {
        let mut copies = HashMap::new();
        let mut faces = Vec::with_capacity(edges.len());
        let mut extruded = Vec::with_capacity(edges.len());

        for &[a, b] in edges {
            let a_copy = self.duplicate_vertex(a, &mut copies);
            let b_copy = self.duplicate_vertex(b, &mut copies);
            faces.push(self.add_face(Face::from_loop(&[a, b, b_copy, a_copy])));
            extruded.push([a_copy, b_copy]);
        }
        (faces, extruded)
    }

    /// Extrudes a single face with zero displacement: the face moves onto fresh copies of
    /// its vertices and every outline edge gains a side quad back to the old vertices.
    /// Returns the side faces.
    pub fn extrude_face(&mut self, id: FaceId) -> Option<Vec<FaceId>> {
        let face = self.faces.get(id)?.clone();
        let mut copies = HashMap::new();
        for index in face.vertices() {
            self.duplicate_vertex(index, &mut copies);
        }

        let mut sides = Vec::new();
        for [u, v] in face.perimeter() {
            let (Some(&u_copy), Some(&v_copy)) = (copies.get(&u), copies.get(&v)) else {
                continue;
            };
            sides.push(self.add_face(Face::from_loop(&[u, v, v_copy, u_copy])));
        }

        for triangle in &mut self.faces[id].triangles {
            for index in triangle.iter_mut() {
                if let Some(&copy) = copies.get(&*index) {
                    *index = copy;
                }
            }
        }
        Some(sides)
    }

    pub fn translate_vertices(&mut self, indices: &[VertexIndex], offset: Vec3) {
        let mut moved = Vec::with_capacity(indices.len());
        for &index in indices {
            if moved.contains(&index) {
                continue;
            }
            if let Some(position) = self.positions.get_mut(index as usize) {
                *position += offset;
                moved.push(index);
            }
        }
    }

    /// Collapses the listed vertices into the first one, placed at their average.
    /// Triangles that collapse are dropped, as are faces left with no triangles.
    pub fn weld_vertices(&mut self, indices: &[VertexIndex]) -> Option<VertexIndex> {
        let valid: Vec<VertexIndex> = indices
            .iter()
            .copied()
            .filter(|&i| (i as usize) < self.positions.len())
            .collect();
        let &keep = valid.first()?;

        let average = valid
            .iter()
            .filter_map(|&i| self.position(i))
            .sum::<Vec3>()
            / valid.len() as f32;
        self.positions[keep as usize] = average;

        for face in &mut self.faces {
            for triangle in &mut face.triangles {
                for index in triangle.iter_mut() {
                    if valid.contains(&*index) {
                        *index = keep;
                    }
                }
            }
            face.triangles
                .retain(|&[a, b, c]| a != b && b != c && c != a);
        }
        self.faces.retain(|face| !face.triangles.is_empty());
        Some(keep)
    }

    /// Axis-aligned extent of every vertex a face references.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.faces
            .iter()
            .flat_map(|face| face.triangles.iter().flatten())
            .filter_map(|&index| self.position(index))
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> RoomMesh {
        let mut mesh = RoomMesh::new(
            "square",
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        );
        mesh.add_face(Face::from_loop(&[0, 1, 2, 3]));
        mesh
    }

    #[test]
    fn fan_outline_skips_internal_edges() {
        let face = Face::from_loop(&[0, 1, 2, 3]);
        assert_eq!(face.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(face.perimeter(), vec![[0, 1], [1, 2], [2, 3], [3, 0]]);
        assert_eq!(face.vertices(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn square_faces_up() {
        let mesh = unit_square();
        assert!(mesh.face_normal(0).dot(Vec3::Y) > 0.99);
    }

    #[test]
    fn surfaces_are_assigned_once() {
        let mut mesh = unit_square();
        assert!(mesh.set_surface(0, Surface::Floor));
        assert!(!mesh.set_surface(0, Surface::Wall));
        assert!(!mesh.set_surface(5, Surface::Wall));
        assert_eq!(mesh.face(0).unwrap().surface(), Some(Surface::Floor));
    }

    #[test]
    fn extruded_edges_share_vertex_copies() {
        let mut mesh = unit_square();
        let open = mesh.open_edges();
        assert_eq!(open.len(), 4);

        let (sides, top) = mesh.extrude_edges(&open);
        assert_eq!(sides.len(), 4);
        assert_eq!(mesh.positions().len(), 8);
        // the new loop is the only open outline left, traversed against the side quads
        let reversed: Vec<Edge> = top.iter().map(|&[a, b]| [b, a]).collect();
        assert_eq!(mesh.open_edges(), reversed);
    }

    #[test]
    fn extruded_face_leaves_side_quads() {
        let mut mesh = unit_square();
        let sides = mesh.extrude_face(0).unwrap();
        assert_eq!(sides.len(), 4);
        assert_eq!(mesh.faces().len(), 5);

        let moved = mesh.face(0).unwrap().vertices();
        assert_eq!(moved, vec![4, 5, 6, 7]);
        mesh.translate_vertices(&moved, Vec3::Y);
        assert!(mesh.face_normal(sides[0]).length() > 0.99);

        mesh.delete_face(0);
        assert_eq!(mesh.faces().len(), 4);
        assert_eq!(mesh.open_edges().len(), 8);
    }

    #[test]
    fn welding_collapses_to_the_average() {
        let mut mesh = unit_square();
        let kept = mesh.weld_vertices(&[1, 2]).unwrap();
        assert_eq!(kept, 1);
        assert_eq!(mesh.position(1), Some(Vec3::new(0.5, 0.0, 1.0)));
        // [0, 1, 2] collapsed, [0, 2, 3] became [0, 1, 3]
        assert_eq!(mesh.face(0).unwrap().triangles, vec![[0, 1, 3]]);
    }

    #[test]
    fn merge_keeps_lowest_id() {
        let mut mesh = unit_square();
        mesh.add_face(Face::new(vec![[0, 1, 2]]));
        mesh.add_face(Face::new(vec![[0, 2, 3]]));
        assert_eq!(mesh.merge_faces(&[2, 1]), Some(1));
        assert_eq!(mesh.faces().len(), 2);
        assert_eq!(mesh.face(1).unwrap().triangles.len(), 2);
        assert_eq!(mesh.merge_faces(&[]), None);
    }

    #[test]
    fn bounds_cover_referenced_vertices() {
        let mut mesh = unit_square();
        mesh.positions.push(Vec3::splat(100.0));
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0))));
    }
}
