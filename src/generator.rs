// src/generator.rs

use glam::{Mat4, Quat, Vec3};

use crate::geometry::PolygonMetrics;

/// Lays out the vertex ring and port ring of a regular polygon room in a local frame.
///
/// Local +Z is the frame's forward direction. Vertex `k` sits at angle
/// `half_step + k * angular_step` on the circumcircle and port `k` at angle
/// `k * angular_step` on the incircle, so port 0 always faces forward.
pub struct RingGenerator;

impl RingGenerator {
    /// A frame at `center` whose forward axis points at `target`.
    /// Only yaw is applied; the frame stays upright so floors stay level.
    pub fn look_at_frame(center: Vec3, target: Vec3) -> Mat4 {
        let forward = Vec3::new(target.x - center.x, 0.0, target.z - center.z);
        let yaw = if forward.length_squared() > 1e-12 {
            forward.x.atan2(forward.z)
        } else {
            0.0
        };
        Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), center)
    }

    /// The room center followed by `edge_count` corners.
    pub fn floor_vertices(metrics: &PolygonMetrics, frame: &Mat4) -> Vec<Vec3> {
        let mut vertices = Vec::with_capacity(metrics.edge_count as usize + 1);
        vertices.push(frame.transform_point3(Vec3::ZERO));

        for i in 0..metrics.edge_count {
            let angle = metrics.half_step + i as f32 * metrics.angular_step;
            let local = Vec3::new(angle.sin(), 0.0, angle.cos()) * metrics.circumradius;
            vertices.push(frame.transform_point3(local));
        }
        vertices
    }

    pub fn port_positions(metrics: &PolygonMetrics, frame: &Mat4) -> Vec<Vec3> {
        (0..metrics.edge_count)
            .map(|i| {
                let angle = i as f32 * metrics.angular_step;
                let local = Vec3::new(angle.sin(), 0.0, angle.cos()) * metrics.inradius;
                frame.transform_point3(local)
            })
            .collect()
    }
}
