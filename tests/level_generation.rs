//! End-to-end checks of `generate_level`: graph shape, spacing, tagging and
//! reproducibility.

use std::collections::VecDeque;

use polygon_level::{generate_level, Level, LevelConfig, LevelError, Stage, Surface};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────────────

fn level(config: LevelConfig) -> Level {
    generate_level(&config).unwrap_or_else(|e| panic!("generation failed: {e}"))
}

fn reachable_from_first_room(level: &Level) -> usize {
    let graph = level.graph();
    let mut seen = vec![false; graph.len()];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    let mut count = 1;
    while let Some(room) = queue.pop_front() {
        for next in graph.neighbors(room) {
            if !seen[next] {
                seen[next] = true;
                count += 1;
                queue.push_back(next);
            }
        }
    }
    count
}

fn assert_is_tree(level: &Level) {
    let graph = level.graph();
    assert_eq!(graph.connections().count(), graph.len() - 1);
    assert_eq!(reachable_from_first_room(level), graph.len());
}

fn assert_unrelated_rooms_keep_apart(level: &Level) {
    let graph = level.graph();
    for a in graph.rooms() {
        for b in graph.rooms().iter().filter(|b| b.id > a.id) {
            if graph.neighbors(a.id).any(|n| n == b.id) {
                continue;
            }
            let distance = a.floor_center.distance(b.floor_center);
            assert!(
                distance >= a.circumradius + b.circumradius - 1e-3,
                "rooms {} and {} overlap ({distance} apart)",
                a.id,
                b.id
            );
        }
    }
}

fn assert_ports_consistent(level: &Level) {
    let graph = level.graph();
    for room in graph.rooms() {
        assert_eq!(room.ports.len(), room.edge_count as usize);
        assert_eq!(room.floor_vertices.len(), room.edge_count as usize + 1);
        for port in graph.ports_of(room.id) {
            assert_eq!(port.native_room, room.id);
            let Some(sister) = port.sister_port() else {
                assert_eq!(port.connected_room(), None);
                continue;
            };
            let sister = graph.port(sister).unwrap();
            assert_eq!(sister.sister_port(), Some(port.id));
            assert_eq!(port.connected_room(), Some(sister.native_room));
            assert_ne!(sister.native_room, room.id);
        }
    }
}

// ── Graph shape ────────────────────────────────────────────────────────

#[test]
fn default_level_is_a_spaced_tree() {
    let level = level(LevelConfig {
        room_count: 12,
        seed: 2024,
        ..Default::default()
    });
    assert_eq!(level.rooms().len(), 12);
    assert_is_tree(&level);
    assert_unrelated_rooms_keep_apart(&level);
    assert_ports_consistent(&level);
}

#[test]
fn single_room_has_no_connections() {
    let level = level(LevelConfig {
        room_count: 1,
        ..Default::default()
    });
    let room = level.room(0).unwrap();
    assert_eq!(room.floor_center, glam::Vec3::ZERO);
    assert_eq!(level.graph().connections().count(), 0);
    assert!(level.leaves().is_empty());
    assert_eq!(level.surface_count(Surface::Tunnel), 0);
    assert_eq!(level.surface_count(Surface::Ceiling), 1);
}

#[test]
fn first_room_is_never_lifted() {
    let level = level(LevelConfig {
        room_count: 8,
        incline_max: 1.0,
        room_spacing: 4.0,
        seed: 8,
        ..Default::default()
    });
    assert_eq!(level.room(0).unwrap().floor_center.y, 0.0);
    for (a, b) in level.graph().connections() {
        let (a, b) = (level.graph().port(a).unwrap(), level.graph().port(b).unwrap());
        let rise = (a.position.y - b.position.y).abs();
        assert!(rise <= 4.0 + 1e-4, "tunnel rises {rise}");
    }
}

// ── Geometry ───────────────────────────────────────────────────────────

#[test]
fn every_face_has_exactly_one_surface() {
    let level = level(LevelConfig {
        room_count: 10,
        seed: 31,
        ..Default::default()
    });
    for mesh in level.meshes() {
        assert!(mesh.untagged_faces().is_empty());
        let tagged: usize = Surface::ALL.iter().map(|&s| mesh.surface_count(s)).sum();
        assert_eq!(tagged, mesh.faces().len());
        assert_eq!(mesh.surface_count(Surface::Floor), 1);
        assert_eq!(mesh.surface_count(Surface::Ceiling), 1);
    }
}

#[test]
fn each_opened_port_trades_a_wall_for_four_tunnel_sides() {
    let level = level(LevelConfig {
        room_count: 7,
        seed: 5,
        ..Default::default()
    });
    for room in level.rooms() {
        let mesh = level.mesh(room.id).unwrap();
        let opened = level.graph().connection_count(room.id);
        assert_eq!(mesh.surface_count(Surface::Wall), room.edge_count as usize - opened);
        assert_eq!(mesh.surface_count(Surface::Tunnel), 4 * opened);
    }
}

#[test]
fn flush_squares_need_no_tunnels() {
    let level = level(LevelConfig::new(5, 4..=4, 10.0, 0.0, 0.5, 10.0, 17));
    assert_is_tree(&level);
    assert_eq!(level.surface_count(Surface::Tunnel), 0);
    for mesh in level.meshes() {
        assert_eq!(mesh.surface_count(Surface::Wall), 4);
    }
}

#[test]
fn floor_only_levels_skip_walls() {
    let level = level(LevelConfig {
        room_count: 6,
        floor_only: true,
        ..Default::default()
    });
    assert_eq!(level.surface_count(Surface::Floor), 6);
    assert_eq!(level.surface_count(Surface::Wall), 0);
    assert_eq!(level.surface_count(Surface::Tunnel), 0);
    for mesh in level.meshes() {
        assert_eq!(mesh.faces().len(), 1);
    }
}

#[test]
fn buffers_cover_every_surface() {
    let level = level(LevelConfig {
        room_count: 3,
        seed: 12,
        ..Default::default()
    });
    let buffers = level.mesh(0).unwrap().vertex_buffers();
    assert_eq!(buffers.indices.len() % 3, 0);
    assert!(buffers.submesh(Surface::Floor).is_some());
    assert!(buffers.submesh(Surface::Wall).is_some());
    assert!(buffers.submesh(Surface::Ceiling).is_some());
    assert!(buffers.submesh(Surface::Tunnel).is_some());
}

// ── Reproducibility ────────────────────────────────────────────────────

#[test]
fn same_seed_same_level() {
    let config = LevelConfig {
        room_count: 15,
        seed: 777,
        ..Default::default()
    };
    let first = level(config.clone());
    let second = level(config);
    assert_eq!(first.graph(), second.graph());
    assert_eq!(first.meshes(), second.meshes());
}

#[test]
fn different_seeds_differ() {
    let first = level(LevelConfig {
        seed: 1,
        ..Default::default()
    });
    let second = level(LevelConfig {
        seed: 2,
        ..Default::default()
    });
    assert_ne!(first.graph(), second.graph());
    for level in [&first, &second] {
        assert_is_tree(level);
        assert_unrelated_rooms_keep_apart(level);
        assert_ports_consistent(level);
    }
}

// ── Failures ───────────────────────────────────────────────────────────

#[test]
fn crowded_triangles_exhaust_placement() {
    let mut config = LevelConfig::new(3, 3..=3, 10.0, 0.0, 0.0, 10.0, 4);
    config.max_placement_attempts = 50;
    let error = generate_level(&config).unwrap_err();
    assert_eq!(error.stage, Stage::Placement);
    assert_eq!(error.seed, 4);
    assert_eq!(
        error.source,
        LevelError::PlacementExhausted {
            room_index: 2,
            attempts: 50
        }
    );
}

#[test]
fn empty_edge_range_is_rejected_up_front() {
    let error = generate_level(&LevelConfig {
        min_edge_count: 6,
        max_edge_count: 4,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(error.stage, Stage::Configuration);
    assert!(matches!(error.source, LevelError::InvalidConfiguration(_)));
}

#[test]
fn negative_side_length_is_rejected_up_front() {
    let error = generate_level(&LevelConfig {
        side_length: -10.0,
        room_count: 6,
        seed: 3,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(error.stage, Stage::Configuration);
    assert!(matches!(error.source, LevelError::InvalidConfiguration(_)));
}

#[test]
fn overflowing_spacing_is_rejected_instead_of_panicking() {
    let error = generate_level(&LevelConfig {
        room_count: 2,
        room_spacing: f32::MAX,
        incline_max: 1.0,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(error.stage, Stage::Configuration);
}

#[test]
fn edge_count_above_cap_is_rejected() {
    let error = generate_level(&LevelConfig {
        max_edge_count: u32::MAX,
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(error.stage, Stage::Configuration);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_seed_yields_a_tree(seed in any::<u64>(), rooms in 1usize..10) {
        let level = level(LevelConfig {
            room_count: rooms,
            seed,
            ..Default::default()
        });
        prop_assert_eq!(level.rooms().len(), rooms);
        assert_is_tree(&level);
        assert_unrelated_rooms_keep_apart(&level);
        assert_ports_consistent(&level);
    }
}
