// src/main.rs

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use polygon_level::{generate_level, LevelConfig, Surface};

/// Generate a level of connected polygon rooms.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding a LevelConfig. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    rooms: Option<usize>,

    #[arg(long)]
    min_edges: Option<u32>,

    #[arg(long)]
    max_edges: Option<u32>,

    #[arg(long)]
    side_length: Option<f32>,

    #[arg(long)]
    spacing: Option<f32>,

    #[arg(long)]
    incline: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_attempts: Option<usize>,

    /// Only build floors.
    #[arg(long)]
    floor_only: bool,

    /// Print the room graph as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn level_config(&self) -> anyhow::Result<LevelConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => LevelConfig::default(),
        };

        if let Some(rooms) = self.rooms {
            config.room_count = rooms;
        }
        if let Some(min_edges) = self.min_edges {
            config.min_edge_count = min_edges;
        }
        if let Some(max_edges) = self.max_edges {
            config.max_edge_count = max_edges;
        }
        if let Some(side_length) = self.side_length {
            config.side_length = side_length;
        }
        if let Some(spacing) = self.spacing {
            config.room_spacing = spacing;
        }
        if let Some(incline) = self.incline {
            config.incline_max = incline;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_placement_attempts = max_attempts;
        }
        config.floor_only |= self.floor_only;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.level_config()?;
    info!("Generating with {config:?}");

    let level = generate_level(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(level.graph())?);
        return Ok(());
    }

    println!("seed {}: {} rooms", level.seed(), level.rooms().len());
    for room in level.rooms() {
        let connections = level.graph().connection_count(room.id);
        println!(
            "  #{:<3} {:<10} center {:>7.2} {:>7.2} {:>7.2}  connections {}",
            room.id,
            room.name(),
            room.floor_center.x,
            room.floor_center.y,
            room.floor_center.z,
            connections
        );
    }
    println!(
        "faces: {} floor, {} wall, {} ceiling, {} tunnel",
        level.surface_count(Surface::Floor),
        level.surface_count(Surface::Wall),
        level.surface_count(Surface::Ceiling),
        level.surface_count(Surface::Tunnel)
    );
    if let Some(bounds) = level.bounds() {
        println!("bounds: {} .. {}", bounds.min, bounds.max);
    }
    Ok(())
}
