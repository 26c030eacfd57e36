//! Headless terrain streaming driver
//!
//! Walks an observer across the world and logs what the streaming layer does.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::DVec3;
use rustc_hash::FxHashMap;

use voxstream::{ChunkMesh, ConfigError, GridCoord, MeshSink, MeshVertex, TerrainSettings, TerrainWorld};

/// Infinite voxel terrain streaming
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML settings file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the render distance in chunks
    #[arg(long)]
    render_distance: Option<i32>,

    /// Number of control-path ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Observer speed along +x, in world units per tick
    #[arg(long, default_value_t = 32.0)]
    speed: f64,

    /// Override the noise seed
    #[arg(long)]
    seed: Option<f64>,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

/// Stands in for a GPU: keeps interleaved buffers per chunk.
#[derive(Default)]
struct BufferSink {
    buffers: FxHashMap<GridCoord, (Vec<MeshVertex>, Vec<u32>)>,
    uploads: usize,
    removals: usize,
}

impl BufferSink {
    fn resident_bytes(&self) -> usize {
        self.buffers
            .values()
            .map(|(vertices, indices)| {
                bytemuck::cast_slice::<MeshVertex, u8>(vertices).len()
                    + bytemuck::cast_slice::<u32, u8>(indices).len()
            })
            .sum()
    }
}

impl MeshSink for BufferSink {
    fn upload(&mut self, mesh: ChunkMesh<'_>) {
        tracing::trace!(
            "Upload chunk ({}, {}): {} triangles",
            mesh.coord.x,
            mesh.coord.y,
            mesh.triangle_count()
        );
        self.buffers
            .insert(mesh.coord, (mesh.interleaved(), mesh.indices().to_vec()));
        self.uploads += 1;
    }

    fn remove(&mut self, coord: GridCoord) {
        if self.buffers.remove(&coord).is_some() {
            self.removals += 1;
        }
    }
}

fn load_settings(args: &Args) -> Result<TerrainSettings, ConfigError> {
    let mut settings = match &args.config {
        Some(path) => TerrainSettings::load(path)?,
        None => TerrainSettings::default(),
    };
    if let Some(render_distance) = args.render_distance {
        settings.streaming.render_distance = render_distance;
    }
    if let Some(seed) = args.seed {
        settings.generation.seed = seed;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(args: Args) -> Result<(), ConfigError> {
    let settings = load_settings(&args)?;
    let start_height = settings.generation.surface_level * settings.generation.scale;
    let mut world = TerrainWorld::new(settings)?;
    let mut sink = BufferSink::default();

    let mut observer = DVec3::new(0.0, 0.0, start_height);
    let tick = Duration::from_millis(args.tick_ms);
    let started = Instant::now();

    for frame in 0..args.ticks {
        world.update(observer, &mut sink);
        observer.x += args.speed;

        if frame % 60 == 0 {
            let stats = world.stats();
            tracing::info!(
                "tick {}: observer x={:.0}, pending {}, generating {}, ready {}, resident {} ({} KiB)",
                frame,
                observer.x,
                stats.pending,
                stats.generating,
                stats.ready,
                sink.buffers.len(),
                sink.resident_bytes() / 1024
            );
        }
        thread::sleep(tick);
    }

    world.shutdown();
    let stats = world.stats();
    tracing::info!(
        "Done in {:.1?}: {} uploads, {} removals, {} retirements, {} empty chunks, {} passes",
        started.elapsed(),
        sink.uploads,
        sink.removals,
        stats.total_retirements,
        stats.empty_chunks,
        stats.passes
    );
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::info!("Starting terrain streaming driver...");
    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
