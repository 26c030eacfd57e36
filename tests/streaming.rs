use std::thread;
use std::time::{Duration, Instant};

use glam::DVec3;
use rustc_hash::{FxHashMap, FxHashSet};
use voxstream::{ChunkMesh, GridCoord, MeshSink, TerrainSettings, TerrainWorld};

const SETTINGS: &str = r#"
[generation]
noise_scale = 1.0
overall_noise_scale = 32.0
surface_level = 40.0
cave_level = 20.0
chunk_size = 32.0
chunk_height = 64.0
cube_size = 8.0

[streaming]
render_distance = 2
"#;

#[derive(Default)]
struct RecordingSink {
    resident: FxHashMap<GridCoord, usize>,
    uploads: Vec<GridCoord>,
    removals: Vec<GridCoord>,
}

impl MeshSink for RecordingSink {
    fn upload(&mut self, mesh: ChunkMesh<'_>) {
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        assert!(!mesh.triangles.is_empty());

        // Chunk-local: half a chunk either side horizontally, full height vertically
        for v in mesh.vertices {
            assert!(v.x >= -16.0 - 1e-3 && v.x <= 16.0 + 1e-3, "{v:?}");
            assert!(v.y >= -16.0 - 1e-3 && v.y <= 16.0 + 1e-3, "{v:?}");
            assert!(v.z >= -1e-3 && v.z <= 64.0 + 1e-3, "{v:?}");
        }
        for n in mesh.normals {
            let length = n.length();
            assert!(length < 1e-6 || (length - 1.0).abs() < 1e-4, "{n:?}");
        }

        let previous = self.resident.insert(mesh.coord, mesh.triangle_count());
        assert!(previous.is_none(), "{:?} uploaded twice", mesh.coord);
        self.uploads.push(mesh.coord);
    }

    fn remove(&mut self, coord: GridCoord) {
        assert!(self.resident.remove(&coord).is_some(), "{coord:?} was never uploaded");
        self.removals.push(coord);
    }
}

fn settle(world: &mut TerrainWorld, observer: DVec3, sink: &mut RecordingSink) {
    let deadline = Instant::now() + Duration::from_secs(120);
    loop {
        world.update(observer, sink);
        if world.is_idle() {
            world.update(observer, sink);
            return;
        }
        assert!(Instant::now() < deadline, "terrain did not settle");
        thread::sleep(Duration::from_millis(5));
    }
}

fn square(centre: GridCoord, render_distance: i32) -> FxHashSet<GridCoord> {
    let mut cells = FxHashSet::default();
    for dy in -render_distance..render_distance {
        for dx in -render_distance..render_distance {
            cells.insert(GridCoord::new(centre.x + dx, centre.y + dy));
        }
    }
    cells
}

#[test]
fn streams_terrain_around_a_moving_observer() {
    let settings = TerrainSettings::from_toml_str(SETTINGS).unwrap();
    let mut world = TerrainWorld::new(settings).unwrap();
    let mut sink = RecordingSink::default();

    let start = DVec3::new(0.0, 0.0, 40.0);
    settle(&mut world, start, &mut sink);

    // Solid floor and open sky: every chunk in the square has a surface
    let first: FxHashSet<GridCoord> = sink.uploads.iter().copied().collect();
    assert_eq!(sink.uploads.len(), 16);
    assert_eq!(first, square(GridCoord::new(0, 0), 2));

    let stats = world.stats();
    assert_eq!(stats.ready, 16);
    assert_eq!(stats.uploaded, 16);
    assert_eq!(stats.pending + stats.generating, 0);

    // Far beyond the 96 unit retirement radius
    let far = DVec3::new(3200.0, 0.0, 40.0);
    settle(&mut world, far, &mut sink);

    let removed: FxHashSet<GridCoord> = sink.removals.iter().copied().collect();
    assert_eq!(removed, first);
    let resident: FxHashSet<GridCoord> = sink.resident.keys().copied().collect();
    assert_eq!(resident, square(GridCoord::new(100, 0), 2));
    assert_eq!(world.stats().total_retirements, 16);
}

#[test]
fn small_steps_keep_the_live_set_bounded() {
    let settings = TerrainSettings::from_toml_str(SETTINGS).unwrap();
    let limit = settings.streaming.retire_slack * 2.0 * settings.generation.world_chunk_size();
    let mut world = TerrainWorld::new(settings).unwrap();
    let mut sink = RecordingSink::default();

    let mut observer = DVec3::new(0.0, 0.0, 40.0);
    for _ in 0..12 {
        observer.x += 20.0;
        settle(&mut world, observer, &mut sink);

        let store = world.chunk_store();
        let chunks = store.lock();
        let centre = world.streaming().observer_grid(observer);
        for coord in square(centre, 2) {
            assert!(chunks.contains_key(&coord), "{coord:?} missing");
        }
        // Anything outside the current square must be within the retirement radius
        for record in chunks.values() {
            if world.streaming().in_target_square(centre, record.coord) {
                continue;
            }
            let distance = world.streaming().horizontal_distance(observer, record.coord);
            assert!(distance <= limit + 1e-9, "{:?} at {distance}", record.coord);
        }
        drop(chunks);

        // Standing still changes nothing once settled
        let before = (sink.uploads.len(), sink.removals.len());
        for _ in 0..3 {
            let summary = world.update(observer, &mut sink);
            assert_eq!(summary.created + summary.retired, 0);
        }
        assert_eq!((sink.uploads.len(), sink.removals.len()), before);
    }
    assert!(!sink.removals.is_empty());
}
