//! Control path for terrain streaming
//!
//! Each update uploads finished meshes, applies the streaming plan for the
//! observer and keeps the generation worker fed.

use std::sync::Arc;

use glam::DVec3;

use crate::core::chunk::{ChunkRecord, ChunkStatus, GridCoord};
use crate::error::ConfigError;
use crate::render::mesh::{ChunkMesh, MeshSink};
use crate::render::polygonizer::{MarchingTetrahedra, Polygonizer};
use crate::utils::settings::TerrainSettings;
use crate::world::generator::ChunkGenerator;
use crate::world::loader::{ChunkStore, GenerationWorker, new_chunk_store};
use crate::world::streaming::StreamingManager;

/// What one call to [`TerrainWorld::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub uploaded: usize,
    pub created: usize,
    pub retired: usize,
    /// Out of range but still generating; retried on a later update.
    pub deferred: usize,
    pub pass_started: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub pending: usize,
    pub generating: usize,
    pub ready: usize,
    /// Ready records whose mesh is currently held by the sink.
    pub uploaded: usize,
    pub total_uploads: usize,
    pub total_retirements: usize,
    pub empty_chunks: usize,
    pub passes: usize,
}

/// Streams terrain chunks around an observer.
///
/// Owns the chunk store and the generation worker. Everything here runs on
/// the caller's thread; only mesh generation happens in the background.
pub struct TerrainWorld {
    store: ChunkStore,
    streaming: StreamingManager,
    generator: Arc<ChunkGenerator>,
    worker: GenerationWorker,
    total_uploads: usize,
    total_retirements: usize,
    empty_chunks: usize,
    passes: usize,
}

impl TerrainWorld {
    pub fn new(settings: TerrainSettings) -> Result<Self, ConfigError> {
        Self::with_polygonizer(settings, Box::new(MarchingTetrahedra::default()))
    }

    pub fn with_polygonizer(
        settings: TerrainSettings,
        polygonizer: Box<dyn Polygonizer>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        let TerrainSettings {
            generation,
            streaming,
        } = settings;

        let generator = Arc::new(ChunkGenerator::with_polygonizer(
            generation.clone(),
            polygonizer,
        )?);
        let store = new_chunk_store();
        let worker = GenerationWorker::spawn(Arc::clone(&store), Arc::clone(&generator))
            .map_err(ConfigError::Spawn)?;

        tracing::info!(
            "Terrain world ready: render distance {}, chunk {} x {} at scale {}",
            streaming.render_distance,
            generation.chunk_size,
            generation.chunk_height,
            generation.scale
        );

        Ok(TerrainWorld {
            store,
            streaming: StreamingManager::new(generation, streaming),
            generator,
            worker,
            total_uploads: 0,
            total_retirements: 0,
            empty_chunks: 0,
            passes: 0,
        })
    }

    pub fn streaming(&self) -> &StreamingManager {
        &self.streaming
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    /// Shared handle to the chunk records.
    pub fn chunk_store(&self) -> ChunkStore {
        Arc::clone(&self.store)
    }

    /// One control-path tick for the given observer position.
    pub fn update(&mut self, observer: DVec3, sink: &mut dyn MeshSink) -> UpdateSummary {
        let mut summary = UpdateSummary::default();

        while let Some(report) = self.worker.poll_complete() {
            self.passes += 1;
            self.empty_chunks += report.empty;
            if report.discarded > 0 {
                tracing::debug!("{} generated chunks were already retired", report.discarded);
            }
        }

        let mut chunks = self.store.lock();

        for record in chunks.values_mut() {
            if record.status != ChunkStatus::Ready || record.uploaded || record.is_empty() {
                continue;
            }
            sink.upload(ChunkMesh::from_record(record));
            record.uploaded = true;
            summary.uploaded += 1;
        }

        let plan = self.streaming.reconcile(observer, &*chunks);
        let params = self.streaming.params();

        for &(coord, step) in &plan.to_create {
            chunks.insert(coord, ChunkRecord::new(coord, step, params));
        }
        summary.created = plan.to_create.len();

        for coord in &plan.to_retire {
            let Some(record) = chunks.get_mut(coord) else {
                continue;
            };
            if record.status == ChunkStatus::Generating {
                summary.deferred += 1;
                continue;
            }
            let was_uploaded = record.uploaded;
            record.release();
            chunks.remove(coord);
            if was_uploaded {
                sink.remove(*coord);
            }
            summary.retired += 1;
        }

        let has_pending = chunks
            .values()
            .any(|record| record.status == ChunkStatus::Pending);
        drop(chunks);

        if has_pending && !self.worker.is_busy() {
            summary.pass_started = self.worker.request_pass();
        }

        self.total_uploads += summary.uploaded;
        self.total_retirements += summary.retired;

        if summary.created > 0 || summary.retired > 0 {
            tracing::debug!(
                "Streaming: {} created, {} retired, {} deferred",
                summary.created,
                summary.retired,
                summary.deferred
            );
        }

        summary
    }

    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            total_uploads: self.total_uploads,
            total_retirements: self.total_retirements,
            empty_chunks: self.empty_chunks,
            passes: self.passes,
            ..Default::default()
        };
        let chunks = self.store.lock();
        for record in chunks.values() {
            match record.status {
                ChunkStatus::Pending => stats.pending += 1,
                ChunkStatus::Generating => stats.generating += 1,
                ChunkStatus::Ready => {
                    stats.ready += 1;
                    if record.uploaded {
                        stats.uploaded += 1;
                    }
                }
                ChunkStatus::Retiring => {}
            }
        }
        stats
    }

    /// True once nothing is queued or being generated.
    pub fn is_idle(&self) -> bool {
        if self.worker.is_busy() {
            return false;
        }
        let chunks = self.store.lock();
        chunks
            .values()
            .all(|record| record.status == ChunkStatus::Ready)
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.store.lock().contains_key(&coord)
    }

    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }
}
