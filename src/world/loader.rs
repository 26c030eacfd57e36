//! Background chunk generation
//!
//! One worker thread owns mesh generation for every `Pending` record in the
//! shared chunk store. The control path asks for a pass with
//! [`GenerationWorker::request_pass`] and learns that it finished through a
//! [`PassReport`] on a crossbeam channel, polled without blocking.
//!
//! The store lock is only held to claim pending records and to publish
//! finished buffers, never while the polygonizer runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded, unbounded};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::core::chunk::{ChunkRecord, ChunkStatus, GridCoord};
use crate::world::generator::{ChunkBuffers, ChunkGenerator};

/// Chunk records shared between the control path and the worker.
pub type ChunkStore = Arc<Mutex<FxHashMap<GridCoord, ChunkRecord>>>;

pub fn new_chunk_store() -> ChunkStore {
    Arc::new(Mutex::new(FxHashMap::default()))
}

enum WorkerCommand {
    GeneratePending,
}

/// Summary sent back once a pass over the pending records is done.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Records that reached `Ready` in this pass.
    pub generated: Vec<GridCoord>,
    /// How many of those produced no geometry.
    pub empty: usize,
    /// Records retired while they were being generated.
    pub discarded: usize,
    pub elapsed: Duration,
}

pub struct GenerationWorker {
    command_tx: Option<Sender<WorkerCommand>>,
    report_rx: Receiver<PassReport>,
    enabled: Arc<AtomicBool>,
    pass_in_flight: bool,
    handle: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    pub fn spawn(store: ChunkStore, generator: Arc<ChunkGenerator>) -> std::io::Result<Self> {
        // At most one pass is ever requested at a time
        let (command_tx, command_rx) = bounded::<WorkerCommand>(1);
        let (report_tx, report_rx) = unbounded::<PassReport>();
        let enabled = Arc::new(AtomicBool::new(true));
        let worker_enabled = Arc::clone(&enabled);

        let handle = thread::Builder::new()
            .name("terrain-gen".to_string())
            .spawn(move || {
                tracing::info!("Terrain generation worker started");
                while let Ok(WorkerCommand::GeneratePending) = command_rx.recv() {
                    if !worker_enabled.load(Ordering::Acquire) {
                        break;
                    }
                    let report = run_pass(&store, &generator, &worker_enabled);
                    if report_tx.send(report).is_err() {
                        // Control path has gone away
                        break;
                    }
                }
                tracing::info!("Terrain generation worker stopped");
            })?;

        Ok(GenerationWorker {
            command_tx: Some(command_tx),
            report_rx,
            enabled,
            pass_in_flight: false,
            handle: Some(handle),
        })
    }

    /// Start a pass over pending records. Returns `false` if one is already running
    /// or the worker has been shut down.
    pub fn request_pass(&mut self) -> bool {
        if self.pass_in_flight || !self.enabled.load(Ordering::Acquire) {
            return false;
        }
        let Some(tx) = &self.command_tx else {
            return false;
        };
        match tx.try_send(WorkerCommand::GeneratePending) {
            Ok(()) => {
                self.pass_in_flight = true;
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pass_in_flight
    }

    /// Non-blocking check for a finished pass.
    pub fn poll_complete(&mut self) -> Option<PassReport> {
        match self.report_rx.try_recv() {
            Ok(report) => {
                self.pass_in_flight = false;
                Some(report)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pass_in_flight = false;
                None
            }
        }
    }

    /// Block until the running pass finishes or `timeout` elapses.
    pub fn wait_complete(&mut self, timeout: Duration) -> Option<PassReport> {
        if !self.pass_in_flight {
            return None;
        }
        match self.report_rx.recv_timeout(timeout) {
            Ok(report) => {
                self.pass_in_flight = false;
                Some(report)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.pass_in_flight = false;
                None
            }
        }
    }

    /// Stop accepting work and wait for the current pass to finish.
    pub fn shutdown(&mut self) {
        self.enabled.store(false, Ordering::Release);
        // Closing the channel wakes an idle worker
        self.command_tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Terrain generation worker panicked");
            }
        }
        self.pass_in_flight = false;
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_pass(store: &ChunkStore, generator: &ChunkGenerator, enabled: &AtomicBool) -> PassReport {
    let start = Instant::now();
    let jobs = claim_pending(store);

    let mut report = PassReport::default();
    let mut remaining = jobs.into_iter();

    for (coord, step) in remaining.by_ref() {
        let buffers = generator.generate_chunk(coord, step);
        publish(store, coord, buffers, &mut report);

        if !enabled.load(Ordering::Acquire) {
            break;
        }
    }

    // Stopped early: hand unstarted records back untouched
    let unstarted: Vec<GridCoord> = remaining.map(|(coord, _)| coord).collect();
    if !unstarted.is_empty() {
        let mut chunks = store.lock();
        for coord in &unstarted {
            if let Some(record) = chunks.get_mut(coord) {
                record.status = ChunkStatus::Pending;
            }
        }
        tracing::debug!("Pass interrupted, {} chunks returned to pending", unstarted.len());
    }

    report.elapsed = start.elapsed();
    tracing::debug!(
        "Generated {} chunks ({} empty, {} discarded) in {:?}",
        report.generated.len(),
        report.empty,
        report.discarded,
        report.elapsed
    );
    report
}

/// Mark every pending record as generating and return what to build.
fn claim_pending(store: &ChunkStore) -> Vec<(GridCoord, f64)> {
    let mut chunks = store.lock();
    chunks
        .values_mut()
        .filter(|record| record.status == ChunkStatus::Pending)
        .map(|record| {
            record.status = ChunkStatus::Generating;
            (record.coord, record.sampling_step)
        })
        .collect()
}

/// Store finished buffers, unless the record was retired in the meantime.
fn publish(store: &ChunkStore, coord: GridCoord, buffers: ChunkBuffers, report: &mut PassReport) {
    let is_empty = buffers.is_empty();
    let mut chunks = store.lock();
    match chunks.get_mut(&coord) {
        Some(record) if record.status == ChunkStatus::Generating => {
            record.set_mesh(buffers.vertices, buffers.triangles, buffers.normals);
            report.generated.push(coord);
            if is_empty {
                report.empty += 1;
            }
        }
        _ => report.discarded += 1,
    }
}
