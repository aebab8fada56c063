use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, trace};

use super::dynamics::{VisitedChunks, integrate_slice};
use crate::error::{DynamicsFailure, EngineError};
use crate::physics::ballistics::ProjectileRecord;

/// Chunk set capacity reserved per projectile in a job.
const CHUNKS_PER_PROJECTILE: usize = 16;

/// One contiguous slice of the live collection, copied out for a worker.
pub struct DynamicsJob {
    pub tick: u64,
    /// Index of the slice's first record in the live collection
    pub start: usize,
    pub records: Vec<ProjectileRecord>,
    pub margin: f32,
    pub visited: Arc<VisitedChunks>,
}

pub enum WorkerCommand {
    Integrate(DynamicsJob),
    Shutdown,
}

pub enum WorkerEvent {
    Integrated {
        tick: u64,
        start: usize,
        records: Vec<ProjectileRecord>,
    },
    Failed {
        tick: u64,
        start: usize,
        count: usize,
    },
}

/// Slices delivered for one tick.
#[derive(Default)]
pub struct DynamicsBatch {
    pub slices: Vec<(usize, Vec<ProjectileRecord>)>,
    pub failures: Vec<DynamicsFailure>,
}

/// Fixed pool of dynamics threads sharing one job queue.
pub struct DynamicsPool {
    tx_cmd: Sender<WorkerCommand>,
    rx_evt: Receiver<WorkerEvent>,
    threads: Vec<JoinHandle<()>>,
}

impl DynamicsPool {
    pub fn spawn(workers: usize) -> Result<Self, EngineError> {
        let (tx_cmd, rx_cmd) = channel::unbounded::<WorkerCommand>();
        let (tx_evt, rx_evt) = channel::unbounded::<WorkerEvent>();

        #[cfg(not(target_arch = "wasm32"))]
        let cores = core_affinity::get_core_ids().unwrap_or_default();

        let mut threads = Vec::with_capacity(workers);
        for i in 0..workers {
            let rx_cmd = rx_cmd.clone();
            let tx_evt = tx_evt.clone();
            // Leave the first core to the primary thread.
            #[cfg(not(target_arch = "wasm32"))]
            let core = (cores.len() > 1).then(|| cores[1 + i % (cores.len() - 1)]);

            let thread = thread::Builder::new()
                .name(format!("projectile-dynamics-{i}"))
                .spawn(move || {
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if let Some(core) = core {
                            let _ = core_affinity::set_for_current(core);
                        }
                    }
                    worker_loop(rx_cmd, tx_evt)
                })
                .map_err(EngineError::WorkerSpawn)?;
            threads.push(thread);
        }

        debug!(workers, "projectile dynamics pool started");
        Ok(Self {
            tx_cmd,
            rx_evt,
            threads,
        })
    }

    pub fn workers(&self) -> usize {
        self.threads.len()
    }

    pub fn submit(&self, job: DynamicsJob) -> bool {
        self.tx_cmd.send(WorkerCommand::Integrate(job)).is_ok()
    }

    /// Wait until `expected` slices of `tick` arrive or `deadline` passes.
    /// Results left over from an earlier tick are dropped.
    pub fn collect(&self, tick: u64, expected: usize, deadline: Instant) -> DynamicsBatch {
        let mut batch = DynamicsBatch::default();
        let mut received = 0;
        while received < expected {
            match self.rx_evt.recv_deadline(deadline) {
                Ok(WorkerEvent::Integrated { tick: t, start, .. }) if t != tick => {
                    trace!(stale_tick = t, start, "discarding late dynamics slice");
                }
                Ok(WorkerEvent::Failed { tick: t, .. }) if t != tick => {}
                Ok(WorkerEvent::Integrated { start, records, .. }) => {
                    batch.slices.push((start, records));
                    received += 1;
                }
                Ok(WorkerEvent::Failed { start, count, .. }) => {
                    batch.failures.push(DynamicsFailure::Panicked { start, count });
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => {
                    batch.failures.push(DynamicsFailure::TimedOut {
                        pending: expected - received,
                    });
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    batch.failures.push(DynamicsFailure::Disconnected);
                    break;
                }
            }
        }
        batch
    }
}

impl Drop for DynamicsPool {
    fn drop(&mut self) {
        for _ in 0..self.threads.len() {
            let _ = self.tx_cmd.send(WorkerCommand::Shutdown);
        }
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

fn worker_loop(rx_cmd: Receiver<WorkerCommand>, tx_evt: Sender<WorkerEvent>) {
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            WorkerCommand::Integrate(job) => {
                if tx_evt.send(run_job(job)).is_err() {
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
}

/// Integrate a job's slice. Panics are caught and reported as a failed slice.
pub fn run_job(job: DynamicsJob) -> WorkerEvent {
    let DynamicsJob {
        tick,
        start,
        mut records,
        margin,
        visited,
    } = job;
    let count = records.len();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut local = HashSet::with_capacity(CHUNKS_PER_PROJECTILE * count);
        integrate_slice(&mut records, margin, &mut local);
        visited.merge(local);
    }));

    match result {
        Ok(()) => WorkerEvent::Integrated {
            tick,
            start,
            records,
        },
        Err(_) => WorkerEvent::Failed { tick, start, count },
    }
}
