//! Error types.
//!
//! Only setup can fail: loading configuration and spawning worker threads.
//! Problems during a tick are reported as [`DynamicsFailure`]s, logged, and
//! the affected projectiles retried on the next tick.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn projectile dynamics worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("failed to read engine config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// A dynamics job that did not deliver its slice this tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DynamicsFailure {
    #[error("dynamics deadline passed with {pending} slice(s) outstanding")]
    TimedOut { pending: usize },
    #[error("dynamics job for {count} projectile(s) starting at {start} panicked")]
    Panicked { start: usize, count: usize },
    #[error("dynamics workers disconnected")]
    Disconnected,
}
