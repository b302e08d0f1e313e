// =============================================================================
// Central Application State
// =============================================================================
//
// Holds the current engine handle for the lifetime of the process. Queries
// clone the `Arc<Engine>` under a short read lock and then run lock-free.
// A reload builds a complete new engine outside the lock and swaps the handle
// in one write; a failed reload leaves the previous engine untouched.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{error, info};

use crate::engine::Engine;
use crate::market_data::loader::load_price_points;
use crate::runtime_config::RuntimeConfig;

pub struct AppState {
    pub runtime_config: RuntimeConfig,
    engine: RwLock<Arc<Engine>>,
    /// Number of successful reloads since startup.
    reload_count: AtomicU64,
    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, engine: Engine) -> Self {
        Self {
            runtime_config: config,
            engine: RwLock::new(Arc::new(engine)),
            reload_count: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    /// Snapshot of the current engine.
    pub fn engine(&self) -> Arc<Engine> {
        self.engine.read().clone()
    }

    pub fn reload_count(&self) -> u64 {
        self.reload_count.load(Ordering::SeqCst)
    }

    /// Replace the engine wholesale and return the new handle.
    pub fn swap_engine(&self, engine: Engine) -> Arc<Engine> {
        let engine = Arc::new(engine);
        *self.engine.write() = Arc::clone(&engine);
        self.reload_count.fetch_add(1, Ordering::SeqCst);
        engine
    }

    /// Re-read the configured data file and rebuild. Blocking; call from a
    /// blocking worker.
    pub fn reload_from_disk(&self) -> Result<Arc<Engine>> {
        let result = load_price_points(&self.runtime_config.data_path)
            .and_then(|points| Engine::build(&self.runtime_config, points).map_err(Into::into));

        match result {
            Ok(engine) => {
                let current = self.swap_engine(engine);
                info!(
                    rows = current.rows(),
                    reloads = self.reload_count(),
                    "engine reloaded"
                );
                Ok(current)
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "reload failed, keeping previous engine");
                Err(e)
            }
        }
    }
}
