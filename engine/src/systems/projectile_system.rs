//! Projectile lifecycle management system.
//!
//! One [`ProjectileSystem`] per world owns that world's live projectiles and
//! advances them once per [`update`](ProjectileSystem::update):
//!
//! 1. drain projectiles queued from other threads through a [`ProjectileSpawner`];
//! 2. integrate dynamics in parallel slices on the [`DynamicsPool`];
//! 3. build a [`HitboxIndex`] from the chunks those slices swept;
//! 4. raytrace every integrated projectile on the calling thread, emitting hit
//!    events and trail descriptors and dropping finished projectiles;
//! 5. swap the live and staging buffers.
//!
//! The thread holding `&mut ProjectileSystem` is the primary thread. It can
//! add projectiles directly; everyone else goes through a spawner.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use glam::Vec3;
use static_assertions::assert_impl_all;
use tracing::{debug, trace, warn};

use super::dynamics::{VisitedChunks, integrate_slice, slice_len};
use super::worker::{DynamicsJob, DynamicsPool};
use crate::config::EngineConfig;
use crate::diagnostics::{PhaseTimer, TickTimings};
use crate::error::{DynamicsFailure, EngineError};
use crate::hitbox::{HitboxIndex, HitboxRegistry};
use crate::physics::ballistics::{ProjectileOutcome, ProjectileRecord};
use crate::physics::types::{ChunkCoord, EntityId, WeaponId, WorldId};
use crate::raytrace::{RaytraceHit, VoxelRaytracer};
use crate::world::WorldQuery;
use crate::world::block::Block;
use crate::world::block_collision::BlockCollisionTables;

/// Chunk set capacity reserved per live projectile.
const VISITED_CHUNKS_PER_PROJECTILE: usize = 16;

/// A projectile struck a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHitBlock {
    pub block: Block,
    pub location: Vec3,
    /// Shooter credited with the hit
    pub source: EntityId,
    pub weapon: WeaponId,
}

/// A projectile struck a dynamic object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileHitEntity {
    pub entity: EntityId,
    pub location: Vec3,
    /// Shooter credited with the hit
    pub source: EntityId,
    pub weapon: WeaponId,
    /// Total path length from the muzzle to the hit
    pub distance: f32,
}

/// Presentation hint for the path a projectile covered this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub start: Vec3,
    pub direction: Vec3,
    pub length: f32,
    /// Path length travelled before this segment
    pub net_distance: f32,
    pub weapon: WeaponId,
}

/// A projectile that left the simulation this tick, in its final state.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedProjectile {
    pub record: ProjectileRecord,
    pub outcome: ProjectileOutcome,
    pub out_of_bounds: bool,
}

/// Everything one tick produced.
#[derive(Debug, Default)]
pub struct ProjectileSystemUpdate {
    pub tick: u64,
    /// Hitboxes gathered this tick, reusable for explosions
    pub hitboxes: HitboxIndex,
    pub hit_blocks: Vec<ProjectileHitBlock>,
    pub hit_entities: Vec<ProjectileHitEntity>,
    pub trails: Vec<TrailSegment>,
    pub removed: Vec<RemovedProjectile>,
    /// Projectiles whose dynamics did not finish in time; retried next tick
    pub unresolved: usize,
    pub timings: Option<TickTimings>,
}

/// Cloneable handle for queuing projectiles from any thread. Queued
/// projectiles join the live collection at the start of the next update.
#[derive(Clone)]
pub struct ProjectileSpawner {
    tx: Sender<ProjectileRecord>,
}

impl ProjectileSpawner {
    /// Returns `false` if the system has been dropped.
    pub fn add_projectile(&self, projectile: ProjectileRecord) -> bool {
        self.tx.send(projectile).is_ok()
    }

    pub fn add_projectiles(&self, projectiles: impl IntoIterator<Item = ProjectileRecord>) -> bool {
        projectiles.into_iter().all(|p| self.tx.send(p).is_ok())
    }
}

assert_impl_all!(ProjectileSpawner: Send, Sync, Clone);

/// Manages the projectiles of one world.
pub struct ProjectileSystem {
    world: WorldId,
    config: EngineConfig,
    hitbox_registry: HitboxRegistry,
    block_collision: BlockCollisionTables,
    live: Vec<ProjectileRecord>,
    staging: Vec<ProjectileRecord>,
    tx_create: Sender<ProjectileRecord>,
    rx_create: Receiver<ProjectileRecord>,
    pool: Option<DynamicsPool>,
    tick: u64,
}

assert_impl_all!(ProjectileSystem: Send);

impl ProjectileSystem {
    /// Create the system for `world`, spawning `config.worker_threads`
    /// dynamics workers.
    pub fn new(world: WorldId, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let pool = match config.worker_threads {
            0 => None,
            n => Some(DynamicsPool::spawn(n)?),
        };
        let (tx_create, rx_create) = channel::unbounded();
        Ok(Self {
            world,
            hitbox_registry: HitboxRegistry::with_overrides(&config.hitbox_sizes, &config.targetable),
            block_collision: BlockCollisionTables::with_overrides(&config.block_collision),
            live: Vec::with_capacity(config.staging_capacity),
            staging: Vec::with_capacity(config.staging_capacity),
            tx_create,
            rx_create,
            pool,
            tick: 0,
            config,
        })
    }

    /// Add a projectile to the live collection immediately.
    pub fn add_projectile(&mut self, projectile: ProjectileRecord) {
        self.live.push(projectile);
    }

    pub fn add_projectiles(&mut self, projectiles: impl IntoIterator<Item = ProjectileRecord>) {
        self.live.extend(projectiles);
    }

    pub fn spawner(&self) -> ProjectileSpawner {
        ProjectileSpawner {
            tx: self.tx_create.clone(),
        }
    }

    /// Number of live projectiles. Queued projectiles are not counted until
    /// the next update drains them.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectileRecord> {
        self.live.iter()
    }

    /// Drop every live and queued projectile.
    pub fn clear(&mut self) {
        self.live.clear();
        self.rx_create.try_iter().for_each(drop);
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hitbox_registry(&self) -> &HitboxRegistry {
        &self.hitbox_registry
    }

    /// Mutable access, e.g. to register custom hitboxes for vehicle models.
    pub fn hitbox_registry_mut(&mut self) -> &mut HitboxRegistry {
        &mut self.hitbox_registry
    }

    pub fn block_collision(&self) -> &BlockCollisionTables {
        &self.block_collision
    }

    pub fn block_collision_mut(&mut self) -> &mut BlockCollisionTables {
        &mut self.block_collision
    }

    /// Advance every projectile by one tick.
    ///
    /// `force_include` chunks are added to the hitbox index even if no
    /// projectile came near them, for callers that want to reuse the index.
    pub fn update<W>(&mut self, world: &W, force_include: &HashSet<ChunkCoord>) -> ProjectileSystemUpdate
    where
        W: WorldQuery + ?Sized,
    {
        self.tick += 1;
        let tick = self.tick;
        let mut timer = PhaseTimer::start(self.config.debug_timings);

        self.drain_creation_queue();
        let (integrated, failures, mut chunks) = self.run_dynamics(tick);
        for failure in &failures {
            warn!(tick, world = self.world.0, %failure, "projectile dynamics incomplete, retrying next tick");
        }
        let dynamics = timer.lap();

        chunks.extend(force_include.iter().copied());
        let hitboxes = HitboxIndex::build(world, chunks, &self.hitbox_registry);
        let hitbox_index = timer.lap();

        let mut update = ProjectileSystemUpdate {
            tick,
            hitboxes,
            ..Default::default()
        };
        self.resolve(world, &integrated, &mut update);
        let resolve = timer.lap();

        if timer.enabled() {
            let timings = TickTimings {
                dynamics,
                hitbox_index,
                resolve,
            };
            debug!(
                tick,
                world = self.world.0,
                live = self.live.len(),
                hitboxes = update.hitboxes.len(),
                dynamics_us = timings.dynamics.as_micros() as u64,
                hitbox_index_us = timings.hitbox_index.as_micros() as u64,
                resolve_us = timings.resolve.as_micros() as u64,
                "projectile tick timings"
            );
            update.timings = Some(timings);
        }
        update
    }

    fn drain_creation_queue(&mut self) {
        let before = self.live.len();
        self.live.extend(self.rx_create.try_iter());
        let queued = self.live.len() - before;
        if queued > 0 {
            trace!(queued, world = self.world.0, "drained projectile creation queue");
        }
    }

    /// Integrate every live projectile, in parallel when a pool exists.
    /// Returns which records were integrated, any failures, and the chunks
    /// the integrated segments swept.
    fn run_dynamics(&mut self, tick: u64) -> (Vec<bool>, Vec<DynamicsFailure>, HashSet<ChunkCoord>) {
        let n = self.live.len();
        let mut integrated = vec![false; n];
        if n == 0 {
            return (integrated, Vec::new(), HashSet::new());
        }
        let margin = self.config.hitbox_search_margin;
        let capacity = VISITED_CHUNKS_PER_PROJECTILE * n;

        let Some(pool) = &self.pool else {
            let mut chunks = HashSet::with_capacity(capacity);
            integrate_slice(&mut self.live, margin, &mut chunks);
            integrated.fill(true);
            return (integrated, Vec::new(), chunks);
        };

        let visited = Arc::new(VisitedChunks::with_capacity(capacity));
        let len = slice_len(n, pool.workers());
        let mut failures = Vec::new();
        let mut expected = 0;
        for (i, slice) in self.live.chunks(len).enumerate() {
            let job = DynamicsJob {
                tick,
                start: i * len,
                records: slice.to_vec(),
                margin,
                visited: Arc::clone(&visited),
            };
            if pool.submit(job) {
                expected += 1;
            } else {
                failures.push(DynamicsFailure::Disconnected);
            }
        }

        let deadline = Instant::now() + Duration::from_millis(self.config.worker_timeout_ms);
        let batch = pool.collect(tick, expected, deadline);
        for (start, records) in batch.slices {
            let end = start + records.len();
            for (slot, record) in self.live[start..end].iter_mut().zip(records) {
                *slot = record;
            }
            integrated[start..end].fill(true);
        }
        failures.extend(batch.failures);

        let chunks = match Arc::try_unwrap(visited) {
            Ok(visited) => visited.into_inner(),
            // A late job still holds a handle.
            Err(shared) => shared.snapshot(),
        };
        (integrated, failures, chunks)
    }

    /// Raytrace integrated projectiles, emit events, and move survivors to the
    /// staging buffer before swapping it in. Projectiles whose dynamics did
    /// not run are carried over untouched.
    fn resolve<W>(&mut self, world: &W, integrated: &[bool], update: &mut ProjectileSystemUpdate)
    where
        W: WorldQuery + ?Sized,
    {
        let tracer = VoxelRaytracer::new(world, &update.hitboxes, &self.block_collision).with_margins(
            self.config.raytrace_continuity_margin,
            self.config.max_distance_margin,
        );

        for (mut record, &resolved) in self.live.drain(..).zip(integrated) {
            if !resolved {
                update.unresolved += 1;
                self.staging.push(record);
                continue;
            }

            let result = tracer.trace(&record);
            update.trails.push(TrailSegment {
                start: record.position,
                direction: record.direction,
                length: record.dist_to_next.min(result.distance),
                net_distance: record.distance,
                weapon: record.weapon,
            });

            let location = result.location.unwrap_or(record.next_position);
            let hit = match result.hit {
                Some(RaytraceHit::Block(block)) => {
                    update.hit_blocks.push(ProjectileHitBlock {
                        block,
                        location,
                        source: record.shooter,
                        weapon: record.weapon,
                    });
                    Some(ProjectileOutcome::HitBlock)
                }
                Some(RaytraceHit::Entity(entity)) => {
                    update.hit_entities.push(ProjectileHitEntity {
                        entity,
                        location,
                        source: record.shooter,
                        weapon: record.weapon,
                        distance: record.distance + result.distance,
                    });
                    Some(ProjectileOutcome::HitEntity)
                }
                None => None,
            };

            record.lifetime += 1;
            record.distance += record.dist_to_next;

            let outcome = record.outcome(hit, result.out_of_bounds);
            if outcome.is_alive() {
                record.position = record.next_position;
                self.staging.push(record);
            } else {
                update.removed.push(RemovedProjectile {
                    record,
                    outcome,
                    out_of_bounds: result.out_of_bounds,
                });
            }
        }

        std::mem::swap(&mut self.live, &mut self.staging);
        self.staging.clear();
    }
}
