//! Projectile Bench - Headless Load Test
//!
//! Run with: `cargo run --release --bin projectile-bench -- [options]`
//!
//! Options:
//! - `--config <path>`: Engine config JSON (defaults otherwise)
//! - `--projectiles <n>`: Projectiles kept in flight (default 2000)
//! - `--ticks <n>`: Ticks to simulate (default 600)
//!
//! Log level follows `RUST_LOG` (default `info`). Set `debug_timings` in the
//! config, or `RUST_LOG=voxel_ballistics=debug`, for per-tick phase timings.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use glam::{IVec3, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use voxel_ballistics::benchmark::BenchmarkSpawner;
use voxel_ballistics::physics::{EntityId, WorldId};
use voxel_ballistics::world::{DynamicObject, EntityKind, Material, MemoryWorld};
use voxel_ballistics::{EngineConfig, ProjectileSystem};

const ARENA_RADIUS: i32 = 96;
const GROUND_Y: i32 = 63;

struct Options {
    config: Option<String>,
    projectiles: usize,
    ticks: u64,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        config: None,
        projectiles: 2000,
        ticks: 600,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => options.config = Some(value()?),
            "--projectiles" => options.projectiles = value()?.parse().map_err(|e| format!("--projectiles: {e}"))?,
            "--ticks" => options.ticks = value()?.parse().map_err(|e| format!("--ticks: {e}"))?,
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(options)
}

/// Flat floor, a ring of walls and a crowd of targets.
fn build_arena() -> MemoryWorld {
    let mut world = MemoryWorld::new();
    let r = ARENA_RADIUS;
    world.fill(IVec3::new(-r, GROUND_Y, -r), IVec3::new(r, GROUND_Y, r), Material::Stone);
    for (min, max) in [
        (IVec3::new(-r, GROUND_Y, -r), IVec3::new(r, GROUND_Y + 6, -r)),
        (IVec3::new(-r, GROUND_Y, r), IVec3::new(r, GROUND_Y + 6, r)),
        (IVec3::new(-r, GROUND_Y, -r), IVec3::new(-r, GROUND_Y + 6, r)),
        (IVec3::new(r, GROUND_Y, -r), IVec3::new(r, GROUND_Y + 6, r)),
    ] {
        world.fill(min, max, Material::Bricks);
    }

    let kinds = [EntityKind::Zombie, EntityKind::Skeleton, EntityKind::Cow, EntityKind::Player];
    let mut id = 1;
    for x in (-80..=80).step_by(8) {
        for z in (-80..=80).step_by(8) {
            let kind = kinds[id as usize % kinds.len()];
            let position = Vec3::new(x as f32 + 0.5, (GROUND_Y + 1) as f32, z as f32 + 0.5);
            world.add_object(DynamicObject::new(EntityId(id), kind, position));
            id += 1;
        }
    }
    world
}

/// Mean of `total` over `ticks`, in microseconds.
fn mean_micros(total: Duration, ticks: u64) -> u128 {
    total.as_micros() / u128::from(ticks.max(1))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    let options = parse_args()?;
    let config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    info!(
        workers = config.worker_threads,
        projectiles = options.projectiles,
        ticks = options.ticks,
        "starting projectile bench"
    );

    let world = build_arena();
    let mut system = ProjectileSystem::new(WorldId(0), config)?;
    let spawner = BenchmarkSpawner::new(options.projectiles, Vec3::new(0.5, 66.0, 0.5));
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let force_include = HashSet::new();

    let (mut fired, mut block_hits, mut entity_hits, mut unresolved) = (0usize, 0usize, 0usize, 0usize);
    let mut tick_time = Duration::ZERO;
    let mut worst = Duration::ZERO;
    for _ in 0..options.ticks {
        fired += spawner.top_up(&mut system, &mut rng);
        let start = Instant::now();
        let update = system.update(&world, &force_include);
        let elapsed = start.elapsed();
        tick_time += elapsed;
        worst = worst.max(elapsed);
        block_hits += update.hit_blocks.len();
        entity_hits += update.hit_entities.len();
        unresolved += update.unresolved;
    }

    info!(
        fired,
        block_hits,
        entity_hits,
        unresolved,
        mean_tick_us = mean_micros(tick_time, options.ticks) as u64,
        worst_tick_us = worst.as_micros() as u64,
        "projectile bench finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_micros() {
        assert_eq!(mean_micros(Duration::from_millis(3), 3), 1000);
        assert_eq!(mean_micros(Duration::from_micros(40), 0), 40);
        // Tick counts past u32::MAX are not truncated.
        let ticks = u64::from(u32::MAX) + 1;
        assert_eq!(mean_micros(Duration::from_secs(ticks), ticks), 1_000_000);
    }
}
