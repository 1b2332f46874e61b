//! A parallel two-dimensional Barnes-Hut gravitational N-body core:
//! quadtree construction over a bump arena, Morton reordering, a
//! work-stealing force evaluator, and velocity-Verlet integration glue.
//!
//! The crate exposes one operation per simulation step -- [`compute_forces`]
//! -- given particle positions and masses; everything else (I/O, CLI,
//! initial-condition generation, time-stepping policy) is left to the
//! driver.

pub mod arena;
pub mod config;
pub mod error;
pub mod force;
pub mod integrate;
pub mod morton;
pub mod particles;
pub mod quadtree;
pub mod scheduler;

#[cfg(feature = "codec")]
pub mod io;

#[cfg(feature = "k-means-scheduler")]
pub mod kmeans;

use log::debug;

pub use config::SimConfig;
pub use error::{BhError, BhResult};
pub use particles::{BoundingBox, ParticleSet};
pub use quadtree::Tree;

/// Computes gravitational forces on every particle in `particles`, writing
/// into `particles.fx`/`particles.fy` (spec §2, §6 "core-level force
/// kernel interface"): validates arguments and finiteness, computes the
/// root bounding box, builds the quadtree, and dispatches the parallel
/// force evaluator. Returns the built tree's node count for observability;
/// callers that don't need it can ignore it.
pub fn compute_forces(particles: &mut ParticleSet, config: &SimConfig) -> BhResult<usize> {
    config.validate()?;
    particles.validate()?;

    let bounds = BoundingBox::enclosing(&particles.pos_x, &particles.pos_y, config.bounds_padding)
        .ok_or_else(|| BhError::ArgumentInvalid("N must be > 0".into()))?;

    let tree = Tree::build(particles, bounds, config)?;
    debug!("built tree: {} nodes for {} particles", tree.arena.len(), particles.len());

    scheduler::evaluate_forces(particles, &tree, config)?;

    Ok(tree.arena.len())
}

/// Re-sorts `particles` into Morton order within their current bounding
/// box (spec §4.5). The driver decides when to call this; the core never
/// calls it on its own.
pub fn resort_particles(particles: &mut ParticleSet, config: &SimConfig) -> BhResult<()> {
    let bounds = BoundingBox::enclosing(&particles.pos_x, &particles.pos_y, config.bounds_padding)
        .ok_or_else(|| BhError::ArgumentInvalid("N must be > 0".into()))?;
    morton::sort_particles(particles, &bounds);
    Ok(())
}
