//! Dynamic work-stealing dispatch of the per-particle force kernel over a
//! built tree (spec §4.4).
//!
//! Particles are expected to already be Morton-sorted by the caller so that
//! a fixed chunk size groups spatial neighbours together; this module only
//! owns the *parallel dispatch*, not the ordering decision.

use rayon::prelude::*;

use crate::config::SimConfig;
use crate::error::{BhError, BhResult};
use crate::force::force_on_particle;
use crate::particles::ParticleSet;
use crate::quadtree::Tree;

/// Evaluates the force on every particle in `particles` against `tree`,
/// writing into `particles.fx`/`particles.fy`. Dispatches over
/// `config.chunk_size`-sized chunks via rayon's work-stealing
/// `par_chunks_mut` (spec §4.4), on a dedicated thread pool sized by
/// `config.threads` when set, otherwise rayon's global pool.
pub fn evaluate_forces(particles: &mut ParticleSet, tree: &Tree, config: &SimConfig) -> BhResult<()> {
    let g = SimConfig::gravitational_constant(particles.len());

    match config.threads {
        Some(n_threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .map_err(|e| BhError::ArgumentInvalid(format!("failed to build thread pool with {n_threads} threads: {e}")))?;
            pool.install(|| dispatch(particles, tree, config, g));
        }
        None => dispatch(particles, tree, config, g),
    }

    Ok(())
}

/// Splits `particles`' fields so the read-only position/mass arrays can be
/// shared across chunks while `fx`/`fy` are handed out disjointly, one
/// mutable slice per chunk, to rayon's work-stealing iterator.
fn dispatch(particles: &mut ParticleSet, tree: &Tree, config: &SimConfig, g: f64) {
    let ParticleSet { pos_x, pos_y, mass, fx, fy, .. } = particles;
    let chunk_size = config.chunk_size.max(1);

    fx.par_chunks_mut(chunk_size)
        .zip(fy.par_chunks_mut(chunk_size))
        .enumerate()
        .for_each(|(chunk_idx, (fx_chunk, fy_chunk))| {
            let base = chunk_idx * chunk_size;
            for (offset, (fx_i, fy_i)) in fx_chunk.iter_mut().zip(fy_chunk.iter_mut()).enumerate() {
                let i = base + offset;
                let (force_x, force_y) = force_on_particle(tree, pos_x, pos_y, mass, i, config.theta, g, config.max_stack_depth);
                *fx_i = force_x;
                *fy_i = force_y;
            }
        });
}
