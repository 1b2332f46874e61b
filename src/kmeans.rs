//! Alternative scheduler: partitions particles into `k` spatial clusters by
//! Lloyd's-algorithm k-means and dispatches one rayon task per cluster,
//! instead of fixed-size Morton chunks (spec §4.4, feature `k-means-scheduler`).
//!
//! This trades the default scheduler's cache locality for load balance when
//! particle density is highly non-uniform and a handful of Morton chunks
//! would otherwise dominate wall-clock time.

use rayon::prelude::*;

use crate::config::SimConfig;
use crate::error::{BhError, BhResult};
use crate::force::force_on_particle;
use crate::particles::ParticleSet;
use crate::quadtree::Tree;

const MAX_ITERATIONS: usize = 20;

/// Evaluates forces by partitioning particles into `k` clusters and
/// dispatching one task per cluster. `k > particles.len()` is rejected per
/// the spec's resolved Open Question (§9).
pub fn evaluate_forces_kmeans(particles: &mut ParticleSet, tree: &Tree, config: &SimConfig, k: usize) -> BhResult<()> {
    let n = particles.len();
    if k == 0 || k > n {
        return Err(BhError::ArgumentInvalid(format!("k-means scheduler: k={k} must be in 1..={n}")));
    }

    let assignment = cluster_assignments(&particles.pos_x, &particles.pos_y, k);
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &c) in assignment.iter().enumerate() {
        clusters[c].push(i);
    }

    let g = SimConfig::gravitational_constant(n);
    let ParticleSet { pos_x, pos_y, mass, fx, fy, .. } = particles;

    let results: Vec<(usize, f64, f64)> = clusters
        .par_iter()
        .flat_map(|members| {
            members
                .par_iter()
                .map(|&i| {
                    let (force_x, force_y) = force_on_particle(tree, pos_x, pos_y, mass, i, config.theta, g, config.max_stack_depth);
                    (i, force_x, force_y)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for (i, force_x, force_y) in results {
        fx[i] = force_x;
        fy[i] = force_y;
    }

    Ok(())
}

/// Lloyd's algorithm over raw positions, seeded deterministically from the
/// first `k` particles so results are reproducible across runs (spec I6
/// extends to this scheduler too).
fn cluster_assignments(pos_x: &[f64], pos_y: &[f64], k: usize) -> Vec<usize> {
    let n = pos_x.len();
    let mut centers: Vec<(f64, f64)> = (0..k).map(|c| (pos_x[c * n / k], pos_y[c * n / k])).collect();
    let mut assignment = vec![0usize; n];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for i in 0..n {
            let mut best = 0usize;
            let mut best_dist = f64::MAX;
            for (c, &(cx, cy)) in centers.iter().enumerate() {
                let dx = pos_x[i] - cx;
                let dy = pos_y[i] - cy;
                let dist = dx * dx + dy * dy;
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            if assignment[i] != best {
                assignment[i] = best;
                changed = true;
            }
        }

        let mut sums = vec![(0.0, 0.0, 0usize); k];
        for i in 0..n {
            let c = assignment[i];
            sums[c].0 += pos_x[i];
            sums[c].1 += pos_y[i];
            sums[c].2 += 1;
        }
        for (c, (sx, sy, count)) in sums.into_iter().enumerate() {
            if count > 0 {
                centers[c] = (sx / count as f64, sy / count as f64);
            }
        }

        if !changed {
            break;
        }
    }

    assignment
}
