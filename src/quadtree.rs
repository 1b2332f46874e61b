//! Quadtree builder with center-of-mass aggregation.
//!
//! Construction is an explicit loop per particle, not recursion: each
//! particle walks down from the root, at each node either landing in an
//! empty slot, merging with a coincident leaf, promoting a leaf to
//! internal, or descending into an existing child. No call stack grows
//! with tree depth, which is what lets this survive `N ~ 10^6` without
//! relying on host thread stack size.

use log::debug;

use crate::arena::{Arena, NodeIndex, NONE};
use crate::config::{COINCIDENT_EPS, MIN_NODE_SIDE, SimConfig};
use crate::error::BhResult;
use crate::particles::{BoundingBox, ParticleSet};

/// A single quadtree node. `pid < 0` and all four `children` empty means
/// an (transient, never observed in a finished tree) empty node; `pid >= 0`
/// with all children empty is a leaf holding exactly that particle index;
/// `pid < 0` with at least one present child is internal.
#[derive(Clone, Debug)]
pub struct Node {
    pub bounds: BoundingBox,
    pub children: [NodeIndex; 4],
    pub mass: f64,
    pub cm_x: f64,
    pub cm_y: f64,
    pub pid: i64,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            bounds: BoundingBox { x_min: 0.0, x_max: 0.0, y_min: 0.0, y_max: 0.0 },
            children: [NONE; 4],
            mass: 0.0,
            cm_x: 0.0,
            cm_y: 0.0,
            pid: -1,
        }
    }
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.pid >= 0
    }

    pub fn is_internal(&self) -> bool {
        self.pid < 0 && self.children.iter().any(|&c| c != NONE)
    }

    fn is_empty(&self) -> bool {
        self.pid < 0 && self.children == [NONE; 4]
    }
}

/// A built quadtree: an arena of nodes plus the root index. Owned
/// exclusively by the arena for the duration of one force-kernel call.
pub struct Tree {
    pub arena: Arena<Node>,
    pub root: NodeIndex,
}

impl Tree {
    /// Builds a tree over `particles` inside `bounds`. Retries with a
    /// doubled arena when `config.auto_grow_arena` is set and the first
    /// attempt runs out of node slots; otherwise propagates
    /// `ArenaExhausted` immediately.
    pub fn build(particles: &ParticleSet, bounds: BoundingBox, config: &SimConfig) -> BhResult<Self> {
        let n = particles.len();
        let mut capacity = (config.arena_capacity_factor * n).max(1);

        loop {
            let mut arena: Arena<Node> = Arena::with_capacity(capacity);
            let root = arena.alloc(n, config.arena_capacity_factor)?;
            arena.set(root, Node { bounds, ..Node::default() });

            match build_all(&mut arena, root, particles, n, config.arena_capacity_factor) {
                Ok(()) => return Ok(Tree { arena, root }),
                Err(err @ crate::error::BhError::ArenaExhausted { .. }) => {
                    if !config.auto_grow_arena {
                        return Err(err);
                    }
                    capacity *= 2;
                    debug!("arena exhausted at N={n}, growing to capacity={capacity} and rebuilding");
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        self.arena.get(idx)
    }
}

fn build_all(
    arena: &mut Arena<Node>,
    root: NodeIndex,
    particles: &ParticleSet,
    n: usize,
    capacity_factor: usize,
) -> BhResult<()> {
    for i in 0..n {
        insert_particle(arena, root, i, particles, n, capacity_factor)?;
    }
    Ok(())
}

/// Inserts particle `i`: walks from `root`, landing the particle in an
/// empty slot, merging it with a coincident leaf, promoting a leaf to
/// internal, or descending into an existing child, aggregating mass and
/// center of mass along the way.
fn insert_particle(
    arena: &mut Arena<Node>,
    root: NodeIndex,
    i: usize,
    particles: &ParticleSet,
    n: usize,
    capacity_factor: usize,
) -> BhResult<()> {
    let (ix, iy, im) = (particles.pos_x[i], particles.pos_y[i], particles.mass[i]);
    let mut current = root;

    loop {
        let node = arena.get(current).clone();

        // Step 1: empty node becomes a leaf holding `i`.
        if node.is_empty() {
            arena.set(current, Node { pid: i as i64, mass: im, cm_x: ix, cm_y: iy, ..node });
            return Ok(());
        }

        // Step 2: leaf holding particle `j` -- merge or promote to internal.
        if node.is_leaf() {
            let j = node.pid as usize;
            let (jx, jy) = (particles.pos_x[j], particles.pos_y[j]);
            let side = node.bounds.side();

            if ((ix - jx).abs() < COINCIDENT_EPS && (iy - jy).abs() < COINCIDENT_EPS) || side < MIN_NODE_SIDE {
                debug!("merging coincident particles {j} and {i}");
                let new_mass = node.mass + im;
                let cm_x = (node.mass * node.cm_x + im * ix) / new_mass;
                let cm_y = (node.mass * node.cm_y + im * iy) / new_mass;
                arena.set(current, Node { mass: new_mass, cm_x, cm_y, ..node });
                return Ok(());
            }

            let qj = node.bounds.quadrant(jx, jy);
            let child_bounds = node.bounds.child_bounds(qj);
            let child_idx = arena.alloc(n, capacity_factor)?;
            arena.set(
                child_idx,
                Node { bounds: child_bounds, pid: j as i64, mass: node.mass, cm_x: jx, cm_y: jy, ..Node::default() },
            );
            let mut promoted = node.clone();
            promoted.pid = -1;
            promoted.children[qj] = child_idx;
            arena.set(current, promoted);
            // Fall through (same node, now internal) to step 3 below.
        }

        // Step 3/4: internal node. Aggregate particle `i` into it, then
        // either place a fresh leaf in an empty child or descend.
        let node = arena.get(current).clone();
        let new_mass = node.mass + im;
        let cm_x = (node.mass * node.cm_x + im * ix) / new_mass;
        let cm_y = (node.mass * node.cm_y + im * iy) / new_mass;
        arena.set(current, Node { mass: new_mass, cm_x, cm_y, ..node.clone() });

        let q = node.bounds.quadrant(ix, iy);
        if node.children[q] == NONE {
            let child_bounds = node.bounds.child_bounds(q);
            let child_idx = arena.alloc(n, capacity_factor)?;
            arena.set(
                child_idx,
                Node { bounds: child_bounds, pid: i as i64, mass: im, cm_x: ix, cm_y: iy, ..Node::default() },
            );
            let mut parent = arena.get(current).clone();
            parent.children[q] = child_idx;
            arena.set(current, parent);
            return Ok(());
        }

        current = node.children[q];
    }
}
