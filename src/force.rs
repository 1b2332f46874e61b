//! Iterative Barnes-Hut force evaluator and the pairwise gravity kernel
//! (spec §4.3).
//!
//! The traversal is explicitly iterative with a bounded stack rather than
//! recursive: the spec calls out recursive traversal as ~10% slower from
//! call-frame overhead, and a recursive walk would need to rely on host
//! thread stack size at `N ~ 10^6`. Children are always pushed in fixed
//! quadrant order, so the floating-point summation order -- and therefore
//! the result -- is a pure function of tree shape (spec I6).

use crate::arena::NONE;
use crate::config::SOFTENING_EPS;
use crate::quadtree::Tree;

/// The pairwise force contribution on a particle of mass `mass_i` from a
/// node/particle of mass `mass_n` at offset `(dx, dy) = n.cm - pos_i`.
///
/// Sign convention (spec §9 Open Question, resolved): the vector points
/// *from* the probe particle *to* the source, and the returned force is
/// attractive in that direction -- a positive contribution pulls `i`
/// toward `n`. This is the one convention this crate implements; the
/// source's alternative (negated vector, negated sign) is mathematically
/// identical and is intentionally not carried.
#[inline]
pub fn pairwise_force(g: f64, mass_i: f64, mass_n: f64, dx: f64, dy: f64) -> (f64, f64) {
    let dist_sq = dx * dx + dy * dy + SOFTENING_EPS * SOFTENING_EPS;
    let inv_dist_cubed = dist_sq.sqrt().recip() / dist_sq;
    let scale = g * mass_i * mass_n * inv_dist_cubed;
    (dx * scale, dy * scale)
}

/// Accumulates the gravitational force on particle `i` by walking `tree`
/// from the root, applying the multipole acceptance criterion
/// `s^2 < theta^2 * r^2` (spec §4.3). `max_stack_depth` bounds the
/// explicit traversal stack; exceeding it is a programming-contract
/// violation (a tree built by [`crate::quadtree::Tree::build`] cannot
/// exceed it for non-pathological inputs, per spec §4.3) so it is an
/// assertion, not a recoverable error.
pub fn force_on_particle(
    tree: &Tree,
    pos_x: &[f64],
    pos_y: &[f64],
    mass: &[f64],
    i: usize,
    theta: f64,
    g: f64,
    max_stack_depth: usize,
) -> (f64, f64) {
    let (fx, _) = force_on_particle_traced(tree, pos_x, pos_y, mass, i, theta, g, max_stack_depth);
    fx
}

/// Same as [`force_on_particle`] but also returns the peak stack depth
/// reached, for the traversal-bound property test (spec I7).
pub fn force_on_particle_traced(
    tree: &Tree,
    pos_x: &[f64],
    pos_y: &[f64],
    mass: &[f64],
    i: usize,
    theta: f64,
    g: f64,
    max_stack_depth: usize,
) -> ((f64, f64), usize) {
    let px = pos_x[i];
    let py = pos_y[i];
    let mi = mass[i];
    let theta_sq = theta * theta;

    let mut fx = 0.0;
    let mut fy = 0.0;
    let mut stack = Vec::with_capacity(max_stack_depth.min(256));
    stack.push(tree.root);
    let mut peak_depth = stack.len();

    while let Some(idx) = stack.pop() {
        let node = tree.node(idx);

        if node.is_leaf() && node.pid as usize == i {
            continue; // self-interaction (spec: self-avoidance)
        }

        let dx = node.cm_x - px;
        let dy = node.cm_y - py;
        let side = node.bounds.side();
        let r_sq = dx * dx + dy * dy;

        // s^2 < theta^2 * r^2 avoids a sqrt on the hot path (spec §4.3).
        let accept = node.is_leaf() || (side * side < theta_sq * r_sq);

        if accept {
            let (dfx, dfy) = pairwise_force(g, mi, node.mass, dx, dy);
            fx += dfx;
            fy += dfy;
        } else {
            // Fixed quadrant order (SW, SE, NW, NE) keeps summation order
            // -- and therefore bit-for-bit results -- deterministic.
            for &child in &node.children {
                if child != NONE {
                    stack.push(child);
                }
            }
            peak_depth = peak_depth.max(stack.len());
            assert!(
                stack.len() <= max_stack_depth,
                "traversal stack depth {} exceeded bound {max_stack_depth} (spec I7)",
                stack.len()
            );
        }
    }

    ((fx, fy), peak_depth)
}
