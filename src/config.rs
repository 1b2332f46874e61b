//! Tunables for a single force-kernel invocation (spec §0, §4.1, §4.3, §4.4).
//!
//! Generalizes the teacher crate's `BhConfig` (theta / max_bodies_per_node /
//! max_tree_depth) to every knob the spec names explicitly.

/// Softening length squared-under-the-root term `epsilon` in the force
/// kernel (spec §4.3). Fixed by the external contract; not user-tunable.
pub const SOFTENING_EPS: f64 = 1e-3;

/// Coincident-particle merge epsilon (spec §4.2).
pub const COINCIDENT_EPS: f64 = 1e-9;

/// Minimum node side length below which two particles are merged
/// regardless of `COINCIDENT_EPS` (spec §4.2).
pub const MIN_NODE_SIDE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Multipole acceptance parameter. 0 means no grouping (degenerates to
    /// direct summation); higher values trade accuracy for speed.
    pub theta: f64,

    /// Arena capacity factor `c` in `capacity = c * N`, `c in [4, 10]`
    /// (spec §4.1).
    pub arena_capacity_factor: usize,

    /// When the arena is exhausted, double capacity and rebuild instead of
    /// failing outright (spec §4.1, choice (b)).
    pub auto_grow_arena: bool,

    /// Worker thread count `T`. `None` defers to rayon's default (one
    /// thread per physical core, the usual pick per spec §4.4).
    pub threads: Option<usize>,

    /// Dynamic chunk size for the Morton-ordered work-stealing scheduler
    /// (spec §4.4). 64 is the ablation's target; 8-128 are all acceptable.
    pub chunk_size: usize,

    /// Traversal stack depth bound (spec §4.3). 256 covers `N <= 10^6`
    /// under non-pathological distributions.
    pub max_stack_depth: usize,

    /// Fractional padding applied to the root bounding box on each side
    /// (spec §4.2, "with a safety margin, e.g. +-5%").
    pub bounds_padding: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            theta: 0.5,
            arena_capacity_factor: 10,
            auto_grow_arena: true,
            threads: None,
            chunk_size: 64,
            max_stack_depth: 256,
            bounds_padding: 0.05,
        }
    }
}

impl SimConfig {
    /// Gravitational constant for an `N`-particle system. The scaling
    /// `G = 100 / N` is part of the external contract (spec §4.3): input
    /// datasets were normalised against it and it must be preserved
    /// bit-for-bit.
    pub fn gravitational_constant(n: usize) -> f64 {
        100.0 / n as f64
    }

    /// Validates the tunables that matter before a build/evaluate pass
    /// starts. `theta == 0.0` stays legal (it degenerates to direct
    /// summation, per spec §8's boundary scenario); only a negative value
    /// is rejected, since squaring it in the acceptance test would
    /// otherwise silently treat it as `|theta|` (spec §7 `ArgumentInvalid`).
    pub fn validate(&self) -> crate::error::BhResult<()> {
        if self.theta < 0.0 {
            return Err(crate::error::BhError::ArgumentInvalid(format!("theta must be >= 0.0, got {}", self.theta)));
        }
        Ok(())
    }
}
