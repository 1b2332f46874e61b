//! Error types for the Barnes-Hut core (spec §7).

use thiserror::Error;

/// Result alias used throughout this crate.
pub type BhResult<T> = Result<T, BhError>;

/// Fatal and non-fatal conditions the core distinguishes, per the error
/// table in spec §7. `CoincidentParticles` is kept as a variant for
/// observability even though it is not itself a build failure: the merge
/// rule in [`crate::quadtree`] handles it silently and only surfaces it
/// through a debug-level log line.
#[derive(Debug, Error)]
pub enum BhError {
    /// `N <= 0`, `theta <= 0`, `dt <= 0`, or an otherwise malformed argument.
    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),

    /// The tree build overran the pre-allocated node capacity.
    #[error("arena exhausted: used all {capacity} slots building a tree for {n} particles (try capacity >= {suggested} = {factor}*N)")]
    ArenaExhausted {
        capacity: usize,
        n: usize,
        suggested: usize,
        factor: usize,
    },

    /// A particle left the declared bounding box during integration.
    #[error("particle {index} left the simulation region at ({x}, {y})")]
    ParticleOutOfRegion { index: usize, x: f64, y: f64 },

    /// Two particles occupy (numerically) the same position; merged by the
    /// build rule, not itself a failure. Retained so callers that want to
    /// audit merges can match on it explicitly if they choose to treat it
    /// as one.
    #[error("particles {a} and {b} are coincident within epsilon")]
    CoincidentParticles { a: usize, b: usize },

    /// A NaN or infinite value was found in positions or masses.
    #[error("non-finite value in {field} at index {index}")]
    NonFinite { field: &'static str, index: usize },

    /// Propagated from the optional particle file codec (§6.1).
    #[error("particle file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
