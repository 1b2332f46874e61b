//! Two-stage kick-drift-kick velocity-Verlet integration glue (spec §4.6).
//!
//! The force kernel assumes positions are consistent at the instant of
//! call; this interleaving is required for that and for the symplectic
//! property to hold. Any other integrator is permitted by the contract but
//! loses that guarantee.

use log::warn;

use crate::config::SimConfig;
use crate::error::{BhError, BhResult};
use crate::particles::{BoundingBox, ParticleSet};
use crate::quadtree::Tree;
use crate::scheduler;

/// Advances `particles` by one velocity-Verlet step of size `dt`:
/// half-kick, drift, rebuild + force evaluation, half-kick (spec §4.6
/// steps 1-5). `particles.acc_x`/`acc_y` hold the previous step's
/// acceleration on entry and the new one on return.
pub fn step(particles: &mut ParticleSet, config: &SimConfig, dt: f64) -> BhResult<()> {
    if dt <= 0.0 {
        return Err(BhError::ArgumentInvalid("dt must be > 0".into()));
    }
    config.validate()?;
    particles.validate()?;
    let n = particles.len();

    for i in 0..n {
        particles.vel_x[i] += 0.5 * dt * particles.acc_x[i];
        particles.vel_y[i] += 0.5 * dt * particles.acc_y[i];
        particles.pos_x[i] += dt * particles.vel_x[i];
        particles.pos_y[i] += dt * particles.vel_y[i];
    }

    let bounds = BoundingBox::enclosing(&particles.pos_x, &particles.pos_y, config.bounds_padding)
        .ok_or_else(|| BhError::ArgumentInvalid("N must be > 0".into()))?;
    let tree = Tree::build(particles, bounds, config)?;
    scheduler::evaluate_forces(particles, &tree, config)?;

    for i in 0..n {
        let acc_x = particles.fx[i] / particles.mass[i];
        let acc_y = particles.fy[i] / particles.mass[i];
        particles.vel_x[i] += 0.5 * dt * acc_x;
        particles.vel_y[i] += 0.5 * dt * acc_y;
        particles.acc_x[i] = acc_x;
        particles.acc_y[i] = acc_y;
    }

    Ok(())
}

/// Checks every particle against a caller-supplied fixed `region` (spec §7
/// `ParticleOutOfRegion`). Not called by [`step`] itself, since `step`
/// recomputes the bounding box every call and therefore never leaves its
/// own region; a driver that holds positions against a *fixed* simulation
/// volume across many steps calls this explicitly. `demote_to_warning`
/// implements the policy note in spec §7 ("may be demoted to warning if
/// box is recomputed each step").
pub fn check_region(particles: &ParticleSet, region: &BoundingBox, demote_to_warning: bool) -> BhResult<()> {
    for i in 0..particles.len() {
        let (x, y) = (particles.pos_x[i], particles.pos_y[i]);
        if x < region.x_min || x > region.x_max || y < region.y_min || y > region.y_max {
            if demote_to_warning {
                warn!("particle {i} left the declared region at ({x}, {y})");
                continue;
            }
            return Err(BhError::ParticleOutOfRegion { index: i, x, y });
        }
    }
    Ok(())
}
