use bh2d::force::pairwise_force;
use bh2d::{compute_forces, ParticleSet, SimConfig};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, UnitDisc};

fn brute_force(particles: &ParticleSet, g: f64) -> Vec<(f64, f64)> {
    let n = particles.len();
    let mut out = vec![(0.0, 0.0); n];
    for i in 0..n {
        let mut fx = 0.0;
        let mut fy = 0.0;
        for j in 0..n {
            if j == i {
                continue;
            }
            let dx = particles.pos_x[j] - particles.pos_x[i];
            let dy = particles.pos_y[j] - particles.pos_y[i];
            let (dfx, dfy) = pairwise_force(g, particles.mass[i], particles.mass[j], dx, dy);
            fx += dfx;
            fy += dfy;
        }
        out[i] = (fx, fy);
    }
    out
}

fn uniform_disk(n: usize, seed: u64) -> ParticleSet {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut pos_x = Vec::with_capacity(n);
    let mut pos_y = Vec::with_capacity(n);
    for _ in 0..n {
        let [x, y]: [f64; 2] = UnitDisc.sample(&mut rng);
        pos_x.push(x * 10.0);
        pos_y.push(y * 10.0);
    }
    let mass: Vec<f64> = (0..n).map(|_| rng.gen_range(0.5..2.0)).collect();
    ParticleSet::new(pos_x, pos_y, mass, vec![0.0; n], vec![0.0; n])
}

// Scenario 1: two-body circular orbit, energy drift over 1000 steps.
#[test]
fn two_body_circular_orbit_energy_drift() {
    let g = 50.0;
    let r = 1.0;
    let v = (g * 1.0 / (4.0 * r)).sqrt();
    let mut particles = ParticleSet::new(vec![-0.5 * r, 0.5 * r], vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0], vec![-v, v]);
    let mut config = SimConfig::default();
    config.theta = 0.0;
    let dt = 1e-3;

    let energy = |p: &ParticleSet| -> f64 {
        let kinetic: f64 = (0..p.len()).map(|i| 0.5 * p.mass[i] * (p.vel_x[i].powi(2) + p.vel_y[i].powi(2))).sum();
        let dx = p.pos_x[1] - p.pos_x[0];
        let dy = p.pos_y[1] - p.pos_y[0];
        let potential = -g * p.mass[0] * p.mass[1] / (dx * dx + dy * dy).sqrt();
        kinetic + potential
    };

    let e0 = energy(&particles);
    for _ in 0..1000 {
        bh2d::integrate::step(&mut particles, &config, dt).unwrap();
    }
    let e1 = energy(&particles);
    let drift = ((e1 - e0) / e0).abs();
    assert!(drift < 1e-3, "energy drift {drift} exceeded tolerance over 1000 steps");
}

// Scenario 2: three-body collinear, force on center particle.
#[test]
fn three_body_collinear_center_force_is_zero() {
    let mut particles = ParticleSet::new(vec![-1.0, 0.0, 1.0], vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0], vec![0.0; 3], vec![0.0; 3]);

    let mut config_exact = SimConfig::default();
    config_exact.theta = 0.0;
    compute_forces(&mut particles, &config_exact).unwrap();
    assert!(particles.fx[1].abs() < 1e-12, "theta=0 center fx = {}", particles.fx[1]);
    assert!(particles.fy[1].abs() < 1e-12, "theta=0 center fy = {}", particles.fy[1]);

    let mut config_approx = SimConfig::default();
    config_approx.theta = 0.5;
    compute_forces(&mut particles, &config_approx).unwrap();
    assert!(particles.fx[1].abs() < 1e-4, "theta=0.5 center fx = {}", particles.fx[1]);
    assert!(particles.fy[1].abs() < 1e-4, "theta=0.5 center fy = {}", particles.fy[1]);
}

// Scenario 3: uniform disk, N=1000, theta=0 matches brute-force exactly.
#[test]
fn uniform_disk_theta_zero_matches_brute_force() {
    let n = 1000;
    let mut particles = uniform_disk(n, 42);
    let g = SimConfig::gravitational_constant(n);
    let expected = brute_force(&particles, g);

    let mut config = SimConfig::default();
    config.theta = 0.0;
    compute_forces(&mut particles, &config).unwrap();

    for i in 0..n {
        assert!((particles.fx[i] - expected[i].0).abs() < 1e-9, "particle {i} fx mismatch");
        assert!((particles.fy[i] - expected[i].1).abs() < 1e-9, "particle {i} fy mismatch");
    }
}

// Scenario 4: uniform disk, N=1000, theta=0.5, bounded relative error.
#[test]
fn uniform_disk_theta_half_bounded_relative_error() {
    let n = 1000;
    let mut particles = uniform_disk(n, 7);
    let g = SimConfig::gravitational_constant(n);
    let expected = brute_force(&particles, g);

    let mut config = SimConfig::default();
    config.theta = 0.5;
    compute_forces(&mut particles, &config).unwrap();

    let mut relative_errors: Vec<f64> = (0..n)
        .map(|i| {
            let exact = (expected[i].0.powi(2) + expected[i].1.powi(2)).sqrt();
            let got = (particles.fx[i].powi(2) + particles.fy[i].powi(2)).sqrt();
            (got - exact).abs() / exact.max(1e-12)
        })
        .collect();
    relative_errors.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let median = relative_errors[n / 2];
    let p99 = relative_errors[(n * 99) / 100];
    assert!(median < 0.02, "median relative error {median} exceeded 2%");
    assert!(p99 < 0.10, "p99 relative error {p99} exceeded 10%");
}

// Boundary: N=2, exactly coincident. Force on each particle is exactly
// zero: the merged leaf's center of mass coincides with both particles'
// own positions, so the offset vector -- and hence the force -- is zero,
// regardless of which particle's index the merged leaf retains as `pid`.
#[test]
fn two_coincident_particles_feel_exactly_zero_force() {
    let mut particles = ParticleSet::new(vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 2.0], vec![0.0; 2], vec![0.0; 2]);
    let config = SimConfig::default();
    compute_forces(&mut particles, &config).unwrap();

    assert_eq!(particles.fx[0], 0.0);
    assert_eq!(particles.fy[0], 0.0);
    assert_eq!(particles.fx[1], 0.0);
    assert_eq!(particles.fy[1], 0.0);
}

// Boundary: theta very large. Every node is accepted at the root, so each
// particle's force equals the force of the whole system's mass and center
// of mass acting on it directly.
#[test]
fn huge_theta_reduces_to_whole_system_center_of_mass() {
    let n = 30;
    let mut particles = uniform_disk(n, 13);
    let g = SimConfig::gravitational_constant(n);

    let total_mass: f64 = particles.mass.iter().sum();
    let cm_x: f64 = (0..n).map(|i| particles.mass[i] * particles.pos_x[i]).sum::<f64>() / total_mass;
    let cm_y: f64 = (0..n).map(|i| particles.mass[i] * particles.pos_y[i]).sum::<f64>() / total_mass;

    let mut config = SimConfig::default();
    config.theta = 1.0e6;
    compute_forces(&mut particles, &config).unwrap();

    for i in 0..n {
        let dx = cm_x - particles.pos_x[i];
        let dy = cm_y - particles.pos_y[i];
        let (expected_fx, expected_fy) = pairwise_force(g, particles.mass[i], total_mass, dx, dy);
        assert!((particles.fx[i] - expected_fx).abs() < 1e-9, "particle {i} fx mismatch");
        assert!((particles.fy[i] - expected_fy).abs() < 1e-9, "particle {i} fy mismatch");
    }
}

// Scenario 5: determinism across thread counts at N=50,000. Expensive, so
// excluded from the default test run (spec §8 expansion note).
#[test]
#[ignore]
fn determinism_across_thread_counts_at_scale() {
    let n = 50_000;
    let particles = uniform_disk(n, 99);

    let mut reference = None;
    for &threads in &[1usize, 2, 4, 8, 16] {
        let mut p = particles.clone();
        let mut config = SimConfig::default();
        config.threads = Some(threads);
        compute_forces(&mut p, &config).unwrap();

        match &reference {
            None => reference = Some((p.fx.clone(), p.fy.clone())),
            Some((fx, fy)) => {
                assert_eq!(&p.fx, fx, "fx diverged at {threads} threads (I6)");
                assert_eq!(&p.fy, fy, "fy diverged at {threads} threads (I6)");
            }
        }
    }
}

// Scenario 6: coincident pair merges without faulting; force is finite.
#[test]
fn coincident_pair_produces_finite_force() {
    let mut particles = ParticleSet::new(
        vec![0.0, 0.0, 5.0, -5.0],
        vec![0.0, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 2.0, 2.0],
        vec![0.0; 4],
        vec![0.0; 4],
    );
    let config = SimConfig::default();
    compute_forces(&mut particles, &config).unwrap();

    for i in 0..2 {
        assert!(particles.fx[i].is_finite());
        assert!(particles.fy[i].is_finite());
    }
    // The merged pair is pulled toward the other two masses, net force along -x.
    assert!(particles.fx[0] < 0.0);
    assert!(particles.fx[1] < 0.0);
}
