//! Configuration and neighbor generators.

use crate::geometry::{is_valid, Configuration, Parameters, CIRCLE_COUNT};
use rand::Rng;
use std::f64::consts::TAU;

/// Attempts made by [`random_configuration`] before falling back.
pub const MAX_ATTEMPTS: usize = 1000;

/// Default neighbor move amount; offsets fall in `[-2.5, 2.5)`.
pub const DEFAULT_MOVE_AMOUNT: f64 = 5.0;

/// Draws a random valid configuration, or the triangle layout after
/// [`MAX_ATTEMPTS`] failures.
///
/// Each slot gets a uniform angle and a radial offset uniform in
/// `[0, R - r_i - margin]`. Sampling is uniform in radius, not in area, so
/// centers cluster toward the middle of the container.
pub fn random_configuration<R: Rng>(params: &Parameters, rng: &mut R) -> Configuration {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = sample_configuration(params, rng);
        if is_valid(&candidate, params) {
            return candidate;
        }
    }

    log::warn!(
        "no valid configuration after {} attempts (R={}, radii={:?}, margin={}), using triangle layout",
        MAX_ATTEMPTS,
        params.container_radius,
        params.radii,
        params.margin
    );
    triangle_configuration(params)
}

fn sample_configuration<R: Rng>(params: &Parameters, rng: &mut R) -> Configuration {
    let mut positions = [(0.0, 0.0); CIRCLE_COUNT];
    for (slot, position) in positions.iter_mut().enumerate() {
        let angle = rng.gen::<f64>() * TAU;
        let offset = rng.gen::<f64>() * params.max_offset(slot);
        *position = (offset * angle.cos(), offset * angle.sin());
    }
    Configuration::from_positions(params, positions)
}

/// Deterministic fallback layout.
///
/// Slot 0 sits on the negative y axis, slots 1 and 2 on either side of the
/// positive y axis. The spread shrinks when the radii are large relative to
/// the available space. The result is not guaranteed to be valid.
pub fn triangle_configuration(params: &Parameters) -> Configuration {
    let available = params.container_radius - params.margin;
    let scale = f64::min(1.0, available * 0.6 / params.total_radius());
    let spread = available * 0.3 * scale;
    let drop = available * 0.2 * scale;

    Configuration::from_positions(params, [(0.0, -spread), (-spread, drop), (spread, drop)])
}

/// Fixed layout used when the displayed circles are reset: slot 0 at
/// `(0, -30)`, slots 1 and 2 at `(-30, 20)` and `(30, 20)`.
///
/// Unlike [`triangle_configuration`] it does not scale with the container.
pub fn reset_configuration(params: &Parameters) -> Configuration {
    Configuration::from_positions(params, [(0.0, -30.0), (-30.0, 20.0), (30.0, 20.0)])
}

/// Returns a copy of `config` with one random circle moved.
///
/// The slot is chosen uniformly and its x and y each receive an independent
/// offset in `[-move_amount / 2, move_amount / 2)`.
pub fn perturb<R: Rng>(config: &Configuration, move_amount: f64, rng: &mut R) -> Configuration {
    let mut neighbor = *config;
    let slot = rng.gen_range(0..CIRCLE_COUNT);
    let dx = (rng.gen::<f64>() - 0.5) * move_amount;
    let dy = (rng.gen::<f64>() - 0.5) * move_amount;
    neighbor[slot] = neighbor[slot].translated(dx, dy);
    neighbor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_configuration_is_valid() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let config = random_configuration(&params, &mut rng);
            assert!(is_valid(&config, &params));
            for (slot, circle) in config.iter().enumerate() {
                assert_eq!(circle.r, params.radii[slot]);
            }
        }
    }

    #[test]
    fn test_random_configuration_is_reproducible() {
        let params = Parameters::default();
        let a = random_configuration(&params, &mut StdRng::seed_from_u64(7));
        let b = random_configuration(&params, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_infeasible_falls_back_to_triangle() {
        let params = Parameters::new(50.0, [40.0, 40.0, 40.0], 5.0);
        let mut rng = StdRng::seed_from_u64(1);
        let config = random_configuration(&params, &mut rng);
        assert_eq!(config, triangle_configuration(&params));
        assert!(!is_valid(&config, &params));
    }

    #[test]
    fn test_triangle_layout() {
        let params = Parameters::default();
        let config = triangle_configuration(&params);

        // available = 95, scale = min(1, 57 / 60) = 0.95
        let spread = 95.0 * 0.3 * 0.95;
        let drop = 95.0 * 0.2 * 0.95;
        assert!((config[0].y + spread).abs() < 1e-12);
        assert_eq!(config[0].x, 0.0);
        assert!((config[1].x + spread).abs() < 1e-12);
        assert!((config[2].x - spread).abs() < 1e-12);
        assert!((config[1].y - drop).abs() < 1e-12);
        assert_eq!(config[1].y, config[2].y);
    }

    #[test]
    fn test_triangle_scale_capped_at_one() {
        let params = Parameters::new(1000.0, [1.0, 1.0, 1.0], 0.0);
        let config = triangle_configuration(&params);
        assert!((config[2].x - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_layout_is_fixed() {
        let params = Parameters::new(300.0, [5.0, 6.0, 7.0], 1.0);
        let config = reset_configuration(&params);
        assert_eq!(config[0], crate::geometry::Circle::new(0.0, -30.0, 5.0));
        assert_eq!(config[1], crate::geometry::Circle::new(-30.0, 20.0, 6.0));
        assert_eq!(config[2], crate::geometry::Circle::new(30.0, 20.0, 7.0));
    }

    #[test]
    fn test_perturb_moves_exactly_one_circle() {
        let params = Parameters::default();
        let mut rng = StdRng::seed_from_u64(3);
        let original = random_configuration(&params, &mut rng);

        for _ in 0..200 {
            let neighbor = perturb(&original, DEFAULT_MOVE_AMOUNT, &mut rng);
            let moved: Vec<usize> = (0..CIRCLE_COUNT)
                .filter(|&slot| neighbor[slot] != original[slot])
                .collect();
            assert!(moved.len() <= 1);
            for slot in moved {
                assert!((neighbor[slot].x - original[slot].x).abs() <= 2.5);
                assert!((neighbor[slot].y - original[slot].y).abs() <= 2.5);
                assert_eq!(neighbor[slot].r, original[slot].r);
            }
        }
    }
}
