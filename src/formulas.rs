//! Formula library: pure numeric functions with no state beyond their arguments.

use crate::config::{COST_GROWTH, PRESTIGE_DIVISOR};
use crate::state::Generator;

/// Cost of the next unit when `owned` are already owned:
/// `floor(base × 1.15^owned)`, never below `base`.
pub fn purchase_cost(base_cost: f64, owned: u32) -> f64 {
    purchase_cost_with_growth(base_cost, owned, COST_GROWTH)
}

/// [`purchase_cost`] with an explicit growth factor.
pub fn purchase_cost_with_growth(base_cost: f64, owned: u32, growth: f64) -> f64 {
    let raw = base_cost * growth.powi(owned.min(i32::MAX as u32) as i32);
    raw.floor().max(base_cost)
}

/// Currency per second from `generators`: the sum of each generator's output,
/// scaled by the boost of every boost-bearing generator that has `count > 0`.
pub fn production_rate(generators: &[Generator]) -> f64 {
    let base: f64 = generators.iter().map(Generator::output).sum();
    let boost = compose_multipliers(
        generators
            .iter()
            .filter(|g| g.count > 0)
            .filter_map(|g| g.boost),
    );
    base * boost
}

/// `floor(sqrt(lifetime / 1_000_000)) + objective_rewards`, floored at 0.
pub fn prestige_points(lifetime: f64, objective_rewards: u64) -> u64 {
    prestige_points_with_divisor(lifetime, objective_rewards, PRESTIGE_DIVISOR)
}

/// [`prestige_points`] with an explicit divisor.
pub fn prestige_points_with_divisor(lifetime: f64, objective_rewards: u64, divisor: f64) -> u64 {
    let from_lifetime = if lifetime.is_finite() && lifetime > 0.0 && divisor > 0.0 {
        (lifetime / divisor).sqrt().floor() as u64
    } else {
        0
    };
    from_lifetime.saturating_add(objective_rewards)
}

/// Combo multiplier for a streak: `1 + (streak − 1) × step`, capped at
/// `max_multiplier`. A streak of 0 means no combo and yields 1.
pub fn combo_multiplier(streak: u32, max_multiplier: f64, step: f64) -> f64 {
    if streak == 0 {
        return 1.0;
    }
    let linear = 1.0 + (streak - 1) as f64 * step;
    linear.min(max_multiplier.max(1.0))
}

/// Product of all multipliers. Empty input yields 1.
pub fn compose_multipliers(multipliers: impl IntoIterator<Item = f64>) -> f64 {
    multipliers.into_iter().product()
}

/// The debug multiplier when the flag is set, otherwise 1.
pub fn debug_factor(debug: bool, debug_multiplier: f64) -> f64 {
    if debug {
        debug_multiplier
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_at_zero_is_base() {
        assert!((purchase_cost(10.0, 0) - 10.0).abs() < f64::EPSILON);
        assert!((purchase_cost(15.0, 0) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_is_floored() {
        // 15 × 1.15 = 17.25
        assert!((purchase_cost(15.0, 1) - 17.0).abs() < f64::EPSILON);
        // 100 × 1.15^10 = 404.55...
        assert!((purchase_cost(100.0, 10) - 404.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cost_never_below_fractional_base() {
        assert!(purchase_cost(2.5, 0) >= 2.5);
    }

    #[test]
    fn production_sums_outputs() {
        let mut a = Generator::new("a", "A", "", 10.0, 0.5);
        a.count = 4;
        let mut b = Generator::new("b", "B", "", 10.0, 2.0);
        b.count = 3;
        assert!((production_rate(&[a, b]) - 8.0).abs() < 0.001);
    }

    #[test]
    fn boosts_compound_only_when_owned() {
        let mut a = Generator::new("a", "A", "", 10.0, 1.0);
        a.count = 10;
        let b = Generator::new("b", "B", "", 10.0, 0.0).with_boost(2.0);
        let mut c = Generator::new("c", "C", "", 10.0, 0.0).with_boost(1.5);
        c.count = 1;
        // b unowned: no boost. c owned: ×1.5.
        assert!((production_rate(&[a.clone(), b.clone(), c.clone()]) - 15.0).abs() < 0.001);
        let mut b = b;
        b.count = 1;
        assert!((production_rate(&[a, b, c]) - 30.0).abs() < 0.001);
    }

    #[test]
    fn prestige_points_from_billion() {
        // sqrt(1000) = 31.6
        assert_eq!(prestige_points(1_000_000_000.0, 0), 31);
        assert_eq!(prestige_points(1_000_000_000.0, 5), 36);
    }

    #[test]
    fn prestige_points_floor_at_zero() {
        assert_eq!(prestige_points(0.0, 0), 0);
        assert_eq!(prestige_points(-50.0, 0), 0);
        assert_eq!(prestige_points(f64::NAN, 2), 2);
        assert_eq!(prestige_points(999_999.0, 0), 0);
    }

    #[test]
    fn combo_multiplier_shape() {
        assert!((combo_multiplier(0, 3.0, 0.1) - 1.0).abs() < f64::EPSILON);
        assert!((combo_multiplier(1, 3.0, 0.1) - 1.0).abs() < f64::EPSILON);
        assert!((combo_multiplier(2, 3.0, 0.1) - 1.1).abs() < 1e-9);
        assert!((combo_multiplier(1_000, 3.0, 0.1) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compose_empty_is_one() {
        assert!((compose_multipliers(std::iter::empty()) - 1.0).abs() < f64::EPSILON);
        assert!((compose_multipliers([2.0, 1.5]) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn debug_factor_only_when_set() {
        assert!((debug_factor(false, 1000.0) - 1.0).abs() < f64::EPSILON);
        assert!((debug_factor(true, 1000.0) - 1000.0).abs() < f64::EPSILON);
    }
}
