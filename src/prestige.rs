//! Prestige: the meta-progression reset and what prestige points buy.

use tracing::info;

use crate::content;
use crate::error::{EntityKind, Rejection};
use crate::formulas;
use crate::state::{GameState, Millis, PrestigeState};

/// Prestige points the current run is worth.
pub fn candidate_points(state: &GameState) -> u64 {
    state.pending_prestige_points()
}

/// Check that prestiging now would raise the point balance. Returns the
/// new balance.
pub fn check_eligible(state: &GameState) -> Result<u64, Rejection> {
    let candidate = candidate_points(state);
    let current = state.prestige.points;
    if candidate <= current {
        return Err(Rejection::NotEligible { candidate, current });
    }
    Ok(candidate)
}

/// Build the post-prestige state from `old`.
///
/// Survives: config, achievements, prestige upgrades, specializations, the
/// season. The point balance becomes `points`, the reset count goes up by
/// one and the season's objectives start over. Everything else is fresh.
pub fn reset(old: GameState, points: u64, now: Millis) -> GameState {
    let mut fresh = GameState::with_config(now, old.config);
    fresh.achievements = old.achievements;

    let mut objectives = old.prestige.objectives;
    for o in &mut objectives {
        o.completed = false;
    }
    fresh.prestige = PrestigeState {
        points,
        multiplier: old.prestige.multiplier,
        reset_count: old.prestige.reset_count.saturating_add(1),
        upgrades: old.prestige.upgrades,
        objectives,
        specializations: old.prestige.specializations,
        season: old.prestige.season,
    };
    fresh.recompute_production();

    info!(
        points,
        reset_count = fresh.prestige.reset_count,
        "prestige reset"
    );
    fresh
}

/// Buy prestige upgrade `id` with prestige points.
pub fn purchase_upgrade(state: &mut GameState, id: &str) -> Result<(), Rejection> {
    let index = state
        .prestige
        .upgrades
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::PrestigeUpgrade,
            id: id.into(),
        })?;
    let upgrade = &state.prestige.upgrades[index];
    check_spend(
        EntityKind::PrestigeUpgrade,
        id,
        upgrade.unlocked,
        upgrade.purchased,
        upgrade.cost,
        state.prestige.points,
    )?;

    state.prestige.points -= upgrade.cost;
    state.prestige.upgrades[index].purchased = true;
    state.prestige.multiplier = formulas::compose_multipliers(
        state
            .prestige
            .upgrades
            .iter()
            .filter(|u| u.purchased)
            .map(|u| u.multiplier),
    );
    state.recompute_production();
    Ok(())
}

/// Buy specialization `id` with prestige points.
pub fn purchase_specialization(state: &mut GameState, id: &str) -> Result<(), Rejection> {
    let index = state
        .prestige
        .specializations
        .iter()
        .position(|s| s.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::Specialization,
            id: id.into(),
        })?;
    let spec = &state.prestige.specializations[index];
    check_spend(
        EntityKind::Specialization,
        id,
        spec.unlocked,
        spec.purchased,
        spec.cost,
        state.prestige.points,
    )?;

    state.prestige.points -= spec.cost;
    state.prestige.specializations[index].purchased = true;
    state.recompute_production();
    Ok(())
}

/// Switch to season `id`. Its objectives start uncompleted.
pub fn change_season(state: &mut GameState, id: &str) -> Result<(), Rejection> {
    if state.prestige.season.id == id {
        return Err(Rejection::SeasonActive(id.into()));
    }
    let (season, objectives) = content::season(id).ok_or_else(|| Rejection::UnknownEntity {
        kind: EntityKind::Season,
        id: id.into(),
    })?;
    info!(from = %state.prestige.season.id, to = %season.id, "season changed");
    state.prestige.season = season;
    state.prestige.objectives = objectives;
    state.recompute_production();
    Ok(())
}

fn check_spend(
    kind: EntityKind,
    id: &str,
    unlocked: bool,
    purchased: bool,
    cost: u64,
    available: u64,
) -> Result<(), Rejection> {
    if purchased {
        return Err(Rejection::AlreadyTaken {
            kind,
            id: id.into(),
        });
    }
    if !unlocked {
        return Err(Rejection::Locked {
            kind,
            id: id.into(),
        });
    }
    if available < cost {
        return Err(Rejection::InsufficientPoints {
            required: cost,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rich_state() -> GameState {
        let mut state = GameState::new(0);
        state.lifetime_earned = 4_000_000.0;
        state.balance = 123.0;
        state.clicks = 500;
        state.generators[0].count = 12;
        state.achievements[0].unlocked = true;
        state
    }

    #[test]
    fn not_eligible_without_gain() {
        let state = GameState::new(0);
        assert!(matches!(
            check_eligible(&state),
            Err(Rejection::NotEligible { candidate: 0, current: 0 })
        ));

        let mut state = rich_state();
        state.prestige.points = 2; // candidate is 2
        assert!(check_eligible(&state).is_err());
    }

    #[test]
    fn reset_keeps_meta_progress() {
        let mut state = rich_state();
        state.prestige.upgrades[0].purchased = true;
        state.prestige.multiplier = 1.1;
        state.prestige.objectives[0].completed = true;
        let points = check_eligible(&state).unwrap();
        assert_eq!(points, 3); // floor(sqrt(4)) + 1 objective

        let next = reset(state, points, 9_000);
        assert_eq!(next.prestige.points, 3);
        assert_eq!(next.prestige.reset_count, 1);
        assert!(next.prestige.upgrades[0].purchased);
        assert!((next.prestige.multiplier - 1.1).abs() < f64::EPSILON);
        assert!(next.achievements[0].unlocked);
        assert!(next.prestige.objectives.iter().all(|o| !o.completed));

        assert!(next.balance.abs() < f64::EPSILON);
        assert!(next.lifetime_earned.abs() < f64::EPSILON);
        assert_eq!(next.clicks, 0);
        assert_eq!(next.total_generators(), 0);
        assert_eq!(next.started_at, 9_000);
    }

    #[test]
    fn purchase_upgrade_spends_points_once() {
        let mut state = GameState::new(0);
        state.prestige.points = 3;
        state.prestige.upgrades[0].unlocked = true;
        purchase_upgrade(&mut state, "heavenly_ink").unwrap();
        assert_eq!(state.prestige.points, 2);
        assert!((state.prestige.multiplier - 1.1).abs() < 1e-9);
        assert!(matches!(
            purchase_upgrade(&mut state, "heavenly_ink"),
            Err(Rejection::AlreadyTaken { .. })
        ));
    }

    #[test]
    fn purchase_upgrade_rejections_leave_state() {
        let mut state = GameState::new(0);
        let before = state.clone();
        assert!(matches!(
            purchase_upgrade(&mut state, "heavenly_ink"),
            Err(Rejection::Locked { .. })
        ));
        state.prestige.upgrades[1].unlocked = true;
        let before_points = state.clone();
        assert!(matches!(
            purchase_upgrade(&mut state, "eternal_archive"),
            Err(Rejection::InsufficientPoints { required: 5, available: 0 })
        ));
        assert_eq!(state, before_points);
        assert!(purchase_upgrade(&mut state, "void").is_err());
        assert_eq!(state.prestige, {
            let mut p = before.prestige;
            p.upgrades[1].unlocked = true;
            p
        });
    }

    #[test]
    fn specialization_boosts_its_target() {
        let mut state = GameState::new(0);
        state.generators[1].count = 2;
        state.recompute_production();
        state.prestige.points = 2;
        state.prestige.specializations[1].unlocked = true;
        purchase_specialization(&mut state, "efficient_staff").unwrap();
        assert_eq!(state.prestige.points, 0);
        assert!((state.production_rate - 3.0).abs() < 1e-9);
        assert!((state.click_gain(1.0, 0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn change_season_swaps_objectives() {
        let mut state = GameState::new(0);
        state.generators[1].count = 10;
        state.recompute_production();
        state.prestige.objectives[0].completed = true;

        change_season(&mut state, "harvest").unwrap();
        assert_eq!(state.prestige.season.id, "harvest");
        assert!(state.prestige.objectives.iter().all(|o| !o.completed));
        assert!((state.production_rate - 12.0).abs() < 1e-9);

        assert!(matches!(
            change_season(&mut state, "harvest"),
            Err(Rejection::SeasonActive(_))
        ));
        assert!(matches!(
            change_season(&mut state, "monsoon"),
            Err(Rejection::UnknownEntity { kind: EntityKind::Season, .. })
        ));
    }
}
