//! The transition function.
//!
//! [`reduce`] is the only way to change a [`GameState`]. Every handler
//! checks its preconditions before writing anything, so a rejected action
//! returns the state exactly as it came in. Every accepted mutation is
//! followed by an evaluator pass on the candidate state.

use tracing::{debug, info, trace};

use crate::combo;
use crate::content;
use crate::error::{EntityKind, Rejection};
use crate::evaluator::{self, Unlock};
use crate::formulas;
use crate::powers;
use crate::prestige;
use crate::save::Snapshot;
use crate::state::{GameState, Millis, Reward, UpgradeEffect};

/// Everything that can happen to the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// The player's manual action (a click).
    PrimaryAction { now: Millis },
    PurchaseGenerator { id: String },
    PurchaseUpgrade { id: String },
    /// Driven by an external timer. Credits production since the last update.
    PeriodicUpdate { now: Millis },
    Prestige { now: Millis },
    PurchasePrestigeUpgrade { id: String },
    PurchaseSpecialization { id: String },
    CompleteMiniGame { id: String },
    ActivateTimedPower { id: String, now: Millis },
    ChangeSeason { id: String },
    /// Replace the whole state with a restored snapshot.
    Load(Box<Snapshot>),
    /// Discard all progress, prestige included.
    Reset { now: Millis },
    ToggleDebug,
    /// Record that the caller persisted a snapshot at `now`.
    MarkSaved { now: Millis },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::PrimaryAction { .. } => "primary_action",
            Action::PurchaseGenerator { .. } => "purchase_generator",
            Action::PurchaseUpgrade { .. } => "purchase_upgrade",
            Action::PeriodicUpdate { .. } => "periodic_update",
            Action::Prestige { .. } => "prestige",
            Action::PurchasePrestigeUpgrade { .. } => "purchase_prestige_upgrade",
            Action::PurchaseSpecialization { .. } => "purchase_specialization",
            Action::CompleteMiniGame { .. } => "complete_mini_game",
            Action::ActivateTimedPower { .. } => "activate_timed_power",
            Action::ChangeSeason { .. } => "change_season",
            Action::Load(_) => "load",
            Action::Reset { .. } => "reset",
            Action::ToggleDebug => "toggle_debug",
            Action::MarkSaved { .. } => "mark_saved",
        }
    }
}

/// Result of one [`reduce`] call.
#[derive(Debug)]
pub struct Transition {
    pub state: GameState,
    /// `Err` means the action was a no-op and `state` is unchanged.
    pub outcome: Result<(), Rejection>,
    /// Entities that became unlocked during this transition, in order.
    pub unlocked: Vec<Unlock>,
}

impl Transition {
    pub fn applied(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Ids of achievements unlocked by this transition.
    pub fn achievements(&self) -> impl Iterator<Item = &str> {
        self.unlocked
            .iter()
            .filter(|u| u.kind == EntityKind::Achievement)
            .map(|u| u.id.as_str())
    }
}

/// Apply `action` to `state`.
pub fn reduce(mut state: GameState, action: Action) -> Transition {
    match apply(&mut state, action) {
        Ok(unlocked) => Transition {
            state,
            outcome: Ok(()),
            unlocked,
        },
        Err(rejection) => Transition {
            state,
            outcome: Err(rejection),
            unlocked: Vec::new(),
        },
    }
}

/// In-place form of [`reduce`] for drivers that own their state.
pub(crate) fn apply(state: &mut GameState, action: Action) -> Result<Vec<Unlock>, Rejection> {
    let name = action.name();
    let result = match action {
        Action::PrimaryAction { now } => primary_action(state, now),
        Action::PurchaseGenerator { id } => purchase_generator(state, &id),
        Action::PurchaseUpgrade { id } => purchase_upgrade(state, &id),
        Action::PeriodicUpdate { now } => periodic_update(state, now),
        Action::Prestige { now } => perform_prestige(state, now),
        Action::PurchasePrestigeUpgrade { id } => {
            prestige::purchase_upgrade(state, &id).map(|()| evaluator::evaluate(state))
        }
        Action::PurchaseSpecialization { id } => {
            prestige::purchase_specialization(state, &id).map(|()| evaluator::evaluate(state))
        }
        Action::CompleteMiniGame { id } => complete_mini_game(state, &id),
        Action::ActivateTimedPower { id, now } => activate_power(state, &id, now),
        Action::ChangeSeason { id } => {
            prestige::change_season(state, &id).map(|()| evaluator::evaluate(state))
        }
        Action::Load(snapshot) => load(state, &snapshot),
        Action::Reset { now } => {
            *state = GameState::with_config(now, state.config.clone());
            info!(now, "progress reset");
            Ok(Vec::new())
        }
        Action::ToggleDebug => {
            state.debug = !state.debug;
            info!(debug = state.debug, "debug mode toggled");
            Ok(Vec::new())
        }
        Action::MarkSaved { now } => {
            state.last_saved = now;
            Ok(Vec::new())
        }
    };
    if let Err(rejection) = &result {
        debug!(action = name, reason = %rejection, "action rejected");
    }
    result
}

fn primary_action(state: &mut GameState, now: Millis) -> Result<Vec<Unlock>, Rejection> {
    combo::register_action(&mut state.combo, now);
    let gain = state.click_gain(state.combo.current_multiplier(), now);
    state.balance += gain;
    state.lifetime_earned += gain;
    state.clicks = state.clicks.saturating_add(1);
    Ok(evaluator::evaluate(state))
}

fn purchase_generator(state: &mut GameState, id: &str) -> Result<Vec<Unlock>, Rejection> {
    let index = state
        .generators
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::Generator,
            id: id.into(),
        })?;
    let generator = &state.generators[index];
    if !generator.unlocked {
        return Err(Rejection::Locked {
            kind: EntityKind::Generator,
            id: id.into(),
        });
    }
    let cost = generator.cost(state.config.cost_growth);
    if state.balance < cost {
        return Err(Rejection::InsufficientFunds {
            required: cost,
            available: state.balance,
        });
    }

    state.balance -= cost;
    let generator = &mut state.generators[index];
    generator.count += 1;
    let mut unlocked = if generator.count == 1 {
        evaluator::on_first_purchase(state, index)
    } else {
        Vec::new()
    };
    state.recompute_production();
    unlocked.extend(evaluator::evaluate(state));
    Ok(unlocked)
}

fn purchase_upgrade(state: &mut GameState, id: &str) -> Result<Vec<Unlock>, Rejection> {
    let index = state
        .upgrades
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::Upgrade,
            id: id.into(),
        })?;
    let upgrade = &state.upgrades[index];
    if upgrade.purchased {
        return Err(Rejection::AlreadyTaken {
            kind: EntityKind::Upgrade,
            id: id.into(),
        });
    }
    if !upgrade.unlocked {
        return Err(Rejection::Locked {
            kind: EntityKind::Upgrade,
            id: id.into(),
        });
    }
    if state.balance < upgrade.cost {
        return Err(Rejection::InsufficientFunds {
            required: upgrade.cost,
            available: state.balance,
        });
    }

    state.balance -= upgrade.cost;
    state.upgrades[index].purchased = true;
    let effect = state.upgrades[index].effect.clone();
    apply_upgrade_effect(state, &effect);
    state.recompute_production();
    Ok(evaluator::evaluate(state))
}

fn apply_upgrade_effect(state: &mut GameState, effect: &UpgradeEffect) {
    match effect {
        UpgradeEffect::ClickPower(amount) => state.entries_per_click += amount,
        UpgradeEffect::ClickMultiplier(m) => state.click_multiplier *= m,
        UpgradeEffect::GeneratorMultiplier {
            generator,
            multiplier,
        } => {
            if let Some(g) = state.generators.iter_mut().find(|g| &g.id == generator) {
                g.multiplier *= multiplier;
            }
        }
        UpgradeEffect::ProductionMultiplier(m) => state.production_multiplier *= m,
        UpgradeEffect::Scripted(id) => match content::scripted_effect(id) {
            Some(f) => f(state),
            None => debug!(script = %id, "unknown scripted effect ignored"),
        },
    }
}

fn periodic_update(state: &mut GameState, now: Millis) -> Result<Vec<Unlock>, Rejection> {
    credit_production(state, now);
    powers::expire(state, now);
    combo::decay(&mut state.combo, now);
    Ok(evaluator::evaluate(state))
}

/// Credit production from `last_update` up to `now` at the rates in force
/// over that span. Earlier timestamps credit nothing.
fn credit_production(state: &mut GameState, now: Millis) {
    let from = state.last_update;
    if now <= from {
        return;
    }
    let produced = powers::produce_until(state, from, now)
        * formulas::debug_factor(state.debug, state.config.debug_multiplier);
    state.balance += produced;
    state.lifetime_earned += produced;
    state.last_update = now;
    trace!(elapsed_ms = now - from, produced, "production credited");
}

fn perform_prestige(state: &mut GameState, now: Millis) -> Result<Vec<Unlock>, Rejection> {
    let points = prestige::check_eligible(state)?;
    let placeholder = GameState::with_config(now, state.config.clone());
    let old = std::mem::replace(state, placeholder);
    *state = prestige::reset(old, points, now);
    Ok(evaluator::evaluate(state))
}

fn activate_power(state: &mut GameState, id: &str, now: Millis) -> Result<Vec<Unlock>, Rejection> {
    let index = powers::check_activation(state, id, now)?;
    // The boost starts at `now`; time before it is paid at the old rate.
    credit_production(state, now);
    powers::activate(state, index, now);
    info!(power = id, now, "timed power activated");
    Ok(evaluator::evaluate(state))
}

fn complete_mini_game(state: &mut GameState, id: &str) -> Result<Vec<Unlock>, Rejection> {
    let index = state
        .mini_games
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::MiniGame,
            id: id.into(),
        })?;
    let game = &state.mini_games[index];
    if game.completed {
        return Err(Rejection::AlreadyTaken {
            kind: EntityKind::MiniGame,
            id: id.into(),
        });
    }
    if !game.unlocked {
        return Err(Rejection::Locked {
            kind: EntityKind::MiniGame,
            id: id.into(),
        });
    }

    let reward = game.reward.clone();
    state.mini_games[index].completed = true;
    match reward {
        Reward::Currency(amount) => {
            state.balance += amount;
            state.lifetime_earned += amount;
        }
        Reward::ClickMultiplier(m) => state.click_multiplier *= m,
        Reward::PrestigePoints(n) => {
            state.prestige.points = state.prestige.points.saturating_add(n)
        }
    }
    Ok(evaluator::evaluate(state))
}

fn load(state: &mut GameState, snapshot: &Snapshot) -> Result<Vec<Unlock>, Rejection> {
    *state = snapshot.restore(state.config.clone())?;
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unlock_of(t: &Transition, kind: EntityKind) -> Vec<&str> {
        t.unlocked
            .iter()
            .filter(|u| u.kind == kind)
            .map(|u| u.id.as_str())
            .collect()
    }

    #[test]
    fn first_click_gains_base_amount() {
        let t = reduce(GameState::new(0), Action::PrimaryAction { now: 100 });
        assert!(t.applied());
        assert!((t.state.balance - 1.0).abs() < f64::EPSILON);
        assert!((t.state.lifetime_earned - 1.0).abs() < f64::EPSILON);
        assert_eq!(t.state.clicks, 1);
        assert_eq!(t.achievements().collect::<Vec<_>>(), vec!["first_entry"]);
    }

    #[test]
    fn rapid_clicks_build_combo() {
        let mut state = GameState::new(0);
        for i in 0..3 {
            state = reduce(state, Action::PrimaryAction { now: 100 * i }).state;
        }
        // 1.0 + 1.1 + 1.2
        assert!((state.balance - 3.3).abs() < 1e-9);
        assert_eq!(state.combo.streak, 3);
    }

    #[test]
    fn purchase_generator_spends_and_unlocks_next() {
        let mut state = GameState::new(0);
        state.balance = 20.0;
        let t = reduce(state, Action::PurchaseGenerator { id: "scribe".into() });
        assert!(t.applied());
        assert!((t.state.balance - 5.0).abs() < f64::EPSILON);
        assert_eq!(t.state.generators[0].count, 1);
        assert!(t.state.generators[1].unlocked);
        assert_eq!(unlock_of(&t, EntityKind::Generator), vec!["archivist"]);
        assert!((t.state.production_rate - 0.1).abs() < 1e-9);
    }

    #[test]
    fn unaffordable_purchase_is_a_noop() {
        let mut state = GameState::new(0);
        state.balance = 14.0;
        let before = state.clone();
        let t = reduce(state, Action::PurchaseGenerator { id: "scribe".into() });
        assert!(matches!(
            t.outcome,
            Err(Rejection::InsufficientFunds { .. })
        ));
        assert_eq!(t.state, before);
        assert!(t.unlocked.is_empty());
    }

    #[test]
    fn locked_and_unknown_generators_are_rejected() {
        let mut state = GameState::new(0);
        state.balance = 1e9;
        let t = reduce(state, Action::PurchaseGenerator { id: "press".into() });
        assert!(matches!(t.outcome, Err(Rejection::Locked { .. })));
        let t = reduce(t.state, Action::PurchaseGenerator { id: "golem".into() });
        assert!(matches!(t.outcome, Err(Rejection::UnknownEntity { .. })));
    }

    #[test]
    fn upgrade_applies_once() {
        let mut state = GameState::new(0);
        state.balance = 250.0;
        let t = reduce(state, Action::PurchaseUpgrade { id: "sharper_quill".into() });
        assert!(t.applied());
        assert!((t.state.entries_per_click - 2.0).abs() < f64::EPSILON);
        assert!((t.state.balance - 150.0).abs() < f64::EPSILON);

        let t = reduce(t.state, Action::PurchaseUpgrade { id: "sharper_quill".into() });
        assert!(matches!(t.outcome, Err(Rejection::AlreadyTaken { .. })));
        assert!((t.state.entries_per_click - 2.0).abs() < f64::EPSILON);
        assert!((t.state.balance - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scripted_upgrade_effect_runs() {
        let mut state = GameState::new(0);
        state.balance = 1e7;
        state.generators[0].count = 10;
        state.upgrades.iter_mut().for_each(|u| u.unlocked = true);
        let t = reduce(state, Action::PurchaseUpgrade { id: "collective_memory".into() });
        assert!(t.applied());
        assert!((t.state.entries_per_click - 2.0).abs() < 1e-9);
    }

    #[test]
    fn periodic_update_credits_production() {
        let mut state = GameState::new(0);
        state.generators[1].count = 2;
        state.recompute_production();
        let t = reduce(state, Action::PeriodicUpdate { now: 1_500 });
        assert!((t.state.balance - 3.0).abs() < 1e-9);
        assert!((t.state.lifetime_earned - 3.0).abs() < 1e-9);
        assert_eq!(t.state.last_update, 1_500);
    }

    #[test]
    fn backwards_timestamp_produces_nothing() {
        let mut state = GameState::new(10_000);
        state.generators[1].count = 2;
        state.recompute_production();
        let t = reduce(state, Action::PeriodicUpdate { now: 5_000 });
        assert!(t.applied());
        assert!(t.state.balance.abs() < f64::EPSILON);
        assert_eq!(t.state.last_update, 10_000);
    }

    #[test]
    fn debug_scales_production_not_rate() {
        let mut state = GameState::new(0);
        state.generators[1].count = 1;
        state.recompute_production();
        let t = reduce(state, Action::ToggleDebug);
        assert!(t.state.debug);
        assert!((t.state.production_rate - 1.0).abs() < 1e-9);
        let t = reduce(t.state, Action::PeriodicUpdate { now: 1_000 });
        assert!((t.state.balance - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn activation_after_idle_gap_pays_the_gap_unboosted() {
        let mut state = GameState::new(0);
        state.generators[1].count = 3;
        state.powers.iter_mut().for_each(|p| p.unlocked = true);
        state.recompute_production();

        let t = reduce(
            state,
            Action::ActivateTimedPower {
                id: "overtime".into(),
                now: 3_600_000,
            },
        );
        assert!(t.applied());
        assert!((t.state.lifetime_earned - 3.0 * 3_600.0).abs() < 1e-6);
        assert_eq!(t.state.last_update, 3_600_000);

        let t = reduce(t.state, Action::PeriodicUpdate { now: 3_600_000 });
        assert!((t.state.lifetime_earned - 3.0 * 3_600.0).abs() < 1e-6);

        // 30s at 3x, then 10s plain.
        let t = reduce(t.state, Action::PeriodicUpdate { now: 3_640_000 });
        let expected = 3.0 * 3_600.0 + 9.0 * 30.0 + 3.0 * 10.0;
        assert!((t.state.lifetime_earned - expected).abs() < 1e-6);
    }

    #[test]
    fn click_after_power_expiry_is_unboosted() {
        let mut state = GameState::new(0);
        state.powers.iter_mut().for_each(|p| p.unlocked = true);
        let state = reduce(
            state,
            Action::ActivateTimedPower {
                id: "inspiration".into(),
                now: 0,
            },
        )
        .state;

        let boosted = reduce(state.clone(), Action::PrimaryAction { now: 5_000 });
        assert!((boosted.state.balance - 7.0).abs() < 1e-9);

        let late = reduce(state, Action::PrimaryAction { now: 50_000 });
        assert!((late.state.balance - 1.0).abs() < 1e-9);
    }

    #[test]
    fn periodic_update_decays_combo() {
        let state = reduce(GameState::new(0), Action::PrimaryAction { now: 0 }).state;
        assert!(state.combo.active);
        let t = reduce(state, Action::PeriodicUpdate { now: 5_000 });
        assert!(!t.state.combo.active);
        assert!((t.state.combo.current_multiplier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prestige_requires_gain() {
        let t = reduce(GameState::new(0), Action::Prestige { now: 10 });
        assert!(matches!(t.outcome, Err(Rejection::NotEligible { .. })));
    }

    #[test]
    fn prestige_unlocks_reborn() {
        let mut state = GameState::new(0);
        state.lifetime_earned = 1_000_000.0;
        let t = reduce(state, Action::Prestige { now: 20 });
        assert!(t.applied());
        assert_eq!(t.state.prestige.points, 1);
        assert_eq!(t.state.prestige.reset_count, 1);
        assert!(t.achievements().any(|id| id == "reborn"));
        assert!(t.state.is_feature_unlocked("prestige_shop"));
    }

    #[test]
    fn mini_game_rewards_once() {
        let mut state = GameState::new(0);
        state.mini_games[0].unlocked = true;
        let t = reduce(state, Action::CompleteMiniGame { id: "speed_typing".into() });
        assert!((t.state.balance - 500.0).abs() < f64::EPSILON);
        assert!((t.state.lifetime_earned - 500.0).abs() < f64::EPSILON);
        let t = reduce(t.state, Action::CompleteMiniGame { id: "speed_typing".into() });
        assert!(matches!(t.outcome, Err(Rejection::AlreadyTaken { .. })));
        assert!((t.state.balance - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mini_game_prestige_reward() {
        let mut state = GameState::new(0);
        state.mini_games[2].unlocked = true;
        let t = reduce(state, Action::CompleteMiniGame { id: "lore_quiz".into() });
        assert_eq!(t.state.prestige.points, 1);
    }

    #[test]
    fn reset_discards_prestige() {
        let mut state = GameState::new(0);
        state.prestige.points = 9;
        state.balance = 10.0;
        state.config.debug_multiplier = 10.0;
        let t = reduce(state, Action::Reset { now: 77 });
        assert_eq!(t.state.prestige.points, 0);
        assert_eq!(t.state.started_at, 77);
        assert!((t.state.config.debug_multiplier - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_rejects_bad_snapshot_and_keeps_state() {
        let mut state = GameState::new(0);
        state.balance = 42.0;
        let mut snapshot = Snapshot::capture(&GameState::new(0));
        snapshot.version = 0;
        let before = state.clone();
        let t = reduce(state, Action::Load(Box::new(snapshot)));
        assert!(matches!(t.outcome, Err(Rejection::InvalidSnapshot(_))));
        assert_eq!(t.state, before);
    }

    #[test]
    fn load_replaces_state() {
        let mut saved = GameState::new(0);
        saved.balance = 99.0;
        let snapshot = Snapshot::capture(&saved);
        let t = reduce(GameState::new(5), Action::Load(Box::new(snapshot)));
        assert!(t.applied());
        assert!((t.state.balance - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mark_saved_records_time() {
        let t = reduce(GameState::new(0), Action::MarkSaved { now: 123 });
        assert_eq!(t.state.last_saved, 123);
    }
}
