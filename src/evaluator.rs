//! Unlock/achievement evaluator.
//!
//! Promotes locked entities whose condition holds on the candidate state.
//! Never locks anything. Runs in two phases: achievements and objectives
//! first, then everything gated on a requirement, so an entity gated on an
//! achievement unlocks in the same transition as the achievement itself.
//! Within a phase every condition is read before any flag is written.

use serde::{Deserialize, Serialize};

use crate::error::EntityKind;
use crate::state::{Condition, GameState};

/// An entity that flipped from locked to unlocked (or an objective that
/// completed) during a transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub kind: EntityKind,
    pub id: String,
}

impl Unlock {
    pub fn new(kind: EntityKind, id: &str) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Promote everything whose condition holds. Returns what changed.
pub fn evaluate(state: &mut GameState) -> Vec<Unlock> {
    let mut unlocked = Vec::new();

    // Phase 1: achievements and objectives.
    let view: &GameState = state;
    let achievements: Vec<usize> = view
        .achievements
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.unlocked && a.condition.holds(view))
        .map(|(i, _)| i)
        .collect();
    let objectives: Vec<usize> = view
        .prestige
        .objectives
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.completed && o.condition.holds(view))
        .map(|(i, _)| i)
        .collect();
    for i in achievements {
        let a = &mut state.achievements[i];
        a.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::Achievement, &a.id));
    }
    for i in objectives {
        let o = &mut state.prestige.objectives[i];
        o.completed = true;
        unlocked.push(Unlock::new(EntityKind::Objective, &o.id));
    }

    // Phase 2: requirement-gated entities.
    let view: &GameState = state;
    let gated = |unlocked: bool, requirement: &Option<Condition>| {
        !unlocked && requirement.as_ref().is_some_and(|c| c.holds(view))
    };
    let features = indices(view.features.iter().map(|f| gated(f.unlocked, &f.requirement)));
    let upgrades = indices(view.upgrades.iter().map(|u| gated(u.unlocked, &u.requirement)));
    let mini_games = indices(view.mini_games.iter().map(|m| gated(m.unlocked, &m.requirement)));
    let powers = indices(view.powers.iter().map(|p| gated(p.unlocked, &p.requirement)));
    let prestige_upgrades = indices(
        view.prestige
            .upgrades
            .iter()
            .map(|p| gated(p.unlocked, &p.requirement)),
    );
    let specializations = indices(
        view.prestige
            .specializations
            .iter()
            .map(|s| gated(s.unlocked, &s.requirement)),
    );
    for i in features {
        let f = &mut state.features[i];
        f.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::Feature, &f.id));
    }
    for i in upgrades {
        let u = &mut state.upgrades[i];
        u.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::Upgrade, &u.id));
    }
    for i in mini_games {
        let m = &mut state.mini_games[i];
        m.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::MiniGame, &m.id));
    }
    for i in powers {
        let p = &mut state.powers[i];
        p.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::Power, &p.id));
    }
    for i in prestige_upgrades {
        let p = &mut state.prestige.upgrades[i];
        p.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::PrestigeUpgrade, &p.id));
    }
    for i in specializations {
        let s = &mut state.prestige.specializations[i];
        s.unlocked = true;
        unlocked.push(Unlock::new(EntityKind::Specialization, &s.id));
    }

    unlocked
}

/// Unlock the generator after `index` in sequence and reveal the feature
/// `index` carries. Meant for the first purchase of generator `index`.
pub fn on_first_purchase(state: &mut GameState, index: usize) -> Vec<Unlock> {
    let mut unlocked = Vec::new();
    if let Some(next) = state.generators.get_mut(index + 1) {
        if !next.unlocked {
            next.unlocked = true;
            unlocked.push(Unlock::new(EntityKind::Generator, &next.id));
        }
    }
    let reveals = state.generators.get(index).and_then(|g| g.reveals.clone());
    if let Some(feature_id) = reveals {
        if let Some(f) = state.features.iter_mut().find(|f| f.id == feature_id) {
            if !f.unlocked {
                f.unlocked = true;
                unlocked.push(Unlock::new(EntityKind::Feature, &f.id));
            }
        }
    }
    unlocked
}

fn indices(flags: impl Iterator<Item = bool>) -> Vec<usize> {
    flags
        .enumerate()
        .filter(|(_, hit)| *hit)
        .map(|(i, _)| i)
        .collect()
}
