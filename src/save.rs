//! Snapshots: the serializable form of a [`GameState`].
//!
//! ## Versioning
//!
//! - `SAVE_VERSION`: current snapshot format. Bump it when fields are added.
//! - `MIN_COMPATIBLE_VERSION`: oldest format still readable. Only bump it on
//!   breaking changes (a field changing meaning or disappearing).
//!
//! The core fields are required: a snapshot missing one fails to parse.
//! Fields added after version 1 carry `#[serde(default)]` so older snapshots
//! still load.
//!
//! Static content (names, costs, conditions) is never saved. A snapshot only
//! records per-id progress, which is overlaid onto a fresh state on restore.
//! Storage is the caller's business; this module only deals in JSON text.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combo;
use crate::config::EngineConfig;
use crate::content;
use crate::error::{EntityKind, LoadError};
use crate::formulas;
use crate::state::{ActiveEffect, GameState, Millis};

/// Snapshot format version. Bump when fields are added.
pub const SAVE_VERSION: u32 = 1;

/// Oldest snapshot version that can still be restored.
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub game: GameSave,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSave {
    pub balance: f64,
    pub lifetime_earned: f64,
    pub entries_per_click: f64,
    pub click_multiplier: f64,
    pub production_multiplier: f64,
    pub clicks: u64,
    pub started_at: Millis,
    pub last_update: Millis,
    #[serde(default)]
    pub last_saved: Millis,
    #[serde(default)]
    pub debug: bool,

    pub generators: Vec<GeneratorSave>,
    pub upgrades: Vec<PurchaseSave>,
    pub achievements: Vec<FlagSave>,
    pub features: Vec<FlagSave>,
    pub mini_games: Vec<MiniGameSave>,
    pub powers: Vec<PowerSave>,
    pub prestige: PrestigeSave,

    #[serde(default)]
    pub combo: ComboSave,
    #[serde(default)]
    pub active_effects: Vec<ActiveEffect>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSave {
    pub id: String,
    pub count: u32,
    pub multiplier: f64,
    pub unlocked: bool,
}

/// Upgrades, prestige upgrades and specializations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSave {
    pub id: String,
    pub unlocked: bool,
    pub purchased: bool,
}

/// Achievements and features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagSave {
    pub id: String,
    pub unlocked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiniGameSave {
    pub id: String,
    pub unlocked: bool,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerSave {
    pub id: String,
    pub unlocked: bool,
    pub last_used: Option<Millis>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSave {
    pub id: String,
    pub completed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboSave {
    pub active: bool,
    pub streak: u32,
    pub last_action: Option<Millis>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeSave {
    pub points: u64,
    pub reset_count: u32,
    pub season: String,
    pub upgrades: Vec<PurchaseSave>,
    pub specializations: Vec<PurchaseSave>,
    pub objectives: Vec<ObjectiveSave>,
}

impl Snapshot {
    /// Extract the persistent part of `state`.
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SAVE_VERSION,
            game: GameSave {
                balance: state.balance,
                lifetime_earned: state.lifetime_earned,
                entries_per_click: state.entries_per_click,
                click_multiplier: state.click_multiplier,
                production_multiplier: state.production_multiplier,
                clicks: state.clicks,
                started_at: state.started_at,
                last_update: state.last_update,
                last_saved: state.last_saved,
                debug: state.debug,
                generators: state
                    .generators
                    .iter()
                    .map(|g| GeneratorSave {
                        id: g.id.clone(),
                        count: g.count,
                        multiplier: g.multiplier,
                        unlocked: g.unlocked,
                    })
                    .collect(),
                upgrades: state
                    .upgrades
                    .iter()
                    .map(|u| purchase(&u.id, u.unlocked, u.purchased))
                    .collect(),
                achievements: state
                    .achievements
                    .iter()
                    .map(|a| flag(&a.id, a.unlocked))
                    .collect(),
                features: state
                    .features
                    .iter()
                    .map(|f| flag(&f.id, f.unlocked))
                    .collect(),
                mini_games: state
                    .mini_games
                    .iter()
                    .map(|m| MiniGameSave {
                        id: m.id.clone(),
                        unlocked: m.unlocked,
                        completed: m.completed,
                    })
                    .collect(),
                powers: state
                    .powers
                    .iter()
                    .map(|p| PowerSave {
                        id: p.id.clone(),
                        unlocked: p.unlocked,
                        last_used: p.last_used,
                    })
                    .collect(),
                prestige: PrestigeSave {
                    points: state.prestige.points,
                    reset_count: state.prestige.reset_count,
                    season: state.prestige.season.id.clone(),
                    upgrades: state
                        .prestige
                        .upgrades
                        .iter()
                        .map(|u| purchase(&u.id, u.unlocked, u.purchased))
                        .collect(),
                    specializations: state
                        .prestige
                        .specializations
                        .iter()
                        .map(|s| purchase(&s.id, s.unlocked, s.purchased))
                        .collect(),
                    objectives: state
                        .prestige
                        .objectives
                        .iter()
                        .map(|o| ObjectiveSave {
                            id: o.id.clone(),
                            completed: o.completed,
                        })
                        .collect(),
                },
                combo: ComboSave {
                    active: state.combo.active,
                    streak: state.combo.streak,
                    last_action: state.combo.last_action,
                },
                active_effects: state.active_effects.clone(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and validate a snapshot. Does not touch any state.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Structural checks: version, numeric sanity, every id known.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.version < MIN_COMPATIBLE_VERSION {
            return Err(LoadError::IncompatibleVersion {
                found: self.version,
                minimum: MIN_COMPATIBLE_VERSION,
            });
        }

        let g = &self.game;
        non_negative("balance", g.balance)?;
        non_negative("lifetime_earned", g.lifetime_earned)?;
        non_negative("entries_per_click", g.entries_per_click)?;
        non_negative("click_multiplier", g.click_multiplier)?;
        non_negative("production_multiplier", g.production_multiplier)?;
        for gen in &g.generators {
            non_negative("generators.multiplier", gen.multiplier)?;
        }

        let fresh = GameState::new(g.started_at);
        known(EntityKind::Generator, g.generators.iter().map(|s| &s.id), |id| {
            fresh.generator(id).is_some()
        })?;
        known(EntityKind::Upgrade, g.upgrades.iter().map(|s| &s.id), |id| {
            fresh.upgrade(id).is_some()
        })?;
        known(EntityKind::Achievement, g.achievements.iter().map(|s| &s.id), |id| {
            fresh.achievement(id).is_some()
        })?;
        known(EntityKind::Feature, g.features.iter().map(|s| &s.id), |id| {
            fresh.features.iter().any(|f| f.id == id)
        })?;
        known(EntityKind::MiniGame, g.mini_games.iter().map(|s| &s.id), |id| {
            fresh.mini_games.iter().any(|m| m.id == id)
        })?;
        known(
            EntityKind::Power,
            g.powers
                .iter()
                .map(|s| &s.id)
                .chain(g.active_effects.iter().map(|e| &e.source)),
            |id| fresh.powers.iter().any(|p| p.id == id),
        )?;
        known(
            EntityKind::PrestigeUpgrade,
            g.prestige.upgrades.iter().map(|s| &s.id),
            |id| fresh.prestige.upgrades.iter().any(|u| u.id == id),
        )?;
        known(
            EntityKind::Specialization,
            g.prestige.specializations.iter().map(|s| &s.id),
            |id| fresh.prestige.specializations.iter().any(|s| s.id == id),
        )?;

        for effect in &g.active_effects {
            non_negative("active_effects.multiplier", effect.multiplier)?;
            let matches_power = fresh.powers.iter().any(|p| {
                p.id == effect.source
                    && p.target == effect.target
                    && p.multiplier == effect.multiplier
            });
            if !matches_power {
                return Err(LoadError::InvalidField {
                    field: "active_effects",
                    reason: format!("effect from '{}' does not match its power", effect.source),
                });
            }
        }

        let (_, objectives) =
            content::season(&g.prestige.season).ok_or_else(|| LoadError::UnknownEntity {
                kind: EntityKind::Season,
                id: g.prestige.season.clone(),
            })?;
        known(
            EntityKind::Objective,
            g.prestige.objectives.iter().map(|s| &s.id),
            |id| objectives.iter().any(|o| o.id == id),
        )?;
        Ok(())
    }

    /// Rebuild a state under `config`. Ids absent from the snapshot keep
    /// their fresh defaults; derived values are recomputed.
    pub fn restore(&self, config: EngineConfig) -> Result<GameState, LoadError> {
        self.validate()?;
        let save = &self.game;
        let mut state = GameState::with_config(save.started_at, config);

        state.balance = save.balance;
        state.lifetime_earned = save.lifetime_earned;
        state.entries_per_click = save.entries_per_click;
        state.click_multiplier = save.click_multiplier;
        state.production_multiplier = save.production_multiplier;
        state.clicks = save.clicks;
        state.last_update = save.last_update;
        state.last_saved = save.last_saved;
        state.debug = save.debug;

        for s in &save.generators {
            if let Some(g) = state.generators.iter_mut().find(|g| g.id == s.id) {
                g.count = s.count;
                g.multiplier = s.multiplier;
                g.unlocked |= s.unlocked;
            }
        }
        for s in &save.upgrades {
            if let Some(u) = state.upgrades.iter_mut().find(|u| u.id == s.id) {
                u.unlocked |= s.unlocked;
                u.purchased = s.purchased;
            }
        }
        for s in &save.achievements {
            if let Some(a) = state.achievements.iter_mut().find(|a| a.id == s.id) {
                a.unlocked |= s.unlocked;
            }
        }
        for s in &save.features {
            if let Some(f) = state.features.iter_mut().find(|f| f.id == s.id) {
                f.unlocked |= s.unlocked;
            }
        }
        for s in &save.mini_games {
            if let Some(m) = state.mini_games.iter_mut().find(|m| m.id == s.id) {
                m.unlocked |= s.unlocked;
                m.completed = s.completed;
            }
        }
        for s in &save.powers {
            if let Some(p) = state.powers.iter_mut().find(|p| p.id == s.id) {
                p.unlocked |= s.unlocked;
                p.last_used = s.last_used;
            }
        }

        let prestige = &mut state.prestige;
        prestige.points = save.prestige.points;
        prestige.reset_count = save.prestige.reset_count;
        if let Some((season, objectives)) = content::season(&save.prestige.season) {
            prestige.season = season;
            prestige.objectives = objectives;
        }
        for s in &save.prestige.objectives {
            if let Some(o) = prestige.objectives.iter_mut().find(|o| o.id == s.id) {
                o.completed = s.completed;
            }
        }
        for s in &save.prestige.upgrades {
            if let Some(u) = prestige.upgrades.iter_mut().find(|u| u.id == s.id) {
                u.unlocked |= s.unlocked;
                u.purchased = s.purchased;
            }
        }
        for s in &save.prestige.specializations {
            if let Some(sp) = prestige.specializations.iter_mut().find(|sp| sp.id == s.id) {
                sp.unlocked |= s.unlocked;
                sp.purchased = s.purchased;
            }
        }
        prestige.multiplier = formulas::compose_multipliers(
            prestige
                .upgrades
                .iter()
                .filter(|u| u.purchased)
                .map(|u| u.multiplier),
        );

        state.combo.active = save.combo.active;
        state.combo.streak = save.combo.streak;
        state.combo.last_action = save.combo.last_action;
        if state.combo.active {
            state.combo.multiplier = formulas::combo_multiplier(
                state.combo.streak,
                state.combo.config.max_multiplier,
                state.combo.config.step,
            );
            combo::decay(&mut state.combo, state.last_update);
        }

        state.active_effects = save.active_effects.clone();
        state.recompute_production();

        info!(
            version = self.version,
            lifetime = state.lifetime_earned,
            resets = state.prestige.reset_count,
            "snapshot restored"
        );
        Ok(state)
    }
}

fn purchase(id: &str, unlocked: bool, purchased: bool) -> PurchaseSave {
    PurchaseSave {
        id: id.into(),
        unlocked,
        purchased,
    }
}

fn flag(id: &str, unlocked: bool) -> FlagSave {
    FlagSave {
        id: id.into(),
        unlocked,
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), LoadError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LoadError::InvalidField {
            field,
            reason: format!("expected a finite non-negative number, got {value}"),
        })
    }
}

fn known<'a>(
    kind: EntityKind,
    ids: impl Iterator<Item = &'a String>,
    exists: impl Fn(&str) -> bool,
) -> Result<(), LoadError> {
    for id in ids {
        if !exists(id) {
            return Err(LoadError::UnknownEntity {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(())
}
