//! Progression state definitions.
//!
//! Everything here is plain data: conditions and effects are enums, and
//! anything scripted is referenced by a string id resolved through
//! [`crate::content`]. A `GameState` can therefore be serialized as-is.

use serde::{Deserialize, Serialize};

use crate::combo;
use crate::config::{ComboConfig, EngineConfig};
use crate::content;
use crate::formulas;

/// Caller-supplied wall-clock milliseconds.
pub type Millis = u64;

/// A predicate over the state. Used for unlock requirements, achievements
/// and objectives alike.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Generator `generator` has at least `count` owned.
    GeneratorOwned { generator: String, count: u32 },
    /// Sum of all owned generators.
    TotalGeneratorsAtLeast(u32),
    /// Lifetime currency earned in this run.
    LifetimeAtLeast(f64),
    /// Primary actions performed in this run.
    ClicksAtLeast(u64),
    AchievementUnlocked(String),
    PrestigePointsPositive,
    ProductionRateAtLeast(f64),
    ComboStreakAtLeast(u32),
    ResetsAtLeast(u32),
    /// Resolved through [`content::scripted_condition`]. Unknown ids never hold.
    Scripted(String),
}

impl Condition {
    /// Evaluate against `state`.
    pub fn holds(&self, state: &GameState) -> bool {
        match self {
            Condition::GeneratorOwned { generator, count } => state
                .generator(generator)
                .is_some_and(|g| g.count >= *count),
            Condition::TotalGeneratorsAtLeast(n) => state.total_generators() >= *n,
            Condition::LifetimeAtLeast(threshold) => state.lifetime_earned >= *threshold,
            Condition::ClicksAtLeast(n) => state.clicks >= *n,
            Condition::AchievementUnlocked(id) => state.is_achievement_unlocked(id),
            Condition::PrestigePointsPositive => state.prestige.points > 0,
            Condition::ProductionRateAtLeast(rate) => state.production_rate >= *rate,
            Condition::ComboStreakAtLeast(n) => state.combo.active && state.combo.streak >= *n,
            Condition::ResetsAtLeast(n) => state.prestige.reset_count >= *n,
            Condition::Scripted(id) => content::scripted_condition(id).is_some_and(|f| f(state)),
        }
    }
}

/// Which rate a multiplier touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplierTarget {
    Click,
    Production,
    /// Both click gain and production.
    Global,
}

impl MultiplierTarget {
    pub fn affects_click(&self) -> bool {
        matches!(self, MultiplierTarget::Click | MultiplierTarget::Global)
    }

    pub fn affects_production(&self) -> bool {
        matches!(self, MultiplierTarget::Production | MultiplierTarget::Global)
    }
}

/// A purchasable collaborator producing currency over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: f64,
    /// Currency per second per unit.
    pub base_output: f64,
    pub count: u32,
    /// Multiplier from upgrades (default 1.0).
    pub multiplier: f64,
    /// Monotonic: once true, never false.
    pub unlocked: bool,
    /// Global production boost, compounding while `count > 0`.
    pub boost: Option<f64>,
    /// Feature revealed the first time this generator is bought.
    pub reveals: Option<String>,
}

impl Generator {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        base_cost: f64,
        base_output: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            base_cost,
            base_output,
            count: 0,
            multiplier: 1.0,
            unlocked: false,
            boost: None,
            reveals: None,
        }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn revealing(mut self, feature: &str) -> Self {
        self.reveals = Some(feature.into());
        self
    }

    /// Cost of the next unit.
    pub fn cost(&self, growth: f64) -> f64 {
        formulas::purchase_cost_with_growth(self.base_cost, self.count, growth)
    }

    /// Currency per second from the owned units, before global multipliers.
    pub fn output(&self) -> f64 {
        self.base_output * self.count as f64 * self.multiplier
    }
}

/// What buying an upgrade does to the state, applied exactly once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Adds to the base currency per primary action.
    ClickPower(f64),
    ClickMultiplier(f64),
    GeneratorMultiplier { generator: String, multiplier: f64 },
    ProductionMultiplier(f64),
    /// Resolved through [`content::scripted_effect`].
    Scripted(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: f64,
    /// Write-once.
    pub purchased: bool,
    pub unlocked: bool,
    pub requirement: Option<Condition>,
    pub effect: UpgradeEffect,
}

impl Upgrade {
    pub fn new(id: &str, name: &str, description: &str, cost: f64, effect: UpgradeEffect) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            cost,
            purchased: false,
            unlocked: true,
            requirement: None,
            effect,
        }
    }

    /// Gate the upgrade behind `condition`. Ungated upgrades start unlocked.
    pub fn requires(mut self, condition: Condition) -> Self {
        self.requirement = Some(condition);
        self.unlocked = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub condition: Condition,
    pub unlocked: bool,
    /// Presentation only; hidden achievements are evaluated like any other.
    pub hidden: bool,
}

impl Achievement {
    pub fn new(id: &str, name: &str, description: &str, condition: Condition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            condition,
            unlocked: false,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A gated piece of presentation (a tab, a panel).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    /// `None` means the feature is only revealed by a generator purchase.
    pub requirement: Option<Condition>,
}

impl Feature {
    pub fn new(id: &str, name: &str, requirement: Option<Condition>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unlocked: false,
            requirement,
        }
    }
}

/// Live combo state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub active: bool,
    pub streak: u32,
    pub multiplier: f64,
    pub last_action: Option<Millis>,
    pub config: ComboConfig,
}

impl ComboState {
    pub fn new(config: ComboConfig) -> Self {
        Self {
            active: false,
            streak: 0,
            multiplier: 1.0,
            last_action: None,
            config,
        }
    }

    /// Multiplier to apply right now.
    pub fn current_multiplier(&self) -> f64 {
        if self.active {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// What completing a mini-game grants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Reward {
    Currency(f64),
    ClickMultiplier(f64),
    /// Secondary currency: prestige points.
    PrestigePoints(u64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiniGame {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    /// Write-once.
    pub completed: bool,
    pub requirement: Option<Condition>,
    pub reward: Reward,
}

impl MiniGame {
    pub fn new(id: &str, name: &str, requirement: Condition, reward: Reward) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unlocked: false,
            completed: false,
            requirement: Some(requirement),
            reward,
        }
    }
}

/// A temporary multiplier with a cooldown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedPower {
    pub id: String,
    pub name: String,
    pub unlocked: bool,
    pub requirement: Option<Condition>,
    pub target: MultiplierTarget,
    pub multiplier: f64,
    pub duration_ms: u64,
    pub cooldown_ms: u64,
    pub last_used: Option<Millis>,
}

impl TimedPower {
    /// Milliseconds until the power can be used again at `now`.
    pub fn cooldown_remaining(&self, now: Millis) -> u64 {
        match self.last_used {
            Some(used) => self.cooldown_ms.saturating_sub(now.saturating_sub(used)),
            None => 0,
        }
    }
}

/// A power effect in force until `expires_at`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Id of the power that produced it.
    pub source: String,
    pub target: MultiplierTarget,
    pub multiplier: f64,
    pub expires_at: Millis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeUpgrade {
    pub id: String,
    pub name: String,
    pub cost: u64,
    pub multiplier: f64,
    /// Write-once.
    pub purchased: bool,
    pub unlocked: bool,
    pub requirement: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub id: String,
    pub name: String,
    pub cost: u64,
    pub target: MultiplierTarget,
    pub multiplier: f64,
    /// Write-once.
    pub purchased: bool,
    pub unlocked: bool,
    pub requirement: Option<Condition>,
}

/// A goal granting prestige points once completed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub name: String,
    pub condition: Condition,
    pub reward: u64,
    /// Write-once within a run; cleared by prestige.
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: String,
    pub name: String,
    /// Applied to production.
    pub multiplier: f64,
}

/// Everything prestige-related. Most of it survives a prestige reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrestigeState {
    pub points: u64,
    /// Product of purchased prestige-upgrade multipliers.
    pub multiplier: f64,
    pub reset_count: u32,
    pub upgrades: Vec<PrestigeUpgrade>,
    /// Objectives of the current season.
    pub objectives: Vec<Objective>,
    pub specializations: Vec<Specialization>,
    pub season: Season,
}

impl PrestigeState {
    pub fn new() -> Self {
        let (season, objectives) = content::season(content::DEFAULT_SEASON)
            .unwrap_or_else(content::fallback_season);
        Self {
            points: 0,
            multiplier: 1.0,
            reset_count: 0,
            upgrades: content::prestige_upgrades(),
            objectives,
            specializations: content::specializations(),
            season,
        }
    }

    /// Sum of rewards from completed objectives.
    pub fn completed_rewards(&self) -> u64 {
        self.objectives
            .iter()
            .filter(|o| o.completed)
            .map(|o| o.reward)
            .sum()
    }

    /// Product of purchased specialization multipliers touching `pred`.
    pub fn specialization_factor(&self, pred: impl Fn(MultiplierTarget) -> bool) -> f64 {
        formulas::compose_multipliers(
            self.specializations
                .iter()
                .filter(|s| s.purchased && pred(s.target))
                .map(|s| s.multiplier),
        )
    }
}

impl Default for PrestigeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Full state of the progression engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub config: EngineConfig,

    /// Spendable currency.
    pub balance: f64,
    /// Currency earned in this run. Never decreased by spending.
    pub lifetime_earned: f64,
    /// Base currency per primary action (upgrades add to it).
    pub entries_per_click: f64,
    /// Persistent click multiplier from upgrades and mini-game rewards.
    pub click_multiplier: f64,
    /// Persistent production multiplier from upgrades.
    pub production_multiplier: f64,
    /// Effective currency per second, debug flag excluded. Derived; see
    /// [`GameState::recompute_production`].
    pub production_rate: f64,
    /// Primary actions performed in this run.
    pub clicks: u64,
    pub debug: bool,

    pub started_at: Millis,
    pub last_update: Millis,
    pub last_saved: Millis,

    pub generators: Vec<Generator>,
    pub upgrades: Vec<Upgrade>,
    pub achievements: Vec<Achievement>,
    pub features: Vec<Feature>,
    pub combo: ComboState,
    pub prestige: PrestigeState,
    pub mini_games: Vec<MiniGame>,
    pub powers: Vec<TimedPower>,
    pub active_effects: Vec<ActiveEffect>,
}

impl GameState {
    /// Fresh state seeded from static content with the default config.
    pub fn new(now: Millis) -> Self {
        Self::with_config(now, EngineConfig::default())
    }

    pub fn with_config(now: Millis, config: EngineConfig) -> Self {
        let mut generators = content::generators();
        if let Some(first) = generators.first_mut() {
            first.unlocked = true;
        }
        Self {
            balance: 0.0,
            lifetime_earned: 0.0,
            entries_per_click: config.base_entries_per_click,
            click_multiplier: 1.0,
            production_multiplier: 1.0,
            production_rate: 0.0,
            clicks: 0,
            debug: false,
            started_at: now,
            last_update: now,
            last_saved: now,
            generators,
            upgrades: content::upgrades(),
            achievements: content::achievements(),
            features: content::features(),
            combo: ComboState::new(config.combo.clone()),
            prestige: PrestigeState::new(),
            mini_games: content::mini_games(),
            powers: content::powers(),
            active_effects: Vec::new(),
            config,
        }
    }

    pub fn generator(&self, id: &str) -> Option<&Generator> {
        self.generators.iter().find(|g| g.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn is_achievement_unlocked(&self, id: &str) -> bool {
        self.achievement(id).is_some_and(|a| a.unlocked)
    }

    pub fn is_feature_unlocked(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.id == id && f.unlocked)
    }

    pub fn total_generators(&self) -> u32 {
        self.generators.iter().map(|g| g.count).sum()
    }

    /// Cost of the next unit of generator `id`.
    pub fn generator_cost(&self, id: &str) -> Option<f64> {
        self.generator(id).map(|g| g.cost(self.config.cost_growth))
    }

    /// Product of power effects touching `pred` that are still running at `now`.
    pub fn effect_factor(&self, now: Millis, pred: impl Fn(MultiplierTarget) -> bool) -> f64 {
        formulas::compose_multipliers(
            self.active_effects
                .iter()
                .filter(|e| e.expires_at > now && pred(e.target))
                .map(|e| e.multiplier),
        )
    }

    /// Every click multiplier at `now` except the combo and the debug flag.
    pub fn click_type_multiplier(&self, now: Millis) -> f64 {
        formulas::compose_multipliers([
            self.click_multiplier,
            self.prestige.specialization_factor(|t| t.affects_click()),
            self.effect_factor(now, |t| t.affects_click()),
        ])
    }

    /// Currency granted by a primary action at `now` if its combo multiplier
    /// is `combo_multiplier`.
    pub fn click_gain(&self, combo_multiplier: f64, now: Millis) -> f64 {
        self.entries_per_click
            * combo_multiplier
            * self.click_type_multiplier(now)
            * formulas::debug_factor(self.debug, self.config.debug_multiplier)
    }

    /// Recompute `production_rate` from currently owned entities and the
    /// effects still running at `last_update`.
    pub fn recompute_production(&mut self) {
        let base = formulas::production_rate(&self.generators);
        self.production_rate = base
            * formulas::compose_multipliers([
                self.production_multiplier,
                self.prestige.multiplier,
                self.prestige.season.multiplier,
                self.prestige.specialization_factor(|t| t.affects_production()),
                self.effect_factor(self.last_update, |t| t.affects_production()),
            ]);
    }

    /// Prestige points a prestige would grant right now.
    pub fn pending_prestige_points(&self) -> u64 {
        formulas::prestige_points_with_divisor(
            self.lifetime_earned,
            self.prestige.completed_rewards(),
            self.config.prestige_divisor,
        )
    }

    /// Seconds of production needed to afford `cost`. `None` if there is no production.
    pub fn seconds_until_affordable(&self, cost: f64) -> Option<f64> {
        if self.balance >= cost {
            return Some(0.0);
        }
        if self.production_rate <= 0.0 {
            return None;
        }
        Some((cost - self.balance) / self.production_rate)
    }

    /// The combo multiplier the next primary action at `now` would get.
    pub fn next_combo_multiplier(&self, now: Millis) -> f64 {
        let mut combo = self.combo.clone();
        combo::register_action(&mut combo, now);
        combo.current_multiplier()
    }
}
