//! Static content: the single source of seed data.
//!
//! Entity collections are built from these definitions once per fresh state
//! and never grow or shrink afterwards. Scripted conditions and effects are
//! looked up here by id, so a saved state only ever carries the id.

use crate::state::{
    Achievement, Condition, Feature, GameState, Generator, MiniGame, MultiplierTarget, Objective,
    PrestigeUpgrade, Reward, Season, Specialization, TimedPower, Upgrade, UpgradeEffect,
};

/// Season every fresh prestige aggregate starts in.
pub const DEFAULT_SEASON: &str = "spring";

/// Seasons in rotation order.
pub const SEASON_IDS: &[&str] = &["spring", "harvest", "winter"];

pub type ScriptedCondition = fn(&GameState) -> bool;
pub type ScriptedEffect = fn(&mut GameState);

/// Generators in purchase sequence order.
pub fn generators() -> Vec<Generator> {
    vec![
        Generator::new("scribe", "Scribe", "Copies entries by hand.", 15.0, 0.1),
        Generator::new("archivist", "Archivist", "Files and cross-references.", 100.0, 1.0),
        Generator::new("editor", "Editor", "Turns drafts into entries.", 1_100.0, 8.0),
        Generator::new("librarian", "Librarian", "Keeps the stacks humming.", 12_000.0, 47.0)
            .with_boost(1.05),
        Generator::new("publisher", "Publisher", "Ships entries by the crate.", 130_000.0, 260.0)
            .revealing("minigames"),
        Generator::new("press", "Printing Press", "Industrial entry output.", 1_400_000.0, 1_400.0)
            .with_boost(1.1),
    ]
}

pub fn upgrades() -> Vec<Upgrade> {
    vec![
        Upgrade::new(
            "sharper_quill",
            "Sharper Quill",
            "+1 entry per click",
            100.0,
            UpgradeEffect::ClickPower(1.0),
        ),
        Upgrade::new(
            "scribe_training",
            "Scribe Training",
            "Scribes produce 2x",
            200.0,
            UpgradeEffect::GeneratorMultiplier {
                generator: "scribe".into(),
                multiplier: 2.0,
            },
        )
        .requires(owned("scribe", 1)),
        Upgrade::new(
            "archive_index",
            "Archive Index",
            "Archivists produce 2x",
            1_000.0,
            UpgradeEffect::GeneratorMultiplier {
                generator: "archivist".into(),
                multiplier: 2.0,
            },
        )
        .requires(owned("archivist", 1)),
        Upgrade::new(
            "editorial_board",
            "Editorial Board",
            "Editors produce 2x",
            11_000.0,
            UpgradeEffect::GeneratorMultiplier {
                generator: "editor".into(),
                multiplier: 2.0,
            },
        )
        .requires(owned("editor", 1)),
        Upgrade::new(
            "card_catalog",
            "Card Catalog",
            "Librarians produce 2x",
            120_000.0,
            UpgradeEffect::GeneratorMultiplier {
                generator: "librarian".into(),
                multiplier: 2.0,
            },
        )
        .requires(owned("librarian", 1)),
        Upgrade::new(
            "steam_press",
            "Steam Press",
            "Publishers produce 2x",
            1_300_000.0,
            UpgradeEffect::GeneratorMultiplier {
                generator: "publisher".into(),
                multiplier: 2.0,
            },
        )
        .requires(owned("publisher", 1)),
        Upgrade::new(
            "ink_reserves",
            "Ink Reserves",
            "All production 1.5x",
            50_000.0,
            UpgradeEffect::ProductionMultiplier(1.5),
        )
        .requires(Condition::LifetimeAtLeast(25_000.0)),
        Upgrade::new(
            "golden_nib",
            "Golden Nib",
            "Clicks 2x",
            500_000.0,
            UpgradeEffect::ClickMultiplier(2.0),
        )
        .requires(Condition::LifetimeAtLeast(250_000.0)),
        Upgrade::new(
            "collective_memory",
            "Collective Memory",
            "+0.1 entries per click for every generator owned",
            5_000_000.0,
            UpgradeEffect::Scripted("collective_memory".into()),
        )
        .requires(Condition::LifetimeAtLeast(2_500_000.0)),
    ]
}

pub fn achievements() -> Vec<Achievement> {
    vec![
        Achievement::new("first_entry", "First Entry", "Click once", Condition::ClicksAtLeast(1)),
        Achievement::new(
            "hundred_clicks",
            "Tireless",
            "Click 100 times",
            Condition::ClicksAtLeast(100),
        ),
        Achievement::new(
            "first_hire",
            "First Hire",
            "Own a generator",
            Condition::TotalGeneratorsAtLeast(1),
        ),
        Achievement::new(
            "full_staff",
            "Full Staff",
            "Own one of every generator",
            Condition::Scripted("full_staff".into()),
        ),
        Achievement::new(
            "thousand_entries",
            "Well Documented",
            "Earn 1,000 entries",
            Condition::LifetimeAtLeast(1_000.0),
        ),
        Achievement::new(
            "million_entries",
            "Encyclopedic",
            "Earn 1,000,000 entries",
            Condition::LifetimeAtLeast(1_000_000.0),
        ),
        Achievement::new(
            "steady_output",
            "Steady Output",
            "Reach 100 entries per second",
            Condition::ProductionRateAtLeast(100.0),
        ),
        Achievement::new(
            "combo_master",
            "In The Zone",
            "Reach a 25 click streak",
            Condition::ComboStreakAtLeast(25),
        )
        .hidden(),
        Achievement::new(
            "reborn",
            "Reborn",
            "Prestige once",
            Condition::ResetsAtLeast(1),
        ),
        Achievement::new(
            "billion_entries",
            "Library of Babel",
            "Earn 1,000,000,000 entries",
            Condition::LifetimeAtLeast(1_000_000_000.0),
        )
        .hidden(),
    ]
}

pub fn features() -> Vec<Feature> {
    vec![
        Feature::new("upgrades", "Upgrades", Some(Condition::ClicksAtLeast(10))),
        Feature::new(
            "statistics",
            "Statistics",
            Some(Condition::AchievementUnlocked("first_hire".into())),
        ),
        Feature::new("minigames", "Mini-games", None),
        Feature::new(
            "prestige",
            "Prestige",
            Some(Condition::LifetimeAtLeast(1_000_000.0)),
        ),
        Feature::new(
            "prestige_shop",
            "Prestige Shop",
            Some(Condition::PrestigePointsPositive),
        ),
    ]
}

pub fn mini_games() -> Vec<MiniGame> {
    vec![
        MiniGame::new(
            "speed_typing",
            "Speed Typing",
            Condition::ClicksAtLeast(50),
            Reward::Currency(500.0),
        ),
        MiniGame::new(
            "archive_puzzle",
            "Archive Puzzle",
            owned("archivist", 5),
            Reward::ClickMultiplier(1.5),
        ),
        MiniGame::new(
            "lore_quiz",
            "Lore Quiz",
            Condition::LifetimeAtLeast(100_000.0),
            Reward::PrestigePoints(1),
        ),
    ]
}

pub fn powers() -> Vec<TimedPower> {
    vec![
        TimedPower {
            id: "inspiration".into(),
            name: "Inspiration".into(),
            unlocked: false,
            requirement: Some(Condition::ClicksAtLeast(100)),
            target: MultiplierTarget::Click,
            multiplier: 7.0,
            duration_ms: 10_000,
            cooldown_ms: 60_000,
            last_used: None,
        },
        TimedPower {
            id: "overtime".into(),
            name: "Overtime".into(),
            unlocked: false,
            requirement: Some(owned("editor", 1)),
            target: MultiplierTarget::Production,
            multiplier: 3.0,
            duration_ms: 30_000,
            cooldown_ms: 300_000,
            last_used: None,
        },
        TimedPower {
            id: "eureka".into(),
            name: "Eureka".into(),
            unlocked: false,
            requirement: Some(Condition::AchievementUnlocked("million_entries".into())),
            target: MultiplierTarget::Global,
            multiplier: 2.0,
            duration_ms: 60_000,
            cooldown_ms: 900_000,
            last_used: None,
        },
    ]
}

pub fn prestige_upgrades() -> Vec<PrestigeUpgrade> {
    vec![
        PrestigeUpgrade {
            id: "heavenly_ink".into(),
            name: "Heavenly Ink".into(),
            cost: 1,
            multiplier: 1.1,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::PrestigePointsPositive),
        },
        PrestigeUpgrade {
            id: "eternal_archive".into(),
            name: "Eternal Archive".into(),
            cost: 5,
            multiplier: 1.25,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::AchievementUnlocked("reborn".into())),
        },
        PrestigeUpgrade {
            id: "cosmic_library".into(),
            name: "Cosmic Library".into(),
            cost: 25,
            multiplier: 1.5,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::AchievementUnlocked("billion_entries".into())),
        },
    ]
}

pub fn specializations() -> Vec<Specialization> {
    vec![
        Specialization {
            id: "quick_fingers".into(),
            name: "Quick Fingers".into(),
            cost: 2,
            target: MultiplierTarget::Click,
            multiplier: 1.5,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::PrestigePointsPositive),
        },
        Specialization {
            id: "efficient_staff".into(),
            name: "Efficient Staff".into(),
            cost: 2,
            target: MultiplierTarget::Production,
            multiplier: 1.5,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::PrestigePointsPositive),
        },
        Specialization {
            id: "polymath".into(),
            name: "Polymath".into(),
            cost: 10,
            target: MultiplierTarget::Global,
            multiplier: 1.25,
            purchased: false,
            unlocked: false,
            requirement: Some(Condition::AchievementUnlocked("reborn".into())),
        },
    ]
}

/// A season record and its objective set.
pub fn season(id: &str) -> Option<(Season, Vec<Objective>)> {
    let (name, multiplier, objectives) = match id {
        "spring" => (
            "Spring Cleaning",
            1.0,
            vec![
                objective("spring_10k", "Earn 10,000 entries", Condition::LifetimeAtLeast(10_000.0), 1),
                objective("spring_staff", "Own 25 generators", Condition::TotalGeneratorsAtLeast(25), 1),
            ],
        ),
        "harvest" => (
            "Harvest",
            1.2,
            vec![
                objective("harvest_presses", "Own 5 printing presses", owned("press", 5), 3),
                objective("harvest_rate", "Reach 10,000 entries per second", Condition::ProductionRateAtLeast(10_000.0), 2),
            ],
        ),
        "winter" => (
            "Long Winter",
            0.9,
            vec![
                objective("winter_clicks", "Click 5,000 times", Condition::ClicksAtLeast(5_000), 2),
                objective("winter_full_staff", "Own one of every generator", Condition::Scripted("full_staff".into()), 2),
            ],
        ),
        _ => return None,
    };
    Some((
        Season {
            id: id.into(),
            name: name.into(),
            multiplier,
        },
        objectives,
    ))
}

/// Neutral season used if the default id is ever missing from the table.
pub fn fallback_season() -> (Season, Vec<Objective>) {
    (
        Season {
            id: DEFAULT_SEASON.into(),
            name: "Off Season".into(),
            multiplier: 1.0,
        },
        Vec::new(),
    )
}

/// Scripted predicates by id.
pub fn scripted_condition(id: &str) -> Option<ScriptedCondition> {
    match id {
        "full_staff" => Some(full_staff),
        _ => None,
    }
}

/// Scripted upgrade effects by id.
pub fn scripted_effect(id: &str) -> Option<ScriptedEffect> {
    match id {
        "collective_memory" => Some(collective_memory),
        _ => None,
    }
}

fn full_staff(state: &GameState) -> bool {
    state.generators.iter().all(|g| g.count > 0)
}

fn collective_memory(state: &mut GameState) {
    state.entries_per_click += 0.1 * state.total_generators() as f64;
}

fn owned(generator: &str, count: u32) -> Condition {
    Condition::GeneratorOwned {
        generator: generator.into(),
        count,
    }
}

fn objective(id: &str, name: &str, condition: Condition, reward: u64) -> Objective {
    Objective {
        id: id.into(),
        name: name.into(),
        condition,
        reward,
        completed: false,
    }
}
