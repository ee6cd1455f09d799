//! Error types for the progression engine.
//!
//! Nothing here is fatal. A `Rejection` explains why an action left the state
//! untouched; a `LoadError` explains why a snapshot was refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity families that can be named by an action or a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Generator,
    Upgrade,
    Achievement,
    Feature,
    MiniGame,
    Power,
    PrestigeUpgrade,
    Specialization,
    Objective,
    Season,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Generator => "generator",
            EntityKind::Upgrade => "upgrade",
            EntityKind::Achievement => "achievement",
            EntityKind::Feature => "feature",
            EntityKind::MiniGame => "mini-game",
            EntityKind::Power => "power",
            EntityKind::PrestigeUpgrade => "prestige upgrade",
            EntityKind::Specialization => "specialization",
            EntityKind::Objective => "objective",
            EntityKind::Season => "season",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an action was a no-op.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The action named an id that static content does not define.
    #[error("Unknown {kind}: {id}")]
    UnknownEntity { kind: EntityKind, id: String },

    /// Not enough currency.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: f64, available: f64 },

    /// Not enough prestige points.
    #[error("Insufficient prestige points: need {required}, have {available}")]
    InsufficientPoints { required: u64, available: u64 },

    /// The entity has not been unlocked yet.
    #[error("{kind} is locked: {id}")]
    Locked { kind: EntityKind, id: String },

    /// Write-once entity already purchased or completed.
    #[error("{kind} already taken: {id}")]
    AlreadyTaken { kind: EntityKind, id: String },

    /// Timed power used too recently.
    #[error("Power {id} on cooldown for another {remaining_ms}ms")]
    OnCooldown { id: String, remaining_ms: u64 },

    /// Prestige would not raise the point balance.
    #[error("Prestige not eligible: candidate {candidate} <= current {current}")]
    NotEligible { candidate: u64, current: u64 },

    /// The season requested is already running.
    #[error("Season already active: {0}")]
    SeasonActive(String),

    /// LOAD refused the snapshot; the in-memory state stays authoritative.
    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(#[from] LoadError),
}

/// Why a snapshot could not be turned back into a state.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The payload is not valid JSON or misses a required field.
    #[error("Failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// Saved by a format this build can no longer read.
    #[error("Incompatible snapshot version {found} (minimum {minimum})")]
    IncompatibleVersion { found: u32, minimum: u32 },

    /// The snapshot references an id that static content does not define.
    #[error("Snapshot references unknown {kind}: {id}")]
    UnknownEntity { kind: EntityKind, id: String },

    /// A numeric field is negative, NaN or otherwise unusable.
    #[error("Invalid snapshot field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}
