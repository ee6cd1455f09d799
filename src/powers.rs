//! Timed powers: activation, cooldowns and effect expiry.
//!
//! An active power is an [`ActiveEffect`] with an expiry timestamp. Nothing
//! is ever "undone": production is recomputed from what is owned and what is
//! still in force, so an expired effect simply stops contributing.

use tracing::debug;

use crate::error::{EntityKind, Rejection};
use crate::state::{ActiveEffect, GameState, Millis};

/// Check that power `id` can be activated at `now`. Returns its index.
pub fn check_activation(state: &GameState, id: &str, now: Millis) -> Result<usize, Rejection> {
    let index = state
        .powers
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| Rejection::UnknownEntity {
            kind: EntityKind::Power,
            id: id.into(),
        })?;
    let power = &state.powers[index];
    if !power.unlocked {
        return Err(Rejection::Locked {
            kind: EntityKind::Power,
            id: id.into(),
        });
    }
    let remaining_ms = power.cooldown_remaining(now);
    if remaining_ms > 0 {
        return Err(Rejection::OnCooldown {
            id: id.into(),
            remaining_ms,
        });
    }
    Ok(index)
}

/// Activate the power at `index`. Callers check with [`check_activation`]
/// first. A still-running effect from the same power is replaced.
pub fn activate(state: &mut GameState, index: usize, now: Millis) {
    let power = &mut state.powers[index];
    power.last_used = Some(now);
    let effect = ActiveEffect {
        source: power.id.clone(),
        target: power.target,
        multiplier: power.multiplier,
        expires_at: now.saturating_add(power.duration_ms),
    };
    state.active_effects.retain(|e| e.source != effect.source);
    state.active_effects.push(effect);
    state.recompute_production();
}

/// Drop every effect expired at `now`. Returns whether anything expired.
pub fn expire(state: &mut GameState, now: Millis) -> bool {
    let before = state.active_effects.len();
    state.active_effects.retain(|e| {
        let running = e.expires_at > now;
        if !running {
            debug!(power = %e.source, expires_at = e.expires_at, "timed power expired");
        }
        running
    });
    let expired = state.active_effects.len() != before;
    if expired {
        state.recompute_production();
    }
    expired
}

/// Integrate production from `from` to `to`, expiring effects at their own
/// timestamps so an effect never contributes past its expiry. Returns the
/// currency produced, before the debug factor.
pub fn produce_until(state: &mut GameState, from: Millis, to: Millis) -> f64 {
    let mut cursor = from;
    let mut produced = 0.0;
    while let Some(next) = state
        .active_effects
        .iter()
        .map(|e| e.expires_at)
        .filter(|&t| t <= to)
        .min()
    {
        let until = next.max(cursor);
        produced += state.production_rate * millis_to_secs(until - cursor);
        cursor = until;
        expire(state, next);
    }
    produced + state.production_rate * millis_to_secs(to.saturating_sub(cursor))
}

fn millis_to_secs(ms: Millis) -> f64 {
    ms as f64 / 1000.0
}
