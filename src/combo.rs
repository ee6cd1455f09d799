//! Combo subsystem: a transient click multiplier built by rapid repeated
//! primary actions.
//!
//! `inactive → active` on a primary action; `active → active` (streak + 1)
//! while actions land within the time window; `active → inactive` once a
//! periodic update sees the window elapse. The multiplier depends on the
//! streak only.

use crate::formulas;
use crate::state::{ComboState, Millis};

/// Record a primary action at `now`, extending or restarting the streak.
pub fn register_action(combo: &mut ComboState, now: Millis) {
    let within_window = combo.active
        && combo
            .last_action
            .is_some_and(|last| now.saturating_sub(last) <= combo.config.time_window_ms);

    combo.streak = if within_window {
        combo.streak.saturating_add(1)
    } else {
        1
    };
    combo.active = true;
    combo.last_action = Some(now);
    combo.multiplier =
        formulas::combo_multiplier(combo.streak, combo.config.max_multiplier, combo.config.step);
}

/// Deactivate the combo if the window has elapsed since the last action.
/// Returns true if the combo was dropped.
pub fn decay(combo: &mut ComboState, now: Millis) -> bool {
    if !combo.active {
        return false;
    }
    let expired = match combo.last_action {
        Some(last) => now.saturating_sub(last) > combo.config.time_window_ms,
        None => true,
    };
    if expired {
        combo.active = false;
        combo.streak = 0;
        combo.multiplier = 1.0;
    }
    expired
}
