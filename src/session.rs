//! A driver-side wrapper that owns the state and buffers notifications.

use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::error::{LoadError, Rejection};
use crate::evaluator::Unlock;
use crate::reducer::{self, Action};
use crate::save::Snapshot;
use crate::state::{GameState, Millis};

/// Oldest notifications are dropped past this many.
pub const NOTIFICATION_CAP: usize = 50;

pub struct Session {
    state: GameState,
    notifications: VecDeque<Unlock>,
}

impl Session {
    pub fn new(now: Millis) -> Self {
        Self::from_state(GameState::new(now))
    }

    pub fn with_config(now: Millis, config: EngineConfig) -> Self {
        Self::from_state(GameState::with_config(now, config))
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            notifications: VecDeque::new(),
        }
    }

    /// Restore from snapshot JSON. The config is not part of a snapshot.
    pub fn from_json(json: &str, config: EngineConfig) -> Result<Self, LoadError> {
        let state = Snapshot::from_json(json)?.restore(config)?;
        Ok(Self::from_state(state))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Run `action` through the reducer and queue what it unlocked.
    pub fn dispatch(&mut self, action: Action) -> Result<(), Rejection> {
        let unlocked = reducer::apply(&mut self.state, action)?;
        for unlock in unlocked {
            self.notify(unlock);
        }
        Ok(())
    }

    fn notify(&mut self, unlock: Unlock) {
        self.notifications.push_back(unlock);
        if self.notifications.len() > NOTIFICATION_CAP {
            self.notifications.pop_front();
        }
    }

    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Unlock> {
        self.notifications.drain(..).collect()
    }

    /// Serialize the state and record the save time.
    pub fn save(&mut self, now: Millis) -> Result<String, serde_json::Error> {
        let mut snapshot = Snapshot::capture(&self.state);
        snapshot.game.last_saved = now;
        let json = snapshot.to_json()?;
        self.state.last_saved = now;
        Ok(json)
    }
}
