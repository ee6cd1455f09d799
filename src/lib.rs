//! Deterministic progression engine for an incremental clicker economy.
//!
//! The engine owns no clock, no storage and no UI. Callers feed it
//! [`Action`]s carrying explicit timestamps and get back a [`Transition`]:
//! the next state, whether the action applied, and what it unlocked.
//!
//! ```no_run
//! use clicker_engine::{reduce, Action, GameState};
//!
//! let state = GameState::new(0);
//! let t = reduce(state, Action::PrimaryAction { now: 250 });
//! assert!(t.applied());
//! let t = reduce(t.state, Action::PeriodicUpdate { now: 1_000 });
//! println!("balance: {}", t.state.balance);
//! ```

pub mod combo;
pub mod config;
pub mod content;
pub mod error;
pub mod evaluator;
pub mod formulas;
pub mod powers;
pub mod prestige;
pub mod reducer;
pub mod save;
pub mod session;
pub mod state;

mod simulator;

pub use config::EngineConfig;
pub use error::{EntityKind, LoadError, Rejection};
pub use evaluator::Unlock;
pub use reducer::{reduce, Action, Transition};
pub use save::Snapshot;
pub use session::Session;
pub use state::{GameState, Millis};
