//! # boxroll-engine
//!
//! The decision loop: readiness caching, action selection, change
//! confirmation, fast-apply batching, and the session state machine, driven
//! one quantum per tick by [`CraftEngine`].
//!
//! ## Core Paradigm
//!
//! - The game surface is external; everything is re-read, nothing is owned
//! - Decisions are pure functions over observed state
//! - Every wait has an explicit upper bound
//! - Every failure recovers by returning to Searching

pub mod cache;
pub mod confirm;
pub mod fast_apply;
pub mod game;
mod orchestrator;
pub mod selector;
pub mod state_machine;

pub use cache::{ReadinessCache, READINESS_TTL};
pub use confirm::{wait_for_change, CONFIRM_POLL, CONFIRM_TIMEOUT};
pub use fast_apply::{run_batch, ModifierGuard, MAX_APPLICATIONS};
pub use game::{GameSurface, GameView, InputDriver, Inventory};
pub use orchestrator::CraftEngine;
pub use selector::{has_max_quality, select_action, ItemBudget, SelectorOptions};
pub use state_machine::{transition, Directive, Event, State};
