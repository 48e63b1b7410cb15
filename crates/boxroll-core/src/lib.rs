//! # boxroll-core
//!
//! Core types for the Boxroll strongbox crafting engine.
//!
//! Boxroll automates a repetitive craft-and-check loop against a live,
//! externally-owned game state: it evaluates a container's affixes against a
//! user-maintained catalog, applies currency actions through an external
//! input driver until the affixes are worth keeping, then stops.
//!
//! ## Core Paradigm
//!
//! - Containers are external entities, referenced by opaque handles
//! - Every verdict is recomputable from observed state (nothing is owned)
//! - Every wait has an explicit upper bound
//! - Every failure is recoverable; the loop retries next tick

#![allow(dead_code)]

mod config;
mod error;
mod throttle;
mod types;

pub use config::{CategoryOptions, DebugSettings, Settings};
pub use error::{BoxrollError, Result};
pub use throttle::LogThrottle;
pub use types::*;
