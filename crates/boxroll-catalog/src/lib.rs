//! # boxroll-catalog
//!
//! The mod catalog and affix evaluation engine.
//!
//! The catalog is the user's desirability policy: a fixed universe of known
//! affix descriptions per container category, each flagged desired,
//! undesired, or neither. [`CatalogStore`] owns persistence (JSON, rewritten
//! after every mutation); [`matcher`] turns observed affix text plus the
//! catalog into a keep/continue verdict.

mod defaults;
pub mod matcher;
mod store;

pub use defaults::default_mods;
pub use store::{CatalogStore, ModDefinition, CATALOG_VERSION};
