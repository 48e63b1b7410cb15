//! Catalog persistence
//!
//! The catalog lives in a single JSON file. Loading never fails hard: a
//! missing or unreadable file regenerates the default catalog and persists
//! it immediately. Every mutation rewrites the whole file, so the on-disk
//! state is always current.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use boxroll_core::{BoxrollError, Category, Result};

use crate::defaults::default_mods;

/// Persisted catalog schema version
pub const CATALOG_VERSION: u32 = 1;

const MIN_REQUIRED: usize = 1;
const MAX_REQUIRED: usize = 3;

/// One known affix description and its desirability flags
///
/// Invariant: `is_desired` and `is_undesired` are never both true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModDefinition {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub is_desired: bool,
    pub is_undesired: bool,
}

/// On-disk representation
#[derive(Debug, Serialize, Deserialize)]
struct SavedCatalog {
    version: u32,
    saved_at: DateTime<Utc>,
    mods: Vec<ModDefinition>,
    required_desired_mods: BTreeMap<Category, usize>,
}

/// The mod catalog with its backing file
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    mods: Vec<ModDefinition>,
    required_desired_mods: BTreeMap<Category, usize>,
}

impl CatalogStore {
    /// Load the catalog from `path`, regenerating defaults if the file is
    /// missing or unreadable
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            match Self::read_file(&path) {
                Ok(saved) => {
                    let mut store = Self {
                        path,
                        mods: saved.mods,
                        required_desired_mods: saved.required_desired_mods,
                    };
                    store.clamp_required();
                    return Ok(store);
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "catalog unreadable, regenerating defaults");
                }
            }
        }

        let mut store = Self {
            path,
            mods: default_mods(),
            required_desired_mods: Category::ALL.iter().map(|&c| (c, MIN_REQUIRED)).collect(),
        };
        store.save()?;
        Ok(store)
    }

    fn read_file(path: &Path) -> Result<SavedCatalog> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the full catalog to its backing file
    pub fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let saved = SavedCatalog {
            version: CATALOG_VERSION,
            saved_at: Utc::now(),
            mods: self.mods.clone(),
            required_desired_mods: self.required_desired_mods.clone(),
        };
        let content = serde_json::to_string_pretty(&saved)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// All mod definitions, in catalog order
    pub fn all_mods(&self) -> &[ModDefinition] {
        &self.mods
    }

    /// Definitions for one category, in catalog order
    pub fn mods_by_category(&self, category: Category) -> Vec<&ModDefinition> {
        self.mods.iter().filter(|m| m.category == category).collect()
    }

    /// Mark a mod desired or not; marking desired clears the undesired flag
    pub fn set_desired(&mut self, name: &str, desired: bool) -> Result<()> {
        let m = self.find_mut(name)?;
        m.is_desired = desired;
        if desired {
            m.is_undesired = false;
        }
        self.save()
    }

    /// Mark a mod undesired or not; marking undesired clears the desired flag
    pub fn set_undesired(&mut self, name: &str, undesired: bool) -> Result<()> {
        let m = self.find_mut(name)?;
        m.is_undesired = undesired;
        if undesired {
            m.is_desired = false;
        }
        self.save()
    }

    /// Required desired-mod count for a category
    pub fn required(&self, category: Category) -> usize {
        self.required_desired_mods
            .get(&category)
            .copied()
            .unwrap_or(MIN_REQUIRED)
    }

    /// Set the required desired-mod count for a category, clamped to 1..=3
    pub fn set_required(&mut self, category: Category, count: usize) -> Result<()> {
        self.required_desired_mods
            .insert(category, count.clamp(MIN_REQUIRED, MAX_REQUIRED));
        self.save()
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut ModDefinition> {
        self.mods
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| BoxrollError::ModNotFound(name.to_string()))
    }

    fn clamp_required(&mut self) {
        for category in Category::ALL {
            let entry = self
                .required_desired_mods
                .entry(category)
                .or_insert(MIN_REQUIRED);
            *entry = (*entry).clamp(MIN_REQUIRED, MAX_REQUIRED);
        }
    }
}
