//! Configuration management for Boxroll
//!
//! This module provides the session settings structure: global pacing delays,
//! the incremental-vs-direct crafting path choice, fast-apply behavior, and
//! per-category match policy knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Category, Result};

/// Default keep policy for regular containers, expressed as a regex
///
/// Used only when the catalog-driven match policy is disabled.
pub const DEFAULT_REGULAR_PATTERN: &str =
    r"[2-9] addi.{1,20}(cart|ambush|harbin|harvest|divination|horned|essence).*scarab|stream|rare mon|stream";

/// Default keep policy for arcanist/diviner/cartographer containers
pub const DEFAULT_SPECIAL_PATTERN: &str =
    r"(additional item).*(quantity)|((quantity).*(additional item))|[2-9] addi.{1,20}(cart|ambush|harbin|harvest|divination|horned|essence).*scarab|stream|stream";

/// Session settings
///
/// Loaded from `boxroll.toml`. Every field has a default, so a missing or
/// partial file still produces a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Take the incremental path (seed/augment/reroll) instead of
    /// clear-and-upgrade for regular containers
    #[serde(default = "default_true")]
    pub use_incremental_path: bool,

    /// Evaluate containers against the mod catalog; when false, fall back to
    /// the per-category regex patterns
    #[serde(default = "default_true")]
    pub use_mod_selection: bool,

    /// For regular containers, skip intermediate steps and only ever
    /// clear-then-upgrade-to-rare
    #[serde(default)]
    pub upgrade_to_rare_only: bool,

    /// Apply quality items in batches under a held modifier
    #[serde(default)]
    pub use_fast_apply: bool,

    /// Delay between applications inside a fast-apply batch, in milliseconds
    #[serde(default = "default_fast_apply_delay_ms")]
    pub fast_apply_delay_ms: u64,

    /// Delay between the sub-steps of a single action, in milliseconds
    #[serde(default = "default_mid_step_delay_ms")]
    pub mid_step_delay_ms: u64,

    /// Extra delay between whole crafting steps, in milliseconds
    #[serde(default)]
    pub step_delay_ms: u64,

    /// Containers farther than this are out of crafting reach, in game units
    #[serde(default = "default_max_target_distance")]
    pub max_target_distance: f32,

    #[serde(default = "CategoryOptions::regular_default")]
    pub regular: CategoryOptions,

    #[serde(default = "CategoryOptions::arcanist_default")]
    pub arcanist: CategoryOptions,

    #[serde(default = "CategoryOptions::diviner_default")]
    pub diviner: CategoryOptions,

    #[serde(default = "CategoryOptions::cartographer_default")]
    pub cartographer: CategoryOptions,

    #[serde(default)]
    pub debug: DebugSettings,
}

/// Per-category crafting policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOptions {
    /// Prefer the clear-then-upgrade path over incremental rerolling
    #[serde(default = "default_true")]
    pub use_clear_upgrade: bool,

    /// Spend quality items on this category before upgrading
    #[serde(default)]
    pub use_quality_items: bool,

    /// How many desired mods a container must carry to count as ready
    #[serde(default = "default_required_desired_mods")]
    pub required_desired_mods: usize,

    /// Regex fallback policy, used when the mod catalog is disabled
    #[serde(default)]
    pub pattern: String,
}

impl CategoryOptions {
    fn regular_default() -> Self {
        Self {
            use_clear_upgrade: true,
            use_quality_items: false,
            required_desired_mods: default_required_desired_mods(),
            pattern: DEFAULT_REGULAR_PATTERN.to_string(),
        }
    }

    fn arcanist_default() -> Self {
        Self {
            use_clear_upgrade: true,
            use_quality_items: false,
            required_desired_mods: default_required_desired_mods(),
            pattern: DEFAULT_SPECIAL_PATTERN.to_string(),
        }
    }

    fn diviner_default() -> Self {
        Self {
            use_clear_upgrade: true,
            use_quality_items: true,
            required_desired_mods: default_required_desired_mods(),
            pattern: DEFAULT_SPECIAL_PATTERN.to_string(),
        }
    }

    fn cartographer_default() -> Self {
        Self {
            use_clear_upgrade: true,
            use_quality_items: true,
            required_desired_mods: default_required_desired_mods(),
            pattern: DEFAULT_SPECIAL_PATTERN.to_string(),
        }
    }
}

/// Debug log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Emit throttled per-decision debug lines
    #[serde(default)]
    pub enabled: bool,

    /// Where the debug log file is written
    #[serde(default = "default_debug_log_path")]
    pub log_path: String,
}

// Default value providers
fn default_true() -> bool {
    true
}

fn default_fast_apply_delay_ms() -> u64 {
    100
}

fn default_mid_step_delay_ms() -> u64 {
    40
}

fn default_max_target_distance() -> f32 {
    70.0
}

fn default_required_desired_mods() -> usize {
    1
}

fn default_debug_log_path() -> String {
    "./boxroll_debug.log".to_string()
}

impl Settings {
    /// Load settings from `boxroll.toml` in the given directory, or use defaults
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join("boxroll.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let mut settings: Settings = toml::from_str(&content).map_err(|e| {
                crate::BoxrollError::Config(format!("Failed to parse settings file: {}", e))
            })?;
            settings.clamp();
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default settings to `boxroll.toml` in the given directory
    pub fn write_default(config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)?;

        let config_path = config_dir.join("boxroll.toml");
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings).map_err(|e| {
            crate::BoxrollError::Config(format!("Failed to serialize settings: {}", e))
        })?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Options for a specific container category
    pub fn category(&self, category: Category) -> &CategoryOptions {
        match category {
            Category::Regular => &self.regular,
            Category::Arcanist => &self.arcanist,
            Category::Diviner => &self.diviner,
            Category::Cartographer => &self.cartographer,
        }
    }

    /// Mutable options for a specific container category
    pub fn category_mut(&mut self, category: Category) -> &mut CategoryOptions {
        match category {
            Category::Regular => &mut self.regular,
            Category::Arcanist => &mut self.arcanist,
            Category::Diviner => &mut self.diviner,
            Category::Cartographer => &mut self.cartographer,
        }
    }

    /// Clamp loaded values into their supported ranges
    fn clamp(&mut self) {
        self.fast_apply_delay_ms = self.fast_apply_delay_ms.clamp(50, 500);
        self.mid_step_delay_ms = self.mid_step_delay_ms.min(200);
        self.step_delay_ms = self.step_delay_ms.min(400);
        for category in Category::ALL {
            let opts = self.category_mut(category);
            opts.required_desired_mods = opts.required_desired_mods.clamp(1, 3);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_incremental_path: true,
            use_mod_selection: true,
            upgrade_to_rare_only: false,
            use_fast_apply: false,
            fast_apply_delay_ms: default_fast_apply_delay_ms(),
            mid_step_delay_ms: default_mid_step_delay_ms(),
            step_delay_ms: 0,
            max_target_distance: default_max_target_distance(),
            regular: CategoryOptions::regular_default(),
            arcanist: CategoryOptions::arcanist_default(),
            diviner: CategoryOptions::diviner_default(),
            cartographer: CategoryOptions::cartographer_default(),
            debug: DebugSettings::default(),
        }
    }
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_debug_log_path(),
        }
    }
}
