//! Action selection
//!
//! A fixed decision table, evaluated first-match-wins over the observed
//! affixes, rarity, and item budget. `None` means the required item is not
//! available (or nothing applies), which is never an error: the loop simply
//! has nothing to do for this container.

use boxroll_core::{CraftAction, ItemKind, Rarity};

use crate::game::Inventory;

/// Quality is capped at 20% and rendered with one of these markers
const MAX_QUALITY_MARKERS: [&str; 3] = ["<augmented>{+20%}", "Quality: +20%", "Quality: 20%"];

/// Which action-item kinds have at least one slot available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemBudget {
    pub identify: bool,
    pub clear: bool,
    pub seed: bool,
    pub augment: bool,
    pub reroll_magic: bool,
    pub upgrade_to_rare: bool,
    pub quality: bool,
}

impl ItemBudget {
    pub fn from_inventory<I: Inventory + ?Sized>(inventory: &I) -> Self {
        let has = |kind| !inventory.items_of_kind(kind).is_empty();
        Self {
            identify: has(ItemKind::Identify),
            clear: has(ItemKind::Clear),
            seed: has(ItemKind::Seed),
            augment: has(ItemKind::Augment),
            reroll_magic: has(ItemKind::RerollMagic),
            upgrade_to_rare: has(ItemKind::UpgradeToRare),
            quality: has(ItemKind::Quality),
        }
    }
}

/// Per-decision knobs resolved from settings by the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorOptions {
    /// Take the clear-then-upgrade path instead of incremental rerolling
    pub use_clear_upgrade: bool,
    /// Spend quality items before upgrading
    pub use_quality_items: bool,
    /// Batch quality applications under a held modifier
    pub batch_quality: bool,
}

/// Whether the affix text already shows capped quality
pub fn has_max_quality(affix_lines: &[String]) -> bool {
    affix_lines
        .iter()
        .any(|line| MAX_QUALITY_MARKERS.iter().any(|m| line.contains(m)))
}

fn lone_affix_is_suffix(affix_lines: &[String]) -> bool {
    affix_lines
        .iter()
        .any(|line| line.to_lowercase().contains("suffix"))
}

/// Choose the next crafting action, or `None` if nothing applies
pub fn select_action(
    affix_lines: &[String],
    rarity: Option<Rarity>,
    budget: &ItemBudget,
    opts: &SelectorOptions,
) -> Option<CraftAction> {
    let affix_count = affix_lines.len();

    if rarity.is_none() {
        return budget.identify.then_some(CraftAction::Identify);
    }

    if opts.use_clear_upgrade {
        if affix_count > 0 && budget.clear {
            return Some(CraftAction::Clear);
        }
        if affix_count == 0
            && rarity == Some(Rarity::Plain)
            && opts.use_quality_items
            && budget.quality
            && !has_max_quality(affix_lines)
        {
            return Some(CraftAction::ImproveQuality {
                batch: opts.batch_quality,
            });
        }
        if affix_count == 0 && budget.upgrade_to_rare {
            return Some(CraftAction::UpgradeToRare);
        }
        return None;
    }

    // Incremental path
    if affix_count > 2 && budget.clear {
        return Some(CraftAction::Clear);
    }
    if affix_count == 0 && budget.seed {
        return Some(CraftAction::Seed);
    }
    if affix_count == 1 && lone_affix_is_suffix(affix_lines) && budget.augment {
        return Some(CraftAction::Augment);
    }
    budget.reroll_magic.then_some(CraftAction::RerollMagic)
}
