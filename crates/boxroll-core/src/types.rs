//! Core type definitions for the crafting engine

use serde::{Deserialize, Serialize};

/// Container category with an independent desirability policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Regular,
    Arcanist,
    Diviner,
    Cartographer,
}

impl Category {
    /// All categories, in policy order
    pub const ALL: [Category; 4] = [
        Category::Regular,
        Category::Arcanist,
        Category::Diviner,
        Category::Cartographer,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Arcanist => write!(f, "arcanist"),
            Self::Diviner => write!(f, "diviner"),
            Self::Cartographer => write!(f, "cartographer"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "arcanist" => Ok(Self::Arcanist),
            "diviner" => Ok(Self::Diviner),
            "cartographer" | "cartog" => Ok(Self::Cartographer),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

/// Rarity tier of an identified container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Plain,
    Magic,
    Rare,
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Magic => write!(f, "magic"),
            Self::Rare => write!(f, "rare"),
        }
    }
}

/// Opaque handle for an externally-owned container
///
/// The engine never persists these; they are only valid for as long as the
/// game surface keeps reporting the container as observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub u64);

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "box-{}", self.0)
    }
}

/// Screen-space bounding rectangle of a container label
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A container as observed on a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRef {
    pub id: ContainerId,
    pub rect: ScreenRect,
    /// Distance from the observer, in game units
    pub distance: f32,
}

/// Kinds of consumable action-items the selector can spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Reveals an unidentified container
    Identify,
    /// Removes all affixes
    Clear,
    /// Plain -> Magic with one random affix
    Seed,
    /// Adds a second affix to a one-affix magic container
    Augment,
    /// Rerolls the affixes of a magic container
    RerollMagic,
    /// Plain -> Rare with a full affix set
    UpgradeToRare,
    /// Improves quality on a plain container (batchable)
    Quality,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Identify,
        ItemKind::Clear,
        ItemKind::Seed,
        ItemKind::Augment,
        ItemKind::RerollMagic,
        ItemKind::UpgradeToRare,
        ItemKind::Quality,
    ];
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identify => write!(f, "identify"),
            Self::Clear => write!(f, "clear"),
            Self::Seed => write!(f, "seed"),
            Self::Augment => write!(f, "augment"),
            Self::RerollMagic => write!(f, "reroll_magic"),
            Self::UpgradeToRare => write!(f, "upgrade_to_rare"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// An action-item slot in the external inventory
///
/// Grid position is carried so "first available" selection is deterministic:
/// slots are ordered column-first, matching the inventory query contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub grid_x: u8,
    pub grid_y: u8,
}

impl ItemRef {
    pub fn new(kind: ItemKind, grid_x: u8, grid_y: u8) -> Self {
        Self { kind, grid_x, grid_y }
    }
}

/// Next crafting action chosen by the decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftAction {
    Identify,
    Clear,
    Seed,
    Augment,
    RerollMagic,
    UpgradeToRare,
    ImproveQuality {
        /// Apply repeatedly under a held modifier (fast-apply batch)
        batch: bool,
    },
}

impl CraftAction {
    /// The item kind this action consumes
    pub fn item_kind(&self) -> ItemKind {
        match self {
            Self::Identify => ItemKind::Identify,
            Self::Clear => ItemKind::Clear,
            Self::Seed => ItemKind::Seed,
            Self::Augment => ItemKind::Augment,
            Self::RerollMagic => ItemKind::RerollMagic,
            Self::UpgradeToRare => ItemKind::UpgradeToRare,
            Self::ImproveQuality { .. } => ItemKind::Quality,
        }
    }
}

impl std::fmt::Display for CraftAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImproveQuality { batch: true } => write!(f, "improve_quality (batch)"),
            Self::ImproveQuality { batch: false } => write!(f, "improve_quality"),
            other => write!(f, "{}", other.item_kind()),
        }
    }
}

/// Observed state of the action cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// No item on the cursor
    Free,
    /// An action-item is armed and will be consumed by the next click
    UseItem,
    /// Anything else (drag, unknown)
    Other,
}
