//! Collaborator traits for the external game surface
//!
//! The engine never owns game state. Everything it knows about containers,
//! inventory, and input comes through these traits, re-read on demand; the
//! host process provides the implementations.

use boxroll_core::{Category, ContainerId, ContainerRef, CursorMode, ItemKind, ItemRef, Rarity, Result};

/// Read-only view of the game world
pub trait GameView {
    /// Nearest unlocked container within reach, if any
    fn find_nearest_container(&self, max_distance: f32) -> Option<ContainerRef>;

    /// Ids of every container currently observed, reachable or not
    fn observed_containers(&self) -> Vec<ContainerId>;

    /// Rendered affix lines; empty when the container has none or is gone
    fn read_affixes(&self, id: ContainerId) -> Vec<String>;

    /// Observed rarity; `None` while the container is unidentified
    fn read_rarity(&self, id: ContainerId) -> Option<Rarity>;

    fn read_category(&self, id: ContainerId) -> Category;

    fn is_locked(&self, id: ContainerId) -> bool;

    /// Whether the container is still under the action cursor
    fn is_targeted(&self, id: ContainerId) -> bool;

    fn window_focused(&self) -> bool;

    fn cursor_mode(&self) -> CursorMode;
}

/// Read-only view of the consumable inventory
pub trait Inventory {
    /// Item slots of one kind, ordered by grid position (column-first), so
    /// "first available" is deterministic
    fn items_of_kind(&self, kind: ItemKind) -> Vec<ItemRef>;
}

/// Fire-and-forget input simulation
///
/// `dispatch` resolves the container's screen position itself; success means
/// the input was sent, not that the game accepted it. Outcome is always
/// verified by re-reading state afterwards.
pub trait InputDriver {
    fn dispatch(&self, item: ItemRef, target: ContainerId) -> Result<()>;

    /// Hold the auxiliary modifier (keeps the item armed across repeated uses)
    fn hold_modifier(&self) -> Result<()>;

    fn release_modifier(&self) -> Result<()>;
}

/// The full game surface the engine drives
pub trait GameSurface: GameView + Inventory + InputDriver {}

impl<T: GameView + Inventory + InputDriver> GameSurface for T {}
