//! Fast-apply batch mode
//!
//! Quality items can be applied repeatedly while an auxiliary modifier is
//! held, skipping the pick-up-item round trip between uses. The modifier is
//! a held key on the user's machine, so it must be released on every exit
//! path; an RAII guard guarantees exactly one release even when the batch
//! body panics.

use std::time::Duration;

use tracing::{debug, warn};

use boxroll_core::{ContainerId, CursorMode, ItemKind, Rarity, Result};

use crate::confirm::wait_for_change;
use crate::game::{GameSurface, InputDriver};
use crate::selector::has_max_quality;

/// Upper bound on applications per batch
pub const MAX_APPLICATIONS: usize = 4;

/// Holds the auxiliary modifier for the lifetime of the guard
pub struct ModifierGuard<'a, D: InputDriver + ?Sized> {
    driver: &'a D,
    released: bool,
}

impl<'a, D: InputDriver + ?Sized> ModifierGuard<'a, D> {
    pub fn hold(driver: &'a D) -> Result<Self> {
        driver.hold_modifier()?;
        Ok(Self {
            driver,
            released: false,
        })
    }

    /// Release the modifier now instead of at drop
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.driver.release_modifier() {
            warn!(error = %e, "failed to release modifier");
        }
    }
}

impl<D: InputDriver + ?Sized> Drop for ModifierGuard<'_, D> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Apply up to [`MAX_APPLICATIONS`] quality items under a held modifier
///
/// Preconditions (checked by the caller): rarity Plain, quality not capped,
/// batching enabled. Each application is confirmed before the next; the
/// batch stops early when an application does not land, quality caps out,
/// rarity leaves Plain, or targeting or the action cursor is lost.
///
/// Returns the number of applications that landed.
pub async fn run_batch<G: GameSurface + ?Sized>(
    game: &G,
    id: ContainerId,
    delay: Duration,
) -> Result<usize> {
    let mut guard = ModifierGuard::hold(game)?;
    let mut applied = 0;

    while applied < MAX_APPLICATIONS {
        let Some(item) = game.items_of_kind(ItemKind::Quality).first().copied() else {
            debug!("batch stopped: no quality items left");
            break;
        };

        let before = game.read_affixes(id);
        game.dispatch(item, id)?;
        tokio::time::sleep(delay).await;

        if !wait_for_change(game, id, &before).await {
            debug!(applied, "batch stopped: application did not land");
            break;
        }
        applied += 1;

        if has_max_quality(&game.read_affixes(id)) {
            debug!(applied, "batch stopped: quality capped");
            break;
        }
        if game.read_rarity(id) != Some(Rarity::Plain) {
            debug!(applied, "batch stopped: rarity changed");
            break;
        }
        if !game.is_targeted(id) {
            debug!(applied, "batch stopped: target lost");
            break;
        }
        if game.cursor_mode() != CursorMode::UseItem {
            debug!(applied, "batch stopped: action cursor lost");
            break;
        }
    }

    guard.release();
    Ok(applied)
}
