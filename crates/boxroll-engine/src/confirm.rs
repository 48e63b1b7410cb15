//! Change confirmation
//!
//! Dispatched input is fire-and-forget, so the only way to know an action
//! landed is to watch the affix text change. Polling is bounded: a change is
//! reported as soon as it appears, and the wait gives up after the full
//! window with one final compare, so a change surfacing at the boundary is
//! still observed.
//!
//! The game re-renders affix lines in unstable order, so comparison is
//! order-insensitive; a reordering alone is not a change.

use std::time::Duration;

use tracing::trace;

use boxroll_core::ContainerId;

use crate::game::GameView;

/// Total confirmation window
pub const CONFIRM_TIMEOUT: Duration = Duration::from_millis(200);

/// Interval between re-reads
pub const CONFIRM_POLL: Duration = Duration::from_millis(10);

fn sorted(lines: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = lines.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

/// Wait for the container's affix lines to differ from `before`
///
/// Returns true as soon as a difference is observed, false after the full
/// window passes without one.
pub async fn wait_for_change<G: GameView + ?Sized>(
    game: &G,
    id: ContainerId,
    before: &[String],
) -> bool {
    let before_sorted: Vec<String> = sorted(before).into_iter().map(str::to_string).collect();
    let mut elapsed = Duration::ZERO;

    loop {
        let current = game.read_affixes(id);
        if sorted(&current) != before_sorted {
            trace!(%id, ?elapsed, "affix change observed");
            return true;
        }
        if elapsed >= CONFIRM_TIMEOUT {
            trace!(%id, "no affix change within confirmation window");
            return false;
        }
        tokio::time::sleep(CONFIRM_POLL).await;
        elapsed += CONFIRM_POLL;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use boxroll_core::{Category, ContainerRef, CursorMode, Rarity};

    /// Scripted affix reads: each call pops the next snapshot, and the last
    /// one repeats
    struct ScriptedView {
        reads: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedView {
        fn new(reads: Vec<Vec<String>>) -> Self {
            Self {
                reads: Mutex::new(reads),
            }
        }
    }

    impl GameView for ScriptedView {
        fn find_nearest_container(&self, _max_distance: f32) -> Option<ContainerRef> {
            None
        }
        fn observed_containers(&self) -> Vec<ContainerId> {
            vec![]
        }
        fn read_affixes(&self, _id: ContainerId) -> Vec<String> {
            let mut reads = self.reads.lock().unwrap();
            if reads.len() > 1 {
                reads.remove(0)
            } else {
                reads[0].clone()
            }
        }
        fn read_rarity(&self, _id: ContainerId) -> Option<Rarity> {
            Some(Rarity::Plain)
        }
        fn read_category(&self, _id: ContainerId) -> Category {
            Category::Regular
        }
        fn is_locked(&self, _id: ContainerId) -> bool {
            false
        }
        fn is_targeted(&self, _id: ContainerId) -> bool {
            true
        }
        fn window_focused(&self) -> bool {
            true
        }
        fn cursor_mode(&self) -> CursorMode {
            CursorMode::Free
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_change_returns_true_without_waiting() {
        let game = ScriptedView::new(vec![lines(&["new affix"])]);
        let before = lines(&["old affix"]);
        let start = tokio::time::Instant::now();
        assert!(wait_for_change(&game, ContainerId(1), &before).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_change_times_out_after_window() {
        let before = lines(&["same affix"]);
        let game = ScriptedView::new(vec![before.clone()]);
        let start = tokio::time::Instant::now();
        assert!(!wait_for_change(&game, ContainerId(1), &before).await);
        assert_eq!(start.elapsed(), CONFIRM_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_on_final_poll_is_observed() {
        // 20 unchanged reads fill polls 0..=190ms; the change lands exactly
        // on the final compare at 200ms
        let before = lines(&["same affix"]);
        let mut reads = vec![before.clone(); 20];
        reads.push(lines(&["changed affix"]));
        let game = ScriptedView::new(reads);
        assert!(wait_for_change(&game, ContainerId(1), &before).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reordering_alone_is_not_a_change() {
        let before = lines(&["first affix", "second affix"]);
        let game = ScriptedView::new(vec![lines(&["second affix", "first affix"])]);
        assert!(!wait_for_change(&game, ContainerId(1), &before).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_window_change_returns_early() {
        let before = lines(&["same affix"]);
        let mut reads = vec![before.clone(); 5];
        reads.push(lines(&["changed affix"]));
        let game = ScriptedView::new(reads);
        let start = tokio::time::Instant::now();
        assert!(wait_for_change(&game, ContainerId(1), &before).await);
        assert_eq!(start.elapsed(), CONFIRM_POLL * 5);
    }
}
