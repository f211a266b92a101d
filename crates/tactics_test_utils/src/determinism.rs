//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game produces identical
//! results given identical commands and frame deltas.
//!
//! # Testing Strategy
//!
//! Sources of non-determinism the engine guards against:
//!
//! - **Floating-point math**: pixel interpolation uses
//!   [`tactics_core::math::Fixed`], grid logic is integer-only.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Units are always visited in sorted id order.
//!
//! - **Search tie-breaking**: the pathfinder expands equal-cost nodes in
//!   creation order, never in heap or hash order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tactics_core::game::GameState;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the game was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `frames` - Number of frames to advance per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one frame
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use tactics_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 frames each
///     || skirmish_game(),
///     |game| { game.update(16); },
///     |game| game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..frames {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Simplified determinism verification for [`GameState`].
///
/// Runs the game twice with identical setup, advancing `frame_ms` per
/// frame, and verifies the final state hashes match exactly.
pub fn verify_game_determinism<F>(setup_fn: F, frames: u64, frame_ms: u32) -> bool
where
    F: Fn() -> GameState,
{
    verify_determinism(
        2,
        frames,
        &setup_fn,
        |game| {
            game.update(frame_ms);
        },
        GameState::state_hash,
    )
    .is_deterministic
}

/// Compare two runs frame-by-frame, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(frame)` if they diverge
/// at that frame.
pub fn find_first_divergence<F>(setup_fn: F, frames: u64, frame_ms: u32) -> Option<u64>
where
    F: Fn() -> GameState,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for frame in 1..=frames {
        first.update(frame_ms);
        second.update(frame_ms);

        if first.state_hash() != second.state_hash() {
            tracing::warn!(frame, "Runs diverged");
            return Some(frame);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves the game exactly, and that
/// the restored game keeps evolving identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, frames: u64, frame_ms: u32) -> bool
where
    F: Fn() -> GameState,
{
    let mut game = setup_fn();
    for _ in 0..frames {
        game.update(frame_ms);
    }

    let Ok(bytes) = game.serialize() else {
        return false;
    };
    let Ok(mut restored) = GameState::deserialize(&bytes) else {
        return false;
    };

    if game.state_hash() != restored.state_hash() {
        return false;
    }

    for _ in 0..frames {
        game.update(frame_ms);
        restored.update(frame_ms);
    }
    game.state_hash() == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
