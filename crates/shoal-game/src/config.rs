//! Game configuration.

use serde::{Deserialize, Serialize};

/// Tuning knobs for a game. `Default` is the standard board.
///
/// Probabilities are per tick (or per spawn, for the ratios) and must lie
/// in `[0, 1]`; [`validate`](GameConfig::validate) enforces that along with
/// positive grid dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid width in tiles.
    pub width: u32,
    /// Grid height in tiles.
    pub height: u32,
    /// How many rocks to scatter at setup.
    pub rock_count: u32,
    /// Chance that a scattered rock is a falling rock.
    pub falling_rock_ratio: f64,
    /// How many hazards to scatter at setup.
    pub hazard_count: u32,
    /// How many strays to hide at setup.
    pub stray_count: u32,
    /// Chance that a stray is the fast, hard-to-catch variant.
    pub fast_ratio: f64,
    /// Per-tick wander chance for a fast missing stray.
    pub p_fast: f64,
    /// Per-tick wander chance for an ordinary missing stray.
    pub p_slow: f64,
    /// Ticks a follower endures before boredom can set in.
    pub attention_span: u32,
    /// Per-tick chance that a bored follower wanders back off.
    pub wander_off_chance: f64,
    /// Per-tick chance of a pickup appearing somewhere free.
    pub pickup_chance: f64,
    /// Point value of a spawned pickup.
    pub pickup_points: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 10,
            rock_count: 10,
            falling_rock_ratio: 0.5,
            hazard_count: 1,
            stray_count: 10,
            fast_ratio: 0.2,
            p_fast: 0.8,
            p_slow: 0.3,
            attention_span: 20,
            wander_off_chance: 0.05,
            pickup_chance: 0.03,
            pickup_points: 5,
        }
    }
}

impl GameConfig {
    /// Check the configuration is usable.
    ///
    /// # Panics
    ///
    /// Panics on zero grid dimensions or on any probability outside
    /// `[0, 1]` -- a broken config is a programming error, not a runtime
    /// condition.
    pub fn validate(&self) {
        assert!(
            self.width > 0 && self.height > 0,
            "grid dimensions must be positive, got {}x{}",
            self.width,
            self.height
        );
        for (name, p) in [
            ("falling_rock_ratio", self.falling_rock_ratio),
            ("fast_ratio", self.fast_ratio),
            ("p_fast", self.p_fast),
            ("p_slow", self.p_slow),
            ("wander_off_chance", self.wander_off_chance),
            ("pickup_chance", self.pickup_chance),
        ] {
            assert!(
                (0.0..=1.0).contains(&p),
                "{name} must be a probability in [0, 1], got {p}"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
