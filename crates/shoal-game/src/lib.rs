//! Shoal Game -- turn-based herding over a [`shoal_world`] grid.
//!
//! The [`Game`](game::Game) drives one discrete tick at a time: the player
//! interacts with whatever shares its tile, missing strays wander, found
//! strays trail the player along its movement history and eventually get
//! bored, pickups appear, falling rocks fall. Strays move between three
//! category lists -- *missing*, *found*, and *safe* -- and score accrues
//! when a found stray is delivered to the home tile.
//!
//! All randomness flows from one seeded [`rand_pcg::Pcg64`]: the same seed
//! and the same command sequence reproduce the same game, tick for tick,
//! which [`Game::state_hash`](game::Game::state_hash) makes checkable.
//!
//! # Quick Start
//!
//! ```
//! use shoal_game::prelude::*;
//!
//! let mut game = Game::new(GameConfig::default(), 42).unwrap();
//! assert!(!game.game_over());
//!
//! game.move_player(Direction::East);
//! let report = game.tick();
//! assert_eq!(game.tick_count(), 1);
//! assert!(report.score_delta <= game.score());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod game;
pub mod snapshot;

/// Re-export the world crate for convenience.
pub use shoal_world;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::game::{Game, TickReport};
    pub use crate::snapshot::{EntityView, GameSnapshot};
    pub use shoal_world::prelude::*;
}
