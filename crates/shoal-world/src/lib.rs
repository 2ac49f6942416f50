//! Shoal World -- bounded tile-grid world model with trail-based following.
//!
//! This crate provides the spatial core of the shoal simulation: a bounded
//! 2D grid that owns every live entity, answers spatial queries, enforces
//! movement legality, places entities on random free tiles, and repositions
//! followers along a leader's movement trail.
//!
//! Randomness is always injected: any operation that samples takes
//! `&mut impl Rng`, so a seeded generator reproduces a world exactly.
//!
//! # Quick Start
//!
//! ```
//! use shoal_world::prelude::*;
//!
//! let mut world = World::new(8, 6);
//! let rock = world.spawn_at(EntityKind::Rock, Point::new(3, 3)).unwrap();
//! let player = world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
//!
//! assert_eq!(world.find(3, 3), vec![rock]);
//! // Nobody may enter the rock's tile, not even the player.
//! assert!(!world.can_move(player, 3, 3));
//! assert!(world.try_move(player, Direction::East));
//! assert_eq!(world.get(player).unwrap().pos(), Point::new(1, 0));
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod follow;
pub mod geom;
pub mod world;

use entity::EntityId;
use geom::Point;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by world operations.
///
/// Registration misuse is a programmer error and is reported, never silently
/// recovered; a full grid is an environmental condition that spawn sites are
/// expected to handle by skipping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The entity is already in the live set.
    #[error("entity {id} is already registered")]
    DuplicateRegistration { id: EntityId },

    /// The entity is not in the live set (never registered, or removed).
    #[error("entity {id} is not registered")]
    NotRegistered { id: EntityId },

    /// A placement would violate the bounds invariant.
    #[error("position {pos} is outside the {width}x{height} grid")]
    OutOfBounds { pos: Point, width: u32, height: u32 },

    /// Every tile is occupied; there is nowhere left to place anything.
    #[error("no free tile left on the {width}x{height} grid")]
    WorldFull { width: u32, height: u32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::{Entity, EntityId, EntityKind, TRAIL_CAPACITY};
    pub use crate::follow::objects_follow;
    pub use crate::geom::{Direction, Point};
    pub use crate::world::World;
    pub use crate::WorldError;
}
