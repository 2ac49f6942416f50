//! Entity records: identifiers, kinds, and the movement trail.
//!
//! An [`Entity`] is a positioned record with a kind-specific payload and a
//! bounded trail of the positions it has occupied, newest first. The trail
//! is what the follow engine reads to place followers one tile behind the
//! leader per rank.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::geom::Point;

/// How many positions an entity's trail retains (current position included).
pub const TRAIL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// An opaque handle to a live entity.
///
/// Ids are allocated monotonically by the [`World`](crate::world::World) and
/// never recycled: removal is permanent within a session, so a removed id
/// simply stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The tagged variant over every kind of entity the grid can hold, with the
/// per-kind payload inline. Movement legality and autonomous behavior
/// dispatch on this discriminant; there is no downcasting anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Static obstacle. Blocks everyone; destructible by click.
    Rock,
    /// Obstacle that tries to fall one tile south each step. A blocked fall
    /// is skipped -- no bounce, no destruction.
    FallingRock,
    /// Non-movable blocker others must avoid. No autonomous behavior.
    Hazard,
    /// Collectible bonus worth a fixed point value.
    Pickup { points: u32 },
    /// The delivery marker. Exactly one per game.
    Home,
    /// A searchable target. `fast` strays wander more eagerly while missing;
    /// `boredom` counts ticks spent following the player.
    Stray { points: u32, fast: bool, boredom: u32 },
    /// The controlled entity. At most one may be registered.
    Player,
}

impl EntityKind {
    /// Whether this is the controlled entity.
    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player)
    }

    /// Whether this is a searchable target.
    #[inline]
    pub fn is_stray(&self) -> bool {
        matches!(self, EntityKind::Stray { .. })
    }

    /// Whether this kind blocks every mover, the player included.
    #[inline]
    pub fn blocks_all(&self) -> bool {
        matches!(
            self,
            EntityKind::Rock | EntityKind::FallingRock | EntityKind::Hazard
        )
    }

    /// Whether a click on this entity's tile destroys it.
    #[inline]
    pub fn is_destructible(&self) -> bool {
        matches!(self, EntityKind::Rock | EntityKind::FallingRock)
    }

    /// Short name for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Rock => "rock",
            EntityKind::FallingRock => "falling_rock",
            EntityKind::Hazard => "hazard",
            EntityKind::Pickup { .. } => "pickup",
            EntityKind::Home => "home",
            EntityKind::Stray { .. } => "stray",
            EntityKind::Player => "player",
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A live, positioned entity.
///
/// The position is only mutable through the world so that every move feeds
/// the trail; external code reads state and, for payload fields like
/// boredom, mutates through [`kind_mut`](Entity::kind_mut).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    pos: Point,
    /// Positions occupied, newest first; front is the current position.
    trail: VecDeque<Point>,
}

impl Entity {
    /// Build an entity at its spawn position. The trail starts seeded with
    /// that position so followers can trail a leader that has just spawned.
    pub fn new(id: EntityId, kind: EntityKind, pos: Point) -> Self {
        let mut trail = VecDeque::with_capacity(TRAIL_CAPACITY);
        trail.push_front(pos);
        Self {
            id,
            kind,
            pos,
            trail,
        }
    }

    /// This entity's id.
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The kind discriminant and payload.
    #[inline]
    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Mutable payload access (boredom bookkeeping and the like). The kind
    /// discriminant itself is not expected to change after spawn.
    #[inline]
    pub fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    /// Current position.
    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// The movement trail, newest first. `trail()[0]` is the current
    /// position; `trail()[1]` is one step behind, and so on, up to
    /// [`TRAIL_CAPACITY`] entries.
    #[inline]
    pub fn trail(&self) -> &VecDeque<Point> {
        &self.trail
    }

    /// Move the entity, pushing the new position onto the trail and evicting
    /// the oldest entry past capacity.
    pub(crate) fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
        self.trail.push_front(pos);
        self.trail.truncate(TRAIL_CAPACITY);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
