//! Trail-following: reposition an ordered list of followers along a
//! leader's movement trail.
//!
//! The leader's trail holds every position it has occupied, newest first,
//! with the current position at the front. Follower `i` is placed at trail
//! index `i + 1` -- one tile behind the leader per rank, never on the
//! leader's own tile. Followers beyond the recorded trail keep their
//! current position for this call; a longer trail picks them up on later
//! ticks.

use crate::entity::EntityId;
use crate::geom::Point;
use crate::world::World;

/// Reposition `followers`, in list order, along `leader`'s trail.
///
/// Stateless: everything it needs is in the leader's entity record. Moves
/// go through the world's ordinary position mutation, so followers' own
/// trails stay truthful (anything could in turn follow a follower).
///
/// A dead leader or an empty follower list is a no-op. Follower ids that
/// no longer resolve are skipped.
pub fn objects_follow(world: &mut World, leader: EntityId, followers: &[EntityId]) {
    let trail: Vec<Point> = match world.get(leader) {
        Some(e) => e.trail().iter().copied().collect(),
        None => return,
    };
    for (rank, &follower) in followers.iter().enumerate() {
        let Some(&behind) = trail.get(rank + 1) else {
            // Ran out of recorded history; deeper ranks stay where they are.
            break;
        };
        world.set_position(follower, behind);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
