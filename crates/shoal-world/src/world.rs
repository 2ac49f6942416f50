//! The bounded grid world: entity registry, spatial queries, movement
//! legality, random placement, and autonomous stepping.
//!
//! The [`World`] is the authoritative owner of every live entity. The
//! registry is an insertion-ordered list, so iteration order is stable
//! within a tick and every tie-break is deterministic. Placement sampling
//! is enumerate-and-subtract -- all `W*H` tiles minus the occupied ones --
//! so it terminates even on a nearly-full grid instead of rejection
//! sampling forever.

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::entity::{Entity, EntityId, EntityKind};
use crate::geom::{Direction, Point};
use crate::WorldError;

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A bounded 2D tile grid holding the live entity set.
///
/// Invariants:
/// - every live entity's position lies in `[0, width) x [0, height)`;
/// - no entity id appears twice;
/// - at most one [`EntityKind::Player`] is registered.
#[derive(Debug, Clone)]
pub struct World {
    width: u32,
    height: u32,
    /// Live entities in registration order.
    entities: Vec<Entity>,
    /// Next id to hand out. Ids are never recycled.
    next_id: u64,
}

impl World {
    /// Create an empty world of the given size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            width > 0 && height > 0,
            "world dimensions must be positive, got {width}x{height}"
        );
        Self {
            width,
            height,
            entities: Vec::new(),
            next_id: 0,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Grid width in tiles.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of tiles.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only view of every live entity, in registration order.
    ///
    /// This is the render handoff: the slice borrow makes mutation through
    /// it structurally impossible.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up a live entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    /// Mutable lookup. Position stays untouchable from outside this crate;
    /// this exists for payload mutation (e.g. a stray's boredom counter).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i])
    }

    /// Whether `id` refers to a live entity.
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id() == id)
    }

    /// Whether a tile lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    // -- spatial queries ----------------------------------------------------

    /// Every live entity at the tile, in registration order. Empty if the
    /// tile is free (or out of bounds).
    pub fn find(&self, x: i32, y: i32) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.pos().x == x && e.pos().y == y)
            .map(Entity::id)
            .collect()
    }

    /// Every live entity on `id`'s own tile, the queried entity included.
    /// Callers interested in neighbors filter `id` back out.
    pub fn find_same_cell(&self, id: EntityId) -> Vec<EntityId> {
        match self.get(id) {
            Some(e) => self.find(e.pos().x, e.pos().y),
            None => Vec::new(),
        }
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate a fresh id for an entity that will be registered here.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity to the live set.
    ///
    /// # Errors
    ///
    /// [`WorldError::DuplicateRegistration`] if the id is already live, and
    /// [`WorldError::OutOfBounds`] if the position violates the bounds
    /// invariant.
    ///
    /// # Panics
    ///
    /// Registering a second player is corrupted setup and panics.
    pub fn register(&mut self, entity: Entity) -> Result<EntityId, WorldError> {
        let id = entity.id();
        if self.contains(id) {
            return Err(WorldError::DuplicateRegistration { id });
        }
        let pos = entity.pos();
        if !self.in_bounds(pos.x, pos.y) {
            return Err(WorldError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            });
        }
        if entity.kind().is_player() {
            assert!(
                !self.entities.iter().any(|e| e.kind().is_player()),
                "a player is already registered; only one may exist"
            );
        }
        debug!(%id, kind = entity.kind().label(), %pos, "register");
        self.entities.push(entity);
        Ok(id)
    }

    /// Allocate an id, build the entity, and register it at `pos`.
    pub fn spawn_at(&mut self, kind: EntityKind, pos: Point) -> Result<EntityId, WorldError> {
        let id = self.allocate_id();
        self.register(Entity::new(id, kind, pos))
    }

    /// Delete an entity from the live set, returning its final record.
    ///
    /// # Errors
    ///
    /// [`WorldError::NotRegistered`] if the id is not live -- removing the
    /// same entity twice signals an entity-count desync, not a no-op.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, WorldError> {
        let index = self
            .index_of(id)
            .ok_or(WorldError::NotRegistered { id })?;
        let entity = self.entities.remove(index);
        debug!(%id, kind = entity.kind().label(), "remove");
        Ok(entity)
    }

    // -- random placement ---------------------------------------------------

    /// Uniformly sample one tile not occupied by any live entity.
    ///
    /// Enumerates all tiles and subtracts the occupied set, then samples
    /// from the remainder: bounded work, guaranteed termination.
    ///
    /// # Errors
    ///
    /// [`WorldError::WorldFull`] if no tile is free.
    pub fn pick_unused_space(&self, rng: &mut impl Rng) -> Result<Point, WorldError> {
        let occupied: HashSet<Point> = self.entities.iter().map(Entity::pos).collect();
        let mut free = Vec::with_capacity(self.tile_count().saturating_sub(occupied.len()));
        for x in 0..self.width as i32 {
            for y in 0..self.height as i32 {
                let p = Point::new(x, y);
                if !occupied.contains(&p) {
                    free.push(p);
                }
            }
        }
        if free.is_empty() {
            return Err(WorldError::WorldFull {
                width: self.width,
                height: self.height,
            });
        }
        Ok(free[rng.gen_range(0..free.len())])
    }

    /// Place a new entity of `kind` on a random free tile.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::WorldFull`] from the tile sample.
    ///
    /// # Panics
    ///
    /// Panics if the world does not report the new entity at its own tile
    /// afterwards -- that would mean the registry is corrupted.
    pub fn insert_randomly(
        &mut self,
        kind: EntityKind,
        rng: &mut impl Rng,
    ) -> Result<EntityId, WorldError> {
        let pos = self.pick_unused_space(rng)?;
        let id = self.spawn_at(kind, pos)?;
        assert!(
            self.find(pos.x, pos.y).contains(&id),
            "placement self-check failed: {id} not found at its own tile {pos}"
        );
        Ok(id)
    }

    // -- movement -----------------------------------------------------------

    /// Whether `requester` may move onto the tile `(x, y)`.
    ///
    /// False outside the grid; false if any occupant is a rock, falling
    /// rock, or hazard; false if any occupant is a stray and the requester
    /// is not the player (only the player may catch a stray by stepping on
    /// it). A `false` here is the normal rejection path, never an error.
    pub fn can_move(&self, requester: EntityId, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let requester_is_player = self
            .get(requester)
            .map_or(false, |e| e.kind().is_player());
        for id in self.find(x, y) {
            let Some(occupant) = self.get(id) else { continue };
            if occupant.kind().blocks_all() {
                return false;
            }
            if occupant.kind().is_stray() && !requester_is_player {
                return false;
            }
        }
        true
    }

    /// Attempt one step in `dir`, gated by [`can_move`](Self::can_move).
    /// Returns whether the move applied. Unknown ids simply fail.
    pub fn try_move(&mut self, id: EntityId, dir: Direction) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let target = entity.pos().step(dir);
        if !self.can_move(id, target.x, target.y) {
            return false;
        }
        self.set_position(id, target)
    }

    /// Reposition an entity directly, feeding its trail. Used by the follow
    /// engine, which places followers on tiles the leader already proved
    /// reachable. Returns `false` for unknown ids.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the grid; direct repositioning must not
    /// break the bounds invariant.
    pub fn set_position(&mut self, id: EntityId, pos: Point) -> bool {
        assert!(
            self.in_bounds(pos.x, pos.y),
            "set_position {pos} is outside the {}x{} grid",
            self.width,
            self.height
        );
        match self.index_of(id) {
            Some(i) => {
                self.entities[i].set_pos(pos);
                true
            }
            None => false,
        }
    }

    // -- autonomous stepping ------------------------------------------------

    /// Run every entity's autonomous behavior once, in registration order.
    ///
    /// Falling rocks attempt to fall one tile south, staying put when
    /// blocked; every other kind is inert here (the player moves only by
    /// command, strays are driven by game-level wander logic).
    pub fn step_all(&mut self) {
        let movers: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|e| matches!(e.kind(), EntityKind::FallingRock))
            .map(Entity::id)
            .collect();
        for id in movers {
            let Some(entity) = self.get(id) else { continue };
            let target = entity.pos().step(Direction::South);
            if self.can_move(id, target.x, target.y) {
                self.set_position(id, target);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn rng() -> Pcg64 {
        Pcg64::seed_from_u64(7)
    }

    fn stray() -> EntityKind {
        EntityKind::Stray {
            points: 10,
            fast: false,
            boredom: 0,
        }
    }

    // -- 1. Registry lifecycle ----------------------------------------------

    #[test]
    fn register_and_find() {
        let mut world = World::new(5, 5);
        let a = world.spawn_at(EntityKind::Rock, Point::new(1, 1)).unwrap();
        let b = world.spawn_at(EntityKind::Home, Point::new(1, 1)).unwrap();
        let c = world.spawn_at(EntityKind::Rock, Point::new(2, 2)).unwrap();

        // Registration order is query order.
        assert_eq!(world.find(1, 1), vec![a, b]);
        assert_eq!(world.find(2, 2), vec![c]);
        assert_eq!(world.find(0, 0), Vec::<EntityId>::new());
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut world = World::new(5, 5);
        let id = world.allocate_id();
        world
            .register(Entity::new(id, EntityKind::Rock, Point::new(0, 0)))
            .unwrap();
        let err = world
            .register(Entity::new(id, EntityKind::Rock, Point::new(1, 1)))
            .unwrap_err();
        assert_eq!(err, WorldError::DuplicateRegistration { id });
    }

    #[test]
    fn out_of_bounds_registration_is_an_error() {
        let mut world = World::new(3, 3);
        let err = world
            .spawn_at(EntityKind::Rock, Point::new(3, 0))
            .unwrap_err();
        assert!(matches!(err, WorldError::OutOfBounds { .. }));
    }

    #[test]
    #[should_panic(expected = "only one may exist")]
    fn second_player_panics() {
        let mut world = World::new(5, 5);
        world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
        let _ = world.spawn_at(EntityKind::Player, Point::new(1, 1));
    }

    #[test]
    fn remove_twice_is_an_error() {
        let mut world = World::new(5, 5);
        let id = world.spawn_at(EntityKind::Rock, Point::new(0, 0)).unwrap();
        world.remove(id).unwrap();
        assert_eq!(world.remove(id).unwrap_err(), WorldError::NotRegistered { id });
        assert!(!world.contains(id));
    }

    #[test]
    fn find_same_cell_includes_self() {
        let mut world = World::new(5, 5);
        let a = world.spawn_at(EntityKind::Home, Point::new(2, 2)).unwrap();
        let b = world.spawn_at(stray(), Point::new(2, 2)).unwrap();
        assert_eq!(world.find_same_cell(a), vec![a, b]);
        assert_eq!(world.find_same_cell(b), vec![a, b]);
    }

    // -- 2. Random placement ------------------------------------------------

    #[test]
    fn pick_unused_space_avoids_occupied_tiles() {
        let mut world = World::new(3, 3);
        let mut rng = rng();
        // Occupy all but one tile.
        for x in 0..3 {
            for y in 0..3 {
                if (x, y) != (2, 2) {
                    world.spawn_at(EntityKind::Rock, Point::new(x, y)).unwrap();
                }
            }
        }
        for _ in 0..20 {
            assert_eq!(world.pick_unused_space(&mut rng).unwrap(), Point::new(2, 2));
        }
    }

    #[test]
    fn pick_unused_space_on_full_world_is_world_full() {
        let mut world = World::new(2, 2);
        let mut rng = rng();
        for x in 0..2 {
            for y in 0..2 {
                world.spawn_at(EntityKind::Rock, Point::new(x, y)).unwrap();
            }
        }
        assert_eq!(
            world.pick_unused_space(&mut rng).unwrap_err(),
            WorldError::WorldFull {
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn insert_randomly_lands_in_bounds_on_a_free_tile() {
        let mut world = World::new(4, 4);
        let mut rng = rng();
        for _ in 0..10 {
            let id = world.insert_randomly(EntityKind::Rock, &mut rng).unwrap();
            let pos = world.get(id).unwrap().pos();
            assert!(world.in_bounds(pos.x, pos.y));
            // The new entity is alone on its tile.
            assert_eq!(world.find(pos.x, pos.y), vec![id]);
        }
    }

    // -- 3. Movement legality -----------------------------------------------

    #[test]
    fn can_move_rejects_out_of_bounds() {
        let mut world = World::new(3, 3);
        let p = world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
        assert!(!world.can_move(p, -1, 0));
        assert!(!world.can_move(p, 0, -1));
        assert!(!world.can_move(p, 3, 0));
        assert!(!world.can_move(p, 0, 3));
        assert!(world.can_move(p, 2, 2));
    }

    #[test]
    fn obstacles_and_hazards_block_everyone() {
        let mut world = World::new(5, 5);
        let player = world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
        let wanderer = world.spawn_at(stray(), Point::new(4, 4)).unwrap();
        world.spawn_at(EntityKind::Rock, Point::new(1, 0)).unwrap();
        world.spawn_at(EntityKind::FallingRock, Point::new(2, 0)).unwrap();
        world.spawn_at(EntityKind::Hazard, Point::new(3, 0)).unwrap();

        for x in 1..=3 {
            assert!(!world.can_move(player, x, 0), "player blocked at ({x}, 0)");
            assert!(!world.can_move(wanderer, x, 0), "stray blocked at ({x}, 0)");
        }
    }

    #[test]
    fn only_the_player_may_step_onto_a_stray() {
        let mut world = World::new(5, 5);
        let player = world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
        let other = world.spawn_at(stray(), Point::new(4, 4)).unwrap();
        world.spawn_at(stray(), Point::new(2, 2)).unwrap();

        assert!(world.can_move(player, 2, 2));
        assert!(!world.can_move(other, 2, 2));
    }

    #[test]
    fn home_and_pickup_tiles_are_open_to_all() {
        let mut world = World::new(5, 5);
        let wanderer = world.spawn_at(stray(), Point::new(0, 0)).unwrap();
        world.spawn_at(EntityKind::Home, Point::new(1, 0)).unwrap();
        world
            .spawn_at(EntityKind::Pickup { points: 5 }, Point::new(2, 0))
            .unwrap();
        assert!(world.can_move(wanderer, 1, 0));
        assert!(world.can_move(wanderer, 2, 0));
    }

    #[test]
    fn try_move_applies_and_feeds_the_trail() {
        let mut world = World::new(5, 5);
        let p = world.spawn_at(EntityKind::Player, Point::new(1, 1)).unwrap();
        assert!(world.try_move(p, Direction::East));
        assert!(world.try_move(p, Direction::South));
        let e = world.get(p).unwrap();
        assert_eq!(e.pos(), Point::new(2, 2));
        let trail: Vec<Point> = e.trail().iter().copied().collect();
        assert_eq!(
            trail,
            vec![Point::new(2, 2), Point::new(2, 1), Point::new(1, 1)]
        );
    }

    #[test]
    fn blocked_try_move_leaves_position_and_trail_alone() {
        let mut world = World::new(5, 5);
        let p = world.spawn_at(EntityKind::Player, Point::new(0, 0)).unwrap();
        world.spawn_at(EntityKind::Rock, Point::new(1, 0)).unwrap();
        assert!(!world.try_move(p, Direction::East));
        assert!(!world.try_move(p, Direction::West)); // out of bounds
        let e = world.get(p).unwrap();
        assert_eq!(e.pos(), Point::new(0, 0));
        assert_eq!(e.trail().len(), 1);
    }

    // -- 4. Autonomous stepping ---------------------------------------------

    #[test]
    fn falling_rock_falls_until_the_floor() {
        let mut world = World::new(3, 4);
        let rock = world
            .spawn_at(EntityKind::FallingRock, Point::new(1, 0))
            .unwrap();
        for expected_y in 1..4 {
            world.step_all();
            assert_eq!(world.get(rock).unwrap().pos(), Point::new(1, expected_y));
        }
        // At the floor: further steps are no-ops.
        world.step_all();
        assert_eq!(world.get(rock).unwrap().pos(), Point::new(1, 3));
    }

    #[test]
    fn falling_rock_blocked_by_obstacle_below() {
        let mut world = World::new(3, 4);
        let rock = world
            .spawn_at(EntityKind::FallingRock, Point::new(1, 0))
            .unwrap();
        world.spawn_at(EntityKind::Rock, Point::new(1, 1)).unwrap();
        world.step_all();
        assert_eq!(world.get(rock).unwrap().pos(), Point::new(1, 0));
    }

    #[test]
    fn static_kinds_do_not_move_on_step_all() {
        let mut world = World::new(4, 4);
        let ids = [
            world.spawn_at(EntityKind::Rock, Point::new(0, 0)).unwrap(),
            world.spawn_at(EntityKind::Hazard, Point::new(1, 0)).unwrap(),
            world.spawn_at(EntityKind::Home, Point::new(2, 0)).unwrap(),
            world.spawn_at(stray(), Point::new(3, 0)).unwrap(),
            world.spawn_at(EntityKind::Player, Point::new(0, 1)).unwrap(),
        ];
        let before: Vec<Point> = ids.iter().map(|&id| world.get(id).unwrap().pos()).collect();
        world.step_all();
        let after: Vec<Point> = ids.iter().map(|&id| world.get(id).unwrap().pos()).collect();
        assert_eq!(before, after);
    }
}
