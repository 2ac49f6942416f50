//! The game state machine: category lists, score, and the per-tick phase
//! sequence.
//!
//! One [`tick`](Game::tick) executes, in fixed order:
//!
//! 1. Player interaction -- catch missing strays, deliver followers at
//!    home, collect pickups.
//! 2. Missing wander -- probabilistic single random legal steps, with
//!    direct promotion to *safe* for strays that stumble onto home.
//! 3. Follow repositioning along the player's trail.
//! 4. Found wander-off -- boredom bookkeeping for every follower but the
//!    anchored first one.
//! 5. Probabilistic pickup spawn (skipped gracefully on a full grid).
//! 6. The world's autonomous step (falling rocks).
//!
//! Later phases observe the mutations of earlier ones, so the order is
//! part of the contract. Scoring is point-on-delivery: only a stray moved
//! from *found* to *safe* at the home tile scores (plus pickups the player
//! collects); finding a stray and self-rescue score nothing.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, warn};

use shoal_world::entity::{Entity, EntityId, EntityKind};
use shoal_world::follow::objects_follow;
use shoal_world::geom::{Direction, Point};
use shoal_world::world::World;
use shoal_world::WorldError;

use crate::config::GameConfig;

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// What one tick changed, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Strays caught this tick (missing -> found).
    pub found: Vec<EntityId>,
    /// Strays delivered at home this tick (found -> safe, scored).
    pub delivered: Vec<EntityId>,
    /// Strays that wandered onto home unaided (missing -> safe, unscored).
    pub self_rescued: Vec<EntityId>,
    /// Followers that got bored and left (found -> missing).
    pub wandered_off: Vec<EntityId>,
    /// Pickups the player collected (scored).
    pub pickups_collected: Vec<EntityId>,
    /// Pickups consumed by wandering strays (unscored).
    pub pickups_eaten: Vec<EntityId>,
    /// Pickup spawned this tick, if any.
    pub spawned_pickup: Option<EntityId>,
    /// Total score gained this tick.
    pub score_delta: u32,
}

impl TickReport {
    /// Whether the tick changed nothing observable.
    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
            && self.delivered.is_empty()
            && self.self_rescued.is_empty()
            && self.wandered_off.is_empty()
            && self.pickups_collected.is_empty()
            && self.pickups_eaten.is_empty()
            && self.spawned_pickup.is_none()
            && self.score_delta == 0
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A running game: the world, the category lists, the score, and the RNG.
///
/// Single-threaded and turn-based: each command runs to completion before
/// the caller may issue another or read state. Strays live in exactly one
/// of `missing`/`found` while alive; `safe` tracks delivered ids whose
/// entities have left the world for good.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    world: World,
    rng: Pcg64,
    seed: u64,
    player: EntityId,
    home: EntityId,
    missing: Vec<EntityId>,
    found: Vec<EntityId>,
    safe: Vec<EntityId>,
    score: u32,
    ticks: u64,
}

/// Stray point value by spawn order: early tiers are worth more.
fn stray_points(index: u32) -> u32 {
    if index < 4 {
        15
    } else if index < 8 {
        10
    } else {
        7
    }
}

impl Game {
    /// Set up a game: home, rocks, hazards, the player (starting at home),
    /// and the missing strays, all placed by the seeded RNG.
    ///
    /// # Errors
    ///
    /// [`WorldError::WorldFull`] if the configured population does not fit
    /// the grid.
    ///
    /// # Panics
    ///
    /// Panics if the configuration fails [`GameConfig::validate`].
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, WorldError> {
        config.validate();
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut world = World::new(config.width, config.height);

        let home = world.insert_randomly(EntityKind::Home, &mut rng)?;
        for _ in 0..config.rock_count {
            let kind = if rng.gen_bool(config.falling_rock_ratio) {
                EntityKind::FallingRock
            } else {
                EntityKind::Rock
            };
            world.insert_randomly(kind, &mut rng)?;
        }
        for _ in 0..config.hazard_count {
            world.insert_randomly(EntityKind::Hazard, &mut rng)?;
        }

        // The player starts on the home tile, not on a free one.
        let home_pos = world.get(home).expect("home was just registered").pos();
        let player = world.spawn_at(EntityKind::Player, home_pos)?;

        let mut missing = Vec::with_capacity(config.stray_count as usize);
        for i in 0..config.stray_count {
            let kind = EntityKind::Stray {
                points: stray_points(i),
                fast: rng.gen_bool(config.fast_ratio),
                boredom: 0,
            };
            missing.push(world.insert_randomly(kind, &mut rng)?);
        }

        debug!(seed, strays = missing.len(), "game ready");
        Ok(Self {
            config,
            world,
            rng,
            seed,
            player,
            home,
            missing,
            found: Vec::new(),
            safe: Vec::new(),
            score: 0,
            ticks: 0,
        })
    }

    // -- commands -----------------------------------------------------------

    /// Attempt one legality-checked step for the player. Returns whether
    /// the move applied; a rejected move is not an error.
    pub fn move_player(&mut self, dir: Direction) -> bool {
        self.world.try_move(self.player, dir)
    }

    /// Advance the game one tick, executing every phase in order.
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport::default();

        self.player_interacts(&mut report);
        self.wander_missing(&mut report);
        objects_follow(&mut self.world, self.player, &self.found);
        self.wander_off_found(&mut report);
        self.spawn_pickup(&mut report);
        self.world.step_all();

        if !report.is_empty() {
            debug!(
                tick = self.ticks,
                found = report.found.len(),
                delivered = report.delivered.len(),
                score_delta = report.score_delta,
                "tick transitions"
            );
        }
        report
    }

    /// Destroy every destructible obstacle (rocks, falling rocks) at the
    /// tile. Strays, hazards, and the home are unaffected. Returns how many
    /// entities were removed.
    pub fn click(&mut self, x: i32, y: i32) -> usize {
        let mut removed = 0;
        for id in self.world.find(x, y) {
            let destructible = self
                .world
                .get(id)
                .map_or(false, |e| e.kind().is_destructible());
            if destructible {
                self.world.remove(id).expect("id came from find");
                removed += 1;
            }
        }
        removed
    }

    /// Rebuild the game from its config with a fresh seed drawn from the
    /// current RNG, so a reset sequence stays reproducible from the
    /// original seed.
    ///
    /// # Errors
    ///
    /// Propagates setup failure; on error the running game is untouched.
    pub fn reset(&mut self) -> Result<(), WorldError> {
        let seed = self.rng.gen::<u64>();
        *self = Game::new(self.config.clone(), seed)?;
        Ok(())
    }

    // -- tick phases --------------------------------------------------------

    /// Phase 1: resolve everything sharing the player's tile.
    fn player_interacts(&mut self, report: &mut TickReport) {
        let overlap: Vec<EntityId> = self
            .world
            .find_same_cell(self.player)
            .into_iter()
            .filter(|&id| id != self.player)
            .collect();

        for id in overlap {
            // A delivery earlier in this loop may have removed the entity.
            let Some(kind) = self.world.get(id).map(|e| *e.kind()) else {
                continue;
            };

            if let Some(slot) = self.missing.iter().position(|&m| m == id) {
                assert!(kind.is_stray(), "non-stray {id} in the missing list");
                self.missing.remove(slot);
                self.found.push(id);
                report.found.push(id);
            } else if id == self.home {
                // Everyone currently following is delivered and scored.
                for friend in std::mem::take(&mut self.found) {
                    let entity = self
                        .world
                        .remove(friend)
                        .expect("found list entries are live");
                    let EntityKind::Stray { points, .. } = *entity.kind() else {
                        panic!("non-stray {friend} in the found list");
                    };
                    self.score += points;
                    report.score_delta += points;
                    self.safe.push(friend);
                    report.delivered.push(friend);
                }
            } else if let EntityKind::Pickup { points } = kind {
                self.world.remove(id).expect("pickup was just observed");
                self.score += points;
                report.score_delta += points;
                report.pickups_collected.push(id);
            }
        }
    }

    /// Phase 2: missing strays take probabilistic random steps; any that
    /// end up on the home tile are queued and bulk-promoted to safe.
    fn wander_missing(&mut self, report: &mut TickReport) {
        let mut rescued: Vec<EntityId> = Vec::new();

        for id in self.missing.clone() {
            let entity = self.world.get(id).expect("missing list entries are live");
            let EntityKind::Stray { fast, .. } = *entity.kind() else {
                panic!("non-stray {id} in the missing list");
            };

            let move_chance = if fast {
                self.config.p_fast
            } else {
                self.config.p_slow
            };
            if self.rng.gen_bool(move_chance) {
                let dir = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
                // A blocked direction is simply skipped, not retried.
                let _ = self.world.try_move(id, dir);
            }

            for other in self.world.find_same_cell(id) {
                if other == id {
                    continue;
                }
                if other == self.home {
                    // Made it home unaided: promoted without ever being
                    // found, and without scoring -- nobody delivered it.
                    self.world.remove(id).expect("stray is live");
                    rescued.push(id);
                } else if matches!(
                    self.world.get(other).map(|e| *e.kind()),
                    Some(EntityKind::Pickup { .. })
                ) {
                    self.world.remove(other).expect("pickup was just observed");
                    report.pickups_eaten.push(other);
                }
            }
        }

        for id in rescued {
            self.missing.retain(|&m| m != id);
            self.safe.push(id);
            report.self_rescued.push(id);
        }
    }

    /// Phase 4: every follower but the anchored first accrues boredom and,
    /// past the attention span, may wander back to missing.
    fn wander_off_found(&mut self, report: &mut TickReport) {
        let mut bored: Vec<EntityId> = Vec::new();

        for id in self.found.iter().skip(1).copied().collect::<Vec<_>>() {
            let entity = self.world.get_mut(id).expect("found list entries are live");
            let EntityKind::Stray { boredom, .. } = entity.kind_mut() else {
                panic!("non-stray {id} in the found list");
            };
            *boredom += 1;
            if *boredom >= self.config.attention_span
                && self.rng.gen_bool(self.config.wander_off_chance)
            {
                *boredom = 0;
                bored.push(id);
            }
        }

        for id in bored {
            self.found.retain(|&f| f != id);
            self.missing.push(id);
            report.wandered_off.push(id);
        }
    }

    /// Phase 5: maybe spawn a pickup. A full grid skips the spawn -- a
    /// legitimate outcome, not a failure.
    fn spawn_pickup(&mut self, report: &mut TickReport) {
        if !self.rng.gen_bool(self.config.pickup_chance) {
            return;
        }
        let kind = EntityKind::Pickup {
            points: self.config.pickup_points,
        };
        match self.world.insert_randomly(kind, &mut self.rng) {
            Ok(id) => report.spawned_pickup = Some(id),
            Err(err) => warn!(%err, "pickup spawn skipped"),
        }
    }

    // -- state exposure -----------------------------------------------------

    /// Current score. Never decreases.
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks executed so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// True once every stray has been delivered or rescued.
    pub fn game_over(&self) -> bool {
        self.missing.is_empty() && self.found.is_empty()
    }

    /// Strays still at large, found or not.
    pub fn strays_left(&self) -> usize {
        self.missing.len() + self.found.len()
    }

    /// The seed this game was built from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The configuration in force.
    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The player's id.
    #[inline]
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// The home marker's id.
    #[inline]
    pub fn home(&self) -> EntityId {
        self.home
    }

    /// Strays not yet located, in list order.
    #[inline]
    pub fn missing(&self) -> &[EntityId] {
        &self.missing
    }

    /// Strays trailing the player, in follow order.
    #[inline]
    pub fn found(&self) -> &[EntityId] {
        &self.found
    }

    /// Delivered strays. Their entities are no longer in the world.
    #[inline]
    pub fn safe(&self) -> &[EntityId] {
        &self.safe
    }

    /// Read-only view of every live entity, for rendering between ticks.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        self.world.entities()
    }

    /// Read-only access to the world.
    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, for setup and testing. Category lists are not
    /// adjusted for entities added or removed this way; use
    /// [`track_stray`](Self::track_stray) for targets.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Start tracking an already-registered stray as missing.
    ///
    /// # Panics
    ///
    /// Panics if the id is not a live stray or is already tracked --
    /// category bookkeeping is never silently repaired.
    pub fn track_stray(&mut self, id: EntityId) {
        let entity = self
            .world
            .get(id)
            .expect("stray must be registered before tracking");
        assert!(entity.kind().is_stray(), "cannot track non-stray {id}");
        assert!(
            !self.missing.contains(&id) && !self.found.contains(&id) && !self.safe.contains(&id),
            "stray {id} is already tracked"
        );
        self.missing.push(id);
    }

    /// The player's current tile.
    pub fn player_pos(&self) -> Point {
        self.world
            .get(self.player)
            .expect("the player is always live")
            .pos()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
