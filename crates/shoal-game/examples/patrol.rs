//! Headless patrol demo -- a greedy bot herds every stray home.
//!
//! Run with:
//!   cargo run --example patrol -p shoal-game
//!
//! Set `RUST_LOG=debug` to watch per-tick transitions; pass a number to
//! change the seed (default 42).

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use shoal_game::prelude::*;

const MAX_TICKS: u64 = 2_000;

/// Pick the step that shrinks the gap to `target`, falling back to the
/// other axis when the preferred one is blocked, then to a random legal
/// direction so the bot never wedges against a rock wall.
fn steer(game: &mut Game, target: Point, rng: &mut Pcg64) {
    let pos = game.player_pos();
    let dx = target.x - pos.x;
    let dy = target.y - pos.y;

    let mut order = Vec::with_capacity(4);
    if dx.abs() >= dy.abs() {
        if dx != 0 {
            order.push(if dx > 0 { Direction::East } else { Direction::West });
        }
        if dy != 0 {
            order.push(if dy > 0 { Direction::South } else { Direction::North });
        }
    } else {
        if dy != 0 {
            order.push(if dy > 0 { Direction::South } else { Direction::North });
        }
        if dx != 0 {
            order.push(if dx > 0 { Direction::East } else { Direction::West });
        }
    }
    order.push(Direction::ALL[rng.gen_range(0..Direction::ALL.len())]);

    for dir in order {
        if game.move_player(dir) {
            return;
        }
    }
}

/// Where the bot is heading: home when it has followers, otherwise the
/// nearest missing stray.
fn pick_target(game: &Game) -> Option<Point> {
    if !game.found().is_empty() {
        return game.world().get(game.home()).map(|e| e.pos());
    }
    let pos = game.player_pos();
    game.missing()
        .iter()
        .filter_map(|&id| game.world().get(id).map(|e| e.pos()))
        .min_by_key(|p| (p.x - pos.x).abs() + (p.y - pos.y).abs())
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(42);

    let mut game = Game::new(GameConfig::default(), seed)?;
    let mut rng = Pcg64::seed_from_u64(seed ^ 0x5eed);
    println!(
        "patrol: seed {seed}, {}x{} grid, {} strays",
        game.config().width,
        game.config().height,
        game.missing().len()
    );

    while !game.game_over() && game.tick_count() < MAX_TICKS {
        if let Some(target) = pick_target(&game) {
            steer(&mut game, target, &mut rng);
        }
        let report = game.tick();
        for &id in &report.delivered {
            println!("tick {:>4}: delivered {id}, score {}", game.tick_count(), game.score());
        }
        for &id in &report.self_rescued {
            println!("tick {:>4}: {id} made it home alone", game.tick_count());
        }
    }

    let snapshot = game.capture_snapshot();
    println!(
        "done after {} ticks: score {}, {} delivered, {} still out, hash {}",
        snapshot.tick,
        snapshot.score,
        snapshot.safe.len(),
        game.strays_left(),
        snapshot.hash
    );
    Ok(())
}
