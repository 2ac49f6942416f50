//! Property tests: arbitrary command scripts never break the category
//! partition, the score, or the grid bounds.

use proptest::prelude::*;

use shoal_game::prelude::*;

/// One externally issuable command.
#[derive(Debug, Clone)]
enum GameOp {
    Move(usize),
    Tick,
    Click(i32, i32),
}

fn op_strategy() -> impl Strategy<Value = GameOp> {
    prop_oneof![
        (0..Direction::ALL.len()).prop_map(GameOp::Move),
        Just(GameOp::Tick),
        (0i32..15, 0i32..10).prop_map(|(x, y)| GameOp::Click(x, y)),
    ]
}

/// Everything that must hold between any two commands.
fn check_invariants(game: &Game) -> Result<(), TestCaseError> {
    let total = game.config().stray_count as usize;
    prop_assert_eq!(
        game.missing().len() + game.found().len() + game.safe().len(),
        total
    );
    for id in game.missing() {
        prop_assert!(!game.found().contains(id));
        prop_assert!(!game.safe().contains(id));
    }
    for id in game.found() {
        prop_assert!(!game.safe().contains(id));
    }
    for entity in game.entities() {
        let pos = entity.pos();
        prop_assert!(pos.x >= 0 && (pos.x as u32) < game.config().width);
        prop_assert!(pos.y >= 0 && (pos.y as u32) < game.config().height);
    }
    prop_assert!(game.world().contains(game.player()));
    prop_assert!(game.world().contains(game.home()));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_command_scripts_preserve_game_invariants(
        seed in 0u64..1_000,
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut game = Game::new(GameConfig::default(), seed).unwrap();
        let mut last_score = 0u32;

        for op in ops {
            match op {
                GameOp::Move(i) => {
                    game.move_player(Direction::ALL[i]);
                }
                GameOp::Tick => {
                    let report = game.tick();
                    prop_assert_eq!(game.score(), last_score + report.score_delta);
                }
                GameOp::Click(x, y) => {
                    game.click(x, y);
                }
            }
            prop_assert!(game.score() >= last_score);
            last_score = game.score();
            check_invariants(&game)?;
        }
    }

    #[test]
    fn equal_scripts_yield_equal_hashes(
        seed in 0u64..1_000,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let run = |ops: &[GameOp]| {
            let mut game = Game::new(GameConfig::default(), seed).unwrap();
            for op in ops {
                match *op {
                    GameOp::Move(i) => {
                        game.move_player(Direction::ALL[i]);
                    }
                    GameOp::Tick => {
                        game.tick();
                    }
                    GameOp::Click(x, y) => {
                        game.click(x, y);
                    }
                }
            }
            game.state_hash()
        };
        prop_assert_eq!(run(&ops), run(&ops));
    }
}
