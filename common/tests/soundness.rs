use minesweeper_ai::oracle::{self, Entailment};
use minesweeper_ai::{Agent, Board, Cell};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A board of up to 8x8 with a random mine layout that leaves a safe cell.
fn board_strategy() -> impl Strategy<Value = Board> {
    (1..=8usize, 1..=8usize)
        .prop_flat_map(|(height, width)| {
            (
                Just(height),
                Just(width),
                proptest::collection::vec(proptest::bool::weighted(0.2), height * width),
            )
        })
        .prop_filter("at least one safe cell", |(_, _, layout)| {
            layout.iter().any(|mine| !mine)
        })
        .prop_map(|(height, width, layout)| {
            let mines = layout
                .iter()
                .enumerate()
                .filter(|&(_, &mine)| mine)
                .map(|(i, _)| Cell::new(i / width, i % width));
            Board::with_mines(height, width, mines).unwrap()
        })
}

proptest! {
    #[test]
    fn agent_deductions_are_sound(board in board_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut agent = Agent::new(board.height(), board.width());

        loop {
            let cell = match agent.make_safe_move() {
                Some(cell) => {
                    // Moves the agent proves safe are never mines
                    prop_assert!(!board.is_mine(cell));
                    cell
                }
                None => match agent.make_random_move(&mut rng) {
                    Some(cell) => cell,
                    None => break,
                },
            };
            if board.is_mine(cell) {
                break;
            }

            let before = agent.clone();
            agent.add_knowledge(cell, board.nearby_mines(cell)).unwrap();

            // Monotonicity
            prop_assert!(before.safes().is_subset(agent.safes()));
            prop_assert!(before.mines().is_subset(agent.mines()));
            prop_assert_eq!(agent.moves_made().len(), before.moves_made().len() + 1);

            // Disjointness and soundness against the real layout
            prop_assert!(agent.safes().is_disjoint(agent.mines()));
            prop_assert!(agent.mines().is_subset(board.mines()));
            prop_assert!(agent.safes().is_disjoint(board.mines()));

            // Every live sentence is well formed, unresolved and true
            for sentence in agent.knowledge() {
                prop_assert!(sentence.count() <= sentence.cells().len());
                prop_assert!(!sentence.cells().is_empty());
                let actual = sentence.cells().iter().filter(|c| board.is_mine(**c)).count();
                prop_assert_eq!(actual, sentence.count());
                for cell in sentence.cells() {
                    prop_assert!(!agent.safes().contains(cell));
                    prop_assert!(!agent.mines().contains(cell));
                }
            }

            // Whatever the SAT oracle can still force agrees with the layout
            let entailed = oracle::entailments(agent.knowledge()).unwrap();
            for (cell, entailment) in entailed {
                match entailment {
                    Entailment::Mine => {
                        prop_assert!(board.is_mine(cell));
                    }
                    Entailment::Safe => {
                        prop_assert!(!board.is_mine(cell));
                    }
                    Entailment::Open => {}
                }
            }
        }
    }

    #[test]
    fn safe_move_does_not_mutate(board in board_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut agent = Agent::new(board.height(), board.width());
        if let Some(cell) = agent.make_random_move(&mut rng) {
            if !board.is_mine(cell) {
                agent.add_knowledge(cell, board.nearby_mines(cell)).unwrap();
            }
        }

        let before = agent.clone();
        let first = agent.make_safe_move();
        prop_assert_eq!(first, agent.make_safe_move());
        prop_assert_eq!(&agent, &before);
    }
}

#[test]
fn corner_zero_on_three_by_three() {
    let board = Board::with_mines(3, 3, [Cell::new(2, 2)]).unwrap();
    let mut agent = Agent::new(3, 3);
    agent
        .add_knowledge(Cell::new(0, 0), board.nearby_mines(Cell::new(0, 0)))
        .unwrap();
    for cell in [Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)] {
        assert!(agent.safes().contains(&cell));
    }
}

#[test]
fn dense_board_converges() {
    // Every cell of a mine-free 8x8 board is revealed in row-major order;
    // propagation must settle after each observation
    let board = Board::with_mines(8, 8, Vec::<Cell>::new()).unwrap();
    let mut agent = Agent::new(8, 8);
    for row in 0..8 {
        for col in 0..8 {
            let cell = Cell::new(row, col);
            if agent.moves_made().contains(&cell) {
                continue;
            }
            agent.add_knowledge(cell, board.nearby_mines(cell)).unwrap();
        }
    }
    assert_eq!(agent.safes().len(), 64);
    assert!(agent.mines().is_empty());
    assert!(agent.knowledge().is_empty());
}
