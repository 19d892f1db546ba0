use clap::Parser;
use minesweeper_ai::oracle::{self, Entailment};
use minesweeper_ai::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "minesweeper-bot",
    version,
    about = "Autonomous minesweeper bot: plays proven-safe cells, guesses otherwise"
)]
struct Cli {
    /// Board height
    #[arg(long, default_value_t = 8)]
    height: usize,
    /// Board width
    #[arg(long, default_value_t = 8)]
    width: usize,
    /// Number of mines
    #[arg(long, default_value_t = 8)]
    mines: usize,
    /// Seed for mine placement and guesses; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
    /// After every move, compare the agent's knowledge with a SAT solver
    #[arg(long)]
    audit: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = GameConfig {
        height: cli.height,
        width: cli.width,
        mines: cli.mines,
    };
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    info!(?config, seed, "starting game");

    let mut game = Game::new(config, &mut rng)?;
    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: Prioritize logically safe moves, guess randomly otherwise.");
    print_board(&game);

    let mut move_count = 0;
    while game.state() == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{move_count} ---");

        match game.step(&mut rng)? {
            Step::Revealed {
                cell,
                count,
                deduced,
            } => {
                let how = if deduced { "deduced" } else { "guessed" };
                println!("Bot {how} {cell} and sees {count}.");
            }
            Step::Exploded { cell, .. } => println!("Bot guessed {cell} and hit a mine."),
            Step::Exhausted => {
                println!("No valid moves left for the bot to make.");
                break;
            }
        }
        print_board(&game);

        if cli.audit {
            audit(game.agent())?;
        }
        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    println!("\n--- Game Over ---");
    println!("{}", game.board());
    match game.state() {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    Ok(())
}

/// Logs the cells the SAT oracle can decide but the agent has not.
fn audit(agent: &Agent) -> anyhow::Result<()> {
    let entailed = oracle::entailments(agent.knowledge())?;
    let missed = entailed
        .values()
        .filter(|&&e| e != Entailment::Open)
        .count();
    if missed > 0 {
        warn!(missed, live = agent.knowledge().len(), "propagation left entailed cells undecided");
    } else {
        info!(live = agent.knowledge().len(), "knowledge base agrees with the oracle");
    }
    Ok(())
}

fn print_board(game: &Game) {
    print!("   ");
    for col in 0..game.board().width() {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(game.board().width()));

    for row in 0..game.board().height() {
        print!("{:^2}|", row);
        for col in 0..game.board().width() {
            let cell = Cell::new(row, col);
            let display = match game.revealed().get(&cell) {
                Some(n) => format!(" {n} "),
                None if game.flags().contains(&cell) => " F ".to_string(),
                None => " ■ ".to_string(),
            };
            print!("{display}");
        }
        println!();
    }
    println!();
}
