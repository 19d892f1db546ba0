use crate::agent::Agent;
use crate::board::{Board, cell_count};
use crate::error::GameError;
use crate::Cell;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Board dimensions and mine count for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            height: 8,
            width: 8,
            mines: 8,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.height == 0 || self.width == 0 {
            return Err(GameError::Config(format!(
                "board must have at least one cell, got {}x{}",
                self.height, self.width
            )));
        }
        if self.mines >= cell_count(self.height, self.width)? {
            return Err(GameError::Config(format!(
                "{} mines leave no safe cell on a {}x{} board",
                self.mines, self.height, self.width
            )));
        }
        Ok(())
    }
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What a single turn did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A safe cell was revealed. `deduced` is false when the move was a guess.
    Revealed {
        cell: Cell,
        count: usize,
        deduced: bool,
    },
    /// The chosen cell was a mine.
    Exploded { cell: Cell, deduced: bool },
    /// No safe move and no unplayed cell left to guess.
    Exhausted,
}

/// The turn loop: a board, the agent playing it, and what has been revealed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    board: Board,
    agent: Agent,
    revealed: BTreeMap<Cell, usize>,
    state: GameState,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::new(config.height, config.width, config.mines, rng)?;
        Ok(Game::from_board(board))
    }

    pub fn from_board(board: Board) -> Self {
        let agent = Agent::new(board.height(), board.width());
        Game {
            board,
            agent,
            revealed: BTreeMap::new(),
            state: GameState::Playing,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Revealed cells and their neighbour counts.
    pub fn revealed(&self) -> &BTreeMap<Cell, usize> {
        &self.revealed
    }

    /// Cells the agent has proven to be mines.
    pub fn flags(&self) -> &BTreeSet<Cell> {
        self.agent.mines()
    }

    /// Plays one AI turn: a proven-safe cell if there is one, else a guess.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step, GameError> {
        if self.state != GameState::Playing {
            return Err(GameError::Finished);
        }
        let (cell, deduced) = match self.agent.make_safe_move() {
            Some(cell) => (cell, true),
            None => match self.agent.make_random_move(rng) {
                Some(cell) => (cell, false),
                None => {
                    info!("no moves left");
                    return Ok(Step::Exhausted);
                }
            },
        };
        debug!(%cell, deduced, "agent move");
        self.play(cell, deduced)
    }

    /// Reveals a cell chosen by someone other than the agent.
    pub fn reveal(&mut self, cell: Cell) -> Result<Step, GameError> {
        if self.state != GameState::Playing {
            return Err(GameError::Finished);
        }
        if !cell.in_bounds(self.board.height(), self.board.width()) {
            return Err(GameError::OutOfBounds {
                cell,
                height: self.board.height(),
                width: self.board.width(),
            });
        }
        let deduced = self.agent.safes().contains(&cell);
        self.play(cell, deduced)
    }

    fn play(&mut self, cell: Cell, deduced: bool) -> Result<Step, GameError> {
        if self.board.is_mine(cell) {
            info!(%cell, "hit a mine");
            self.state = GameState::Lost;
            return Ok(Step::Exploded { cell, deduced });
        }

        let count = self.board.nearby_mines(cell);
        self.agent.add_knowledge(cell, count)?;
        self.revealed.insert(cell, count);

        if self.is_won()? {
            info!(moves = self.revealed.len(), "board cleared");
            self.state = GameState::Won;
        }
        Ok(Step::Revealed {
            cell,
            count,
            deduced,
        })
    }

    fn is_won(&self) -> Result<bool, GameError> {
        Ok(self.board.won(self.flags()) || self.revealed.len() == self.board.safe_cells()?)
    }

    /// Plays until the game ends or the agent runs out of moves.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GameState, GameError> {
        while self.state == GameState::Playing {
            if self.step(rng)? == Step::Exhausted {
                break;
            }
        }
        Ok(self.state)
    }

    /// Deserializes a game from bytes. The bytes come from callers, so the
    /// board layout and the agent's grid are checked before use.
    pub fn deserialize(bts: &[u8]) -> Result<Self, GameError> {
        let game: Game = bcs::from_bytes(bts)?;
        game.board.check()?;
        let (height, width) = (game.board.height(), game.board.width());
        if (game.agent.height(), game.agent.width()) != (height, width) {
            return Err(GameError::Config(format!(
                "agent grid {}x{} does not match the {height}x{width} board",
                game.agent.height(),
                game.agent.width()
            )));
        }
        if let Some(&cell) = game.revealed.keys().find(|c| !c.in_bounds(height, width)) {
            return Err(GameError::OutOfBounds {
                cell,
                height,
                width,
            });
        }
        Ok(game)
    }

    /// Serializes the game to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>, GameError> {
        Ok(bcs::to_bytes(self)?)
    }
}
