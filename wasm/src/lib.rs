use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let config = ms::GameConfig {
        height: height as usize,
        width: width as usize,
        mines: mines as usize,
    };
    let game = ms::Game::new(config, &mut rand::rng()).map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

/// Lets the agent take one turn. The trailing byte is 0 when the game is
/// still going, 1 when lost, 2 when won; strip it before passing the
/// snapshot back in.
#[wasm_bindgen]
pub fn agent_move(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    game.step(&mut rand::rng()).map_err(|e| e.to_string())?;
    finish(&game)
}

#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    game.reveal(ms::Cell::new(row, col))
        .map_err(|e| e.to_string())?;
    finish(&game)
}

fn finish(game: &ms::Game) -> Result<Vec<u8>, String> {
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(match game.state() {
        ms::GameState::Playing => 0,
        ms::GameState::Lost => 1,
        ms::GameState::Won => 2,
    });
    Ok(xs)
}

/// Row-major view of the board: -1 hidden, -2 flagged as a mine, otherwise
/// the revealed neighbour count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let (height, width) = (game.board().height(), game.board().width());
    Ok((0..height)
        .flat_map(|row| (0..width).map(move |col| ms::Cell::new(row, col)))
        .map(|cell| match game.revealed().get(&cell) {
            Some(&n) => n as i8,
            None if game.flags().contains(&cell) => -2,
            None => -1,
        })
        .collect())
}
