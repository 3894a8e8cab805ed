/// Minesweeper game module
pub mod board;
pub mod game;
pub mod renderer;

pub use board::{Board, CellState, Phase};
pub use game::MinesweeperGame;
