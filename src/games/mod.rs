pub mod macros;
pub mod minesweeper;
pub mod plane;
pub mod snake;

use std::future::Future;
use std::pin::Pin;
use anyhow::Result;
use ratatui::DefaultTerminal;
use crate::register_games;

/// Metadata about a game
#[derive(Clone, Debug)]
pub struct GameInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub author: &'static str,
}

/// Game launcher function - creates the game and runs it on the engine
pub type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a>>;
pub type GameLauncher = for<'a> fn(&'a mut DefaultTerminal) -> LaunchFuture<'a>;

/// Registry entry containing metadata and launcher
pub struct GameRegistry {
    pub info: GameInfo,
    pub launcher: GameLauncher,
}

// Register all games here - developers only need to add a new entry
register_games! {
    minesweeper => {
        game: MinesweeperGame,
        id: "minesweeper",
        name: "Minesweeper",
        description: "Find all the safe cells without stepping on a mine",
        author: "Termcade Team"
    },
    plane => {
        game: PlaneGame,
        id: "plane",
        name: "Plane",
        description: "Vertical shoot-'em-up - dodge and destroy the enemy planes",
        author: "Termcade Team"
    },
    snake => {
        game: SnakeGame,
        id: "snake",
        name: "Snake",
        description: "Classic snake with obstacles and power-ups",
        author: "Termcade Team"
    }
}
