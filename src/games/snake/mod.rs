pub mod game;

pub use game::{Direction, ItemKind, SnakeGame, SnakeState};
