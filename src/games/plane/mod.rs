pub mod game;

pub use game::{PlaneGame, PlaneState};
