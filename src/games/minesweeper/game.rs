use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tracing::info;

use super::board::{Board, Phase, RevealOutcome, MINES, SIZE};
use super::renderer;
use crate::core::game::Game;

pub struct MinesweeperGame {
    board: Board,
    cursor: (usize, usize),
    // On-screen grid rectangle recorded by the last render; maps mouse
    // clicks back to cells.
    grid_area: Rect,
}

impl MinesweeperGame {
    pub fn new() -> Result<Self> {
        Ok(Self {
            board: Board::new(SIZE, SIZE, MINES)?,
            cursor: (0, 0),
            grid_area: Rect::default(),
        })
    }

    fn restart(&mut self) {
        if self.board.phase() == Phase::Playing {
            return;
        }
        self.board = Board::new(SIZE, SIZE, MINES).expect("static board configuration is valid");
        self.cursor = (0, 0);
        info!("minesweeper restarted");
    }

    fn reveal_at(&mut self, row: usize, col: usize) {
        match self.board.reveal(row, col) {
            RevealOutcome::HitMine => info!(row, col, "stepped on a mine"),
            RevealOutcome::Won => info!("minesweeper solved"),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Up => self.cursor.0 = self.cursor.0.saturating_sub(1),
            KeyCode::Down => self.cursor.0 = (self.cursor.0 + 1).min(self.board.height() - 1),
            KeyCode::Left => self.cursor.1 = self.cursor.1.saturating_sub(1),
            KeyCode::Right => self.cursor.1 = (self.cursor.1 + 1).min(self.board.width() - 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.reveal_at(self.cursor.0, self.cursor.1),
            KeyCode::Char('f') => self.board.toggle_flag(self.cursor.0, self.cursor.1),
            KeyCode::Char('r') => self.restart(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let button = match mouse.kind {
            MouseEventKind::Down(button) => button,
            _ => return,
        };
        let Some((row, col)) = self.cell_at_screen(mouse.column, mouse.row) else {
            return;
        };
        self.cursor = (row, col);
        match button {
            MouseButton::Left => self.reveal_at(row, col),
            MouseButton::Right => self.board.toggle_flag(row, col),
            MouseButton::Middle => {}
        }
    }

    // Each cell is rendered two columns wide.
    fn cell_at_screen(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        let area = self.grid_area;
        if !area.contains(Position::new(x, y)) {
            return None;
        }
        let col = ((x - area.x) / 2) as usize;
        let row = (y - area.y) as usize;
        (row < self.board.height() && col < self.board.width()).then_some((row, col))
    }
}

impl Game for MinesweeperGame {
    // Turn-based: no clock at all.
    fn tick_rate(&self) -> Option<Duration> {
        None
    }

    fn on_tick(&mut self) {}

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        self.grid_area = renderer::draw(frame, &self.board, self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_maps_screen_coordinates_to_cells() {
        let mut game = MinesweeperGame::new().unwrap();
        game.grid_area = Rect::new(10, 5, 20, 10);

        assert_eq!(game.cell_at_screen(10, 5), Some((0, 0)));
        assert_eq!(game.cell_at_screen(11, 5), Some((0, 0)));
        assert_eq!(game.cell_at_screen(12, 5), Some((0, 1)));
        assert_eq!(game.cell_at_screen(29, 14), Some((9, 9)));
    }

    #[test]
    fn mouse_outside_grid_is_ignored() {
        let mut game = MinesweeperGame::new().unwrap();
        game.grid_area = Rect::new(10, 5, 20, 10);

        assert_eq!(game.cell_at_screen(9, 5), None);
        assert_eq!(game.cell_at_screen(10, 15), None);
        assert_eq!(game.cell_at_screen(30, 5), None);
    }
}
