use std::collections::VecDeque;

use anyhow::{ensure, Result};
use rand::Rng;

pub const SIZE: usize = 10;
pub const MINES: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Hidden,
    Flagged,
    Revealed(u8),
}

/// Board-level state machine. `Won` and `Lost` are terminal: the board
/// freezes and every further reveal/flag is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed,
    HitMine,
    Won,
    NoChange,
}

#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    mine_count: usize,
    mines: Vec<bool>, // row-major mine mask, fixed after construction
    cells: Vec<CellState>,
    remaining_safe: usize,
    phase: Phase,
    triggered: Option<(usize, usize)>,
}

impl Board {
    /// Build a board with `mine_count` mines placed uniformly at random
    /// among distinct cells. Rejects configurations where the mines would
    /// fill (or overflow) the grid, so the placement loop always terminates.
    pub fn new(width: usize, height: usize, mine_count: usize) -> Result<Self> {
        let mut board = Self::empty(width, height, mine_count)?;
        board.place_mines();
        Ok(board)
    }

    /// Deterministic constructor with explicit mine coordinates.
    pub fn with_mines(width: usize, height: usize, mines: &[(usize, usize)]) -> Result<Self> {
        let mut board = Self::empty(width, height, mines.len())?;
        for &(row, col) in mines {
            ensure!(
                row < height && col < width,
                "mine at ({}, {}) is outside the {}x{} grid",
                row,
                col,
                width,
                height
            );
            let idx = board.index(row, col);
            ensure!(!board.mines[idx], "duplicate mine at ({}, {})", row, col);
            board.mines[idx] = true;
        }
        Ok(board)
    }

    fn empty(width: usize, height: usize, mine_count: usize) -> Result<Self> {
        ensure!(width > 0 && height > 0, "board must have at least one cell");
        ensure!(
            mine_count < width * height,
            "mine count {} must be below the cell count {}",
            mine_count,
            width * height
        );
        Ok(Self {
            width,
            height,
            mine_count,
            mines: vec![false; width * height],
            cells: vec![CellState::Hidden; width * height],
            remaining_safe: width * height - mine_count,
            phase: Phase::Playing,
            triggered: None,
        })
    }

    // Rejection sampling: re-roll until the cell is mine-free.
    fn place_mines(&mut self) {
        let mut rng = rand::rng();
        let mut placed = 0;
        while placed < self.mine_count {
            let row = rng.random_range(0..self.height);
            let col = rng.random_range(0..self.width);
            let idx = self.index(row, col);
            if !self.mines[idx] {
                self.mines[idx] = true;
                placed += 1;
            }
        }
    }

    /// Reveal a cell. No-op on flagged or already-revealed cells and after
    /// the game has ended. Revealing a mine loses the game; revealing the
    /// last safe cell wins it; both force-reveal the whole board for
    /// display.
    pub fn reveal(&mut self, row: usize, col: usize) -> RevealOutcome {
        if self.phase != Phase::Playing {
            return RevealOutcome::NoChange;
        }
        let idx = self.index(row, col);
        if self.cells[idx] != CellState::Hidden {
            return RevealOutcome::NoChange;
        }

        if self.mines[idx] {
            self.phase = Phase::Lost;
            self.triggered = Some((row, col));
            self.reveal_all();
            return RevealOutcome::HitMine;
        }

        self.flood_reveal(row, col);

        if self.remaining_safe == 0 {
            self.phase = Phase::Won;
            self.reveal_all();
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    // Work-list flood fill: a zero-adjacency cell enqueues its hidden,
    // unflagged neighbors. Each cell reveals at most once, so the queue
    // drains.
    fn flood_reveal(&mut self, row: usize, col: usize) {
        let mut queue = VecDeque::from([(row, col)]);
        while let Some((r, c)) = queue.pop_front() {
            let idx = self.index(r, c);
            if self.cells[idx] != CellState::Hidden {
                continue;
            }
            let adjacent = self.adjacent_mines(r, c);
            self.cells[idx] = CellState::Revealed(adjacent);
            self.remaining_safe -= 1;
            if adjacent == 0 {
                queue.extend(
                    self.neighbors(r, c)
                        .filter(|&(nr, nc)| self.cells[self.index(nr, nc)] == CellState::Hidden),
                );
            }
        }
    }

    /// Toggle a flag on a hidden cell. Revealed cells and finished boards
    /// are left alone.
    pub fn toggle_flag(&mut self, row: usize, col: usize) {
        if self.phase != Phase::Playing {
            return;
        }
        let idx = self.index(row, col);
        self.cells[idx] = match self.cells[idx] {
            CellState::Hidden => CellState::Flagged,
            CellState::Flagged => CellState::Hidden,
            revealed @ CellState::Revealed(_) => revealed,
        };
    }

    // Display-only: mark everything revealed without touching the
    // remaining-safe counter (it is meaningless once the game has ended).
    fn reveal_all(&mut self) {
        for row in 0..self.height {
            for col in 0..self.width {
                let idx = self.index(row, col);
                if !matches!(self.cells[idx], CellState::Revealed(_)) {
                    self.cells[idx] = CellState::Revealed(self.adjacent_mines(row, col));
                }
            }
        }
    }

    fn adjacent_mines(&self, row: usize, col: usize) -> u8 {
        self.neighbors(row, col)
            .filter(|&(r, c)| self.mines[self.index(r, c)])
            .count() as u8
    }

    // 8-neighborhood clamped to the grid bounds.
    fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        (row.saturating_sub(1)..=(row + 1).min(self.height - 1)).flat_map(move |r| {
            (col.saturating_sub(1)..=(col + 1).min(width - 1))
                .map(move |c| (r, c))
                .filter(move |&pos| pos != (row, col))
        })
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_won(&self) -> bool {
        self.phase == Phase::Won
    }

    pub fn cell(&self, row: usize, col: usize) -> CellState {
        self.cells[self.index(row, col)]
    }

    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        self.mines[self.index(row, col)]
    }

    pub fn triggered_mine(&self) -> Option<(usize, usize)> {
        self.triggered
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Mines minus placed flags, for the status line. Can go negative when
    /// the player over-flags.
    pub fn mines_left(&self) -> isize {
        let flagged = self
            .cells
            .iter()
            .filter(|&&c| c == CellState::Flagged)
            .count();
        self.mine_count as isize - flagged as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_mines_yields_exact_distinct_count() {
        let board = Board::new(SIZE, SIZE, MINES).unwrap();
        let mined = (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| board.is_mine(r, c))
            .count();
        assert_eq!(mined, MINES);
    }

    #[test]
    fn rejects_mine_count_at_or_above_cell_count() {
        assert!(Board::new(3, 3, 9).is_err());
        assert!(Board::new(3, 3, 10).is_err());
        assert!(Board::new(3, 3, 8).is_ok());
        assert!(Board::new(0, 3, 0).is_err());
    }

    #[test]
    fn flood_reveal_opens_zero_region_and_numbered_border() {
        // 5x1 strip, mine in the middle: revealing the left end opens the
        // zero region (0,0)..(0,1) plus the bordering numbered cell, and
        // stops there.
        let mut board = Board::with_mines(5, 1, &[(0, 2)]).unwrap();

        assert_eq!(board.reveal(0, 0), RevealOutcome::Revealed);
        assert_eq!(board.cell(0, 0), CellState::Revealed(0));
        assert_eq!(board.cell(0, 1), CellState::Revealed(1));
        assert_eq!(board.cell(0, 3), CellState::Hidden);
        assert_eq!(board.cell(0, 4), CellState::Hidden);
        assert_eq!(board.phase(), Phase::Playing);
    }

    #[test]
    fn repeat_reveal_is_idempotent() {
        let mut board = Board::with_mines(5, 1, &[(0, 2)]).unwrap();

        assert_eq!(board.reveal(0, 0), RevealOutcome::Revealed);
        let snapshot = board.clone();
        assert_eq!(board.reveal(0, 0), RevealOutcome::NoChange);
        assert_eq!(board.cell(0, 1), snapshot.cell(0, 1));
        assert_eq!(board.phase(), snapshot.phase());
    }

    #[test]
    fn flag_toggles_and_blocks_reveal() {
        let mut board = Board::with_mines(3, 3, &[(2, 2)]).unwrap();

        board.toggle_flag(0, 0);
        assert_eq!(board.cell(0, 0), CellState::Flagged);
        board.toggle_flag(0, 0);
        assert_eq!(board.cell(0, 0), CellState::Hidden);

        board.toggle_flag(0, 0);
        assert_eq!(board.reveal(0, 0), RevealOutcome::NoChange);
        assert_eq!(board.cell(0, 0), CellState::Flagged);
    }

    #[test]
    fn flood_skips_flagged_neighbors() {
        let mut board = Board::with_mines(5, 1, &[(0, 4)]).unwrap();

        board.toggle_flag(0, 1);
        assert_eq!(board.reveal(0, 0), RevealOutcome::Revealed);
        // The flag fences off the cascade.
        assert_eq!(board.cell(0, 1), CellState::Flagged);
        assert_eq!(board.cell(0, 2), CellState::Hidden);
    }

    #[test]
    fn revealing_a_mine_loses_and_freezes_the_board() {
        let mut board = Board::with_mines(3, 3, &[(1, 1)]).unwrap();

        assert_eq!(board.reveal(1, 1), RevealOutcome::HitMine);
        assert_eq!(board.phase(), Phase::Lost);
        assert_eq!(board.triggered_mine(), Some((1, 1)));
        // Force-revealed for display.
        assert!(matches!(board.cell(0, 0), CellState::Revealed(_)));

        // Terminal state: everything is a no-op now.
        assert_eq!(board.reveal(0, 0), RevealOutcome::NoChange);
        let before = board.cell(2, 2);
        board.toggle_flag(2, 2);
        assert_eq!(board.cell(2, 2), before);
    }

    #[test]
    fn revealing_every_safe_cell_wins() {
        // Single corner mine: one flood from the opposite corner opens all
        // eight safe cells.
        let mut board = Board::with_mines(3, 3, &[(2, 2)]).unwrap();

        assert_eq!(board.reveal(0, 0), RevealOutcome::Won);
        assert_eq!(board.phase(), Phase::Won);
        assert!(board.is_won());
        assert_eq!(board.cell(1, 1), CellState::Revealed(1));

        // Win and loss are mutually exclusive terminals.
        assert_eq!(board.reveal(2, 2), RevealOutcome::NoChange);
        assert_eq!(board.phase(), Phase::Won);
    }

    #[test]
    fn win_requires_all_safe_cells() {
        let mut board = Board::with_mines(5, 1, &[(0, 2)]).unwrap();

        assert_eq!(board.reveal(0, 0), RevealOutcome::Revealed);
        assert_eq!(board.phase(), Phase::Playing);
        assert_eq!(board.reveal(0, 4), RevealOutcome::Won);
        assert_eq!(board.phase(), Phase::Won);
    }
}
