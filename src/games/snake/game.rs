use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tracing::info;

use crate::core::game::Game;

pub const GRID_WIDTH: i16 = 20;
pub const GRID_HEIGHT: i16 = 20;
const START_LENGTH: usize = 6;
const OBSTACLES_PER_LEVEL: usize = 5;
const BASE_TICK_MS: u64 = 100;
const MIN_TICK_MS: u64 = 50;
const SPEEDUP_STEP_MS: u64 = 10;

// Placement loops terminate only while free cells remain.
const _: () = assert!(START_LENGTH + OBSTACLES_PER_LEVEL + 2 < (GRID_WIDTH * GRID_HEIGHT) as usize);

// Parking spot for the apple/item before their first placement.
const OFF_GRID: (i16, i16) = (-1, -1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Shrink,
    SpeedUp,
}

#[derive(Debug, Clone)]
pub struct SnakeState {
    /// Head at the front.
    pub body: VecDeque<(i16, i16)>,
    pub direction: Direction,
    /// Accepted direction change, applied before the next tick's movement.
    pub queued: Option<Direction>,
    pub apple: (i16, i16),
    pub item: (i16, i16),
    pub item_kind: ItemKind,
    pub obstacles: Vec<(i16, i16)>,
    pub score: u32,
    pub difficulty: u32,
    /// Owned by the simulation; the clock re-reads it every cycle, so the
    /// speed-up item takes effect without touching any timer object.
    pub tick_interval: Duration,
    pub running: bool,
}

impl SnakeState {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let mut state = Self {
            body: initial_body(),
            direction: Direction::Right,
            queued: None,
            apple: OFF_GRID,
            item: OFF_GRID,
            item_kind: ItemKind::Shrink,
            obstacles: Vec::new(),
            score: 0,
            difficulty: 1,
            tick_interval: Duration::from_millis(BASE_TICK_MS),
            running: true,
        };
        state.apple = state.random_free_cell(&mut rng);
        state.spawn_item(&mut rng);
        state.spawn_obstacles(&mut rng);
        state
    }

    /// One movement step: head advances, tail follows, then the apple,
    /// item, and collision checks run in that order.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        if let Some(dir) = self.queued.take() {
            self.direction = dir;
        }

        let (dx, dy) = self.direction.delta();
        let head = *self.body.front().expect("snake always has a head");
        let new_head = (head.0 + dx, head.1 + dy);
        self.body.push_front(new_head);

        let mut rng = rand::rng();
        if new_head == self.apple {
            // Growing: the tail stays where it is.
            self.score += 1;
            self.apple = self.random_free_cell(&mut rng);
        } else {
            self.body.pop_back();
        }

        if new_head == self.item {
            self.apply_item(&mut rng);
        }

        if self.hits_wall(new_head) || self.hits_body(new_head) || self.obstacles.contains(&new_head)
        {
            self.running = false;
            info!(score = self.score, "snake game over");
        }
    }

    /// Direction changes are rejected when they would reverse the snake
    /// into itself; everything else is queued for the next tick.
    pub fn steer(&mut self, dir: Direction) {
        if !self.running || dir.opposite() == self.direction {
            return;
        }
        self.queued = Some(dir);
    }

    /// Only valid in the game-over state.
    pub fn restart(&mut self) {
        if self.running {
            return;
        }
        *self = Self::new();
    }

    fn apply_item(&mut self, rng: &mut impl Rng) {
        match self.item_kind {
            ItemKind::Shrink => {
                if self.body.len() > 1 {
                    self.body.pop_back();
                }
            }
            ItemKind::SpeedUp => {
                let ms = self.tick_interval.as_millis() as u64;
                if ms > MIN_TICK_MS {
                    self.tick_interval = Duration::from_millis(ms - SPEEDUP_STEP_MS);
                }
            }
        }
        self.spawn_item(rng);
    }

    fn spawn_item(&mut self, rng: &mut impl Rng) {
        self.item = self.random_free_cell(rng);
        self.item_kind = if rng.random_range(0..2) == 0 {
            ItemKind::Shrink
        } else {
            ItemKind::SpeedUp
        };
    }

    fn spawn_obstacles(&mut self, rng: &mut impl Rng) {
        self.obstacles.clear();
        let target = self.difficulty as usize * OBSTACLES_PER_LEVEL;
        while self.obstacles.len() < target {
            let cell = self.random_free_cell(rng);
            self.obstacles.push(cell);
        }
    }

    // Rejection sampling over cells not covered by the snake, the apple,
    // the item, or an obstacle.
    fn random_free_cell(&self, rng: &mut impl Rng) -> (i16, i16) {
        loop {
            let cell = (
                rng.random_range(0..GRID_WIDTH),
                rng.random_range(0..GRID_HEIGHT),
            );
            if !self.is_occupied(cell) {
                return cell;
            }
        }
    }

    fn is_occupied(&self, cell: (i16, i16)) -> bool {
        self.body.contains(&cell)
            || self.obstacles.contains(&cell)
            || cell == self.apple
            || cell == self.item
    }

    fn hits_wall(&self, head: (i16, i16)) -> bool {
        head.0 < 0 || head.0 >= GRID_WIDTH || head.1 < 0 || head.1 >= GRID_HEIGHT
    }

    fn hits_body(&self, head: (i16, i16)) -> bool {
        self.body.iter().skip(1).any(|&segment| segment == head)
    }
}

impl Default for SnakeState {
    fn default() -> Self {
        Self::new()
    }
}

fn initial_body() -> VecDeque<(i16, i16)> {
    let row = GRID_HEIGHT / 2;
    let head_x = START_LENGTH as i16 + 1;
    (0..START_LENGTH as i16).map(|i| (head_x - i, row)).collect()
}

pub struct SnakeGame {
    state: SnakeState,
}

impl SnakeGame {
    pub fn new() -> Result<Self> {
        Ok(Self { state: SnakeState::new() })
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Up => self.state.steer(Direction::Up),
            KeyCode::Down => self.state.steer(Direction::Down),
            KeyCode::Left => self.state.steer(Direction::Left),
            KeyCode::Right => self.state.steer(Direction::Right),
            KeyCode::Char(' ') | KeyCode::Char('r') => {
                if !self.state.running {
                    self.state.restart();
                    info!("snake restarted");
                }
            }
            _ => {}
        }
    }
}

impl Game for SnakeGame {
    fn tick_rate(&self) -> Option<Duration> {
        // Game over stops the clock; restart brings it back.
        if self.state.running {
            Some(self.state.tick_interval)
        } else {
            None
        }
    }

    fn on_tick(&mut self) {
        self.state.step();
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            self.handle_key(key);
        }
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        let header = Paragraph::new(format!(
            " SNAKE   Score: {}   Difficulty: {}   Tick: {}ms ",
            self.state.score,
            self.state.difficulty,
            self.state.tick_interval.as_millis()
        ))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        self.render_grid(frame, chunks[1]);

        let footer = if self.state.running {
            "[↑↓←→] Steer  [Esc] Menu"
        } else {
            "GAME OVER  [Space] Restart  [Esc] Menu"
        };
        frame.render_widget(
            Paragraph::new(footer).alignment(Alignment::Center),
            chunks[2],
        );
    }
}

impl SnakeGame {
    // Cells are two columns wide; the bordered block adds one cell on each
    // side.
    fn render_grid(&self, frame: &mut ratatui::Frame, area: Rect) {
        let field_w = (GRID_WIDTH as u16 * 2 + 2).min(area.width);
        let field_h = (GRID_HEIGHT as u16 + 2).min(area.height);
        let field = Rect::new(
            area.x + (area.width - field_w) / 2,
            area.y + (area.height - field_h) / 2,
            field_w,
            field_h,
        );
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(field);
        frame.render_widget(block, field);

        let empty = Span::styled("  ", Style::default());
        let mut cells =
            vec![vec![empty; GRID_WIDTH as usize]; GRID_HEIGHT as usize];
        let mut paint = |pos: (i16, i16), span: Span<'static>| {
            if let Some(cell) = cells
                .get_mut(pos.1 as usize)
                .and_then(|row| row.get_mut(pos.0 as usize))
            {
                *cell = span;
            }
        };

        for &obstacle in &self.state.obstacles {
            paint(obstacle, Span::styled("▓▓", Style::default().fg(Color::Gray)));
        }
        paint(
            self.state.apple,
            Span::styled("()", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        );
        let item_glyph = match self.state.item_kind {
            ItemKind::Shrink => "S ",
            ItemKind::SpeedUp => "F ",
        };
        paint(
            self.state.item,
            Span::styled(item_glyph, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        );
        for (i, &segment) in self.state.body.iter().enumerate() {
            let color = if i == 0 { Color::LightGreen } else { Color::Green };
            paint(segment, Span::styled("██", Style::default().fg(color)));
        }

        let lines: Vec<Line> = cells.into_iter().map(Line::from).collect();
        frame.render_widget(Paragraph::new(lines), inner);

        if !self.state.running {
            let banner = Paragraph::new(format!("GAME OVER\nScore: {}", self.state.score))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
            let rect = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 2)
                .intersection(inner);
            frame.render_widget(banner, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic playground: no obstacles, apple and item parked away
    // from the snake's path.
    fn quiet_state() -> SnakeState {
        let mut state = SnakeState::new();
        state.obstacles.clear();
        state.apple = (0, 0);
        state.item = (0, 1);
        state
    }

    #[test]
    fn reverse_direction_is_rejected() {
        let mut state = quiet_state();
        assert_eq!(state.direction, Direction::Right);

        state.steer(Direction::Left);
        assert!(state.queued.is_none());

        state.step();
        assert_eq!(state.direction, Direction::Right);
    }

    #[test]
    fn queued_turn_applies_before_movement() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();

        state.steer(Direction::Up);
        state.step();
        assert_eq!(state.direction, Direction::Up);
        assert_eq!(*state.body.front().unwrap(), (head.0, head.1 - 1));
    }

    #[test]
    fn reversal_is_checked_against_the_applied_direction() {
        let mut state = quiet_state();

        // Queue a turn, then try to reverse the still-applied direction.
        state.steer(Direction::Up);
        state.steer(Direction::Left);
        assert_eq!(state.queued, Some(Direction::Up));
    }

    #[test]
    fn eating_the_apple_grows_and_scores() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();
        state.apple = (head.0 + 1, head.1);
        let length = state.body.len();

        state.step();
        assert_eq!(state.body.len(), length + 1);
        assert_eq!(state.score, 1);
        assert!(state.running);
        // The new apple is never placed on the snake.
        assert!(!state.body.contains(&state.apple));
    }

    #[test]
    fn wall_collision_ends_the_game_and_halts_ticks() {
        let mut state = quiet_state();
        state.body = VecDeque::from([(GRID_WIDTH - 1, 5)]);

        state.step();
        assert!(!state.running);

        let snapshot = state.body.clone();
        state.step();
        assert_eq!(state.body, snapshot);
    }

    #[test]
    fn self_collision_ends_the_game() {
        let mut state = quiet_state();
        state.body = VecDeque::from([(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)]);
        state.direction = Direction::Down;

        state.step();
        assert!(!state.running);
    }

    #[test]
    fn obstacle_collision_ends_the_game() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();
        state.obstacles.push((head.0 + 1, head.1));

        state.step();
        assert!(!state.running);
    }

    #[test]
    fn shrink_item_floors_at_length_one() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();
        state.item = (head.0 + 1, head.1);
        state.item_kind = ItemKind::Shrink;

        state.step();
        assert_eq!(state.body.len(), START_LENGTH - 1);

        let mut short = quiet_state();
        short.body = VecDeque::from([(5, 5)]);
        short.item = (6, 5);
        short.item_kind = ItemKind::Shrink;
        short.step();
        assert_eq!(short.body.len(), 1);
    }

    #[test]
    fn speed_up_item_floors_at_the_minimum_interval() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();
        state.item = (head.0 + 1, head.1);
        state.item_kind = ItemKind::SpeedUp;

        state.step();
        assert_eq!(state.tick_interval, Duration::from_millis(BASE_TICK_MS - SPEEDUP_STEP_MS));

        let mut floored = quiet_state();
        let head = *floored.body.front().unwrap();
        floored.item = (head.0 + 1, head.1);
        floored.item_kind = ItemKind::SpeedUp;
        floored.tick_interval = Duration::from_millis(MIN_TICK_MS);

        floored.step();
        assert_eq!(floored.tick_interval, Duration::from_millis(MIN_TICK_MS));
    }

    #[test]
    fn consumed_item_relocates_off_the_snake() {
        let mut state = quiet_state();
        let head = *state.body.front().unwrap();
        state.item = (head.0 + 1, head.1);
        state.item_kind = ItemKind::Shrink;

        state.step();
        assert_ne!(state.item, (head.0 + 1, head.1));
        assert!(!state.body.contains(&state.item));
    }

    #[test]
    fn restart_restores_the_initial_configuration() {
        let mut state = quiet_state();
        state.score = 7;
        state.tick_interval = Duration::from_millis(60);
        state.running = false;

        state.restart();
        assert!(state.running);
        assert_eq!(state.score, 0);
        assert_eq!(state.body.len(), START_LENGTH);
        assert_eq!(state.direction, Direction::Right);
        assert_eq!(state.tick_interval, Duration::from_millis(BASE_TICK_MS));
        assert_eq!(state.obstacles.len(), OBSTACLES_PER_LEVEL);
    }

    #[test]
    fn restart_is_ignored_while_running() {
        let mut state = quiet_state();
        state.score = 3;

        state.restart();
        assert_eq!(state.score, 3);
    }

    #[test]
    fn obstacles_never_overlap_snake_apple_or_item() {
        for _ in 0..20 {
            let state = SnakeState::new();
            assert_eq!(state.obstacles.len(), OBSTACLES_PER_LEVEL);
            for obstacle in &state.obstacles {
                assert!(!state.body.contains(obstacle));
                assert_ne!(*obstacle, state.apple);
                assert_ne!(*obstacle, state.item);
            }
        }
    }
}
