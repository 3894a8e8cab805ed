use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use rand::Rng;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::info;

use crate::core::game::Game;

pub const FIELD_WIDTH: i16 = 60;
pub const FIELD_HEIGHT: i16 = 24;
const PLAYER_WIDTH: i16 = 5;
const PLAYER_HEIGHT: i16 = 3;
const ENEMY_WIDTH: i16 = 3;
const ENEMY_HEIGHT: i16 = 2;
const PLAYER_SPEED_X: i16 = 2;
const PLAYER_SPEED_Y: i16 = 1;
const ENEMY_SPEED: i16 = 1;
const BULLET_SPEED: i16 = 2;
const SPAWN_INTERVAL: u32 = 10;
const TICK_RATE: Duration = Duration::from_millis(100);

/// Axis-aligned bounding box. Everything collides through its enclosing
/// rectangle, bullets included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox {
    pub x: i16,
    pub y: i16,
    pub width: i16,
    pub height: i16,
}

impl Hitbox {
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub x: i16,
    pub y: i16,
}

impl Enemy {
    fn hitbox(&self) -> Hitbox {
        Hitbox { x: self.x, y: self.y, width: ENEMY_WIDTH, height: ENEMY_HEIGHT }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub x: i16,
    pub y: i16,
}

impl Bullet {
    fn hitbox(&self) -> Hitbox {
        Hitbox { x: self.x, y: self.y, width: 1, height: 1 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Held {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone)]
pub struct PlaneState {
    pub player_x: i16,
    pub player_y: i16,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub held: Held,
    pub ticks: u32,
    pub score: u32,
    pub game_over: bool,
}

impl PlaneState {
    pub fn new() -> Self {
        Self {
            player_x: FIELD_WIDTH / 2 - PLAYER_WIDTH / 2,
            player_y: FIELD_HEIGHT - PLAYER_HEIGHT - 1,
            enemies: Vec::new(),
            bullets: Vec::new(),
            held: Held::default(),
            ticks: 0,
            score: 0,
            game_over: false,
        }
    }

    /// One fixed simulation step.
    pub fn step(&mut self) {
        if self.game_over {
            return;
        }
        self.move_player();
        self.advance_enemies();
        self.advance_bullets();
        self.resolve_collisions();
        if self.game_over {
            return;
        }
        self.spawn_enemies();
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Spawn a bullet at the player's horizontal center, heading up.
    pub fn shoot(&mut self) {
        if self.game_over {
            return;
        }
        self.bullets.push(Bullet {
            x: self.player_x + PLAYER_WIDTH / 2,
            y: self.player_y - 1,
        });
    }

    fn move_player(&mut self) {
        if self.held.left {
            self.player_x -= PLAYER_SPEED_X;
        }
        if self.held.right {
            self.player_x += PLAYER_SPEED_X;
        }
        if self.held.up {
            self.player_y -= PLAYER_SPEED_Y;
        }
        if self.held.down {
            self.player_y += PLAYER_SPEED_Y;
        }
        self.player_x = self.player_x.clamp(0, FIELD_WIDTH - PLAYER_WIDTH);
        self.player_y = self.player_y.clamp(0, FIELD_HEIGHT - PLAYER_HEIGHT);
        // Terminals do not reliably report key release; repeat events
        // re-arm these flags every tick while a key stays down.
        self.held = Held::default();
    }

    fn advance_enemies(&mut self) {
        for enemy in &mut self.enemies {
            enemy.y += ENEMY_SPEED;
        }
        self.enemies.retain(|enemy| enemy.y < FIELD_HEIGHT);
    }

    fn advance_bullets(&mut self) {
        for bullet in &mut self.bullets {
            bullet.y -= BULLET_SPEED;
        }
        self.bullets.retain(|bullet| bullet.y >= 0);
    }

    fn resolve_collisions(&mut self) {
        let player = self.player_hitbox();
        if self.enemies.iter().any(|enemy| enemy.hitbox().overlaps(&player)) {
            self.game_over = true;
            self.enemies.clear();
            info!(score = self.score, "plane shot down");
            return;
        }

        // Each bullet is consumed by the first enemy it overlaps, in
        // insertion order, and is not tested again this tick.
        let mut i = 0;
        while i < self.bullets.len() {
            let hitbox = self.bullets[i].hitbox();
            if let Some(j) = self
                .enemies
                .iter()
                .position(|enemy| enemy.hitbox().overlaps(&hitbox))
            {
                self.enemies.remove(j);
                self.bullets.remove(i);
                self.score += 1;
            } else {
                i += 1;
            }
        }
    }

    fn spawn_enemies(&mut self) {
        if self.ticks % SPAWN_INTERVAL == 0 {
            let mut rng = rand::rng();
            let x = rng.random_range(0..FIELD_WIDTH - ENEMY_WIDTH);
            self.enemies.push(Enemy { x, y: 0 });
        }
    }

    pub fn player_hitbox(&self) -> Hitbox {
        Hitbox {
            x: self.player_x,
            y: self.player_y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }
}

impl Default for PlaneState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PlaneGame {
    state: PlaneState,
}

impl PlaneGame {
    pub fn new() -> Result<Self> {
        Ok(Self { state: PlaneState::new() })
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match (key.kind, key.code) {
            (KeyEventKind::Press | KeyEventKind::Repeat, KeyCode::Left) => {
                self.state.held.left = true
            }
            (KeyEventKind::Press | KeyEventKind::Repeat, KeyCode::Right) => {
                self.state.held.right = true
            }
            (KeyEventKind::Press | KeyEventKind::Repeat, KeyCode::Up) => self.state.held.up = true,
            (KeyEventKind::Press | KeyEventKind::Repeat, KeyCode::Down) => {
                self.state.held.down = true
            }
            (KeyEventKind::Release, KeyCode::Left) => self.state.held.left = false,
            (KeyEventKind::Release, KeyCode::Right) => self.state.held.right = false,
            (KeyEventKind::Release, KeyCode::Up) => self.state.held.up = false,
            (KeyEventKind::Release, KeyCode::Down) => self.state.held.down = false,
            (KeyEventKind::Press, KeyCode::Char(' ')) => self.state.shoot(),
            (KeyEventKind::Press, KeyCode::Char('r')) => {
                if self.state.game_over {
                    self.state = PlaneState::new();
                    info!("plane game restarted");
                }
            }
            _ => {}
        }
    }
}

impl Game for PlaneGame {
    fn tick_rate(&self) -> Option<Duration> {
        // Game over stops the clock; the engine keeps polling input so the
        // player can still restart or leave.
        if self.state.game_over {
            None
        } else {
            Some(TICK_RATE)
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
        let area = frame.area();
        let field_w = (FIELD_WIDTH as u16 + 2).min(area.width);
        let field_h = (FIELD_HEIGHT as u16 + 2).min(area.height);
        let field = Rect::new(
            area.x + (area.width - field_w) / 2,
            area.y + (area.height - field_h) / 2,
            field_w,
            field_h,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" PLANE   Score: {} ", self.state.score));
        let inner = block.inner(field);
        frame.render_widget(block, field);

        draw_sprite(
            frame,
            inner,
            self.state.player_x,
            self.state.player_y,
            "  ▲  \n ███ \n▀ █ ▀",
            Color::Cyan,
        );
        for enemy in &self.state.enemies {
            draw_sprite(frame, inner, enemy.x, enemy.y, "▟█▙\n▀▀▀", Color::Red);
        }
        for bullet in &self.state.bullets {
            draw_sprite(frame, inner, bullet.x, bullet.y, "•", Color::Yellow);
        }

        if self.state.game_over {
            let banner = Paragraph::new("GAME OVER\n[R] Restart  [Esc] Menu")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
            let rect = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 2)
                .intersection(inner);
            frame.render_widget(banner, rect);
        }
    }
}

// Field coordinates are always non-negative; partially off-field sprites
// are clipped against the inner area.
fn draw_sprite(frame: &mut ratatui::Frame, inner: Rect, x: i16, y: i16, sprite: &str, color: Color) {
    let width = sprite.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let height = sprite.lines().count() as u16;
    let rect =
        Rect::new(inner.x + x as u16, inner.y + y as u16, width, height).intersection(inner);
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    frame.render_widget(
        Paragraph::new(sprite).style(Style::default().fg(color)),
        rect,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_state() -> PlaneState {
        let mut state = PlaneState::new();
        state.ticks = 1; // off the spawn cadence
        state
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Hitbox { x: 0, y: 0, width: 3, height: 2 };
        assert!(!a.overlaps(&Hitbox { x: 3, y: 0, width: 3, height: 2 }));
        assert!(!a.overlaps(&Hitbox { x: 0, y: 2, width: 3, height: 2 }));
        assert!(a.overlaps(&Hitbox { x: 2, y: 1, width: 3, height: 2 }));
    }

    #[test]
    fn bullet_and_enemy_are_removed_in_the_same_tick() {
        let mut state = quiet_state();
        state.enemies.push(Enemy { x: 10, y: 5 });
        state.bullets.push(Bullet { x: 11, y: 8 });

        state.step();
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 1);

        // Still absent from the next tick's entity lists.
        state.step();
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn enemy_past_the_bottom_edge_is_removed() {
        let mut state = quiet_state();
        state.enemies.push(Enemy { x: 0, y: FIELD_HEIGHT + 1 });

        state.step();
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn bullet_past_the_top_edge_is_removed() {
        let mut state = quiet_state();
        state.bullets.push(Bullet { x: 5, y: 0 });

        state.step();
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn enemy_reaching_the_player_ends_the_game_and_clears_enemies() {
        let mut state = quiet_state();
        state.enemies.push(Enemy { x: state.player_x, y: state.player_y - 1 });

        state.step();
        assert!(state.game_over);
        assert!(state.enemies.is_empty());

        // Terminal state: further ticks change nothing.
        let snapshot_ticks = state.ticks;
        state.step();
        assert_eq!(state.ticks, snapshot_ticks);
    }

    #[test]
    fn consumed_bullet_destroys_only_the_first_enemy() {
        let mut state = quiet_state();
        state.enemies.push(Enemy { x: 10, y: 6 });
        state.enemies.push(Enemy { x: 10, y: 6 });
        state.bullets.push(Bullet { x: 11, y: 9 });

        state.step();
        assert_eq!(state.enemies.len(), 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn enemies_spawn_on_the_interval_and_the_counter_wraps() {
        let mut state = PlaneState::new();
        state.step();
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].y, 0);

        state.ticks = u32::MAX;
        state.step();
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn shoot_spawns_a_bullet_at_the_player_center() {
        let mut state = PlaneState::new();
        state.shoot();
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].x, state.player_x + PLAYER_WIDTH / 2);

        state.game_over = true;
        state.shoot();
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn player_movement_is_clamped_and_flags_are_one_shot() {
        let mut state = quiet_state();
        state.player_x = 0;
        state.held.left = true;

        state.step();
        assert_eq!(state.player_x, 0);
        assert!(!state.held.left);

        state.held.right = true;
        state.step();
        assert_eq!(state.player_x, PLAYER_SPEED_X);
    }
}
