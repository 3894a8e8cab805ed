use ratatui::{
    widgets::{Block, Borders, List, ListItem, Paragraph},
    layout::{Layout, Constraint, Direction},
    style::{Style, Color, Modifier},
    Frame,
};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;
use anyhow::Result;

use crate::games::GameRegistry;

pub enum MenuResult {
    Play(usize), // index into the registry
    Quit,
}

pub struct ArcadeMenu {
    pub selected_index: usize,
}

impl ArcadeMenu {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn run(&mut self, terminal: &mut ratatui::DefaultTerminal, games: &[GameRegistry]) -> Result<MenuResult> {
        loop {
            terminal.draw(|f| self.render(f, games))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    match key.code {
                        KeyCode::Enter => return Ok(MenuResult::Play(self.selected_index)),
                        KeyCode::Up => self.selected_index = self.selected_index.saturating_sub(1),
                        KeyCode::Down => {
                            self.selected_index = (self.selected_index + 1).min(games.len() - 1)
                        }
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                        _ => {}
                    }
                }
            }
        }
    }

    fn render(&self, f: &mut Frame, games: &[GameRegistry]) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        f.render_widget(
            Paragraph::new(" TERMCADE ARCADE ")
                .block(Block::default().borders(Borders::ALL))
                .alignment(ratatui::layout::Alignment::Center),
            chunks[0],
        );

        let items: Vec<ListItem> = games.iter().enumerate().map(|(i, g)| {
            let style = if i == self.selected_index {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" » {} : {}", g.info.name, g.info.description)).style(style)
        }).collect();

        f.render_widget(
            List::new(items).block(Block::default().title(" AVAILABLE GAMES ").borders(Borders::ALL)),
            chunks[1],
        );

        f.render_widget(
            Paragraph::new("[↑/↓] Navigate  [Enter] Play  [Q] Quit  (in game: Esc returns here)")
                .alignment(ratatui::layout::Alignment::Center),
            chunks[2],
        );
    }
}

impl Default for ArcadeMenu {
    fn default() -> Self {
        Self::new()
    }
}
