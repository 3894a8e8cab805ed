use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::board::{Board, CellState, Phase};

/// Draw the board and return the on-screen rectangle of the grid so the
/// input adapter can map mouse clicks back to cells.
pub fn draw(frame: &mut Frame, board: &Board, cursor: (usize, usize)) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Status
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    let header = Paragraph::new(" MINESWEEPER ")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    let (status_text, status_color) = match board.phase() {
        Phase::Playing => (format!("Mines left: {}", board.mines_left()), Color::Yellow),
        Phase::Won => ("You win! All safe cells revealed.".to_string(), Color::Green),
        Phase::Lost => ("Boom! You stepped on a mine.".to_string(), Color::Red),
    };
    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(Style::default().fg(status_color));
    frame.render_widget(status, chunks[1]);

    let grid_rect = centered_grid(board, chunks[2]);
    let lines: Vec<Line> = (0..board.height())
        .map(|row| {
            Line::from(
                (0..board.width())
                    .map(|col| cell_span(board, row, col, cursor == (row, col)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), grid_rect);

    let footer = match board.phase() {
        Phase::Playing => "[↑↓←→] Move  [Enter] Reveal  [F] Flag  [Mouse] left reveal / right flag  [Esc] Menu",
        _ => "[R] Restart  [Esc] Menu",
    };
    frame.render_widget(
        Paragraph::new(footer).alignment(Alignment::Center),
        chunks[3],
    );

    grid_rect
}

// Center the grid in the available area; cells are two columns wide.
fn centered_grid(board: &Board, area: Rect) -> Rect {
    let grid_w = (board.width() * 2) as u16;
    let grid_h = board.height() as u16;
    let x = area.x + area.width.saturating_sub(grid_w) / 2;
    let y = area.y + area.height.saturating_sub(grid_h) / 2;
    Rect::new(x, y, grid_w, grid_h).intersection(area)
}

fn cell_span(board: &Board, row: usize, col: usize, selected: bool) -> Span<'static> {
    let (text, mut style) = match board.cell(row, col) {
        CellState::Hidden => ("■ ".to_string(), Style::default().fg(Color::DarkGray)),
        CellState::Flagged => ("⚑ ".to_string(), Style::default().fg(Color::Green)),
        CellState::Revealed(_) if board.is_mine(row, col) => {
            ("✹ ".to_string(), Style::default().fg(Color::Red))
        }
        CellState::Revealed(0) => ("· ".to_string(), Style::default().fg(Color::DarkGray)),
        CellState::Revealed(n) => (format!("{} ", n), Style::default().fg(number_color(n))),
    };
    if board.triggered_mine() == Some((row, col)) {
        style = style.fg(Color::White).bg(Color::Red);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn number_color(n: u8) -> Color {
    match n {
        1 => Color::Blue,
        2 => Color::Green,
        3 => Color::Red,
        4 => Color::Magenta,
        _ => Color::Yellow,
    }
}
