/// Core game interface for the termcade framework
use std::time::Duration;

/// Main game trait that all games must implement
/// This provides a standard interface for single-player terminal games
/// driven by one periodic clock and one crossterm event stream.
pub trait Game {
    /// How often `on_tick` should fire. `None` means the game is purely
    /// event-driven (or its clock is currently stopped). The engine re-reads
    /// this every scheduling cycle, so a game may change it at runtime.
    fn tick_rate(&self) -> Option<Duration>;

    /// Advance the simulation by one discrete step.
    fn on_tick(&mut self);

    /// Translate a raw terminal event (key press/release, mouse click) into
    /// state mutations. Esc never reaches the game; the engine owns it.
    fn handle_event(&mut self, event: crossterm::event::Event);

    /// Draw the current state into the frame.
    fn render(&mut self, frame: &mut ratatui::Frame);
}
