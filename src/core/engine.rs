use crate::core::game::Game;
use anyhow::Result;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEventKind,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use std::io;
use std::time::Duration;
use tokio::time::{Instant, Interval};

// Redraw cadence, independent of the game clock.
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

pub struct Engine<G: Game> {
    game: G,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G) -> Self {
        Self { game }
    }

    /// Drive the game until the player presses Esc.
    ///
    /// Single-threaded cooperative loop: one `select!` multiplexes the
    /// terminal event stream, the game clock, and the render timer. All
    /// state lives on this one logical thread, so no locking anywhere.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let enhanced = matches!(
            crossterm::terminal::supports_keyboard_enhancement(),
            Ok(true)
        );
        crossterm::execute!(io::stdout(), EnableMouseCapture)?;
        if enhanced {
            crossterm::execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.event_loop(terminal).await;

        if enhanced {
            crossterm::execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        crossterm::execute!(io::stdout(), DisableMouseCapture)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut tick_rate = self.game.tick_rate();
        let mut interval = make_interval(tick_rate);
        let mut render_timer = tokio::time::interval(RENDER_INTERVAL);

        loop {
            // The simulation owns its tick rate (the snake speed-up mutates
            // it); pick up changes before scheduling the next tick.
            let current_rate = self.game.tick_rate();
            if current_rate != tick_rate {
                tick_rate = current_rate;
                interval = make_interval(tick_rate);
            }

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key)))
                            if key.code == KeyCode::Esc && key.kind == KeyEventKind::Press =>
                        {
                            return Ok(());
                        }
                        Some(Ok(event)) => self.game.handle_event(event),
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(()),
                    }
                }

                _ = async {
                    if let Some(ref mut i) = interval { i.tick().await; }
                    else { std::future::pending::<()>().await; }
                } => {
                    self.game.on_tick();
                }

                _ = render_timer.tick() => {
                    terminal.draw(|f| self.game.render(f))?;
                }
            }
        }
    }
}

// A fresh interval first fires after one full period, so a rate change
// never produces an immediate extra tick.
fn make_interval(rate: Option<Duration>) -> Option<Interval> {
    rate.map(|period| tokio::time::interval_at(Instant::now() + period, period))
}
