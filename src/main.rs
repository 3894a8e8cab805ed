use anyhow::{Result, anyhow};
use ratatui::DefaultTerminal;
use termcade::core::menu::{ArcadeMenu, MenuResult};
use termcade::games;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    // 1. Optional direct launch: `termcade <game-id>` skips the menu
    let args: Vec<String> = std::env::args().collect();
    let requested = args.get(1).cloned();

    // Validate the requested id before touching the terminal
    if let Some(id) = &requested {
        if games::get_game(id).is_none() {
            let known: Vec<_> = games::get_all_games().iter().map(|g| g.info.id).collect();
            return Err(anyhow!(
                "game '{}' not found in registry (known games: {})",
                id,
                known.join(", ")
            ));
        }
    }

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, requested).await;
    ratatui::restore();
    result
}

async fn run(terminal: &mut DefaultTerminal, requested: Option<String>) -> Result<()> {
    let registry = games::get_all_games();

    if let Some(id) = requested {
        let entry = registry
            .iter()
            .find(|g| g.info.id == id)
            .ok_or_else(|| anyhow!("game '{}' not found in registry", id))?;
        info!(game = %id, "launching game");
        return (entry.launcher)(terminal).await;
    }

    // 2. Arcade loop: menu -> game -> back to menu until the player quits
    let mut menu = ArcadeMenu::new();
    loop {
        match menu.run(terminal, &registry)? {
            MenuResult::Play(index) => {
                let entry = &registry[index];
                info!(game = %entry.info.id, "launching game");
                (entry.launcher)(terminal).await?;
            }
            MenuResult::Quit => break,
        }
    }
    Ok(())
}

/// The TUI owns stdout, so tracing goes to a file next to the binary.
fn init_logging() -> Result<()> {
    let file = std::fs::File::create("termcade.log")?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
