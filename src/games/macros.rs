/// Macro to register games in the registry with automatic launcher generation
///
/// Usage in games/mod.rs:
/// ```ignore
/// register_games! {
///     snake => {
///         game: SnakeGame,
///         id: "snake",
///         name: "Snake",
///         description: "Classic snake with obstacles and power-ups",
///         author: "Termcade Team"
///     },
/// }
/// ```
///
/// Every registered game needs a `fn new() -> anyhow::Result<Self>`
/// constructor; the generated launcher builds the game and hands it to the
/// engine together with the shared terminal.
#[macro_export]
macro_rules! register_games {
    (
        $(
            $module:ident => {
                game: $game:ident,
                id: $id:expr,
                name: $name:expr,
                description: $desc:expr,
                author: $author:expr
            }
        ),* $(,)?
    ) => {
        /// Get all available games with their metadata and launchers
        pub fn get_all_games() -> Vec<GameRegistry> {
            vec![
                $(
                    GameRegistry {
                        info: GameInfo {
                            id: $id,
                            name: $name,
                            description: $desc,
                            author: $author,
                        },
                        launcher: |terminal| {
                            Box::pin(async move {
                                use $crate::core::engine::Engine;
                                use $crate::games::$module::$game;

                                let game = $game::new()?;
                                Engine::new(game).run(terminal).await
                            })
                        },
                    }
                ),*
            ]
        }

        /// Get a game by ID
        pub fn get_game(id: &str) -> Option<GameRegistry> {
            get_all_games().into_iter().find(|g| g.info.id == id)
        }
    };
}
