//! Per-panel session registry
//!
//! At most one game runs on a panel. A button call for the game already
//! running is forwarded to it; anything else starts a fresh session sized
//! to the panel. Sessions are dropped once they report `NextTick::Done`.

use std::collections::HashMap;

use crate::game::{ArcadeGame, GameKind, NextTick};
use crate::settings::ArcadeOptions;
use crate::surface::Surface;

#[derive(Default)]
pub struct Arcade {
    sessions: HashMap<String, Box<dyn ArcadeGame>>,
}

impl std::fmt::Debug for Arcade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let running: Vec<_> = self
            .sessions
            .iter()
            .map(|(panel, game)| (panel.as_str(), game.name()))
            .collect();
        f.debug_struct("Arcade").field("sessions", &running).finish()
    }
}

impl Arcade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn running(&self, panel: &str) -> Option<GameKind> {
        self.sessions.get(panel).map(|g| g.kind())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Install a session directly, replacing whatever ran on `panel`
    pub fn insert(&mut self, panel: &str, game: Box<dyn ArcadeGame>) {
        log::info!("{} started on {panel}", game.name());
        self.sessions.insert(panel.to_string(), game);
    }

    /// Route a button token, starting `kind` on the panel if it isn't running
    pub fn button(
        &mut self,
        panel: &str,
        kind: GameKind,
        options: &ArcadeOptions,
        token: &str,
        surface: &mut dyn Surface,
    ) {
        if let Some(game) = self.sessions.get_mut(panel) {
            if game.kind() == kind {
                log::trace!("{panel}: {token}");
                game.on_button(token);
                return;
            }
        }

        surface.set_mode(options.overlay.overlay_mode());
        let mut game = kind.create(options, surface.width(), surface.height());
        if kind.forwards_starting_button() {
            game.on_button(token);
        }
        self.insert(panel, game);
    }

    /// Advance the panel's session; `None` when nothing is running
    pub fn update(&mut self, panel: &str, surface: &mut dyn Surface) -> Option<NextTick> {
        let next = self.sessions.get_mut(panel)?.update(surface);
        if next == NextTick::Done {
            if let Some(game) = self.sessions.remove(panel) {
                log::info!("{} finished on {panel}", game.name());
            }
        }
        Some(next)
    }

    /// Drop the panel's session without a final frame
    pub fn stop(&mut self, panel: &str) -> bool {
        self.sessions.remove(panel).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::OverlayStyle;
    use crate::surface::{OverlayMode, PixelGrid, Rgb};

    /// Finishes after a fixed number of updates, counting buttons
    struct Countdown {
        left: u32,
        buttons: std::sync::Arc<std::sync::atomic::AtomicUsize>,
    }

    impl ArcadeGame for Countdown {
        fn kind(&self) -> GameKind {
            GameKind::Tetris
        }

        fn update(&mut self, _surface: &mut dyn Surface) -> NextTick {
            self.left = self.left.saturating_sub(1);
            if self.left == 0 { NextTick::Done } else { NextTick::After(10) }
        }

        fn on_button(&mut self, _token: &str) {
            self.buttons
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn options() -> ArcadeOptions {
        ArcadeOptions {
            seed: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_arcade_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Arcade>();
    }

    #[test]
    fn test_first_button_starts_session() {
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        assert_eq!(arcade.update("panel", &mut grid), None);

        arcade.button("panel", GameKind::Breakout, &options(), "Fire", &mut grid);
        assert_eq!(arcade.running("panel"), Some(GameKind::Breakout));
        assert_eq!(grid.mode(), OverlayMode::Enabled);
        assert!(matches!(arcade.update("panel", &mut grid), Some(NextTick::After(_))));
        assert_eq!(arcade.running("other"), None);
    }

    #[test]
    fn test_transparent_overlay() {
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        let options = ArcadeOptions {
            overlay: OverlayStyle::Transparent,
            ..options()
        };
        arcade.button("panel", GameKind::Pong, &options, "Start", &mut grid);
        assert_eq!(grid.mode(), OverlayMode::TransparentRgb);
    }

    #[test]
    fn test_starting_button_forwarding() {
        // Pong receives the starting press: the left racket climbs
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        arcade.button("p", GameKind::Pong, &options(), "Up - Pressed", &mut grid);
        arcade.update("p", &mut grid);
        assert_eq!(grid.pixel(0, 12), Some(Rgb::WHITE));

        // Frogger does not: the frog is still on the start row
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        arcade.button("f", GameKind::Frogger, &options(), "Up - Pressed", &mut grid);
        arcade.update("f", &mut grid);
        assert_eq!(grid.pixel(32, 13), Some(Rgb::WHITE));

        // Once running, presses are delivered
        arcade.button("f", GameKind::Frogger, &options(), "Left - Pressed", &mut grid);
        arcade.update("f", &mut grid);
        assert_eq!(grid.pixel(31, 13), Some(Rgb::WHITE));
    }

    #[test]
    fn test_other_kind_replaces_session() {
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        arcade.button("panel", GameKind::Pong, &options(), "Start", &mut grid);
        arcade.button("panel", GameKind::Tetris, &options(), "Start", &mut grid);
        assert_eq!(arcade.running("panel"), Some(GameKind::Tetris));
        assert_eq!(arcade.session_count(), 1);
    }

    #[test]
    fn test_done_drops_session() {
        let buttons = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(8, 8);
        arcade.insert(
            "panel",
            Box::new(Countdown {
                left: 2,
                buttons: buttons.clone(),
            }),
        );
        arcade.button("panel", GameKind::Tetris, &options(), "Left - Pressed", &mut grid);
        assert_eq!(buttons.load(std::sync::atomic::Ordering::SeqCst), 1);

        assert_eq!(arcade.update("panel", &mut grid), Some(NextTick::After(10)));
        assert_eq!(arcade.update("panel", &mut grid), Some(NextTick::Done));
        assert_eq!(arcade.running("panel"), None);
        assert_eq!(arcade.update("panel", &mut grid), None);
    }

    #[test]
    fn test_stop() {
        let mut arcade = Arcade::new();
        let mut grid = PixelGrid::new(64, 32);
        arcade.button("panel", GameKind::Frogger, &options(), "Start", &mut grid);
        assert!(arcade.stop("panel"));
        assert!(!arcade.stop("panel"));
    }
}
