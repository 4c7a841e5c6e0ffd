//! Common contract for every cabinet game

use serde::{Deserialize, Serialize};

use crate::breakout::Breakout;
use crate::frogger::Frogger;
use crate::pong::Pong;
use crate::settings::ArcadeOptions;
use crate::surface::Surface;
use crate::tetris::Tetris;

/// What the host should do after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTick {
    /// Call again after this many milliseconds
    After(u32),
    /// Call once more, then the game disables output
    Linger,
    /// Rendering is torn down; drop the session
    Done,
}

impl NextTick {
    /// Host-side integer encoding (`-1` linger, `0` done)
    pub fn as_millis(&self) -> i32 {
        match *self {
            NextTick::After(ms) => ms.min(i32::MAX as u32) as i32,
            NextTick::Linger => -1,
            NextTick::Done => 0,
        }
    }
}

/// Which game variant a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Breakout,
    Pong,
    Frogger,
    Tetris,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Breakout,
        GameKind::Pong,
        GameKind::Frogger,
        GameKind::Tetris,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GameKind::Breakout => "Breakout",
            GameKind::Pong => "Pong",
            GameKind::Frogger => "Frogger",
            GameKind::Tetris => "Tetris",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether the button that starts a session is also delivered to it
    pub fn forwards_starting_button(&self) -> bool {
        matches!(self, GameKind::Pong | GameKind::Tetris)
    }

    /// Construct a fresh session sized to the panel
    pub fn create(&self, options: &ArcadeOptions, width: i32, height: i32) -> Box<dyn ArcadeGame> {
        match self {
            GameKind::Breakout => Box::new(Breakout::new(options, width, height)),
            GameKind::Pong => Box::new(Pong::new(options, width, height)),
            GameKind::Frogger => Box::new(Frogger::new(options, width, height)),
            GameKind::Tetris => Box::new(Tetris::new(options, width, height)),
        }
    }
}

/// Render + advance + input contract implemented by each game
pub trait ArcadeGame: Send {
    fn kind(&self) -> GameKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Advance one tick and render into `surface`
    fn update(&mut self, surface: &mut dyn Surface) -> NextTick;

    /// Apply a host button token; never draws
    fn on_button(&mut self, token: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelGrid;

    #[test]
    fn test_next_tick_encoding() {
        assert_eq!(NextTick::After(50).as_millis(), 50);
        assert_eq!(NextTick::Linger.as_millis(), -1);
        assert_eq!(NextTick::Done.as_millis(), 0);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(GameKind::from_name("breakout"), Some(GameKind::Breakout));
        assert_eq!(GameKind::from_name("Asteroids"), None);
    }

    #[test]
    fn test_every_kind_constructs_and_ticks() {
        let options = ArcadeOptions {
            seed: Some(7),
            ..Default::default()
        };
        for kind in GameKind::ALL {
            let mut grid = PixelGrid::new(64, 32);
            let mut game = kind.create(&options, 64, 32);
            assert_eq!(game.kind(), kind);
            assert_eq!(game.name(), kind.name());
            let next = game.update(&mut grid);
            assert!(matches!(next, NextTick::After(_)), "{kind:?} -> {next:?}");
            game.on_button("Nonsense - Pressed");
        }
    }
}
