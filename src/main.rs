//! Pixel Arcade headless demo
//!
//! Usage: `pixel-arcade [breakout|pong|frogger|tetris] [ticks] [config.json]`
//! (see `--help`)
//!
//! Runs one session on an in-memory 64x32 panel, feeding it a scripted
//! sequence of button presses, then prints the final frame as ASCII.

use std::path::{Path, PathBuf};

use clap::Parser;
use pixel_arcade::{Arcade, ArcadeOptions, GameKind, NextTick, PixelGrid};

const PANEL: &str = "demo";
const PANEL_W: i32 = 64;
const PANEL_H: i32 = 32;
const DEFAULT_TICKS: u32 = 300;

#[derive(Parser, Debug)]
#[command(name = "pixel-arcade", version, about = "Run one arcade session on a headless 64x32 panel")]
struct Args {
    /// Game to run: breakout, pong, frogger or tetris
    #[arg(value_parser = parse_game)]
    game: Option<GameKind>,
    /// Number of updates to simulate
    #[arg(default_value_t = DEFAULT_TICKS)]
    ticks: u32,
    /// Panel options as JSON
    config: Option<PathBuf>,
}

fn parse_game(name: &str) -> Result<GameKind, String> {
    GameKind::from_name(name).ok_or_else(|| {
        let known: Vec<_> = GameKind::ALL.iter().map(|k| k.name().to_lowercase()).collect();
        format!("unknown game '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Button token to send before update `tick`, if any
fn scripted_input(kind: GameKind, tick: u32) -> Option<&'static str> {
    match kind {
        GameKind::Breakout => match tick % 40 {
            0 => Some("Fire"),
            5 => Some("Left - Pressed"),
            15 => Some("Left - Released"),
            20 => Some("Right - Pressed"),
            30 => Some("Right - Released"),
            _ => None,
        },
        GameKind::Pong => match tick % 24 {
            0 => Some("Up - Pressed"),
            6 => Some("Up - Released"),
            12 => Some("Down - Pressed"),
            18 => Some("Down - Released"),
            _ => None,
        },
        GameKind::Frogger => match tick % 12 {
            0 => Some("Up - Pressed"),
            6 => Some("Left - Pressed"),
            _ => None,
        },
        GameKind::Tetris => match tick % 16 {
            0 => Some("Up - Pressed"),
            4 => Some("Right - Pressed"),
            6 => Some("Right - Released"),
            10 => Some("Down - Pressed"),
            14 => Some("Down - Released"),
            _ => None,
        },
    }
}

fn load_options(path: Option<&Path>) -> ArcadeOptions {
    let Some(path) = path else {
        return ArcadeOptions::default();
    };
    match std::fs::read_to_string(path) {
        Ok(json) => ArcadeOptions::from_json_or_default(&json),
        Err(e) => {
            log::warn!("Could not read {}: {e}; using defaults", path.display());
            ArcadeOptions::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args = Args::parse();
    let kind = args.game.unwrap_or(GameKind::Breakout);
    let ticks = args.ticks;
    let options = load_options(args.config.as_deref());

    log::info!("Pixel Arcade demo: {} for {ticks} ticks", kind.name());
    let mut grid = PixelGrid::new(PANEL_W, PANEL_H);
    let mut arcade = Arcade::new();
    arcade.button(PANEL, kind, &options, "Start", &mut grid);

    let mut simulated_ms: u64 = 0;
    for tick in 0..ticks {
        if let Some(token) = scripted_input(kind, tick) {
            arcade.button(PANEL, kind, &options, token, &mut grid);
        }
        match arcade.update(PANEL, &mut grid) {
            Some(NextTick::After(ms)) => simulated_ms += u64::from(ms),
            Some(NextTick::Linger) => {}
            Some(NextTick::Done) | None => {
                log::info!("Session ended after {tick} ticks");
                break;
            }
        }
    }

    println!("{} after {simulated_ms} ms of scheduled time", kind.name());
    print!("{}", grid.to_ascii());
    for span in grid.text() {
        println!("text {:?} at ({}, {})", span.text, span.grid_x, span.grid_y);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
