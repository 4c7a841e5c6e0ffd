//! Per-update simulation step
//!
//! Drives the level state machine. A playing update runs, in order: portal
//! countdown, paddle, balls, power-ups, effect timers, lasers, paddle
//! contact, lost-ball removal, win check, render, loss check.

use super::bricks::BrickContact;
use super::entities::Ball;
use super::render::{DIM_BRIGHTNESS, draw_banner, draw_scene, text_scale};
use super::state::{BreakoutState, Phase};
use crate::clock::{FrameClock, FrameTime};
use crate::consts::BASE_FRAME_MS;
use crate::game::NextTick;
use crate::surface::{OverlayMode, Surface};

/// Normal frame cadence
pub const FRAME_MS: u32 = 50;
/// Pause after losing a life
pub const LIFE_LOST_MS: u32 = 300;
/// How long the win / game over banner stays up
pub const END_BANNER_MS: u32 = 2000;

/// Advance one host tick and render
pub fn update(state: &mut BreakoutState, clock: &mut FrameClock, surface: &mut dyn Surface) -> NextTick {
    if let Phase::Ended { waiting_to_disable } = state.phase {
        surface.clear();
        surface.flush();
        if waiting_to_disable {
            surface.set_mode(OverlayMode::Disabled);
            return NextTick::Done;
        }
        state.phase = Phase::Ended {
            waiting_to_disable: true,
        };
        return NextTick::Linger;
    }

    let frame = clock.frame(BASE_FRAME_MS);

    if let Phase::LevelIntro { remaining_ms } = state.phase {
        let remaining_ms = remaining_ms - frame.elapsed_ms;
        draw_scene(state, surface, DIM_BRIGHTNESS);
        let banner = format!("LEVEL {}", state.level + 1);
        draw_banner(surface, text_scale(state), &banner, None);
        surface.flush();
        if remaining_ms <= 0.0 {
            state.phase = Phase::Playing;
            clock.reset();
        } else {
            state.phase = Phase::LevelIntro { remaining_ms };
        }
        return NextTick::After(FRAME_MS);
    }

    step_playing(state, clock, frame, surface)
}

fn step_playing(
    state: &mut BreakoutState,
    clock: &mut FrameClock,
    frame: FrameTime,
    surface: &mut dyn Surface,
) -> NextTick {
    let scalar = frame.scalar as f32;

    state.portal_phase += frame.elapsed_ms * 0.02;
    if state.portal_ms > 0.0 {
        state.portal_ms -= frame.elapsed_ms;
        if state.portal_ms <= 0.0 {
            state.portal_ms = 0.0;
            log::info!("Breakout portal taken on level {}", state.level + 1);
            return handle_level_clear(state, clock, surface);
        }
    }

    state.paddle.slide(state.direction, scalar, state.panel_w);
    move_balls(state, scalar);
    update_power_ups(state, scalar);
    state.update_effect_timers(frame.elapsed_ms);
    update_lasers(state, scalar);
    paddle_contact(state);
    remove_lost_balls(state);

    if state.field.is_cleared() {
        log::info!(
            "Breakout level {} cleared (counter {}, live {}, bricks {})",
            state.level + 1,
            state.field.remaining_destructible(),
            state.field.live_destructible(),
            state.field.bricks.len()
        );
        return handle_level_clear(state, clock, surface);
    }

    draw_scene(state, surface, 1.0);
    surface.flush();

    if state.balls.is_empty() {
        if state.lose_life() {
            draw_scene(state, surface, DIM_BRIGHTNESS);
            surface.flush();
            return NextTick::After(LIFE_LOST_MS);
        }
        log::info!("Breakout game over on level {}", state.level + 1);
        state.phase = Phase::Ended {
            waiting_to_disable: false,
        };
        draw_scene(state, surface, DIM_BRIGHTNESS);
        draw_banner(surface, text_scale(state), "GAME", Some("OVER"));
        surface.flush();
        return NextTick::After(END_BANNER_MS);
    }

    NextTick::After(FRAME_MS)
}

/// Advance to the next level, or show the win banner after the last one
fn handle_level_clear(
    state: &mut BreakoutState,
    clock: &mut FrameClock,
    surface: &mut dyn Surface,
) -> NextTick {
    let next = state.level + 1;
    if next < BreakoutState::level_count() {
        state.load_level(next);
        clock.reset();
        draw_scene(state, surface, 1.0);
        surface.flush();
        return NextTick::After(FRAME_MS);
    }

    log::info!("Breakout won after {} levels", next);
    state.phase = Phase::Ended {
        waiting_to_disable: false,
    };
    draw_scene(state, surface, DIM_BRIGHTNESS);
    draw_banner(surface, text_scale(state), "YOU", Some("WIN"));
    surface.flush();
    NextTick::After(END_BANNER_MS)
}

fn bounce_off_walls(ball: &mut Ball, panel_w: f32) {
    if ball.rect.y < 0.0 {
        ball.dir.y = ball.dir.y.abs();
        ball.rect.y = 0.0;
    }
    if ball.rect.x < 0.0 {
        ball.dir.x = ball.dir.x.abs();
        ball.rect.x = 0.0;
    }
    if ball.rect.x >= panel_w {
        ball.dir.x = -ball.dir.x.abs();
        ball.rect.x = panel_w - 1.0;
    }
}

/// Move every ball and resolve wall and brick collisions
pub fn move_balls(state: &mut BreakoutState, scalar: f32) {
    let piercing = state.piercing();
    let paddle = state.paddle;
    let panel_w = state.panel_w as f32;
    let panel_h = state.panel_h as f32;
    let mut destroyed = Vec::new();

    let field = &mut state.field;
    state.balls.retain_mut(|ball| {
        if ball.stuck {
            ball.follow(&paddle);
            return true;
        }
        ball.advance(scalar);
        bounce_off_walls(ball, panel_w);
        match field.collide_ball(ball, piercing) {
            BrickContact::Miss => {
                field.seam_bounce(ball);
            }
            BrickContact::Damaged => {}
            BrickContact::Destroyed(brick) => destroyed.push(brick),
        }
        ball.rect.y < panel_h
    });

    for brick in destroyed {
        state.maybe_spawn_power_up(&brick);
    }
}

/// Drop power-ups; apply the ones the paddle catches
pub fn update_power_ups(state: &mut BreakoutState, scalar: f32) {
    let paddle = state.paddle;
    let panel_h = state.panel_h as f32;
    let mut caught = Vec::new();
    state.power_ups.retain_mut(|p| {
        p.fall(scalar);
        if p.rect.y >= panel_h {
            return false;
        }
        if p.caught_by(&paddle) {
            caught.push(p.kind);
            return false;
        }
        true
    });
    for kind in caught {
        state.apply_power_up(kind);
    }
}

/// Move lasers up; each is consumed by the first brick its tip sweeps past
pub fn update_lasers(state: &mut BreakoutState, scalar: f32) {
    let mut destroyed = Vec::new();
    let mut i = 0;
    while i < state.lasers.len() {
        let laser = state.lasers[i];
        let new_y = laser.y - laser.speed * scalar;
        if let Some(target) = state.field.laser_target(laser.x, laser.y, new_y) {
            if state.field.bricks[target].take_hit(false) {
                destroyed.push(state.field.remove(target));
            }
            state.lasers.remove(i);
            continue;
        }
        if new_y < 0.0 {
            state.lasers.remove(i);
            continue;
        }
        state.lasers[i].y = new_y;
        i += 1;
    }

    for brick in destroyed {
        state.maybe_spawn_power_up(&brick);
    }
}

/// Bounce (or catch, while sticky) balls landing on the paddle
pub fn paddle_contact(state: &mut BreakoutState) {
    let paddle = state.paddle;
    let sticky = state.sticky();
    for ball in state.balls.iter_mut().filter(|b| b.touches(&paddle)) {
        if sticky {
            ball.stick_to(&paddle);
        } else {
            ball.bounce_off(&paddle);
        }
    }
}

pub fn remove_lost_balls(state: &mut BreakoutState) {
    let panel_h = state.panel_h as f32;
    state.balls.retain(|b| b.rect.y < panel_h);
}
