//! Fixed timestep simulation tick
//!
//! Drives the level/game state machine. Physics, power-ups and the boss only
//! run while `Playing`, and so does paddle movement; input outside of that
//! only changes phase.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::events::{GameEvent, GameOverCause};
use super::levels::{self, level_count};
use super::physics::{self, StepOutcome};
use super::powerups;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard steering
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
    /// Target paddle position in the XZ plane (from the pointer)
    pub target: Option<Vec2>,
    /// Start / continue / retry (Enter or space)
    pub confirm: bool,
    /// Pause toggle
    pub pause: bool,
    /// Throw the session away and start over
    pub restart: bool,
    /// Skip to next level (debug/testing)
    pub skip_level: bool,
    /// Demo mode - the paddle plays itself
    pub autopilot: bool,
    pub toggle_trajectory: bool,
}

impl TickInput {
    /// Keyboard steering as an XZ direction (forward is -Z)
    pub fn steer(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| pos as i32 as f32 - neg as i32 as f32;
        Vec2::new(axis(self.left, self.right), axis(self.forward, self.back))
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if input.restart {
        restart(state);
        return;
    }

    if input.toggle_trajectory {
        state.settings.show_trajectory = !state.settings.show_trajectory;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                log::info!("Paused");
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => {
                log::info!("Resumed");
                state.phase = GamePhase::Playing;
            }
            _ => {}
        }
    }

    if state.phase == GamePhase::Paused {
        return;
    }

    state.now_ms += dt_ms;
    announce_next_level(state);

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }
    let input = &input;

    if input.skip_level {
        skip_level(state);
        return;
    }

    move_paddle(state, input);

    match state.phase {
        GamePhase::WaitingForStart => {
            if input.confirm {
                state.reset_ball();
                let now = state.now_ms;
                if let Some(boss) = state.bricks.iter_mut().find_map(|b| b.boss_mut()) {
                    boss.last_attack_at = now;
                }
                state.phase = GamePhase::Playing;
                log::info!("Level {} started", state.level);
            }
        }
        GamePhase::LevelComplete | GamePhase::GameOver => {
            if input.confirm {
                let level = state.level;
                if state.load_level(level).is_ok() {
                    state.phase = GamePhase::Playing;
                    log::info!("Level {} started", level);
                }
            }
        }
        GamePhase::Playing => play(state),
        GamePhase::Paused => {}
    }
}

fn play(state: &mut GameState) {
    if state.primary_ball().is_none() {
        log::warn!("Tick skipped: no primary ball");
        return;
    }

    if physics::step_balls(state) == StepOutcome::BallLost {
        game_over(state, GameOverCause::BallLost);
        return;
    }

    powerups::update(state);
    powerups::expire_effects(state);

    if let Some(cause) = boss::update(state) {
        game_over(state, cause);
        return;
    }

    // Recount every tick: chain reactions can clear many bricks at once
    if state.active_brick_count() == 0 {
        level_complete(state);
    }
}

/// The paddle stays put until the ball is launched
fn move_paddle(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let steer = input.steer();
    if steer != Vec2::ZERO {
        state.paddle.step(steer);
    }
    if let Some(target) = input.target {
        state.paddle.move_toward(target);
    }
}

fn game_over(state: &mut GameState, cause: GameOverCause) {
    log::info!("Game over ({:?}) on level {} with score {}", cause, state.level, state.score);
    state.phase = GamePhase::GameOver;
    state.park_ball();
    state.clear_transient();
    state.emit(GameEvent::GameOver { cause });
}

fn level_complete(state: &mut GameState) {
    let finished = state.level;
    let next = state
        .settings
        .level_progression
        .next_level(finished, level_count());
    log::info!("Level {} complete, next is {}", finished, next);

    state.level = next;
    state.phase = GamePhase::LevelComplete;
    state.level_info_at = Some(state.now_ms + NEXT_LEVEL_INFO_DELAY_MS);
    state.park_ball();
    state.clear_transient();
    state.emit(GameEvent::LevelComplete { level: finished });
}

/// Emit the delayed "next level" message once it is due
fn announce_next_level(state: &mut GameState) {
    let Some(at) = state.level_info_at else {
        return;
    };
    if state.now_ms < at {
        return;
    }
    state.level_info_at = None;
    if let Ok(def) = levels::level(state.level) {
        state.emit(GameEvent::NextLevelInfo {
            level: def.number,
            name: def.name.to_string(),
            description: def.description.to_string(),
        });
    }
}

/// Start a new session with the same settings
fn restart(state: &mut GameState) {
    let seed = state.rng.random::<u64>();
    match GameState::new(state.settings.clone(), seed) {
        Ok(fresh) => {
            *state = fresh;
            log::info!("New session (seed {})", seed);
        }
        Err(e) => log::error!("Restart failed: {}", e),
    }
}

/// Debug: jump to the next level and wait for confirm
fn skip_level(state: &mut GameState) {
    let next = state
        .settings
        .level_progression
        .next_level(state.level, level_count());
    if state.load_level(next).is_ok() {
        state.phase = GamePhase::WaitingForStart;
        log::info!("Skipped to level {}", next);
    }
}

/// Demo mode: follow the primary ball and confirm every prompt
fn autopilot(state: &GameState, input: &mut TickInput) {
    if matches!(
        state.phase,
        GamePhase::WaitingForStart | GamePhase::LevelComplete | GamePhase::GameOver
    ) {
        input.confirm = true;
    }

    // Catch falling power-ups while the ball is climbing
    let climbing = state.primary_ball().is_some_and(|b| b.vel.y > 0.0);
    let lowest_pickup = state.powerups.iter().min_by(|a, b| {
        a.pos
            .y
            .partial_cmp(&b.pos.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    match (climbing, lowest_pickup, state.primary_ball()) {
        (true, Some(p), _) => input.target = Some(Vec2::new(p.pos.x, p.pos.z)),
        (_, _, Some(ball)) => input.target = Some(Vec2::new(ball.pos.x, ball.pos.z)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{LevelProgression, Settings};
    use crate::sim::state::{ball_spawn_position, Barrier, BrickKind, Hazard, PowerUpKind};
    use glam::Vec3;
    use proptest::prelude::*;

    const DT: f64 = SIM_DT_MS;

    fn confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    fn playing(level: u32) -> GameState {
        let settings = Settings {
            starting_level: level,
            ..Settings::default()
        };
        let mut state = GameState::new(settings, 12345).unwrap();
        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
        state.powerup_chance = 0.0;
        state
    }

    fn set_ball(state: &mut GameState, pos: Vec3, vel: Vec3) {
        let ball = state.primary_ball_mut().unwrap();
        ball.pos = pos;
        ball.vel = vel;
    }

    /// Replace the level's bricks with one brick at (0, 10, 0)
    fn single_brick(state: &mut GameState, kind: BrickKind) {
        state.bricks.clear();
        state.push_brick(Vec3::new(0.0, 10.0, 0.0), Vec3::new(2.0, 1.0, 1.0), kind);
    }

    #[test]
    fn test_tick_waiting_to_playing() {
        let mut state = GameState::new(Settings::default(), 1).unwrap();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::WaitingForStart);
        assert_eq!(state.primary_ball().unwrap().pos, ball_spawn_position());

        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
        let ball = state.primary_ball().unwrap();
        assert!(ball.vel.y > 0.0);
        assert!((ball.vel.length() - state.ball_speed()).abs() < 1e-5);
    }

    #[test]
    fn test_paddle_bounce_restores_speed() {
        let mut state = playing(1);
        let paddle_y = state.paddle.pos.y;
        set_ball(&mut state, Vec3::new(0.0, paddle_y + 1.0, 0.0), Vec3::new(0.0, -0.2, 0.0));

        tick(&mut state, &TickInput::default(), DT);

        let ball = state.primary_ball().unwrap();
        assert!(ball.vel.y > 0.0);
        assert!((ball.vel.length() - 0.5).abs() < 1e-5);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_strong_brick_two_hits_completes_level() {
        let mut state = playing(1);
        single_brick(&mut state, BrickKind::Strong);
        let score = state.score;

        set_ball(&mut state, Vec3::new(0.0, 8.0, 0.0), Vec3::new(0.0, 0.5, 0.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.bricks[0].hits_remaining, 1);
        assert!(state.bricks[0].active);
        assert_eq!(state.active_brick_count(), 1);
        assert_eq!(state.phase, GamePhase::Playing);

        set_ball(&mut state, Vec3::new(0.0, 8.0, 0.0), Vec3::new(0.0, 0.5, 0.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.bricks[0].hits_remaining, 0);
        assert!(!state.bricks[0].active);
        assert_eq!(state.score, score + 200);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.level, 2);
        assert!(state.events.contains(&GameEvent::LevelComplete { level: 1 }));
    }

    #[test]
    fn test_explosive_ball_clears_neighbours() {
        let mut state = playing(1);
        state.bricks.clear();
        let half = Vec3::new(2.0, 1.0, 1.0);
        state.push_brick(Vec3::new(0.0, 10.0, 0.0), half, BrickKind::Normal);
        for x in [-4.8, 4.8, 0.0] {
            let z = if x == 0.0 { 2.8 } else { 0.0 };
            state.push_brick(Vec3::new(x, 10.0, z), half, BrickKind::Normal);
        }
        state.push_brick(Vec3::new(14.4, 10.0, 0.0), half, BrickKind::Normal);
        powerups::apply(&mut state, PowerUpKind::ExplosiveBall);
        let score = state.score;

        set_ball(&mut state, Vec3::new(0.0, 8.0, 0.0), Vec3::new(0.0, 0.5, 0.0));
        tick(&mut state, &TickInput::default(), DT);

        assert!(state.bricks[..4].iter().all(|b| !b.active));
        assert!(state.bricks[4].active);
        assert_eq!(state.score, score + 100 + 3 * 50);
    }

    #[test]
    fn test_barrier_saves_ball() {
        let mut state = playing(1);
        state.barrier = Some(Barrier::timed(state.now_ms));
        set_ball(&mut state, Vec3::new(15.0, -24.0, 15.0), Vec3::new(0.0, -0.5, 0.0));

        tick(&mut state, &TickInput::default(), DT);

        let ball = state.primary_ball().unwrap();
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.pos.y, -25.0 + BALL_RADIUS);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_ball_lost_is_game_over() {
        let mut state = playing(1);
        state.score = 700;
        set_ball(&mut state, Vec3::new(15.0, -24.0, 15.0), Vec3::new(0.0, -0.5, 0.0));

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver {
            cause: GameOverCause::BallLost
        }));
        let ball = state.primary_ball().unwrap();
        assert_eq!(ball.pos, ball_spawn_position());
        assert_eq!(ball.vel, Vec3::ZERO);

        // Nothing moves until confirm
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.primary_ball().unwrap().pos, ball_spawn_position());
        assert_eq!(state.score, 700);
        assert_eq!(state.level, 1);
        assert_eq!(state.active_brick_count(), 24);
    }

    #[test]
    fn test_pause_freezes_clock_and_effects() {
        let mut state = playing(1);
        powerups::apply(&mut state, PowerUpKind::ExplosiveBall);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);
        let now = state.now_ms;
        let ball_pos = state.primary_ball().unwrap().pos;

        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.now_ms, now);
        assert_eq!(state.primary_ball().unwrap().pos, ball_pos);
        assert!(state.primary_ball().unwrap().explosive);

        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.now_ms > now);
    }

    #[test]
    fn test_progression_wraps_after_final_level() {
        let mut state = playing(5);
        state.bricks.retain(|_| false);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.level, 6);

        let mut state = playing(6);
        state.bricks[0].active = false;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_progression_caps_on_final_level() {
        let settings = Settings {
            starting_level: 6,
            level_progression: LevelProgression::Cap,
            ..Settings::default()
        };
        let mut state = GameState::new(settings, 9).unwrap();
        tick(&mut state, &confirm(), DT);
        state.bricks[0].active = false;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.level, 6);
        tick(&mut state, &confirm(), DT);
        assert!(state.boss().is_some());
    }

    #[test]
    fn test_next_level_info_is_delayed() {
        let mut state = playing(1);
        state.bricks.clear();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        state.drain_events();

        // 170 ticks is just short of the delay, 190 just past it
        for _ in 0..170 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::NextLevelInfo { .. })));
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::NextLevelInfo { level: 2, .. }
        )));
    }

    #[test]
    fn test_next_level_info_dropped_on_quick_continue() {
        let mut state = playing(1);
        state.bricks.clear();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);

        tick(&mut state, &confirm(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 2);
        assert!(state.level_info_at.is_none());
        state.drain_events();

        state.barrier = Some(Barrier::permanent(state.now_ms));
        for _ in 0..240 {
            tick(&mut state, &TickInput::default(), DT);
            assert!(!state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::NextLevelInfo { .. })));
        }
    }

    #[test]
    fn test_paddle_frozen_until_launch() {
        let mut state = GameState::new(Settings::default(), 5).unwrap();
        let steer = TickInput {
            right: true,
            target: Some(Vec2::new(10.0, 5.0)),
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &steer, DT);
        }
        assert_eq!(state.phase, GamePhase::WaitingForStart);
        assert_eq!(state.paddle.pos.x, 0.0);
        assert_eq!(state.paddle.pos.z, 0.0);

        tick(&mut state, &confirm(), DT);
        let ball = state.primary_ball().unwrap();
        assert_eq!(ball.pos.x, state.paddle.pos.x);
        assert_eq!(ball.pos.z, state.paddle.pos.z);

        tick(&mut state, &steer, DT);
        assert!(state.paddle.pos.x > 0.0);
    }

    #[test]
    fn test_boss_hazard_ends_game() {
        let mut state = playing(6);
        let now = state.now_ms;
        let (x, z) = (state.paddle.pos.x, state.paddle.pos.z);
        state.bricks[0].boss_mut().unwrap().hazards.push(Hazard {
            x,
            z,
            resolve_at: now + DT,
            struck_at: None,
        });
        assert!(state.in_boss_fight());

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver {
            cause: GameOverCause::BossHazard
        }));
        assert!(!state.in_boss_fight());
    }

    #[test]
    fn test_boss_level_has_permanent_barrier() {
        let mut state = playing(6);
        set_ball(&mut state, Vec3::new(15.0, -24.0, 15.0), Vec3::new(0.0, -0.5, 0.0));
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_resets_score() {
        let mut state = playing(1);
        state.score = 1234;
        state.settings.show_trajectory = false;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::WaitingForStart);
        assert!(!state.settings.show_trajectory);
    }

    #[test]
    fn test_skip_level() {
        let mut state = playing(2);
        let skip = TickInput {
            skip_level: true,
            ..Default::default()
        };
        tick(&mut state, &skip, DT);
        assert_eq!(state.level, 3);
        assert_eq!(state.phase, GamePhase::WaitingForStart);
        assert_eq!(state.active_brick_count(), 50);
    }

    #[test]
    fn test_keyboard_and_pointer_steering() {
        let mut state = playing(1);
        let right = TickInput {
            right: true,
            forward: true,
            ..Default::default()
        };
        tick(&mut state, &right, DT);
        assert!(state.paddle.pos.x > 0.0);
        assert!(state.paddle.pos.z < 0.0);

        let toward = TickInput {
            target: Some(Vec2::new(-10.0, 0.0)),
            ..Default::default()
        };
        for _ in 0..200 {
            tick(&mut state, &toward, DT);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        assert!((state.paddle.pos.x + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(Settings::default(), 99999).unwrap();
        let mut state2 = GameState::new(Settings::default(), 99999).unwrap();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut state1, &input, DT);
            tick(&mut state2, &input, DT);
        }
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.balls.len(), state2.balls.len());
        assert_eq!(state1.primary_ball().unwrap().pos, state2.primary_ball().unwrap().pos);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_level_complete_iff_no_bricks(seed in 0u64..10_000, level in 1u32..=6) {
            let settings = Settings { starting_level: level, ..Settings::default() };
            let mut state = GameState::new(settings, seed).unwrap();
            let input = TickInput { autopilot: true, ..Default::default() };
            let mut score = state.score;
            for _ in 0..1500 {
                let before = state.phase;
                tick(&mut state, &input, DT);
                if state.phase == GamePhase::Playing {
                    prop_assert!(state.active_brick_count() > 0);
                }
                if before == GamePhase::Playing && state.phase == GamePhase::LevelComplete {
                    prop_assert_eq!(state.active_brick_count(), 0);
                }
                prop_assert!(state.score >= score);
                score = state.score;
            }
        }
    }
}
