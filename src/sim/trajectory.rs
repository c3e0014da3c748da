//! Predicted ball path for the aiming guide
//!
//! Walls and ceiling only: bricks and the paddle are ignored, so the path is a
//! hint rather than a forecast.

use glam::Vec3;

use super::state::GameState;
use crate::play_half_extents;

/// Default number of guide points published to the renderer
pub const TRAJECTORY_POINTS: usize = 100;
/// Sub-steps between consecutive points (each a tenth of a tick)
const SUBSTEPS: usize = 10;
const SUBSTEP: f32 = 0.1;

/// Up to `points` positions along the primary ball's path, starting at the ball
///
/// Empty without a primary ball; a single point while the ball is at rest.
pub fn predict(state: &GameState, points: usize) -> Vec<Vec3> {
    let Some(ball) = state.primary_ball() else {
        return Vec::new();
    };
    let dir = ball.vel.normalize_or_zero();
    if dir == Vec3::ZERO || points == 0 {
        return vec![ball.pos];
    }

    let limit = play_half_extents() - Vec3::splat(ball.radius);
    let mut vel = dir * state.ball_speed();
    let mut pos = ball.pos;
    let mut path = Vec::with_capacity(points);
    path.push(pos);

    while path.len() < points {
        for _ in 0..SUBSTEPS {
            pos += vel * SUBSTEP;
            if pos.x >= limit.x {
                vel.x = -vel.x.abs();
            } else if pos.x <= -limit.x {
                vel.x = vel.x.abs();
            }
            if pos.y >= limit.y {
                vel.y = -vel.y.abs();
            }
            if pos.z >= limit.z {
                vel.z = -vel.z.abs();
            } else if pos.z <= -limit.z {
                vel.z = vel.z.abs();
            }
        }
        path.push(pos);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_path_starts_at_ball() {
        let state = GameState::new(Settings::default(), 1).unwrap();
        let path = predict(&state, TRAJECTORY_POINTS);
        assert_eq!(path.len(), TRAJECTORY_POINTS);
        assert_eq!(path[0], state.primary_ball().unwrap().pos);
    }

    #[test]
    fn test_path_reflects_off_side_wall() {
        let mut state = GameState::new(Settings::default(), 1).unwrap();
        {
            let ball = state.primary_ball_mut().unwrap();
            ball.pos = Vec3::new(18.0, 0.0, 0.0);
            ball.vel = Vec3::X;
        }
        let path = predict(&state, 20);
        let limit = 20.0 - state.primary_ball().unwrap().radius;
        // Overshoot is bounded by one sub-step
        assert!(path.iter().all(|p| p.x <= limit + 0.05 + 1e-4));
        assert!(path.last().unwrap().x < 18.0);
    }

    #[test]
    fn test_resting_ball_single_point() {
        let mut state = GameState::new(Settings::default(), 1).unwrap();
        state.park_ball();
        assert_eq!(predict(&state, 50).len(), 1);
    }
}
