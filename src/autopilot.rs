//! Demo-mode autopilot
//!
//! A small reactive policy used for attract-mode and headless demos. It hops
//! over grounded obstacles, ducks under flying ones, and dashes through
//! anything a jump can no longer clear. Idle frames chase pickups overhead.

use crate::consts::*;
use crate::sim::{Controls, GameState};

/// How many frames ahead the policy looks for threats
const LOOKAHEAD_FRAMES: f32 = 7.0;
/// An obstacle this close horizontally can no longer be jumped
const PANIC_DISTANCE: f32 = 12.0;

/// Pick controls for the next frame
pub fn decide(state: &GameState, now: u64) -> Controls {
    let mut controls = Controls::default();
    if !state.is_playing() || state.is_paused() {
        return controls;
    }

    let body = state.player.bounds();
    let reach = OBSTACLE_SPEED * state.game_speed * LOOKAHEAD_FRAMES;

    // Nearest obstacle still ahead of (or overlapping) the player
    let threat = state
        .obstacles
        .iter()
        .map(|o| o.bounds())
        .filter(|b| b.max.x > body.min.x)
        .min_by(|a, b| a.min.x.total_cmp(&b.min.x));

    if let Some(bounds) = threat {
        let distance = bounds.min.x - body.max.x;
        // Flying obstacles pass over a standing runner
        let low = bounds.min.y + OBSTACLE_PADDING < body.min.y + PLAYER_SIZE;
        if distance < reach && !state.is_invulnerable(now) {
            if !low {
                // Keep the hitbox short while something passes overhead
                controls.slide = state.player.is_grounded() && !state.player.sliding;
            } else if state.player.is_grounded() && distance > PANIC_DISTANCE {
                controls.jump = true;
            } else if distance <= PANIC_DISTANCE && state.player.dash_charges > 0 {
                controls.dash = true;
            }
            return controls;
        }
    }

    // Nothing dangerous nearby: hop for pickups overhead
    let pickup_overhead = state.collectibles.iter().any(|c| {
        let b = c.bounds();
        let dx = b.min.x - body.max.x;
        (0.0..reach).contains(&dx) && b.min.y > body.max.y
    });
    if pickup_overhead && state.player.is_grounded() {
        controls.jump = true;
    }
    controls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EntityId, Lane, Obstacle, ObstacleKind, WaveId};
    use crate::sim::state::RunPhase;
    use glam::Vec2;

    fn running() -> GameState {
        let mut state = GameState::idle(BASE_GAME_SPEED, 900.0);
        state.phase = RunPhase::Running;
        state
    }

    fn obstacle(x: f32, y: f32) -> Obstacle {
        Obstacle::new(
            EntityId {
                wave: WaveId(0),
                lane: Lane::Obstacle,
                slot: 0,
            },
            ObstacleKind::Bear,
            Vec2::new(x, y),
        )
    }

    #[test]
    fn test_jumps_grounded_obstacle() {
        let mut state = running();
        state.obstacles.push(obstacle(PLAYER_X + PLAYER_SIZE + 40.0, GROUND_Y));
        assert!(decide(&state, 0).jump);
    }

    #[test]
    fn test_slides_under_flying_obstacle() {
        let mut state = running();
        state.obstacles.push(obstacle(PLAYER_X + PLAYER_SIZE + 40.0, GROUND_Y + 80.0));
        let controls = decide(&state, 0);
        assert!(controls.slide);
        assert!(!controls.jump);
    }

    #[test]
    fn test_dashes_when_too_late() {
        let mut state = running();
        state.player.y = GROUND_Y + 10.0;
        state.player.jumps_left = 0;
        state.obstacles.push(obstacle(PLAYER_X + PLAYER_SIZE + 2.0, GROUND_Y));
        let controls = decide(&state, 0);
        assert!(controls.dash);
        assert!(!controls.jump);
    }

    #[test]
    fn test_idle_when_paused() {
        let mut state = running();
        state.phase = RunPhase::Paused;
        state.obstacles.push(obstacle(PLAYER_X + PLAYER_SIZE + 40.0, GROUND_Y));
        assert!(!decide(&state, 0).any());
    }
}
