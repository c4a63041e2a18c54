//! Player physics, world scroll, and collision queries
//!
//! Units are world units per tick. The player's `y` is the bottom edge and
//! grows upward; entities scroll toward negative x.

use glam::Vec2;

use super::collision::Aabb;
use super::entity::{Collectible, Obstacle, Platform};
use super::state::Player;
use crate::consts::*;

// === Controls ===

/// Jump (or double-jump). Cancels a slide.
pub fn jump(player: &mut Player) -> bool {
    if player.jumps_left == 0 {
        return false;
    }
    player.velocity = JUMP_STRENGTH;
    player.jumps_left -= 1;
    player.end_slide();
    true
}

/// Slide for a fixed window; only from the ground
pub fn slide(player: &mut Player, now: u64) -> bool {
    if !player.is_grounded() {
        return false;
    }
    player.sliding = true;
    player.slide_ends_at = now + SLIDE_DURATION_MS;
    player.velocity = player.velocity.min(0.0);
    true
}

/// Spend a dash charge. Starts the recharge clock if it is not already running.
pub fn dash(player: &mut Player, now: u64) -> bool {
    if player.dash_charges == 0 {
        return false;
    }
    player.dash_charges -= 1;
    player.dash_active_until = now + DASH_DURATION_MS;
    if player.dash_charges < MAX_DASHES && player.dash_recharge_at == 0 {
        player.dash_recharge_at = now + DASH_COOLDOWN_MS;
    }
    true
}

// === Integration ===

/// Gravity, ground and ceiling clamps, slide expiry
pub fn integrate_player(player: &mut Player, now: u64) {
    let airborne = player.y > GROUND_Y;
    player.velocity -= GRAVITY;
    player.y += player.velocity;

    if player.y <= GROUND_Y {
        player.land_on(GROUND_Y, airborne);
    }
    if player.y > MAX_JUMP_HEIGHT {
        player.y = MAX_JUMP_HEIGHT;
        player.velocity = 0.0;
    }
    if player.sliding && now >= player.slide_ends_at {
        player.end_slide();
    }
}

/// Expire the dash window and regenerate charges one cooldown at a time
pub fn update_dash(player: &mut Player, now: u64) {
    if player.dash_active_until != 0 && now >= player.dash_active_until {
        player.dash_active_until = 0;
    }
    if player.dash_recharge_at != 0 && now >= player.dash_recharge_at {
        if player.dash_charges < MAX_DASHES {
            player.dash_charges += 1;
        }
        player.dash_recharge_at = if player.dash_charges < MAX_DASHES {
            now + DASH_COOLDOWN_MS
        } else {
            0
        };
    }
}

/// Land on the highest platform below the previous position while falling
///
/// Returns true when the player was placed on a platform this tick.
pub fn settle_on_platforms(player: &mut Player, prev_y: f32, platforms: &[Platform]) -> bool {
    if player.velocity > 0.0 {
        return false;
    }
    let body = player.bounds();
    let support = platforms
        .iter()
        .filter(|p| body.overlaps_x_inset(&p.bounds(), PLATFORM_SUPPORT_INSET))
        .map(Platform::top)
        .filter(|&top| top <= prev_y + PLATFORM_LANDING_SLACK)
        .fold(None, |best: Option<f32>, top| Some(best.map_or(top, |b| b.max(top))));

    match support {
        Some(top) if player.y <= top && prev_y >= top - PLATFORM_LANDING_SLACK => {
            player.land_on(top, prev_y > top);
            true
        }
        _ => false,
    }
}

// === World scroll ===

pub fn scroll_obstacles(obstacles: &mut Vec<Obstacle>, speed: f32) {
    for obstacle in obstacles.iter_mut() {
        obstacle.pos.x -= OBSTACLE_SPEED * speed * obstacle.kind.speed_factor();
    }
    obstacles.retain(|o| o.pos.x > OBSTACLE_DESPAWN_X);
}

pub fn scroll_platforms(platforms: &mut Vec<Platform>, speed: f32) {
    for platform in platforms.iter_mut() {
        platform.pos.x -= OBSTACLE_SPEED * speed * PLATFORM_SPEED_FACTOR;
    }
    platforms.retain(|p| p.pos.x > PLATFORM_DESPAWN_X);
}

/// Magnet reach for a playfield
pub fn magnet_range(playfield_width: f32) -> f32 {
    (playfield_width * MAGNET_RANGE_FACTOR).max(MAGNET_MIN_RANGE)
}

/// Scroll collectibles; with a magnet (`Some(range)`) they drift faster and
/// curve toward `target` when inside the range
pub fn scroll_collectibles(
    collectibles: &mut Vec<Collectible>,
    speed: f32,
    target: Vec2,
    magnet: Option<f32>,
) {
    for collectible in collectibles.iter_mut() {
        let mut step = Vec2::new(-COLLECTIBLE_SPEED * speed, 0.0);
        if let Some(range) = magnet {
            step.x -= MAGNET_DRIFT;
            let delta = target - collectible.bounds().center();
            let distance = delta.length();
            if distance < range {
                step += delta * MAGNET_PULL * (1.0 - distance / range);
            }
        }
        collectible.pos += step;
    }
    collectibles.retain(|c| c.pos.x > COLLECTIBLE_DESPAWN_X);
}

// === Collision queries ===

/// Index of the first obstacle touching the player hitbox
pub fn first_obstacle_hit(player: &Aabb, obstacles: &[Obstacle]) -> Option<usize> {
    obstacles
        .iter()
        .position(|o| player.overlaps_padded(&o.bounds(), OBSTACLE_PADDING))
}

/// Pickup envelope padding (negative grows the reach)
pub fn collect_padding(magnet_active: bool) -> f32 {
    if magnet_active {
        MAGNET_COLLECT_PADDING
    } else {
        COLLECT_PADDING
    }
}

pub fn touches_collectible(player: &Aabb, collectible: &Collectible, magnet_active: bool) -> bool {
    player.overlaps_padded(&collectible.bounds(), collect_padding(magnet_active))
}

/// Drop the oldest entries beyond `cap`
pub fn enforce_cap<T>(entities: &mut Vec<T>, cap: usize) {
    if entities.len() > cap {
        let excess = entities.len() - cap;
        entities.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectibleKind, EntityId, Lane, ObstacleKind, WaveId};

    fn id(lane: Lane, slot: u8) -> EntityId {
        EntityId {
            wave: WaveId(0),
            lane,
            slot,
        }
    }

    fn platform_at(x: f32, y: f32) -> Platform {
        Platform {
            id: id(Lane::Platform, 0),
            pos: Vec2::new(x, y),
            size: Vec2::new(STAIR_STEP_WIDTH, STAIR_STEP_THICKNESS),
        }
    }

    #[test]
    fn test_double_jump_then_exhausted() {
        let mut player = Player::default();
        assert!(jump(&mut player));
        assert!(jump(&mut player));
        assert!(!jump(&mut player));
        assert_eq!(player.jumps_left, 0);
        assert_eq!(player.velocity, JUMP_STRENGTH);
    }

    #[test]
    fn test_jump_arc_lands_and_refills() {
        let mut player = Player::default();
        jump(&mut player);
        let mut peak = player.y;
        for tick in 0..200 {
            integrate_player(&mut player, tick * FRAME_MS);
            peak = peak.max(player.y);
        }
        assert_eq!(player.y, GROUND_Y);
        assert_eq!(player.jumps_left, MAX_JUMPS);
        assert!(peak <= MAX_JUMP_HEIGHT);
        assert!(peak > GROUND_Y + 50.0);
    }

    #[test]
    fn test_ceiling_zeroes_velocity() {
        let mut player = Player::default();
        player.y = MAX_JUMP_HEIGHT - 1.0;
        player.velocity = 30.0;
        integrate_player(&mut player, 0);
        assert_eq!(player.y, MAX_JUMP_HEIGHT);
        assert_eq!(player.velocity, 0.0);
    }

    #[test]
    fn test_slide_only_from_ground_and_expires() {
        let mut player = Player::default();
        assert!(slide(&mut player, 1_000));
        assert!(player.sliding);
        integrate_player(&mut player, 1_000 + SLIDE_DURATION_MS - 1);
        assert!(player.sliding);
        integrate_player(&mut player, 1_000 + SLIDE_DURATION_MS);
        assert!(!player.sliding);

        player.y = GROUND_Y + 60.0;
        assert!(!slide(&mut player, 2_000));
    }

    #[test]
    fn test_touchdown_clears_slide_but_standing_keeps_it() {
        let mut player = Player::default();
        slide(&mut player, 0);
        for tick in 1..10 {
            integrate_player(&mut player, tick * FRAME_MS);
        }
        assert!(player.sliding);

        // slide pressed just above the ground on the way down
        let mut falling = Player {
            y: GROUND_Y + GROUNDED_TOLERANCE,
            velocity: -3.0,
            jumps_left: 0,
            ..Player::default()
        };
        assert!(slide(&mut falling, 0));
        integrate_player(&mut falling, FRAME_MS);
        assert_eq!(falling.y, GROUND_Y);
        assert_eq!(falling.jumps_left, MAX_JUMPS);
        assert!(!falling.sliding);
    }

    #[test]
    fn test_jump_cancels_slide() {
        let mut player = Player::default();
        slide(&mut player, 0);
        jump(&mut player);
        assert!(!player.sliding);
    }

    #[test]
    fn test_dash_charges_regenerate() {
        let mut player = Player::default();
        assert!(dash(&mut player, 0));
        assert!(dash(&mut player, 100));
        assert!(!dash(&mut player, 200));
        assert!(player.dash_active(500));
        assert_eq!(player.dash_recharge_at, DASH_COOLDOWN_MS);

        update_dash(&mut player, DASH_COOLDOWN_MS);
        assert_eq!(player.dash_charges, 1);
        assert_eq!(player.dash_recharge_at, 2 * DASH_COOLDOWN_MS);
        assert!(!player.dash_active(DASH_COOLDOWN_MS));

        update_dash(&mut player, 2 * DASH_COOLDOWN_MS);
        assert_eq!(player.dash_charges, MAX_DASHES);
        assert_eq!(player.dash_recharge_at, 0);
    }

    #[test]
    fn test_lands_on_platform_when_falling() {
        let platform = platform_at(90.0, GROUND_Y + 22.0);
        let top = platform.top();
        let mut player = Player::default();
        player.y = top + 1.0;
        player.velocity = -3.0;
        let prev_y = player.y;
        player.y -= 3.0;
        assert!(settle_on_platforms(&mut player, prev_y, &[platform]));
        assert_eq!(player.y, top);
        assert_eq!(player.velocity, 0.0);
    }

    #[test]
    fn test_rising_player_passes_through_platform() {
        let platform = platform_at(90.0, GROUND_Y);
        let mut player = Player::default();
        player.velocity = 10.0;
        assert!(!settle_on_platforms(&mut player, GROUND_Y, &[platform]));
    }

    #[test]
    fn test_platform_above_previous_position_is_ignored() {
        let platform = platform_at(90.0, GROUND_Y + 66.0);
        let mut player = Player::default();
        player.velocity = -1.0;
        assert!(!settle_on_platforms(&mut player, GROUND_Y + 1.0, &[platform]));
    }

    #[test]
    fn test_scroll_despawns_offscreen() {
        let mut obstacles = vec![
            Obstacle::new(id(Lane::Obstacle, 0), ObstacleKind::Bear, Vec2::new(-75.0, GROUND_Y)),
            Obstacle::new(id(Lane::Obstacle, 1), ObstacleKind::Bear, Vec2::new(500.0, GROUND_Y)),
        ];
        scroll_obstacles(&mut obstacles, 1.0);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].pos.x, 492.0);
    }

    #[test]
    fn test_taxman_scrolls_faster() {
        let mut obstacles = vec![
            Obstacle::new(id(Lane::Obstacle, 0), ObstacleKind::Bear, Vec2::new(500.0, GROUND_Y)),
            Obstacle::new(id(Lane::Obstacle, 1), ObstacleKind::Taxman, Vec2::new(500.0, GROUND_Y)),
        ];
        scroll_obstacles(&mut obstacles, 1.0);
        assert!(obstacles[1].pos.x < obstacles[0].pos.x);
    }

    #[test]
    fn test_magnet_pulls_toward_player() {
        let target = Vec2::new(120.0, 76.0);
        let start = Vec2::new(250.0, 180.0);
        let mut plain = vec![Collectible::new(id(Lane::Collectible, 0), CollectibleKind::Gift, start)];
        let mut pulled = plain.clone();
        scroll_collectibles(&mut plain, 1.0, target, None);
        scroll_collectibles(&mut pulled, 1.0, target, Some(magnet_range(900.0)));
        assert_eq!(plain[0].pos.y, start.y);
        assert!(pulled[0].pos.y < start.y);
        assert!(pulled[0].pos.x < plain[0].pos.x);
    }

    #[test]
    fn test_magnet_range_floor() {
        assert_eq!(magnet_range(300.0), MAGNET_MIN_RANGE);
        assert_eq!(magnet_range(1000.0), 450.0);
    }

    #[test]
    fn test_magnet_widens_pickup_envelope() {
        let player = Player::default().bounds();
        // just outside the plain envelope, well inside the magnet one
        let near = Collectible::new(
            id(Lane::Collectible, 0),
            CollectibleKind::Snowflake,
            Vec2::new(player.max.x + 25.0, GROUND_Y + 5.0),
        );
        assert!(!touches_collectible(&player, &near, false));
        assert!(touches_collectible(&player, &near, true));
    }

    #[test]
    fn test_obstacle_padding_forgives_grazes() {
        let player = Player::default().bounds();
        let graze = Obstacle::new(
            id(Lane::Obstacle, 0),
            ObstacleKind::Bear,
            Vec2::new(player.max.x - 4.0, GROUND_Y),
        );
        let solid = Obstacle::new(
            id(Lane::Obstacle, 1),
            ObstacleKind::Bear,
            Vec2::new(player.max.x - 20.0, GROUND_Y),
        );
        assert_eq!(first_obstacle_hit(&player, &[graze.clone()]), None);
        assert_eq!(first_obstacle_hit(&player, &[graze, solid]), Some(1));
    }

    #[test]
    fn test_enforce_cap_drops_oldest() {
        let mut values: Vec<u32> = (0..70).collect();
        enforce_cap(&mut values, 60);
        assert_eq!(values.len(), 60);
        assert_eq!(values[0], 10);
    }
}
