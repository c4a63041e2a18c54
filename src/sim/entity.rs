//! World entities scrolled past the player
//!
//! Positions are bottom-left corners in world space. Every entity carries an
//! [`EntityId`] derived from the wave that spawned it and its slot in that
//! wave, so a slot can be materialized at most once.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::COLLECTIBLE_SIZE;

/// Sequence number of a wave within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(pub u32);

/// Which entity list a spawn slot feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Obstacle,
    Collectible,
    Platform,
}

impl Lane {
    fn prefix(self) -> &'static str {
        match self {
            Lane::Obstacle => "obs",
            Lane::Collectible => "col",
            Lane::Platform => "plat",
        }
    }
}

/// Deterministic entity identity: `(wave, lane, slot)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub wave: WaveId,
    pub lane: Lane,
    pub slot: u8,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-wave-{}-{}", self.lane.prefix(), self.wave.0, self.slot)
    }
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Bear,
    /// Wide and slow
    Rug,
    /// Tall and fast
    Taxman,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Bear, ObstacleKind::Rug, ObstacleKind::Taxman];

    /// Width and height
    pub fn size(self) -> Vec2 {
        match self {
            ObstacleKind::Bear => Vec2::new(50.0, 50.0),
            ObstacleKind::Rug => Vec2::new(80.0, 30.0),
            ObstacleKind::Taxman => Vec2::new(40.0, 60.0),
        }
    }

    /// Horizontal speed relative to the world scroll
    pub fn speed_factor(self) -> f32 {
        match self {
            ObstacleKind::Bear => 1.0,
            ObstacleKind::Rug => 0.9,
            ObstacleKind::Taxman => 1.3,
        }
    }
}

/// Collectible types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectibleKind {
    Snowflake,
    Gift,
    Shield,
    Magnet,
}

impl CollectibleKind {
    /// Points before speed, combo and event modifiers (scoring kinds only)
    pub fn base_points(self) -> Option<u64> {
        match self {
            CollectibleKind::Snowflake => Some(10),
            CollectibleKind::Gift => Some(50),
            CollectibleKind::Shield | CollectibleKind::Magnet => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Vec2,
    pub kind: ObstacleKind,
    pub size: Vec2,
}

impl Obstacle {
    pub fn new(id: EntityId, kind: ObstacleKind, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            kind,
            size: kind.size(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: EntityId,
    pub pos: Vec2,
    pub kind: CollectibleKind,
    pub size: Vec2,
}

impl Collectible {
    pub fn new(id: EntityId, kind: CollectibleKind, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            kind,
            size: Vec2::splat(COLLECTIBLE_SIZE),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Platform {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_bottom_left(self.pos, self.size)
    }

    /// Height of the standing surface
    pub fn top(&self) -> f32 {
        self.pos.y + self.size.y
    }
}
