use std::time::Duration;

use crate::components::Pos;

/// Edge length of one tile in pixels. Actor positions are measured in the same unit.
pub const TILE_SIZE: f32 = 19.0;
/// Hitboxes are a tile shrunk by this margin on every side.
pub const HITBOX_INSET: f32 = 2.0;
pub const PELLET_RADIUS: f32 = 10.0;

pub const DEFAULT_GRID_W: usize = 45;
pub const DEFAULT_GRID_H: usize = 30;
pub const PLAYER_SPAWN: Pos = Pos { x: 1, y: 1 };

pub const PLAYER_SPEED: f32 = 3.0;
pub const GHOST_SPEED: f32 = 2.0;

pub const PELLET_POINTS: u32 = 10;
pub const POWER_PELLET_POINTS: u32 = 50;
pub const GHOST_POINTS: u32 = 200;
pub const STARTING_LIVES: u32 = 3;

pub const SCATTER_DURATION: Duration = Duration::from_secs(7);
pub const CHASE_DURATION: Duration = Duration::from_secs(20);
pub const FRIGHTENED_DURATION: Duration = Duration::from_secs(6);
pub const POWER_UP_DURATION: Duration = Duration::from_secs(6);
pub const FORCED_TURN_INTERVAL: Duration = Duration::from_secs(3);
pub const PLAYER_DEAD_DURATION: Duration = Duration::from_secs(2);

pub const STUCK_TICK_LIMIT: u32 = 5;
pub const AMBUSH_LOOKAHEAD_TILES: f32 = 4.0;
pub const RANDOM_RETARGET_CHANCE: f64 = 0.1;

/// The shrink animation has this many steps, each lasting a few ticks.
pub const DEATH_ANIMATION_STEPS: u32 = 8;
pub const DEATH_TICKS_PER_STEP: u32 = 5;

pub const DEFAULT_TICK_RATE: u64 = 60;
/// Upper bound for `PACMAN_FPS`; keeps every tick at least 1 ms long.
pub const MAX_TICK_RATE: u64 = 1000;
pub const DEFAULT_HOLD_MS: u64 = 500;
