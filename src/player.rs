use std::time::Duration;

use crate::components::{Dir, Point, Pos, Rect};
use crate::constants::{
    DEATH_ANIMATION_STEPS, DEATH_TICKS_PER_STEP, PELLET_RADIUS, PLAYER_SPEED, POWER_UP_DURATION,
    STARTING_LIVES,
};
use crate::ghost::Quarry;
use crate::level::{Maze, Tile};
use crate::movement::Motion;

#[derive(Debug, Clone)]
pub struct Player {
    motion: Motion,
    spawn: Pos,
    lives: u32,
    score: u32,
    powered_until: Option<Duration>,
    dead: bool,
    death_ticks: u32,
}

impl Player {
    pub fn new(spawn: Pos) -> Self {
        Self {
            motion: Motion::new(spawn.origin(), Dir::Right, PLAYER_SPEED),
            spawn,
            lives: STARTING_LIVES,
            score: 0,
            powered_until: None,
            dead: false,
            death_ticks: 0,
        }
    }

    /// A directional key went down: remember the heading and start moving.
    pub fn press(&mut self, dir: Dir) {
        self.motion.next_direction = dir;
        self.motion.moving = true;
    }

    /// Any directional key came up.
    pub fn release(&mut self) {
        self.motion.moving = false;
    }

    /// Moves, eats whatever pellet is under the player and ages the power-up.
    ///
    /// Returns the kind of pellet eaten this tick, if any.
    pub fn update(&mut self, maze: &mut Maze, now: Duration) -> Option<Tile> {
        if self.dead {
            self.advance_death_animation();
            return None;
        }

        self.motion.steer(maze);
        self.motion.advance(maze);

        let eaten = maze.take_pellet_at(self.motion.center(), PELLET_RADIUS);
        if let Some(tile) = eaten {
            self.score += tile.points();
            if tile == Tile::PowerPellet {
                self.powered_until = Some(now + POWER_UP_DURATION);
            }
        }

        if self.powered_until.is_some_and(|until| now >= until) {
            self.powered_until = None;
        }
        eaten
    }

    /// Loses a life and starts the shrink animation. No-op while already dead.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.lives = self.lives.saturating_sub(1);
        self.death_ticks = 0;
        self.powered_until = None;
        self.motion.moving = false;
        true
    }

    pub fn advance_death_animation(&mut self) {
        if !self.dead {
            return;
        }
        self.death_ticks += 1;
        if self.death_ticks >= DEATH_ANIMATION_STEPS * DEATH_TICKS_PER_STEP {
            self.dead = false;
            self.death_ticks = 0;
        }
    }

    /// How far the shrink animation has run, from 0.0 to 1.0.
    pub fn death_progress(&self) -> f32 {
        let total = DEATH_ANIMATION_STEPS * DEATH_TICKS_PER_STEP;
        (self.death_ticks as f32 / total as f32).clamp(0.0, 1.0)
    }

    pub fn reset_position(&mut self) {
        self.motion = Motion::new(self.spawn.origin(), Dir::Right, PLAYER_SPEED);
        self.dead = false;
        self.death_ticks = 0;
        self.powered_until = None;
    }

    /// Back to spawn with a fresh set of lives and no score.
    pub fn reset_for_new_game(&mut self) {
        self.reset_position();
        self.lives = STARTING_LIVES;
        self.score = 0;
    }

    pub fn award(&mut self, points: u32) {
        self.score += points;
    }

    pub fn quarry(&self) -> Quarry {
        Quarry {
            position: self.motion.position,
            facing: self.motion.direction,
        }
    }

    pub fn position(&self) -> Point {
        self.motion.position
    }

    pub fn center(&self) -> Point {
        self.motion.center()
    }

    pub fn facing(&self) -> Dir {
        self.motion.direction
    }

    pub fn bounds(&self) -> Rect {
        self.motion.bounds()
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_moving(&self) -> bool {
        self.motion.moving
    }

    pub fn is_powered_up(&self) -> bool {
        self.powered_until.is_some()
    }
}
