//! Tile-grid movement shared by the player and the ghosts.

use crate::components::{Dir, Point, Rect};
use crate::constants::TILE_SIZE;
use crate::level::Maze;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Point,
    pub direction: Dir,
    /// Requested heading, adopted once the corridor that way is open.
    pub next_direction: Dir,
    /// Distance covered per tick.
    pub speed: f32,
    pub moving: bool,
}

impl Motion {
    pub fn new(position: Point, direction: Dir, speed: f32) -> Self {
        Self {
            position,
            direction,
            next_direction: direction,
            speed,
            moving: false,
        }
    }

    /// Turns toward `next_direction` if a full tile step that way is walkable.
    pub fn steer(&mut self, maze: &Maze) -> bool {
        if self.next_direction == self.direction {
            return false;
        }
        if maze.is_walkable(self.position.offset(self.next_direction, TILE_SIZE)) {
            self.direction = self.next_direction;
            return true;
        }
        false
    }

    /// Moves one tick's worth along `direction`; a blocked step leaves the actor idle.
    pub fn advance(&mut self, maze: &Maze) -> bool {
        if !self.moving {
            return false;
        }
        let next = self.position.offset(self.direction, self.speed);
        if maze.is_walkable(next) {
            self.position = next;
            true
        } else {
            self.moving = false;
            false
        }
    }

    /// Tile-sized box used for actor-vs-actor collisions.
    pub fn bounds(&self) -> Rect {
        Rect::tile_box(self.position)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + TILE_SIZE / 2.0,
            self.position.y + TILE_SIZE / 2.0,
        )
    }
}
