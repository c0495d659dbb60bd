use crate::constants::{HITBOX_INSET, TILE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Grid coordinate of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Top-left corner of the tile; actors standing on the tile sit here.
    pub fn origin(self) -> Point {
        Point::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }

    pub fn center(self) -> Point {
        let origin = self.origin();
        Point::new(origin.x + TILE_SIZE / 2.0, origin.y + TILE_SIZE / 2.0)
    }
}

/// Continuous position in pixels from the maze's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Dir, distance: f32) -> Point {
        let (dx, dy) = dir.delta();
        Point::new(
            self.x + dx as f32 * distance,
            self.y + dy as f32 * distance,
        )
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tile containing this point, or `None` for negative or non-finite coordinates.
    pub fn tile(self) -> Option<Pos> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return None;
        }
        Some(Pos {
            x: (self.x / TILE_SIZE).floor() as usize,
            y: (self.y / TILE_SIZE).floor() as usize,
        })
    }

    /// Whole-pixel snapshot used to tell whether an actor made progress.
    pub fn snapped(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// Axis-aligned box; edges touching do not count as overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Full tile-sized box anchored at `origin`.
    pub fn tile_box(origin: Point) -> Rect {
        Rect {
            x: origin.x,
            y: origin.y,
            w: TILE_SIZE,
            h: TILE_SIZE,
        }
    }

    /// Movement hitbox: the tile box inset on all sides.
    pub fn hitbox(origin: Point) -> Rect {
        Rect {
            x: origin.x + HITBOX_INSET,
            y: origin.y + HITBOX_INSET,
            w: TILE_SIZE - 2.0 * HITBOX_INSET,
            h: TILE_SIZE - 2.0 * HITBOX_INSET,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
