//! The maze: tile grid, walkability queries and pellet bookkeeping.

use rand::Rng;

use crate::components::{Dir, Point, Pos, Rect};
use crate::constants::{
    DEFAULT_GRID_H, DEFAULT_GRID_W, PELLET_POINTS, PLAYER_SPAWN, POWER_PELLET_POINTS, TILE_SIZE,
};
use crate::error::LayoutError;

const TOP_LETTERS: [char; 6] = ['A', 'M', 'A', 'Z', 'O', 'N'];
const BOTTOM_LETTERS: [char; 4] = ['Q', 'C', 'L', 'I'];
const LETTER_W: usize = 3;
const LETTER_SPACING: usize = 4;
const TOP_ROW_X: usize = 3;
const TOP_ROW_Y: usize = 5;
const BOTTOM_ROW_X: usize = 8;
const BOTTOM_ROW_FROM_FLOOR: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Path,
    Pellet,
    PowerPellet,
}

impl Tile {
    pub fn points(self) -> u32 {
        match self {
            Tile::Pellet => PELLET_POINTS,
            Tile::PowerPellet => POWER_PELLET_POINTS,
            Tile::Wall | Tile::Path => 0,
        }
    }

    pub fn is_collectible(self) -> bool {
        matches!(self, Tile::Pellet | Tile::PowerPellet)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    width: usize,
    height: usize,
    grid: Vec<Tile>,
    open_tiles: Vec<Pos>,
    collectibles: usize,
}

impl Maze {
    /// The letter maze at its standard size.
    pub fn standard() -> Maze {
        Maze::generate(DEFAULT_GRID_W, DEFAULT_GRID_H)
    }

    /// Deterministic letter-maze layout for the given dimensions.
    pub fn generate(width: usize, height: usize) -> Maze {
        let mut grid = vec![Tile::Path; width * height];

        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    grid[y * width + x] = Tile::Wall;
                }
            }
        }

        for (i, letter) in TOP_LETTERS.iter().enumerate() {
            let x = TOP_ROW_X + i * (LETTER_W + LETTER_SPACING);
            stamp_letter(&mut grid, width, height, *letter, x, TOP_ROW_Y);
        }
        let bottom_y = height.saturating_sub(BOTTOM_ROW_FROM_FLOOR);
        for (i, letter) in BOTTOM_LETTERS.iter().enumerate() {
            let x = BOTTOM_ROW_X + i * (LETTER_W + LETTER_SPACING);
            stamp_letter(&mut grid, width, height, *letter, x, bottom_y);
        }

        for tile in grid.iter_mut() {
            if *tile == Tile::Path {
                *tile = Tile::Pellet;
            }
        }

        let power_spots = [
            (Some(2), Some(2)),
            (width.checked_sub(3), Some(2)),
            (Some(2), height.checked_sub(3)),
            (width.checked_sub(3), height.checked_sub(3)),
            (Some(width / 2), Some(height / 2)),
        ];
        for spot in power_spots {
            if let (Some(x), Some(y)) = spot {
                if x < width && y < height && grid[y * width + x] != Tile::Wall {
                    grid[y * width + x] = Tile::PowerPellet;
                }
            }
        }

        // Keep the spawn corner open whatever the letters did.
        let spawn = PLAYER_SPAWN;
        let cleared = [
            (spawn, Tile::Pellet),
            (Pos::new(spawn.x, spawn.y + 1), Tile::Path),
            (Pos::new(spawn.x + 1, spawn.y), Tile::Path),
        ];
        for (pos, tile) in cleared {
            if pos.x < width && pos.y < height {
                grid[pos.y * width + pos.x] = tile;
            }
        }

        Maze::from_grid(width, height, grid)
    }

    /// Parses a text layout: `#` wall, `.` pellet, `o` power pellet, space path.
    pub fn from_rows(rows: &[&str]) -> Result<Maze, LayoutError> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }
        let mut grid = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Pellet,
                    'o' => Tile::PowerPellet,
                    ' ' => Tile::Path,
                    _ => return Err(LayoutError::UnknownTile { row, col, ch }),
                };
                grid.push(tile);
            }
        }
        Ok(Maze::from_grid(width, rows.len(), grid))
    }

    fn from_grid(width: usize, height: usize, grid: Vec<Tile>) -> Maze {
        let mut open_tiles = Vec::new();
        let mut collectibles = 0;
        for y in 0..height {
            for x in 0..width {
                let tile = grid[y * width + x];
                if tile != Tile::Wall {
                    open_tiles.push(Pos { x, y });
                }
                if tile.is_collectible() {
                    collectibles += 1;
                }
            }
        }
        Maze {
            width,
            height,
            grid,
            open_tiles,
            collectibles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        if pos.x < self.width && pos.y < self.height {
            Some(self.grid[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// Whether an actor anchored at `at` may stand there.
    ///
    /// The tile under `at` must not be a wall, and the inset hitbox must stay on the
    /// grid without touching any wall tile. The two checks can disagree near tile
    /// edges; the position counts as walkable only when both pass.
    pub fn is_walkable(&self, at: Point) -> bool {
        let Some(pos) = at.tile() else {
            return false;
        };
        match self.tile(pos) {
            None | Some(Tile::Wall) => return false,
            Some(_) => {}
        }

        let hitbox = Rect::hitbox(at);
        let grid_w = self.width as f32 * TILE_SIZE;
        let grid_h = self.height as f32 * TILE_SIZE;
        if hitbox.x < 0.0 || hitbox.y < 0.0 || hitbox.right() > grid_w || hitbox.bottom() > grid_h
        {
            return false;
        }
        !self.hitbox_touches_wall(&hitbox)
    }

    fn hitbox_touches_wall(&self, hitbox: &Rect) -> bool {
        let first_x = (hitbox.x / TILE_SIZE).floor() as usize;
        let first_y = (hitbox.y / TILE_SIZE).floor() as usize;
        let last_x = ((hitbox.right() / TILE_SIZE).floor() as usize).min(self.width - 1);
        let last_y = ((hitbox.bottom() / TILE_SIZE).floor() as usize).min(self.height - 1);
        for y in first_y..=last_y {
            for x in first_x..=last_x {
                if self.grid[y * self.width + x] != Tile::Wall {
                    continue;
                }
                if Rect::tile_box(Pos { x, y }.origin()).overlaps(hitbox) {
                    return true;
                }
            }
        }
        false
    }

    /// Directions in which a full tile step from `at` stays walkable.
    pub fn valid_moves(&self, at: Point) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|dir| self.is_walkable(at.offset(*dir, TILE_SIZE)))
            .collect()
    }

    /// Eats the nearest pellet whose tile center lies within `radius` of `at`.
    pub fn take_pellet_at(&mut self, at: Point, radius: f32) -> Option<Tile> {
        let center = at.tile()?;
        let reach = (radius / TILE_SIZE).ceil() as usize;
        let y_end = center.y.saturating_add(reach).min(self.height.checked_sub(1)?);
        let x_end = center.x.saturating_add(reach).min(self.width.checked_sub(1)?);

        let mut best: Option<(usize, f32)> = None;
        for y in center.y.saturating_sub(reach)..=y_end {
            for x in center.x.saturating_sub(reach)..=x_end {
                let idx = y * self.width + x;
                if !self.grid[idx].is_collectible() {
                    continue;
                }
                let d = at.distance(Pos { x, y }.center());
                if d < radius && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((idx, d));
                }
            }
        }

        let (idx, _) = best?;
        let tile = self.grid[idx];
        self.grid[idx] = Tile::Path;
        self.collectibles -= 1;
        Some(tile)
    }

    /// Point value of the pellet eaten near `at`, or 0 when nothing was in reach.
    pub fn consume_pellet_at(&mut self, at: Point, radius: f32) -> u32 {
        self.take_pellet_at(at, radius).map_or(0, Tile::points)
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.collectibles
    }

    pub fn open_tiles(&self) -> &[Pos] {
        &self.open_tiles
    }

    pub fn random_open_tile(&self, rng: &mut impl Rng) -> Option<Pos> {
        if self.open_tiles.is_empty() {
            return None;
        }
        Some(self.open_tiles[rng.gen_range(0..self.open_tiles.len())])
    }
}

fn stamp_letter(grid: &mut [Tile], width: usize, height: usize, letter: char, x: usize, y: usize) {
    for (dy, row) in letter_pattern(letter).iter().enumerate() {
        for (dx, cell) in row.chars().enumerate() {
            let (gx, gy) = (x + dx, y + dy);
            if cell == '#' && gx < width && gy < height {
                grid[gy * width + gx] = Tile::Wall;
            }
        }
    }
}

fn letter_pattern(letter: char) -> &'static [&'static str] {
    match letter {
        'A' => &[" # ", "# #", "###", "# #", "# #"],
        'M' => &["# #", "# #", "###", "# #", "# #"],
        'Z' => &["###", "  #", " # ", "#  ", "###"],
        'O' => &["###", "# #", "# #", "# #", "###"],
        'N' => &["# #", "###", "# #", "# #", "# #"],
        // Q is an O with a tail hanging below.
        'Q' => &["###", "# #", "# #", "# #", "###", "  #"],
        'C' => &["###", "#  ", "#  ", "#  ", "###"],
        'L' => &["#  ", "#  ", "#  ", "#  ", "###"],
        'I' => &["###", " # ", " # ", " # ", "###"],
        _ => &[],
    }
}
