//! Ghost AI: scatter/chase/frightened state machine, per-ghost targeting and stuck recovery.

use std::time::Duration;

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Dir, Point, Pos, Rect};
use crate::constants::{
    AMBUSH_LOOKAHEAD_TILES, CHASE_DURATION, FORCED_TURN_INTERVAL, FRIGHTENED_DURATION,
    GHOST_SPEED, RANDOM_RETARGET_CHANCE, SCATTER_DURATION, STUCK_TICK_LIMIT, TILE_SIZE,
};
use crate::level::Maze;
use crate::movement::Motion;

const SPAWN_AREA_X: std::ops::Range<usize> = 5..23;
const SPAWN_AREA_Y: std::ops::Range<usize> = 5..20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Pinky,
        GhostKind::Inky,
        GhostKind::Clyde,
    ];

    pub fn behavior(self) -> Behavior {
        match self {
            GhostKind::Blinky => Behavior::Chase,
            GhostKind::Pinky => Behavior::Ambush,
            GhostKind::Inky | GhostKind::Clyde => Behavior::Random,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GhostKind::Blinky => "blinky",
            GhostKind::Pinky => "pinky",
            GhostKind::Inky => "inky",
            GhostKind::Clyde => "clyde",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostState {
    Scatter,
    Chase,
    Frightened,
}

/// How a ghost picks its target while chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Straight at the player.
    Chase,
    /// A few tiles ahead of where the player is facing.
    Ambush,
    /// Wanders between random tiles.
    Random,
}

/// What a ghost knows about the player when it picks a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quarry {
    pub position: Point,
    pub facing: Dir,
}

/// Outcome of a single ghost update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostStep {
    Moved,
    /// The chosen step hit a wall; a new heading is queued for next tick.
    Blocked,
    Teleported,
}

#[derive(Debug, Clone)]
pub struct Ghost {
    kind: GhostKind,
    behavior: Behavior,
    motion: Motion,
    home: Point,
    /// Scatter or Chase; fright is tracked separately so the oscillation can resume.
    mode: GhostState,
    mode_since: Duration,
    frightened_since: Option<Duration>,
    target: Option<Point>,
    stuck_ticks: u32,
    last_position: Option<(i64, i64)>,
    last_turn: Duration,
}

impl Ghost {
    pub fn new(kind: GhostKind, home: Pos, now: Duration) -> Self {
        let mut motion = Motion::new(home.origin(), Dir::Right, GHOST_SPEED);
        motion.moving = true;
        Self {
            kind,
            behavior: kind.behavior(),
            motion,
            home: home.origin(),
            mode: GhostState::Scatter,
            mode_since: now,
            frightened_since: None,
            target: None,
            stuck_ticks: 0,
            last_position: None,
            last_turn: now,
        }
    }

    #[cfg(test)]
    fn with_speed(mut self, speed: f32) -> Self {
        self.motion.speed = speed;
        self
    }

    pub fn kind(&self) -> GhostKind {
        self.kind
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn state(&self) -> GhostState {
        if self.frightened_since.is_some() {
            GhostState::Frightened
        } else {
            self.mode
        }
    }

    pub fn position(&self) -> Point {
        self.motion.position
    }

    pub fn center(&self) -> Point {
        self.motion.center()
    }

    pub fn direction(&self) -> Dir {
        self.motion.direction
    }

    pub fn home(&self) -> Point {
        self.home
    }

    pub fn target(&self) -> Option<Point> {
        self.target
    }

    pub fn bounds(&self) -> Rect {
        self.motion.bounds()
    }

    /// Enters (or restarts) the frightened state.
    pub fn make_scared(&mut self, now: Duration) {
        self.frightened_since = Some(now);
    }

    /// Back to the home tile in scatter mode, as after being eaten or on a new game.
    pub fn reset(&mut self, now: Duration) {
        self.motion.position = self.home;
        self.motion.moving = true;
        self.mode = GhostState::Scatter;
        self.mode_since = now;
        self.frightened_since = None;
        self.target = None;
        self.stuck_ticks = 0;
        self.last_position = None;
        self.last_turn = now;
    }

    pub fn update(
        &mut self,
        maze: &Maze,
        quarry: Quarry,
        now: Duration,
        rng: &mut impl Rng,
    ) -> GhostStep {
        self.update_state(now);
        self.update_target(maze, quarry, rng);

        let moves = maze.valid_moves(self.motion.position);

        let snapped = self.motion.position.snapped();
        if self.last_position == Some(snapped) {
            self.stuck_ticks += 1;
        } else {
            self.stuck_ticks = 0;
            self.last_position = Some(snapped);
        }

        if self.stuck_ticks > STUCK_TICK_LIMIT || moves.is_empty() {
            self.teleport(maze, now, rng);
            return GhostStep::Teleported;
        }

        // Periodic random turn breaks up loops; it may reverse the ghost.
        if now.saturating_sub(self.last_turn) >= FORCED_TURN_INTERVAL {
            self.motion.direction = self.random_turn(&moves, rng);
            self.last_turn = now;
        } else {
            self.motion.direction = self.best_move(&moves, maze, rng);
        }

        if self.motion.advance(maze) {
            return GhostStep::Moved;
        }
        if let Some(dir) = moves.choose(rng) {
            self.motion.direction = *dir;
            self.motion.moving = true;
        }
        GhostStep::Blocked
    }

    fn update_state(&mut self, now: Duration) {
        if let Some(since) = self.frightened_since {
            if now.saturating_sub(since) >= FRIGHTENED_DURATION {
                self.frightened_since = None;
                trace!("{} is no longer frightened", self.kind.name());
            }
            return;
        }

        let limit = match self.mode {
            GhostState::Chase => CHASE_DURATION,
            _ => SCATTER_DURATION,
        };
        if now.saturating_sub(self.mode_since) >= limit {
            self.mode = match self.mode {
                GhostState::Chase => GhostState::Scatter,
                _ => GhostState::Chase,
            };
            self.mode_since = now;
            trace!("{} switched to {:?}", self.kind.name(), self.mode);
        }
    }

    fn update_target(&mut self, maze: &Maze, quarry: Quarry, rng: &mut impl Rng) {
        self.target = match self.state() {
            GhostState::Frightened => random_target(maze, rng),
            GhostState::Scatter => Some(self.home),
            GhostState::Chase => match self.behavior {
                Behavior::Chase => Some(quarry.position),
                Behavior::Ambush => Some(
                    quarry
                        .position
                        .offset(quarry.facing, AMBUSH_LOOKAHEAD_TILES * TILE_SIZE),
                ),
                Behavior::Random => {
                    if self.target.is_none() || rng.gen_bool(RANDOM_RETARGET_CHANCE) {
                        random_target(maze, rng)
                    } else {
                        self.target
                    }
                }
            },
        };
    }

    /// Valid move whose next tile lies closest to the target, never reversing
    /// unless that is the only way out.
    fn best_move(&mut self, moves: &[Dir], maze: &Maze, rng: &mut impl Rng) -> Dir {
        let target = match self.target {
            Some(target) => target,
            None => {
                let target = random_target(maze, rng).unwrap_or(self.motion.position);
                self.target = Some(target);
                target
            }
        };

        let reverse = self.motion.direction.reverse();
        let mut best = moves[0];
        let mut best_distance = f32::INFINITY;
        for &dir in moves {
            if dir == reverse && moves.len() > 1 {
                continue;
            }
            let d = self.motion.position.offset(dir, TILE_SIZE).distance(target);
            if d < best_distance {
                best_distance = d;
                best = dir;
            }
        }
        best
    }

    fn random_turn(&self, moves: &[Dir], rng: &mut impl Rng) -> Dir {
        let others: Vec<Dir> = moves
            .iter()
            .copied()
            .filter(|dir| *dir != self.motion.direction)
            .collect();
        others
            .choose(rng)
            .or_else(|| moves.choose(rng))
            .copied()
            .unwrap_or(self.motion.direction)
    }

    fn teleport(&mut self, maze: &Maze, now: Duration, rng: &mut impl Rng) {
        if let Some(pos) = maze.random_open_tile(rng) {
            self.motion.position = pos.origin();
            debug!("{} was stuck, teleported to {:?}", self.kind.name(), pos);
        }
        self.stuck_ticks = 0;
        self.last_position = None;
        self.last_turn = now;
        self.motion.direction = Dir::ALL[rng.gen_range(0..Dir::ALL.len())];
        self.motion.moving = true;
    }
}

fn random_target(maze: &Maze, rng: &mut impl Rng) -> Option<Point> {
    maze.random_open_tile(rng).map(Pos::origin)
}

/// One ghost of each kind on distinct random open tiles, away from `avoid`.
///
/// Homes come from the central spawn area when it has room for everyone, and from
/// anywhere in the maze otherwise.
pub fn spawn_ghosts(maze: &Maze, avoid: Pos, now: Duration, rng: &mut impl Rng) -> Vec<Ghost> {
    let far_enough = |pos: &Pos| pos.x.abs_diff(avoid.x) + pos.y.abs_diff(avoid.y) > 2;

    let mut candidates: Vec<Pos> = maze
        .open_tiles()
        .iter()
        .copied()
        .filter(|p| SPAWN_AREA_X.contains(&p.x) && SPAWN_AREA_Y.contains(&p.y))
        .filter(far_enough)
        .collect();
    if candidates.len() < GhostKind::ALL.len() {
        candidates = maze.open_tiles().iter().copied().filter(far_enough).collect();
    }
    if candidates.is_empty() {
        candidates = maze.open_tiles().to_vec();
    }
    candidates.shuffle(rng);

    GhostKind::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, kind)| {
            let home = candidates.get(i % candidates.len().max(1))?;
            Some(Ghost::new(*kind, *home, now))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TICK: Duration = Duration::from_millis(100);

    fn open_room() -> Maze {
        Maze::from_rows(&[
            "###########",
            "#         #",
            "#         #",
            "#         #",
            "#         #",
            "#         #",
            "###########",
        ])
        .unwrap()
    }

    fn corridor() -> Maze {
        Maze::from_rows(&["#######", "#     #", "#######"]).unwrap()
    }

    fn quarry_at(pos: Pos, facing: Dir) -> Quarry {
        Quarry {
            position: pos.origin(),
            facing,
        }
    }

    #[test]
    fn behaviors_follow_identity() {
        assert_eq!(GhostKind::Blinky.behavior(), Behavior::Chase);
        assert_eq!(GhostKind::Pinky.behavior(), Behavior::Ambush);
        assert_eq!(GhostKind::Inky.behavior(), Behavior::Random);
        assert_eq!(GhostKind::Clyde.behavior(), Behavior::Random);
    }

    #[test]
    fn scatter_and_chase_alternate_on_their_timers() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(1);
        let quarry = quarry_at(Pos::new(8, 4), Dir::Left);
        let mut ghost = Ghost::new(GhostKind::Blinky, Pos::new(2, 2), Duration::ZERO);

        ghost.update(&maze, quarry, SCATTER_DURATION - TICK, &mut rng);
        assert_eq!(ghost.state(), GhostState::Scatter);
        ghost.update(&maze, quarry, SCATTER_DURATION, &mut rng);
        assert_eq!(ghost.state(), GhostState::Chase);
        ghost.update(&maze, quarry, SCATTER_DURATION + CHASE_DURATION - TICK, &mut rng);
        assert_eq!(ghost.state(), GhostState::Chase);
        ghost.update(&maze, quarry, SCATTER_DURATION + CHASE_DURATION, &mut rng);
        assert_eq!(ghost.state(), GhostState::Scatter);
    }

    #[test]
    fn frightened_lasts_six_seconds() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(2);
        let quarry = quarry_at(Pos::new(8, 4), Dir::Left);
        let mut ghost = Ghost::new(GhostKind::Pinky, Pos::new(2, 2), Duration::ZERO);

        let scared_at = Duration::from_secs(1);
        ghost.make_scared(scared_at);
        let mut now = scared_at;
        while now < scared_at + FRIGHTENED_DURATION {
            ghost.update(&maze, quarry, now, &mut rng);
            assert_eq!(ghost.state(), GhostState::Frightened, "at {now:?}");
            now += TICK;
        }
        ghost.update(&maze, quarry, now, &mut rng);
        assert_ne!(ghost.state(), GhostState::Frightened);
    }

    #[test]
    fn scatter_targets_home() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(3);
        let mut ghost = Ghost::new(GhostKind::Blinky, Pos::new(5, 3), Duration::ZERO);
        ghost.update(&maze, quarry_at(Pos::new(1, 1), Dir::Up), TICK, &mut rng);
        assert_eq!(ghost.target(), Some(Pos::new(5, 3).origin()));
    }

    #[test]
    fn chase_and_ambush_targets_follow_the_player() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(4);
        let quarry = quarry_at(Pos::new(3, 3), Dir::Right);

        let mut chaser = Ghost::new(GhostKind::Blinky, Pos::new(8, 1), Duration::ZERO);
        chaser.update(&maze, quarry, SCATTER_DURATION, &mut rng);
        assert_eq!(chaser.state(), GhostState::Chase);
        assert_eq!(chaser.target(), Some(quarry.position));

        let mut ambusher = Ghost::new(GhostKind::Pinky, Pos::new(8, 1), Duration::ZERO);
        ambusher.update(&maze, quarry, SCATTER_DURATION, &mut rng);
        assert_eq!(ambusher.target(), Some(Pos::new(7, 3).origin()));
    }

    #[test]
    fn random_chaser_always_has_an_open_target() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(5);
        let quarry = quarry_at(Pos::new(3, 3), Dir::Right);
        let mut ghost = Ghost::new(GhostKind::Inky, Pos::new(8, 1), Duration::ZERO);
        let mut now = SCATTER_DURATION;
        for _ in 0..50 {
            ghost.update(&maze, quarry, now, &mut rng);
            let target = ghost.target().expect("random chaser lost its target");
            assert!(maze.is_walkable(target));
            now += TICK;
        }
    }

    #[test]
    fn random_chaser_keeps_its_target_most_ticks() {
        let maze = Maze::standard();
        let mut rng = StdRng::seed_from_u64(13);
        let quarry = quarry_at(Pos::new(20, 12), Dir::Left);
        let mut ghost = Ghost::new(GhostKind::Inky, Pos::new(1, 1), Duration::ZERO);
        let tick = Duration::from_millis(16);
        let mut now = SCATTER_DURATION;
        ghost.update(&maze, quarry, now, &mut rng);
        assert_eq!(ghost.state(), GhostState::Chase);

        let mut changes = 0;
        for _ in 0..200 {
            let before = ghost.target();
            now += tick;
            ghost.update(&maze, quarry, now, &mut rng);
            if ghost.target() != before {
                changes += 1;
            }
        }
        assert_eq!(ghost.state(), GhostState::Chase);
        // About one tick in ten picks a new spot.
        assert!((5..=50).contains(&changes), "{changes} retargets in 200 ticks");
    }

    #[test]
    fn frightened_ghost_wanders_to_random_tiles() {
        let maze = Maze::standard();
        let mut rng = StdRng::seed_from_u64(14);
        let quarry = quarry_at(Pos::new(20, 12), Dir::Left);
        let mut ghost = Ghost::new(GhostKind::Blinky, Pos::new(1, 1), Duration::ZERO);
        ghost.make_scared(Duration::ZERO);

        let mut targets = Vec::new();
        for i in 1..=20 {
            ghost.update(&maze, quarry, TICK * i, &mut rng);
            assert_eq!(ghost.state(), GhostState::Frightened);
            let target = ghost.target().expect("frightened ghost has a target");
            assert!(maze.is_walkable(target));
            targets.push(target);
        }
        let on_home_or_player = targets
            .iter()
            .filter(|t| **t == ghost.home() || **t == quarry.position)
            .count();
        assert!(on_home_or_player <= 1);
        let mut distinct = targets.clone();
        distinct.dedup();
        assert!(distinct.len() >= 15, "targets barely changed: {targets:?}");
    }

    #[test]
    fn normal_moves_never_reverse() {
        let maze = corridor();
        let mut rng = StdRng::seed_from_u64(6);
        // Home sits behind the ghost, but turning around is off the table.
        let mut ghost = Ghost::new(GhostKind::Blinky, Pos::new(2, 1), Duration::ZERO);
        ghost.reset(Duration::ZERO);
        ghost.home = Pos::new(1, 1).origin();
        let step = ghost.update(&maze, quarry_at(Pos::new(5, 1), Dir::Left), TICK, &mut rng);
        assert_eq!(step, GhostStep::Moved);
        assert_eq!(ghost.direction(), Dir::Right);
        assert_eq!(ghost.position(), Point::new(2.0 * TILE_SIZE + GHOST_SPEED, TILE_SIZE));
    }

    #[test]
    fn forced_turn_may_reverse() {
        let maze = corridor();
        let mut rng = StdRng::seed_from_u64(7);
        let mut ghost = Ghost::new(GhostKind::Blinky, Pos::new(3, 1), Duration::ZERO);
        let step = ghost.update(
            &maze,
            quarry_at(Pos::new(5, 1), Dir::Left),
            FORCED_TURN_INTERVAL,
            &mut rng,
        );
        assert_eq!(step, GhostStep::Moved);
        assert_eq!(ghost.direction(), Dir::Left);
        assert_eq!(ghost.position(), Point::new(3.0 * TILE_SIZE - GHOST_SPEED, TILE_SIZE));
    }

    #[test]
    fn six_motionless_ticks_trigger_a_teleport() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(8);
        let quarry = quarry_at(Pos::new(8, 4), Dir::Left);
        let mut ghost =
            Ghost::new(GhostKind::Blinky, Pos::new(5, 3), Duration::ZERO).with_speed(0.0);
        let start = ghost.position();

        let mut now = Duration::ZERO;
        for _ in 0..6 {
            now += TICK;
            assert_ne!(ghost.update(&maze, quarry, now, &mut rng), GhostStep::Teleported);
            assert_eq!(ghost.position(), start);
        }
        now += TICK;
        assert_eq!(ghost.update(&maze, quarry, now, &mut rng), GhostStep::Teleported);
        assert_eq!(ghost.stuck_ticks, 0);
        assert!(maze.is_walkable(ghost.position()));
    }

    #[test]
    fn no_way_out_teleports_immediately() {
        let maze = Maze::from_rows(&["#####", "# # #", "#####"]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let mut ghost = Ghost::new(GhostKind::Clyde, Pos::new(1, 1), Duration::ZERO);
        let step = ghost.update(&maze, quarry_at(Pos::new(3, 1), Dir::Up), TICK, &mut rng);
        assert_eq!(step, GhostStep::Teleported);
    }

    #[test]
    fn ghosts_stay_on_walkable_ground() {
        let maze = Maze::standard();
        let mut rng = StdRng::seed_from_u64(10);
        let mut ghosts = spawn_ghosts(&maze, Pos::new(1, 1), Duration::ZERO, &mut rng);
        let quarry = quarry_at(Pos::new(1, 1), Dir::Right);
        let tick = Duration::from_millis(16);
        let mut now = Duration::ZERO;
        for _ in 0..600 {
            now += tick;
            for ghost in &mut ghosts {
                ghost.update(&maze, quarry, now, &mut rng);
                assert!(maze.is_walkable(ghost.position()));
            }
        }
    }

    #[test]
    fn reset_returns_home_in_scatter() {
        let maze = open_room();
        let mut rng = StdRng::seed_from_u64(11);
        let quarry = quarry_at(Pos::new(8, 4), Dir::Left);
        let mut ghost = Ghost::new(GhostKind::Inky, Pos::new(2, 2), Duration::ZERO);
        ghost.make_scared(Duration::ZERO);
        for i in 1..=10 {
            ghost.update(&maze, quarry, TICK * i, &mut rng);
        }
        ghost.reset(TICK * 11);
        assert_eq!(ghost.position(), ghost.home());
        assert_eq!(ghost.state(), GhostState::Scatter);
    }

    #[test]
    fn spawns_one_of_each_on_distinct_open_tiles() {
        let maze = Maze::standard();
        let mut rng = StdRng::seed_from_u64(12);
        let ghosts = spawn_ghosts(&maze, Pos::new(1, 1), Duration::ZERO, &mut rng);
        assert_eq!(ghosts.len(), 4);
        for (ghost, kind) in ghosts.iter().zip(GhostKind::ALL) {
            assert_eq!(ghost.kind(), kind);
            assert!(maze.is_walkable(ghost.home()));
        }
        for (i, a) in ghosts.iter().enumerate() {
            for b in &ghosts[i + 1..] {
                assert_ne!(a.home(), b.home());
            }
        }
    }
}
