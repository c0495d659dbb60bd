//! One game from intro to game over, advanced by fixed simulated ticks.

use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Dir, Pos};
use crate::config::Config;
use crate::constants::{GHOST_POINTS, PLAYER_DEAD_DURATION, PLAYER_SPAWN};
use crate::ghost::{spawn_ghosts, Ghost, GhostState};
use crate::level::{Maze, Tile};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Intro,
    Playing,
    PlayerDead,
    GameOver(Outcome),
}

/// Everything the outside world can ask of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Dir),
    Release(Dir),
    TogglePause,
    Restart,
    Confirm,
    Quit,
}

pub struct Session {
    maze: Maze,
    pristine: Maze,
    player: Player,
    ghosts: Vec<Ghost>,
    state: SessionState,
    paused: bool,
    quit: bool,
    clock: Duration,
    tick: Duration,
    dead_since: Duration,
    rng: StdRng,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let maze = Maze::standard();
        let ghosts = spawn_ghosts(&maze, PLAYER_SPAWN, Duration::ZERO, &mut rng);
        info!(
            "new session: {}x{} maze, {} collectibles, tick {:?}",
            maze.width(),
            maze.height(),
            maze.remaining_collectibles(),
            config.tick()
        );
        Self::with_maze(maze, PLAYER_SPAWN, config.tick(), rng).with_ghosts(ghosts)
    }

    /// A session on an arbitrary maze with no ghosts yet.
    pub fn with_maze(maze: Maze, spawn: Pos, tick: Duration, rng: StdRng) -> Self {
        Self {
            pristine: maze.clone(),
            maze,
            player: Player::new(spawn),
            ghosts: Vec::new(),
            state: SessionState::Intro,
            paused: false,
            quit: false,
            clock: Duration::ZERO,
            tick,
            dead_since: Duration::ZERO,
            rng,
        }
    }

    pub fn with_ghosts(mut self, ghosts: Vec<Ghost>) -> Self {
        self.ghosts = ghosts;
        self
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Press(dir) => {
                if self.state == SessionState::Playing {
                    self.player.press(dir);
                }
            }
            Command::Release(_) => {
                if self.state == SessionState::Playing {
                    self.player.release();
                }
            }
            Command::TogglePause => {
                self.paused = !self.paused;
                debug!("paused: {}", self.paused);
            }
            Command::Confirm => match self.state {
                SessionState::Intro => self.enter(SessionState::Playing),
                SessionState::PlayerDead => self.resume(),
                _ => {}
            },
            Command::Restart => self.restart(),
            Command::Quit => {
                info!("quit requested at {:?}", self.clock);
                self.quit = true;
            }
        }
    }

    /// Advances the world by one tick of simulated time.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        match self.state {
            SessionState::Playing => {
                self.clock += self.tick;
                self.update_playing();
            }
            SessionState::PlayerDead => {
                self.clock += self.tick;
                self.player.advance_death_animation();
                if self.clock.saturating_sub(self.dead_since) >= PLAYER_DEAD_DURATION {
                    self.resume();
                }
            }
            SessionState::Intro | SessionState::GameOver(_) => {}
        }
    }

    fn update_playing(&mut self) {
        let now = self.clock;
        if self.player.update(&mut self.maze, now) == Some(Tile::PowerPellet) {
            info!("power pellet eaten, ghosts frightened");
            for ghost in &mut self.ghosts {
                ghost.make_scared(now);
            }
        }

        if self.maze.remaining_collectibles() == 0 {
            self.enter(SessionState::GameOver(Outcome::Won));
            return;
        }

        let quarry = self.player.quarry();
        let mut caught = false;
        for ghost in &mut self.ghosts {
            ghost.update(&self.maze, quarry, now, &mut self.rng);
            if !ghost.bounds().overlaps(&self.player.bounds()) {
                continue;
            }
            if ghost.state() == GhostState::Frightened {
                info!("{} eaten", ghost.kind().name());
                ghost.reset(now);
                self.player.award(GHOST_POINTS);
            } else {
                info!("caught by {}", ghost.kind().name());
                self.player.die();
                caught = true;
                break;
            }
        }

        if caught {
            if self.player.lives() == 0 {
                self.enter(SessionState::GameOver(Outcome::Lost));
            } else {
                self.dead_since = now;
                self.enter(SessionState::PlayerDead);
            }
        }
    }

    fn resume(&mut self) {
        self.player.reset_position();
        for ghost in &mut self.ghosts {
            ghost.reset(self.clock);
        }
        self.enter(SessionState::Playing);
    }

    fn restart(&mut self) {
        self.maze = self.pristine.clone();
        self.player.reset_for_new_game();
        for ghost in &mut self.ghosts {
            ghost.reset(self.clock);
        }
        self.paused = false;
        self.enter(SessionState::Playing);
    }

    fn enter(&mut self, state: SessionState) {
        if self.state != state {
            info!(
                "{:?} -> {:?} (score {}, lives {})",
                self.state,
                state,
                self.player.score(),
                self.player.lives()
            );
        }
        self.state = state;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }
}
