use std::path::PathBuf;
use std::time::Duration;

use log::warn;

use crate::constants::{DEFAULT_HOLD_MS, DEFAULT_TICK_RATE, MAX_TICK_RATE};
use crate::error::ConfigError;
use crate::render::GlyphSet;

/// Runtime settings, read from `PACMAN_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Simulation ticks per second; also the frame rate.
    pub tick_rate: u64,
    pub seed: Option<u64>,
    pub glyphs: GlyphSet,
    /// How long a pressed key counts as held when the terminal never reports releases.
    pub hold: Duration,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            seed: None,
            glyphs: GlyphSet::default(),
            hold: Duration::from_millis(DEFAULT_HOLD_MS),
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(rate) = positive(&lookup, "PACMAN_FPS")? {
            if rate > MAX_TICK_RATE {
                return Err(ConfigError::TooLarge {
                    var: "PACMAN_FPS",
                    value: rate,
                    max: MAX_TICK_RATE,
                });
            }
            config.tick_rate = rate;
        }
        if let Some(ms) = positive(&lookup, "PACMAN_HOLD_MS")? {
            config.hold = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("PACMAN_SEED") {
            let seed = raw.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
                var: "PACMAN_SEED",
                value: raw.clone(),
            })?;
            config.seed = Some(seed);
        }
        if let Some(name) = lookup("PACMAN_GLYPHS") {
            config.glyphs = GlyphSet::parse(&name).unwrap_or_else(|| {
                warn!("unknown glyph set {name:?}, using ascii");
                GlyphSet::Ascii
            });
        }
        config.log_file = lookup("PACMAN_LOG")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        Ok(config)
    }

    /// Simulated time covered by one tick.
    pub fn tick(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate.max(1))
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::NotPositive { var, value: raw }),
    }
}
