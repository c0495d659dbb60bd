use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    NotPositive { var: &'static str, value: String },
    #[error("{var} must be an unsigned integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },
    #[error("{var} must be at most {max}, got {value}")]
    TooLarge {
        var: &'static str,
        value: u64,
        max: u64,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("maze layout has no rows")]
    Empty,
    #[error("row {row} is {found} tiles wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {ch:?} at row {row}, column {col}")]
    UnknownTile { row: usize, col: usize, ch: char },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

pub type GameResult<T> = Result<T, GameError>;
