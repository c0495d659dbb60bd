pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod ghost;
pub mod input;
pub mod level;
pub mod movement;
pub mod player;
pub mod render;
pub mod session;
