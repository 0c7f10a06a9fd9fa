//! Snowterm - a scripted New Year greeting card played in the terminal

pub mod app;
pub mod config;
pub mod effects;
pub mod epilogue;
pub mod render;
pub mod scenario;
pub mod snowfall;
pub mod terminal_guard;

pub use config::{Args, CardConfig, IdentityPolicy, Pace};
pub use effects::{Effects, Stage, StageEffects};
pub use scenario::ScenarioOutcome;
