#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod grid;
pub mod notify;
pub mod pattern;
pub mod render;
#[cfg(feature = "runtime")]
pub mod runtime;
pub mod screen;

pub use config::{active_config, ConfigError, PatternLockConfig, PatternPalette};
pub use grid::{Dot, DotGrid, DotId, GridGeometry, MAX_DOTS, MAX_GRID_SIZE};
pub use notify::{StateHistory, StateSink};
pub use pattern::{
    PatternLockEngine, PatternOutput, PatternViewStageState, PatternViewState, Signature,
    StageError,
};
pub use render::PatternRenderer;
