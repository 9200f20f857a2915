mod engine;
mod path;
mod stage;
mod timer;
mod types;

#[cfg(test)]
mod tests;

pub use engine::PatternLockEngine;
pub use path::{PatternPath, Signature};
pub use stage::{StageController, StageError, StagePasswords, StageVerdict};
pub use timer::ResetTimer;
pub use types::{
    PatternOutput, PatternViewStageState, PatternViewState, StateBuffer, STATE_BUFFER_MAX,
};
