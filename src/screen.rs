//! Prompt and button state for a screen that hosts the pattern widget.

use embedded_graphics::prelude::Point;

use crate::{
    config::PatternLockConfig,
    pattern::{
        PatternLockEngine, PatternOutput, PatternViewStageState, PatternViewState, Signature,
        StageError,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptMessage {
    DrawPattern,
    ConfirmPattern,
    Drawing,
    PatternRecorded,
    PatternConfirmed,
    PatternTooShort,
    PatternMismatch,
}

impl PromptMessage {
    pub fn text(self) -> &'static str {
        match self {
            Self::DrawPattern => "Draw an unlock pattern",
            Self::ConfirmPattern => "Draw the pattern again to confirm",
            Self::Drawing => "Release finger when done",
            Self::PatternRecorded => "Pattern recorded",
            Self::PatternConfirmed => "Your new unlock pattern",
            Self::PatternTooShort => "Connect at least the minimum number of dots. Try again.",
            Self::PatternMismatch => "Patterns do not match. Try again.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageButtonLabel {
    Continue,
    Confirm,
}

impl StageButtonLabel {
    pub fn for_stage(stage: PatternViewStageState) -> Self {
        match stage {
            PatternViewStageState::First => Self::Continue,
            PatternViewStageState::Second => Self::Confirm,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Continue => "Continue",
            Self::Confirm => "Confirm",
        }
    }
}

/// Everything the hosting screen shows next to the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromptModel {
    pub message: PromptMessage,
    pub error_color: bool,
    pub stage_button_enabled: bool,
    pub stage_button: StageButtonLabel,
    pub clear_visible: bool,
    pub subtitle_visible: bool,
}

impl PromptModel {
    /// Prompt for `state` as seen by a screen that just opened in `stage`.
    pub fn for_state(state: PatternViewState, stage: PatternViewStageState) -> Self {
        Self::initial(stage).next(state, stage)
    }

    fn initial(stage: PatternViewStageState) -> Self {
        Self {
            message: match stage {
                PatternViewStageState::First => PromptMessage::DrawPattern,
                PatternViewStageState::Second => PromptMessage::ConfirmPattern,
            },
            error_color: false,
            stage_button_enabled: false,
            stage_button: StageButtonLabel::for_stage(stage),
            clear_visible: false,
            subtitle_visible: stage == PatternViewStageState::First,
        }
    }

    /// Applies one emitted state. Started and Error leave the stage button
    /// as the previous state set it.
    pub fn next(&self, state: PatternViewState, stage: PatternViewStageState) -> Self {
        let first = stage == PatternViewStageState::First;
        let mut prompt = Self {
            stage_button: StageButtonLabel::for_stage(stage),
            subtitle_visible: first,
            ..*self
        };
        match state {
            PatternViewState::Initial => return Self::initial(stage),
            PatternViewState::Started => {
                prompt.message = PromptMessage::Drawing;
                prompt.error_color = false;
            }
            PatternViewState::Success { .. } => {
                prompt.message = if first {
                    PromptMessage::PatternRecorded
                } else {
                    PromptMessage::PatternConfirmed
                };
                prompt.error_color = false;
                prompt.stage_button_enabled = true;
                prompt.clear_visible = first;
            }
            PatternViewState::Error { .. } => {
                prompt.message = if first {
                    PromptMessage::PatternTooShort
                } else {
                    PromptMessage::PatternMismatch
                };
                prompt.error_color = true;
                prompt.clear_visible = first;
            }
        }
        prompt
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    Advanced,
    Confirmed(Signature),
    Rejected(StageError),
    Disabled,
}

/// Widget plus its prompt, wired the way a set-pattern screen uses them.
pub struct LockScreen {
    engine: PatternLockEngine,
    prompt: PromptModel,
}

impl LockScreen {
    pub fn new(config: PatternLockConfig) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::with_engine(PatternLockEngine::new(config)?))
    }

    pub fn with_engine(engine: PatternLockEngine) -> Self {
        let prompt = PromptModel::for_state(engine.state(), engine.stage());
        Self { engine, prompt }
    }

    pub fn engine(&self) -> &PatternLockEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PatternLockEngine {
        &mut self.engine
    }

    pub fn prompt(&self) -> &PromptModel {
        &self.prompt
    }

    pub fn pointer_down(&mut self, now_ms: u64, point: Point) -> PatternOutput {
        let output = self.engine.pointer_down(now_ms, point);
        self.observe(output)
    }

    pub fn pointer_move(&mut self, now_ms: u64, point: Point) -> PatternOutput {
        let output = self.engine.pointer_move(now_ms, point);
        self.observe(output)
    }

    pub fn pointer_up(&mut self, now_ms: u64) -> PatternOutput {
        let output = self.engine.pointer_up(now_ms);
        self.observe(output)
    }

    pub fn tick(&mut self, now_ms: u64) -> PatternOutput {
        let output = self.engine.tick(now_ms);
        self.observe(output)
    }

    pub fn press_clear(&mut self) -> PatternOutput {
        let output = self.engine.reset();
        self.observe(output)
    }

    pub fn press_stage_button(&mut self) -> StageOutcome {
        if !self.prompt.stage_button_enabled {
            return StageOutcome::Disabled;
        }
        match self.engine.stage() {
            PatternViewStageState::First => match self.engine.advance_stage() {
                Ok(output) => {
                    self.observe(output);
                    StageOutcome::Advanced
                }
                Err(err) => StageOutcome::Rejected(err),
            },
            PatternViewStageState::Second if self.engine.state().is_success() => {
                let signature = self.engine.signature();
                log::debug!("lock screen: pattern confirmed len={}", signature.len());
                StageOutcome::Confirmed(signature)
            }
            PatternViewStageState::Second => StageOutcome::Disabled,
        }
    }

    fn observe(&mut self, output: PatternOutput) -> PatternOutput {
        let stage = self.engine.stage();
        for state in &output.states {
            self.prompt = self.prompt.next(*state, stage);
        }
        output
    }
}
