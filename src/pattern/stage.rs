use core::fmt;

use super::path::Signature;
use super::types::PatternViewStageState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageError {
    NotInFirstStage,
    NoFirstCapture,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInFirstStage => f.write_str("stage already advanced to confirmation"),
            Self::NoFirstCapture => f.write_str("no pattern captured in the first stage"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageVerdict {
    Accepted,
    Mismatch,
}

/// Signature captured for each stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagePasswords {
    first: Option<Signature>,
    second: Option<Signature>,
}

impl StagePasswords {
    pub fn get(&self, stage: PatternViewStageState) -> Option<&Signature> {
        match stage {
            PatternViewStageState::First => self.first.as_ref(),
            PatternViewStageState::Second => self.second.as_ref(),
        }
    }

    fn set(&mut self, stage: PatternViewStageState, signature: Signature) {
        match stage {
            PatternViewStageState::First => self.first = Some(signature),
            PatternViewStageState::Second => self.second = Some(signature),
        }
    }

    pub fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }
}

#[derive(Clone, Debug, Default)]
pub struct StageController {
    stage: PatternViewStageState,
    passwords: StagePasswords,
}

impl StageController {
    pub fn stage(&self) -> PatternViewStageState {
        self.stage
    }

    pub fn passwords(&self) -> &StagePasswords {
        &self.passwords
    }

    /// Records a structurally valid gesture for the active stage. Stage
    /// FIRST always accepts; stage SECOND accepts only a FIRST match.
    pub fn evaluate(&mut self, signature: Signature) -> StageVerdict {
        let stage = self.stage;
        self.passwords.set(stage, signature);
        match stage {
            PatternViewStageState::First => StageVerdict::Accepted,
            PatternViewStageState::Second => {
                let first = self.passwords.get(PatternViewStageState::First);
                let second = self.passwords.get(PatternViewStageState::Second);
                if first.is_some() && first == second {
                    StageVerdict::Accepted
                } else {
                    StageVerdict::Mismatch
                }
            }
        }
    }

    pub fn advance(&mut self) -> Result<(), StageError> {
        if self.stage != PatternViewStageState::First {
            return Err(StageError::NotInFirstStage);
        }
        if self.passwords.get(PatternViewStageState::First).is_none() {
            return Err(StageError::NoFirstCapture);
        }
        self.stage = PatternViewStageState::Second;
        self.passwords.second = None;
        Ok(())
    }

    pub fn restart(&mut self) {
        self.stage = PatternViewStageState::First;
        self.passwords.clear();
    }
}
