use embedded_graphics::pixelcolor::Rgb888;

use crate::config::PatternPalette;

/// Capture stage of the two-step "draw, then confirm" protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PatternViewStageState {
    #[default]
    First,
    Second,
}

/// What the widget shows and reports upward. Exactly one holds at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PatternViewState {
    #[default]
    Initial,
    Started,
    Success { dot: Rgb888, line: Rgb888 },
    Error { dot: Rgb888, line: Rgb888 },
}

impl PatternViewState {
    pub fn success(palette: &PatternPalette) -> Self {
        Self::Success {
            dot: palette.success_dot,
            line: palette.success_line,
        }
    }

    pub fn error(palette: &PatternPalette) -> Self {
        Self::Error {
            dot: palette.error_dot,
            line: palette.error_line,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Color of touched dots and of the connecting lines in this state.
    pub fn colors(&self, palette: &PatternPalette) -> (Rgb888, Rgb888) {
        match *self {
            Self::Initial | Self::Started => (palette.dot, palette.line),
            Self::Success { dot, line } | Self::Error { dot, line } => (dot, line),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Started => "started",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }
}

pub const STATE_BUFFER_MAX: usize = 4;

/// States emitted by one dispatch, in transition order.
pub type StateBuffer = heapless::Vec<PatternViewState, STATE_BUFFER_MAX>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternOutput {
    pub states: StateBuffer,
    pub redraw: bool,
}

impl PatternOutput {
    pub fn last_state(&self) -> Option<PatternViewState> {
        self.states.last().copied()
    }

    pub fn emitted(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn publish_to<S: crate::notify::StateSink + ?Sized>(&self, sink: &mut S) {
        for state in &self.states {
            sink.publish(*state);
        }
    }
}
