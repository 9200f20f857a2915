use embedded_graphics::{
    pixelcolor::{PixelColor, Rgb888},
    prelude::{DrawTarget, Point, Size},
};
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    path::{PatternPath, Signature},
    stage::{StageController, StageError, StagePasswords, StageVerdict},
    timer::ResetTimer,
    types::{PatternOutput, PatternViewStageState, PatternViewState, StateBuffer},
};
use crate::{
    config::{active_config, ConfigError, PatternLockConfig},
    grid::{Dot, DotGrid, DotId, GridGeometry},
    notify::StateSink,
    render::PatternRenderer,
};

/// Pattern-lock widget core.
///
/// Every handler is synchronous and returns the states it produced, in
/// transition order. Time is supplied by the caller in milliseconds.
pub struct PatternLockEngine {
    machine: statig::blocking::StateMachine<PatternHsm>,
}

impl Default for PatternLockEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PatternLockEngine {
    pub fn new(config: PatternLockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Engine built from the configuration compiled into the crate.
    pub fn with_defaults() -> Self {
        Self::from_valid(*active_config())
    }

    fn from_valid(config: PatternLockConfig) -> Self {
        Self {
            machine: PatternHsm::new(config).state_machine(),
        }
    }

    pub fn pointer_down(&mut self, now_ms: u64, point: Point) -> PatternOutput {
        self.dispatch(PatternHsmEvent::PointerDown { now_ms, point })
    }

    pub fn pointer_move(&mut self, now_ms: u64, point: Point) -> PatternOutput {
        self.dispatch(PatternHsmEvent::PointerMove { now_ms, point })
    }

    pub fn pointer_up(&mut self, now_ms: u64) -> PatternOutput {
        self.dispatch(PatternHsmEvent::PointerUp { now_ms })
    }

    /// Fires the auto-reset countdown once it is due.
    pub fn tick(&mut self, now_ms: u64) -> PatternOutput {
        self.dispatch(PatternHsmEvent::Tick { now_ms })
    }

    /// Clears the gesture and returns to Initial, keeping the stage.
    pub fn reset(&mut self) -> PatternOutput {
        self.dispatch(PatternHsmEvent::Reset)
    }

    /// Moves from the capture stage to the confirmation stage.
    pub fn advance_stage(&mut self) -> Result<PatternOutput, StageError> {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&PatternHsmEvent::Advance, &mut context);
        match context.rejected {
            Some(err) => Err(err),
            None => Ok(context.finish()),
        }
    }

    /// Back to stage FIRST with an empty stage password table.
    pub fn restart(&mut self) -> PatternOutput {
        self.dispatch(PatternHsmEvent::Restart)
    }

    pub fn layout(&mut self, size: Size) -> PatternOutput {
        self.dispatch(PatternHsmEvent::Layout { size })
    }

    /// Renders one frame. Lays the grid out for the target on first use or
    /// when its size changed, and confirms the reset countdown in Error.
    pub fn draw<D, C>(&mut self, target: &mut D, now_ms: u64) -> Result<PatternOutput, D::Error>
    where
        D: DrawTarget<Color = C>,
        C: PixelColor + From<Rgb888>,
    {
        let size = target.bounding_box().size;
        let output = self.dispatch(PatternHsmEvent::Frame { now_ms, size });
        self.renderer(now_ms).draw(target)?;
        Ok(output)
    }

    pub fn renderer(&self, now_ms: u64) -> PatternRenderer<'_> {
        let hsm = self.machine.inner();
        PatternRenderer::new(
            &hsm.grid,
            &hsm.path,
            hsm.view_state,
            &hsm.config,
            hsm.pointer,
            now_ms,
        )
    }

    pub fn state(&self) -> PatternViewState {
        self.machine.inner().view_state
    }

    pub fn stage(&self) -> PatternViewStageState {
        self.machine.inner().stages.stage()
    }

    pub fn stage_passwords(&self) -> &StagePasswords {
        self.machine.inner().stages.passwords()
    }

    pub fn config(&self) -> &PatternLockConfig {
        &self.machine.inner().config
    }

    pub fn marked(&self) -> &[DotId] {
        self.machine.inner().path.marked()
    }

    pub fn dots(&self) -> &[Dot] {
        self.machine.inner().grid.dots()
    }

    pub fn signature(&self) -> Signature {
        let hsm = self.machine.inner();
        hsm.path.signature(hsm.grid.grid_size())
    }

    pub fn reset_deadline_ms(&self) -> Option<u64> {
        self.machine.inner().timer.deadline_ms()
    }

    pub fn animation_active(&self, now_ms: u64) -> bool {
        self.renderer(now_ms).animating()
    }

    /// Dispatches and forwards the resulting states to `sink`.
    pub fn dispatch_to<S: StateSink + ?Sized>(
        &mut self,
        sink: &mut S,
        handler: impl FnOnce(&mut Self) -> PatternOutput,
    ) -> PatternOutput {
        let output = handler(self);
        output.publish_to(sink);
        output
    }

    fn dispatch(&mut self, event: PatternHsmEvent) -> PatternOutput {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        context.finish()
    }
}

#[derive(Clone, Copy, Debug)]
enum PatternHsmEvent {
    PointerDown { now_ms: u64, point: Point },
    PointerMove { now_ms: u64, point: Point },
    PointerUp { now_ms: u64 },
    Tick { now_ms: u64 },
    Layout { size: Size },
    Frame { now_ms: u64, size: Size },
    Reset,
    Advance,
    Restart,
}

#[derive(Default)]
struct DispatchContext {
    states: StateBuffer,
    redraw: bool,
    rejected: Option<StageError>,
}

impl DispatchContext {
    fn finish(self) -> PatternOutput {
        PatternOutput {
            states: self.states,
            redraw: self.redraw,
        }
    }
}

struct PatternHsm {
    config: PatternLockConfig,
    grid: DotGrid,
    path: PatternPath,
    stages: StageController,
    timer: ResetTimer,
    view_state: PatternViewState,
    pointer: Option<Point>,
}

impl PatternHsm {
    fn new(config: PatternLockConfig) -> Self {
        Self {
            config,
            grid: DotGrid::new(GridGeometry {
                grid_size: config.grid_size,
                dot_radius_percent: config.dot_radius_percent,
                hit_radius_percent: config.hit_radius_percent,
            }),
            path: PatternPath::new(),
            stages: StageController::default(),
            timer: ResetTimer::new(config.reset_delay_ms),
            view_state: PatternViewState::Initial,
            pointer: None,
        }
    }

    fn emit(&mut self, context: &mut DispatchContext, state: PatternViewState) {
        self.view_state = state;
        context.redraw = true;
        if context.states.push(state).is_err() {
            log::warn!("pattern hsm: state buffer full, dropped {}", state.label());
        }
        log::debug!(
            "pattern hsm: state={} stage={:?} marked={}",
            state.label(),
            self.stages.stage(),
            self.path.len()
        );
    }

    fn clear_gesture(&mut self) {
        self.path.clear();
        self.grid.clear_touched();
        self.timer.cancel();
        self.pointer = None;
    }

    /// Starts a fresh gesture at `point`; `true` when it landed on a dot.
    fn begin_gesture(&mut self, context: &mut DispatchContext, now_ms: u64, point: Point) -> bool {
        if !self.path.is_empty() {
            context.redraw = true;
        }
        self.clear_gesture();
        self.pointer = Some(point);
        self.path.test_touch(&mut self.grid, point, now_ms).is_some()
    }

    fn extend_gesture(&mut self, context: &mut DispatchContext, now_ms: u64, point: Point) {
        self.pointer = Some(point);
        context.redraw = true;
        if self.path.len() >= usize::from(self.config.max_dots) {
            return;
        }
        self.path.test_touch(&mut self.grid, point, now_ms);
    }

    fn enter_initial(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.clear_gesture();
        self.emit(context, PatternViewState::Initial);
        Transition(State::initial())
    }

    fn enter_error(&mut self, context: &mut DispatchContext, now_ms: u64) -> Outcome<State> {
        self.timer.arm(now_ms);
        let state = PatternViewState::error(&self.config.palette);
        self.emit(context, state);
        Transition(State::error())
    }

    fn finish_gesture(&mut self, context: &mut DispatchContext, now_ms: u64) -> Outcome<State> {
        self.pointer = None;
        let count = self.path.len();
        if count == 0 {
            return Handled;
        }
        if count < usize::from(self.config.min_dots) {
            log::debug!(
                "pattern hsm: {count} dots below minimum {}",
                self.config.min_dots
            );
            return self.enter_error(context, now_ms);
        }

        let signature = self.path.signature(self.grid.grid_size());
        match self.stages.evaluate(signature) {
            StageVerdict::Accepted => {
                let state = PatternViewState::success(&self.config.palette);
                self.emit(context, state);
                Transition(State::success())
            }
            StageVerdict::Mismatch => self.enter_error(context, now_ms),
        }
    }
}

#[state_machine(initial = "State::initial()")]
impl PatternHsm {
    #[state(superstate = "surface")]
    fn initial(&mut self, context: &mut DispatchContext, event: &PatternHsmEvent) -> Outcome<State> {
        match event {
            PatternHsmEvent::PointerDown { now_ms, point } => {
                if self.begin_gesture(context, *now_ms, *point) {
                    self.emit(context, PatternViewState::Started);
                    return Transition(State::started());
                }
                Handled
            }
            PatternHsmEvent::PointerMove { .. } | PatternHsmEvent::PointerUp { .. } => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "surface")]
    fn started(&mut self, context: &mut DispatchContext, event: &PatternHsmEvent) -> Outcome<State> {
        match event {
            PatternHsmEvent::PointerDown { now_ms, point } => {
                if self.begin_gesture(context, *now_ms, *point) {
                    self.emit(context, PatternViewState::Started);
                    return Handled;
                }
                self.enter_initial(context)
            }
            PatternHsmEvent::PointerMove { now_ms, point } => {
                self.extend_gesture(context, *now_ms, *point);
                Handled
            }
            PatternHsmEvent::PointerUp { now_ms } => self.finish_gesture(context, *now_ms),
            _ => Super,
        }
    }

    #[state(superstate = "surface")]
    fn success(&mut self, context: &mut DispatchContext, event: &PatternHsmEvent) -> Outcome<State> {
        match event {
            PatternHsmEvent::PointerDown { .. } => {
                log::debug!("pattern hsm: gesture ignored until reset");
                Handled
            }
            PatternHsmEvent::PointerMove { .. } | PatternHsmEvent::PointerUp { .. } => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "surface")]
    fn error(&mut self, context: &mut DispatchContext, event: &PatternHsmEvent) -> Outcome<State> {
        match event {
            PatternHsmEvent::PointerDown { now_ms, point } => {
                if self.begin_gesture(context, *now_ms, *point) {
                    self.emit(context, PatternViewState::Started);
                    return Transition(State::started());
                }
                self.enter_initial(context)
            }
            PatternHsmEvent::PointerMove { .. } | PatternHsmEvent::PointerUp { .. } => Handled,
            PatternHsmEvent::Tick { now_ms } => {
                if self.timer.poll(*now_ms) {
                    return self.enter_initial(context);
                }
                Handled
            }
            PatternHsmEvent::Frame { now_ms, .. } => {
                self.timer.arm(*now_ms);
                Super
            }
            _ => Super,
        }
    }

    #[superstate]
    fn surface(&mut self, context: &mut DispatchContext, event: &PatternHsmEvent) -> Outcome<State> {
        match event {
            PatternHsmEvent::Layout { size } | PatternHsmEvent::Frame { size, .. } => {
                if self.grid.ensure_layout(*size) {
                    context.redraw = true;
                }
                Handled
            }
            PatternHsmEvent::Reset => self.enter_initial(context),
            PatternHsmEvent::Advance => match self.stages.advance() {
                Ok(()) => self.enter_initial(context),
                Err(err) => {
                    log::warn!("pattern hsm: advance rejected: {err}");
                    context.rejected = Some(err);
                    Handled
                }
            },
            PatternHsmEvent::Restart => {
                self.stages.restart();
                self.enter_initial(context)
            }
            _ => Handled,
        }
    }
}
