//! Async adapter that owns a [`PatternLockEngine`] inside an embassy task.

use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Receiver, Sender},
};
use embassy_time::{Duration, Instant, Timer};
use embedded_graphics::prelude::{Point, Size};

use crate::pattern::{PatternLockEngine, PatternOutput, PatternViewState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternInput {
    Layout(Size),
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    Reset,
    Advance,
    Restart,
    Shutdown,
}

/// Drives `engine` from `inputs` until [`PatternInput::Shutdown`], forwarding
/// every emitted state to `states` in order. The engine clock starts at zero
/// when the task starts; a pending auto-reset is awaited alongside input.
pub async fn run_pattern_task<M, const IN: usize, const OUT: usize>(
    engine: &mut PatternLockEngine,
    inputs: Receiver<'_, M, PatternInput, IN>,
    states: Sender<'_, M, PatternViewState, OUT>,
) where
    M: RawMutex,
{
    let epoch = Instant::now();
    log::debug!("pattern task: started");

    loop {
        let input = match engine.reset_deadline_ms() {
            Some(deadline_ms) => {
                let wake_at = epoch + Duration::from_millis(deadline_ms);
                match select(inputs.receive(), Timer::at(wake_at)).await {
                    Either::First(input) => Some(input),
                    Either::Second(()) => None,
                }
            }
            None => Some(inputs.receive().await),
        };

        let now_ms = epoch.elapsed().as_millis();
        let output = match input {
            None => engine.tick(now_ms),
            Some(PatternInput::Shutdown) => break,
            Some(input) => match apply_input(engine, now_ms, input) {
                Some(output) => output,
                None => continue,
            },
        };

        for state in output.states {
            states.send(state).await;
        }
    }

    log::debug!("pattern task: stopped");
}

fn apply_input(
    engine: &mut PatternLockEngine,
    now_ms: u64,
    input: PatternInput,
) -> Option<PatternOutput> {
    let output = match input {
        PatternInput::Layout(size) => engine.layout(size),
        PatternInput::PointerDown(point) => engine.pointer_down(now_ms, point),
        PatternInput::PointerMove(point) => engine.pointer_move(now_ms, point),
        PatternInput::PointerUp => engine.pointer_up(now_ms),
        PatternInput::Reset => engine.reset(),
        PatternInput::Advance => match engine.advance_stage() {
            Ok(output) => output,
            Err(err) => {
                log::warn!("pattern task: advance ignored: {err}");
                return None;
            }
        },
        PatternInput::Restart => engine.restart(),
        PatternInput::Shutdown => return None,
    };
    Some(output)
}
