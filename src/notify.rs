//! Delivery of emitted states to whoever hosts the widget.

use crate::pattern::PatternViewState;

/// Receives every state transition, in the order it happened.
pub trait StateSink {
    fn publish(&mut self, state: PatternViewState);
}

impl<F> StateSink for F
where
    F: FnMut(PatternViewState),
{
    fn publish(&mut self, state: PatternViewState) {
        self(state)
    }
}

/// Most recent `N` states; the oldest is dropped when full.
#[derive(Clone, Debug, Default)]
pub struct StateHistory<const N: usize> {
    states: heapless::Deque<PatternViewState, N>,
    total: u32,
}

impl<const N: usize> StateHistory<N> {
    pub const fn new() -> Self {
        Self {
            states: heapless::Deque::new(),
            total: 0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternViewState> {
        self.states.iter()
    }

    pub fn last(&self) -> Option<PatternViewState> {
        self.states.back().copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States published since creation, including evicted ones.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl<const N: usize> StateSink for StateHistory<N> {
    fn publish(&mut self, state: PatternViewState) {
        if self.states.is_full() {
            self.states.pop_front();
        }
        let _ = self.states.push_back(state);
        self.total = self.total.saturating_add(1);
    }
}

/// Non-blocking bridge onto an `embassy_sync` channel.
#[cfg(feature = "runtime")]
pub struct ChannelSink<'ch, M, const N: usize>
where
    M: embassy_sync::blocking_mutex::raw::RawMutex,
{
    sender: embassy_sync::channel::Sender<'ch, M, PatternViewState, N>,
    dropped: u32,
}

#[cfg(feature = "runtime")]
impl<'ch, M, const N: usize> ChannelSink<'ch, M, N>
where
    M: embassy_sync::blocking_mutex::raw::RawMutex,
{
    pub fn new(sender: embassy_sync::channel::Sender<'ch, M, PatternViewState, N>) -> Self {
        Self { sender, dropped: 0 }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(feature = "runtime")]
impl<M, const N: usize> StateSink for ChannelSink<'_, M, N>
where
    M: embassy_sync::blocking_mutex::raw::RawMutex,
{
    fn publish(&mut self, state: PatternViewState) {
        if self.sender.try_send(state).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            log::warn!(
                "pattern notify: state queue full, dropped {} (total={})",
                state.label(),
                self.dropped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_latest_states() {
        let mut history = StateHistory::<2>::new();
        history.publish(PatternViewState::Initial);
        history.publish(PatternViewState::Started);
        history.publish(PatternViewState::Initial);

        let kept: std::vec::Vec<_> = history.iter().map(PatternViewState::label).collect();
        assert_eq!(kept, ["started", "initial"]);
        assert_eq!(history.total(), 3);
        assert_eq!(history.last(), Some(PatternViewState::Initial));
    }

    #[test]
    fn closures_are_sinks() {
        let mut count = 0;
        {
            let mut sink = |_state: PatternViewState| count += 1;
            sink.publish(PatternViewState::Started);
            sink.publish(PatternViewState::Initial);
        }
        assert_eq!(count, 2);
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn channel_sink_counts_drops_instead_of_blocking() {
        use embassy_sync::{blocking_mutex::raw::NoopRawMutex, channel::Channel};

        let channel = Channel::<NoopRawMutex, PatternViewState, 1>::new();
        let mut sink = ChannelSink::new(channel.sender());
        sink.publish(PatternViewState::Started);
        sink.publish(PatternViewState::Initial);

        assert_eq!(sink.dropped(), 1);
        assert_eq!(channel.try_receive().ok(), Some(PatternViewState::Started));
    }
}
