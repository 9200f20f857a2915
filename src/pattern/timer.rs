/// Single-shot countdown that returns an Error state to Initial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetTimer {
    delay_ms: u64,
    deadline_ms: Option<u64>,
}

impl ResetTimer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
        }
    }

    /// Arms the countdown unless it is already pending.
    pub fn arm(&mut self, now_ms: u64) -> bool {
        if self.deadline_ms.is_some() {
            return false;
        }
        self.deadline_ms = Some(now_ms.saturating_add(self.delay_ms));
        true
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Fires at most once per arm.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
