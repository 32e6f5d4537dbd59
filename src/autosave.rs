#[cfg(test)]
#[path = "autosave_test.rs"]
mod autosave_test;

/// Trailing-edge debouncer driven by the host clock.
///
/// Every [`Debouncer::touch`] pushes the deadline out to `now + delay`; the
/// pending save fires once from [`Debouncer::poll`] after the changes stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debouncer {
    delay_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, deadline_ms: None }
    }

    /// Record a change at `now_ms`.
    pub fn touch(&mut self, now_ms: f64) {
        self.deadline_ms = Some(now_ms + self.delay_ms);
    }

    /// Whether a change is waiting to be flushed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Drop a pending change, e.g. because a full save already covered it.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }
}
