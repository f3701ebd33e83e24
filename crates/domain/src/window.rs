use chrono::{DateTime, Duration, Utc};

use crate::Attempt;

/// Attempt counts observed inside the trailing decision window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// All attempts with `occurred_at >= now - window`.
    pub recent: usize,
    /// Failed attempts inside the window.
    pub recent_failed: usize,
    /// Successful attempts inside the window.
    pub recent_succeeded: usize,
}

impl WindowCounts {
    /// Counts attempts that occurred at or after `now - window`.
    ///
    /// Every component that needs a windowed count goes through this function.
    #[must_use]
    pub fn evaluate<'a>(
        attempts: impl IntoIterator<Item = &'a Attempt>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        let window_start = now - window;

        attempts
            .into_iter()
            .filter(|attempt| attempt.occurred_at() >= window_start)
            .fold(Self::default(), |mut counts, attempt| {
                counts.recent += 1;
                if attempt.succeeded() {
                    counts.recent_succeeded += 1;
                } else {
                    counts.recent_failed += 1;
                }
                counts
            })
    }
}
