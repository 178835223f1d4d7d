use std::time::Duration;

/// What the retry loop does after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Next {
    /// No attempts left, surface the failure.
    Exhausted,
    /// Try again without waiting.
    RetryNow,
    /// Wait this long through the delay function, then try again.
    RetryAfter(Duration),
}

/// Per-invocation bookkeeping: remaining attempts and the linear backoff.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attempts {
    remaining: u32,
    delay: Duration,
    step: Duration,
}

impl Attempts {
    /// `max_retries == 0` still allows one attempt.
    pub(crate) fn starting(max_retries: u32, initial_delay: Duration, step: Duration) -> Self {
        Self {
            remaining: max_retries.max(1),
            delay: initial_delay,
            step,
        }
    }

    /// Consumes one attempt after a retryable failure.
    pub(crate) fn track(&mut self) -> Next {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            return Next::Exhausted;
        }

        let delay = self.delay;
        log::warn!(
            "[retry] attempts left = {}, delay = {delay:?}",
            self.remaining
        );

        if self.delay.is_zero() && self.step.is_zero() {
            return Next::RetryNow;
        }

        self.delay = self.delay.saturating_add(self.step);
        Next::RetryAfter(delay)
    }
}
