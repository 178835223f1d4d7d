use crate::delay::ThreadDelay;
use std::{fmt, sync::Arc, time::Duration};

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;
type Observer<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// How a wrapped operation is retried.
///
/// A policy is built once and shared by every invocation of the wrapped
/// operation; each invocation keeps its own attempt counter and delay.
///
/// Defaults: 5 attempts, no delay, every failure is retryable, blocking
/// [`ThreadDelay`], no observer.
pub struct RetryPolicy<E, D = ThreadDelay> {
    max_retries: u32,
    initial_delay: Duration,
    delay_step: Duration,
    retry_on: Vec<Predicate<E>>,
    on_failure: Option<Observer<E>>,
    pub(crate) delay: D,
}

impl<E> RetryPolicy<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::ZERO,
            delay_step: Duration::ZERO,
            retry_on: Vec::new(),
            on_failure: None,
            delay: ThreadDelay,
        }
    }
}

impl<E, D> RetryPolicy<E, D> {
    /// Number of attempts before giving up. `0` behaves like `1`: the
    /// operation runs once and its failure is returned.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait before the second attempt.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Added to the wait after every retried failure.
    pub fn delay_step(mut self, step: Duration) -> Self {
        self.delay_step = step;
        self
    }

    /// Registers a retryable failure kind. Failures matching none of the
    /// registered predicates are returned immediately; with no predicate
    /// registered every failure is retryable.
    pub fn retry_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retry_on.push(Arc::new(predicate));
        self
    }

    /// Observer called once per retryable failure, before any wait.
    /// Replaces a previously set observer.
    pub fn on_failure<O>(mut self, observer: O) -> Self
    where
        O: Fn(&E) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(observer));
        self
    }

    /// Logs every retryable failure at `warn` level.
    pub fn log_failures(self) -> Self
    where
        E: fmt::Debug + 'static,
    {
        self.on_failure(|err: &E| log::warn!("[retry] attempt failed: {err:?}"))
    }

    /// Swaps the wait primitive, e.g. for [`TokioDelay`](crate::TokioDelay)
    /// or a closure.
    pub fn with_delay<D2>(self, delay: D2) -> RetryPolicy<E, D2> {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: self.initial_delay,
            delay_step: self.delay_step,
            retry_on: self.retry_on,
            on_failure: self.on_failure,
            delay,
        }
    }

    pub fn retry_limit(&self) -> u32 {
        self.max_retries
    }

    pub fn first_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn delay_increment(&self) -> Duration {
        self.delay_step
    }

    pub fn delay_fn(&self) -> &D {
        &self.delay
    }

    pub fn is_retryable(&self, err: &E) -> bool {
        self.retry_on.is_empty() || self.retry_on.iter().any(|predicate| predicate(err))
    }

    pub(crate) fn notify(&self, err: &E) {
        if let Some(observer) = &self.on_failure {
            observer(err);
        }
    }

    pub(crate) fn attempts(&self) -> crate::attempts::Attempts {
        crate::attempts::Attempts::starting(self.max_retries, self.initial_delay, self.delay_step)
    }
}

impl<D> RetryPolicy<anyhow::Error, D> {
    /// Registers `K` as a retryable failure kind, matched by downcasting.
    pub fn retry_on<K>(self) -> Self
    where
        K: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.retry_if(|err: &anyhow::Error| err.downcast_ref::<K>().is_some())
    }
}

impl<E, D: Clone> Clone for RetryPolicy<E, D> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            initial_delay: self.initial_delay,
            delay_step: self.delay_step,
            retry_on: self.retry_on.clone(),
            on_failure: self.on_failure.clone(),
            delay: self.delay.clone(),
        }
    }
}

impl<E, D> fmt::Debug for RetryPolicy<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("initial_delay", &self.initial_delay)
            .field("delay_step", &self.delay_step)
            .field("retry_on", &self.retry_on.len())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
