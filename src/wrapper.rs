use crate::{attempts::Next, delay::Delay, policy::RetryPolicy};

/// Runs `op` until it succeeds, fails with a non-retryable error, or runs
/// out of attempts.
///
/// The error returned is always one produced by `op` itself: the first
/// non-retryable one, or the last retryable one once attempts are
/// exhausted.
pub fn retry<T, E, D, F>(policy: &RetryPolicy<E, D>, mut op: F) -> Result<T, E>
where
    D: Delay,
    F: FnMut() -> Result<T, E>,
{
    let mut attempts = policy.attempts();
    let mut failed = 0_u32;

    loop {
        let err = match op() {
            Ok(value) => {
                if failed > 0 {
                    log::info!("[retry] succeeded after {failed} failed attempt(s)");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !policy.is_retryable(&err) {
            log::debug!("[retry] non-retryable failure, giving up");
            return Err(err);
        }

        failed += 1;
        policy.notify(&err);

        match attempts.track() {
            Next::Exhausted => {
                log::error!("[retry] all {failed} attempt(s) failed");
                return Err(err);
            }
            Next::RetryNow => {}
            Next::RetryAfter(delay) => policy.delay.delay(delay),
        }
    }
}

/// An operation bundled with its retry policy, callable any number of
/// times.
///
/// Built by [`RetryPolicy::wrap`]. Every call starts with a fresh attempt
/// counter and delay.
pub struct Retrying<F, E, D> {
    policy: RetryPolicy<E, D>,
    op: F,
}

impl<E, D> RetryPolicy<E, D> {
    /// Wraps `op` so each [`Retrying::call`] retries it under this policy.
    pub fn wrap<F>(self, op: F) -> Retrying<F, E, D> {
        Retrying { policy: self, op }
    }
}

impl<F, E, D> Retrying<F, E, D>
where
    D: Delay,
{
    /// Calls the wrapped operation with a clone of `args` on every attempt.
    ///
    /// Operations taking several arguments take them as a tuple.
    pub fn call<A, T>(&self, args: A) -> Result<T, E>
    where
        A: Clone,
        F: Fn(A) -> Result<T, E>,
    {
        retry(&self.policy, || (self.op)(args.clone()))
    }

    pub fn policy(&self) -> &RetryPolicy<E, D> {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::{Cell, RefCell},
        time::Duration,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Failure {
        Transient(u32),
        Fatal,
    }

    fn recording_policy(waits: &RefCell<Vec<Duration>>) -> RetryPolicy<Failure, impl Delay + '_> {
        RetryPolicy::new().with_delay(move |delay: Duration| waits.borrow_mut().push(delay))
    }

    #[test]
    fn test_success_on_first_attempt_skips_everything() {
        let waits = RefCell::new(Vec::new());
        let observed = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let policy = recording_policy(&waits)
            .initial_delay(Duration::from_secs(1))
            .on_failure({
                let observed = observed.clone();
                move |_| {
                    observed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            });
        let calls = Cell::new(0);

        let result = retry(&policy, || {
            calls.set(calls.get() + 1);
            Ok::<_, Failure>("done")
        });

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.get(), 1);
        assert!(waits.borrow().is_empty());
        assert_eq!(observed.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_always_failing_returns_last_error() {
        let waits = RefCell::new(Vec::new());
        let policy = recording_policy(&waits).max_retries(4);
        let calls = Cell::new(0);

        let result: Result<(), _> = retry(&policy, || {
            calls.set(calls.get() + 1);
            Err(Failure::Transient(calls.get()))
        });

        assert_eq!(result, Err(Failure::Transient(4)));
        assert_eq!(calls.get(), 4);
        assert!(waits.borrow().is_empty());
    }

    #[test]
    fn test_succeeds_on_third_attempt() {
        let waits = RefCell::new(Vec::new());
        let policy = recording_policy(&waits)
            .max_retries(5)
            .initial_delay(Duration::from_millis(100))
            .delay_step(Duration::from_millis(50));
        let calls = Cell::new(0);

        let result = retry(&policy, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Failure::Transient(calls.get()))
            } else {
                Ok(42)
            }
        });

        assert_eq!(result, Ok(42));
        assert_eq!(calls.get(), 3);
        assert_eq!(
            *waits.borrow(),
            vec![Duration::from_millis(100), Duration::from_millis(150)]
        );
    }

    #[test]
    fn test_non_retryable_failure_passes_through() {
        let waits = RefCell::new(Vec::new());
        let policy = recording_policy(&waits)
            .initial_delay(Duration::from_secs(1))
            .retry_if(|f| matches!(f, Failure::Transient(_)))
            .on_failure(|f| panic!("observer called for {f:?}"));
        let calls = Cell::new(0);

        let result: Result<(), _> = retry(&policy, || {
            calls.set(calls.get() + 1);
            Err(Failure::Fatal)
        });

        assert_eq!(result, Err(Failure::Fatal));
        assert_eq!(calls.get(), 1);
        assert!(waits.borrow().is_empty());
    }

    #[test]
    fn test_non_retryable_after_retryable_does_not_consume_attempt() {
        let waits = RefCell::new(Vec::new());
        let policy = recording_policy(&waits)
            .max_retries(3)
            .delay_step(Duration::from_millis(10))
            .retry_if(|f| matches!(f, Failure::Transient(_)));
        let calls = Cell::new(0);

        let result: Result<(), _> = retry(&policy, || {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err(Failure::Transient(1))
            } else {
                Err(Failure::Fatal)
            }
        });

        assert_eq!(result, Err(Failure::Fatal));
        assert_eq!(calls.get(), 2);
        assert_eq!(*waits.borrow(), vec![Duration::ZERO]);
    }

    #[test]
    fn test_zero_max_retries_attempts_once() {
        let waits = RefCell::new(Vec::new());
        let policy = recording_policy(&waits)
            .max_retries(0)
            .initial_delay(Duration::from_secs(1));
        let calls = Cell::new(0);

        let result: Result<(), _> = retry(&policy, || {
            calls.set(calls.get() + 1);
            Err(Failure::Transient(0))
        });

        assert_eq!(result, Err(Failure::Transient(0)));
        assert_eq!(calls.get(), 1);
        assert!(waits.borrow().is_empty());
    }

    #[test]
    fn test_wrapped_call_forwards_args_and_resets_state() {
        let waits = RefCell::new(Vec::new());
        let calls = Cell::new(0);
        let wrapped = recording_policy(&waits)
            .max_retries(2)
            .initial_delay(Duration::from_millis(5))
            .delay_step(Duration::from_millis(5))
            .wrap(|(a, b): (u32, u32)| {
                calls.set(calls.get() + 1);
                if calls.get() % 2 == 1 {
                    Err(Failure::Transient(a))
                } else {
                    Ok(a + b)
                }
            });

        assert_eq!(wrapped.call((2, 3)), Ok(5));
        assert_eq!(wrapped.call((10, 1)), Ok(11));
        assert_eq!(calls.get(), 4);
        assert_eq!(
            *waits.borrow(),
            vec![Duration::from_millis(5), Duration::from_millis(5)]
        );
    }

    #[derive(Debug, PartialEq)]
    enum Event {
        Observed(u32),
        Waited(Duration),
    }

    #[test]
    fn test_observer_runs_before_each_wait() {
        let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let policy = RetryPolicy::new()
            .max_retries(3)
            .initial_delay(Duration::from_millis(10))
            .delay_step(Duration::from_millis(5))
            .on_failure({
                let events = events.clone();
                move |f: &Failure| {
                    if let Failure::Transient(n) = f {
                        events.lock().unwrap().push(Event::Observed(*n));
                    }
                }
            })
            .with_delay({
                let events = events.clone();
                move |delay: Duration| events.lock().unwrap().push(Event::Waited(delay))
            });
        let calls = Cell::new(0);

        let result: Result<(), _> = retry(&policy, || {
            calls.set(calls.get() + 1);
            Err(Failure::Transient(calls.get()))
        });

        assert_eq!(result, Err(Failure::Transient(3)));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Event::Observed(1),
                Event::Waited(Duration::from_millis(10)),
                Event::Observed(2),
                Event::Waited(Duration::from_millis(15)),
                Event::Observed(3),
            ]
        );
    }
}
