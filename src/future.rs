use crate::{
    attempts::{Attempts, Next},
    delay::AsyncDelay,
    policy::RetryPolicy,
};
use futures_util::{FutureExt as _, ready};
use pin_project_lite::pin_project;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

pin_project! {
    /// Future returned by [`retry_async`] and [`AsyncRetrying::call`].
    ///
    /// Drives the operation and the waits between attempts; dropping it
    /// abandons whatever attempt or wait is in flight.
    pub struct RetryFuture<'p, E, D, F, Fut>
    where
        D: AsyncDelay,
    {
        policy: &'p RetryPolicy<E, D>,
        op: F,
        attempts: Attempts,
        failed: u32,
        #[pin]
        state: State<Fut, D::Fut>,
    }
}

enum State<Fut, Sleep> {
    ReadyToAttempt,
    Attempting { fut: Pin<Box<Fut>> },
    Sleeping { fut: Pin<Box<Sleep>> },
    Done,
}

/// Async twin of [`retry`](crate::retry): waits through the policy's
/// [`AsyncDelay`] instead of blocking the thread.
pub fn retry_async<T, E, D, F, Fut>(
    policy: &RetryPolicy<E, D>,
    op: F,
) -> RetryFuture<'_, E, D, F, Fut>
where
    D: AsyncDelay,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryFuture {
        policy,
        op,
        attempts: policy.attempts(),
        failed: 0,
        state: State::ReadyToAttempt,
    }
}

impl<E, D, F, Fut, T> Future for RetryFuture<'_, E, D, F, Fut>
where
    D: AsyncDelay,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        loop {
            match this.state.as_mut().get_mut() {
                State::ReadyToAttempt => {
                    let fut = Box::pin((this.op)());
                    this.state.set(State::Attempting { fut });
                }
                State::Attempting { fut } => {
                    let err = match ready!(fut.poll_unpin(cx)) {
                        Ok(value) => {
                            if *this.failed > 0 {
                                log::info!(
                                    "[retry] succeeded after {} failed attempt(s)",
                                    this.failed
                                );
                            }
                            this.state.set(State::Done);
                            return Poll::Ready(Ok(value));
                        }
                        Err(err) => err,
                    };

                    if !this.policy.is_retryable(&err) {
                        log::debug!("[retry] non-retryable failure, giving up");
                        this.state.set(State::Done);
                        return Poll::Ready(Err(err));
                    }

                    *this.failed += 1;
                    this.policy.notify(&err);

                    match this.attempts.track() {
                        Next::Exhausted => {
                            log::error!("[retry] all {} attempt(s) failed", this.failed);
                            this.state.set(State::Done);
                            return Poll::Ready(Err(err));
                        }
                        Next::RetryNow => this.state.set(State::ReadyToAttempt),
                        Next::RetryAfter(delay) => {
                            let fut = Box::pin(this.policy.delay.delay(delay));
                            this.state.set(State::Sleeping { fut });
                        }
                    }
                }
                State::Sleeping { fut } => {
                    ready!(fut.poll_unpin(cx));
                    this.state.set(State::ReadyToAttempt);
                }
                State::Done => panic!("RetryFuture polled after completion"),
            }
        }
    }
}

/// Async counterpart of [`Retrying`](crate::Retrying), built by
/// [`RetryPolicy::wrap_async`].
pub struct AsyncRetrying<F, E, D> {
    policy: RetryPolicy<E, D>,
    op: F,
}

impl<E, D> RetryPolicy<E, D> {
    /// Wraps an async operation so each [`AsyncRetrying::call`] retries it
    /// under this policy.
    pub fn wrap_async<F>(self, op: F) -> AsyncRetrying<F, E, D> {
        AsyncRetrying { policy: self, op }
    }
}

impl<F, E, D> AsyncRetrying<F, E, D>
where
    D: AsyncDelay,
{
    /// Calls the wrapped operation with a clone of `args` on every attempt.
    pub fn call<'a, A, T, Fut>(
        &'a self,
        args: A,
    ) -> RetryFuture<'a, E, D, impl FnMut() -> Fut + 'a, Fut>
    where
        A: Clone + 'a,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let op = &self.op;
        retry_async(&self.policy, move || op(args.clone()))
    }

    pub fn policy(&self) -> &RetryPolicy<E, D> {
        &self.policy
    }
}
