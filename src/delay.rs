use std::{future::Future, time::Duration};

/// Blocking wait between attempts.
///
/// Any `Fn(Duration)` closure is a `Delay`, so callers can inject their own
/// sleep (or a recorder in tests).
pub trait Delay {
    fn delay(&self, duration: Duration);
}

/// Awaitable wait between attempts, for code running on a cooperative
/// scheduler where blocking the thread would stall other tasks.
///
/// Any `Fn(Duration) -> impl Future<Output = ()>` closure is an `AsyncDelay`.
pub trait AsyncDelay {
    type Fut: Future<Output = ()>;

    fn delay(&self, duration: Duration) -> Self::Fut;
}

/// Default delay: `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Timer-backed delay for tokio runtimes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl AsyncDelay for TokioDelay {
    type Fut = tokio::time::Sleep;

    fn delay(&self, duration: Duration) -> Self::Fut {
        tokio::time::sleep(duration)
    }
}

impl<F> Delay for F
where
    F: Fn(Duration),
{
    fn delay(&self, duration: Duration) {
        self(duration)
    }
}

impl<F, Fut> AsyncDelay for F
where
    F: Fn(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    type Fut = Fut;

    fn delay(&self, duration: Duration) -> Self::Fut {
        self(duration)
    }
}
