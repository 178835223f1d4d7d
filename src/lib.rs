//! Retry a fallible operation a bounded number of times, with a linearly
//! growing delay between attempts and an optional observer for failures.
//!
//! ```no_run
//! use linear_retry::{RetryPolicy, retry};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new()
//!     .max_retries(3)
//!     .initial_delay(Duration::from_secs(1))
//!     .delay_step(Duration::from_secs(1))
//!     .retry_if(|err: &std::io::Error| err.kind() == std::io::ErrorKind::TimedOut);
//!
//! let content = retry(&policy, || std::fs::read_to_string("/tmp/flaky"));
//! ```

pub use config::{ConfigReadOption, RetryConfig};
pub use delay::{AsyncDelay, Delay, ThreadDelay, TokioDelay};
pub use future::{AsyncRetrying, RetryFuture, retry_async};
pub use logger::Logger;
pub use policy::RetryPolicy;
pub use wrapper::{Retrying, retry};

mod attempts;
mod config;
mod delay;
mod future;
mod logger;
mod policy;
mod wrapper;
