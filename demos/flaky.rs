use anyhow::{Context as _, Result};
use linear_retry::{ConfigReadOption, Logger, RetryConfig, RetryPolicy, TokioDelay, retry_async};
use std::{
    io,
    sync::atomic::{AtomicU32, Ordering},
};

static CALLS: AtomicU32 = AtomicU32::new(0);

fn flaky_fetch(succeed_on: u32) -> Result<String> {
    let n = CALLS.fetch_add(1, Ordering::SeqCst) + 1;
    if n < succeed_on {
        let err = io::Error::new(io::ErrorKind::TimedOut, format!("attempt {n} timed out"));
        return Err(err.into());
    }
    Ok(format!("payload after {n} attempt(s)"))
}

fn main() -> Result<()> {
    Logger::init();

    let config = match RetryConfig::read(ConfigReadOption::FromLocalFile) {
        Ok(config) => config,
        Err(err) => {
            log::info!("using default config: {err:#}");
            RetryConfig {
                max_retries: 4,
                initial_delay_ms: 100,
                delay_step_ms: 100,
            }
        }
    };
    log::info!("{config:?}");

    let policy = RetryPolicy::<anyhow::Error>::from(&config)
        .retry_on::<io::Error>()
        .log_failures();

    let payload = linear_retry::retry(&policy, || flaky_fetch(3))?;
    log::info!("sync: {payload}");

    CALLS.store(0, Ordering::SeqCst);
    let policy = policy.with_delay(TokioDelay);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let payload = rt.block_on(retry_async(&policy, || async { flaky_fetch(2) }))?;
    log::info!("async: {payload}");

    Ok(())
}
