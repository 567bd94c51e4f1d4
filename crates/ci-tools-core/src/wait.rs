//! Timeout-bounded polling.
//!
//! A probe is called on a fixed interval until it reports success or the
//! overall deadline elapses. Probes return `Result<bool, E>`:
//!
//! - `Ok(true)`: the awaited condition holds, polling stops with success.
//! - `Ok(false)`: not yet, poll again after the interval.
//! - `Err(e)`: an operational failure (resource not reachable yet, API hiccup).
//!   The error is reported and polling continues.
//!
//! A probe that panics is a bug, not an operational failure: the panic is not
//! caught and reaches the caller on the first occurrence.
//!
//! There is no backoff or jitter. Attempts are scheduled on a fixed grid of
//! `interval` starting at the first attempt; an attempt that overruns its slot
//! is followed immediately by the next one.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error(
        "waiting for resource failed in given timeout {:.6} second(s)",
        .deadline.as_secs_f64()
    )]
    TimedOut { deadline: Duration },

    #[error(
        "waiting for resource cancelled after {:.6} second(s)",
        .elapsed.as_secs_f64()
    )]
    Cancelled { elapsed: Duration },

    #[error("invalid poll configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Interval and deadline for one polling operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between the starts of two consecutive probe attempts.
    pub interval: Duration,
    /// Total time budget, measured from the first attempt. `Duration::MAX`
    /// waits without bound.
    pub deadline: Duration,
}

/// Poll `probe` every `interval` until it returns `Ok(true)` or `deadline`
/// elapses. Probe errors are logged as warnings.
pub fn wait_at_most<F, E>(probe: F, interval: Duration, deadline: Duration) -> Result<(), WaitError>
where
    F: FnMut() -> Result<bool, E>,
    E: Display,
{
    PollConfig::new(interval, deadline).wait(probe)
}

impl PollConfig {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    pub fn validate(&self) -> Result<(), WaitError> {
        if self.interval.is_zero() {
            return Err(WaitError::InvalidConfig("interval must be greater than zero"));
        }
        if self.deadline.is_zero() {
            return Err(WaitError::InvalidConfig("deadline must be greater than zero"));
        }
        Ok(())
    }

    /// Blocking poll. Probe errors go to the `tracing` warn level.
    pub fn wait<F, E>(&self, probe: F) -> Result<(), WaitError>
    where
        F: FnMut() -> Result<bool, E>,
        E: Display,
    {
        self.wait_reporting(probe, log_probe_error::<E>)
    }

    /// Blocking poll that hands every probe error to `report`.
    pub fn wait_reporting<F, E, R>(&self, mut probe: F, mut report: R) -> Result<(), WaitError>
    where
        F: FnMut() -> Result<bool, E>,
        R: FnMut(&E),
    {
        self.validate()?;

        let start = Instant::now();
        // `None` when the deadline lies beyond what `Instant` can represent.
        let deadline_at = start.checked_add(self.deadline);
        let mut attempt_at = start;

        loop {
            if run_probe(&mut probe, &mut report) {
                return Ok(());
            }

            match next_wake(attempt_at, self.interval, deadline_at, Instant::now()) {
                Wake::Attempt(next) => {
                    std::thread::sleep(next.saturating_duration_since(Instant::now()));
                    attempt_at = next;
                }
                Wake::Deadline(at) => {
                    std::thread::sleep(at.saturating_duration_since(Instant::now()));
                    return Err(WaitError::TimedOut {
                        deadline: self.deadline,
                    });
                }
                Wake::Never => loop {
                    std::thread::park();
                },
            }
        }
    }

    /// Async poll that also stops when `cancel` resolves.
    ///
    /// The probe itself still runs synchronously on the calling task, one
    /// attempt at a time; only the wait between attempts races `cancel`.
    pub async fn wait_async<F, E, C>(&self, mut probe: F, cancel: C) -> Result<(), WaitError>
    where
        F: FnMut() -> Result<bool, E>,
        E: Display,
        C: Future<Output = ()>,
    {
        self.validate()?;
        tokio::pin!(cancel);

        let start = Instant::now();
        let deadline_at = start.checked_add(self.deadline);
        let mut attempt_at = start;
        let mut report = log_probe_error::<E>;

        loop {
            if run_probe(&mut probe, &mut report) {
                return Ok(());
            }

            let wake = next_wake(attempt_at, self.interval, deadline_at, Instant::now());
            let sleep = async {
                match wake {
                    Wake::Attempt(at) | Wake::Deadline(at) => {
                        tokio::time::sleep_until(at.into()).await
                    }
                    Wake::Never => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                _ = &mut cancel => {
                    return Err(WaitError::Cancelled {
                        elapsed: start.elapsed(),
                    });
                }
                _ = sleep => {}
            }

            match wake {
                Wake::Attempt(next) => attempt_at = next,
                _ => {
                    return Err(WaitError::TimedOut {
                        deadline: self.deadline,
                    })
                }
            }
        }
    }
}

/// What the poller does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    /// Probe again at this instant.
    Attempt(Instant),
    /// Give up once this instant is reached.
    Deadline(Instant),
    /// Neither another attempt nor the deadline is representable.
    Never,
}

/// Next step on the fixed grid. The deadline wins ties, and an overflowing
/// `interval` means no further attempt before the deadline.
fn next_wake(
    attempt_at: Instant,
    interval: Duration,
    deadline_at: Option<Instant>,
    now: Instant,
) -> Wake {
    let next = attempt_at.checked_add(interval).map(|next| next.max(now));
    match (next, deadline_at) {
        (Some(next), Some(deadline)) if next < deadline => Wake::Attempt(next),
        (Some(next), None) => Wake::Attempt(next),
        (_, Some(deadline)) => Wake::Deadline(deadline),
        (None, None) => Wake::Never,
    }
}

fn run_probe<F, E, R>(probe: &mut F, report: &mut R) -> bool
where
    F: FnMut() -> Result<bool, E>,
    R: FnMut(&E),
{
    match probe() {
        Ok(met) => met,
        Err(err) => {
            report(&err);
            false
        }
    }
}

fn log_probe_error<E: Display>(err: &E) {
    warn!("while executing condition: {err}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
