//! Dispatch a saved search and wait, at one-second granularity, for it to be
//! ready. A job that outlives the timeout is left running on the server.

use log::{debug, warn};
use std::time::Duration;

use crate::config::SearchRequest;
use crate::error::{Error, Result};
use crate::service::SearchService;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Readiness polling as a state machine. `elapsed` counts completed sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Dispatched,
    Polling { elapsed: u64 },
    Ready { elapsed: u64 },
    TimedOut { elapsed: u64 },
}

impl PollState {
    pub fn elapsed(self) -> u64 {
        match self {
            PollState::Dispatched => 0,
            PollState::Polling { elapsed }
            | PollState::Ready { elapsed }
            | PollState::TimedOut { elapsed } => elapsed,
        }
    }

    /// Apply the result of a readiness check.
    ///
    /// The shortest detectable timeout is one poll interval, so a timeout of
    /// zero still waits once before giving up.
    pub fn observe(self, ready: bool, timeout_seconds: u64) -> PollState {
        let elapsed = self.elapsed();
        match self {
            PollState::Ready { .. } | PollState::TimedOut { .. } => self,
            _ if ready => PollState::Ready { elapsed },
            _ if elapsed >= timeout_seconds.max(1) => PollState::TimedOut { elapsed },
            _ => PollState::Polling { elapsed },
        }
    }

    /// One poll interval has passed.
    pub fn tick(self) -> PollState {
        match self {
            PollState::Dispatched => PollState::Polling { elapsed: 1 },
            PollState::Polling { elapsed } => PollState::Polling { elapsed: elapsed + 1 },
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Ready { .. } | PollState::TimedOut { .. })
    }
}

pub struct SearchExecutor<'a, S, Z> {
    service: &'a S,
    sleeper: Z,
}

impl<'a, S: SearchService, Z: Sleeper> SearchExecutor<'a, S, Z> {
    pub fn new(service: &'a S, sleeper: Z) -> Self {
        Self { service, sleeper }
    }

    pub async fn dispatch_and_wait(&self, request: &SearchRequest) -> Result<S::Job> {
        let job = self.service.dispatch(&request.job_name).await?;
        let mut state = PollState::Dispatched;

        loop {
            let ready = self.service.is_ready(&job).await?;
            state = state.observe(ready, request.timeout_seconds);
            debug!("Poll state for '{}': {:?}", request.job_name, state);

            match state {
                PollState::Ready { .. } => return Ok(job),
                PollState::TimedOut { elapsed } => {
                    warn!(
                        "Search '{}' not ready after {}s, giving up",
                        request.job_name, elapsed
                    );
                    return Err(Error::Timeout {
                        seconds: request.timeout_seconds,
                    });
                }
                PollState::Dispatched | PollState::Polling { .. } => {
                    self.sleeper.sleep(POLL_INTERVAL).await;
                    state = state.tick();
                }
            }
        }
    }
}
