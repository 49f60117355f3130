//! Graphite-style metric line for a search's result count.

use std::fmt;

use crate::counter::ResultCount;

/// Source of the metric timestamp.
pub trait Clock {
    /// Current time as Unix seconds since epoch.
    fn now_unix_sec(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_sec(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Fixed timestamp, for tests.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    timestamp: u64,
}

impl MockClock {
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl Clock for MockClock {
    fn now_unix_sec(&self) -> u64 {
        self.timestamp
    }
}

/// Drop everything outside `[0-9A-Za-z]`. Nothing is substituted.
pub fn sanitize(job_name: &str) -> String {
    job_name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// `<hostname>.splunk_results`
pub fn default_scheme() -> String {
    format!("{}.splunk_results", gethostname::gethostname().to_string_lossy())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricLine {
    pub key: String,
    pub value: ResultCount,
    pub timestamp: u64,
}

impl MetricLine {
    pub fn new(scheme: &str, job_name: &str, value: ResultCount, clock: &impl Clock) -> Self {
        Self {
            key: format!("{}.{}", scheme, sanitize(job_name)),
            value,
            timestamp: clock.now_unix_sec(),
        }
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key, self.value, self.timestamp)
    }
}

/// Format the metric line for stdout (without trailing newline).
pub fn emit(scheme: &str, job_name: &str, count: ResultCount, clock: &impl Clock) -> String {
    MetricLine::new(scheme, job_name, count, clock).to_string()
}
