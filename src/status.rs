//! Monitoring-framework output contract: one status line, one exit code.

use std::fmt;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl AlertStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            AlertStatus::Ok => 0,
            AlertStatus::Warning => 1,
            AlertStatus::Critical => 2,
            AlertStatus::Unknown => 3,
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertStatus::Ok => "OK",
            AlertStatus::Warning => "WARNING",
            AlertStatus::Critical => "CRITICAL",
            AlertStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// Final result of a plugin run.
///
/// `message: None` prints nothing, which is how the metric plugin reports
/// success after it has already written its metric line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    pub plugin: &'static str,
    pub status: AlertStatus,
    pub message: Option<String>,
}

impl PluginOutput {
    pub fn new(plugin: &'static str, status: AlertStatus, message: impl Into<String>) -> Self {
        Self {
            plugin,
            status,
            message: Some(message.into()),
        }
    }

    pub fn silent(plugin: &'static str, status: AlertStatus) -> Self {
        Self {
            plugin,
            status,
            message: None,
        }
    }

    pub fn unknown(plugin: &'static str, err: &crate::Error) -> Self {
        Self::new(plugin, err.status(), err.to_string())
    }

    pub fn line(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(|m| format!("{} {}: {}", self.plugin, self.status, m))
    }

    pub fn print_and_exit(self) -> ExitCode {
        if let Some(line) = self.line() {
            println!("{}", line);
        }
        ExitCode::from(self.status.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AlertStatus::Ok.exit_code(), 0);
        assert_eq!(AlertStatus::Warning.exit_code(), 1);
        assert_eq!(AlertStatus::Critical.exit_code(), 2);
        assert_eq!(AlertStatus::Unknown.exit_code(), 3);
    }

    #[test]
    fn test_status_line_format() {
        let out = PluginOutput::new("CheckSplunkResultCount", AlertStatus::Ok, "Search returned 9 results");
        assert_eq!(
            out.line().as_deref(),
            Some("CheckSplunkResultCount OK: Search returned 9 results")
        );
    }

    #[test]
    fn test_silent_output_has_no_line() {
        let out = PluginOutput::silent("MetricSplunkResultCount", AlertStatus::Ok);
        assert!(out.line().is_none());
    }

    #[test]
    fn test_unknown_from_error() {
        let err = crate::Error::NotFound("Check Log Health".into());
        let out = PluginOutput::unknown("CheckSplunkResultCount", &err);
        assert_eq!(out.status, AlertStatus::Unknown);
        assert_eq!(
            out.line().as_deref(),
            Some("CheckSplunkResultCount UNKNOWN: Saved search 'Check Log Health' not found")
        );
    }
}
