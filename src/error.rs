use crate::status::AlertStatus;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure ends the invocation; none of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),

    #[error("Unable to connect to Splunk: {0}")]
    Connection(String),

    #[error("Saved search '{0}' not found")]
    NotFound(String),

    #[error("Splunk didn't return valid results before the timeout period of {seconds}")]
    Timeout { seconds: u64 },

    #[error("Failed to read results preview: {0}")]
    Stream(String),

    #[error("Non-numeric result returned from search: {0}")]
    NonNumericResult(String),
}

impl Error {
    /// Status reported to the monitoring framework. Errors never carry a count.
    pub fn status(&self) -> AlertStatus {
        AlertStatus::Unknown
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Connection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_embeds_seconds() {
        let err = Error::Timeout { seconds: 5 };
        assert_eq!(
            err.to_string(),
            "Splunk didn't return valid results before the timeout period of 5"
        );
    }

    #[test]
    fn test_all_errors_are_unknown() {
        let errors = [
            Error::Configuration("bad".into()),
            Error::Connection("refused".into()),
            Error::NotFound("x".into()),
            Error::Timeout { seconds: 1 },
            Error::Stream("eof".into()),
            Error::NonNumericResult("huge".into()),
        ];
        for err in errors {
            assert_eq!(err.status(), AlertStatus::Unknown);
        }
    }
}
