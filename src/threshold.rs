use std::fmt;
use std::str::FromStr;

use crate::counter::ResultCount;
use crate::error::{Error, Result};
use crate::status::AlertStatus;

/// Which side of a threshold raises an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `lt`: alert when the count falls to or below a threshold.
    BelowOrEqual,
    /// `gt`: alert when the count rises to or above a threshold.
    AboveOrEqual,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lt" => Ok(Direction::BelowOrEqual),
            "gt" => Ok(Direction::AboveOrEqual),
            other => Err(Error::Configuration(format!(
                "Invalid comparison method specified (-m): {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::BelowOrEqual => "lt",
            Direction::AboveOrEqual => "gt",
        };
        write!(f, "{}", s)
    }
}

/// No ordering is enforced between `warning` and `critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: i64,
    pub critical: i64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub status: AlertStatus,
    pub message: String,
}

impl Evaluation {
    fn new(status: AlertStatus, message: String) -> Self {
        Self { status, message }
    }
}

/// Critical is checked first, so a count matching both thresholds is critical.
pub fn evaluate(count: ResultCount, thresholds: &Thresholds) -> Result<Evaluation> {
    let n = count.as_i64()?;
    let Thresholds {
        warning,
        critical,
        direction,
    } = *thresholds;

    let evaluation = match direction {
        Direction::BelowOrEqual if n <= critical => Evaluation::new(
            AlertStatus::Critical,
            format!(
                "Search returned {} results which is at or below defined critical threshold of {}",
                n, critical
            ),
        ),
        Direction::BelowOrEqual if n <= warning => Evaluation::new(
            AlertStatus::Warning,
            format!(
                "Search returned {} results which is at or below the defined warning threshold of {}",
                n, warning
            ),
        ),
        Direction::AboveOrEqual if n >= critical => Evaluation::new(
            AlertStatus::Critical,
            format!(
                "Search returned {} results which is at or above defined critical ceiling of {}",
                n, critical
            ),
        ),
        Direction::AboveOrEqual if n >= warning => Evaluation::new(
            AlertStatus::Warning,
            format!(
                "Search returned {} results which is at or above the defined warning ceiling of {}",
                n, warning
            ),
        ),
        _ => Evaluation::new(AlertStatus::Ok, format!("Search returned {} results", n)),
    };
    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt(warning: i64, critical: i64) -> Thresholds {
        Thresholds {
            warning,
            critical,
            direction: Direction::BelowOrEqual,
        }
    }

    fn gt(warning: i64, critical: i64) -> Thresholds {
        Thresholds {
            warning,
            critical,
            direction: Direction::AboveOrEqual,
        }
    }

    fn status(count: u64, t: &Thresholds) -> AlertStatus {
        evaluate(ResultCount(count), t).unwrap().status
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("lt".parse::<Direction>().unwrap(), Direction::BelowOrEqual);
        assert_eq!("gt".parse::<Direction>().unwrap(), Direction::AboveOrEqual);
    }

    #[test]
    fn test_invalid_direction_is_configuration_error() {
        let err = "eq".parse::<Direction>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.to_string(), "Invalid comparison method specified (-m): eq");
        assert_eq!(err.status(), AlertStatus::Unknown);
    }

    #[test]
    fn test_lt_warning_scenario() {
        let eval = evaluate(ResultCount(3), &lt(5, 0)).unwrap();
        assert_eq!(eval.status, AlertStatus::Warning);
        assert_eq!(
            eval.message,
            "Search returned 3 results which is at or below the defined warning threshold of 5"
        );
    }

    #[test]
    fn test_gt_critical_scenario() {
        let eval = evaluate(ResultCount(10), &gt(5, 10)).unwrap();
        assert_eq!(eval.status, AlertStatus::Critical);
        assert!(eval.message.contains("critical ceiling of 10"));
    }

    #[test]
    fn test_ok_message() {
        let eval = evaluate(ResultCount(9), &lt(5, 0)).unwrap();
        assert_eq!(eval.status, AlertStatus::Ok);
        assert_eq!(eval.message, "Search returned 9 results");
    }

    #[test]
    fn test_critical_takes_precedence_at_shared_boundary() {
        assert_eq!(status(4, &lt(4, 4)), AlertStatus::Critical);
        assert_eq!(status(4, &gt(4, 4)), AlertStatus::Critical);
    }

    #[test]
    fn test_below_or_equal_law() {
        for (w, c) in [(5, 0), (0, 5), (3, 3), (10, 2)] {
            let t = lt(w, c);
            for n in 0..15u64 {
                let v = n as i64;
                let expected = if v <= c {
                    AlertStatus::Critical
                } else if v <= w {
                    AlertStatus::Warning
                } else {
                    AlertStatus::Ok
                };
                assert_eq!(status(n, &t), expected, "n={} w={} c={}", n, w, c);
            }
        }
    }

    #[test]
    fn test_above_or_equal_law() {
        for (w, c) in [(5, 10), (10, 5), (3, 3), (0, 1)] {
            let t = gt(w, c);
            for n in 0..15u64 {
                let v = n as i64;
                let expected = if v >= c {
                    AlertStatus::Critical
                } else if v >= w {
                    AlertStatus::Warning
                } else {
                    AlertStatus::Ok
                };
                assert_eq!(status(n, &t), expected, "n={} w={} c={}", n, w, c);
            }
        }
    }

    #[test]
    fn test_empty_result_with_default_thresholds_is_critical() {
        assert_eq!(status(0, &lt(5, 0)), AlertStatus::Critical);
    }

    #[test]
    fn test_count_out_of_range() {
        let err = evaluate(ResultCount(u64::MAX), &lt(5, 0)).unwrap_err();
        assert!(matches!(err, Error::NonNumericResult(_)));
    }
}
