use log::debug;

use crate::error::{Error, Result};
use crate::models::splunk::ResultRecord;

/// Number of records a search produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResultCount(pub u64);

impl ResultCount {
    /// Thresholds are signed, so the count must fit an `i64` to be compared.
    pub fn as_i64(self) -> Result<i64> {
        i64::try_from(self.0).map_err(|_| {
            Error::NonNumericResult(format!("count {} is out of range", self.0))
        })
    }
}

impl std::fmt::Display for ResultCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Walk the preview stream to exhaustion, one increment per record.
///
/// Preview readers do not report a reliable length, so nothing here asks
/// for one. The first failing record aborts the count.
pub fn count<I>(preview: I) -> Result<ResultCount>
where
    I: IntoIterator<Item = Result<ResultRecord>>,
{
    let mut n: u64 = 0;
    for record in preview {
        record?;
        n += 1;
    }
    debug!("Counted {} records in results preview", n);
    Ok(ResultCount(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_stream_is_zero() {
        let empty: Vec<Result<ResultRecord>> = vec![];
        assert_eq!(count(empty).unwrap(), ResultCount(0));
    }

    #[test]
    fn test_counts_regardless_of_content() {
        let records = vec![
            Ok(json!({"host": "web01"})),
            Ok(json!(null)),
            Ok(json!({})),
            Ok(json!("raw line")),
        ];
        assert_eq!(count(records).unwrap(), ResultCount(4));
    }

    #[test]
    fn test_lazy_iterator_is_consumed() {
        let records = (0..250).map(|i| Ok(json!({ "n": i })));
        assert_eq!(count(records).unwrap(), ResultCount(250));
    }

    #[test]
    fn test_stream_error_aborts() {
        let records = vec![Ok(json!({})), Err(Error::Stream("truncated".into())), Ok(json!({}))];
        let err = count(records).unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
    }

    #[test]
    fn test_out_of_range_count_is_non_numeric() {
        assert_eq!(ResultCount(7).as_i64().unwrap(), 7);
        let err = ResultCount(u64::MAX).as_i64().unwrap_err();
        assert!(matches!(err, Error::NonNumericResult(_)));
    }
}
