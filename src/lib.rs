//! Count the results of a Splunk saved search for monitoring plugins.
//!
//! The check plugin maps the count onto OK/WARNING/CRITICAL thresholds; the
//! metric plugin prints it as a Graphite line. Both share
//! [`result_count`]: dispatch, wait, read the preview, count.

pub mod api;
pub mod config;
pub mod counter;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metric;
pub mod models;
pub mod plugin;
pub mod service;
pub mod status;
pub mod threshold;

pub use error::{Error, Result};

use config::SearchRequest;
use counter::ResultCount;
use executor::{SearchExecutor, Sleeper};
use service::SearchService;

/// One full search cycle against `service`.
pub async fn result_count<S, Z>(service: &S, request: &SearchRequest, sleeper: Z) -> Result<ResultCount>
where
    S: SearchService,
    Z: Sleeper,
{
    let job = SearchExecutor::new(service, sleeper)
        .dispatch_and_wait(request)
        .await?;
    let preview = service.preview(job).await?;
    counter::count(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::service::fake::FakeService;
    use serde_json::json;
    use std::time::Duration;

    struct NoSleep;

    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn request() -> SearchRequest {
        SearchRequest {
            host: "splunk".into(),
            port: 8089,
            credentials: Credentials {
                username: "admin".into(),
                password: "changeme".into(),
            },
            job_name: "Errors".into(),
            timeout_seconds: 5,
            verify_ssl: false,
        }
    }

    #[tokio::test]
    async fn test_result_count_end_to_end() {
        let records = vec![Ok(json!({"a": 1})), Ok(json!({"a": 2})), Ok(json!({"a": 3}))];
        let service = FakeService::new("Errors", Some(3), records);
        let count = result_count(&service, &request(), NoSleep).await.unwrap();
        assert_eq!(count, ResultCount(3));
        assert_eq!(service.dispatched.get(), 1);
    }

    #[tokio::test]
    async fn test_timeout_skips_preview() {
        let service = FakeService::new("Errors", None, vec![Ok(json!({}))]);
        let err = result_count(&service, &request(), NoSleep).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { seconds: 5 }));
        assert!(service.records.borrow().is_some());
    }
}
