//! Capability interface over the remote search service.
//!
//! The executor and counter only ever see this trait, so they run the same
//! against [`crate::api::SplunkClient`] and the in-memory fakes in tests.

use crate::error::Result;
use crate::models::splunk::ResultRecord;

#[allow(async_fn_in_trait)]
pub trait SearchService {
    /// Handle to a running search job.
    type Job;
    /// Lazily consumed record sequence. Not restartable.
    type Preview: IntoIterator<Item = Result<ResultRecord>>;

    /// Look up the saved search `name` and start it.
    async fn dispatch(&self, name: &str) -> Result<Self::Job>;

    /// Non-blocking readiness poll.
    async fn is_ready(&self, job: &Self::Job) -> Result<bool>;

    /// Partial-results-safe stream. The job handle is spent afterwards.
    async fn preview(&self, job: Self::Job) -> Result<Self::Preview>;
}

impl<T: SearchService> SearchService for &T {
    type Job = T::Job;
    type Preview = T::Preview;

    async fn dispatch(&self, name: &str) -> Result<Self::Job> {
        (**self).dispatch(name).await
    }

    async fn is_ready(&self, job: &Self::Job) -> Result<bool> {
        (**self).is_ready(job).await
    }

    async fn preview(&self, job: Self::Job) -> Result<Self::Preview> {
        (**self).preview(job).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};

    use super::SearchService;
    use crate::error::{Error, Result};
    use crate::models::splunk::ResultRecord;

    /// Becomes ready on the `ready_on_check`-th call to `is_ready` (1-based).
    pub struct FakeService {
        pub saved_searches: Vec<String>,
        pub ready_on_check: Option<u64>,
        pub records: RefCell<Option<Vec<Result<ResultRecord>>>>,
        pub checks: Cell<u64>,
        pub dispatched: Cell<u32>,
    }

    impl FakeService {
        pub fn new(name: &str, ready_on_check: Option<u64>, records: Vec<Result<ResultRecord>>) -> Self {
            Self {
                saved_searches: vec![name.to_string()],
                ready_on_check,
                records: RefCell::new(Some(records)),
                checks: Cell::new(0),
                dispatched: Cell::new(0),
            }
        }
    }

    impl SearchService for FakeService {
        type Job = String;
        type Preview = Vec<Result<ResultRecord>>;

        async fn dispatch(&self, name: &str) -> Result<String> {
            if !self.saved_searches.iter().any(|s| s == name) {
                return Err(Error::NotFound(name.to_string()));
            }
            self.dispatched.set(self.dispatched.get() + 1);
            Ok(format!("sid-{}", name))
        }

        async fn is_ready(&self, _job: &String) -> Result<bool> {
            let n = self.checks.get() + 1;
            self.checks.set(n);
            Ok(self.ready_on_check.is_some_and(|k| n >= k))
        }

        async fn preview(&self, _job: String) -> Result<Self::Preview> {
            self.records
                .borrow_mut()
                .take()
                .ok_or_else(|| Error::Stream("preview already consumed".into()))
        }
    }
}
