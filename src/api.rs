use log::{debug, error, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use crate::config::SearchRequest;
use crate::error::{Error, Result};
use crate::models::splunk::{
    AuthResponse, Entry, EntryList, JobStatus, PreviewResults, ResultRecord, SavedSearch,
    SearchJob,
};
use crate::service::SearchService;

/// Upper bound on any single REST call; the readiness loop has its own timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SplunkClient {
    base_url: String,
    session_key: String,
    client: Client,
}

impl SplunkClient {
    /// Log in with username/password and keep the session key for later calls.
    pub async fn connect(request: &SearchRequest) -> Result<Self> {
        let base_url = request.base_url()?.as_str().trim_end_matches('/').to_string();
        Self::connect_to(base_url, request).await
    }

    /// Same as [`SplunkClient::connect`] but against an explicit base URL.
    pub async fn connect_to(base_url: String, request: &SearchRequest) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!request.verify_ssl)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        let url = format!("{}/services/auth/login", base_url);
        let params = [
            ("username", request.credentials.username.as_str()),
            ("password", request.credentials.password.as_str()),
            ("output_mode", "json"),
        ];

        let response = client.post(&url).form(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Connection(format!(
                "authentication failed for user '{}'",
                request.credentials.username
            )));
        }
        if !status.is_success() {
            error!("Splunk login error {}: {}", status, text);
            return Err(Error::Connection(format!("API Error {}: {}", status, text)));
        }

        let auth: AuthResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Connection(format!("unexpected login response: {}", e)))?;
        info!("Logged in to {} as {}", base_url, request.credentials.username);

        Ok(Self {
            base_url,
            session_key: auth.session_key,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Splunk {}", self.session_key))
    }

    async fn read(response: Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }

    /// Saved search by exact name, across every app and owner visible to the user.
    pub async fn fetch_saved_search(&self, name: &str) -> Result<Entry<SavedSearch>> {
        let url = format!(
            "{}/servicesNS/-/-/saved/searches/{}",
            self.base_url,
            urlencoding::encode(name)
        );

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("output_mode", "json")])
            .send()
            .await?;
        let (status, text) = Self::read(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(name.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Connection(format!("API Error {}: {}", status, text)));
        }

        let list: EntryList<SavedSearch> = serde_json::from_str(&text)
            .map_err(|e| Error::Connection(format!("unexpected saved search response: {}", e)))?;

        list.entry
            .into_iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub async fn dispatch_saved_search(&self, saved: &Entry<SavedSearch>) -> Result<SearchJob> {
        let path = saved.links.dispatch.clone().unwrap_or_else(|| {
            format!(
                "/servicesNS/-/-/saved/searches/{}/dispatch",
                urlencoding::encode(&saved.name)
            )
        });
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .authorized(self.client.post(&url))
            .form(&[("output_mode", "json")])
            .send()
            .await?;
        let (status, text) = Self::read(response).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(saved.name.clone()));
        }
        if !status.is_success() {
            error!("Splunk dispatch error {}: {}", status, text);
            return Err(Error::Connection(format!("API Error {}: {}", status, text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| Error::Connection(format!("unexpected dispatch response: {}", e)))
    }

    /// `None` while Splunk answers 204, i.e. the job entity is not loadable yet.
    pub async fn get_job_status(&self, sid: &str) -> Result<Option<JobStatus>> {
        let url = format!("{}/services/search/jobs/{}", self.base_url, sid);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("output_mode", "json")])
            .send()
            .await?;
        let (status, text) = Self::read(response).await?;

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Connection(format!("API Error {}: {}", status, text)));
        }

        let list: EntryList<JobStatus> = serde_json::from_str(&text)
            .map_err(|e| Error::Connection(format!("Failed to parse job status response: {}", e)))?;

        match list.entry.into_iter().next() {
            Some(entry) => Ok(Some(entry.content)),
            None => Err(Error::Connection(format!(
                "Failed to parse job status response: {}",
                text
            ))),
        }
    }

    /// Preview results are served while the job is still running.
    pub async fn get_results_preview(&self, sid: &str) -> Result<PreviewResults> {
        let url = format!("{}/services/search/jobs/{}/results_preview", self.base_url, sid);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("output_mode", "json"), ("count", "0")])
            .send()
            .await?;
        let (status, text) = Self::read(response).await?;

        if !status.is_success() {
            return Err(Error::Stream(format!("API Error {}: {}", status, text)));
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(PreviewResults {
                preview: true,
                results: Vec::new(),
            });
        }

        serde_json::from_str(&text).map_err(|e| Error::Stream(e.to_string()))
    }
}

/// Records of one results preview, handed out one at a time.
pub struct PreviewStream {
    records: std::vec::IntoIter<ResultRecord>,
}

impl Iterator for PreviewStream {
    type Item = Result<ResultRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(Ok)
    }
}

impl SearchService for SplunkClient {
    type Job = SearchJob;
    type Preview = PreviewStream;

    async fn dispatch(&self, name: &str) -> Result<SearchJob> {
        let saved = self.fetch_saved_search(name).await?;
        if saved.content.disabled {
            warn!("Saved search '{}' is disabled, dispatching anyway", name);
        }
        debug!("Saved search '{}': {}", name, saved.content.search);

        let job = self.dispatch_saved_search(&saved).await?;
        info!("Dispatched '{}' as job {}", name, job.sid);
        Ok(job)
    }

    async fn is_ready(&self, job: &SearchJob) -> Result<bool> {
        match self.get_job_status(&job.sid).await? {
            Some(status) => {
                debug!(
                    "Job {} state {} (done: {}, progress: {:?})",
                    job.sid, status.dispatch_state, status.is_done, status.done_progress
                );
                if status.is_failed() {
                    return Err(Error::Stream(format!("search job {} failed", job.sid)));
                }
                Ok(status.is_ready())
            }
            None => Ok(false),
        }
    }

    async fn preview(&self, job: SearchJob) -> Result<PreviewStream> {
        let results = self.get_results_preview(&job.sid).await?;
        debug!("Job {} preview (partial: {})", job.sid, results.preview);
        Ok(PreviewStream {
            records: results.results.into_iter(),
        })
    }
}
