use serde::{Deserialize, Serialize};

/// A single row of search output. Its contents are never inspected.
pub type ResultRecord = serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "sessionKey")]
    pub session_key: String,
}

/// Handle to a dispatched search job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchJob {
    pub sid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
    #[serde(rename = "dispatchState")]
    pub dispatch_state: String,
    #[serde(rename = "resultCount", default)]
    pub result_count: u64,
    #[serde(rename = "runDuration", default)]
    pub run_duration: f64,
    #[serde(rename = "doneProgress", default)]
    pub done_progress: Option<f64>,
}

impl JobStatus {
    /// A job that is still queued or parsing has no preview to read yet.
    pub fn is_ready(&self) -> bool {
        !matches!(self.dispatch_state.as_str(), "QUEUED" | "PARSING")
    }

    pub fn is_failed(&self) -> bool {
        self.dispatch_state == "FAILED"
    }
}

/// Splunk wraps single resources in an Atom-style `entry` list.
#[derive(Debug, Deserialize)]
pub struct EntryList<T> {
    #[serde(default = "Vec::new")]
    pub entry: Vec<Entry<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Entry<T> {
    pub name: String,
    pub content: T,
    #[serde(default)]
    pub links: EntryLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryLinks {
    pub dispatch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SavedSearch {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct PreviewResults {
    #[serde(default)]
    pub preview: bool,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}
