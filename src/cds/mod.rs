//! Client for the Copernicus Climate Data Store `retrieve/v1` API.
//!
//! Jobs are submitted asynchronously: the remote replies with a job id whose
//! state is polled until it reaches a terminal state, at which point the
//! result asset can be streamed to disk.

pub mod config;
pub mod ledger;
pub mod request;

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use thiserror::Error;

pub use config::CdsConfig;
pub use ledger::{Entry, Ledger, Status};
pub use request::Request;

/// Poll interval for single-shot retrievals.
const RETRIEVE_POLL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CdsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("status csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("request for `{dataset}` was rejected: {status}")]
    Rejected {
        dataset: String,
        status: reqwest::StatusCode,
    },
    #[error("job {0} finished without a downloadable result")]
    MissingResult(String),
    #[error("job {0} failed on the remote side")]
    JobFailed(String),
    #[error("no CDS API key found: pass --key, set CDSAPI_KEY, or create ~/.cdsapirc")]
    MissingKey,
}

/// Job state mirrored from the remote reply's state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Accepted,
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Maps a reply state string. The remote reports `successful` for a
    /// finished job; older deployments say `completed`.
    pub fn from_reply(state: &str) -> Option<Self> {
        match state {
            "accepted" => Some(JobState::Accepted),
            "queued" => Some(JobState::Queued),
            "running" => Some(JobState::Running),
            "successful" | "completed" => Some(JobState::Completed),
            "failed" => Some(JobState::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Accepted => "accepted",
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A submitted retrieval job.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub state: JobState,
}

#[derive(Deserialize)]
struct JobReply {
    #[serde(alias = "jobID", alias = "request_id")]
    job_id: String,
    #[serde(alias = "status", alias = "state")]
    status: String,
}

#[derive(Deserialize)]
struct ResultsReply {
    asset: Option<AssetReply>,
}

#[derive(Deserialize)]
struct AssetReply {
    value: AssetValue,
}

#[derive(Deserialize)]
struct AssetValue {
    href: String,
}

pub struct CdsClient {
    base_url: String,
    key: String,
    http: reqwest::Client,
}

impl CdsClient {
    pub fn new(config: CdsConfig) -> Self {
        CdsClient {
            base_url: config.url,
            key: config.key,
            http: reqwest::Client::new(),
        }
    }

    /// Submits a retrieval request and returns the remote job handle.
    pub async fn submit(&self, dataset: &str, request: &Request) -> Result<Job, CdsError> {
        let url = format!(
            "{}/retrieve/v1/processes/{}/execution",
            self.base_url, dataset
        );
        let body = serde_json::json!({ "inputs": request });

        let response = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CdsError::Rejected {
                dataset: dataset.to_string(),
                status: response.status(),
            });
        }

        let reply: JobReply = response.json().await?;
        Ok(Job {
            state: reply_state(&reply),
            id: reply.job_id,
        })
    }

    /// Polls the remote state of a job.
    pub async fn status(&self, job_id: &str) -> Result<JobState, CdsError> {
        let url = format!("{}/retrieve/v1/jobs/{}", self.base_url, job_id);
        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .send()
            .await?
            .error_for_status()?;

        let reply: JobReply = response.json().await?;
        Ok(reply_state(&reply))
    }

    /// Streams a completed job's result asset to `dest`.
    pub async fn download_result(&self, job_id: &str, dest: &Path) -> Result<(), CdsError> {
        let url = format!("{}/retrieve/v1/jobs/{}/results", self.base_url, job_id);
        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .send()
            .await?
            .error_for_status()?;

        let reply: ResultsReply = response.json().await?;
        let href = reply
            .asset
            .ok_or_else(|| CdsError::MissingResult(job_id.to_string()))?
            .value
            .href;

        // Result assets live on object storage and need no token.
        let asset = self.http.get(&href).send().await?.error_for_status()?;
        let mut file = File::create(dest)?;
        let mut stream = asset.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?)?;
        }

        Ok(())
    }

    /// Submits a request and blocks until the result has been downloaded.
    pub async fn retrieve(
        &self,
        dataset: &str,
        request: &Request,
        dest: &Path,
    ) -> Result<(), CdsError> {
        let job = self.submit(dataset, request).await?;

        let mut state = job.state;
        while !state.is_terminal() {
            tokio::time::sleep(RETRIEVE_POLL).await;
            state = self.status(&job.id).await?;
        }

        match state {
            JobState::Completed => self.download_result(&job.id, dest).await,
            _ => Err(CdsError::JobFailed(job.id)),
        }
    }
}

// An unrecognised state means the job is still in the remote queue in some
// form we do not know about; keep waiting rather than bail.
fn reply_state(reply: &JobReply) -> JobState {
    JobState::from_reply(&reply.status).unwrap_or_else(|| {
        eprintln!("Unrecognised job state `{}`, treating as queued", reply.status);
        JobState::Queued
    })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_map_reply_states() {
        assert_eq!(JobState::from_reply("accepted"), Some(JobState::Accepted));
        assert_eq!(JobState::from_reply("queued"), Some(JobState::Queued));
        assert_eq!(JobState::from_reply("running"), Some(JobState::Running));
        assert_eq!(JobState::from_reply("failed"), Some(JobState::Failed));
        assert_eq!(JobState::from_reply("bogus"), None);
    }

    #[test]
    fn should_normalise_successful_to_completed() {
        assert_eq!(
            JobState::from_reply("successful"),
            Some(JobState::Completed)
        );
        assert_eq!(JobState::from_reply("completed"), Some(JobState::Completed));
    }

    #[test]
    fn should_flag_terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }

    #[test]
    fn should_deserialise_both_reply_spellings() {
        let new_style: JobReply =
            serde_json::from_str(r#"{"jobID": "abc", "status": "accepted"}"#).unwrap();
        assert_eq!(new_style.job_id, "abc");
        assert_eq!(reply_state(&new_style), JobState::Accepted);

        let legacy: JobReply =
            serde_json::from_str(r#"{"request_id": "def", "state": "completed"}"#).unwrap();
        assert_eq!(legacy.job_id, "def");
        assert_eq!(reply_state(&legacy), JobState::Completed);
    }
}
