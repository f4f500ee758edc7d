//! Simulated jobs for the demo
//!
//! A job is a name, a latency and an optional failure reason. On the command
//! line it is written `name:millis[:reason]`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Errors parsing a `--task` value
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobSpecError {
    /// Missing the `:millis` part
    #[error("expected name:millis[:reason], got {0:?}")]
    MissingLatency(String),

    /// Name is empty
    #[error("task name must not be empty")]
    EmptyName,

    /// Latency is not a number of milliseconds
    #[error("invalid latency {value:?}: {source}")]
    InvalidLatency {
        /// The rejected text
        value: String,
        /// Why it was rejected
        source: std::num::ParseIntError,
    },
}

/// A simulated unit of work
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub latency: Duration,
    pub failure: Option<String>,
}

impl JobSpec {
    fn new(name: &str, millis: u64, failure: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            latency: Duration::from_millis(millis),
            failure: failure.map(str::to_string),
        }
    }

    /// The three jobs shown when no `--task` is given
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Query database", 4_000, None),
            Self::new("Download S3 file", 2_200, Some("Network error")),
            Self::new("Start EC2 instance", 400, None),
        ]
    }

    /// Wait out the latency, then succeed or fail
    pub async fn run(self) -> Result<(), String> {
        tokio::time::sleep(self.latency).await;
        match self.failure {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

impl FromStr for JobSpec {
    type Err = JobSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The reason may itself contain ':'
        let mut parts = s.splitn(3, ':');
        let name = parts.next().unwrap_or_default().trim();
        let millis = parts
            .next()
            .ok_or_else(|| JobSpecError::MissingLatency(s.to_string()))?
            .trim();
        let failure = parts.next().map(str::trim).filter(|r| !r.is_empty());

        if name.is_empty() {
            return Err(JobSpecError::EmptyName);
        }

        let millis = millis
            .parse::<u64>()
            .map_err(|source| JobSpecError::InvalidLatency {
                value: millis.to_string(),
                source,
            })?;

        Ok(Self::new(name, millis, failure))
    }
}
