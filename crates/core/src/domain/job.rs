use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::quote::{QuotePriceResult, QuoteRequest};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkJobRequest {
    pub quotes: Vec<QuoteRequest>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJob {
    pub job_id: JobId,
    pub status: JobStatus,
    pub request: BulkJobRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<QuotePriceResult>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BulkJob {
    pub fn pending(quotes: Vec<QuoteRequest>) -> Self {
        let now = Utc::now();
        Self {
            job_id: JobId::generate(),
            status: JobStatus::Pending,
            request: BulkJobRequest { quotes },
            results: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn quotes(&self) -> &[QuoteRequest] {
        &self.request.quotes
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self.status, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Moves the job along its lifecycle. Results are kept only on completion
    /// and must line up one-to-one with the submitted quotes.
    pub fn transition_to(
        &mut self,
        next: JobStatus,
        results: Option<Vec<QuotePriceResult>>,
    ) -> Result<(), DomainError> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidJobTransition { from: self.status, to: next });
        }

        match next {
            JobStatus::Completed => {
                let results = results.unwrap_or_default();
                if results.len() != self.request.quotes.len() {
                    return Err(DomainError::InvariantViolation(format!(
                        "job {} completed with {} results for {} quotes",
                        self.job_id,
                        results.len(),
                        self.request.quotes.len()
                    )));
                }
                self.results = Some(results);
            }
            JobStatus::Failed => self.results = None,
            JobStatus::Pending | JobStatus::Processing => {}
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
