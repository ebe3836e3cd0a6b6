//! Submission gateway.
//!
//! Turns the finished form into an assessment-creation request and hands it
//! to the remote service. The service computes the feasibility estimate; we
//! only carry the id it returns on to the results view.

mod request;

use async_trait::async_trait;
use url::Url;

use crate::http_client::{HttpClient, HttpError};
use crate::links;
use crate::wizard::WizardError;

pub use request::{AssessmentCreated, AssessmentRequest};

/// Errors from submitting an assessment.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("assessment service unreachable: {0}")]
    Network(String),
    #[error("assessment service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected reply from assessment service: {0}")]
    Decode(String),
}

impl From<HttpError> for SubmissionError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body } => SubmissionError::Rejected { status, body },
            HttpError::Decode(msg) => SubmissionError::Decode(msg),
            other => SubmissionError::Network(other.to_string()),
        }
    }
}

/// The assessment-creation boundary.
#[async_trait]
pub trait AssessmentGateway: Send + Sync {
    async fn create(&self, request: &AssessmentRequest)
        -> Result<AssessmentCreated, SubmissionError>;
}

/// Gateway that POSTs JSON to an assessment endpoint.
#[derive(Debug, Clone)]
pub struct HttpAssessmentGateway {
    client: HttpClient,
    endpoint: Url,
}

impl HttpAssessmentGateway {
    pub fn new(client: HttpClient, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl AssessmentGateway for HttpAssessmentGateway {
    async fn create(
        &self,
        request: &AssessmentRequest,
    ) -> Result<AssessmentCreated, SubmissionError> {
        let created: AssessmentCreated = self
            .client
            .post_json(self.endpoint.clone(), request)
            .await?;
        Ok(created)
    }
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub id: String,
    pub request: AssessmentRequest,
    /// Results deep link, when a results page is configured.
    pub results_url: Option<Url>,
}

impl SubmissionReceipt {
    pub fn new(
        created: AssessmentCreated,
        request: AssessmentRequest,
        results: Option<&Url>,
    ) -> Self {
        let results_url = results.map(|base| links::results_link(base, &created.id));
        Self {
            id: created.id,
            request,
            results_url,
        }
    }
}
