use domain::SubmissionPayload;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ForwardError;

pub const DEFAULT_SUBMISSION_ENDPOINT: &str = "https://api.moontimers.com/api/mt_submit";

/// What the submission endpoint answered with a 200.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardReceipt {
    /// Parsed JSON body; `Null` when the body was empty or not JSON.
    pub body: Value,
    /// Running post count for the author, if the service reported one.
    pub count: Option<u64>,
}

pub struct SubmissionForwarder {
    http: reqwest::Client,
    endpoint: String,
}

impl SubmissionForwarder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ForwardError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Single POST, no retry. Anything but a 200 is a failure.
    pub async fn forward(&self, payload: &SubmissionPayload) -> Result<ForwardReceipt, ForwardError> {
        let resp = self.http.post(&self.endpoint).json(payload).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status != StatusCode::OK {
            return Err(ForwardError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        let count = body.get("count").and_then(count_value);
        debug!(post = payload.id(), ?count, "Submission accepted");
        Ok(ForwardReceipt { body, count })
    }
}

fn count_value(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
