use super::{FailureReport, IssueTracker, TicketId, TrackerError};
use crate::config::IssueTrackerConfig;
use crate::transport::join_url;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Files failures as Jira issues through the REST v2 API.
pub struct JiraTracker {
    client: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
    project_key: String,
    issue_type: String,
}

impl JiraTracker {
    pub fn from_config(
        config: &IssueTrackerConfig,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
            project_key: config.project_key.clone(),
            issue_type: config.issue_type.clone(),
        })
    }

    fn issue_payload(&self, report: &FailureReport) -> Value {
        json!({
            "fields": {
                "project": { "key": self.project_key },
                "summary": report.summary(),
                "description": report.description(),
                "issuetype": { "name": self.issue_type },
            }
        })
    }

    async fn create_issue(&self, report: &FailureReport) -> Result<TicketId, TrackerError> {
        let url = join_url(&self.base_url, "/rest/api/2/issue");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .json(&self.issue_payload(report))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TrackerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: Value = serde_json::from_str(&body)
            .map_err(|e| TrackerError::Response(format!("{}: {}", e, body)))?;
        created
            .get("key")
            .and_then(Value::as_str)
            .map(|key| TicketId(key.to_string()))
            .ok_or_else(|| TrackerError::Response(format!("no issue key in {}", body)))
    }

    async fn attach(&self, ticket: &TicketId, report: &FailureReport) -> Result<(), TrackerError> {
        let Some(path) = &report.screenshot else {
            return Ok(());
        };
        let bytes = tokio::fs::read(path).await.map_err(|source| TrackerError::Io {
            path: path.clone(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "screenshot.png".into());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")?;

        let url = join_url(
            &self.base_url,
            &format!("/rest/api/2/issue/{}/attachments", ticket),
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("X-Atlassian-Token", "no-check")
            .multipart(Form::new().part("file", part))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Rejected {
                status: status.as_u16(),
                body: response.text().await?,
            });
        }
        debug!("Attached {} to {}", path.display(), ticket);
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn file_failure(&self, report: &FailureReport) -> Result<TicketId, TrackerError> {
        let ticket = self.create_issue(report).await?;
        // The issue exists either way; a failed upload only loses the image.
        if let Err(e) = self.attach(&ticket, report).await {
            warn!("Could not attach screenshot to {}: {}", ticket, e);
        }
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_payload_fields() {
        let config = IssueTrackerConfig {
            enabled: true,
            base_url: "https://example.atlassian.net".into(),
            project_key: "QA".into(),
            ..Default::default()
        };
        let tracker = JiraTracker::from_config(&config, Duration::from_secs(5)).unwrap();
        let report = FailureReport {
            test_name: "smoke login".into(),
            error: "boom".into(),
            ..Default::default()
        };
        let payload = tracker.issue_payload(&report);
        assert_eq!(payload["fields"]["project"]["key"], "QA");
        assert_eq!(payload["fields"]["issuetype"]["name"], "Bug");
        assert_eq!(payload["fields"]["summary"], "[Automated] smoke login failed");
    }
}
