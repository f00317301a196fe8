use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::AuthMode;
use crate::domain::issue::IssueRequest;
use crate::domain::ticket::{IssueHandle, TimeTracking};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const ATLASSIAN_TOKEN: &str = "X-Atlassian-Token";

#[derive(Debug, Clone)]
pub enum JiraAuth {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl JiraAuth {
    pub fn new(mode: AuthMode, username: &str, secret: &str) -> Self {
        match mode {
            AuthMode::Basic => JiraAuth::Basic {
                username: username.to_string(),
                password: secret.to_string(),
            },
            AuthMode::Token => JiraAuth::Bearer {
                token: secret.to_string(),
            },
        }
    }

    fn header(&self) -> String {
        match self {
            JiraAuth::Basic { username, password } => {
                let credentials = format!("{username}:{password}");
                let encoded = BASE64_STANDARD.encode(credentials);
                format!("Basic {encoded}")
            }
            JiraAuth::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

pub struct JiraClient {
    http: Client,
    base_url: String,
    auth: JiraAuth,
}

impl JiraClient {
    pub fn new(base_url: &str, auth: JiraAuth) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, self.auth.header())
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> AppResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to {action}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "failed to {action}: Jira responded with {status}: {body}"
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn verify_user(&self, username: &str) -> AppResult<()> {
        let request = self
            .http
            .get(self.endpoint("user"))
            .query(&[("username", username)]);
        self.send(request, "look up user").await?;
        Ok(())
    }

    async fn create_issue(&self, request: &IssueRequest) -> AppResult<IssueHandle> {
        let body = JiraCreateIssueRequest::from_request(request);
        let response = self
            .send(
                self.http.post(self.endpoint("issue")).json(&body),
                "create issue",
            )
            .await?;

        let payload: JiraCreateIssueResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
        })?;

        let url = Some(self.browse_url(&payload.key));
        Ok(IssueHandle {
            key: payload.key,
            url,
        })
    }

    async fn upload_attachment(
        &self,
        issue_key: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<()> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let request = self
            .http
            .post(self.endpoint(&format!("issue/{issue_key}/attachments")))
            .header(ATLASSIAN_TOKEN, "no-check")
            .multipart(form);
        self.send(request, "upload attachment").await?;
        Ok(())
    }

    async fn update_fields(&self, issue_key: &str, fields: Map<String, Value>) -> AppResult<()> {
        let body = JiraUpdateIssueRequest { fields };
        let request = self
            .http
            .put(self.endpoint(&format!("issue/{issue_key}")))
            .json(&body);
        self.send(request, "update issue").await?;
        Ok(())
    }

    async fn create_link(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
    ) -> AppResult<()> {
        let body = JiraIssueLinkRequest {
            link_type: JiraNamed::new(link_type),
            inward_issue: JiraIssueRef::new(inward_key),
            outward_issue: JiraIssueRef::new(outward_key),
        };
        let request = self.http.post(self.endpoint("issueLink")).json(&body);
        self.send(request, "link issues").await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JiraCreateIssueRequest {
    fields: JiraCreateIssueFields,
}

impl JiraCreateIssueRequest {
    fn from_request(request: &IssueRequest) -> Self {
        Self {
            fields: JiraCreateIssueFields {
                project: JiraProject {
                    key: request.project.clone(),
                },
                summary: request.summary.clone(),
                description: request.description.clone(),
                issuetype: JiraNamed::new(&request.issue_type),
                assignee: JiraNamed::new(&request.assignee),
                reporter: JiraNamed::new(&request.reporter),
                labels: request.labels.clone(),
                timetracking: request.time_tracking.as_ref().map(JiraTimeTracking::from),
                custom: request.custom_fields.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateIssueFields {
    project: JiraProject,
    summary: String,
    description: String,
    issuetype: JiraNamed,
    assignee: JiraNamed,
    reporter: JiraNamed,
    labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timetracking: Option<JiraTimeTracking>,
    #[serde(flatten)]
    custom: Map<String, Value>,
}

#[derive(Serialize)]
struct JiraProject {
    key: String,
}

#[derive(Serialize)]
struct JiraNamed {
    name: String,
}

impl JiraNamed {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraTimeTracking {
    #[serde(skip_serializing_if = "String::is_empty")]
    original_estimate: String,
    remaining_estimate: String,
}

impl From<&TimeTracking> for JiraTimeTracking {
    fn from(tracking: &TimeTracking) -> Self {
        Self {
            original_estimate: tracking.original_estimate.clone(),
            remaining_estimate: tracking.remaining_estimate.clone(),
        }
    }
}

#[derive(Serialize)]
struct JiraUpdateIssueRequest {
    fields: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JiraIssueLinkRequest {
    #[serde(rename = "type")]
    link_type: JiraNamed,
    inward_issue: JiraIssueRef,
    outward_issue: JiraIssueRef,
}

#[derive(Serialize)]
struct JiraIssueRef {
    key: String,
}

impl JiraIssueRef {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}
