//! In-memory issue tracker that records every call, for workflow tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::issue::IssueRequest;
use crate::domain::ticket::IssueHandle;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerCall {
    VerifyUser(String),
    CreateIssue(IssueRequest),
    UploadAttachment {
        issue_key: String,
        file_name: String,
        contents: Vec<u8>,
    },
    UpdateFields {
        issue_key: String,
        fields: Map<String, Value>,
    },
    CreateLink {
        link_type: String,
        inward_key: String,
        outward_key: String,
    },
}

#[derive(Default)]
pub struct RecordingTracker {
    calls: Mutex<Vec<TrackerCall>>,
    rejected_summaries: HashSet<String>,
    rejected_link_types: HashSet<String>,
    reject_uploads: bool,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_summary(mut self, summary: &str) -> Self {
        self.rejected_summaries.insert(summary.to_string());
        self
    }

    pub fn rejecting_link_type(mut self, link_type: &str) -> Self {
        self.rejected_link_types.insert(link_type.to_string());
        self
    }

    pub fn rejecting_uploads(mut self) -> Self {
        self.reject_uploads = true;
        self
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn created(&self) -> Vec<IssueRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::CreateIssue(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<TrackerCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, TrackerCall::VerifyUser(_)))
            .collect()
    }

    fn record(&self, call: TrackerCall) -> usize {
        let mut calls = self.calls.lock().unwrap_or_else(|err| err.into_inner());
        calls.push(call);
        calls
            .iter()
            .filter(|call| matches!(call, TrackerCall::CreateIssue(_)))
            .count()
    }
}

#[async_trait]
impl IssueTrackerService for RecordingTracker {
    async fn verify_user(&self, username: &str) -> AppResult<()> {
        self.record(TrackerCall::VerifyUser(username.to_string()));
        Ok(())
    }

    async fn create_issue(&self, request: &IssueRequest) -> AppResult<IssueHandle> {
        let created = self.record(TrackerCall::CreateIssue(request.clone()));
        if self.rejected_summaries.contains(&request.summary) {
            return Err(AppError::IssueTracker(format!(
                "Jira responded with 400 Bad Request: rejected '{}'",
                request.summary
            )));
        }
        let key = format!("{}-{}", request.project, created);
        Ok(IssueHandle {
            url: Some(format!("https://jira.test/browse/{key}")),
            key,
        })
    }

    async fn upload_attachment(
        &self,
        issue_key: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<()> {
        self.record(TrackerCall::UploadAttachment {
            issue_key: issue_key.to_string(),
            file_name: file_name.to_string(),
            contents,
        });
        if self.reject_uploads {
            return Err(AppError::IssueTracker("attachment rejected".to_string()));
        }
        Ok(())
    }

    async fn update_fields(&self, issue_key: &str, fields: Map<String, Value>) -> AppResult<()> {
        self.record(TrackerCall::UpdateFields {
            issue_key: issue_key.to_string(),
            fields,
        });
        Ok(())
    }

    async fn create_link(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
    ) -> AppResult<()> {
        self.record(TrackerCall::CreateLink {
            link_type: link_type.to_string(),
            inward_key: inward_key.to_string(),
            outward_key: outward_key.to_string(),
        });
        if self.rejected_link_types.contains(link_type) {
            return Err(AppError::IssueTracker(format!(
                "link type '{link_type}' not found"
            )));
        }
        Ok(())
    }
}
