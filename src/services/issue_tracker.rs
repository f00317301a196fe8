use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::issue::IssueRequest;
use crate::domain::ticket::IssueHandle;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Looks up a user; callers only log the outcome.
    async fn verify_user(&self, username: &str) -> AppResult<()>;
    async fn create_issue(&self, request: &IssueRequest) -> AppResult<IssueHandle>;
    async fn upload_attachment(
        &self,
        issue_key: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<()>;
    async fn update_fields(&self, issue_key: &str, fields: Map<String, Value>) -> AppResult<()>;
    async fn create_link(
        &self,
        link_type: &str,
        inward_key: &str,
        outward_key: &str,
    ) -> AppResult<()>;
}
