use std::path::Path;

use tracing::{error, info};

use crate::domain::issue::IssueRequest;
use crate::domain::ticket::{IssueHandle, ParsedTicket};
use crate::error::AppResult;
use crate::services::IssueTrackerService;

pub struct Submission {
    pub issue: IssueHandle,
    pub failed_attachments: usize,
}

/// Creates the issue for `ticket`, then uploads its attachments.
///
/// Only the create call can fail the submission. Attachments that cannot be
/// read or uploaded are logged and counted, the issue stays created.
pub async fn submit_ticket(
    tracker: &dyn IssueTrackerService,
    ticket: &ParsedTicket,
    reporter: &str,
    assignee: &str,
    base_dir: &Path,
) -> AppResult<Submission> {
    let request = IssueRequest::from_ticket(ticket, reporter, assignee);
    let issue = tracker.create_issue(&request).await?;
    info!(
        key = ticket.key(),
        issue = %issue.key,
        url = issue.url.as_deref().unwrap_or_default(),
        "created issue"
    );

    let mut failed_attachments = 0;
    for attachment in &ticket.metadata.attachments {
        if let Err(err) = upload(tracker, &issue, base_dir, attachment).await {
            error!(issue = %issue.key, attachment = %attachment, "attachment failed: {err}");
            failed_attachments += 1;
        }
    }

    Ok(Submission {
        issue,
        failed_attachments,
    })
}

async fn upload(
    tracker: &dyn IssueTrackerService,
    issue: &IssueHandle,
    base_dir: &Path,
    attachment: &str,
) -> AppResult<()> {
    let path = base_dir.join(attachment);
    let contents = tokio::fs::read(&path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| attachment.to_string());
    tracker
        .upload_attachment(&issue.key, &file_name, contents)
        .await
}
