use serde_json::{Map, Value};

use crate::domain::ticket::{ParsedTicket, TimeTracking};

/// Everything the tracker needs to create one issue.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRequest {
    pub project: String,
    pub issue_type: String,
    pub summary: String,
    pub description: String,
    pub assignee: String,
    pub reporter: String,
    pub labels: Vec<String>,
    pub time_tracking: Option<TimeTracking>,
    pub custom_fields: Map<String, Value>,
}

impl IssueRequest {
    pub fn from_ticket(ticket: &ParsedTicket, reporter: &str, assignee: &str) -> Self {
        let metadata = &ticket.metadata;

        let mut custom_fields = Map::new();
        if let Some(field) = metadata.epic_label_field() {
            let label = metadata.epic_label.clone().unwrap_or_default();
            custom_fields.insert(field.to_string(), Value::String(label));
        }

        Self {
            project: metadata.project.clone(),
            issue_type: metadata.issuetype.clone(),
            summary: metadata.summary.clone(),
            description: ticket.markup.clone(),
            assignee: assignee.to_string(),
            reporter: reporter.to_string(),
            labels: metadata.labels.iter().cloned().collect(),
            time_tracking: metadata.time_tracking().cloned(),
            custom_fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::ticket::TicketMetadata;

    fn ticket(metadata: TicketMetadata) -> ParsedTicket {
        ParsedTicket {
            source: PathBuf::from("a.md"),
            metadata,
            markdown: "**hi**".to_string(),
            markup: "*hi*".to_string(),
            issue: None,
        }
    }

    #[test]
    fn builds_plain_request() {
        let metadata = TicketMetadata {
            issuetype: "Task".to_string(),
            project: "PRJ".to_string(),
            key: "a".to_string(),
            summary: "Do it".to_string(),
            labels: ["b".to_string(), "a".to_string()].into_iter().collect(),
            ..TicketMetadata::default()
        };

        let request = IssueRequest::from_ticket(&ticket(metadata), "alice", "bob");

        assert_eq!(request.project, "PRJ");
        assert_eq!(request.issue_type, "Task");
        assert_eq!(request.summary, "Do it");
        assert_eq!(request.description, "*hi*");
        assert_eq!(request.reporter, "alice");
        assert_eq!(request.assignee, "bob");
        assert_eq!(request.labels, vec!["a", "b"]);
        assert!(request.time_tracking.is_none());
        assert!(request.custom_fields.is_empty());
    }

    #[test]
    fn carries_epic_label_and_time_tracking() {
        let metadata = TicketMetadata {
            issuetype: "Epic".to_string(),
            project: "PRJ".to_string(),
            key: "epic".to_string(),
            summary: "Auth".to_string(),
            epic_label_field: Some("customfield_10011".to_string()),
            epic_label: Some("Auth".to_string()),
            time_tracking: Some(TimeTracking {
                original_estimate: "5d".to_string(),
                remaining_estimate: "4d".to_string(),
            }),
            ..TicketMetadata::default()
        };

        let request = IssueRequest::from_ticket(&ticket(metadata), "alice", "bob");

        assert_eq!(
            request.custom_fields.get("customfield_10011"),
            Some(&Value::String("Auth".to_string()))
        );
        assert_eq!(
            request.time_tracking.map(|t| t.remaining_estimate),
            Some("4d".to_string())
        );
    }
}
