use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Dependency type that sets an epic field instead of creating an issue link.
pub const EPIC_DEPENDENCY: &str = "Epic";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketMetadata {
    pub issuetype: String,
    pub project: String,
    pub key: String,
    pub summary: String,
    #[serde(rename = "epicLabelField", skip_serializing_if = "Option::is_none")]
    pub epic_label_field: Option<String>,
    #[serde(rename = "epicLabel", skip_serializing_if = "Option::is_none")]
    pub epic_label: Option<String>,
    #[serde(rename = "timeTracking", skip_serializing_if = "Option::is_none")]
    pub time_tracking: Option<TimeTracking>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl TicketMetadata {
    /// Names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("issuetype", &self.issuetype),
            ("project", &self.project),
            ("key", &self.key),
            ("summary", &self.summary),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn epic_label_field(&self) -> Option<&str> {
        self.epic_label_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
    }

    /// Time tracking is only sent when a remaining estimate is given.
    pub fn time_tracking(&self) -> Option<&TimeTracking> {
        self.time_tracking
            .as_ref()
            .filter(|tracking| !tracking.remaining_estimate.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeTracking {
    #[serde(rename = "originalEstimate")]
    pub original_estimate: String,
    #[serde(rename = "remainingEstimate")]
    pub remaining_estimate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    #[serde(rename = "type")]
    pub kind: String,
    pub ticket: String,
    #[serde(rename = "epicLinkField", skip_serializing_if = "String::is_empty")]
    pub epic_link_field: String,
}

impl Dependency {
    pub fn is_epic(&self) -> bool {
        self.kind == EPIC_DEPENDENCY
    }
}

/// Issue as returned by the tracker after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueHandle {
    pub key: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedTicket {
    pub source: PathBuf,
    pub metadata: TicketMetadata,
    pub markdown: String,
    pub markup: String,
    pub issue: Option<IssueHandle>,
}

impl ParsedTicket {
    pub fn key(&self) -> &str {
        &self.metadata.key
    }
}
