use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::domain::ticket::{Dependency, ParsedTicket};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;
use crate::workflow::batch::BatchResult;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub created: usize,
    pub failed: usize,
}

/// Turns declared dependencies into epic assignments or issue links.
///
/// Dependencies pointing at keys outside the batch are skipped without a
/// request. A failed request is logged and does not stop the remaining links.
pub async fn link_tickets(tracker: &dyn IssueTrackerService, batch: &BatchResult) -> LinkReport {
    let mut report = LinkReport::default();

    for ticket in batch.tickets() {
        let Some(source) = ticket.issue.as_ref() else {
            continue;
        };

        for dependency in &ticket.metadata.dependencies {
            let Some(target) = batch.get(&dependency.ticket).and_then(|t| t.issue.as_ref())
            else {
                debug!(
                    key = ticket.key(),
                    target = %dependency.ticket,
                    "dependency outside batch"
                );
                continue;
            };

            match link_one(tracker, dependency, &source.key, &target.key).await {
                Ok(()) => {
                    info!(
                        key = ticket.key(),
                        target = %dependency.ticket,
                        link_type = %dependency.kind,
                        "linked {} to {}",
                        source.key,
                        target.key
                    );
                    report.created += 1;
                }
                Err(err) => {
                    log_failure(ticket, dependency, &err.to_string());
                    report.failed += 1;
                }
            }
        }
    }

    report
}

async fn link_one(
    tracker: &dyn IssueTrackerService,
    dependency: &Dependency,
    source_key: &str,
    target_key: &str,
) -> AppResult<()> {
    if dependency.is_epic() {
        let field = dependency.epic_link_field.trim();
        if field.is_empty() {
            return Err(AppError::Configuration(
                "epic dependency has no epicLinkField".to_string(),
            ));
        }
        let mut fields = Map::new();
        fields.insert(field.to_string(), Value::String(target_key.to_string()));
        tracker.update_fields(source_key, fields).await
    } else {
        tracker
            .create_link(&dependency.kind, source_key, target_key)
            .await
    }
}

fn log_failure(ticket: &ParsedTicket, dependency: &Dependency, message: &str) {
    if dependency.is_epic() {
        error!(
            "error linking {} to epic {}: {message}",
            ticket.key(),
            dependency.ticket
        );
    } else {
        error!(
            "error linking {} to {} ({}): {message}",
            ticket.key(),
            dependency.ticket,
            dependency.kind
        );
    }
}
