use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::domain::front_matter;
use crate::domain::markup::to_jira_markup;
use crate::domain::ticket::ParsedTicket;
use crate::error::AppResult;
use crate::infra::files::discover_markdown;
use crate::workflow::link::link_tickets;
use crate::workflow::submit::submit_ticket;

/// Created tickets indexed by their correlation key.
#[derive(Debug, Default)]
pub struct BatchResult {
    tickets: BTreeMap<String, ParsedTicket>,
}

impl BatchResult {
    /// Inserts a ticket, returning the one it replaced under the same key.
    pub fn insert(&mut self, ticket: ParsedTicket) -> Option<ParsedTicket> {
        self.tickets.insert(ticket.key().to_string(), ticket)
    }

    pub fn get(&self, key: &str) -> Option<&ParsedTicket> {
        self.tickets.get(key)
    }

    pub fn tickets(&self) -> impl Iterator<Item = &ParsedTicket> {
        self.tickets.values()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub parsed: usize,
    pub parse_failures: usize,
    pub created: usize,
    pub submit_failures: usize,
    pub attachment_failures: usize,
    pub duplicate_keys: usize,
    pub links_created: usize,
    pub link_failures: usize,
}

impl BatchSummary {
    pub fn failures(&self) -> usize {
        self.parse_failures + self.submit_failures + self.attachment_failures + self.link_failures
    }

    pub fn log(&self, dry_run: bool) {
        if dry_run {
            info!(
                "dry run: {} files, {} parsed, {} failed to parse",
                self.files, self.parsed, self.parse_failures
            );
            return;
        }
        info!(
            "{} files: {} issues created, {} links created",
            self.files, self.created, self.links_created
        );
        if self.failures() > 0 || self.duplicate_keys > 0 {
            warn!(
                parse = self.parse_failures,
                submit = self.submit_failures,
                attachments = self.attachment_failures,
                links = self.link_failures,
                duplicate_keys = self.duplicate_keys,
                "batch finished with problems"
            );
        }
    }
}

pub struct BatchOutcome {
    pub result: BatchResult,
    pub summary: BatchSummary,
}

/// Runs discovery, parsing, submission and linking over the configured folder.
///
/// Only discovery errors abort the run. Everything else is logged per file or
/// per link and reflected in the summary. Dry runs stop after parsing.
pub async fn run_batch(ctx: &AppContext) -> AppResult<BatchOutcome> {
    let config = &ctx.config;
    let tracker = ctx.issue_tracker.as_ref();

    let files = discover_markdown(&config.folder)?;
    info!("found {} markdown files in {}", files.len(), config.folder.display());

    let mut summary = BatchSummary {
        files: files.len(),
        ..BatchSummary::default()
    };
    let mut result = BatchResult::default();

    for path in files {
        let mut ticket = match load_ticket(&path).await {
            Ok(ticket) => ticket,
            Err(err) => {
                error!(path = %path.display(), "{err}");
                summary.parse_failures += 1;
                continue;
            }
        };
        summary.parsed += 1;

        if config.dry_run {
            preview(&ticket);
            continue;
        }

        match submit_ticket(
            tracker,
            &ticket,
            &config.username,
            &config.assignee,
            &config.folder,
        )
        .await
        {
            Ok(submission) => {
                summary.created += 1;
                summary.attachment_failures += submission.failed_attachments;
                ticket.issue = Some(submission.issue);
                if let Some(previous) = result.insert(ticket) {
                    warn!(
                        key = previous.key(),
                        replaced = %previous.source.display(),
                        "duplicate ticket key, keeping the later file"
                    );
                    summary.duplicate_keys += 1;
                }
            }
            Err(err) => {
                error!(path = %path.display(), "error saving ticket {}: {err}", ticket.key());
                summary.submit_failures += 1;
            }
        }
    }

    if !config.dry_run {
        debug!("linking {} created tickets", result.len());
        let report = link_tickets(tracker, &result).await;
        summary.links_created = report.created;
        summary.link_failures = report.failed;
    }

    Ok(BatchOutcome { result, summary })
}

async fn load_ticket(path: &Path) -> AppResult<ParsedTicket> {
    let raw = tokio::fs::read_to_string(path).await?;
    let (metadata, markdown) = front_matter::parse(&raw)?;
    let markup = to_jira_markup(&markdown);
    Ok(ParsedTicket {
        source: path.to_path_buf(),
        metadata,
        markdown,
        markup,
        issue: None,
    })
}

fn preview(ticket: &ParsedTicket) {
    let metadata = &ticket.metadata;
    info!(
        path = %ticket.source.display(),
        "{} [{}] {}: {}",
        metadata.key,
        metadata.issuetype,
        metadata.project,
        metadata.summary
    );
    for dependency in &metadata.dependencies {
        info!("  {} -> {} ({})", metadata.key, dependency.ticket, dependency.kind);
    }
    match front_matter::render(metadata, &ticket.markdown) {
        Ok(normalized) => debug!("normalized ticket:\n{normalized}"),
        Err(err) => warn!(key = %metadata.key, "{err}"),
    }
    debug!("jira description:\n{}", ticket.markup);
}
