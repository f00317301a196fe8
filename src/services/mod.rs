pub mod issue_tracker;

#[cfg(test)]
pub mod recording;

pub use issue_tracker::IssueTrackerService;
