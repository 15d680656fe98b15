//! Batch posting: one post, many communities
//!
//! The flow has three stages, each a plain sequential loop:
//!
//! 1. [`parse_communities`] turns file text into an ordered community list.
//! 2. [`resolve_flairs`] asks the service for each community's flairs and
//!    lets a [`FlairSelector`] pick one.
//! 3. [`submit_all`] posts to every community in order. A failure is
//!    recorded and the loop moves on.

use std::path::Path;

use tracing::{info, warn};

use super::events::{Event, EventBus};
use crate::api_client::PosterApi;
use crate::error::{Result, SubcastError};
use crate::types::{Community, Flair, PostRequest, PostResponse};

/// Split file text into communities, keeping file order
///
/// Only lines starting with `r/` count; the prefix is stripped. Duplicates
/// are kept. A leading UTF-8 byte order mark is ignored.
pub fn parse_communities(content: &str) -> Vec<Community> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content.split('\n').filter_map(Community::from_line).collect()
}

/// Read and parse a community file
///
/// # Errors
///
/// `Io` when the file cannot be read or is not UTF-8, `InvalidInput` when it
/// names no community at all.
pub fn load_communities(path: &Path) -> Result<Vec<Community>> {
    let content = std::fs::read_to_string(path)?;
    let communities = parse_communities(&content);

    if communities.is_empty() {
        return Err(SubcastError::InvalidInput(format!(
            "No communities found in {}. Lines must look like: r/learnpython",
            path.display()
        )));
    }

    Ok(communities)
}

/// Chooses one flair when a community offers several
pub trait FlairSelector {
    /// Pick an index into `flairs` (never empty), or `None` to post without
    /// flair.
    fn select(&mut self, community: &Community, flairs: &[Flair]) -> Result<Option<usize>>;
}

/// Always takes the first flair offered
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFlair;

impl FlairSelector for FirstFlair {
    fn select(&mut self, _community: &Community, _flairs: &[Flair]) -> Result<Option<usize>> {
        Ok(Some(0))
    }
}

/// A community paired with the flair it will be posted with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPost {
    pub community: Community,
    /// `None` when the community needs no flair or its lookup failed
    pub flair: Option<Flair>,
}

impl PlannedPost {
    pub fn without_flair(community: Community) -> Self {
        Self {
            community,
            flair: None,
        }
    }
}

/// Look up flairs for every community and record the selection
///
/// Lookup failures are logged and treated as "no flair". Only a selector
/// error aborts resolution.
pub async fn resolve_flairs(
    api: &dyn PosterApi,
    communities: &[Community],
    selector: &mut dyn FlairSelector,
    events: &EventBus,
) -> Result<Vec<PlannedPost>> {
    let mut plan = Vec::with_capacity(communities.len());

    for community in communities {
        let flairs = match api.subreddit_flairs(community).await {
            Ok(flairs) => flairs,
            Err(e) => {
                warn!("Flair lookup failed for r/{}, posting without flair: {}", community, e);
                Vec::new()
            }
        };

        let selected = if flairs.is_empty() {
            None
        } else {
            selector
                .select(community, &flairs)?
                .and_then(|index| flairs.get(index).cloned())
        };

        events.emit(Event::FlairsResolved {
            community: community.to_string(),
            available: flairs.len(),
            selected: selected.clone(),
        });

        plan.push(PlannedPost {
            community: community.clone(),
            flair: selected,
        });
    }

    Ok(plan)
}

/// What happened to one community
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Posted { post_id: String, post_url: String },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub community: Community,
    pub outcome: Outcome,
}

/// Ordered results of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Posted { .. }))
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }

    /// Human-readable error line per failed community, in order
    pub fn errors(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| match &e.outcome {
                Outcome::Failed(reason) => Some(format!(
                    "Failed to send post for {}: {}",
                    e.community, reason
                )),
                Outcome::Posted { .. } => None,
            })
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Classify a service answer: only a response carrying a post URL counts
fn classify(response: PostResponse) -> Outcome {
    match response.post_url {
        Some(post_url) if !post_url.is_empty() => Outcome::Posted {
            post_id: response.post_id.unwrap_or_default(),
            post_url,
        },
        _ => Outcome::Failed(
            response
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        ),
    }
}

/// Post `template` to every planned community, in order
///
/// Each request is `template` with the community's flair id. Every
/// community is attempted regardless of earlier failures.
pub async fn submit_all(
    api: &dyn PosterApi,
    plan: &[PlannedPost],
    template: &PostRequest,
    events: &EventBus,
) -> BatchReport {
    events.emit(Event::BatchStarted { total: plan.len() });

    let mut report = BatchReport::default();

    for (index, planned) in plan.iter().enumerate() {
        let request = template
            .clone()
            .with_flair(planned.flair.as_ref().map(|f| f.flair_id.clone()));

        info!("Posting to r/{} ({}/{})", planned.community, index + 1, plan.len());

        let outcome = match api.post(&planned.community, &request).await {
            Ok(response) => classify(response),
            Err(e) => Outcome::Failed(e.to_string()),
        };

        match &outcome {
            Outcome::Posted { post_url, .. } => {
                info!("Posted to r/{}: {}", planned.community, post_url);
                events.emit(Event::PostSucceeded {
                    index,
                    community: planned.community.to_string(),
                    post_url: post_url.clone(),
                });
            }
            Outcome::Failed(reason) => {
                warn!("Failed to post to r/{}: {}", planned.community, reason);
                events.emit(Event::PostFailed {
                    index,
                    community: planned.community.to_string(),
                    error: reason.clone(),
                });
            }
        }

        report.entries.push(BatchEntry {
            community: planned.community.clone(),
            outcome,
        });
    }

    events.emit(Event::BatchCompleted {
        successes: report.success_count(),
        failures: report.failure_count(),
    });

    report
}
