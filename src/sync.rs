use chrono::Utc;
use colored::Colorize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::SchemaConfig;
use crate::extract::PageReference;
use crate::notion::{types, NotionClient, NotionError};
use crate::pr::PullRequestFact;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Tracking record lookup failed: {0}")]
    Lookup(#[source] NotionError),

    #[error("Tracking record write failed: {0}")]
    Write(#[source] NotionError),

    #[error("Found {count} tracking records for PR #{pr_number}; expected at most one")]
    DuplicateRecords { pr_number: u64, count: usize },
}

/// Which branch of the upsert ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
}

/// Create or update the tracking record for `pr`, relating it to `refs`.
///
/// The store offers no atomic upsert, so this function emulates one: an
/// authoritative lookup by PR number precedes every write decision, which
/// makes repeated invocations converge on a single record. More than one
/// existing record for the same PR number is an invariant violation and is
/// surfaced instead of resolved by picking a match.
#[instrument(skip_all, fields(pr = pr.number))]
pub async fn sync(
    client: &NotionClient,
    database_id: &str,
    schema: &SchemaConfig,
    pr: &PullRequestFact,
    refs: &[PageReference],
) -> Result<SyncOutcome, SyncError> {
    let filter = types::number_filter(schema, pr.number);
    let matches = client
        .query_database(database_id, filter)
        .await
        .map_err(SyncError::Lookup)?;

    match matches.as_slice() {
        [] => {
            info!(pr = pr.number, "no tracking record found, creating");
            let properties = create_properties(schema, pr, refs);
            let page = client
                .create_page(database_id, Value::Object(properties))
                .await
                .map_err(SyncError::Write)?;
            println!(
                "{} Created tracking record {} for PR #{}",
                "✓".green().bold(),
                page.id,
                pr.number
            );
            report_links(refs);
            Ok(SyncOutcome::Created)
        }
        [existing] => {
            info!(pr = pr.number, page = %existing.id, "tracking record exists, updating");
            let properties = update_properties(schema, pr, refs);
            client
                .update_page(&existing.id, Value::Object(properties))
                .await
                .map_err(SyncError::Write)?;
            println!(
                "{} Updated tracking record {} for PR #{}",
                "✓".green().bold(),
                existing.id,
                pr.number
            );
            report_links(refs);
            Ok(SyncOutcome::Updated)
        }
        many => Err(SyncError::DuplicateRecords {
            pr_number: pr.number,
            count: many.len(),
        }),
    }
}

fn report_links(refs: &[PageReference]) {
    if !refs.is_empty() {
        println!("  linked {} page(s)", refs.len());
    }
}

/// Full property map for a new record. The PR number, creation timestamp and
/// initial status are written here once; updates never touch them.
fn create_properties(
    schema: &SchemaConfig,
    pr: &PullRequestFact,
    refs: &[PageReference],
) -> Map<String, Value> {
    let mut properties = update_properties(schema, pr, refs);
    properties.insert(schema.number.clone(), types::number_value(schema, pr.number));
    properties.insert(
        schema.created.clone(),
        types::date_value(&Utc::now().to_rfc3339()),
    );
    properties.insert(
        schema.status.clone(),
        types::status_value(schema, &schema.initial_status),
    );
    properties
}

/// Mutable fields only: title, url, author, related pages. An empty `refs`
/// leaves the relation property out of the payload entirely rather than
/// clearing it, and an absent author is likewise omitted.
fn update_properties(
    schema: &SchemaConfig,
    pr: &PullRequestFact,
    refs: &[PageReference],
) -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(schema.title.clone(), types::title_value(&pr.title));
    properties.insert(schema.url.clone(), types::url_value(&pr.url));
    if let Some(author) = &pr.author {
        properties.insert(schema.author.clone(), types::rich_text_value(author));
    }
    if !refs.is_empty() {
        properties.insert(schema.relation.clone(), types::relation_value(refs));
    }
    properties
}
