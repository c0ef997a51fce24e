use colored::Colorize;
use futures::future::join_all;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, instrument};

use crate::extract::PageReference;
use crate::notion::{NotionClient, NotionError};
use crate::pr::PullRequestFact;

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("{failed} of {total} page comments failed")]
    Partial { failed: usize, total: usize },
}

/// Post one comment announcing `pr` on every referenced page.
///
/// All requests are dispatched at once and every outcome is collected after
/// they settle; one page failing never cancels delivery to the others, and
/// delivered comments stay delivered even when the overall call fails.
#[instrument(skip_all, fields(pr = pr.number, pages = refs.len()))]
pub async fn broadcast(
    client: &NotionClient,
    pr: &PullRequestFact,
    refs: &[PageReference],
) -> Result<(), BroadcastError> {
    if refs.is_empty() {
        return Ok(());
    }

    let body = comment_body(pr);
    let attempts = refs.iter().map(|page| {
        let body = body.clone();
        async move { (page, client.create_comment(page, body).await) }
    });

    let mut failed = 0usize;
    for (page, outcome) in join_all(attempts).await {
        match outcome {
            Ok(()) => println!("{} Commented on page {}", "✓".green().bold(), page),
            Err(err) => {
                failed += 1;
                error!(page = %page, %err, "comment delivery failed");
                println!(
                    "{} Comment on page {} failed: {}",
                    "✗".red().bold(),
                    page,
                    err
                );
            }
        }
    }

    if failed > 0 {
        Err(BroadcastError::Partial {
            failed,
            total: refs.len(),
        })
    } else {
        Ok(())
    }
}

/// Rich-text payload: the PR headline followed by a link back to GitHub.
fn comment_body(pr: &PullRequestFact) -> Value {
    json!([
        { "text": { "content": format!("PR #{}: {}\n", pr.number, pr.title) } },
        { "text": { "content": pr.url.clone(), "link": { "url": pr.url.clone() } } },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const PAGE_A: &str = "26db1b8d88d84f34a0c816cce549bba5";
    const PAGE_B: &str = "0123456789abcdef0123456789abcdef";
    const PAGE_C: &str = "fedcba9876543210fedcba9876543210";

    fn sample_pr() -> PullRequestFact {
        PullRequestFact {
            number: 42,
            title: "Add OAuth2 login flow".to_string(),
            url: "https://github.com/org/repo/pull/42".to_string(),
            author: Some("alice".to_string()),
            body: String::new(),
        }
    }

    fn refs(ids: &[&str]) -> Vec<PageReference> {
        ids.iter().map(|id| PageReference::new(id).unwrap()).collect()
    }

    fn comment_mock(server: &mut Server, page_id: &str) -> mockito::Mock {
        server
            .mock("POST", "/comments")
            .match_body(Matcher::PartialJson(json!({
                "parent": { "page_id": page_id }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "comment-1"}"#)
    }

    #[tokio::test]
    async fn test_empty_refs_is_a_no_op() {
        let mut server = Server::new_async().await;
        let comments = server.mock("POST", "/comments").expect(0).create_async().await;

        let client = NotionClient::new("secret_abc").with_base_url(server.url());
        broadcast(&client, &sample_pr(), &[]).await.unwrap();

        comments.assert_async().await;
    }

    #[tokio::test]
    async fn test_comments_on_every_page() {
        let mut server = Server::new_async().await;
        let first = comment_mock(&mut server, PAGE_A).create_async().await;
        let second = comment_mock(&mut server, PAGE_B).create_async().await;

        let client = NotionClient::new("secret_abc").with_base_url(server.url());
        broadcast(&client, &sample_pr(), &refs(&[PAGE_A, PAGE_B]))
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_one_failure_never_cancels_the_others() {
        let mut server = Server::new_async().await;
        let first = comment_mock(&mut server, PAGE_A).create_async().await;
        let second = server
            .mock("POST", "/comments")
            .match_body(Matcher::PartialJson(json!({
                "parent": { "page_id": PAGE_B }
            })))
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"object": "error", "message": "Could not find page"}"#)
            .create_async()
            .await;
        let third = comment_mock(&mut server, PAGE_C).create_async().await;

        let client = NotionClient::new("secret_abc").with_base_url(server.url());
        let err = broadcast(&client, &sample_pr(), &refs(&[PAGE_A, PAGE_B, PAGE_C]))
            .await
            .unwrap_err();

        // The siblings were delivered despite the middle failure
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        assert!(matches!(
            err,
            BroadcastError::Partial {
                failed: 1,
                total: 3
            }
        ));
    }

    #[test]
    fn test_comment_body_carries_number_title_and_link() {
        let body = comment_body(&sample_pr());
        let runs = body.as_array().unwrap();
        assert_eq!(runs[0]["text"]["content"], "PR #42: Add OAuth2 login flow\n");
        assert_eq!(
            runs[1]["text"]["link"]["url"],
            "https://github.com/org/repo/pull/42"
        );
    }
}
