mod broadcast;
mod config;
mod extract;
mod notion;
mod pr;
mod sync;

use clap::{Parser, Subcommand};
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::Credentials;
use crate::notion::NotionClient;
use crate::pr::PullRequestFact;

/// notion-pr-sync: CI tool invoked on pull-request events. Scans the PR
/// body for Notion page links and either mirrors the PR into a Notion
/// tracking database or announces it as a comment on each linked page.
#[derive(Parser, Debug)]
#[command(name = "notion-pr-sync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update the tracking record for this pull request
    Sync {
        #[command(flatten)]
        pr: PullRequestFact,
    },
    /// Post a comment announcing this pull request on each linked page
    Comment {
        #[command(flatten)]
        pr: PullRequestFact,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (Command::Sync { pr } | Command::Comment { pr }) = &cli.command;

    let _main_span = info_span!("notion_pr_sync", pr = pr.number).entered();

    info!("loading configuration");
    let config = config::Config::load()?;
    // Fatal before any network call is attempted
    let Credentials { token, database_id } = config.credentials()?;

    let refs = extract::extract_page_refs(&pr.body);
    if refs.is_empty() {
        println!("No Notion links found in PR body.");
    } else {
        println!("Found {} Notion page link(s) in PR body.", refs.len());
    }
    info!(links = refs.len(), "extracted page references");

    let client = NotionClient::new(token);

    match &cli.command {
        Command::Sync { pr } => {
            let outcome = sync::sync(&client, &database_id, &config.schema, pr, &refs).await?;
            info!(?outcome, "sync complete");
        }
        Command::Comment { pr } => {
            if refs.is_empty() {
                println!("Nothing to comment on, skipping.");
                return Ok(());
            }
            broadcast::broadcast(&client, pr, &refs).await?;
            info!(pages = refs.len(), "comments delivered");
        }
    }

    Ok(())
}
