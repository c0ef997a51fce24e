use clap::Args;

/// Snapshot of the triggering pull request, supplied once per invocation by
/// the CI environment and never mutated. Every field can be given as a flag
/// or through the corresponding env var set by the workflow.
#[derive(Debug, Clone, Args)]
pub struct PullRequestFact {
    /// Pull request number, unique per repository
    #[arg(long, env = "PR_NUMBER")]
    pub number: u64,

    /// Pull request title
    #[arg(long, env = "PR_TITLE")]
    pub title: String,

    /// Link back to the pull request on GitHub
    #[arg(long, env = "PR_URL")]
    pub url: String,

    /// Author's GitHub login
    #[arg(long, env = "PR_AUTHOR")]
    pub author: Option<String>,

    /// Pull request description, scanned for Notion page links
    #[arg(long, env = "PR_BODY", default_value = "")]
    pub body: String,
}
