use anyhow::{bail, Context, Result};
use tracing::info;

// WeChat serves a stripped page to unknown clients; a desktop browser UA
// gets the full article markup.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Download one article page and return its HTML.
pub async fn fetch_article(url: &str) -> Result<String> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

    info!("Fetching article: {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Fetch of {} failed with status {}", url, status);
    }

    response
        .text()
        .await
        .context("Failed to read response body")
}
