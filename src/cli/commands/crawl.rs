//! One-shot crawl command.

use console::style;

use crate::config::Config;
use crate::scrapers::StrategyKind;
use crate::services::Crawler;

/// Crawl a target and print the envelope to stdout.
pub async fn cmd_crawl(
    config: &Config,
    target: &str,
    strategy: Option<StrategyKind>,
    pretty: bool,
) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config);
    let result = crawler.crawl_with(target, strategy).await?;

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    if result.is_success() {
        eprintln!(
            "{} {} records from {}",
            style("✓").green(),
            result.count(),
            target
        );
    } else {
        eprintln!(
            "{} {}",
            style("✗").red(),
            result.message().unwrap_or("crawl failed")
        );
    }
    Ok(())
}
