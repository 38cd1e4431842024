//! Target listing.

use console::style;

use crate::config::Config;

pub fn cmd_targets(config: &Config) -> anyhow::Result<()> {
    if let Some(ref path) = config.source_path {
        println!("{} {}", style("Config:").dim(), path.display());
    }

    for id in config.target_ids() {
        let target = config.target(id)?;
        println!(
            "{:<12} {:<8} {}",
            style(id).bold(),
            style(target.primary).cyan(),
            target.name_or(id)
        );
        println!("{:<12} {:<8} {}", "", "", style(&target.url).dim());
    }
    Ok(())
}
