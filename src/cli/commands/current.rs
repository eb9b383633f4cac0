//! chnode current - Show the active version

use console::style;

use crate::cache::VersionCache;
use crate::cli::output;
use crate::core::{ChnodeResult, Config};
use crate::installer::linker::{self, LinkStatus};

pub async fn execute(config: &Config, json_output: bool) -> ChnodeResult<()> {
    let bin_dir = config.global_bin_dir();
    let cache = VersionCache::new(config.cache_root()?);
    let active = cache.active_version(&bin_dir).map(|v| v.to_string());
    let links = linker::inspect(&bin_dir);

    if json_output {
        output::json(&serde_json::json!({
            "version": active,
            "prefix": config.dirs.prefix,
            "links": links
        }))?;
        return Ok(());
    }

    match active {
        Some(ref version) => output::success(&format!("Active: Node.js {}", output::version(version))),
        None => output::warning("No chnode-managed version is active"),
    }

    print_links(&links);
    Ok(())
}

/// Print one line per global symlink
pub fn print_links(links: &[LinkStatus]) {
    for link in links {
        let mark = if link.resolves {
            style("✓").green().bold()
        } else {
            style("✗").red().bold()
        };

        let target = match link.target {
            Some(ref target) => target.display().to_string(),
            None if link.path.exists() => "(not a symlink)".to_string(),
            None => "(missing)".to_string(),
        };

        println!(
            "  {} {} -> {}",
            mark,
            style(link.path.display()).bold(),
            style(target).dim()
        );
    }
}
