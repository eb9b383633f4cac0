//! chnode list - List cached versions

use console::style;

use crate::cache::VersionCache;
use crate::cli::output;
use crate::core::{ChnodeResult, Config};

pub async fn execute(config: &Config, json_output: bool) -> ChnodeResult<()> {
    let cache = VersionCache::new(config.cache_root()?);
    let versions = cache.list()?;
    let active = cache
        .active_version(&config.global_bin_dir())
        .map(|v| v.to_string());

    if json_output {
        output::json(&serde_json::json!({
            "cache_root": cache.root(),
            "active": active,
            "versions": versions
        }))?;
        return Ok(());
    }

    if versions.is_empty() {
        output::info(&format!("No versions cached in {}", cache.root().display()));
        return Ok(());
    }

    output::info(&format!("Cached versions in {}", cache.root().display()));
    output::divider();

    for cached in &versions {
        let marker = if active.as_deref() == Some(cached.version.as_str()) {
            style("*").green().bold()
        } else {
            style(" ")
        };

        let mut line = format!(
            "{} {:<12} {:>10}",
            marker,
            cached.version,
            output::format_bytes(cached.size)
        );
        if !cached.complete {
            line.push_str(&format!("  {}", style("(incomplete)").yellow()));
        }
        println!("{}", line);
    }

    let total: u64 = versions.iter().map(|v| v.size).sum();
    output::divider();
    println!(
        "  {} version(s), {}",
        versions.len(),
        output::format_bytes(total)
    );

    Ok(())
}
