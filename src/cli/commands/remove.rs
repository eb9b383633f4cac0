//! chnode remove - Remove a cached version

use clap::Args;

use crate::cache::VersionCache;
use crate::cli::output;
use crate::core::{ChnodeError, ChnodeResult, Config, VersionSpec};

#[derive(Args)]
pub struct RemoveArgs {
    /// Version to remove (major.minor.patch)
    pub version: String,

    /// Remove the version even if it is the active one
    #[arg(short, long)]
    pub force: bool,
}

pub async fn execute(args: RemoveArgs, config: &Config, json_output: bool) -> ChnodeResult<()> {
    let version = VersionSpec::parse(&args.version)?;
    let cache = VersionCache::new(config.cache_root()?);

    let is_active = cache.active_version(&config.global_bin_dir()).as_ref() == Some(&version);
    if is_active && !args.force {
        return Err(ChnodeError::other(format!(
            "{} is the active version; pass --force to remove it anyway",
            version
        )));
    }

    let freed = cache.remove(&version)?;

    if json_output {
        output::json(&serde_json::json!({
            "success": true,
            "removed": version.to_string(),
            "was_active": is_active,
            "freed_bytes": freed
        }))?;
        return Ok(());
    }

    output::success(&format!(
        "Removed Node.js {} ({} freed)",
        output::version(&version.to_string()),
        output::format_bytes(freed)
    ));
    if is_active {
        output::warning("The global node, npm and npx links now dangle");
    }

    Ok(())
}
