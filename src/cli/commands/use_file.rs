//! chnode use - Activate the version pinned by the project

use std::env;
use std::path::PathBuf;

use clap::Args;

use crate::cli::output;
use crate::core::project::project_version;
use crate::core::{ChnodeResult, Config};

#[derive(Args)]
pub struct UseArgs {
    /// Directory to start searching for the version file from
    #[arg(long, default_value = ".")]
    pub cwd: PathBuf,
}

pub async fn execute(args: UseArgs, config: &Config, json_output: bool) -> ChnodeResult<()> {
    let project_dir = if args.cwd.is_absolute() {
        args.cwd.clone()
    } else {
        env::current_dir()?.join(&args.cwd)
    };

    let (version, file) = project_version(&project_dir, &config.project.version_file)?;

    if !json_output && config.network.progress {
        output::info(&format!(
            "Using {} from {}",
            output::version(&version.to_string()),
            file.display()
        ));
    }

    super::activate::execute(version, config, json_output).await
}
