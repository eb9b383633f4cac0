//! chnode - Install and use different versions of Node.js
//!
//! chnode downloads official Node.js release tarballs into a per-user cache,
//! verifies them against the published SHASUMS256 manifest and points the
//! global `node`, `npm` and `npx` symlinks at the selected version.

mod cache;
mod cli;
mod core;
mod installer;
mod security;
#[cfg(test)]
mod test_support;

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{commands, Cli, Commands};
use crate::core::{ChnodeError, ChnodeResult, Config, VersionSpec};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let json_output = cli.json;

    // Dropping the activation future on Ctrl-C runs the pending-install cleanup
    let result = tokio::select! {
        result = run(cli) => result,
        Ok(()) = tokio::signal::ctrl_c() => Err(ChnodeError::Interrupted),
    };

    if let Err(ref e) = result {
        if json_output {
            let error_json = serde_json::json!({
                "error": true,
                "category": e.category(),
                "message": e.to_string()
            });
            match serde_json::to_string_pretty(&error_json) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{}", e),
            }
        } else {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> ChnodeResult<()> {
    let config = cli.apply_overrides(Config::load()?);
    let json_output = cli.json;

    if cli.help {
        return commands::help::execute(&config, json_output);
    }

    match cli.command {
        Some(Commands::Use(args)) => commands::use_file::execute(args, &config, json_output).await,
        Some(Commands::Current) => commands::current::execute(&config, json_output).await,
        Some(Commands::List) => commands::list::execute(&config, json_output).await,
        Some(Commands::Remove(args)) => commands::remove::execute(args, &config, json_output).await,
        Some(Commands::Help) => commands::help::execute(&config, json_output),
        None => match cli.target {
            Some(ref target) if target == "help" => commands::help::execute(&config, json_output),
            Some(ref target) => {
                let version = VersionSpec::parse(target)?;
                commands::activate::execute(version, &config, json_output).await
            }
            None => match read_stdin_version().await? {
                Some(version) => commands::activate::execute(version, &config, json_output).await,
                None => commands::help::execute(&config, json_output),
            },
        },
    }
}

/// Version piped on stdin; `None` for a terminal or empty input
async fn read_stdin_version() -> ChnodeResult<Option<VersionSpec>> {
    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    tokio::task::spawn_blocking(|| VersionSpec::from_reader(std::io::stdin().lock()))
        .await
        .map_err(|e| ChnodeError::other(format!("failed to read standard input: {}", e)))?
}
