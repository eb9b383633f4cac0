//! chnode help - Usage and current links

use console::style;

use crate::cli::output;
use crate::core::{ChnodeResult, Config};
use crate::installer::linker;

const USAGE: &[(&str, &str)] = &[
    ("chnode <version>", "Install (if needed) and activate an exact version, e.g. 18.12.1"),
    ("chnode use [--cwd DIR]", "Activate the version named in the nearest version file"),
    ("echo <version> | chnode", "Read the version from standard input"),
    ("chnode current", "Show the active version and its links"),
    ("chnode list", "List cached versions"),
    ("chnode remove <version>", "Remove a cached version (--force for the active one)"),
    ("chnode help", "Show this message"),
];

/// Print the intro, usage and the state of the global links.
///
/// Reads only; never creates the cache root or touches the prefix.
pub fn execute(config: &Config, json_output: bool) -> ChnodeResult<()> {
    let links = linker::inspect(&config.global_bin_dir());

    if json_output {
        output::json(&serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "usage": USAGE.iter().map(|(cmd, _)| *cmd).collect::<Vec<_>>(),
            "version_file": config.project.version_file,
            "prefix": config.dirs.prefix,
            "links": links
        }))?;
        return Ok(());
    }

    println!(
        "{} {} {}",
        style("chnode").cyan().bold(),
        style("::").dim(),
        "Install and use different versions of Node.js"
    );
    println!("{}", style(format!("version {}", env!("CARGO_PKG_VERSION"))).dim());
    println!();

    println!("{}", style("Usage:").bold());
    for (command, description) in USAGE {
        println!("  {:<26} {}", style(command).green(), description);
    }
    println!();

    println!(
        "{} {}",
        style("Options:").bold(),
        style("--json, -v/--verbose, -q/--quiet, --prefix DIR, --cache-dir DIR, --dist-url URL").dim()
    );
    println!(
        "{} {}",
        style("Version file:").bold(),
        config.project.version_file
    );
    println!();

    println!(
        "{} {}",
        style("Links in").bold(),
        config.global_bin_dir().display()
    );
    super::current::print_links(&links);

    Ok(())
}
