//! chnode <version> - Install and activate a version

use std::sync::Mutex;
use std::time::Instant;

use indicatif::ProgressBar;

use crate::cli::output;
use crate::core::{Binary, ChnodeResult, Config, VersionSpec};
use crate::installer::{ActivationMode, Activator, HttpFetcher, Stage};

/// Spinner text for a stage, or `None` when the stage shows no spinner.
///
/// While downloading the fetcher draws its own byte progress bar.
fn spinner_message(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Restoring | Stage::Acquired | Stage::Extracted | Stage::Relinked => Some(stage.describe()),
        _ => None,
    }
}

/// Replace the current spinner to reflect `stage`
fn show_stage(spinner: &Mutex<Option<ProgressBar>>, stage: Stage) {
    let Ok(mut current) = spinner.lock() else {
        return;
    };

    if !matches!(stage, Stage::Installing) && spinner_message(stage).is_none() {
        return;
    }

    if let Some(bar) = current.take() {
        bar.finish_and_clear();
    }
    *current = spinner_message(stage).map(output::spinner);
}

fn clear_spinner(spinner: &Mutex<Option<ProgressBar>>) {
    if let Ok(mut current) = spinner.lock() {
        if let Some(bar) = current.take() {
            bar.finish_and_clear();
        }
    }
}

pub async fn execute(version: VersionSpec, config: &Config, json_output: bool) -> ChnodeResult<()> {
    let start_time = Instant::now();
    let fetcher = HttpFetcher::new(&config.network)?;
    let show_progress = !json_output && config.network.progress;
    let spinner: Mutex<Option<ProgressBar>> = Mutex::new(None);

    let result = Activator::new(config, &fetcher)
        .with_observer(|stage| {
            if show_progress {
                show_stage(&spinner, stage);
            }
        })
        .activate(&version)
        .await;

    clear_spinner(&spinner);
    let activation = result?;

    let elapsed = start_time.elapsed();

    if json_output {
        output::json(&serde_json::json!({
            "success": true,
            "activation": activation,
            "prefix": config.dirs.prefix,
            "duration_ms": elapsed.as_millis()
        }))?;
        return Ok(());
    }

    for probe in activation.smoke.probes.iter().filter(|p| !p.passed) {
        output::warning(&format!("{} -v failed: {}", probe.binary, probe.output));
    }

    let how = match activation.mode {
        ActivationMode::Installing => format!(
            "installed ({} downloaded)",
            output::format_bytes(activation.bytes_downloaded)
        ),
        ActivationMode::Restoring => "restored from cache".to_string(),
    };

    output::success(&format!(
        "Node.js {} {} in {}",
        output::version(&activation.version),
        how,
        output::format_duration(elapsed.as_millis())
    ));

    if let Some(reported) = activation.smoke.version_of(Binary::Node) {
        output::info(&format!("node -v: {}", reported));
    }
    if let Some(reported) = activation.smoke.version_of(Binary::Npm) {
        output::info(&format!("npm -v: {}", reported));
    }

    Ok(())
}
