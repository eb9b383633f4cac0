//! Post-activation smoke test

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::{Binary, BinaryLink, ChnodeError, ChnodeResult};

/// Result of probing one linked binary with `-v`
#[derive(Debug, Clone, Serialize)]
pub struct Probe {
    pub binary: Binary,
    pub path: PathBuf,
    pub passed: bool,
    /// Reported version on success, failure reason otherwise
    pub output: String,
}

/// Outcome of the smoke test
#[derive(Debug, Clone, Default, Serialize)]
pub struct SmokeReport {
    pub probes: Vec<Probe>,
}

impl SmokeReport {
    pub fn passed(&self) -> usize {
        self.probes.iter().filter(|p| p.passed).count()
    }

    /// Version reported by `binary`, if its probe passed
    pub fn version_of(&self, binary: Binary) -> Option<&str> {
        self.probes
            .iter()
            .find(|p| p.binary == binary && p.passed)
            .map(|p| p.output.as_str())
    }
}

/// Run the version query of every smoke-tested binary.
///
/// Fails only when no probe succeeds.
pub async fn verify(links: &[BinaryLink]) -> ChnodeResult<SmokeReport> {
    let mut report = SmokeReport::default();

    for link in links.iter().filter(|l| l.binary.is_smoke_tested()) {
        let probe = probe(link.binary, &link.destination).await;
        if probe.passed {
            tracing::info!("{} -v: {}", link.binary, probe.output);
        } else {
            tracing::warn!("{} -v failed: {}", link.binary, probe.output);
        }
        report.probes.push(probe);
    }

    if !report.probes.is_empty() && report.passed() == 0 {
        let reasons: Vec<String> = report
            .probes
            .iter()
            .map(|p| format!("{}: {}", p.binary, p.output))
            .collect();
        return Err(ChnodeError::SmokeTest(reasons.join("; ")));
    }

    Ok(report)
}

async fn probe(binary: Binary, path: &Path) -> Probe {
    let result = tokio::process::Command::new(path)
        .arg("-v")
        .stdin(std::process::Stdio::null())
        .output()
        .await;

    let (passed, output) = match result {
        Ok(out) if out.status.success() => {
            (true, String::from_utf8_lossy(&out.stdout).trim().to_string())
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            (false, format!("{} {}", out.status, stderr).trim().to_string())
        }
        Err(e) => (false, e.to_string()),
    };

    Probe {
        binary,
        path: path.to_path_buf(),
        passed,
        output,
    }
}
