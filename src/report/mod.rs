pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

use types::TestResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Junit,
}

/// Write both the JSON and JUnit reports into `output_dir`
pub fn write_reports(results: &TestResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    json::write_report(results, output_dir)?;
    junit::write_report(results, output_dir)?;
    Ok(())
}

/// Generate report from saved test results
pub fn generate_report(
    results_path: &Path,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let results = json::load(results_path)?;

    match format {
        ReportFormat::Json => json::generate(&results, output),
        ReportFormat::Junit => {
            let xml = junit::generate_junit_xml(&results)?;
            if let Some(path) = output {
                std::fs::write(path, xml)?;
                println!("JUnit report saved to: {}", path.display());
            } else {
                println!("{}", xml);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{RunPhase, RunReport, RunSummary};

    fn aborted_run() -> TestResults {
        TestResults::new(RunReport {
            session_id: "s1".to_string(),
            base_url: "http://localhost:8001".to_string(),
            phase: RunPhase::Done,
            aborted: true,
            passed: false,
            summary: RunSummary::from_outcomes(&[]),
            probes: vec![],
            outcomes: vec![],
            total_duration_ms: 12,
        })
    }

    #[test]
    fn test_write_and_regenerate() {
        let dir = tempfile::tempdir().unwrap();
        write_reports(&aborted_run(), dir.path()).unwrap();

        let saved = dir.path().join(json::FILE_NAME);
        assert!(dir.path().join(junit::FILE_NAME).exists());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
        assert_eq!(raw["sessionId"], "s1");
        assert_eq!(raw["aborted"], true);
        assert!(raw["generatedAt"].is_string());

        let regenerated = dir.path().join("again.xml");
        generate_report(&saved, ReportFormat::Junit, Some(&regenerated)).unwrap();
        let xml = std::fs::read_to_string(regenerated).unwrap();
        assert!(xml.contains(r#"tests="0""#));
    }

    #[test]
    fn test_missing_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(generate_report(&missing, ReportFormat::Json, None).is_err());
    }
}
