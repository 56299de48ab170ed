use anyhow::Result;
use std::path::Path;

use super::types::TestResults;

pub const FILE_NAME: &str = "test-results.json";

/// Print the results as JSON, or write them to `output`
pub fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(FILE_NAME);
    std::fs::write(&path, serde_json::to_string_pretty(results)?)?;
    println!("    Generated JSON report: {}", path.display());
    Ok(())
}

/// Load results saved by an earlier run
pub fn load(path: &Path) -> Result<TestResults> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
