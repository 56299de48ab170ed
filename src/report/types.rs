use serde::{Deserialize, Serialize};

use crate::runner::state::RunReport;

/// Saved run, the input for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    #[serde(flatten)]
    pub run: RunReport,
    pub generated_at: String,
}

impl TestResults {
    pub fn new(run: RunReport) -> Self {
        Self {
            run,
            generated_at: chrono::Local::now().to_rfc3339(),
        }
    }
}
