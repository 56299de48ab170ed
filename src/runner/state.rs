use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::{EventEmitter, TestEvent};
use crate::probes::ProbeKind;

/// One recorded pass/fail result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    pub name: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeKind>,
    pub recorded_at: String,
}

/// Append-only outcome log
pub struct ResultRecorder {
    outcomes: Vec<TestOutcome>,
    emitter: EventEmitter,
    current_probe: Option<ProbeKind>,
}

impl ResultRecorder {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            outcomes: Vec::new(),
            emitter,
            current_probe: None,
        }
    }

    /// Recorder without any listeners
    pub fn silent() -> Self {
        Self::new(EventEmitter::new())
    }

    pub fn record(&mut self, name: &str, success: bool, message: &str, detail: Option<Value>) {
        let outcome = TestOutcome {
            name: name.to_string(),
            success,
            message: message.to_string(),
            detail,
            probe: self.current_probe,
            recorded_at: chrono::Local::now().to_rfc3339(),
        };

        self.emitter.emit(&TestEvent::OutcomeRecorded {
            outcome: outcome.clone(),
        });
        self.outcomes.push(outcome);
    }

    /// Attribute subsequent outcomes to `probe`
    pub fn set_current_probe(&mut self, probe: Option<ProbeKind>) {
        self.current_probe = probe;
    }

    pub fn emit(&mut self, event: TestEvent) {
        self.emitter.emit(&event);
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    pub fn into_outcomes(self) -> Vec<TestOutcome> {
        self.outcomes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedTest {
    pub name: String,
    pub message: String,
}

/// Totals derived from the outcome log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub failed_list: Vec<FailedTest>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[TestOutcome]) -> Self {
        let failed_list: Vec<FailedTest> = outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| FailedTest {
                name: o.name.clone(),
                message: o.message.clone(),
            })
            .collect();

        let total = outcomes.len() as u32;
        let failed = failed_list.len() as u32;

        Self {
            total,
            passed: total - failed,
            failed,
            failed_list,
        }
    }

    /// Percentage of passing outcomes, `None` when nothing ran
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total as f64 * 100.0)
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Orchestrator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPhase {
    NotStarted,
    HealthChecked,
    ProbesRunning,
    Summarized,
    Done,
}

impl RunPhase {
    pub fn can_advance_to(&self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (RunPhase::NotStarted, RunPhase::HealthChecked)
                | (RunPhase::NotStarted, RunPhase::Done)
                | (RunPhase::HealthChecked, RunPhase::ProbesRunning)
                | (RunPhase::ProbesRunning, RunPhase::Summarized)
                | (RunPhase::Summarized, RunPhase::Done)
        )
    }
}

/// What happened to one executed probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub probe: ProbeKind,
    pub passed: bool,
    pub crashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub session_id: String,
    pub base_url: String,
    /// Phase the orchestrator finished in, `Done` for every completed run
    pub phase: RunPhase,
    pub aborted: bool,
    pub passed: bool,
    pub summary: RunSummary,
    pub probes: Vec<ProbeReport>,
    pub outcomes: Vec<TestOutcome>,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut recorder = ResultRecorder::silent();
        recorder.record("A", true, "ok", None);
        recorder.record("B", false, "B returned status 500", None);
        recorder.record("A", true, "ok again", None);

        let summary = recorder.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed + summary.failed, summary.total);
        assert_eq!(summary.total as usize, recorder.outcomes().len());
        assert_eq!(
            summary.failed_list,
            vec![FailedTest {
                name: "B".into(),
                message: "B returned status 500".into()
            }]
        );
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(RunSummary::from_outcomes(&[]).success_rate(), None);

        let mut recorder = ResultRecorder::silent();
        recorder.record("A", true, "ok", None);
        recorder.record("B", false, "no", None);
        recorder.record("C", true, "ok", None);
        recorder.record("D", true, "ok", None);
        assert_eq!(recorder.summary().success_rate(), Some(75.0));
    }

    #[test]
    fn test_outcomes_are_attributed_to_current_probe() {
        let mut recorder = ResultRecorder::silent();
        recorder.record("Before", true, "ok", None);
        recorder.set_current_probe(Some(ProbeKind::Slimes));
        recorder.record("Get Slimes", true, "Retrieved 3 slimes", None);

        let outcomes = recorder.outcomes();
        assert_eq!(outcomes[0].probe, None);
        assert_eq!(outcomes[1].probe, Some(ProbeKind::Slimes));
    }

    #[test]
    fn test_phase_transitions() {
        assert!(RunPhase::NotStarted.can_advance_to(RunPhase::HealthChecked));
        assert!(RunPhase::NotStarted.can_advance_to(RunPhase::Done));
        assert!(RunPhase::HealthChecked.can_advance_to(RunPhase::ProbesRunning));
        assert!(RunPhase::Summarized.can_advance_to(RunPhase::Done));
        assert!(!RunPhase::NotStarted.can_advance_to(RunPhase::ProbesRunning));
        assert!(!RunPhase::Done.can_advance_to(RunPhase::NotStarted));
        assert!(!RunPhase::HealthChecked.can_advance_to(RunPhase::Done));
    }
}
