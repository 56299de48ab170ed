pub mod events;
pub mod fixtures;
pub mod state;

use anyhow::Result;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

pub use events::*;
pub use fixtures::{FixtureRegistry, Role};
pub use state::*;

use crate::client::{Backend, HttpProbeClient};
use crate::probes::{self, ProbeContext, ProbeKind};
use crate::report;
use crate::utils::Config;

pub const SERVER_DOWN_MESSAGE: &str =
    "Server is not running. Please start the backend server first.";

/// Options for a command-line run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Restrict the post-liveness probes to these, order is kept
    pub only: Option<Vec<ProbeKind>>,
    /// Write JSON and JUnit reports into this directory
    pub report_dir: Option<PathBuf>,
}

/// Run the suite against `config.base_url`, printing progress to stdout.
/// Returns whether every recorded outcome passed.
pub async fn run_tests(config: &Config, options: &RunOptions) -> Result<bool> {
    let client = HttpProbeClient::new(&config.base_url, config.default_timeout())?;
    let emitter = EventEmitter::new().with_listener(Box::new(ConsoleEventListener));

    let mut orchestrator = Orchestrator::new(&client, config, emitter);
    if let Some(only) = &options.only {
        orchestrator = orchestrator.with_suite(only);
    }

    let run = orchestrator.run().await;
    let passed = run.passed;

    if let Some(dir) = &options.report_dir {
        report::write_reports(&report::types::TestResults::new(run), dir)?;
    }

    Ok(passed)
}

/// Drives one run: liveness first, then the suite in fixed order
pub struct Orchestrator<'a> {
    backend: &'a dyn Backend,
    config: &'a Config,
    recorder: ResultRecorder,
    fixtures: FixtureRegistry,
    suite: Vec<ProbeKind>,
    phase: RunPhase,
    session_id: String,
    probe_reports: Vec<ProbeReport>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn Backend, config: &'a Config, emitter: EventEmitter) -> Self {
        Self {
            backend,
            config,
            recorder: ResultRecorder::new(emitter),
            fixtures: FixtureRegistry::new(),
            suite: ProbeKind::SUITE.to_vec(),
            phase: RunPhase::NotStarted,
            session_id: Uuid::new_v4().to_string(),
            probe_reports: Vec::new(),
        }
    }

    /// Keep only the suite probes listed in `only`
    pub fn with_suite(mut self, only: &[ProbeKind]) -> Self {
        self.suite.retain(|probe| only.contains(probe));
        self
    }

    pub async fn run(mut self) -> RunReport {
        let started = Instant::now();

        self.recorder.emit(TestEvent::RunStarted {
            session_id: self.session_id.clone(),
            base_url: self.backend.base_url().to_string(),
        });

        if !self.execute(ProbeKind::Health).await {
            self.advance(RunPhase::Done);
            self.recorder.emit(TestEvent::RunAborted {
                reason: SERVER_DOWN_MESSAGE.to_string(),
            });
            return self.into_report(true, started);
        }
        self.advance(RunPhase::HealthChecked);

        self.advance(RunPhase::ProbesRunning);
        for probe in self.suite.clone() {
            self.execute(probe).await;
        }

        let summary = self.recorder.summary();
        self.advance(RunPhase::Summarized);
        self.recorder.emit(TestEvent::RunFinished {
            summary,
            probes: self.probe_reports.clone(),
        });

        self.advance(RunPhase::Done);
        self.into_report(false, started)
    }

    /// Run one probe; errors and panics become a crash report, never propagate
    async fn execute(&mut self, probe: ProbeKind) -> bool {
        self.recorder.set_current_probe(Some(probe));
        self.recorder.emit(TestEvent::ProbeStarted { probe });
        let started = Instant::now();

        let mut ctx = ProbeContext {
            backend: self.backend,
            recorder: &mut self.recorder,
            fixtures: &mut self.fixtures,
            config: self.config,
        };
        let result = AssertUnwindSafe(probes::run_probe(probe, &mut ctx))
            .catch_unwind()
            .await;

        let (passed, error) = match result {
            Ok(Ok(passed)) => (passed, None),
            Ok(Err(e)) => (false, Some(format!("{:#}", e))),
            Err(panic) => (false, Some(panic_message(panic.as_ref()))),
        };

        if let Some(error) = &error {
            log::error!("probe {} crashed: {}", probe, error);
            self.recorder.emit(TestEvent::ProbeCrashed {
                probe,
                error: error.clone(),
            });
        }

        self.recorder.set_current_probe(None);
        self.probe_reports.push(ProbeReport {
            probe,
            passed,
            crashed: error.is_some(),
            error,
            duration_ms: started.elapsed().as_millis() as u64,
        });

        passed
    }

    fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::debug!("run phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    fn into_report(self, aborted: bool, started: Instant) -> RunReport {
        let outcomes = self.recorder.into_outcomes();
        let summary = RunSummary::from_outcomes(&outcomes);
        let passed = !aborted && summary.all_passed();

        RunReport {
            session_id: self.session_id,
            base_url: self.backend.base_url().to_string(),
            phase: self.phase,
            aborted,
            passed,
            summary,
            probes: self.probe_reports,
            outcomes,
            total_duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic with a non-string payload".to_string()
    }
}
