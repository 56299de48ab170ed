use colored::Colorize;

use super::state::{ProbeReport, RunSummary, TestOutcome};
use crate::probes::ProbeKind;

/// Run events for real-time output
#[derive(Debug, Clone)]
pub enum TestEvent {
    RunStarted {
        session_id: String,
        base_url: String,
    },
    ProbeStarted {
        probe: ProbeKind,
    },
    OutcomeRecorded {
        outcome: TestOutcome,
    },
    /// Probe returned an error or panicked instead of recording outcomes
    ProbeCrashed {
        probe: ProbeKind,
        error: String,
    },
    RunAborted {
        reason: String,
    },
    RunFinished {
        summary: RunSummary,
        probes: Vec<ProbeReport>,
    },
}

/// Receives every event synchronously, in emission order
pub trait EventListener {
    fn on_event(&mut self, event: &TestEvent);
}

/// Fans events out to the registered listeners
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Box<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn emit(&mut self, event: &TestEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

/// Console event listener for printing progress and the final summary
pub struct ConsoleEventListener;

impl EventListener for ConsoleEventListener {
    fn on_event(&mut self, event: &TestEvent) {
        match event {
            TestEvent::RunStarted {
                session_id,
                base_url,
            } => {
                println!("🧪 Starting StudyHall Backend API Tests");
                println!("  Backend: {}", base_url.cyan());
                println!("  Session: {}", session_id.dimmed());
                println!("{}", "=".repeat(50));
            }

            TestEvent::ProbeStarted { probe } => {
                log::debug!("running probe {}", probe.name());
            }

            TestEvent::OutcomeRecorded { outcome } => {
                let status = if outcome.success {
                    "✅ PASS".green().bold()
                } else {
                    "❌ FAIL".red().bold()
                };
                println!("{} {}: {}", status, outcome.name, outcome.message);
                if !outcome.success {
                    if let Some(detail) = &outcome.detail {
                        println!("   Details: {}", detail.to_string().dimmed());
                    }
                }
            }

            TestEvent::ProbeCrashed { probe, error } => {
                println!(
                    "{} Test {} failed with exception: {}",
                    "💥".red(),
                    probe.name().bold(),
                    error
                );
            }

            TestEvent::RunAborted { reason } => {
                println!("\n{} {}", "❌".red(), reason.red());
            }

            TestEvent::RunFinished { summary, probes } => {
                print_summary(summary, probes);
            }
        }
    }
}

fn print_summary(summary: &RunSummary, probes: &[ProbeReport]) {
    println!("\n{}", "=".repeat(50));
    println!("📊 TEST SUMMARY");
    println!("{}", "=".repeat(50));

    println!("Total Tests: {}", summary.total);
    println!("Passed: {}", summary.passed.to_string().green());
    println!("Failed: {}", summary.failed.to_string().red());
    match summary.success_rate() {
        Some(rate) => println!("Success Rate: {:.1}%", rate),
        None => println!("No tests run"),
    }

    if !probes.is_empty() {
        println!();
        println!("  {:<16} {:<8} {:>8}", "Probe", "Result", "Time");
        for report in probes {
            // Pad before colouring, escape codes break the width
            let result = if report.crashed {
                format!("{:<8}", "CRASH").red().bold()
            } else if report.passed {
                format!("{:<8}", "PASS").green()
            } else {
                format!("{:<8}", "FAIL").red()
            };
            println!(
                "  {:<16} {} {:>8}",
                report.probe.name(),
                result,
                format!("{}ms", report.duration_ms)
            );
        }
    }

    if !summary.failed_list.is_empty() {
        println!("\n{}", "❌ FAILED TESTS:".red().bold());
        for failed in &summary.failed_list {
            println!("  - {}: {}", failed.name, failed.message);
        }
    }
}
