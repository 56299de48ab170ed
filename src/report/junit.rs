use super::types::TestResults;
use crate::runner::state::{ProbeReport, TestOutcome};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

pub const FILE_NAME: &str = "junit.xml";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML: one testsuite per executed probe, one testcase per outcome
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let run = &results.run;
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let crashes = run.probes.iter().filter(|p| p.crashed).count();
    let total_tests = run.outcomes.len() + crashes;

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", "studyhall-tester-run"));
    suites_start.push_attribute(("tests", total_tests.to_string().as_str()));
    suites_start.push_attribute(("failures", run.summary.failed.to_string().as_str()));
    suites_start.push_attribute(("errors", crashes.to_string().as_str()));
    suites_start.push_attribute(("time", seconds(run.total_duration_ms).as_str()));
    writer.write_event(Event::Start(suites_start))?;

    for probe in &run.probes {
        let outcomes: Vec<&TestOutcome> = run
            .outcomes
            .iter()
            .filter(|o| o.probe == Some(probe.probe))
            .collect();
        write_test_suite(&mut writer, results, probe, &outcomes)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_suite<W: std::io::Write>(
    writer: &mut Writer<W>,
    results: &TestResults,
    probe: &ProbeReport,
    outcomes: &[&TestOutcome],
) -> Result<()> {
    let failures = outcomes.iter().filter(|o| !o.success).count();
    let errors = usize::from(probe.crashed);

    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", probe.probe.name()));
    suite_start.push_attribute(("tests", (outcomes.len() + errors).to_string().as_str()));
    suite_start.push_attribute(("failures", failures.to_string().as_str()));
    suite_start.push_attribute(("errors", errors.to_string().as_str()));
    suite_start.push_attribute(("id", results.run.session_id.as_str()));
    suite_start.push_attribute(("time", seconds(probe.duration_ms).as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    let classname = format!("studyhall.{}", probe.probe.name());
    for outcome in outcomes {
        write_test_case(writer, &classname, outcome)?;
    }

    if probe.crashed {
        let message = probe.error.as_deref().unwrap_or("probe crashed");
        let mut case_start = BytesStart::new("testcase");
        case_start.push_attribute(("name", format!("{} (crashed)", probe.probe).as_str()));
        case_start.push_attribute(("classname", classname.as_str()));
        writer.write_event(Event::Start(case_start))?;

        let mut error_start = BytesStart::new("error");
        error_start.push_attribute(("message", message));
        error_start.push_attribute(("type", "ProbeCrash"));
        writer.write_event(Event::Start(error_start))?;
        writer.write_event(Event::Text(BytesText::new(message)))?;
        writer.write_event(Event::End(BytesEnd::new("error")))?;

        writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    Ok(())
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    classname: &str,
    outcome: &TestOutcome,
) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", outcome.name.as_str()));
    case_start.push_attribute(("classname", classname));
    writer.write_event(Event::Start(case_start))?;

    if outcome.success {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(&outcome.message)))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    } else {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", outcome.message.as_str()));
        fail_start.push_attribute(("type", "AssertionError"));
        writer.write_event(Event::Start(fail_start))?;

        if let Some(detail) = &outcome.detail {
            let detail = serde_json::to_string_pretty(detail)?;
            writer.write_event(Event::Text(BytesText::new(&detail)))?;
        }

        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join(FILE_NAME);
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
