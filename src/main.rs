use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use studyhall_tester::probes::ProbeKind;
use studyhall_tester::report::{self, ReportFormat};
use studyhall_tester::runner::{self, RunOptions};
use studyhall_tester::utils::config::{Config, DEFAULT_BASE_URL};

#[derive(Parser)]
#[command(name = "studyhall-tester")]
#[command(version = "0.1.0")]
#[command(about = "Black-box API checks for the StudyHall backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the probe suite against a running backend
    Run {
        /// Backend base URL (host:port is accepted)
        #[arg(long, env = "STUDYHALL_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// Per-request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Write JSON and JUnit reports into the output directory
        #[arg(long, default_value = "false")]
        report: bool,

        /// Run only these probes after the liveness check (comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<ProbeKind>>,

        /// Debug logging (RUST_LOG takes precedence)
        #[arg(short, long, default_value = "false")]
        verbose: bool,
    },
    /// Generate report from saved test results
    Report {
        /// Path to test-results.json
        results: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "junit")]
        format: ReportFormat,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List probes in run order
    Probes,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            base_url,
            timeout_ms,
            output,
            report,
            only,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = Config::with_base_url(&base_url);
            if let Some(ms) = timeout_ms {
                config.default_timeout_ms = ms;
            }

            println!("{} Target: {}", "▶".green().bold(), config.base_url.cyan());
            if let Some(ref probes) = only {
                let names: Vec<&str> = probes.iter().map(|p| p.name()).collect();
                println!("  Only: {}", names.join(", ").yellow());
            }
            if report {
                println!("  Reports: {}", output.display().to_string().cyan());
            }

            let options = RunOptions {
                only,
                report_dir: report.then_some(output),
            };
            let passed = runner::run_tests(&config, &options).await?;

            std::process::exit(if passed { 0 } else { 1 });
        }
        Commands::Report {
            results,
            format,
            output,
        } => {
            init_logging(false);
            println!(
                "{} Generating {:?} report from: {}",
                "📊".to_string().blue(),
                format,
                results.display()
            );
            report::generate_report(&results, format, output.as_deref())?;
        }
        Commands::Probes => {
            for probe in std::iter::once(ProbeKind::Health).chain(ProbeKind::SUITE) {
                let name = format!("{:<16}", probe.name());
                println!("{} {}", name.cyan(), probe.description());
            }
        }
    }

    Ok(())
}
