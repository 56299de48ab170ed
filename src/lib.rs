pub mod client;
pub mod probes;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use client::HttpProbeClient;
pub use report::generate_report;
pub use runner::{run_tests, RunOptions};
pub use utils::Config;
