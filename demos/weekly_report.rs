//! Generate a fortnight of random instructions and print the report.
//!
//! ```bash
//! cargo run --example weekly_report
//! RUST_LOG=debug cargo run --example weekly_report
//! ```

use settlement_report::prelude::*;
use settlement_report::simulation::generator::{generate_instructions, GeneratorConfig};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GeneratorConfig {
        instruction_count: 250,
        entity_count: 8,
        ..Default::default()
    };
    let instructions = generate_instructions(&config);
    println!(
        "Generated {} instructions across {} entities",
        instructions.len(),
        config.entity_count
    );

    let report_config = ReportConfig {
        chunk_size: 50,
        ..ReportConfig::default()
    };
    let mut reader = MemoryReader::chunked(instructions, report_config.chunk_size);
    let mut writer = ConsoleWriter::stdout();

    let status = ReportProcessor::new(report_config).run(&mut reader, &mut writer);
    println!("\nStatus: {}", status);
    if status == ProcessStatus::Failure {
        process::exit(1);
    }
}
