//! settlement-report CLI
//!
//! Build settlement reports from instruction files.
//!
//! # Usage
//!
//! ```bash
//! # Report on a CSV instruction file
//! settlement-report report --input instructions.csv
//!
//! # Output as JSON
//! settlement-report report --input instructions.csv --format json
//!
//! # Generate random instructions for testing
//! settlement-report generate --count 500 --entities 20 --output instructions.csv
//! ```

use settlement_report::aggregation::daily::DailyTotals;
use settlement_report::config::ReportConfig;
use settlement_report::core::currency::CurrencyCode;
use settlement_report::ingest::csv_reader::CsvInstructionReader;
use settlement_report::ingest::csv_writer::write_instructions;
use settlement_report::processor::{ProcessStatus, ReportProcessor};
use settlement_report::ranking::ranker::Ranking;
use settlement_report::report::model::SettlementReport;
use settlement_report::report::writer::ConsoleWriter;
use settlement_report::simulation::generator::{generate_instructions, GeneratorConfig};
use std::fs::File;
use std::io;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"settlement-report — trade instruction settlement reporting

USAGE:
    settlement-report <COMMAND> [OPTIONS]

COMMANDS:
    report      Build daily totals and entity rankings from a CSV file
    generate    Generate random instructions as CSV (for testing)
    help        Show this message

OPTIONS (report):
    --input <FILE>      Path to CSV instruction file
    --format <FORMAT>   Output format: text (default) or json
    --chunk-size <N>    Rows read per batch (default: 100)
    --config <FILE>     JSON config file; flags override its values

OPTIONS (generate):
    --count <N>         Number of instructions (default: 100)
    --entities <N>      Number of entities (default: 10)
    --currencies <LIST> Comma-separated currency codes (default: USD,EUR,GBP,AED,SAR)
    --output <FILE>     Write CSV to file instead of stdout

CSV COLUMNS:
    entity,direction,agreed_fx,currency,instruction_date,settlement_date,units,unit_price
    direction is B (buy, outgoing) or S (sell, incoming); dates are dd/mm/yyyy

ENVIRONMENT:
    RUST_LOG            Log filter (default: info)

EXAMPLES:
    settlement-report report --input data/sample-instructions.csv
    settlement-report report --input big.csv --chunk-size 1000 --format json
    settlement-report generate --count 1000 --currencies AED,SAR,USD --output big.csv"#
    );
}

/// JSON output schema for a settlement report.
#[derive(serde::Serialize)]
struct ReportOutput {
    incoming: Vec<DailyOutput>,
    outgoing: Vec<DailyOutput>,
    incoming_ranking: Vec<RankOutput>,
    outgoing_ranking: Vec<RankOutput>,
}

#[derive(serde::Serialize)]
struct DailyOutput {
    date: String,
    amount: String,
}

#[derive(serde::Serialize)]
struct RankOutput {
    entity: String,
    rank: usize,
    total: String,
}

fn daily_output(totals: &DailyTotals) -> Vec<DailyOutput> {
    totals
        .iter()
        .map(|(date, amount)| DailyOutput {
            date: date.to_string(),
            amount: amount.to_string(),
        })
        .collect()
}

fn rank_output(ranking: &Ranking) -> Vec<RankOutput> {
    ranking
        .iter()
        .map(|entry| RankOutput {
            entity: entry.entity.to_string(),
            rank: entry.rank,
            total: entry.total.to_string(),
        })
        .collect()
}

impl From<&SettlementReport> for ReportOutput {
    fn from(report: &SettlementReport) -> Self {
        Self {
            incoming: daily_output(&report.incoming),
            outgoing: daily_output(&report.outgoing),
            incoming_ranking: rank_output(&report.incoming_ranking),
            outgoing_ranking: rank_output(&report.outgoing_ranking),
        }
    }
}

fn required_value(args: &[String], i: usize, message: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{}", message);
        process::exit(1);
    })
}

fn required_number(args: &[String], i: usize, message: &str) -> usize {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("{}", message);
            process::exit(1);
        })
}

fn cmd_report(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut chunk_size = None;
    let mut config_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(required_value(args, i, "--input requires a file path"));
            }
            "--format" => {
                i += 1;
                format = required_value(args, i, "--format requires 'text' or 'json'");
            }
            "--chunk-size" => {
                i += 1;
                chunk_size = Some(required_number(args, i, "--chunk-size requires a number"));
            }
            "--config" => {
                i += 1;
                config_path = Some(required_value(args, i, "--config requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let mut config = match config_path {
        Some(p) => ReportConfig::load(&p).unwrap_or_else(|e| {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }),
        None => ReportConfig::default(),
    };
    if let Some(n) = chunk_size {
        config.chunk_size = n;
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    let mut reader = CsvInstructionReader::from_path(&path, &config).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });
    let mut processor = ReportProcessor::new(config);

    if format == "json" {
        let report = processor.process(&mut reader).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });
        let output = ReportOutput::from(&report);
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        }
    } else {
        let mut writer = ConsoleWriter::stdout();
        let status = processor.run(&mut reader, &mut writer);
        eprintln!("Status: {}", status);
        if status == ProcessStatus::Failure {
            process::exit(1);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GeneratorConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--count" => {
                i += 1;
                config.instruction_count = required_number(args, i, "--count requires a number");
            }
            "--entities" => {
                i += 1;
                config.entity_count = required_number(args, i, "--entities requires a number");
            }
            "--currencies" => {
                i += 1;
                let list =
                    required_value(args, i, "--currencies requires a comma-separated list");
                config.currencies = list
                    .split(',')
                    .map(|s| {
                        CurrencyCode::from_str(s).unwrap_or_else(|e| {
                            eprintln!("Error: {}", e);
                            process::exit(1);
                        })
                    })
                    .collect();
            }
            "--output" => {
                i += 1;
                output_path = Some(required_value(args, i, "--output requires a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let instructions = generate_instructions(&config);
    let date_format = ReportConfig::default().date_format;

    let result = match &output_path {
        Some(path) => File::create(path)
            .map_err(csv::Error::from)
            .and_then(|file| write_instructions(file, &instructions, &date_format, false)),
        None => write_instructions(io::stdout().lock(), &instructions, &date_format, false),
    };
    if let Err(e) = result {
        eprintln!("Error writing instructions: {}", e);
        process::exit(1);
    }

    if let Some(path) = output_path {
        eprintln!(
            "Generated {} instructions across {} entities → {}",
            instructions.len(),
            config.entity_count,
            path
        );
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "report" => cmd_report(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
