//! # settlement-report
//!
//! Trade instruction settlement reporting.
//!
//! Instructions are read in batches, their settlement dates moved onto the
//! next operational day of the currency's calendar, then summed per day
//! and per entity to produce daily totals and entity rankings for both
//! incoming and outgoing flows.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: entities, currencies, instructions
//! - **calendar** — Operational-week tables and settlement-date normalization
//! - **aggregation** — Per-settlement-date totals
//! - **ranking** — Cumulative entity totals and dense ranking
//! - **report** — Report model, text rendering and writers
//! - **ingest** — Batch readers over CSV and memory
//! - **processor** — The read / normalize / aggregate / rank loop
//! - **simulation** — Random instruction generation

pub mod aggregation;
pub mod calendar;
pub mod config;
pub mod core;
pub mod ingest;
pub mod processor;
pub mod ranking;
pub mod report;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::aggregation::daily::{DailyTotals, SettlementAggregator};
    pub use crate::calendar::normalizer::SettlementNormalizer;
    pub use crate::calendar::policy::{CalendarPolicy, OperationalWeek};
    pub use crate::config::ReportConfig;
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::entity::EntityId;
    pub use crate::core::instruction::{Direction, InstructionRecord, TradeInstruction};
    pub use crate::ingest::csv_reader::CsvInstructionReader;
    pub use crate::ingest::reader::{InstructionReader, MemoryReader};
    pub use crate::processor::{ProcessStatus, ReportProcessor};
    pub use crate::ranking::ranker::{EntityRanker, Ranking};
    pub use crate::report::model::SettlementReport;
    pub use crate::report::writer::{ConsoleWriter, MemoryWriter, ReportWriter};
}
