//! Batch orchestration: read, normalize, aggregate, rank, report.

use crate::aggregation::daily::{AggregationError, DailyTotals, SettlementAggregator};
use crate::calendar::normalizer::SettlementNormalizer;
use crate::calendar::policy::CalendarError;
use crate::config::{ConfigError, ReportConfig};
use crate::core::instruction::Direction;
use crate::ingest::reader::{InstructionReader, ReaderError};
use crate::ranking::ranker::{EntityRanker, Ranking, RankingError};
use crate::report::model::SettlementReport;
use crate::report::writer::ReportWriter;
use log::{debug, error, info};
use std::fmt;
use std::io;
use thiserror::Error;

/// Errors that abort a report run.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),
    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),
    #[error("reader error: {0}")]
    Reader(#[from] ReaderError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("write error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of [`ReportProcessor::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Success,
    Failure,
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Success => write!(f, "SUCCESS"),
            ProcessStatus::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Drives a reader to exhaustion and builds the settlement report.
///
/// State accumulates across every batch the processor sees, including
/// across repeated calls to [`process`](Self::process). Use a fresh
/// processor per run.
#[derive(Debug, Default)]
pub struct ReportProcessor {
    config: ReportConfig,
    incoming: DailyTotals,
    outgoing: DailyTotals,
    incoming_ranker: EntityRanker,
    outgoing_ranker: EntityRanker,
    incoming_ranking: Ranking,
    outgoing_ranking: Ranking,
    batches: usize,
}

impl ReportProcessor {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Number of non-empty batches processed so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Consume every batch from `reader` and return the resulting report.
    ///
    /// The first error aborts the run.
    pub fn process<R>(&mut self, reader: &mut R) -> Result<SettlementReport, ProcessError>
    where
        R: InstructionReader + ?Sized,
    {
        info!(
            "settlement report run started (chunk_size={})",
            self.config.chunk_size
        );

        while !reader.is_done() {
            let mut batch = reader.read_batch()?;
            if batch.is_empty() {
                break;
            }
            self.batches += 1;
            debug!("processing batch {} ({} instructions)", self.batches, batch.len());

            SettlementNormalizer::normalize_all(&mut batch)?;

            self.incoming.merge(&SettlementAggregator::aggregate_by_date(
                &batch,
                Direction::Incoming.predicate(),
            )?)?;
            self.outgoing.merge(&SettlementAggregator::aggregate_by_date(
                &batch,
                Direction::Outgoing.predicate(),
            )?)?;

            self.incoming_ranking = self
                .incoming_ranker
                .evaluate_ranking(Some(batch.as_slice()), Direction::Incoming.predicate())?;
            self.outgoing_ranking = self
                .outgoing_ranker
                .evaluate_ranking(Some(batch.as_slice()), Direction::Outgoing.predicate())?;
        }

        info!(
            "settlement report run finished after {} batches ({} incoming dates, {} outgoing dates)",
            self.batches,
            self.incoming.len(),
            self.outgoing.len()
        );
        Ok(self.report())
    }

    /// Process `reader` and hand each report table to `writer`.
    pub fn run<R, W>(&mut self, reader: &mut R, writer: &mut W) -> ProcessStatus
    where
        R: InstructionReader + ?Sized,
        W: ReportWriter + ?Sized,
    {
        match self.try_run(reader, writer) {
            Ok(()) => ProcessStatus::Success,
            Err(e) => {
                error!("settlement report run failed: {}", e);
                ProcessStatus::Failure
            }
        }
    }

    fn try_run<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), ProcessError>
    where
        R: InstructionReader + ?Sized,
        W: ReportWriter + ?Sized,
    {
        let report = self.process(reader)?;
        for table in report.tables() {
            writer.write(&table)?;
        }
        Ok(())
    }

    /// Snapshot of the current totals and rankings.
    pub fn report(&self) -> SettlementReport {
        SettlementReport::new(
            self.incoming.clone(),
            self.outgoing.clone(),
            self.incoming_ranking.clone(),
            self.outgoing_ranking.clone(),
        )
    }
}
