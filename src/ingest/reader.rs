use crate::core::instruction::{InstructionError, TradeInstruction};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors arising from reading instruction batches.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid {field} '{value}': {reason}")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("line {line}: {source}")]
    Instruction {
        line: u64,
        #[source]
        source: InstructionError,
    },
}

/// Producer of successive batches of trade instructions.
///
/// End of data is signalled by [`is_done`](InstructionReader::is_done)
/// or by an empty batch; consumers should stop on either.
pub trait InstructionReader {
    fn read_batch(&mut self) -> Result<Vec<TradeInstruction>, ReaderError>;

    fn is_done(&self) -> bool;
}

/// Serves pre-built batches in order.
#[derive(Debug, Default)]
pub struct MemoryReader {
    batches: VecDeque<Vec<TradeInstruction>>,
}

impl MemoryReader {
    pub fn new(batches: Vec<Vec<TradeInstruction>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Split `instructions` into batches of at most `chunk_size`.
    pub fn chunked(instructions: Vec<TradeInstruction>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let batches = instructions
            .chunks(chunk_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        Self { batches }
    }
}

impl InstructionReader for MemoryReader {
    fn read_batch(&mut self) -> Result<Vec<TradeInstruction>, ReaderError> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn is_done(&self) -> bool {
        self.batches.is_empty()
    }
}
