use crate::config::ReportConfig;
use crate::core::currency::CurrencyCode;
use crate::core::entity::EntityId;
use crate::core::instruction::{Direction, InstructionRecord, TradeInstruction};
use crate::ingest::reader::{InstructionReader, ReaderError};
use chrono::NaiveDate;
use csv::StringRecord;
use log::debug;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Column order of an instruction row.
pub const COLUMNS: [&str; 8] = [
    "entity",
    "direction",
    "agreed_fx",
    "currency",
    "instruction_date",
    "settlement_date",
    "units",
    "unit_price",
];

/// Reads instruction rows from CSV in fixed-size chunks.
///
/// Blank numeric fields are treated as absent and default to one once
/// the row becomes an instruction. A blank settlement date is an error.
///
/// # Examples
///
/// ```
/// use settlement_report::config::ReportConfig;
/// use settlement_report::ingest::csv_reader::CsvInstructionReader;
/// use settlement_report::ingest::reader::InstructionReader;
///
/// let data = "foo,B,0.50,SGP,01/01/2016,02/01/2016,200,100.25\n";
/// let mut reader = CsvInstructionReader::new(data.as_bytes(), &ReportConfig::default());
///
/// let batch = reader.read_batch().unwrap();
/// assert_eq!(batch.len(), 1);
/// assert!(reader.read_batch().unwrap().is_empty());
/// assert!(reader.is_done());
/// ```
pub struct CsvInstructionReader<R: Read> {
    reader: csv::Reader<R>,
    chunk_size: usize,
    date_format: String,
    record: StringRecord,
    done: bool,
}

impl<R: Read> CsvInstructionReader<R> {
    pub fn new(source: R, config: &ReportConfig) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(config.has_headers)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self {
            reader,
            chunk_size: config.chunk_size.max(1),
            date_format: config.date_format.clone(),
            record: StringRecord::new(),
            done: false,
        }
    }

    fn parse_record(&self) -> Result<TradeInstruction, ReaderError> {
        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        if self.record.len() != COLUMNS.len() {
            return Err(ReaderError::ColumnCount {
                line,
                expected: COLUMNS.len(),
                found: self.record.len(),
            });
        }
        let field = |i: usize| self.record.get(i).unwrap_or("");

        let entity = field(0);
        if entity.is_empty() {
            return Err(invalid(line, "entity", entity, "must not be empty"));
        }
        let direction = Direction::from_str(field(1))
            .map_err(|e| invalid(line, "direction", field(1), e))?;
        let currency = CurrencyCode::from_str(field(3))
            .map_err(|e| invalid(line, "currency", field(3), e))?;
        let instruction_date = self
            .optional_date(line, "instruction_date", field(4))?
            .ok_or_else(|| invalid(line, "instruction_date", "", "must not be empty"))?;
        let settlement_date = self.optional_date(line, "settlement_date", field(5))?;

        let record = InstructionRecord {
            entity: EntityId::new(entity),
            direction,
            agreed_fx: optional_decimal(line, "agreed_fx", field(2))?,
            unit_price: optional_decimal(line, "unit_price", field(7))?,
            units: optional_parse::<i64>(line, "units", field(6))?,
            currency,
            instruction_date,
            settlement_date,
        };
        record
            .into_instruction()
            .map_err(|source| ReaderError::Instruction { line, source })
    }

    fn optional_date(
        &self,
        line: u64,
        name: &'static str,
        value: &str,
    ) -> Result<Option<NaiveDate>, ReaderError> {
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, &self.date_format)
            .map(Some)
            .map_err(|e| invalid(line, name, value, e))
    }
}

impl CsvInstructionReader<File> {
    pub fn from_path(path: impl AsRef<Path>, config: &ReportConfig) -> Result<Self, ReaderError> {
        let file = File::open(path.as_ref()).map_err(csv::Error::from)?;
        debug!("opened instruction file {}", path.as_ref().display());
        Ok(Self::new(file, config))
    }
}

impl<R: Read> InstructionReader for CsvInstructionReader<R> {
    fn read_batch(&mut self) -> Result<Vec<TradeInstruction>, ReaderError> {
        if self.done {
            return Ok(Vec::new());
        }

        let mut batch = Vec::with_capacity(self.chunk_size);
        while batch.len() < self.chunk_size && self.reader.read_record(&mut self.record)? {
            batch.push(self.parse_record()?);
        }

        if batch.is_empty() {
            debug!("reader reached end of input");
            self.done = true;
        } else {
            debug!("read batch of {} instructions", batch.len());
        }
        Ok(batch)
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

fn invalid(line: u64, field: &'static str, value: &str, reason: impl ToString) -> ReaderError {
    ReaderError::InvalidField {
        line,
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn optional_decimal(
    line: u64,
    name: &'static str,
    value: &str,
) -> Result<Option<Decimal>, ReaderError> {
    if value.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map(Some)
        .map_err(|e| invalid(line, name, value, e))
}

fn optional_parse<T>(line: u64, name: &'static str, value: &str) -> Result<Option<T>, ReaderError>
where
    T: FromStr,
    T::Err: ToString,
{
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<T>()
        .map(Some)
        .map_err(|e| invalid(line, name, value, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instruction::InstructionError;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = "\
foo,B,0.50,SGP,01/01/2016,02/01/2016,200,100.25
bar,S,0.22,AED,05/01/2016,07/01/2016,450,150.5
baz,S,,USD,05/01/2016,07/01/2016,,
";

    fn config(chunk_size: usize) -> ReportConfig {
        ReportConfig {
            chunk_size,
            ..ReportConfig::default()
        }
    }

    #[test]
    fn test_reads_all_columns() {
        let mut reader = CsvInstructionReader::new(SAMPLE.as_bytes(), &config(10));
        let batch = reader.read_batch().unwrap();
        assert_eq!(batch.len(), 3);

        let foo = &batch[0];
        assert_eq!(foo.entity().as_str(), "foo");
        assert_eq!(foo.direction(), Direction::Outgoing);
        assert_eq!(foo.currency().as_str(), "SGP");
        assert_eq!(foo.instruction_date(), NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(foo.settlement_date(), NaiveDate::from_ymd_opt(2016, 1, 2).unwrap());
        assert_eq!(foo.trade_amount(), dec!(10025));

        let bar = &batch[1];
        assert_eq!(bar.direction(), Direction::Incoming);
        assert_eq!(bar.units(), 450);
    }

    #[test]
    fn test_blank_numbers_default() {
        let mut reader = CsvInstructionReader::new(SAMPLE.as_bytes(), &config(10));
        let batch = reader.read_batch().unwrap();
        assert_eq!(batch[2].trade_amount(), Decimal::ONE);
    }

    #[test]
    fn test_reads_in_chunks() {
        let mut reader = CsvInstructionReader::new(SAMPLE.as_bytes(), &config(2));
        assert_eq!(reader.read_batch().unwrap().len(), 2);
        assert!(!reader.is_done());
        assert_eq!(reader.read_batch().unwrap().len(), 1);
        assert!(reader.read_batch().unwrap().is_empty());
        assert!(reader.is_done());
    }

    #[test]
    fn test_headers_are_skipped_when_configured() {
        let data = format!("{}\n{}", COLUMNS.join(","), SAMPLE);
        let config = ReportConfig {
            has_headers: true,
            ..ReportConfig::default()
        };
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config);
        assert_eq!(reader.read_batch().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_settlement_date() {
        let data = "foo,B,0.50,SGP,01/01/2016,,200,100.25\n";
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config(10));
        let err = reader.read_batch().unwrap_err();
        assert!(matches!(
            err,
            ReaderError::Instruction {
                line: 1,
                source: InstructionError::MissingSettlementDate { .. }
            }
        ));
    }

    #[test]
    fn test_bad_direction() {
        let data = "foo,X,0.50,SGP,01/01/2016,02/01/2016,200,100.25\n";
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config(10));
        assert!(matches!(
            reader.read_batch(),
            Err(ReaderError::InvalidField { field: "direction", .. })
        ));
    }

    #[test]
    fn test_bad_date() {
        let data = "foo,B,0.50,SGP,2016-01-01,02/01/2016,200,100.25\n";
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config(10));
        assert!(matches!(
            reader.read_batch(),
            Err(ReaderError::InvalidField { field: "instruction_date", .. })
        ));
    }

    #[test]
    fn test_wrong_column_count() {
        let data = "foo,B,0.50\n";
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config(10));
        assert!(matches!(
            reader.read_batch(),
            Err(ReaderError::ColumnCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_custom_date_format() {
        let data = "foo,B,1,USD,2018-07-23,2018-07-28,1,1\n";
        let config = ReportConfig {
            date_format: "%Y-%m-%d".to_string(),
            ..ReportConfig::default()
        };
        let mut reader = CsvInstructionReader::new(data.as_bytes(), &config);
        let batch = reader.read_batch().unwrap();
        assert_eq!(batch[0].settlement_date(), NaiveDate::from_ymd_opt(2018, 7, 28).unwrap());
    }
}
