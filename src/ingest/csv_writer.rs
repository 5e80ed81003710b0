use crate::core::instruction::TradeInstruction;
use crate::ingest::csv_reader::COLUMNS;
use std::io::Write;

/// Write instructions as CSV rows in reader column order.
///
/// Values are written after defaulting, so a file produced here reads
/// back into equal instructions under the same `date_format`.
pub fn write_instructions<W: Write>(
    out: W,
    instructions: &[TradeInstruction],
    date_format: &str,
    with_headers: bool,
) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);
    if with_headers {
        writer.write_record(COLUMNS)?;
    }
    for instruction in instructions {
        writer.write_record([
            instruction.entity().to_string(),
            instruction.direction().flag().to_string(),
            instruction.agreed_fx().to_string(),
            instruction.currency().to_string(),
            instruction.instruction_date().format(date_format).to_string(),
            instruction.settlement_date().format(date_format).to_string(),
            instruction.units().to_string(),
            instruction.unit_price().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
