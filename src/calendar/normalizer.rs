use crate::calendar::policy::{CalendarError, CalendarPolicy};
use crate::core::instruction::TradeInstruction;
use log::{debug, info};

/// Moves settlement dates that fall on a closed day forward to the
/// partner's next operational day.
pub struct SettlementNormalizer;

impl SettlementNormalizer {
    /// Normalize one instruction in place and hand it back.
    ///
    /// When the settlement date is already operational for the
    /// instruction's currency nothing changes and no audit note is added.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use settlement_report::calendar::normalizer::SettlementNormalizer;
    /// use settlement_report::core::instruction::{Direction, InstructionRecord};
    ///
    /// let friday = NaiveDate::from_ymd_opt(2018, 7, 27).unwrap();
    /// let mut instruction = InstructionRecord::new("foo", Direction::Incoming, "AED", friday, friday)
    ///     .into_instruction()
    ///     .unwrap();
    ///
    /// SettlementNormalizer::normalize(&mut instruction).unwrap();
    /// assert_eq!(instruction.settlement_date(), NaiveDate::from_ymd_opt(2018, 7, 29).unwrap());
    /// assert_eq!(instruction.audit_note().len(), 1);
    /// ```
    pub fn normalize(
        instruction: &mut TradeInstruction,
    ) -> Result<&mut TradeInstruction, CalendarError> {
        let policy = CalendarPolicy::for_currency(instruction.currency());
        let original = instruction.settlement_date();
        debug!(
            "checking settlement date={} currency={} policy={}",
            original,
            instruction.currency(),
            policy
        );

        if !policy.is_operational_day(original) {
            let shifted = policy.next_operational_day(original)?;
            instruction.set_settlement_date(shifted);
            instruction.append_audit_note(format!(
                "Settlement date changed from {} to {}",
                original, shifted
            ));
            info!(
                "settlement date changed from previous_date={} to new_date={} entity={}",
                original,
                shifted,
                instruction.entity()
            );
        }

        Ok(instruction)
    }

    /// Normalize every instruction of a batch.
    pub fn normalize_all(instructions: &mut [TradeInstruction]) -> Result<(), CalendarError> {
        for instruction in instructions.iter_mut() {
            Self::normalize(instruction)?;
        }
        Ok(())
    }
}
