use crate::core::instruction::TradeInstruction;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors arising from summing trade amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("total trade amount for {date} overflows")]
    Overflow { date: NaiveDate },
}

/// Summed trade amount per settlement date.
///
/// A date is present only when at least one instruction settled on it;
/// [`DailyTotals::get`] returns `None` for every other date. Iteration is
/// in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyTotals {
    totals: BTreeMap<NaiveDate, Decimal>,
}

impl DailyTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build totals from `(date, amount)` pairs, adding repeated dates.
    pub fn from_entries<I>(entries: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (NaiveDate, Decimal)>,
    {
        let mut totals = DailyTotals::new();
        for (date, amount) in entries {
            totals.add(date, amount)?;
        }
        Ok(totals)
    }

    /// Add `amount` to the total for `date`, creating the entry if needed.
    ///
    /// On overflow the existing total is left unchanged.
    pub fn add(&mut self, date: NaiveDate, amount: Decimal) -> Result<(), AggregationError> {
        let total = self.totals.entry(date).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(amount)
            .ok_or(AggregationError::Overflow { date })?;
        Ok(())
    }

    /// The total for `date`, or `None` when nothing settled on it.
    pub fn get(&self, date: &NaiveDate) -> Option<Decimal> {
        self.totals.get(date).copied()
    }

    /// Fold another set of totals into this one.
    ///
    /// Dates present on both sides are added together; dates only in
    /// `other` are copied over. Stops at the first overflowing date.
    pub fn merge(&mut self, other: &DailyTotals) -> Result<(), AggregationError> {
        for (date, amount) in &other.totals {
            self.add(*date, *amount)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.totals.iter().map(|(d, a)| (*d, *a))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Sums trade amounts by settlement date.
pub struct SettlementAggregator;

impl SettlementAggregator {
    /// Group the instructions accepted by `predicate` by settlement date
    /// and sum their trade amounts.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal_macros::dec;
    /// use settlement_report::aggregation::daily::SettlementAggregator;
    /// use settlement_report::core::instruction::{Direction, InstructionRecord};
    ///
    /// let day = NaiveDate::from_ymd_opt(2018, 7, 24).unwrap();
    /// let batch = vec![
    ///     InstructionRecord::new("foo", Direction::Outgoing, "USD", day, day)
    ///         .with_unit_price(dec!(10))
    ///         .into_instruction()
    ///         .unwrap(),
    /// ];
    ///
    /// let outgoing =
    ///     SettlementAggregator::aggregate_by_date(&batch, Direction::Outgoing.predicate()).unwrap();
    /// assert_eq!(outgoing.get(&day), Some(dec!(10)));
    ///
    /// let incoming =
    ///     SettlementAggregator::aggregate_by_date(&batch, Direction::Incoming.predicate()).unwrap();
    /// assert_eq!(incoming.get(&day), None);
    /// ```
    pub fn aggregate_by_date<P>(
        instructions: &[TradeInstruction],
        predicate: P,
    ) -> Result<DailyTotals, AggregationError>
    where
        P: Fn(&TradeInstruction) -> bool,
    {
        debug!("aggregating {} instructions by settlement date", instructions.len());
        DailyTotals::from_entries(
            instructions
                .iter()
                .filter(|instruction| predicate(instruction))
                .map(|instruction| (instruction.settlement_date(), instruction.trade_amount())),
        )
    }

    /// Total trade amount of the accepted instructions settling on `date`.
    ///
    /// Returns zero, not `None`, when nothing matches.
    pub fn aggregate_for_date<P>(
        instructions: &[TradeInstruction],
        predicate: P,
        date: NaiveDate,
    ) -> Result<Decimal, AggregationError>
    where
        P: Fn(&TradeInstruction) -> bool,
    {
        let total = instructions
            .iter()
            .filter(|instruction| instruction.settlement_date() == date)
            .filter(|instruction| predicate(instruction))
            .try_fold(Decimal::ZERO, |sum, instruction| {
                sum.checked_add(instruction.trade_amount())
                    .ok_or(AggregationError::Overflow { date })
            })?;
        debug!("total amount for selected_date={} is {}", date, total);
        Ok(total)
    }
}
