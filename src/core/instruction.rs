use crate::core::currency::CurrencyCode;
use crate::core::entity::EntityId;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Separator placed between audit note entries when rendered.
pub const AUDIT_NOTE_DELIMITER: &str = "; ";

/// Errors arising from building a trade instruction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstructionError {
    #[error("instruction for entity {entity} has no settlement date")]
    MissingSettlementDate { entity: EntityId },
    #[error("unknown direction flag '{0}': expected B, BUY, S or SELL")]
    UnknownDirection(String),
    #[error("trade amount overflows for entity {entity}")]
    AmountOverflow { entity: EntityId },
}

/// Flow direction of an instruction.
///
/// A buy instruction is money leaving (outgoing); a sell instruction is
/// money arriving (incoming).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// The single-letter source flag (`S` for incoming, `B` for outgoing).
    pub fn flag(self) -> &'static str {
        match self {
            Direction::Incoming => "S",
            Direction::Outgoing => "B",
        }
    }

    /// A predicate selecting instructions flowing in this direction.
    pub fn predicate(self) -> impl Fn(&TradeInstruction) -> bool {
        move |instruction| instruction.direction() == self
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "Incoming"),
            Direction::Outgoing => write!(f, "Outgoing"),
        }
    }
}

impl FromStr for Direction {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" | "BUY" => Ok(Direction::Outgoing),
            "S" | "SELL" => Ok(Direction::Incoming),
            _ => Err(InstructionError::UnknownDirection(s.to_string())),
        }
    }
}

/// Append-only log of modifications made to an instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditNote {
    entries: Vec<String>,
}

impl AuditNote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AuditNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entries.join(AUDIT_NOTE_DELIMITER))
    }
}

/// A parsed input record, before defaults are applied.
///
/// Numeric fields are optional: absent or non-positive values fall back
/// to one when the record becomes a [`TradeInstruction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionRecord {
    pub entity: EntityId,
    pub direction: Direction,
    pub agreed_fx: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub units: Option<i64>,
    pub currency: CurrencyCode,
    pub instruction_date: NaiveDate,
    pub settlement_date: Option<NaiveDate>,
}

impl InstructionRecord {
    pub fn new(
        entity: impl Into<EntityId>,
        direction: Direction,
        currency: impl Into<CurrencyCode>,
        instruction_date: NaiveDate,
        settlement_date: impl Into<Option<NaiveDate>>,
    ) -> Self {
        Self {
            entity: entity.into(),
            direction,
            agreed_fx: None,
            unit_price: None,
            units: None,
            currency: currency.into(),
            instruction_date,
            settlement_date: settlement_date.into(),
        }
    }

    pub fn with_agreed_fx(mut self, agreed_fx: Decimal) -> Self {
        self.agreed_fx = Some(agreed_fx);
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn with_units(mut self, units: i64) -> Self {
        self.units = Some(units);
        self
    }

    /// Apply defaults and compute the trade amount.
    pub fn into_instruction(self) -> Result<TradeInstruction, InstructionError> {
        TradeInstruction::from_record(self)
    }
}

/// A client's instruction to buy or sell units of an entity.
///
/// Only the instruction date, settlement date and audit note change after
/// construction. The trade amount (`unit_price * units * agreed_fx`) is fixed
/// when the instruction is built.
///
/// Equality and hashing cover every trade field including the trade amount,
/// compared by value. The audit note is not part of identity.
///
/// Deserialization reads an [`InstructionRecord`], so defaults and the
/// trade amount are recomputed rather than trusted.
///
/// # Examples
///
/// ```
/// use settlement_report::core::instruction::{Direction, InstructionRecord};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2018, 7, 27).unwrap();
/// let instruction = InstructionRecord::new("foo", Direction::Outgoing, "SGP", date, date)
///     .with_agreed_fx(dec!(0.50))
///     .with_unit_price(dec!(100.25))
///     .with_units(200)
///     .into_instruction()
///     .unwrap();
///
/// assert_eq!(instruction.trade_amount(), dec!(10025));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InstructionRecord")]
pub struct TradeInstruction {
    entity: EntityId,
    direction: Direction,
    agreed_fx: Decimal,
    unit_price: Decimal,
    units: u64,
    trade_amount: Decimal,
    currency: CurrencyCode,
    instruction_date: NaiveDate,
    settlement_date: NaiveDate,
    audit_note: AuditNote,
}

impl TradeInstruction {
    /// Build an instruction from a parsed record.
    ///
    /// Fails when the record carries no settlement date.
    pub fn from_record(record: InstructionRecord) -> Result<Self, InstructionError> {
        let InstructionRecord {
            entity,
            direction,
            agreed_fx,
            unit_price,
            units,
            currency,
            instruction_date,
            settlement_date,
        } = record;

        let settlement_date = settlement_date.ok_or_else(|| {
            InstructionError::MissingSettlementDate {
                entity: entity.clone(),
            }
        })?;

        let agreed_fx = positive_or_one(agreed_fx, &entity, "agreed fx");
        let unit_price = positive_or_one(unit_price, &entity, "unit price");
        let units = match units {
            Some(n) if n > 0 => n as u64,
            Some(n) => {
                warn!("entity={} has non-positive units={}, defaulting to 1", entity, n);
                1
            }
            None => 1,
        };

        let trade_amount = unit_price
            .checked_mul(Decimal::from(units))
            .and_then(|amount| amount.checked_mul(agreed_fx))
            .ok_or_else(|| InstructionError::AmountOverflow {
                entity: entity.clone(),
            })?;

        Ok(Self {
            entity,
            direction,
            agreed_fx,
            unit_price,
            units,
            trade_amount,
            currency,
            instruction_date,
            settlement_date,
            audit_note: AuditNote::new(),
        })
    }

    // --- Accessors ---

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn agreed_fx(&self) -> Decimal {
        self.agreed_fx
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn units(&self) -> u64 {
        self.units
    }

    pub fn trade_amount(&self) -> Decimal {
        self.trade_amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn instruction_date(&self) -> NaiveDate {
        self.instruction_date
    }

    pub fn settlement_date(&self) -> NaiveDate {
        self.settlement_date
    }

    pub fn audit_note(&self) -> &AuditNote {
        &self.audit_note
    }

    // --- Mutable audit fields ---

    pub fn set_instruction_date(&mut self, date: NaiveDate) {
        self.instruction_date = date;
    }

    pub fn set_settlement_date(&mut self, date: NaiveDate) {
        self.settlement_date = date;
    }

    pub fn append_audit_note(&mut self, entry: impl Into<String>) {
        self.audit_note.append(entry);
    }
}

impl TryFrom<InstructionRecord> for TradeInstruction {
    type Error = InstructionError;

    fn try_from(record: InstructionRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

fn positive_or_one(value: Option<Decimal>, entity: &EntityId, field: &str) -> Decimal {
    match value {
        Some(v) if v > Decimal::ZERO => v,
        Some(v) => {
            warn!("entity={} has non-positive {}={}, defaulting to 1", entity, field, v);
            Decimal::ONE
        }
        None => Decimal::ONE,
    }
}

impl PartialEq for TradeInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
            && self.direction == other.direction
            && self.agreed_fx == other.agreed_fx
            && self.unit_price == other.unit_price
            && self.units == other.units
            && self.trade_amount == other.trade_amount
            && self.currency == other.currency
            && self.instruction_date == other.instruction_date
            && self.settlement_date == other.settlement_date
    }
}

impl Eq for TradeInstruction {}

// Decimal hashes by normalized value, so this agrees with `eq` above.
impl Hash for TradeInstruction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
        self.direction.hash(state);
        self.agreed_fx.hash(state);
        self.unit_price.hash(state);
        self.units.hash(state);
        self.trade_amount.hash(state);
        self.currency.hash(state);
        self.instruction_date.hash(state);
        self.settlement_date.hash(state);
    }
}

impl fmt::Display for TradeInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[entity={} direction={} agreed_fx={} currency={} instruction_date={} \
             settlement_date={} units={} unit_price={} trade_amount={} audit={}]",
            self.entity,
            self.direction,
            self.agreed_fx,
            self.currency,
            self.instruction_date,
            self.settlement_date,
            self.units,
            self.unit_price,
            self.trade_amount,
            self.audit_note,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_record() -> InstructionRecord {
        InstructionRecord::new(
            "foo",
            Direction::Outgoing,
            "AED",
            date(2018, 7, 1),
            date(2018, 7, 27),
        )
        .with_agreed_fx(dec!(0.50))
        .with_unit_price(dec!(100.25))
        .with_units(100)
    }

    #[test]
    fn test_trade_amount_computed_at_construction() {
        let instruction = sample_record().into_instruction().unwrap();
        assert_eq!(instruction.trade_amount(), dec!(5012.5));
        assert_eq!(instruction.units(), 100);
    }

    #[test]
    fn test_absent_values_default_to_one() {
        let instruction = InstructionRecord::new(
            "foo",
            Direction::Incoming,
            "USD",
            date(2018, 7, 1),
            date(2018, 7, 2),
        )
        .into_instruction()
        .unwrap();
        assert_eq!(instruction.agreed_fx(), Decimal::ONE);
        assert_eq!(instruction.unit_price(), Decimal::ONE);
        assert_eq!(instruction.units(), 1);
        assert_eq!(instruction.trade_amount(), Decimal::ONE);
    }

    #[test]
    fn test_non_positive_values_default_to_one() {
        let instruction = sample_record()
            .with_agreed_fx(dec!(-2))
            .with_unit_price(Decimal::ZERO)
            .with_units(-5)
            .into_instruction()
            .unwrap();
        assert_eq!(instruction.trade_amount(), Decimal::ONE);
    }

    #[test]
    fn test_missing_settlement_date_is_rejected() {
        let mut record = sample_record();
        record.settlement_date = None;
        assert_eq!(
            TradeInstruction::try_from(record),
            Err(InstructionError::MissingSettlementDate {
                entity: EntityId::new("foo")
            })
        );
    }

    #[test]
    fn test_settlement_change_keeps_trade_amount() {
        let mut instruction = sample_record().into_instruction().unwrap();
        instruction.set_settlement_date(date(2018, 7, 29));
        instruction.set_instruction_date(date(2018, 7, 2));
        assert_eq!(instruction.trade_amount(), dec!(5012.5));
        assert_eq!(instruction.settlement_date(), date(2018, 7, 29));
    }

    #[test]
    fn test_equality_is_by_value() {
        let a = sample_record().into_instruction().unwrap();
        let b = sample_record()
            .with_agreed_fx(dec!(0.5000))
            .into_instruction()
            .unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&b));

        let c = sample_record().with_units(101).into_instruction().unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_audit_note_does_not_affect_equality() {
        let a = sample_record().into_instruction().unwrap();
        let mut b = a.clone();
        b.append_audit_note("touched");
        assert_eq!(a, b);
        assert_eq!(b.audit_note().len(), 1);
    }

    #[test]
    fn test_audit_note_appends_with_delimiter() {
        let mut note = AuditNote::new();
        note.append("first");
        note.append("second");
        assert_eq!(note.to_string(), "first; second");
        assert_eq!(note.entries(), ["first", "second"]);
    }

    #[test]
    fn test_direction_flags() {
        assert_eq!("B".parse::<Direction>().unwrap(), Direction::Outgoing);
        assert_eq!("buy".parse::<Direction>().unwrap(), Direction::Outgoing);
        assert_eq!("S".parse::<Direction>().unwrap(), Direction::Incoming);
        assert_eq!(" Sell ".parse::<Direction>().unwrap(), Direction::Incoming);
        assert!("X".parse::<Direction>().is_err());
        assert_eq!(Direction::Outgoing.flag(), "B");
    }

    #[test]
    fn test_direction_predicate() {
        let outgoing = sample_record().into_instruction().unwrap();
        assert!(Direction::Outgoing.predicate()(&outgoing));
        assert!(!Direction::Incoming.predicate()(&outgoing));
    }

    #[test]
    fn test_deserialize_recomputes_trade_amount() {
        let json = r#"{
            "entity": "foo",
            "direction": "Outgoing",
            "agreed_fx": "-3",
            "unit_price": "0",
            "units": 0,
            "trade_amount": "999",
            "currency": "USD",
            "instruction_date": "2018-07-24",
            "settlement_date": "2018-07-24"
        }"#;
        let instruction: TradeInstruction = serde_json::from_str(json).unwrap();
        assert_eq!(instruction.agreed_fx(), Decimal::ONE);
        assert_eq!(instruction.unit_price(), Decimal::ONE);
        assert_eq!(instruction.units(), 1);
        assert_eq!(instruction.trade_amount(), Decimal::ONE);
    }

    #[test]
    fn test_deserialize_without_settlement_date_fails() {
        let json = r#"{
            "entity": "foo",
            "direction": "Incoming",
            "agreed_fx": null,
            "unit_price": null,
            "units": null,
            "currency": "USD",
            "instruction_date": "2018-07-24",
            "settlement_date": null
        }"#;
        assert!(serde_json::from_str::<TradeInstruction>(json).is_err());
    }

    #[test]
    fn test_serialized_instruction_reads_back_equal() {
        let instruction = sample_record().into_instruction().unwrap();
        let json = serde_json::to_string(&instruction).unwrap();
        let restored: TradeInstruction = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, instruction);
        assert_eq!(restored.trade_amount(), dec!(5012.5));
    }
}
