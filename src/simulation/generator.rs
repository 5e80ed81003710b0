//! Random instruction generation for demos and benchmarks.

use crate::core::currency::CurrencyCode;
use crate::core::entity::EntityId;
use crate::core::instruction::{Direction, InstructionRecord, TradeInstruction};
use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Largest gap generated between instruction and settlement date.
const MAX_SETTLEMENT_LAG_DAYS: i64 = 3;

/// Configuration for a random instruction set.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of instructions to generate.
    pub instruction_count: usize,
    /// Number of distinct entities.
    pub entity_count: usize,
    /// Currencies to draw from.
    pub currencies: Vec<CurrencyCode>,
    /// First possible instruction date.
    pub start_date: NaiveDate,
    /// Instruction dates fall in `start_date..start_date + span_days`.
    pub span_days: u32,
    pub min_units: i64,
    pub max_units: i64,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            instruction_count: 100,
            entity_count: 10,
            currencies: ["USD", "EUR", "GBP", "AED", "SAR"]
                .into_iter()
                .map(CurrencyCode::new)
                .collect(),
            start_date: NaiveDate::from_ymd_opt(2018, 7, 23).unwrap_or(NaiveDate::MIN),
            span_days: 14,
            min_units: 1,
            max_units: 1_000,
            min_price: Decimal::ONE,
            max_price: Decimal::from(500),
        }
    }
}

/// Generate random instructions with the thread-local RNG.
pub fn generate_instructions(config: &GeneratorConfig) -> Vec<TradeInstruction> {
    generate_instructions_with(&mut rand::thread_rng(), config)
}

/// Generate random instructions from the given RNG.
///
/// Returns an empty set when there are no entities or currencies to draw
/// from.
pub fn generate_instructions_with<G: Rng>(
    rng: &mut G,
    config: &GeneratorConfig,
) -> Vec<TradeInstruction> {
    if config.entity_count == 0 || config.currencies.is_empty() {
        warn!("generator has no entities or currencies, producing nothing");
        return Vec::new();
    }

    let entities: Vec<EntityId> = (0..config.entity_count)
        .map(|i| EntityId::new(format!("entity-{:03}", i)))
        .collect();

    let (min_units, max_units) = ordered(config.min_units.max(1), config.max_units.max(1));
    let (min_cents, max_cents) = ordered(cents(config.min_price), cents(config.max_price));
    let span = i64::from(config.span_days.max(1));

    let mut instructions = Vec::with_capacity(config.instruction_count);
    for _ in 0..config.instruction_count {
        let entity = entities[rng.gen_range(0..entities.len())].clone();
        let currency = config.currencies[rng.gen_range(0..config.currencies.len())].clone();
        let direction = if rng.gen_bool(0.5) {
            Direction::Outgoing
        } else {
            Direction::Incoming
        };

        let dates = config
            .start_date
            .checked_add_signed(Duration::days(rng.gen_range(0..span)))
            .and_then(|instruction_date| {
                instruction_date
                    .checked_add_signed(Duration::days(
                        rng.gen_range(0..=MAX_SETTLEMENT_LAG_DAYS),
                    ))
                    .map(|settlement_date| (instruction_date, settlement_date))
            });
        let Some((instruction_date, settlement_date)) = dates else {
            warn!(
                "skipping generated instruction: date out of range after {}",
                config.start_date
            );
            continue;
        };

        let record = InstructionRecord::new(
            entity,
            direction,
            currency,
            instruction_date,
            settlement_date,
        )
        .with_agreed_fx(Decimal::new(rng.gen_range(10..=200), 2))
        .with_unit_price(Decimal::new(rng.gen_range(min_cents..=max_cents), 2))
        .with_units(rng.gen_range(min_units..=max_units));

        match record.into_instruction() {
            Ok(instruction) => instructions.push(instruction),
            Err(e) => warn!("skipping generated instruction: {}", e),
        }
    }

    debug!("generated {} instructions", instructions.len());
    instructions
}

fn cents(price: Decimal) -> i64 {
    (price * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .unwrap_or(100)
        .max(1)
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
