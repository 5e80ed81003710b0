use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use rust_decimal::Decimal;
use settlement_report::aggregation::daily::{DailyTotals, SettlementAggregator};
use settlement_report::calendar::normalizer::SettlementNormalizer;
use settlement_report::calendar::policy::CalendarPolicy;
use settlement_report::core::currency::CurrencyCode;
use settlement_report::core::entity::EntityId;
use settlement_report::core::instruction::{Direction, InstructionRecord, TradeInstruction};
use settlement_report::ranking::ranker::assign_dense_ranks;
use std::collections::HashMap;

/// A date within a few years of 2018.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..2_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Currencies covering both calendars.
fn arb_currency() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(vec![
        CurrencyCode::new("AED"),
        CurrencyCode::new("SAR"),
        CurrencyCode::new("USD"),
        CurrencyCode::new("GBP"),
    ])
}

/// Entity from a small pool (to force repeated entities).
fn arb_entity() -> impl Strategy<Value = EntityId> {
    prop::sample::select(vec![
        EntityId::new("foo1"),
        EntityId::new("foo2"),
        EntityId::new("foo3"),
        EntityId::new("foo4"),
    ])
}

/// Amount in cents, 0.01 to 1,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_instruction() -> impl Strategy<Value = TradeInstruction> {
    (
        arb_entity(),
        any::<bool>(),
        arb_currency(),
        arb_date(),
        1i64..1_000,
        arb_amount(),
    )
        .prop_map(|(entity, buy, currency, settles, units, price)| {
            let direction = if buy { Direction::Outgoing } else { Direction::Incoming };
            InstructionRecord::new(entity, direction, currency, settles, settles)
                .with_units(units)
                .with_unit_price(price)
                .into_instruction()
                .unwrap()
        })
}

fn arb_daily_totals() -> impl Strategy<Value = DailyTotals> {
    prop::collection::vec((arb_date(), arb_amount()), 0..20)
        .prop_map(|rows| DailyTotals::from_entries(rows).unwrap())
}

proptest! {
    // ===================================================================
    // Calendar: operational weekdays per currency.
    // ===================================================================
    #[test]
    fn gulf_and_default_weeks(currency in arb_currency(), date in arb_date()) {
        let policy = CalendarPolicy::for_currency(&currency);
        let weekday = date.weekday();
        let expected = match currency.as_str() {
            "AED" | "SAR" => !matches!(weekday, Weekday::Fri | Weekday::Sat),
            _ => !matches!(weekday, Weekday::Sat | Weekday::Sun),
        };
        prop_assert_eq!(policy.is_operational_day(date), expected);
    }

    // ===================================================================
    // Calendar: next operational day is the earliest operational date >= d.
    // ===================================================================
    #[test]
    fn next_operational_day_is_earliest(currency in arb_currency(), date in arb_date()) {
        let policy = CalendarPolicy::for_currency(&currency);
        let next = policy.next_operational_day(date).unwrap();

        prop_assert!(next >= date);
        prop_assert!(policy.is_operational_day(next));
        if policy.is_operational_day(date) {
            prop_assert_eq!(next, date);
        }
        for skipped in date.iter_days().take_while(|d| *d < next) {
            prop_assert!(!policy.is_operational_day(skipped));
        }
    }

    // ===================================================================
    // Normalizer: idempotent, note appended at most once.
    // ===================================================================
    #[test]
    fn normalize_is_idempotent(mut instruction in arb_instruction()) {
        let original = instruction.settlement_date();
        SettlementNormalizer::normalize(&mut instruction).unwrap();
        let once = instruction.clone();
        SettlementNormalizer::normalize(&mut instruction).unwrap();

        prop_assert_eq!(instruction.settlement_date(), once.settlement_date());
        prop_assert_eq!(instruction.audit_note(), once.audit_note());
        prop_assert_eq!(instruction.audit_note().len(), usize::from(original != once.settlement_date()));
    }

    // ===================================================================
    // Aggregation: merge is associative and commutative.
    // ===================================================================
    #[test]
    fn merge_is_associative(a in arb_daily_totals(), b in arb_daily_totals(), c in arb_daily_totals()) {
        let mut left = a.clone();
        left.merge(&b).unwrap();
        left.merge(&c).unwrap();

        let mut bc = b.clone();
        bc.merge(&c).unwrap();
        let mut right = a.clone();
        right.merge(&bc).unwrap();

        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_is_commutative(a in arb_daily_totals(), b in arb_daily_totals()) {
        let mut ab = a.clone();
        ab.merge(&b).unwrap();
        let mut ba = b.clone();
        ba.merge(&a).unwrap();
        prop_assert_eq!(ab, ba);
    }

    // ===================================================================
    // Aggregation: batch split does not change totals; per-date lookups
    // agree with the full map.
    // ===================================================================
    #[test]
    fn split_aggregation_matches_whole(
        instructions in prop::collection::vec(arb_instruction(), 0..40),
        split in 0usize..40,
    ) {
        let split = split.min(instructions.len());
        let (head, tail) = instructions.split_at(split);
        let predicate = Direction::Outgoing.predicate();

        let whole = SettlementAggregator::aggregate_by_date(&instructions, &predicate).unwrap();
        let mut parts = SettlementAggregator::aggregate_by_date(head, &predicate).unwrap();
        parts
            .merge(&SettlementAggregator::aggregate_by_date(tail, &predicate).unwrap())
            .unwrap();
        prop_assert_eq!(&parts, &whole);

        for (date, total) in whole.iter() {
            prop_assert_eq!(
                SettlementAggregator::aggregate_for_date(&instructions, &predicate, date),
                Ok(total)
            );
        }
    }

    // ===================================================================
    // Ranking: dense ranks 1..N, non-increasing totals.
    // ===================================================================
    #[test]
    fn ranks_are_dense_and_ordered(
        totals in prop::collection::hash_map(arb_entity(), arb_amount(), 0..4)
    ) {
        let totals: HashMap<EntityId, Decimal> = totals;
        let ranking = assign_dense_ranks(&totals);

        prop_assert_eq!(ranking.len(), totals.len());
        for (i, entry) in ranking.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
            prop_assert_eq!(Some(&entry.total), totals.get(&entry.entity));
        }
        for pair in ranking.entries().windows(2) {
            prop_assert!(pair[0].total >= pair[1].total);
            if pair[0].total == pair[1].total {
                prop_assert!(pair[0].entity < pair[1].entity);
            }
        }
    }
}
