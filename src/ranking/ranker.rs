use crate::core::entity::EntityId;
use crate::core::instruction::TradeInstruction;
use log::{debug, error};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors arising from entity ranking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("no client instructions were supplied for ranking")]
    EmptyInput,
    #[error("total trade amount for entity {entity} overflows")]
    Overflow { entity: EntityId },
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntity {
    pub entity: EntityId,
    /// 1-based; rank 1 has the largest total.
    pub rank: usize,
    pub total: Decimal,
}

/// Dense ranking of entities by total traded amount.
///
/// Entries are held in ascending rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    entries: Vec<RankedEntity>,
    index: HashMap<EntityId, usize>,
}

impl Ranking {
    fn from_entries(entries: Vec<RankedEntity>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.entity.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// Rank of `entity`, if it appears in the ranking.
    pub fn rank(&self, entity: &EntityId) -> Option<usize> {
        self.get(entity).map(|e| e.rank)
    }

    pub fn get(&self, entity: &EntityId) -> Option<&RankedEntity> {
        self.index.get(entity).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[RankedEntity] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntity> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Ranking {
    type Item = &'a RankedEntity;
    type IntoIter = std::slice::Iter<'a, RankedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{:>4}  {}  {}", entry.rank, entry.entity, entry.total)?;
        }
        Ok(())
    }
}

/// Rank a snapshot of per-entity totals.
///
/// Highest total gets rank 1. Equal totals are ordered by ascending
/// entity identifier, so the result never depends on map iteration order.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use settlement_report::core::entity::EntityId;
/// use settlement_report::ranking::ranker::assign_dense_ranks;
/// use std::collections::HashMap;
///
/// let totals: HashMap<EntityId, _> = [
///     (EntityId::new("b"), dec!(10)),
///     (EntityId::new("a"), dec!(10)),
///     (EntityId::new("c"), dec!(99)),
/// ]
/// .into_iter()
/// .collect();
///
/// let ranking = assign_dense_ranks(&totals);
/// assert_eq!(ranking.rank(&EntityId::new("c")), Some(1));
/// assert_eq!(ranking.rank(&EntityId::new("a")), Some(2));
/// assert_eq!(ranking.rank(&EntityId::new("b")), Some(3));
/// ```
pub fn assign_dense_ranks(totals: &HashMap<EntityId, Decimal>) -> Ranking {
    let mut ordered: Vec<(&EntityId, &Decimal)> = totals.iter().collect();
    ordered.sort_by(|(a_id, a_total), (b_id, b_total)| {
        b_total.cmp(a_total).then_with(|| a_id.cmp(b_id))
    });

    let entries = ordered
        .into_iter()
        .enumerate()
        .map(|(i, (entity, total))| RankedEntity {
            entity: entity.clone(),
            rank: i + 1,
            total: *total,
        })
        .collect();
    Ranking::from_entries(entries)
}

/// Ranks entities by cumulative traded amount.
///
/// Totals persist across calls on the same ranker, so each call ranks
/// everything seen so far. Use one ranker per direction.
#[derive(Debug, Clone, Default)]
pub struct EntityRanker {
    totals: HashMap<EntityId, Decimal>,
}

impl EntityRanker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the accepted instructions into the running totals, then rank
    /// the cumulative totals.
    ///
    /// `None` is rejected with [`RankingError::EmptyInput`]. An empty slice
    /// is fine and only re-ranks what was accumulated before.
    pub fn evaluate_ranking<P>(
        &mut self,
        instructions: Option<&[TradeInstruction]>,
        predicate: P,
    ) -> Result<Ranking, RankingError>
    where
        P: Fn(&TradeInstruction) -> bool,
    {
        let instructions = instructions.ok_or_else(|| {
            error!("ranking requested without instructions");
            RankingError::EmptyInput
        })?;

        self.accumulate(instructions, predicate)?;
        let ranking = self.ranking();
        debug!("entity ranking completed for {} entities", ranking.len());
        Ok(ranking)
    }

    /// Add the trade amounts of the accepted instructions to the totals.
    ///
    /// Stops at the first entity whose total would overflow, leaving that
    /// entity's total unchanged.
    pub fn accumulate<P>(
        &mut self,
        instructions: &[TradeInstruction],
        predicate: P,
    ) -> Result<(), RankingError>
    where
        P: Fn(&TradeInstruction) -> bool,
    {
        for instruction in instructions.iter().filter(|i| predicate(i)) {
            let total = self
                .totals
                .entry(instruction.entity().clone())
                .or_insert(Decimal::ZERO);
            *total = total.checked_add(instruction.trade_amount()).ok_or_else(|| {
                RankingError::Overflow {
                    entity: instruction.entity().clone(),
                }
            })?;
        }
        Ok(())
    }

    /// Ranking of the current totals.
    pub fn ranking(&self) -> Ranking {
        assign_dense_ranks(&self.totals)
    }

    pub fn totals(&self) -> &HashMap<EntityId, Decimal> {
        &self.totals
    }

    pub fn total(&self, entity: &EntityId) -> Decimal {
        self.totals.get(entity).copied().unwrap_or(Decimal::ZERO)
    }
}
