use crate::aggregation::daily::DailyTotals;
use crate::ranking::ranker::Ranking;
use std::fmt;

const KEY_WIDTH: usize = 17;
const VALUE_WIDTH: usize = 22;

/// Final settlement figures of a run, ready to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementReport {
    pub incoming: DailyTotals,
    pub outgoing: DailyTotals,
    pub incoming_ranking: Ranking,
    pub outgoing_ranking: Ranking,
}

impl SettlementReport {
    pub fn new(
        incoming: DailyTotals,
        outgoing: DailyTotals,
        incoming_ranking: Ranking,
        outgoing_ranking: Ranking,
    ) -> Self {
        Self {
            incoming,
            outgoing,
            incoming_ranking,
            outgoing_ranking,
        }
    }

    /// The four report tables, each as a separate text block.
    pub fn tables(&self) -> Vec<String> {
        vec![
            daily_table("Incoming Daily Amount", &self.incoming),
            daily_table("Outgoing Daily Amount", &self.outgoing),
            ranking_table("Incoming Ranking", &self.incoming_ranking),
            ranking_table("Outgoing Ranking", &self.outgoing_ranking),
        ]
    }
}

impl fmt::Display for SettlementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in self.tables() {
            write!(f, "{}", table)?;
        }
        Ok(())
    }
}

fn daily_table(title: &str, totals: &DailyTotals) -> String {
    let rows = totals
        .iter()
        .map(|(date, amount)| (date.to_string(), format!("{:.2}", amount)));
    render_table(title, "Date", "Trade Amount", rows)
}

fn ranking_table(title: &str, ranking: &Ranking) -> String {
    let rows = ranking
        .iter()
        .map(|entry| (entry.entity.to_string(), entry.rank.to_string()));
    render_table(title, "Entity", "Rank", rows)
}

/// Columns are at least `KEY_WIDTH` / `VALUE_WIDTH` wide and grow to fit
/// the longest cell, so every line of one table has the same width.
fn render_table<I>(title: &str, key_header: &str, value_header: &str, rows: I) -> String
where
    I: Iterator<Item = (String, String)>,
{
    let rows: Vec<(String, String)> = rows.collect();
    let kw = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain([KEY_WIDTH, key_header.chars().count()])
        .max()
        .unwrap_or(KEY_WIDTH);
    let vw = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .chain([VALUE_WIDTH, value_header.chars().count()])
        .max()
        .unwrap_or(VALUE_WIDTH);
    let width = (kw + 1 + vw).max(title.chars().count());
    let vw = width - kw - 1;

    let rule = "-".repeat(width);
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("{:^w$}\n", title, w = width));
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("{:^kw$}|{:^vw$}\n", key_header, value_header));
    out.push_str(&format!("{}+{}\n", "-".repeat(kw), "-".repeat(vw)));
    for (key, value) in &rows {
        out.push_str(&format!("{:^kw$}|{:^vw$}\n", key, value));
    }
    out
}
