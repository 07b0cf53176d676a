//! Token usage accounting
//!
//! A per-session in-memory ledger: lifetime totals plus a rolling daily
//! history. Totals survive history pruning, so the cost estimate always
//! covers everything the session spent.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ModelOption;

const HISTORY_DAYS: i64 = 30;

/// One day of provider usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub date: NaiveDate,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub requests: u32,
}

/// Lifetime totals priced against a model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost: f64,
}

/// In-memory usage ledger
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    total_input: u64,
    total_output: u64,
    history: Vec<UsageRecord>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request's token counts against today's bucket and prune
    /// history older than thirty days.
    pub fn record(&mut self, input_tokens: u64, output_tokens: u64) {
        self.record_on(Utc::now().date_naive(), input_tokens, output_tokens);
    }

    fn record_on(&mut self, today: NaiveDate, input_tokens: u64, output_tokens: u64) {
        self.total_input += input_tokens;
        self.total_output += output_tokens;

        if let Some(record) = self.history.iter_mut().find(|r| r.date == today) {
            record.input_tokens += input_tokens;
            record.output_tokens += output_tokens;
            record.requests += 1;
        } else {
            self.history.push(UsageRecord {
                date: today,
                input_tokens,
                output_tokens,
                requests: 1,
            });
        }

        let cutoff = today - Duration::days(HISTORY_DAYS);
        self.history.retain(|r| r.date >= cutoff);
    }

    pub fn totals(&self, model: &ModelOption) -> UsageTotals {
        UsageTotals {
            input_tokens: self.total_input,
            output_tokens: self.total_output,
            estimated_cost: (self.total_input as f64 * model.cost_per_1k_input
                + self.total_output as f64 * model.cost_per_1k_output)
                / 1000.0,
        }
    }

    pub fn history(&self) -> &[UsageRecord] {
        &self.history
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
