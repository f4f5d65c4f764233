//! In-memory bar storage keyed by ticker.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::{Bar, Series, Ticker};

use super::DataError;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    bars: HashMap<Ticker, Vec<Bar>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bars, keeping each ticker ordered by timestamp. A bar whose
    /// timestamp is already stored for its ticker replaces the stored one.
    pub fn save(&mut self, bars: &[Bar]) {
        for bar in bars {
            let stored = self.bars.entry(bar.ticker.clone()).or_default();
            match stored.binary_search_by_key(&bar.timestamp, |b| b.timestamp) {
                Ok(pos) => stored[pos] = bar.clone(),
                Err(pos) => stored.insert(pos, bar.clone()),
            }
        }
    }

    /// Bars for `ticker` with `start <= timestamp <= end`.
    pub fn load(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let found: Vec<Bar> = self
            .bars
            .get(ticker)
            .into_iter()
            .flatten()
            .filter(|b| b.timestamp >= start && b.timestamp <= end)
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(DataError::NotFound {
                ticker: ticker.to_string(),
            });
        }
        Ok(found)
    }

    /// Every stored bar for `ticker` as a series.
    pub fn to_series(&self, ticker: &str) -> Result<Series, DataError> {
        match self.bars.get(ticker) {
            Some(bars) if !bars.is_empty() => Ok(Series::from_bars(bars)?),
            _ => Err(DataError::NotFound {
                ticker: ticker.to_string(),
            }),
        }
    }

    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.bars.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }

    pub fn len(&self, ticker: &str) -> usize {
        self.bars.get(ticker).map_or(0, Vec::len)
    }
}
