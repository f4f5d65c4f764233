//! Order-`depth` Markov predictor over discretized close-to-close moves.
//!
//! The transition model is built once from a full series and is read-only
//! afterwards; it is shared behind an `Arc` so several backtests can read it
//! concurrently. Prediction draws from the injected random source only.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Action, Series, SeriesView};

use super::Strategy;

/// Discretized single-step price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceMove {
    Up,
    Down,
    Unchanged,
}

impl PriceMove {
    /// Fixed accumulation order used by sampling and arg-max.
    pub const ORDER: [PriceMove; 3] = [PriceMove::Up, PriceMove::Down, PriceMove::Unchanged];

    pub fn between(prev: f64, curr: f64) -> Self {
        if curr > prev {
            PriceMove::Up
        } else if curr < prev {
            PriceMove::Down
        } else {
            PriceMove::Unchanged
        }
    }

    pub fn index(self) -> usize {
        match self {
            PriceMove::Up => 0,
            PriceMove::Down => 1,
            PriceMove::Unchanged => 2,
        }
    }

    pub fn action(self) -> Action {
        match self {
            PriceMove::Up => Action::Buy,
            PriceMove::Down => Action::Sell,
            PriceMove::Unchanged => Action::Hold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PriceMove::Up => "Up",
            PriceMove::Down => "Down",
            PriceMove::Unchanged => "Unchanged",
        }
    }
}

impl fmt::Display for PriceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable composite key: `depth` consecutive moves, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Box<[PriceMove]>);

impl StateKey {
    pub fn new(moves: &[PriceMove]) -> Self {
        assert!(!moves.is_empty(), "state key must hold at least one move");
        Self(moves.into())
    }

    pub fn moves(&self) -> &[PriceMove] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// First (oldest) component; the fallback when sampling finds no state.
    pub fn first(&self) -> PriceMove {
        self.0[0]
    }

    /// Key formed from the last `depth` moves of `closes`, if long enough.
    pub fn trailing(closes: &[f64], depth: usize) -> Option<Self> {
        if depth == 0 || closes.len() < depth + 1 {
            return None;
        }
        let tail = &closes[closes.len() - depth - 1..];
        let moves: Vec<PriceMove> = tail
            .windows(2)
            .map(|w| PriceMove::between(w[0], w[1]))
            .collect();
        Some(Self(moves.into_boxed_slice()))
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            f.write_str(m.as_str())?;
        }
        Ok(())
    }
}

/// How a prediction is drawn from a probability row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    /// Inverse-CDF sampling with one uniform draw.
    #[default]
    Sample,
    /// Deterministic arg-max; ties keep the earlier state in [`PriceMove::ORDER`].
    MostLikely,
}

/// Normalized transition probabilities keyed by composite state.
///
/// Keys without any observed transition have no row and read as all-zero.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    depth: usize,
    rows: HashMap<StateKey, [f64; 3]>,
    transitions: usize,
}

impl TransitionModel {
    /// Count every `depth`-move window and its successor, then normalize.
    pub fn build(closes: &[f64], depth: usize) -> Self {
        assert!(depth >= 1, "Markov depth must be >= 1");

        let moves: Vec<PriceMove> = closes
            .windows(2)
            .map(|w| PriceMove::between(w[0], w[1]))
            .collect();

        let mut counts: HashMap<StateKey, [usize; 3]> = HashMap::new();
        let mut transitions = 0;
        for i in depth..moves.len() {
            let key = StateKey::new(&moves[i - depth..i]);
            counts.entry(key).or_insert([0; 3])[moves[i].index()] += 1;
            transitions += 1;
        }

        let rows = counts
            .into_iter()
            .map(|(key, row)| {
                let total: usize = row.iter().sum();
                let t = total as f64;
                (key, row.map(|c| c as f64 / t))
            })
            .collect();

        Self {
            depth,
            rows,
            transitions,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn row(&self, key: &StateKey) -> Option<&[f64; 3]> {
        self.rows.get(key)
    }

    /// Get-or-zero lookup.
    pub fn probability(&self, key: &StateKey, next: PriceMove) -> f64 {
        self.rows.get(key).map_or(0.0, |row| row[next.index()])
    }

    /// Observed keys in sorted order.
    pub fn observed_keys(&self) -> Vec<&StateKey> {
        let mut keys: Vec<&StateKey> = self.rows.keys().collect();
        keys.sort();
        keys
    }

    /// Number of transitions counted during build.
    pub fn transition_count(&self) -> usize {
        self.transitions
    }

    pub fn predict(&self, key: &StateKey, rng: &mut dyn RngCore, mode: PredictionMode) -> PriceMove {
        match mode {
            PredictionMode::Sample => self.sample(key, rng),
            PredictionMode::MostLikely => self.most_likely(key),
        }
    }

    fn sample(&self, key: &StateKey, rng: &mut dyn RngCore) -> PriceMove {
        // Draw first so unseen keys consume the same amount of randomness.
        let u: f64 = rng.gen();
        let Some(row) = self.rows.get(key) else {
            return key.first();
        };

        let mut cumulative = 0.0;
        for state in PriceMove::ORDER {
            cumulative += row[state.index()];
            if cumulative >= u {
                return state;
            }
        }
        key.first()
    }

    fn most_likely(&self, key: &StateKey) -> PriceMove {
        let mut best = PriceMove::Up;
        let mut max = 0.0;
        for state in PriceMove::ORDER {
            let p = self.probability(key, state);
            if p > max {
                max = p;
                best = state;
            }
        }
        best
    }
}

/// Strategy wrapper around a built [`TransitionModel`].
#[derive(Debug, Clone)]
pub struct MarkovStrategy {
    model: Arc<TransitionModel>,
    mode: PredictionMode,
}

impl MarkovStrategy {
    pub fn new(model: Arc<TransitionModel>, mode: PredictionMode) -> Self {
        Self { model, mode }
    }

    /// Build a model over every close in `series`.
    ///
    /// The resulting model has seen bars that a later backtest over the same
    /// series will trade on.
    pub fn fit(series: &Series, depth: usize, mode: PredictionMode) -> Self {
        let model = TransitionModel::build(series.closes(), depth);
        debug!(
            ticker = series.ticker(),
            depth,
            keys = model.rows.len(),
            transitions = model.transition_count(),
            "built transition model"
        );
        Self::new(Arc::new(model), mode)
    }

    pub fn model(&self) -> &Arc<TransitionModel> {
        &self.model
    }

    pub fn mode(&self) -> PredictionMode {
        self.mode
    }
}

impl Strategy for MarkovStrategy {
    fn name(&self) -> &str {
        "markov"
    }

    fn warmup_bars(&self) -> usize {
        self.model.depth + 1
    }

    fn decide(&self, history: &SeriesView<'_>, rng: &mut dyn RngCore) -> Action {
        match StateKey::trailing(history.closes(), self.model.depth) {
            Some(key) => self.model.predict(&key, rng, self.mode).action(),
            None => Action::Hold,
        }
    }
}
