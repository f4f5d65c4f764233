//! Weighted vote over member strategies.
//!
//! Every member decides on the same prefix; its weight is added to the
//! tally of the action it returned. The action with the strictly greatest
//! weight wins, and ties go to the earliest action in [`Action::PRIORITY`].

use std::sync::Arc;

use rand::RngCore;
use thiserror::Error;

use crate::domain::{Action, SeriesView};

use super::Strategy;

#[derive(Debug, Error, PartialEq)]
pub enum EnsembleError {
    #[error("ensemble needs at least one member")]
    Empty,
    #[error("got {weights} weights for {members} members")]
    WeightCountMismatch { members: usize, weights: usize },
    #[error("weight {weight} at position {index} must be finite and positive")]
    InvalidWeight { index: usize, weight: f64 },
}

/// Accumulated weight per action for one decision point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionTally {
    scores: [f64; 3],
}

impl ActionTally {
    pub fn add(&mut self, action: Action, weight: f64) {
        self.scores[action.index()] += weight;
    }

    pub fn score(&self, action: Action) -> f64 {
        self.scores[action.index()]
    }

    /// Highest-scoring action; ties resolve in [`Action::PRIORITY`] order.
    pub fn winner(&self) -> Action {
        let mut best = Action::PRIORITY[0];
        for action in Action::PRIORITY.into_iter().skip(1) {
            if self.score(action) > self.score(best) {
                best = action;
            }
        }
        best
    }
}

pub struct Ensemble {
    members: Vec<Arc<dyn Strategy>>,
    weights: Vec<f64>,
}

impl Ensemble {
    /// Weights default to uniform `1/N` when `None`.
    pub fn new(
        members: Vec<Arc<dyn Strategy>>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, EnsembleError> {
        if members.is_empty() {
            return Err(EnsembleError::Empty);
        }

        let weights = match weights {
            None => vec![1.0 / members.len() as f64; members.len()],
            Some(w) => {
                if w.len() != members.len() {
                    return Err(EnsembleError::WeightCountMismatch {
                        members: members.len(),
                        weights: w.len(),
                    });
                }
                if let Some((index, &weight)) = w
                    .iter()
                    .enumerate()
                    .find(|(_, w)| !w.is_finite() || **w <= 0.0)
                {
                    return Err(EnsembleError::InvalidWeight { index, weight });
                }
                w
            }
        };

        Ok(Self { members, weights })
    }

    pub fn uniform(members: Vec<Arc<dyn Strategy>>) -> Result<Self, EnsembleError> {
        Self::new(members, None)
    }

    pub fn members(&self) -> &[Arc<dyn Strategy>] {
        &self.members
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Collect every member's vote on `history`.
    pub fn tally(&self, history: &SeriesView<'_>, rng: &mut dyn RngCore) -> ActionTally {
        let mut tally = ActionTally::default();
        for (member, &weight) in self.members.iter().zip(&self.weights) {
            tally.add(member.decide(history, rng), weight);
        }
        tally
    }
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("Ensemble")
            .field("members", &names)
            .field("weights", &self.weights)
            .finish()
    }
}

impl Strategy for Ensemble {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn warmup_bars(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.warmup_bars())
            .max()
            .unwrap_or(0)
    }

    fn decide(&self, history: &SeriesView<'_>, rng: &mut dyn RngCore) -> Action {
        self.tally(history, rng).winner()
    }
}
