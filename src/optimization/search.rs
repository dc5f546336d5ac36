//! Exhaustive dose grid search

use thiserror::Error;
use tracing::debug;

use crate::predictor::{PredictorError, YieldPredictor};
use crate::types::{Dose, DoseGrid, EnvironmentContext, PredictionQuery, SearchResult};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("Search target must be finite, got {0}")]
    InvalidTarget(f64),

    #[error(transparent)]
    Predictor(#[from] PredictorError),
}

/// Enumerates every dose on a fixed grid and picks the one whose predicted
/// yield meets the target with the least surplus.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseSearchEngine {
    grid: DoseGrid,
}

impl DoseSearchEngine {
    pub const fn new(grid: DoseGrid) -> Self {
        Self { grid }
    }

    pub const fn grid(&self) -> &DoseGrid {
        &self.grid
    }

    /// Search the whole grid for the lowest predicted yield that is still
    /// `>= target`.
    ///
    /// Every candidate is evaluated; there is no early exit. A later candidate
    /// replaces the current best only when its yield is strictly lower, so
    /// among equal yields the first one enumerated (N, then P, then K,
    /// ascending) wins. Predictor errors abort the search and propagate, and
    /// so does a non-finite prediction from any predictor.
    pub fn search<P>(
        &self,
        target: f64,
        context: &EnvironmentContext,
        predictor: &P,
    ) -> Result<SearchResult, SearchError>
    where
        P: YieldPredictor + ?Sized,
    {
        if !target.is_finite() {
            return Err(SearchError::InvalidTarget(target));
        }

        let mut best: Option<(Dose, f64)> = None;
        let mut evaluated = 0usize;

        for dose in self.grid.candidates() {
            let predicted = predictor.predict(&PredictionQuery::new(dose, *context))?;
            if !predicted.is_finite() {
                return Err(PredictorError::NonFinite { value: predicted }.into());
            }
            evaluated += 1;

            if predicted < target {
                continue;
            }
            match best {
                Some((_, best_yield)) if predicted >= best_yield => {}
                _ => best = Some((dose, predicted)),
            }
        }

        let result = match best {
            Some((dose, achieved_yield)) => SearchResult {
                dose: Some(dose),
                achieved_yield,
                candidates_evaluated: evaluated,
            },
            None => SearchResult::infeasible(evaluated),
        };

        debug!(
            predictor = predictor.name(),
            target,
            evaluated,
            dose = ?result.dose,
            achieved_yield = result.achieved_yield,
            "Dose search complete"
        );
        Ok(result)
    }
}
