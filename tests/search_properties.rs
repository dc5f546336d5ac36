//! Dose Search Property Tests
//!
//! Checks the exhaustive search against brute-force enumeration of the grid:
//! coverage, eligibility, minimality, tie resolution and infeasibility, for
//! both a hand-computable linear response and a non-monotonic one. Also
//! checks that non-finite predictions and targets are refused.

use fertilizer_optimizer::{
    Dose, DoseGrid, DoseSearchEngine, EnvironmentContext, FertilizerAdvisor, FnPredictor,
    NutrientRange, OptimizationError, PredictionQuery, PredictorError, SearchError,
    YieldPredictor,
};
use std::sync::atomic::{AtomicUsize, Ordering};

fn field() -> EnvironmentContext {
    EnvironmentContext::new(6.5, 150.0, 7.0)
}

/// 0.01·N + 0.02·P + 0.015·K, computed on integers so grid yields are exact.
fn linear_response(q: &PredictionQuery) -> f64 {
    let d = q.dose;
    f64::from(10 * d.nitrogen + 20 * d.phosphorus + 15 * d.potassium) / 1000.0
}

/// Non-monotonic in every nutrient and sensitive to the field context.
fn wavy_response(q: &PredictionQuery) -> f64 {
    let [n, p, k, ph, rain, sun] = q.features();
    10.0 + 3.0 * (n / 17.0).sin() + 2.0 * (p / 11.0).cos() + (k - 70.0).powi(2) / 500.0
        - (ph - 6.5).abs()
        + rain / 100.0
        + sun / 10.0
}

/// Counts predictor calls.
struct CountingPredictor {
    calls: AtomicUsize,
}

impl YieldPredictor for CountingPredictor {
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(linear_response(query))
    }
}

/// Nitrogen-only response that hands back `Ok(NaN)` at one grid point,
/// bypassing the finiteness check `FnPredictor` applies.
struct GappyPredictor {
    gap: Dose,
}

impl YieldPredictor for GappyPredictor {
    fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictorError> {
        if query.dose == self.gap {
            Ok(f64::NAN)
        } else {
            Ok(f64::from(query.dose.nitrogen) / 10.0)
        }
    }
}

/// Brute-force reference: lowest eligible yield, first enumerated on ties.
fn brute_force(
    grid: &DoseGrid,
    target: f64,
    predict: impl Fn(&PredictionQuery) -> f64,
) -> Option<(Dose, f64)> {
    let mut best: Option<(Dose, f64)> = None;
    for dose in grid.candidates() {
        let y = predict(&PredictionQuery::new(dose, field()));
        if y >= target && best.map_or(true, |(_, b)| y < b) {
            best = Some((dose, y));
        }
    }
    best
}

// ============================================================================
// Grid Coverage
// ============================================================================

#[test]
fn default_grid_calls_predictor_270_times() {
    let predictor = CountingPredictor {
        calls: AtomicUsize::new(0),
    };
    let result = DoseSearchEngine::default()
        .search(4.0, &field(), &predictor)
        .unwrap();
    assert_eq!(predictor.calls.load(Ordering::Relaxed), 270);
    assert_eq!(result.candidates_evaluated, 270);
}

#[test]
fn feasible_search_still_scans_entire_grid() {
    let predictor = CountingPredictor {
        calls: AtomicUsize::new(0),
    };
    // The very first candidate already qualifies; no early exit allowed.
    DoseSearchEngine::default()
        .search(0.1, &field(), &predictor)
        .unwrap();
    assert_eq!(predictor.calls.load(Ordering::Relaxed), 270);
}

#[test]
fn coverage_tracks_grid_shape() {
    let grid = DoseGrid {
        nitrogen: NutrientRange::new(50, 200, 50),   // 50 100 150 200
        phosphorus: NutrientRange::new(20, 100, 40), // 20 60 100
        potassium: NutrientRange::new(20, 120, 25),  // 20 45 70 95 120
    };
    let predictor = CountingPredictor {
        calls: AtomicUsize::new(0),
    };
    let result = DoseSearchEngine::new(grid)
        .search(4.0, &field(), &predictor)
        .unwrap();
    assert_eq!(grid.candidate_count(), 60);
    assert_eq!(predictor.calls.load(Ordering::Relaxed), 60);
    assert_eq!(result.candidates_evaluated, 60);
}

// ============================================================================
// Hand-Computed Scenario
// ============================================================================

#[test]
fn linear_scenario_matches_hand_computation() {
    // 10N + 20P + 15K = 4000 is reachable at several grid points
    // (50/100/100, 90/80/100, 110/100/60, ...). All tie at exactly 4.0,
    // so the first in N-P-K order wins.
    let predictor = FnPredictor::new("linear", linear_response);
    let result = DoseSearchEngine::default()
        .search(4.0, &field(), &predictor)
        .unwrap();
    assert_eq!(result.dose, Some(Dose::new(50, 100, 100)));
    assert_eq!(result.achieved_yield(), Some(4.0));
}

#[test]
fn linear_scenario_between_grid_yields() {
    // 4.01 is not attainable on the grid; the answer is the next attainable
    // yield above it, first enumerated.
    let predictor = FnPredictor::new("linear", linear_response);
    let grid = DoseGrid::default();
    let result = DoseSearchEngine::new(grid)
        .search(4.01, &field(), &predictor)
        .unwrap();
    let expected = brute_force(&grid, 4.01, linear_response).unwrap();
    assert_eq!(result.dose, Some(expected.0));
    assert_eq!(result.achieved_yield, expected.1);
    assert!(result.achieved_yield >= 4.01);
}

// ============================================================================
// Eligibility & Minimality
// ============================================================================

#[test]
fn result_is_minimal_eligible_for_many_targets() {
    let grid = DoseGrid::default();
    let engine = DoseSearchEngine::new(grid);
    let predictor = FnPredictor::new("wavy", wavy_response);

    for i in 0..60 {
        let target = 8.0 + f64::from(i) * 0.25;
        let result = engine.search(target, &field(), &predictor).unwrap();
        let reference = brute_force(&grid, target, wavy_response);

        match (result.dose, reference) {
            (Some(dose), Some((ref_dose, ref_yield))) => {
                assert_eq!(dose, ref_dose, "target {target}");
                assert_eq!(result.achieved_yield, ref_yield);
                assert!(result.achieved_yield >= target);
                // No eligible candidate yields less.
                for c in grid.candidates() {
                    let y = wavy_response(&PredictionQuery::new(c, field()));
                    if y >= target {
                        assert!(result.achieved_yield <= y);
                    }
                }
            }
            (None, None) => assert_eq!(result.achieved_yield, 0.0),
            (got, want) => panic!("target {target}: got {got:?}, brute force {want:?}"),
        }
    }
}

#[test]
fn lowest_yield_wins_over_lowest_total_dose() {
    // Yield falls as nitrogen rises, so the minimal-surplus dose is a
    // heavy one even though lighter doses also clear the target.
    let predictor = FnPredictor::new("inverse", |q: &PredictionQuery| {
        20.0 - f64::from(q.dose.nitrogen) / 20.0
    });
    let result = DoseSearchEngine::default()
        .search(5.0, &field(), &predictor)
        .unwrap();
    // N=200 → 10.0 is the smallest yield still >= 5.0.
    assert_eq!(result.dose, Some(Dose::new(200, 20, 20)));
    assert_eq!(result.achieved_yield, 10.0);
}

#[test]
fn context_is_forwarded_to_predictor() {
    let predictor = FnPredictor::new("rain", |q: &PredictionQuery| {
        q.feature("Rainfall").unwrap_or(0.0) / 10.0 + f64::from(q.dose.potassium) / 100.0
    });
    let engine = DoseSearchEngine::default();
    let dry = engine
        .search(15.5, &EnvironmentContext::new(6.5, 150.0, 7.0), &predictor)
        .unwrap();
    let wet = engine
        .search(15.5, &EnvironmentContext::new(6.5, 160.0, 7.0), &predictor)
        .unwrap();
    // 15.0 + K/100 >= 15.5 → K=60 in the dry field; the wet field clears it at K=20.
    assert_eq!(dry.dose, Some(Dose::new(50, 20, 60)));
    assert_eq!(wet.dose, Some(Dose::new(50, 20, 20)));
}

// ============================================================================
// Infeasibility
// ============================================================================

#[test]
fn unreachable_target_yields_none_not_zero_dose() {
    let predictor = FnPredictor::new("linear", linear_response);
    let result = DoseSearchEngine::default()
        .search(10_000.0, &field(), &predictor)
        .unwrap();
    assert_eq!(result.dose, None);
    assert_ne!(result.dose, Some(Dose::new(0, 0, 0)));
    assert_eq!(result.achieved_yield(), None);
    assert_eq!(result.candidates_evaluated, 270);
}

#[test]
fn target_just_above_grid_maximum_is_infeasible() {
    let predictor = FnPredictor::new("linear", linear_response);
    // Max yield: 0.01·200 + 0.02·100 + 0.015·120 = 5.8
    let engine = DoseSearchEngine::default();
    assert!(engine.search(5.8, &field(), &predictor).unwrap().is_feasible());
    assert!(!engine.search(5.81, &field(), &predictor).unwrap().is_feasible());
}

// ============================================================================
// Non-Finite Values
// ============================================================================

#[test]
fn nan_prediction_aborts_search() {
    let predictor = GappyPredictor {
        gap: Dose::new(150, 20, 20),
    };
    let err = DoseSearchEngine::default()
        .search(12.0, &field(), &predictor)
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Predictor(PredictorError::NonFinite { .. })
    ));
}

#[test]
fn nan_at_last_candidate_is_never_returned() {
    let predictor = GappyPredictor {
        gap: Dose::new(200, 100, 120),
    };
    assert!(DoseSearchEngine::default()
        .search(0.5, &field(), &predictor)
        .is_err());
}

#[test]
fn nan_target_is_rejected() {
    let predictor = FnPredictor::new("linear", linear_response);
    let err = DoseSearchEngine::default()
        .search(f64::NAN, &field(), &predictor)
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidTarget(t) if t.is_nan()));
}

#[test]
fn advisor_surfaces_nan_prediction_as_predictor_error() {
    let predictor = GappyPredictor {
        gap: Dose::new(150, 20, 20),
    };
    let advisor = FertilizerAdvisor::default();
    let err = advisor
        .check_dose(&Dose::new(150, 20, 20), &field(), 12.0, &predictor)
        .unwrap_err();
    assert!(matches!(
        err,
        OptimizationError::Predictor(PredictorError::NonFinite { .. })
    ));
}
