//! Property-based tests for window aggregation and bar layout
//!
//! - Counts partition the selected episodes
//! - Absent categories are zero-filled
//! - Uncertainty is exactly 2 * sqrt(count)
//! - Row windows past the end never clip
//! - Grouped bars never overlap and stay centered under their tick

use episode_outcomes::aggregate::{
    AddressingMode, OutcomeCategory, Window, WindowAggregate, WindowAggregator, CATEGORY_COUNT,
};
use episode_outcomes::compare::{BarLayout, Series, GROUP_SPAN};
use episode_outcomes::storage::LogTable;
use episode_outcomes::Error;
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Log of shuffled-ish episode indices with valid outcome codes
fn arb_log() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    (1usize..300).prop_flat_map(|rows| {
        (
            proptest::collection::vec(0i64..400, rows),
            proptest::collection::vec(0i64..6, rows),
        )
    })
}

fn arb_window() -> impl Strategy<Value = Window> {
    (-50i64..400, 1i64..300).prop_map(|(start, interval)| Window::from_interval(start, interval).unwrap())
}

fn table(episodes: Vec<i64>, codes: Vec<i64>) -> LogTable {
    LogTable::from_columns(vec![("episode", episodes), ("outcome", codes)]).unwrap()
}

fn outcome_counts(aggregate: &WindowAggregate) -> Vec<u64> {
    match aggregate {
        WindowAggregate::Outcomes { counts, .. } => counts.as_array().to_vec(),
        WindowAggregate::Successes(_) => panic!("expected outcome counts"),
    }
}

// ============================================================================
// Aggregation Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: category counts sum to the number of episodes in the window
    #[test]
    fn prop_counts_sum_to_selected((episodes, codes) in arb_log(), window in arb_window()) {
        let expected = episodes.iter().filter(|&&e| window.contains(e)).count() as u64;
        let aggregate = WindowAggregator::new(AddressingMode::EpisodeIndexed)
            .aggregate(&table(episodes, codes), window)
            .unwrap();

        prop_assert_eq!(aggregate.total(), expected);
        prop_assert_eq!(outcome_counts(&aggregate).len(), CATEGORY_COUNT);
    }

    /// Property: a category never observed in the window counts zero
    #[test]
    fn prop_absent_categories_zero_filled((episodes, codes) in arb_log(), window in arb_window()) {
        let observed: Vec<i64> = episodes
            .iter()
            .zip(&codes)
            .filter(|(e, _)| window.contains(**e))
            .map(|(_, &c)| c)
            .collect();
        let aggregate = WindowAggregator::new(AddressingMode::EpisodeIndexed)
            .aggregate(&table(episodes, codes), window)
            .unwrap();

        for (category, count) in OutcomeCategory::ALL.iter().zip(outcome_counts(&aggregate)) {
            if !observed.contains(&category.code()) {
                prop_assert_eq!(count, 0);
            }
        }
    }

    /// Property: uncertainty is exactly 2 * sqrt(count) per category
    #[test]
    fn prop_uncertainty_exact((episodes, codes) in arb_log(), window in arb_window()) {
        let aggregate = WindowAggregator::new(AddressingMode::EpisodeIndexed)
            .with_uncertainty(true)
            .aggregate(&table(episodes, codes), window)
            .unwrap();
        let bands = aggregate.uncertainty().unwrap();

        for (count, band) in aggregate.values().iter().zip(&bands) {
            #[allow(clippy::cast_precision_loss)]
            let expected = 2.0 * (*count as f64).sqrt();
            prop_assert!((band - expected).abs() <= f64::EPSILON * expected.max(1.0));
        }
    }

    /// Property: aggregation is idempotent
    #[test]
    fn prop_aggregation_idempotent((episodes, codes) in arb_log(), window in arb_window()) {
        let log = table(episodes, codes);
        let aggregator = WindowAggregator::new(AddressingMode::EpisodeIndexed).with_uncertainty(true);

        prop_assert_eq!(
            aggregator.aggregate(&log, window).unwrap(),
            aggregator.aggregate(&log, window).unwrap()
        );
    }

    /// Property: row windows past the end are range errors, inside ones sum the flag
    #[test]
    fn prop_row_window_range(flags in proptest::collection::vec(0i64..2, 1..300), start in 0i64..300, interval in 1i64..300) {
        let len = flags.len();
        let window = Window::from_interval(start, interval).unwrap();
        let log = LogTable::from_columns(vec![("success", flags.clone())]).unwrap();
        let result = WindowAggregator::new(AddressingMode::RowIndexed).aggregate(&log, window);

        if window.end() > len as i64 {
            let is_range_error = matches!(result, Err(Error::Range { .. }));
            prop_assert!(is_range_error);
        } else {
            let rows = start as usize..window.end() as usize;
            let expected: i64 = flags[rows].iter().sum();
            prop_assert_eq!(result.unwrap(), WindowAggregate::Successes(expected as u64));
        }
    }
}

// ============================================================================
// Layout Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: width = 0.8 / N, centers at i + k * width, tick at group middle
    #[test]
    fn prop_grouped_layout_formulas(n in 1usize..8, categories in 1usize..8) {
        let layout = BarLayout::Grouped { series: n, categories };
        let width = GROUP_SPAN / n as f64;
        prop_assert!((layout.bar_width() - width).abs() < 1e-12);

        for i in 0..categories {
            let tick = i as f64 + (n - 1) as f64 * width / 2.0;
            prop_assert!((layout.tick(i) - tick).abs() < 1e-12);

            let first = layout.center(0, i);
            let last = layout.center(n - 1, i);
            prop_assert!(((first + last) / 2.0 - layout.tick(i)).abs() < 1e-12);

            for k in 1..n {
                let gap = layout.center(k, i) - layout.center(k - 1, i);
                prop_assert!(gap + 1e-12 >= width);
            }
        }
    }

    /// Property: one bar per (series, category), none outside its slot span
    #[test]
    fn prop_grouped_bars_stay_in_slot(n in 1usize..6) {
        let series: Vec<Series> = (0..n)
            .map(|k| Series::new(format!("run_{k}"), vec![k as u64; CATEGORY_COUNT]))
            .collect();
        let layout = BarLayout::Grouped { series: n, categories: CATEGORY_COUNT };
        let bars = layout.bars(&series);

        prop_assert_eq!(bars.len(), n * CATEGORY_COUNT);
        for bar in &bars {
            let slot = bar.slot as f64;
            prop_assert!(bar.left() >= slot - layout.bar_width() / 2.0 - 1e-12);
            prop_assert!(bar.right() <= slot + GROUP_SPAN - layout.bar_width() / 2.0 + 1e-12);
            prop_assert_eq!(bar.height, bar.series as u64);
        }
    }
}
