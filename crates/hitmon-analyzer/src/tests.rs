use crate::calculators::threshold_window::{ThresholdWindowCalculator, ThresholdWindowSettings};
use crate::config::{MetricConfig, MetricConfigs, OutputMode, ThresholdWindowConfig};
use crate::registry::{MetricRegistry, RegistryStats};
use crate::{Calculator, Output};
use proptest::prelude::*;
use std::sync::Arc;

const SEC: i64 = 1_000_000_000;

fn make_config(metric: &str, name: &str, window_secs: u64, interval_secs: u64, output: OutputMode) -> MetricConfig {
    MetricConfig {
        metric: metric.into(),
        name: name.into(),
        threshold_window: Some(ThresholdWindowConfig {
            window_ms: window_secs * 1000,
            threshold: 50.0,
            sample_interval_ms: interval_secs * 1000,
            output,
        }),
    }
}

fn ratio_of(output: Option<Output>) -> f64 {
    match output {
        Some(Output::Derived(m)) => m.value,
        other => panic!("expected derived metric, got {other:?}"),
    }
}

#[test]
fn ratio_scenario_tracks_hits_within_window() {
    let metric = "/intel/procfs/cpu/all/active_percentage";
    let mut registry =
        MetricRegistry::new(vec![make_config(metric, "busy", 30, 5, OutputMode::Ratio)]).unwrap();

    let values = [50.0, 60.0, 0.0, 70.0, 80.0, 0.0, 90.0, 100.0];
    let ratios: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| ratio_of(registry.process_metric(i as i64 * 5 * SEC, metric, v)))
        .collect();

    // t=15 and t=30 each fill one missed slot; the inclusive boundary keeps
    // t=0 at t=30 and drops it at t=35.
    let expected: Vec<f64> = [1, 2, 2, 4, 5, 5, 7, 7].iter().map(|&n| n as f64 / 6.0).collect();
    assert_eq!(ratios, expected);
    assert_eq!(registry.calculator(metric).unwrap().hit_count(), 7);
}

#[test]
fn ratio_scenario_final_hits_lie_in_window() {
    let config = make_config("/cpu", "busy", 30, 5, OutputMode::Ratio);
    let settings =
        ThresholdWindowSettings::resolve(&config.metric, config.threshold_window.as_ref().unwrap()).unwrap();
    let mut calculator = ThresholdWindowCalculator::new(Arc::new(config), settings);

    for (i, v) in [50.0, 60.0, 0.0, 70.0, 80.0, 0.0, 90.0, 100.0].into_iter().enumerate() {
        calculator.update(i as i64 * 5 * SEC, v);
    }
    let hits: Vec<i64> = calculator.window().hits().iter().map(|t| t / SEC).collect();
    assert_eq!(hits, vec![5, 10, 15, 20, 25, 30, 35]);
}

#[test]
fn pattern_binding_is_memoized() {
    let mut registry =
        MetricRegistry::new(vec![make_config("/a/*/b", "busy", 30, 5, OutputMode::Ratio)]).unwrap();

    assert_eq!(ratio_of(registry.process_metric(0, "/a/x/b", 90.0)), 1.0 / 6.0);
    // A fresh tracker would report 1/6 again.
    assert_eq!(ratio_of(registry.process_metric(5 * SEC, "/a/x/b", 90.0)), 2.0 / 6.0);
    assert_eq!(registry.stats().bound, 1);

    // Another concrete name gets its own tracker from the same config.
    assert_eq!(ratio_of(registry.process_metric(5 * SEC, "/a/y/b", 90.0)), 1.0 / 6.0);
    assert_eq!(registry.stats().bound, 2);
    assert_eq!(registry.calculator("/a/x/b").unwrap().hit_count(), 2);
}

#[test]
fn unresolved_metric_is_never_tracked() {
    let mut registry = MetricRegistry::new(vec![
        make_config("/a/*/b", "busy", 30, 5, OutputMode::Ratio),
        make_config("/c/d", "busy", 30, 5, OutputMode::Ratio),
    ])
    .unwrap();

    for i in 0..5 {
        assert!(registry.process_metric(i * 5 * SEC, "/a/x/c", 90.0).is_none());
    }
    assert!(!registry.is_bound("/a/x/c"));
    assert!(registry.is_unresolved("/a/x/c"));
    assert_eq!(
        registry.stats(),
        RegistryStats {
            exact: 1,
            bound: 0,
            patterns: 1,
            unresolved: 1
        }
    );
}

#[test]
fn alert_mode_fires_once_per_metric() {
    let doc: MetricConfigs = serde_json::from_str(
        r#"{
            "alert_ratio": 0.5,
            "configs": [
                {"metric": "/intel/procfs/cpu/all/*", "name": "busy",
                 "threshold_window": {"window_ms": 80000, "threshold": 50, "sample_interval_ms": 5000,
                                      "output": {"mode": "alert"}}}
            ]
        }"#,
    )
    .unwrap();
    let mut registry = MetricRegistry::new(doc.into_resolved()).unwrap();

    let values = [50.0, 60.0, 0.0, 70.0, 80.0, 0.0, 90.0, 100.0];
    for metric in [
        "/intel/procfs/cpu/all/active_percentage",
        "/intel/procfs/cpu/all/iowait_percentage",
    ] {
        let alerts: Vec<(usize, Output)> = values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| {
                registry
                    .process_metric(i as i64 * 10 * SEC, metric, v)
                    .map(|o| (i, o))
            })
            .collect();

        // target = ceil(80 / 5 * 0.5) = 8, reached at t=40 with gap-filled hits
        assert_eq!(alerts.len(), 1, "{metric}");
        let (index, output) = &alerts[0];
        assert_eq!(*index, 4);
        assert!(matches!(output, Output::Alert(a) if a.hits == 9 && a.target == 8));
        assert_eq!(registry.calculator(metric).unwrap().hit_count(), 3);
    }
}

#[test]
fn config_is_shared_between_bound_trackers() {
    let mut registry =
        MetricRegistry::new(vec![make_config("/a/*", "busy", 30, 5, OutputMode::Ratio)]).unwrap();
    registry.process_metric(0, "/a/x", 1.0);
    registry.process_metric(0, "/a/y", 1.0);
    let x: &MetricConfig = registry.calculator("/a/x").unwrap().config();
    let y: &MetricConfig = registry.calculator("/a/y").unwrap().config();
    assert!(std::ptr::eq(x, y));
}

fn samples() -> impl Strategy<Value = Vec<(i64, f64)>> {
    // (step in whole seconds, value); steps of 0 exercise duplicate timestamps
    prop::collection::vec((0i64..40, 0.0f64..100.0), 1..80)
}

proptest! {
    #[test]
    fn retained_hits_stay_in_window(steps in samples()) {
        let config = make_config("/m", "busy", 30, 5, OutputMode::Ratio);
        let settings = ThresholdWindowSettings::resolve(
            &config.metric,
            config.threshold_window.as_ref().unwrap(),
        ).unwrap();
        let mut calculator = ThresholdWindowCalculator::new(Arc::new(config), settings);

        let mut now = 0;
        for (step, value) in steps {
            now += step * SEC;
            let before = calculator.hit_count();
            let output = calculator.update(now, value);
            let hits = calculator.window().hits();

            // Only hits prune; low samples leave the history as it was.
            if value >= 50.0 {
                prop_assert!(hits.iter().all(|&t| t >= now - 30 * SEC));
            }
            prop_assert!(hits.iter().zip(hits.iter().skip(1)).all(|(a, b)| a < b));

            let ratio = ratio_of(output);
            prop_assert_eq!(ratio, hits.len() as f64 / 6.0);

            if value >= 50.0 && (step > 0 || before == 0) {
                prop_assert_eq!(hits.back().copied(), Some(now));
                if hits.len() >= 2 {
                    let gap = hits[hits.len() - 1] - hits[hits.len() - 2];
                    prop_assert!(gap < 2 * 5 * SEC);
                }
            }
        }
    }

    #[test]
    fn alert_clears_history_and_rearms(steps in samples()) {
        let config = make_config("/m", "busy", 30, 5, OutputMode::Alert { alert_ratio: Some(0.5) });
        let settings = ThresholdWindowSettings::resolve(
            &config.metric,
            config.threshold_window.as_ref().unwrap(),
        ).unwrap();
        let mut calculator = ThresholdWindowCalculator::new(Arc::new(config), settings);

        let mut now = 0;
        for (step, value) in steps {
            now += step * SEC;
            match calculator.update(now, value) {
                Some(Output::Alert(alert)) => {
                    prop_assert!(alert.hits >= 3);
                    prop_assert_eq!(calculator.hit_count(), 0);
                }
                Some(other) => prop_assert!(false, "unexpected output {:?}", other),
                None => prop_assert!(calculator.hit_count() < 3),
            }
        }
    }
}
