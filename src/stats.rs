//! Suite-level derived statistics.
//!
//! Undefined metrics are `None`, never 0 and never a propagated NaN: a
//! suite where every run of a mode timed out has no mean, and a speedup
//! over a missing or zero-time sample has no value.

use crate::schema::SuiteLog;
use std::collections::BTreeMap;

/// Geometric-mean speedup of mode `y` over mode `x`: the geometric mean of
/// `time(x)/time(y)` across all benchmarks.
///
/// Computed as `exp(mean(ln(ratio)))` so long suites cannot overflow the
/// running product. `None` if the log is empty or any benchmark lacks a
/// successful record for either mode, or has a non-positive time on
/// either side: a zero sample has no log-space ratio in one direction or
/// the other, and `speedup(x,y) == 1/speedup(y,x)` must hold.
pub fn geo_mean_speedup(log: &SuiteLog, x: &str, y: &str) -> Option<f64> {
    if log.is_empty() {
        return None;
    }
    let mut ln_sum = 0.0;
    for stat in log {
        let tx = stat.solve_time(x)?;
        let ty = stat.solve_time(y)?;
        if ty <= 0.0 || tx <= 0.0 {
            return None;
        }
        ln_sum += (tx / ty).ln();
    }
    Some((ln_sum / log.len() as f64).exp())
}

/// Arithmetic mean of `solve_iters` per mode, each mode averaged over the
/// subset of benchmarks with a successful record for it.
///
/// Modes with no successful record anywhere are absent from the map.
pub fn mean_iters(log: &SuiteLog) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for stat in log {
        for mode in stat.modes.keys() {
            if let Some(iters) = stat.solve_iters(mode) {
                let entry = sums.entry(mode.clone()).or_insert((0, 0));
                entry.0 += iters;
                entry.1 += 1;
            }
        }
    }
    sums.into_iter()
        .map(|(mode, (total, n))| (mode, total as f64 / n as f64))
        .collect()
}

/// Suite-aggregate throughput for one mode: total successful solve time
/// over total successful iterations, with both totals returned alongside.
///
/// A throughput-style ratio, not a per-benchmark average. `None` when no
/// benchmark contributed or the iteration total is zero.
pub fn time_per_iter(log: &SuiteLog, mode: &str) -> Option<(f64, u64, f64)> {
    let mut total_time = 0.0;
    let mut total_iters = 0u64;
    let mut samples = 0usize;
    for stat in log {
        if let (Some(time), Some(iters)) = (stat.solve_time(mode), stat.solve_iters(mode)) {
            total_time += time;
            total_iters += iters;
            samples += 1;
        }
    }
    if samples == 0 || total_iters == 0 {
        return None;
    }
    Some((total_time, total_iters, total_time / total_iters as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BenchmarkStat, ModeEntry, SuiteLog, TIMEOUT_MARKER};

    fn log_from_json(json: &str) -> SuiteLog {
        serde_json::from_str(json).unwrap()
    }

    fn two_mode_log() -> SuiteLog {
        log_from_json(
            r#"[
              {"kleene":{"solve_time":2.0,"solve_iters":4},"newton":{"solve_time":1.0,"solve_iters":2}},
              {"kleene":{"solve_time":4.0,"solve_iters":8},"newton":{"solve_time":2.0,"solve_iters":4}}
            ]"#,
        )
    }

    #[test]
    fn end_to_end_scenario() {
        let log = two_mode_log();
        assert_eq!(geo_mean_speedup(&log, "kleene", "newton"), Some(2.0));

        let means = mean_iters(&log);
        assert_eq!(means["kleene"], 6.0);
        assert_eq!(means["newton"], 3.0);

        let (time, iters, ratio) = time_per_iter(&log, "newton").unwrap();
        assert_eq!(time, 3.0);
        assert_eq!(iters, 6);
        assert_eq!(ratio, 0.5);
    }

    #[test]
    fn speedup_inverts_under_role_swap() {
        let log = two_mode_log();
        let forward = geo_mean_speedup(&log, "kleene", "newton").unwrap();
        let backward = geo_mean_speedup(&log, "newton", "kleene").unwrap();
        assert!((forward * backward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn speedup_against_itself_is_one() {
        let log = two_mode_log();
        assert_eq!(geo_mean_speedup(&log, "newton", "newton"), Some(1.0));
    }

    #[test]
    fn missing_or_timed_out_samples_leave_speedup_undefined() {
        let mut log = two_mode_log();
        log[1]
            .modes
            .insert("newton".into(), ModeEntry::Marker(TIMEOUT_MARKER.into()));
        assert_eq!(geo_mean_speedup(&log, "kleene", "newton"), None);
        assert_eq!(geo_mean_speedup(&Vec::new(), "kleene", "newton"), None);
    }

    #[test]
    fn zero_time_on_either_side_is_undefined_not_infinite() {
        let log = log_from_json(
            r#"[{"kleene":{"solve_time":2.0,"solve_iters":4},"newton":{"solve_time":0.0,"solve_iters":1}}]"#,
        );
        assert_eq!(geo_mean_speedup(&log, "kleene", "newton"), None);
        // Same in the other role, so the inversion property never divides
        // a defined value by an undefined one.
        assert_eq!(geo_mean_speedup(&log, "newton", "kleene"), None);
    }

    #[test]
    fn means_average_over_the_modes_present_subset() {
        let log = log_from_json(
            r#"[
              {"kleene":{"solve_time":2.0,"solve_iters":4},"newton":{"solve_time":1.0,"solve_iters":2}},
              {"newton":{"solve_time":2.0,"solve_iters":10}}
            ]"#,
        );
        let means = mean_iters(&log);
        assert_eq!(means["kleene"], 4.0);
        assert_eq!(means["newton"], 6.0);
    }

    #[test]
    fn fully_timed_out_mode_yields_no_metrics() {
        let mut stat = BenchmarkStat::new("x");
        stat.modes
            .insert("newton".into(), ModeEntry::Marker(TIMEOUT_MARKER.into()));
        let log = vec![stat];
        assert!(mean_iters(&log).is_empty());
        assert_eq!(time_per_iter(&log, "newton"), None);
    }

    #[test]
    fn comparator_seconds_have_no_iteration_metrics() {
        let log = log_from_json(r#"[{"newton":{"solve_time":1.0,"solve_iters":2},"polar":3.5}]"#);
        assert!(!mean_iters(&log).contains_key("polar"));
        assert_eq!(time_per_iter(&log, "polar"), None);
        // But comparator times still pair for speedups.
        assert_eq!(geo_mean_speedup(&log, "polar", "newton"), Some(3.5));
    }
}
