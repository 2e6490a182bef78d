//! Suite profiles: which benchmarks a suite owns, how its analyzer is
//! invoked, and how its telemetry is shaped.
//!
//! Each suite is one variant of [`SuiteKind`], selected once at startup.
//! Everything suite-specific (argument protocol, payload shape, timeout,
//! comparator usage) hangs off the variant instead of being re-decided at
//! call sites.

use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock budget for the recurrence suite's analyzer runs.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Solver mode tags as they appear in suite logs.
pub mod mode {
    pub const KLEENE: &str = "kleene";
    pub const NEWTON: &str = "newton";
    pub const NEWTON_NAIVE: &str = "newton_naive";
    pub const POLAR: &str = "polar";
}

/// Shape of the analyzer's stdout payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Single line: the telemetry JSON object.
    Telemetry,
    /// Two lines: a qualitative result label, then the telemetry object.
    LabeledTelemetry,
}

/// A solver strategy the analyzer can be asked to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverMode {
    Kleene,
    Newton,
    NewtonNaive,
}

impl SolverMode {
    /// Tag used as the log key for this mode.
    pub fn tag(&self) -> &'static str {
        match self {
            SolverMode::Kleene => mode::KLEENE,
            SolverMode::Newton => mode::NEWTON,
            SolverMode::NewtonNaive => mode::NEWTON_NAIVE,
        }
    }

    /// Letter passed to the analyzer's `-m` flag.
    pub fn letter(&self) -> &'static str {
        match self {
            SolverMode::Kleene => "K",
            SolverMode::Newton => "N",
            SolverMode::NewtonNaive => "NN",
        }
    }
}

/// The five benchmark suites, in fixed reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteKind {
    /// Bayesian-inference analysis, matrix solver backend.
    BayesianInferenceMat,
    /// Bayesian-inference analysis, algebraic-decision-diagram backend.
    BayesianInferenceAdd,
    /// Higher-moment analysis of accumulated rewards.
    MomentOfReward,
    /// Expectation-invariant analysis.
    ExpectationInvariant,
    /// Expectation-recurrence analysis, compared against the Polar tool.
    ExpectationRecurrence,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 5] = [
        SuiteKind::BayesianInferenceMat,
        SuiteKind::BayesianInferenceAdd,
        SuiteKind::MomentOfReward,
        SuiteKind::ExpectationInvariant,
        SuiteKind::ExpectationRecurrence,
    ];

    /// Directory name of the suite, also used in log and artifact names.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SuiteKind::BayesianInferenceMat => "bayesian_inference_mat",
            SuiteKind::BayesianInferenceAdd => "bayesian_inference_add",
            SuiteKind::MomentOfReward => "moment_of_reward",
            SuiteKind::ExpectationInvariant => "expectation_invariant",
            SuiteKind::ExpectationRecurrence => "expectation_recurrence",
        }
    }

    /// Human-readable heading used by the report stage.
    pub fn title(&self) -> &'static str {
        match self {
            SuiteKind::BayesianInferenceMat => "Bayesian-inference Analysis (Matrix)",
            SuiteKind::BayesianInferenceAdd => {
                "Bayesian-inference Analysis (Algebraic-decision-diagram)"
            }
            SuiteKind::MomentOfReward => "Higher-moment Analysis of Accumulated Rewards",
            SuiteKind::ExpectationInvariant => "Expectation-invariant Analysis",
            SuiteKind::ExpectationRecurrence => "Expectation-recurrence Analysis",
        }
    }

    /// Benchmark directory under the corpus root.
    pub fn bench_dir(&self, bench_root: &Path) -> PathBuf {
        bench_root.join(self.dir_name()).join("benchmarks")
    }

    /// Curated sub-collection discovered ahead of the suite's top-level
    /// files, if the suite has one.
    pub fn sub_collection(&self) -> Option<&'static str> {
        match self {
            SuiteKind::ExpectationInvariant => Some("pldi18"),
            SuiteKind::ExpectationRecurrence => Some("oopsla22"),
            _ => None,
        }
    }

    /// Whether a benchmark spans several co-located files sharing a base
    /// name, so discovery must deduplicate by stripped extension.
    pub fn dedup_by_base_name(&self) -> bool {
        matches!(self, SuiteKind::ExpectationRecurrence)
    }

    /// Solver modes run for each benchmark, in invocation order.
    pub fn solver_modes(&self, with_naive_newton: bool) -> Vec<SolverMode> {
        match self {
            SuiteKind::ExpectationInvariant | SuiteKind::ExpectationRecurrence => {
                vec![SolverMode::Newton]
            }
            _ => {
                let mut modes = vec![SolverMode::Kleene];
                if with_naive_newton {
                    modes.push(SolverMode::NewtonNaive);
                }
                modes.push(SolverMode::Newton);
                modes
            }
        }
    }

    /// Extra search-depth bound passed to the analyzer, if any.
    pub fn depth(&self) -> Option<u32> {
        match self {
            SuiteKind::MomentOfReward => Some(2),
            _ => None,
        }
    }

    pub fn payload_shape(&self) -> PayloadShape {
        match self {
            SuiteKind::ExpectationInvariant => PayloadShape::LabeledTelemetry,
            _ => PayloadShape::Telemetry,
        }
    }

    /// Wall-clock budget for one analyzer invocation. Only the recurrence
    /// suite bounds its runs; timeouts there are an expected outcome.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            SuiteKind::ExpectationRecurrence => Some(DEFAULT_TIMEOUT),
            _ => None,
        }
    }

    /// Whether the suite also runs the external comparator tool, whose
    /// failure is fatal for the whole run.
    pub fn has_comparator(&self) -> bool {
        matches!(self, SuiteKind::ExpectationRecurrence)
    }

    /// Whether the suite records the benchmark name in its log entries.
    pub fn records_name(&self) -> bool {
        matches!(
            self,
            SuiteKind::ExpectationInvariant | SuiteKind::ExpectationRecurrence
        )
    }

    /// Analyzer executable under the analyzer build root.
    pub fn analyzer_path(&self, build_root: &Path) -> PathBuf {
        build_root.join(self.dir_name()).join("test.exe")
    }

    /// Persisted suite log location under the results directory.
    pub fn log_path(&self, results_dir: &Path) -> PathBuf {
        results_dir.join(format!("log_{}.json", self.dir_name()))
    }

    /// Scatter-plot artifact location under the results directory.
    pub fn scatter_path(&self, results_dir: &Path) -> PathBuf {
        results_dir.join(format!("{}.svg", self.dir_name()))
    }

    /// Auxiliary per-benchmark analyzer output file, for the one suite
    /// that captures results to disk as well as stdout.
    pub fn aux_out_path(&self, results_dir: &Path, bench_name: &str) -> Option<PathBuf> {
        match self {
            SuiteKind::ExpectationRecurrence => Some(
                results_dir
                    .join(self.dir_name())
                    .join(format!("{bench_name}.out")),
            ),
            _ => None,
        }
    }

    /// Whether per-benchmark reporting is a side-by-side table rather than
    /// Kleene-vs-Newton aggregate statistics.
    pub fn is_tabular(&self) -> bool {
        matches!(
            self,
            SuiteKind::ExpectationInvariant | SuiteKind::ExpectationRecurrence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_modes_per_suite() {
        assert_eq!(
            SuiteKind::BayesianInferenceMat
                .solver_modes(false)
                .iter()
                .map(|m| m.tag())
                .collect::<Vec<_>>(),
            vec![mode::KLEENE, mode::NEWTON],
        );
        assert_eq!(
            SuiteKind::MomentOfReward
                .solver_modes(true)
                .iter()
                .map(|m| m.tag())
                .collect::<Vec<_>>(),
            vec![mode::KLEENE, mode::NEWTON_NAIVE, mode::NEWTON],
        );
        assert_eq!(
            SuiteKind::ExpectationRecurrence.solver_modes(true).len(),
            1
        );
    }

    #[test]
    fn only_the_recurrence_suite_is_bounded() {
        for suite in SuiteKind::ALL {
            assert_eq!(
                suite.timeout().is_some(),
                suite == SuiteKind::ExpectationRecurrence
            );
            assert_eq!(suite.has_comparator(), suite.timeout().is_some());
        }
    }

    #[test]
    fn artifact_paths_are_suite_scoped() {
        let results = Path::new("results");
        assert_eq!(
            SuiteKind::MomentOfReward.log_path(results),
            Path::new("results/log_moment_of_reward.json")
        );
        let aux = SuiteKind::ExpectationRecurrence
            .aux_out_path(results, "hermann3")
            .unwrap();
        assert_eq!(aux, Path::new("results/expectation_recurrence/hermann3.out"));
        assert!(SuiteKind::MomentOfReward
            .aux_out_path(results, "x")
            .is_none());
    }
}
