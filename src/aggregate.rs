//! Collect phase: run every configured mode over every discovered
//! benchmark and persist the suite log.
//!
//! Each benchmark's entry is assembled completely (all modes) before it is
//! appended; the suite sequence is serialized once, wholesale, at the end
//! of the run. Solver failures and timeouts are recorded per benchmark and
//! do not abort the suite. Comparator failures do: that entry is mandatory
//! for the one suite that has it.

use crate::discover::{self, BenchmarkRef};
use crate::invoke::{self, InvokeContext};
use crate::process::ProcessRunner;
use crate::schema::{self, BenchmarkStat, ModeEntry, SuiteLog};
use crate::suite::{mode, SuiteKind};
use std::io;
use std::path::PathBuf;

/// Options for one suite's collect run.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Corpus root containing the per-suite benchmark directories.
    pub bench_root: PathBuf,
    pub invoke: InvokeContext,
    /// Also run the naive Newton mode on the solver-comparison suites.
    pub with_naive_newton: bool,
}

fn collect_benchmark(
    runner: &dyn ProcessRunner,
    bench: &BenchmarkRef,
    config: &CollectConfig,
) -> io::Result<BenchmarkStat> {
    let suite = bench.suite;
    let mut stat = if suite.records_name() {
        BenchmarkStat::new(&bench.name)
    } else {
        BenchmarkStat::default()
    };

    for solver in suite.solver_modes(config.with_naive_newton) {
        let record = invoke::run_solver(runner, bench, solver, &config.invoke)?;
        if stat.result.is_none() {
            stat.result = record.result_label.clone();
        }
        stat.modes
            .insert(solver.tag().to_string(), ModeEntry::from_record(&record));
    }

    if suite.has_comparator() {
        let seconds = invoke::run_comparator(runner, bench, &config.invoke)?;
        stat.modes
            .insert(mode::POLAR.to_string(), ModeEntry::Seconds(seconds));
    }

    Ok(stat)
}

/// Run one suite end to end, returning its log in discovery order.
pub fn collect_suite(
    runner: &dyn ProcessRunner,
    suite: SuiteKind,
    config: &CollectConfig,
) -> io::Result<SuiteLog> {
    let benchmarks = discover::discover(suite, &config.bench_root)?;
    let mut log = Vec::with_capacity(benchmarks.len());
    for bench in &benchmarks {
        eprintln!("Analyzing {} ...", bench.path.display());
        log.push(collect_benchmark(runner, bench, config)?);
    }
    Ok(log)
}

/// Collect a suite and overwrite its persisted log artifact.
pub fn collect_and_persist(
    runner: &dyn ProcessRunner,
    suite: SuiteKind,
    config: &CollectConfig,
) -> io::Result<SuiteLog> {
    let log = collect_suite(runner, suite, config)?;
    let path = suite.log_path(&config.invoke.results_dir);
    schema::write_suite_log(&path, &log)?;
    eprintln!(
        "Wrote {} entries to {}",
        log.len(),
        path.display()
    );
    Ok(log)
}
