use clap::{Parser, Subcommand};
use solver_bench::aggregate::{self, CollectConfig};
use solver_bench::invoke::InvokeContext;
use solver_bench::process::SystemRunner;
use solver_bench::report::{self, ScatterAxes};
use solver_bench::schema;
use solver_bench::stats;
use solver_bench::suite::{mode, SuiteKind};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover and run a suite's benchmarks, writing its log artifact.
    Collect {
        /// Suite to collect. Repeatable; defaults to every suite.
        #[arg(long, value_enum)]
        suite: Vec<SuiteKind>,

        /// Corpus root containing the per-suite benchmark directories.
        #[arg(long, value_name = "DIR", default_value = ".")]
        bench_root: PathBuf,

        /// Analyzer build root; the executable for a suite is
        /// <build-root>/<suite-dir>/test.exe.
        #[arg(long, value_name = "DIR", default_value = "_build/default")]
        build_root: PathBuf,

        /// Analyzer executable override, used for every selected suite.
        #[arg(long, value_name = "FILE")]
        analyzer: Option<PathBuf>,

        /// Comparator tool for the expectation-recurrence suite.
        #[arg(long, value_name = "FILE", default_value = "../polar/polar.py")]
        comparator: PathBuf,

        /// Per-invocation wall-clock budget override, in seconds.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Also run the naive Newton mode on the solver-comparison suites.
        #[arg(long, default_value_t = false)]
        with_naive_newton: bool,
    },

    /// Compute statistics and render artifacts from persisted suite logs.
    Report {
        /// Suite to report. Repeatable; defaults to every suite.
        #[arg(long, value_enum)]
        suite: Vec<SuiteKind>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "solver-bench")]
#[command(about = "Fixed-point vs Newton analyzer benchmark harness")]
struct Args {
    /// Directory holding suite logs and rendered artifacts.
    #[arg(long, value_name = "DIR", default_value = "results", global = true)]
    results_dir: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

fn selected(suites: &[SuiteKind]) -> Vec<SuiteKind> {
    if suites.is_empty() {
        SuiteKind::ALL.to_vec()
    } else {
        suites.to_vec()
    }
}

fn report_speedup_suite(suite: SuiteKind, results_dir: &PathBuf) -> io::Result<()> {
    let log = schema::read_suite_log(&suite.log_path(results_dir))?;
    println!("{}:", suite.title());

    let means = stats::mean_iters(&log);
    let fmt = |m: &str| {
        means
            .get(m)
            .map(|v| format!("{v}"))
            .unwrap_or_else(|| "undefined".to_string())
    };
    println!(
        "    average iters: {{'kleene': {}, 'newton': {}}}",
        fmt(mode::KLEENE),
        fmt(mode::NEWTON)
    );

    match stats::geo_mean_speedup(&log, mode::KLEENE, mode::NEWTON) {
        Some(speedup) => println!("    speedup in runtime: {speedup}"),
        None => println!("    speedup in runtime: undefined (incomplete samples)"),
    }

    if let Some((time, iters, ratio)) = stats::time_per_iter(&log, mode::NEWTON) {
        println!("    newton time/iter: {time}s / {iters} = {ratio}");
    }

    let scatter = suite.scatter_path(results_dir);
    report::write_scatter(
        &scatter,
        &log,
        ScatterAxes {
            x_mode: mode::KLEENE,
            x_title: "Kleene",
            y_mode: mode::NEWTON,
            y_title: "Newton",
        },
    )?;
    println!("    log-log runtime plot saved at {}", scatter.display());
    Ok(())
}

fn report_tabular_suite(suite: SuiteKind, results_dir: &PathBuf) -> io::Result<()> {
    let log = schema::read_suite_log(&suite.log_path(results_dir))?;
    println!("{}:", suite.title());
    let table = match suite {
        SuiteKind::ExpectationRecurrence => report::render_table(
            &log,
            &[(mode::NEWTON, "Time (our work)"), (mode::POLAR, "Time (Polar)")],
            false,
        ),
        _ => report::render_table(&log, &[(mode::NEWTON, "Time")], true),
    };
    print!("{table}");
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let runner = SystemRunner;

    match args.cmd {
        Command::Collect {
            suite,
            bench_root,
            build_root,
            analyzer,
            comparator,
            timeout_secs,
            with_naive_newton,
        } => {
            for suite in selected(&suite) {
                let config = CollectConfig {
                    bench_root: bench_root.clone(),
                    invoke: InvokeContext {
                        analyzer: analyzer
                            .clone()
                            .unwrap_or_else(|| suite.analyzer_path(&build_root)),
                        comparator: suite.has_comparator().then(|| comparator.clone()),
                        results_dir: args.results_dir.clone(),
                        timeout: timeout_secs.map(Duration::from_secs),
                    },
                    with_naive_newton,
                };
                aggregate::collect_and_persist(&runner, suite, &config)?;
            }
        }
        Command::Report { suite } => {
            for suite in selected(&suite) {
                if suite.is_tabular() {
                    report_tabular_suite(suite, &args.results_dir)?;
                } else {
                    report_speedup_suite(suite, &args.results_dir)?;
                }
            }
        }
    }

    Ok(())
}
