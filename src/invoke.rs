//! Adapters around the external analyzer and comparator executables.
//!
//! The analyzer protocol is positional-command style:
//! `test.exe a <benchmark> [-d <depth>] [-m <letter>] -b [<out-path>]`.
//! The comparator takes the probabilistic-program source plus the goal
//! expressions extracted from the benchmark's `.cfg` file and reports its
//! timing in the trailing colon-delimited field of its last output line.

use crate::discover::BenchmarkRef;
use crate::process::ProcessRunner;
use crate::schema::RunRecord;
use crate::suite::{SolverMode, SuiteKind};
use crate::telemetry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed pieces of one collect run's invocation environment.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    /// Analyzer executable for the suite being collected.
    pub analyzer: PathBuf,
    /// External comparator tool, for suites that use one.
    pub comparator: Option<PathBuf>,
    /// Results directory, for suites that capture per-benchmark out files.
    pub results_dir: PathBuf,
    /// Override for the suite's default per-invocation budget.
    pub timeout: Option<std::time::Duration>,
}

impl InvokeContext {
    fn budget(&self, suite: SuiteKind) -> Option<std::time::Duration> {
        suite.timeout().map(|d| self.timeout.unwrap_or(d))
    }
}

/// Append a co-located file's suffix to a dedup base path textually.
/// `Path::with_extension` would clobber everything after a dot inside the
/// benchmark name (`herman.v1.2` must become `herman.v1.2.c`).
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(format!(".{ext}"));
    PathBuf::from(s)
}

/// Benchmark file handed to the analyzer. Multi-file suites reference the
/// base path, so the program source extension is restored here.
fn analyzer_input(bench: &BenchmarkRef) -> PathBuf {
    if bench.suite.dedup_by_base_name() {
        with_suffix(&bench.path, "c")
    } else {
        bench.path.clone()
    }
}

/// Build the analyzer argument vector for one benchmark and mode.
pub fn analyzer_args(
    bench: &BenchmarkRef,
    mode: SolverMode,
    ctx: &InvokeContext,
) -> Vec<String> {
    let suite = bench.suite;
    let mut args = vec!["a".to_string(), analyzer_input(bench).display().to_string()];
    if let Some(depth) = suite.depth() {
        args.push("-d".to_string());
        args.push(depth.to_string());
    }
    if !matches!(
        suite,
        SuiteKind::ExpectationInvariant | SuiteKind::ExpectationRecurrence
    ) {
        args.push("-m".to_string());
        args.push(mode.letter().to_string());
    }
    args.push("-b".to_string());
    if let Some(out) = suite.aux_out_path(&ctx.results_dir, &bench.name) {
        args.push(out.display().to_string());
    }
    args
}

/// Run the analyzer in one solver mode and classify the outcome.
///
/// Timeouts are a recorded outcome, not an error; `Err` is reserved for
/// spawn-level failures.
pub fn run_solver(
    runner: &dyn ProcessRunner,
    bench: &BenchmarkRef,
    mode: SolverMode,
    ctx: &InvokeContext,
) -> io::Result<RunRecord> {
    let suite = bench.suite;
    if let Some(out) = suite.aux_out_path(&ctx.results_dir, &bench.name) {
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
    }

    let args = analyzer_args(bench, mode, ctx);
    let output = runner.run(&ctx.analyzer, &args, ctx.budget(suite))?;

    if output.timed_out {
        return Ok(RunRecord::timeout(mode.tag()));
    }
    if !output.success() {
        return Ok(RunRecord::error(mode.tag()));
    }
    match telemetry::decode(&output.stdout, suite.payload_shape()) {
        Ok(payload) => Ok(RunRecord::ok(
            mode.tag(),
            payload.telemetry,
            payload.result_label,
        )),
        Err(_) => Ok(RunRecord::error(mode.tag())),
    }
}

/// Goal expressions: the non-blank trimmed lines of the `.cfg` file.
pub fn read_goals(cfg_path: &Path) -> io::Result<Vec<String>> {
    let text = fs::read_to_string(cfg_path).map_err(|e| {
        io::Error::new(e.kind(), format!("goals file {}: {e}", cfg_path.display()))
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Timing in seconds from the comparator's final output line, taken as the
/// first whitespace token after the last colon.
pub fn parse_comparator_time(stdout: &[u8]) -> io::Result<f64> {
    let text = std::str::from_utf8(stdout)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "comparator output: not UTF-8"))?;
    let last = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "comparator output: empty"))?;
    let field = last.rsplit(':').next().unwrap_or(last);
    let token = field.split_whitespace().next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("comparator output: no timing field in {last:?}"),
        )
    })?;
    token.parse::<f64>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("comparator output: {token:?} is not a float"),
        )
    })
}

/// Invoke the comparator tool for one benchmark and parse its timing.
///
/// Every failure here is hard: a benchmark with an unusable comparator
/// entry aborts the whole suite run, unlike analyzer timeouts.
pub fn run_comparator(
    runner: &dyn ProcessRunner,
    bench: &BenchmarkRef,
    ctx: &InvokeContext,
) -> io::Result<f64> {
    let tool = ctx.comparator.as_ref().ok_or_else(|| {
        io::Error::other(format!(
            "suite {} requires a comparator tool path",
            bench.suite.dir_name()
        ))
    })?;

    let program = with_suffix(&bench.path, "prob");
    let goals = read_goals(&with_suffix(&bench.path, "cfg"))?;

    let mut args = vec![program.display().to_string(), "--goals".to_string()];
    args.extend(goals);

    let output = runner.run(tool, &args, None)?;
    if !output.success() {
        return Err(io::Error::other(format!(
            "comparator failed on {} (exit {:?}): {}",
            bench.name,
            output.exit_code,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    parse_comparator_time(&output.stdout)
}


#[cfg(test)]
mod tests {
    use super::mock::MockRunner;
    use super::*;
    use crate::schema::Outcome;
    use crate::suite::SolverMode;
    use std::time::Duration;
    use tempfile::tempdir;

    fn ctx(results_dir: &Path) -> InvokeContext {
        InvokeContext {
            analyzer: PathBuf::from("test.exe"),
            comparator: Some(PathBuf::from("polar.py")),
            results_dir: results_dir.to_path_buf(),
            timeout: Some(Duration::from_secs(1)),
        }
    }

    fn bench(suite: SuiteKind, path: &str, name: &str) -> BenchmarkRef {
        BenchmarkRef {
            suite,
            path: PathBuf::from(path),
            name: name.to_string(),
        }
    }

    #[test]
    fn arg_protocol_per_suite() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path());

        let b = bench(SuiteKind::BayesianInferenceMat, "bench/grass.c", "grass");
        assert_eq!(
            analyzer_args(&b, SolverMode::Kleene, &ctx),
            vec!["a", "bench/grass.c", "-m", "K", "-b"]
        );

        let b = bench(SuiteKind::MomentOfReward, "bench/race.c", "race");
        assert_eq!(
            analyzer_args(&b, SolverMode::Newton, &ctx),
            vec!["a", "bench/race.c", "-d", "2", "-m", "N", "-b"]
        );

        let b = bench(SuiteKind::ExpectationInvariant, "bench/gambler.c", "gambler");
        assert_eq!(
            analyzer_args(&b, SolverMode::Newton, &ctx),
            vec!["a", "bench/gambler.c", "-b"]
        );

        let b = bench(SuiteKind::ExpectationRecurrence, "bench/hermann3", "hermann3");
        let out = dir
            .path()
            .join("expectation_recurrence")
            .join("hermann3.out");
        assert_eq!(
            analyzer_args(&b, SolverMode::Newton, &ctx),
            vec![
                "a".to_string(),
                "bench/hermann3.c".to_string(),
                "-b".to_string(),
                out.display().to_string(),
            ]
        );
    }

    #[test]
    fn dotted_base_names_keep_their_full_suffixed_paths() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("herman.v1.2");
        std::fs::write(
            PathBuf::from(format!("{}.cfg", base.display())),
            "E(x)\n",
        )
        .unwrap();

        let b = BenchmarkRef {
            suite: SuiteKind::ExpectationRecurrence,
            path: base.clone(),
            name: "herman.v1.2".to_string(),
        };
        let ctx = ctx(dir.path());

        let args = analyzer_args(&b, SolverMode::Newton, &ctx);
        assert_eq!(args[1], format!("{}.c", base.display()));

        let runner = MockRunner::new(vec![MockRunner::ok(b"total time: 0.5 s\n")]);
        assert_eq!(run_comparator(&runner, &b, &ctx).unwrap(), 0.5);
        let calls = runner.calls.borrow();
        assert_eq!(calls[0][0], format!("{}.prob", base.display()));
    }

    #[test]
    fn solver_outcomes_classify() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path());
        let b = bench(SuiteKind::BayesianInferenceMat, "bench/grass.c", "grass");

        let runner = MockRunner::new(vec![
            MockRunner::ok(br#"{"solve_time": 0.5, "solve_iters": 10}"#),
            MockRunner::failed(2),
            MockRunner::ok(b"not json"),
            MockRunner::timed_out(),
        ]);

        let rec = run_solver(&runner, &b, SolverMode::Kleene, &ctx).unwrap();
        assert_eq!(rec.outcome, Outcome::Ok);
        assert_eq!(rec.telemetry.unwrap().solve_time, 0.5);

        let rec = run_solver(&runner, &b, SolverMode::Kleene, &ctx).unwrap();
        assert_eq!(rec.outcome, Outcome::Error);

        let rec = run_solver(&runner, &b, SolverMode::Kleene, &ctx).unwrap();
        assert_eq!(rec.outcome, Outcome::Error);

        let rec = run_solver(&runner, &b, SolverMode::Newton, &ctx).unwrap();
        assert_eq!(rec.outcome, Outcome::Timeout);
        assert!(rec.telemetry.is_none());
    }

    #[test]
    fn labeled_payload_carries_result() {
        let dir = tempdir().unwrap();
        let ctx = ctx(dir.path());
        let b = bench(SuiteKind::ExpectationInvariant, "bench/gambler.c", "gambler");
        let runner = MockRunner::new(vec![MockRunner::ok(
            b"[z] <= x + y\n{\"solve_time\": 1.5, \"solve_iters\": 3}",
        )]);
        let rec = run_solver(&runner, &b, SolverMode::Newton, &ctx).unwrap();
        assert_eq!(rec.result_label.as_deref(), Some("[z] <= x + y"));
    }

    #[test]
    fn comparator_parses_trailing_field() {
        assert_eq!(
            parse_comparator_time(b"header\nElapsed time: 0.75 s\n").unwrap(),
            0.75
        );
        assert_eq!(parse_comparator_time(b"3.5\n").unwrap(), 3.5);
        assert!(parse_comparator_time(b"Elapsed time: fast\n").is_err());
        assert!(parse_comparator_time(b"").is_err());
    }

    #[test]
    fn comparator_builds_goal_args_and_fails_hard() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("coupon");
        std::fs::write(base.with_extension("cfg"), "E(x)\n\n  E(x**2)  \n").unwrap();
        std::fs::write(base.with_extension("prob"), "x = x + 1").unwrap();

        let b = BenchmarkRef {
            suite: SuiteKind::ExpectationRecurrence,
            path: base.clone(),
            name: "coupon".to_string(),
        };
        let ctx = ctx(dir.path());

        let runner = MockRunner::new(vec![MockRunner::ok(b"total time: 1.25 s\n")]);
        assert_eq!(run_comparator(&runner, &b, &ctx).unwrap(), 1.25);
        let calls = runner.calls.borrow();
        assert_eq!(
            calls[0],
            vec![
                base.with_extension("prob").display().to_string(),
                "--goals".to_string(),
                "E(x)".to_string(),
                "E(x**2)".to_string(),
            ]
        );
        drop(calls);

        let runner = MockRunner::new(vec![MockRunner::failed(1)]);
        assert!(run_comparator(&runner, &b, &ctx).is_err());
    }
}
