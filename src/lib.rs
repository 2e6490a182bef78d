//! Benchmark orchestration and comparative statistics for probabilistic-
//! program analyzers.
//!
//! The crate drives two external collaborators as black boxes: a solver
//! analyzer (fixed-point "Kleene" iteration vs a Newton-style method) and,
//! for one suite, the Polar reference tool. It discovers benchmark
//! corpora, invokes the executables with suite-specific argument
//! protocols, records structured telemetry per run, and derives
//! comparative statistics and artifacts (geometric-mean speedups, log-log
//! scatter plots, per-benchmark tables) from the persisted suite logs.
//!
//! Collection and reporting are separate phases joined only by the
//! on-disk log, so analysis is replayable against saved runs.

pub mod aggregate;
pub mod discover;
pub mod invoke;
pub mod process;
pub mod report;
pub mod schema;
pub mod stats;
pub mod suite;
pub mod telemetry;
