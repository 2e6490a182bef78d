//! Report artifacts: log-log scatter plots (SVG) and per-benchmark tables.
//!
//! Both renderers consume a suite log read-only. The scatter pairs the two
//! modes' solve times per benchmark and draws `y=x`, `y=2x` and `y=x/2`
//! reference lines to bucket benchmarks by relative speed; entries missing
//! either mode appear as gaps. Tables keep every entry, printing markers
//! (`T/O`, `ERR`) in place of a timing.

use crate::schema::{ModeEntry, SuiteLog};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

const SVG_SIZE: f64 = 520.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 48.0;

/// Axis labels for the scatter, one per compared mode.
#[derive(Debug, Clone, Copy)]
pub struct ScatterAxes<'a> {
    pub x_mode: &'a str,
    pub x_title: &'a str,
    pub y_mode: &'a str,
    pub y_title: &'a str,
}

fn log_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let mut ticks = Vec::new();
    let mut p = lo.log10().floor() as i32;
    while 10f64.powi(p) <= hi * 1.001 {
        let v = 10f64.powi(p);
        if v >= lo * 0.999 {
            ticks.push(v);
        }
        p += 1;
    }
    ticks
}

fn fmt_seconds(v: f64) -> String {
    if v >= 1.0 || v <= 0.0 {
        format!("{v}")
    } else {
        format!("{v:e}")
    }
}

/// Render the comparison scatter as an SVG document.
///
/// Fails when no benchmark has a positive successful time for both modes,
/// since a log-scaled plot over zero samples is meaningless.
pub fn render_scatter(log: &SuiteLog, axes: ScatterAxes<'_>) -> io::Result<String> {
    let points: Vec<(f64, f64)> = log
        .iter()
        .filter_map(|stat| {
            let x = stat.solve_time(axes.x_mode)?;
            let y = stat.solve_time(axes.y_mode)?;
            (x > 0.0 && y > 0.0).then_some((x, y))
        })
        .collect();
    if points.is_empty() {
        return Err(io::Error::other(format!(
            "no paired samples for {} vs {}",
            axes.x_mode, axes.y_mode
        )));
    }

    // Shared limits on both axes keep the aspect equal: a point's position
    // relative to y=x is its speedup bucket.
    let lo = points
        .iter()
        .flat_map(|&(x, y)| [x, y])
        .fold(f64::INFINITY, f64::min);
    let hi = points
        .iter()
        .flat_map(|&(x, y)| [x, y])
        .fold(f64::NEG_INFINITY, f64::max);
    let (lo_log, hi_log) = if lo == hi {
        (lo.log10() - 0.5, hi.log10() + 0.5)
    } else {
        (lo.log10(), hi.log10())
    };

    let chart_w = SVG_SIZE - MARGIN_LEFT - MARGIN_RIGHT;
    let chart_h = SVG_SIZE - MARGIN_TOP - MARGIN_BOTTOM;
    let x_of = |v: f64| MARGIN_LEFT + (v.log10() - lo_log) / (hi_log - lo_log) * chart_w;
    let y_of = |v: f64| MARGIN_TOP + chart_h - (v.log10() - lo_log) / (hi_log - lo_log) * chart_h;

    let mut w = String::new();
    writeln!(
        w,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{SVG_SIZE}\" height=\"{SVG_SIZE}\" font-family=\"monospace,Arial,sans-serif\">"
    )
    .unwrap();
    writeln!(w, "<rect width=\"{SVG_SIZE}\" height=\"{SVG_SIZE}\" fill=\"white\"/>").unwrap();
    writeln!(
        w,
        "<rect x=\"{MARGIN_LEFT}\" y=\"{MARGIN_TOP}\" width=\"{chart_w:.1}\" height=\"{chart_h:.1}\" fill=\"#FAFAFA\" stroke=\"#BBB\" stroke-width=\"1\"/>"
    )
    .unwrap();

    // Decade grid and tick labels on both axes.
    for t in log_ticks(lo, hi) {
        let tx = x_of(t);
        let ty = y_of(t);
        writeln!(
            w,
            "<line x1=\"{tx:.1}\" y1=\"{MARGIN_TOP}\" x2=\"{tx:.1}\" y2=\"{:.1}\" stroke=\"#E5E5E5\" stroke-width=\"1\"/>",
            MARGIN_TOP + chart_h
        )
        .unwrap();
        writeln!(
            w,
            "<line x1=\"{MARGIN_LEFT}\" y1=\"{ty:.1}\" x2=\"{:.1}\" y2=\"{ty:.1}\" stroke=\"#E5E5E5\" stroke-width=\"1\"/>",
            MARGIN_LEFT + chart_w
        )
        .unwrap();
        writeln!(
            w,
            "<text x=\"{tx:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"9\" fill=\"#666\">{}</text>",
            MARGIN_TOP + chart_h + 14.0,
            fmt_seconds(t)
        )
        .unwrap();
        writeln!(
            w,
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"9\" fill=\"#666\">{}</text>",
            MARGIN_LEFT - 6.0,
            ty + 3.0,
            fmt_seconds(t)
        )
        .unwrap();
    }

    // Reference lines y = k*x, drawn in log space (y_log = x_log + log10 k)
    // and clipped to the chart square.
    let reference = [
        (1.0, "solid", "y=x"),
        (2.0, "dotted", "y=2x"),
        (0.5, "dashed", "y=x/2"),
    ];
    for (k, style, label) in reference {
        let offset = f64::log10(k);
        let x0 = lo_log.max(lo_log - offset);
        let x1 = hi_log.min(hi_log - offset);
        if x0 >= x1 {
            continue;
        }
        let dash = match style {
            "dotted" => " stroke-dasharray=\"2,3\"",
            "dashed" => " stroke-dasharray=\"7,4\"",
            _ => "",
        };
        let px0 = MARGIN_LEFT + (x0 - lo_log) / (hi_log - lo_log) * chart_w;
        let px1 = MARGIN_LEFT + (x1 - lo_log) / (hi_log - lo_log) * chart_w;
        let py0 = MARGIN_TOP + chart_h - (x0 + offset - lo_log) / (hi_log - lo_log) * chart_h;
        let py1 = MARGIN_TOP + chart_h - (x1 + offset - lo_log) / (hi_log - lo_log) * chart_h;
        writeln!(
            w,
            "<line x1=\"{px0:.1}\" y1=\"{py0:.1}\" x2=\"{px1:.1}\" y2=\"{py1:.1}\" stroke=\"black\" stroke-width=\"1\"{dash}><title>{label}</title></line>"
        )
        .unwrap();
    }

    // X-shaped markers, one per paired benchmark.
    for (x, y) in &points {
        let px = x_of(*x);
        let py = y_of(*y);
        writeln!(
            w,
            "<path d=\"M {:.1} {:.1} L {:.1} {:.1} M {:.1} {:.1} L {:.1} {:.1}\" stroke=\"#2040C0\" stroke-width=\"1.6\"/>",
            px - 3.5,
            py - 3.5,
            px + 3.5,
            py + 3.5,
            px - 3.5,
            py + 3.5,
            px + 3.5,
            py - 3.5
        )
        .unwrap();
    }

    // Axis titles.
    writeln!(
        w,
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#222\">{}</text>",
        MARGIN_LEFT + chart_w / 2.0,
        SVG_SIZE - 12.0,
        axes.x_title
    )
    .unwrap();
    writeln!(
        w,
        "<text x=\"14\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#222\" transform=\"rotate(-90 14 {:.1})\">{}</text>",
        MARGIN_TOP + chart_h / 2.0,
        MARGIN_TOP + chart_h / 2.0,
        axes.y_title
    )
    .unwrap();

    writeln!(w, "</svg>").unwrap();
    Ok(w)
}

/// Render and persist the scatter at `path`.
pub fn write_scatter(path: &Path, log: &SuiteLog, axes: ScatterAxes<'_>) -> io::Result<()> {
    let svg = render_scatter(log, axes)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, svg)
}

fn fmt_time(v: f64) -> String {
    format!("{v}")
}

/// A mode's table cell: the timing, or the recorded marker.
fn mode_cell(entry: Option<&ModeEntry>, time: Option<f64>) -> String {
    match (time, entry) {
        (Some(t), _) => fmt_time(t),
        (None, Some(ModeEntry::Marker(m))) => m.clone(),
        _ => String::new(),
    }
}

/// Render an ordered per-benchmark table: 1-based index, name, one timing
/// column per mode, then the qualitative result when `with_result`.
pub fn render_table(
    log: &SuiteLog,
    modes: &[(&str, &str)],
    with_result: bool,
) -> String {
    let mut headers: Vec<String> = vec!["#".to_string(), "Program".to_string()];
    headers.extend(modes.iter().map(|(_, title)| title.to_string()));
    if with_result {
        headers.push("Invariants".to_string());
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(log.len());
    for (i, stat) in log.iter().enumerate() {
        let mut row = vec![(i + 1).to_string(), stat.name.clone()];
        for (mode, _) in modes {
            row.push(mode_cell(stat.modes.get(*mode), stat.solve_time(mode)));
        }
        if with_result {
            row.push(stat.result.clone().unwrap_or_default());
        }
        rows.push(row);
    }

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    let render_row = |out: &mut String, cells: &[String]| {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    render_row(&mut out, &headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    render_row(&mut out, &rule);
    for row in &rows {
        render_row(&mut out, row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BenchmarkStat;
    use tempfile::tempdir;

    fn log() -> SuiteLog {
        serde_json::from_str(
            r#"[
              {"name":"fst","kleene":{"solve_time":2.0,"solve_iters":4},"newton":{"solve_time":1.0,"solve_iters":2}},
              {"name":"snd","kleene":{"solve_time":0.04,"solve_iters":8},"newton":{"solve_time":0.02,"solve_iters":4}}
            ]"#,
        )
        .unwrap()
    }

    const AXES: ScatterAxes<'static> = ScatterAxes {
        x_mode: "kleene",
        x_title: "Kleene",
        y_mode: "newton",
        y_title: "Newton",
    };

    #[test]
    fn scatter_has_points_reference_lines_and_titles() {
        let svg = render_scatter(&log(), AXES).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("y=2x"));
        assert!(svg.contains("y=x/2"));
        assert!(svg.contains("Kleene"));
        assert!(svg.contains("Newton"));
        assert_eq!(svg.matches("#2040C0").count(), 2);
    }

    #[test]
    fn scatter_skips_entries_missing_a_mode() {
        let mut entries = log();
        entries.push(BenchmarkStat::new("gap"));
        let svg = render_scatter(&entries, AXES).unwrap();
        assert_eq!(svg.matches("#2040C0").count(), 2);
    }

    #[test]
    fn scatter_without_pairs_is_an_error() {
        let entries = vec![BenchmarkStat::new("empty")];
        assert!(render_scatter(&entries, AXES).is_err());
    }

    #[test]
    fn write_scatter_persists_the_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plots").join("suite.svg");
        write_scatter(&path, &log(), AXES).unwrap();
        assert!(fs::read_to_string(&path).unwrap().ends_with("</svg>\n"));
    }

    #[test]
    fn table_rows_are_one_based_and_in_input_order() {
        let table = render_table(&log(), &[("newton", "Time")], true);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#"));
        assert!(lines[2].starts_with("1  fst"));
        assert!(lines[3].starts_with("2  snd"));
    }

    #[test]
    fn table_prints_markers_for_failed_entries() {
        let log: SuiteLog = serde_json::from_str(
            r#"[{"name":"herman","newton":"T/O","polar":9.5}]"#,
        )
        .unwrap();
        let table = render_table(&log, &[("newton", "Time (our work)"), ("polar", "Time (Polar)")], false);
        assert!(table.contains("T/O"));
        assert!(table.contains("9.5"));
    }
}
