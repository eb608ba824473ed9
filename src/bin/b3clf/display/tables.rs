use std::collections::BTreeMap;
use std::io::{self, Write};

use b3clf::MoleculeStatus;
use b3clf::descriptors::DescriptorOutcome;
use b3clf::geometry::GeometryReport;
use b3clf::{ModelKey, PipelineReport, ThresholdPolicy};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_run_summary(report: &PipelineReport, key: ModelKey, policy: ThresholdPolicy) {
    let positive = report.predictions.iter().filter(|p| p.label == 1).count();
    let mut rows = vec![
        ("Classifier", key.to_string()),
        ("Threshold", format!("{policy} ({:.3})", report.cutoff)),
        ("Molecules", report.molecules.len().to_string()),
        ("Predicted", report.predictions.len().to_string()),
        ("BBB+ / BBB-", format!("{} / {}", positive, report.predictions.len() - positive)),
    ];
    if !report.missing_descriptors.is_empty() {
        rows.push((
            "Absent descr.",
            report.missing_descriptors.len().to_string(),
        ));
    }
    for path in &report.kept {
        rows.push((
            "Kept",
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
        ));
    }

    let mut out = io::stderr().lock();
    print_kv_table(&mut out, "Prediction Summary", &rows);
}

pub fn print_geometry_summary(report: &GeometryReport) {
    let rows = vec![
        ("Molecules", report.records.len().to_string()),
        ("Written", report.written.to_string()),
        ("Retried", report.retried.to_string()),
        ("Alternate FF", report.alternate_force_field.to_string()),
        ("Unminimized", report.unoptimized.to_string()),
        ("Failed", report.failed().to_string()),
    ];
    let mut out = io::stderr().lock();
    print_kv_table(&mut out, "Geometry Summary", &rows);
}

pub fn print_descriptor_summary(outcome: &DescriptorOutcome) {
    let rows = vec![
        ("Molecules", outcome.statuses.len().to_string()),
        ("Complete rows", outcome.table.row_count().to_string()),
        ("Descriptors", outcome.table.column_count().to_string()),
        ("Dropped", outcome.dropped().to_string()),
    ];
    let mut out = io::stderr().lock();
    print_kv_table(&mut out, "Descriptor Summary", &rows);
}

/// Counts molecules per status; prints nothing when all are fine.
pub fn print_status_breakdown<'a>(statuses: impl IntoIterator<Item = &'a MoleculeStatus>) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut total = 0;
    for status in statuses {
        *counts.entry(status.label()).or_insert(0) += 1;
        total += 1;
    }
    let all_ok = counts.len() == 1 && counts.contains_key("ok");
    if total == 0 || all_ok {
        return;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut out = io::stderr().lock();
    print_distribution_table(&mut out, "Molecule Status", &sorted, total);
}

/// Writes predictions to stdout.
pub fn print_predictions(report: &PipelineReport) {
    let widths = [24usize, 11, 5];
    let mut out = io::stdout().lock();

    border(&mut out, "", ['┌', '┬', '┐'], &widths);
    let _ = writeln!(
        out,
        "│ {:<w0$} │ {:>w1$} │ {:>w2$} │",
        "ID",
        "Probability",
        "Label",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    );
    border(&mut out, "", ['├', '┼', '┤'], &widths);
    for p in &report.predictions {
        let _ = writeln!(
            out,
            "│ {:<w0$} │ {:>w1$.4} │ {:>w2$} │",
            truncate(&p.id, widths[0]),
            p.probability,
            p.label,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    }
    border(&mut out, "", ['└', '┴', '┘'], &widths);
}

/// A horizontal rule over columns of the given inner widths.
fn border(out: &mut impl Write, indent: &str, [left, mid, right]: [char; 3], widths: &[usize]) {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    let _ = writeln!(
        out,
        "{indent}{left}{}{right}",
        segments.join(&mid.to_string())
    );
}

fn title(out: &mut impl Write, text: &str) {
    let _ = writeln!(out, "{}┌─ {} ─┐", INDENT, truncate(text, SAFE_TABLE_WIDTH - 6));
}

fn print_distribution_table(
    out: &mut impl Write,
    heading: &str,
    data: &[(&str, usize)],
    total: usize,
) {
    let (name_w, count_w) = (20usize, 6usize);
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + count_w + 6);
    let widths = [name_w, count_w, dist_w];
    let bar_w = dist_w.saturating_sub(8).min(20);

    title(out, heading);
    border(out, INDENT, ['┌', '┬', '┐'], &widths);
    let _ = writeln!(
        out,
        "{INDENT}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
        "Status", "Count", "Share"
    );
    border(out, INDENT, ['├', '┼', '┤'], &widths);
    for (name, count) in data {
        let pct = *count as f64 * 100.0 / total as f64;
        let share = format!("{}  {:>5.1}%", make_bar(pct, bar_w), pct);
        let _ = writeln!(
            out,
            "{INDENT}│ {:<name_w$} │ {:>count_w$} │ {:<dist_w$} │",
            truncate(name, name_w),
            count,
            share
        );
    }
    border(out, INDENT, ['└', '┴', '┘'], &widths);
}

fn print_kv_table(out: &mut impl Write, heading: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + 6);
    let widths = [key_w, val_w];

    title(out, heading);
    border(out, INDENT, ['┌', '┬', '┐'], &widths);
    let _ = writeln!(out, "{INDENT}│ {:<key_w$} │ {:>val_w$} │", "Metric", "Value");
    border(out, INDENT, ['├', '┼', '┤'], &widths);
    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{INDENT}│ {:<key_w$} │ {:>val_w$} │",
            truncate(key, key_w),
            truncate(val, val_w)
        );
    }
    border(out, INDENT, ['└', '┴', '┘'], &widths);
}

fn make_bar(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
