//! Statement normalization.
//!
//! Turns the raw scraped string grid into a numeric [`StatementTable`].
//! The passes are order-dependent: placeholders must be cleared before
//! growth rows are recomputed, and growth rows must be recomputed
//! before percent conversion so already-numeric rows are not divided
//! a second time.

use crate::table::{RawTable, StatementTable};
use crate::types::Frequency;
use std::collections::HashSet;

/// Row labels converted from percent strings that the suffix rule
/// cannot catch.
const PERCENT_EDGE_CASES: [&str; 5] = [
    "Effective Tax Rate",
    "Payout Ratio",
    "Return on Equity (ROE)",
    "Return on Assets (ROA)",
    "Return on Capital (ROIC)",
];

/// Last label words marking a percent-formatted row.
const PERCENT_SUFFIXES: [&str; 4] = ["Dilution", "Margin", "Return", "Yield"];

/// A base row and the growth row derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthPair {
    /// Index of the level row the growth is computed from.
    pub base: usize,
    /// Index of the growth row to overwrite.
    pub growth: usize,
}

/// Normalize a raw statement table into numeric form.
#[must_use]
pub fn normalize(mut raw: RawTable, frequency: Frequency) -> StatementTable {
    replace_placeholders(&mut raw);
    prune_premium_columns(&mut raw, frequency);
    let synthesized = synthesize_growth_rows(&mut raw);
    convert_percent_rows(&mut raw, &synthesized);
    strip_separators(&mut raw);

    let rows = raw
        .row_labels
        .into_iter()
        .zip(raw.cells)
        .map(|(label, cells)| {
            let values = cells.iter().map(|c| parse_cell(c)).collect();
            (label, values)
        })
        .collect();
    StatementTable::new(raw.periods, rows)
}

/// Pass 1: `"-"` means zero, `"Upgrade"` means paywalled (missing).
fn replace_placeholders(raw: &mut RawTable) {
    for row in &mut raw.cells {
        for cell in row {
            if cell == "-" {
                *cell = "0".to_string();
            } else if cell == "Upgrade" {
                cell.clear();
            }
        }
    }
}

/// Pass 2: drop columns the site reserves for premium plans.
///
/// Quarterly pages pad with `"2024+"`-style columns, annual pages with
/// `"2024-Q3"`-style ones; the marker character differs per frequency.
fn prune_premium_columns(raw: &mut RawTable, frequency: Frequency) {
    let marker = match frequency {
        Frequency::Quarterly => '+',
        Frequency::Annual => '-',
    };

    let keep: Vec<bool> = raw.periods.iter().map(|p| !p.contains(marker)).collect();
    if keep.iter().all(|&k| k) {
        return;
    }

    retain_by_mask(&mut raw.periods, &keep);
    for row in &mut raw.cells {
        retain_by_mask(row, &keep);
    }
}

fn retain_by_mask<T>(items: &mut Vec<T>, keep: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep_it = keep.get(index).copied().unwrap_or(true);
        index += 1;
        keep_it
    });
}

/// Detect (base, growth) row pairs.
///
/// A growth row's label contains `"Growth"` or ends with the word
/// `"Change"`; its base is the row immediately above it.
#[must_use]
pub fn growth_pairs(row_labels: &[String]) -> Vec<GrowthPair> {
    let mut pairs = Vec::new();
    for (index, label) in row_labels.iter().enumerate() {
        if index == 0 {
            continue;
        }
        let is_growth =
            label.contains("Growth") || label.split(' ').next_back() == Some("Change");
        if is_growth {
            pairs.push(GrowthPair {
                base: index - 1,
                growth: index,
            });
        }
    }
    pairs
}

/// Pass 3: recompute growth rows from their base rows.
///
/// The site rounds displayed growth; recomputing keeps it consistent
/// with the level data. A base row that does not parse cleanly leaves
/// the pair untouched. Returns the indices of rows overwritten.
fn synthesize_growth_rows(raw: &mut RawTable) -> HashSet<usize> {
    let mut synthesized = HashSet::new();

    for pair in growth_pairs(&raw.row_labels) {
        let Some(base) = parse_numeric_row(&raw.cells[pair.base]) else {
            continue;
        };

        let mut growth = Vec::with_capacity(base.len());
        for (index, &current) in base.iter().enumerate() {
            if index == 0 {
                growth.push(f64::NAN);
                continue;
            }
            let previous = base[index - 1];
            if previous == 0.0 {
                growth.push(0.0);
            } else {
                growth.push((current - previous) / previous.abs());
            }
        }

        raw.cells[pair.growth] = growth.iter().map(|v| v.to_string()).collect();
        synthesized.insert(pair.growth);
    }

    synthesized
}

/// Pass 4: convert percent-formatted rows to fractions.
///
/// Rows rewritten by the growth pass are already numeric and are
/// skipped. A row where any populated cell fails to parse is left as
/// scraped.
fn convert_percent_rows(raw: &mut RawTable, skip: &HashSet<usize>) {
    for (index, label) in raw.row_labels.iter().enumerate() {
        if skip.contains(&index) {
            continue;
        }
        let last_word = label.split(' ').next_back().unwrap_or("");
        if !PERCENT_SUFFIXES.contains(&last_word) && !PERCENT_EDGE_CASES.contains(&label.as_str())
        {
            continue;
        }

        let converted: Option<Vec<String>> = raw.cells[index]
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    return Some(String::new());
                }
                let stripped = cell.replace('%', "").replace(',', "");
                stripped
                    .parse::<f64>()
                    .ok()
                    .map(|v| (v / 100.0).to_string())
            })
            .collect();

        if let Some(cells) = converted {
            raw.cells[index] = cells;
        }
    }
}

/// Pass 5: strip thousands separators so cells parse as numbers.
fn strip_separators(raw: &mut RawTable) {
    for row in &mut raw.cells {
        for cell in row {
            if cell.contains(',') {
                *cell = cell.replace(',', "");
            }
        }
    }
}

/// Parse a whole row, commas stripped. `None` if any populated cell is
/// non-numeric; empty cells parse as missing.
fn parse_numeric_row(cells: &[String]) -> Option<Vec<f64>> {
    cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                return Some(f64::NAN);
            }
            cell.replace(',', "").parse::<f64>().ok()
        })
        .collect()
}

/// Final cell parse; anything unparseable is missing.
fn parse_cell(cell: &str) -> f64 {
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn raw(periods: &[&str], rows: &[(&str, &[&str])]) -> RawTable {
        RawTable {
            periods: periods.iter().map(|s| s.to_string()).collect(),
            row_labels: rows.iter().map(|(l, _)| l.to_string()).collect(),
            cells: rows
                .iter()
                .map(|(_, cells)| cells.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_placeholders_become_zero_and_missing() {
        let table = normalize(
            raw(
                &["2021", "2022"],
                &[("Dividends Paid", &["-", "Upgrade"])],
            ),
            Frequency::Annual,
        );
        let row = table.row("Dividends Paid").unwrap();
        assert_eq!(row[0], 0.0);
        assert!(row[1].is_nan());
    }

    #[test]
    fn test_annual_pruning_drops_partial_year_column() {
        let table = normalize(
            raw(
                &["2021", "2022", "2022-Q1"],
                &[("Revenue", &["100", "120", "30"])],
            ),
            Frequency::Annual,
        );
        assert_eq!(table.periods(), &["2021", "2022"]);
        assert_eq!(table.row("Revenue").unwrap(), &[100.0, 120.0]);
    }

    #[test]
    fn test_quarterly_pruning_drops_premium_column() {
        let table = normalize(
            raw(
                &["2022-Q1", "2022-Q2", "2022+TTM"],
                &[("Revenue", &["30", "32", ""])],
            ),
            Frequency::Quarterly,
        );
        assert_eq!(table.periods(), &["2022-Q1", "2022-Q2"]);
    }

    #[test]
    fn test_growth_recomputation() {
        let table = normalize(
            raw(
                &["2020", "2021", "2022"],
                &[
                    ("Revenue", &["100", "150", "75"]),
                    ("Revenue Growth (YoY)", &["5%", "50%", "-50%"]),
                ],
            ),
            Frequency::Annual,
        );
        let growth = table.row("Revenue Growth (YoY)").unwrap();
        assert!(growth[0].is_nan());
        assert_relative_eq!(growth[1], 0.5);
        assert_relative_eq!(growth[2], -0.5);
    }

    #[test]
    fn test_growth_zero_base_contributes_zero() {
        let table = normalize(
            raw(
                &["2020", "2021"],
                &[("EPS (Basic)", &["0", "2"]), ("EPS Growth", &["-", "-"])],
            ),
            Frequency::Annual,
        );
        let growth = table.row("EPS Growth").unwrap();
        assert!(growth[0].is_nan());
        assert_eq!(growth[1], 0.0);
    }

    #[test]
    fn test_growth_skipped_when_base_unparseable() {
        let table = normalize(
            raw(
                &["2020", "2021"],
                &[
                    ("Fiscal Note", &["n/a", "n/a"]),
                    ("Note Change", &["1%", "2%"]),
                ],
            ),
            Frequency::Annual,
        );
        // Base never parsed, so the growth row keeps its scraped cells,
        // which fail the final numeric parse.
        let row = table.row("Note Change").unwrap();
        assert!(row.iter().all(|v| v.is_nan()));
    }

    #[rstest]
    #[case("Gross Margin")]
    #[case("Dividend Yield")]
    #[case("Return on Equity (ROE)")]
    #[case("Payout Ratio")]
    fn test_percent_rows_become_fractions(#[case] label: &str) {
        let table = normalize(
            raw(&["2021", "2022"], &[(label, &["25%", "50%"])]),
            Frequency::Annual,
        );
        assert_eq!(table.row(label).unwrap(), &[0.25, 0.5]);
    }

    #[test]
    fn test_percent_row_with_bad_cell_left_alone() {
        let table = normalize(
            raw(&["2021", "2022"], &[("Net Margin", &["25%", "abc"])]),
            Frequency::Annual,
        );
        let row = table.row("Net Margin").unwrap();
        // Whole row skipped: "25%" does not survive the final parse.
        assert!(row[0].is_nan());
        assert!(row[1].is_nan());
    }

    #[test]
    fn test_thousands_separators_stripped() {
        let table = normalize(
            raw(&["2022"], &[("Revenue", &["53,069"])]),
            Frequency::Annual,
        );
        assert_eq!(table.row("Revenue").unwrap(), &[53069.0]);
    }

    #[test]
    fn test_growth_pair_detection() {
        let labels: Vec<String> = ["Revenue", "Revenue Growth (YoY)", "EPS", "EPS Change"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pairs = growth_pairs(&labels);
        assert_eq!(
            pairs,
            vec![
                GrowthPair { base: 0, growth: 1 },
                GrowthPair { base: 2, growth: 3 },
            ]
        );
    }
}
