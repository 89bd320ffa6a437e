//! Statement tables: the raw scraped grid and the normalized numeric form.

use serde::{Deserialize, Serialize};

/// A statement table as extracted from the page, before normalization.
///
/// All cells are the raw strings the site displayed: `"53,069"`,
/// `"12.4%"`, `"-"`, `"Upgrade"` or empty where a cell could not be
/// read. Columns are ordered earliest period first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Period labels, one per data column.
    pub periods: Vec<String>,
    /// Row labels, one per data row.
    pub row_labels: Vec<String>,
    /// Cell grid, `cells[row][col]`, same shape as labels x periods.
    pub cells: Vec<Vec<String>>,
}

impl RawTable {
    /// True when the table has no rows or no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.row_labels.is_empty()
    }

    /// Number of data rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of data columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.periods.len()
    }
}

/// A normalized statement: numeric cells with `NaN` marking missing data.
///
/// Row labels are unique; periods are ordered earliest first. Lookups
/// are by label, matching how callers reference statement line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    periods: Vec<String>,
    rows: Vec<(String, Vec<f64>)>,
}

impl StatementTable {
    /// Build a table from period labels and labelled rows.
    ///
    /// Rows whose length differs from `periods` are padded or truncated
    /// to fit; a duplicate label overwrites the earlier row.
    pub fn new(periods: Vec<String>, rows: Vec<(String, Vec<f64>)>) -> Self {
        let width = periods.len();
        let mut table = Self {
            periods,
            rows: Vec::with_capacity(rows.len()),
        };
        for (label, mut values) in rows {
            values.resize(width, f64::NAN);
            table.insert_row(label, values);
        }
        table
    }

    /// Period labels, earliest first.
    #[must_use]
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Row labels in table order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(label, _)| label.as_str())
    }

    /// Values for a row, by label.
    #[must_use]
    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, values)| values.as_slice())
    }

    /// True when a row with this label exists.
    #[must_use]
    pub fn has_row(&self, label: &str) -> bool {
        self.row(label).is_some()
    }

    /// Insert or replace a row. The row is padded/truncated to the
    /// table width.
    pub fn insert_row(&mut self, label: String, mut values: Vec<f64>) {
        values.resize(self.periods.len(), f64::NAN);
        if let Some(existing) = self.rows.iter_mut().find(|(l, _)| *l == label) {
            existing.1 = values;
        } else {
            self.rows.push((label, values));
        }
    }

    /// Insert an all-zero row under `label` if none exists, then return
    /// the row. Used when a requested line item is absent from a
    /// ticker's statement.
    pub fn row_or_insert_zero(&mut self, label: &str) -> &[f64] {
        if !self.has_row(label) {
            self.insert_row(label.to_string(), vec![0.0; self.periods.len()]);
        }
        self.row(label).unwrap_or(&[])
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of period columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.periods.len()
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in table order.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.rows
            .iter()
            .map(|(label, values)| (label.as_str(), values.as_slice()))
    }
}
