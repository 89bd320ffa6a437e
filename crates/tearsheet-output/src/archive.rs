//! JSON sheet archive.
//!
//! The workbook writer is write-only, so past runs cannot be read back
//! out of the `.xlsx` file. Every rendered sheet is therefore recorded
//! in a JSON sidecar next to the workbook, and each run rewrites the
//! workbook from the archive plus the sheet it just built. Re-running
//! on the same date replaces that date's sheet; other dates survive.

use crate::error::Result;
use crate::layout::CellStyle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One written cell: position, preformatted text and style tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Zero-based row.
    pub row: u32,
    /// Zero-based column.
    pub col: u16,
    /// Display text, already number-formatted.
    pub value: String,
    /// Style tag resolved at write time.
    pub style: CellStyle,
}

/// One merged block of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// Zero-based first row.
    pub first_row: u32,
    /// Zero-based first column.
    pub first_col: u16,
    /// Zero-based last row.
    pub last_row: u32,
    /// Zero-based last column.
    pub last_col: u16,
    /// Text placed in the merged block.
    pub value: String,
    /// Style tag resolved at write time.
    pub style: CellStyle,
}

/// Everything needed to replay one worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Worksheet name, the run date as `%Y-%m-%d`.
    pub name: String,
    /// Individual cells in write order.
    pub cells: Vec<CellRecord>,
    /// Merged blocks.
    pub merges: Vec<MergeRecord>,
}

/// Archive of every sheet rendered for one ticker, keyed by sheet name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetArchive {
    sheets: BTreeMap<String, Sheet>,
}

impl SheetArchive {
    /// Load an archive, or an empty one when the sidecar is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no sheet archive, starting fresh");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persist the archive next to the workbook.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Insert a sheet, replacing any previous run of the same date.
    pub fn insert(&mut self, sheet: Sheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }

    /// Sheets in name (date) order.
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    /// Number of archived sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether the archive holds no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sheet(name: &str, text: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            cells: vec![CellRecord {
                row: 0,
                col: 0,
                value: text.to_string(),
                style: CellStyle::Header,
            }],
            merges: vec![],
        }
    }

    #[test]
    fn test_missing_sidecar_is_empty_archive() {
        let dir = tempdir().unwrap();
        let archive = SheetArchive::load(&dir.path().join("none.sheets.json")).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("AAPL_tearsheet.sheets.json");

        let mut archive = SheetArchive::default();
        archive.insert(sheet("2026-08-22", "Apple Inc"));
        archive.store(&path).unwrap();

        let reloaded = SheetArchive::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(
            reloaded.sheets().next().unwrap().cells[0].value,
            "Apple Inc"
        );
    }

    #[test]
    fn test_same_date_replaces_sheet() {
        let mut archive = SheetArchive::default();
        archive.insert(sheet("2026-08-23", "first run"));
        archive.insert(sheet("2026-08-23", "second run"));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.sheets().next().unwrap().cells[0].value, "second run");
    }

    #[test]
    fn test_sheets_come_back_in_date_order() {
        let mut archive = SheetArchive::default();
        archive.insert(sheet("2026-08-23", "later"));
        archive.insert(sheet("2026-01-05", "earlier"));
        let names: Vec<&str> = archive.sheets().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["2026-01-05", "2026-08-23"]);
    }
}
