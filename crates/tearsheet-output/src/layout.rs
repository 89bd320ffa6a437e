//! Sheet layout and cell styling.
//!
//! Anchors are zero-based worksheet coordinates; the doc comments give
//! the spreadsheet address each table starts at.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};
use serde::{Deserialize, Serialize};

/// Header fill, a muted steel blue.
const HEADER_FILL: Color = Color::RGB(0x4F81BD);

/// Subheader fill, light grey.
const SUBHEADER_FILL: Color = Color::RGB(0xD3D3D3);

/// Anchor of one table: its subheader row and the columns it spans.
#[derive(Debug, Clone)]
pub struct Section {
    /// Zero-based row of the subheader.
    pub row: u32,
    /// Zero-based columns, label column first.
    pub cols: &'static [u16],
}

/// Where each tearsheet table sits on the sheet.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Price, margins and per-share snapshot. A2:B.
    pub market_profile: Section,
    /// TTM vs projected fundamentals. A19:C.
    pub key_financials: Section,
    /// Projected share price per valuation method. A26:C.
    pub valuation_method: Section,
    /// Exchange, industry, sector and ratings. C2:F.
    pub business_summary: Section,
    /// Merged description block. C6:F.
    pub investment_highlights: Section,
    /// Average vs forecast growth rates. D19:F.
    pub historical_growth: Section,
    /// Multiple statistics. D26:G.
    pub historical_ratios: Section,
    /// Per-share rebuild of the price. G2:I.
    pub rebuilt_share: Section,
    /// Rows the merged highlights block spans below its subheader.
    pub highlights_depth: u32,
    /// Width of the leading label column.
    pub label_column_width: f64,
    /// Width of every other used column.
    pub column_width: f64,
    /// Columns the top banner and widths cover.
    pub sheet_columns: u16,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            market_profile: Section { row: 1, cols: &[0, 1] },
            key_financials: Section { row: 18, cols: &[0, 1, 2] },
            valuation_method: Section { row: 25, cols: &[0, 1, 2] },
            business_summary: Section { row: 1, cols: &[2, 3, 4, 5] },
            investment_highlights: Section { row: 5, cols: &[2, 3, 4, 5] },
            historical_growth: Section { row: 18, cols: &[3, 4, 5] },
            historical_ratios: Section { row: 25, cols: &[3, 4, 5, 6] },
            rebuilt_share: Section { row: 1, cols: &[6, 7, 8] },
            highlights_depth: 12,
            label_column_width: 40.0,
            column_width: 20.0,
            sheet_columns: 9,
        }
    }
}

/// Style tag carried by every archived cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStyle {
    /// Top banner: bold 16pt white on blue.
    Header,
    /// Table header: bold 12pt on grey, thin border.
    Subheader,
    /// Row label: 11pt, left aligned, thin border.
    Label,
    /// Data cell: 11pt, right aligned, thin border.
    Value,
    /// Summary-row label: top border only.
    TotalLabel,
    /// Summary-row value: right aligned, top border only.
    TotalValue,
    /// Wrapped paragraph, top-left anchored.
    Wrapped,
}

/// Materialize the format a style tag stands for.
pub(crate) fn format_for(style: CellStyle) -> Format {
    match style {
        CellStyle::Header => Format::new()
            .set_bold()
            .set_font_size(16)
            .set_font_color(Color::White)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Left),
        CellStyle::Subheader => Format::new()
            .set_bold()
            .set_font_size(12)
            .set_background_color(SUBHEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin),
        CellStyle::Label => Format::new()
            .set_font_size(11)
            .set_align(FormatAlign::Left)
            .set_border(FormatBorder::Thin),
        CellStyle::Value => Format::new()
            .set_font_size(11)
            .set_align(FormatAlign::Right)
            .set_border(FormatBorder::Thin),
        CellStyle::TotalLabel => Format::new()
            .set_font_size(11)
            .set_align(FormatAlign::Left)
            .set_border_top(FormatBorder::Thin),
        CellStyle::TotalValue => Format::new()
            .set_font_size(11)
            .set_align(FormatAlign::Right)
            .set_border_top(FormatBorder::Thin),
        CellStyle::Wrapped => Format::new()
            .set_font_size(11)
            .set_text_wrap()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::Top),
    }
}
