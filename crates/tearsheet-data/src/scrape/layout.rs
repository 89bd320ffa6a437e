//! Page layout variants for the statements site.
//!
//! The site renders the statement table inside one of two wrapper
//! positions depending on what banners it serves around the table. Each
//! variant carries its own positional selectors; the extractor probes
//! the primary variant's header row and falls back to the alternate.

use scraper::{Html, Selector};

/// Wrapper position of the statement table on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Table under the fifth child of `main`.
    Primary,
    /// Table under the fourth child of `main`.
    Alternate,
}

impl PageLayout {
    /// Index of the `main` child wrapping the table.
    const fn wrapper_index(self) -> usize {
        match self {
            Self::Primary => 5,
            Self::Alternate => 4,
        }
    }

    /// Selector for the 1-based `col`-th header cell.
    #[must_use]
    pub fn header_selector(self, col: usize) -> String {
        format!(
            "main > div:nth-child({}) table thead tr th:nth-child({})",
            self.wrapper_index(),
            col
        )
    }

    /// Selector for the label cell of the 1-based `row`-th body row.
    #[must_use]
    pub fn label_selector(self, row: usize) -> String {
        self.cell_selector(row, 1)
    }

    /// Selector for the 1-based (`row`, `col`) body cell.
    #[must_use]
    pub fn cell_selector(self, row: usize, col: usize) -> String {
        format!(
            "main > div:nth-child({}) table tbody tr:nth-child({}) td:nth-child({})",
            self.wrapper_index(),
            row,
            col
        )
    }
}

/// Text of the first element matching `selector`, if any.
///
/// Whitespace is collapsed the way a browser renders it.
pub(crate) fn select_text(document: &Html, selector: &str) -> Option<String> {
    let parsed = Selector::parse(selector).ok()?;
    let element = document.select(&parsed).next()?;
    let text: String = element.text().collect::<Vec<_>>().join(" ");
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Decide which layout variant the page uses.
///
/// Probes the primary variant's first header cell; a miss means the
/// table sits in the alternate wrapper. `None` when neither variant
/// has any header at all.
#[must_use]
pub fn detect_layout(document: &Html) -> Option<PageLayout> {
    for layout in [PageLayout::Primary, PageLayout::Alternate] {
        if select_text(document, &layout.header_selector(1)).is_some() {
            return Some(layout);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(wrapper_index: usize) -> Html {
        let mut divs = String::new();
        for i in 1..=6 {
            if i == wrapper_index {
                divs.push_str(
                    "<div><table><thead><tr><th>Year</th><th>2022</th></tr></thead>\
                     <tbody><tr><td>Revenue</td><td>100</td></tr></tbody></table></div>",
                );
            } else {
                divs.push_str("<div></div>");
            }
        }
        Html::parse_document(&format!("<html><body><main>{}</main></body></html>", divs))
    }

    #[test]
    fn test_detect_primary_layout() {
        assert_eq!(detect_layout(&page(5)), Some(PageLayout::Primary));
    }

    #[test]
    fn test_detect_alternate_layout() {
        assert_eq!(detect_layout(&page(4)), Some(PageLayout::Alternate));
    }

    #[test]
    fn test_detect_no_table() {
        let document = Html::parse_document("<html><body><main></main></body></html>");
        assert_eq!(detect_layout(&document), None);
    }

    #[test]
    fn test_cell_selector_positions() {
        let selector = PageLayout::Primary.cell_selector(3, 2);
        assert!(selector.contains("div:nth-child(5)"));
        assert!(selector.contains("tr:nth-child(3)"));
        assert!(selector.contains("td:nth-child(2)"));
    }
}
