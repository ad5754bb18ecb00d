//! Column-aligned tables for list output

use console::{Alignment, measure_text_width, pad_str};

const MIN_WIDTH: usize = 10;
const PADDING: usize = 3;

/// Render a header row and data rows as left-aligned columns.
///
/// The last column is never padded, so lines carry no trailing whitespace.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(measure_text_width(cell));
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header_cells).chain(rows.iter()) {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                out.push_str(cell);
            } else {
                let width = widths[i].max(MIN_WIDTH) + PADDING;
                out.push_str(&pad_str(cell, width, Alignment::Left, None));
            }
        }
        out.push('\n');
    }
    out
}
