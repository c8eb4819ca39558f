//! Plain-text rendering primitive.

use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{FinalTableProps, RenderPrimitive};
use crate::error::RenderError;
use crate::model::Column;

/// Widest a column may grow when it has no explicit width.
const MAX_AUTO_WIDTH: usize = 40;

/// Column separator.
const SEPARATOR: &str = " │ ";

/// A painted text table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextView {
    /// Rendered lines, header first.
    pub lines: Vec<String>,
}

impl TextView {
    /// Returns `true` if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for TextView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Paints tables as fixed-width text: header, rule, rows, pager summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPrimitive;

impl TextPrimitive {
    /// Create the primitive.
    pub fn new() -> Self {
        Self
    }
}

impl RenderPrimitive for TextPrimitive {
    type View = TextView;

    fn render(&self, props: &FinalTableProps) -> Result<TextView, RenderError> {
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(props.data.len());
        for (index, record) in props.data.iter().enumerate() {
            let row = props
                .columns
                .iter()
                .map(|column| column.cell_text(record, index))
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(row);
        }

        let headers: Vec<String> = props.columns.iter().map(Column::header_text).collect();
        let widths: Vec<usize> = props
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| column_width(column, &headers[i], cells.iter().map(|row| &row[i])))
            .collect();

        let selection = props.row_selection.as_ref();
        let mut lines = Vec::with_capacity(cells.len() + 3);
        let marker_header = selection.map(|_| "   ").unwrap_or_default();
        lines.push(format!("{marker_header}{}", join_row(&headers, &widths)));
        lines.push(format!(
            "{marker_header}{}",
            widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join("─┼─")
        ));

        if props.loading {
            lines.push("Loading…".to_string());
        } else if cells.is_empty() {
            lines.push(props.no_data_element.clone());
        } else {
            for (record, row) in props.data.iter().zip(&cells) {
                let marker = match selection {
                    Some(sel) => {
                        let key = record.get(&props.row_key).cloned().unwrap_or_default();
                        if sel.is_selected(&key) { "[x]" } else { "[ ]" }
                    }
                    None => "",
                };
                lines.push(format!("{marker}{}", join_row(row, &widths)));
            }
        }

        if let Some(pagination) = &props.pagination {
            let mut footer = format!(
                "Page {} of {}",
                pagination.current,
                pagination.page_count()
            );
            if pagination.show_total {
                footer.push_str(&format!(" · {} items", pagination.total));
            }
            if pagination.show_size_changer {
                footer.push_str(&format!(" · {} / page", pagination.page_size));
            }
            lines.push(footer);
        }

        Ok(TextView { lines })
    }
}

fn column_width<'a>(column: &Column, header: &str, cells: impl Iterator<Item = &'a String>) -> usize {
    if let Some(width) = column.width {
        return width as usize;
    }
    cells
        .map(|cell| cell.width())
        .chain(std::iter::once(header.width()))
        .max()
        .unwrap_or(0)
        .min(MAX_AUTO_WIDTH)
}

fn join_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| fit(cell, *width))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .trim_end()
        .to_string()
}

/// Pad or truncate `text` to exactly `width` display columns.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{text}{}", " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    let budget = width.saturating_sub(1);
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
