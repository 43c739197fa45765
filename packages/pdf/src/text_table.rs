//! Table detection in laid-out page text.
//!
//! Text extracted from report PDFs keeps the page's horizontal spacing, so
//! table columns show up as runs of spaces between cells. A table is a
//! block of consecutive non-blank lines in which enough lines split into
//! two or more cells. Single-cell lines inside such a block (a title above
//! the header, a wrapped facility name) stay in the table as one-cell rows.

use prea_report_models::{Row, Table, TableSettings};

/// Detects the tables on one page of laid-out text, top to bottom.
#[must_use]
pub fn detect_tables(text: &str, settings: &TableSettings) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut block: Vec<Row> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            close_block(&mut block, &mut tables, settings);
            continue;
        }
        block.push(split_cells(line, settings.min_column_gap));
    }
    close_block(&mut block, &mut tables, settings);

    log::trace!("Detected {} table(s) in {} bytes of text", tables.len(), text.len());

    tables
}

/// Splits one line into cells at tabs or at runs of at least `min_gap`
/// spaces. Shorter runs of spaces stay inside the cell.
#[must_use]
pub fn split_cells(line: &str, min_gap: usize) -> Row {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0;

    for ch in line.trim().chars() {
        match ch {
            '\t' => {
                close_cell(&mut current, &mut cells);
                spaces = 0;
            }
            ' ' => spaces += 1,
            _ => {
                if spaces >= min_gap {
                    close_cell(&mut current, &mut cells);
                } else if !current.is_empty() {
                    current.extend(std::iter::repeat_n(' ', spaces));
                }
                spaces = 0;
                current.push(ch);
            }
        }
    }
    close_cell(&mut current, &mut cells);

    cells
}

fn close_cell(current: &mut String, cells: &mut Row) {
    if !current.is_empty() {
        cells.push(std::mem::take(current));
    }
}

fn close_block(block: &mut Vec<Row>, tables: &mut Vec<Table>, settings: &TableSettings) {
    let multi_cell_rows = block.iter().filter(|row| row.len() >= 2).count();
    if !block.is_empty() && multi_cell_rows >= settings.min_table_rows {
        tables.push(std::mem::take(block));
    } else {
        block.clear();
    }
}
