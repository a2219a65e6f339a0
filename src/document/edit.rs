//! In-place mutations of `docx-rs` tables and cells.
//!
//! `docx-rs` builders consume `self`; mutators here swap the element out with
//! `std::mem::replace`, apply the builder and put the result back.

use super::markup::{first_run, paragraphs};
use crate::analysis::BorderSide;
use crate::errors::DocxTableError;
use docx_rs::{
    AlignmentType, BorderType, BreakType, Paragraph, ParagraphChild, Run, RunFonts, RunProperty,
    Shading, ShdType, Table, TableCell, TableCellBorder, TableCellBorderPosition,
    TableCellBorders, TableCellContent, TableChild, TableRow, TableRowChild, VAlignType,
};
use std::collections::BTreeSet;

/// Text width of a default portrait page in twentieths of a point.
const DEFAULT_TEXT_WIDTH_TWIPS: usize = 9_000;

/// Run attributes to apply. `None` leaves an attribute untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    pub font_family: Option<String>,
    pub half_points: Option<u32>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strike: Option<bool>,
}

impl TextFormat {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderSpec {
    pub border_type: BorderType,
    pub size: usize,
    pub color: String,
}

fn empty_cell() -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new())
}

fn row_child(row: TableRow) -> TableChild {
    Table::new(vec![row]).rows.remove(0)
}

fn cell_child(cell: TableCell) -> TableRowChild {
    TableRow::new(vec![cell]).cells.remove(0)
}

fn row_mut(child: &mut TableChild) -> &mut TableRow {
    let TableChild::TableRow(row) = child;
    let row: &mut TableRow = row;
    row
}

fn cell_mut_of(child: &mut TableRowChild) -> &mut TableCell {
    let TableRowChild::TableCell(cell) = child;
    let cell: &mut TableCell = cell;
    cell
}

fn paragraphs_mut(cell: &mut TableCell) -> impl Iterator<Item = &mut Paragraph> {
    cell.children.iter_mut().filter_map(|content| match content {
        TableCellContent::Paragraph(paragraph) => {
            let paragraph: &mut Paragraph = paragraph;
            Some(paragraph)
        }
        _ => None,
    })
}

fn runs_mut(paragraph: &mut Paragraph) -> impl Iterator<Item = &mut Run> {
    paragraph.children.iter_mut().filter_map(|child| match child {
        ParagraphChild::Run(run) => {
            let run: &mut Run = run;
            Some(run)
        }
        _ => None,
    })
}

pub fn row_count(table: &Table) -> usize {
    table.rows.len()
}

/// Widest row, falling back to the grid for tables without rows.
pub fn column_count(table: &Table) -> usize {
    super::markup::rows(table)
        .map(|row| row.cells.len())
        .max()
        .unwrap_or(table.grid.len())
}

/// New table with `rows` x `cols` empty cells; `headers` fill row 0.
pub fn build_table(rows: usize, cols: usize, headers: Option<&[String]>) -> Table {
    let table_rows = (0..rows)
        .map(|row| {
            let cells = (0..cols)
                .map(|col| match headers.and_then(|headers| headers.get(col)) {
                    Some(header) if row == 0 => text_cell(header, None, None),
                    _ => empty_cell(),
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.grid = vec![DEFAULT_TEXT_WIDTH_TWIPS / cols.max(1); cols];
    table
}

pub fn cell(table: &Table, row: usize, column: usize) -> Result<&TableCell, DocxTableError> {
    let rows = row_count(table);
    let table_row = super::markup::rows(table)
        .nth(row)
        .ok_or(DocxTableError::RowOutOfRange { row, rows })?;
    let columns = table_row.cells.len();
    super::markup::cells(table_row)
        .nth(column)
        .ok_or(DocxTableError::ColumnOutOfRange {
            row,
            column,
            columns,
        })
}

pub fn cell_mut(
    table: &mut Table,
    row: usize,
    column: usize,
) -> Result<&mut TableCell, DocxTableError> {
    let rows = row_count(table);
    let table_row = table
        .rows
        .get_mut(row)
        .map(row_mut)
        .ok_or(DocxTableError::RowOutOfRange { row, rows })?;
    let columns = table_row.cells.len();
    table_row
        .cells
        .get_mut(column)
        .map(cell_mut_of)
        .ok_or(DocxTableError::ColumnOutOfRange {
            row,
            column,
            columns,
        })
}

/// Insert `count` empty rows before row `at` (`at == rows` appends).
pub fn insert_rows(table: &mut Table, at: usize, count: usize) -> Result<(), DocxTableError> {
    let rows = row_count(table);
    if at > rows {
        return Err(DocxTableError::RowOutOfRange { row: at, rows });
    }
    let width = column_count(table).max(1);
    for offset in 0..count {
        let row = TableRow::new((0..width).map(|_| empty_cell()).collect());
        table.rows.insert(at + offset, row_child(row));
    }
    Ok(())
}

/// Insert `count` empty cells before column `at` in every row. Rows shorter
/// than `at` receive the cells at their end.
pub fn insert_columns(table: &mut Table, at: usize, count: usize) -> Result<(), DocxTableError> {
    if table.rows.is_empty() {
        return Err(DocxTableError::InvalidDataFormat(
            "Cannot add columns to empty table".to_string(),
        ));
    }
    let columns = column_count(table);
    if at > columns {
        return Err(DocxTableError::ColumnOutOfRange {
            row: 0,
            column: at,
            columns,
        });
    }

    for child in table.rows.iter_mut() {
        let row = row_mut(child);
        let position = at.min(row.cells.len());
        for offset in 0..count {
            row.cells.insert(position + offset, cell_child(empty_cell()));
        }
    }

    if !table.grid.is_empty() {
        let position = at.min(table.grid.len());
        let width = table
            .grid
            .get(position)
            .or_else(|| table.grid.last())
            .copied()
            .unwrap_or(DEFAULT_TEXT_WIDTH_TWIPS / (columns + count));
        for offset in 0..count {
            table.grid.insert(position + offset, width);
        }
    }
    Ok(())
}

/// Delete the given rows, highest index first. Every index is checked before
/// anything is removed. Returns the number of distinct rows deleted.
pub fn delete_rows(table: &mut Table, indices: &[usize]) -> Result<usize, DocxTableError> {
    let rows = row_count(table);
    let unique: BTreeSet<usize> = indices.iter().copied().collect();
    if let Some(&row) = unique.iter().find(|&&row| row >= rows) {
        return Err(DocxTableError::RowOutOfRange { row, rows });
    }
    for &row in unique.iter().rev() {
        table.rows.remove(row);
    }
    Ok(unique.len())
}

fn text_run(text: &str, property: Option<RunProperty>) -> Run {
    let mut run = Run::new();
    for (line_index, line) in text.split('\n').enumerate() {
        if line_index > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        for (segment_index, segment) in line.split('\t').enumerate() {
            if segment_index > 0 {
                run = run.add_tab();
            }
            if !segment.is_empty() {
                run = run.add_text(segment);
            }
        }
    }
    if let Some(property) = property {
        run.run_property = property;
    }
    run
}

fn text_cell(
    text: &str,
    paragraph_property: Option<docx_rs::ParagraphProperty>,
    run_property: Option<RunProperty>,
) -> TableCell {
    let mut paragraph = Paragraph::new().add_run(text_run(text, run_property));
    if let Some(property) = paragraph_property {
        paragraph.property = property;
    }
    TableCell::new().add_paragraph(paragraph)
}

/// Replace the cell's content with a single paragraph holding `text`.
/// The first paragraph's properties and its first run's properties carry
/// over; cell properties are untouched.
pub fn set_cell_text(cell: &mut TableCell, text: &str) {
    let first = paragraphs(cell).next();
    let paragraph_property = first.map(|paragraph| paragraph.property.clone());
    let run_property = first
        .and_then(first_run)
        .map(|run| run.run_property.clone());

    let replacement = text_cell(text, paragraph_property, run_property);
    cell.children = replacement.children;
}

fn ensure_paragraph(cell: &mut TableCell) {
    if paragraphs(cell).next().is_none() {
        let taken = std::mem::replace(cell, TableCell::new());
        *cell = taken.add_paragraph(Paragraph::new());
    }
}

fn apply_run_format(property: RunProperty, format: &TextFormat) -> RunProperty {
    let mut property = property;
    if let Some(family) = &format.font_family {
        property = property.fonts(
            RunFonts::new()
                .ascii(family)
                .hi_ansi(family)
                .east_asia(family)
                .cs(family),
        );
    }
    if let Some(half_points) = format.half_points {
        property = property.size(half_points as usize);
    }
    if let Some(color) = &format.color {
        property = property.color(color);
    }
    match format.bold {
        Some(true) => property = property.bold(),
        Some(false) => property = property.disable_bold(),
        None => {}
    }
    match format.italic {
        Some(true) => property = property.italic(),
        Some(false) => property = property.disable_italic(),
        None => {}
    }
    match format.underline {
        Some(true) => property = property.underline("single"),
        Some(false) => property = property.underline("none"),
        None => {}
    }
    match format.strike {
        Some(true) => property = property.strike(),
        Some(false) => property.strike = None,
        None => {}
    }
    property
}

/// Apply run attributes to every run of every paragraph. Paragraphs without
/// runs receive an empty run first so the attributes stick.
pub fn apply_text_format(cell: &mut TableCell, format: &TextFormat) {
    ensure_paragraph(cell);
    for paragraph in paragraphs_mut(cell) {
        if runs_mut(paragraph).next().is_none() {
            let taken = std::mem::replace(paragraph, Paragraph::new());
            *paragraph = taken.add_run(Run::new());
        }
        for run in runs_mut(paragraph) {
            let property = std::mem::replace(&mut run.run_property, RunProperty::new());
            run.run_property = apply_run_format(property, format);
        }
    }
}

pub fn apply_horizontal_alignment(cell: &mut TableCell, alignment: AlignmentType) {
    ensure_paragraph(cell);
    for paragraph in paragraphs_mut(cell) {
        let taken = std::mem::replace(paragraph, Paragraph::new());
        *paragraph = taken.align(alignment.clone());
    }
}

pub fn apply_vertical_alignment(cell: &mut TableCell, alignment: VAlignType) {
    let taken = std::mem::replace(cell, TableCell::new());
    *cell = taken.vertical_align(alignment);
}

/// Clear shading with `fill` as the background colour.
pub fn apply_background(cell: &mut TableCell, fill: &str) {
    let taken = std::mem::replace(cell, TableCell::new());
    *cell = taken.shading(
        Shading::new()
            .shd_type(ShdType::Clear)
            .color("auto")
            .fill(fill),
    );
}

/// Replace the cell's borders with the given sides.
pub fn apply_borders(cell: &mut TableCell, sides: &[(BorderSide, BorderSpec)]) {
    let mut borders = TableCellBorders::with_empty();
    for (side, spec) in sides {
        let position = match side {
            BorderSide::Top => TableCellBorderPosition::Top,
            BorderSide::Bottom => TableCellBorderPosition::Bottom,
            BorderSide::Left => TableCellBorderPosition::Left,
            BorderSide::Right => TableCellBorderPosition::Right,
        };
        borders = borders.set(
            TableCellBorder::new(position)
                .border_type(spec.border_type.clone())
                .size(spec.size)
                .color(spec.color.clone()),
        );
    }
    let taken = std::mem::replace(cell, TableCell::new());
    *cell = taken.set_borders(borders);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{CellView, extract_cell_style};
    use crate::document::markup::{DocxCellView, cell_text};

    fn sample() -> Table {
        build_table(3, 2, Some(&["Name".to_string(), "Role".to_string()]))
    }

    #[test]
    fn build_table_fills_headers_and_grid() {
        let table = sample();
        assert_eq!(row_count(&table), 3);
        assert_eq!(column_count(&table), 2);
        assert_eq!(table.grid.len(), 2);
        assert_eq!(cell_text(cell(&table, 0, 1).unwrap()), "Role");
        assert_eq!(cell_text(cell(&table, 2, 0).unwrap()), "");
    }

    #[test]
    fn bounds_are_checked_against_current_shape() {
        let mut table = sample();
        assert!(matches!(
            cell(&table, 3, 0),
            Err(DocxTableError::RowOutOfRange { row: 3, rows: 3 })
        ));
        assert!(matches!(
            cell(&table, 0, 2),
            Err(DocxTableError::ColumnOutOfRange { columns: 2, .. })
        ));

        delete_rows(&mut table, &[2]).unwrap();
        assert!(cell(&table, 2, 0).is_err());
        insert_columns(&mut table, 2, 1).unwrap();
        assert!(cell(&table, 0, 2).is_ok());
    }

    #[test]
    fn insert_rows_and_columns_keep_grid_in_sync() {
        let mut table = sample();
        insert_rows(&mut table, 0, 2).unwrap();
        assert_eq!(row_count(&table), 5);
        assert_eq!(cell_text(cell(&table, 2, 0).unwrap()), "Name");

        insert_columns(&mut table, 1, 2).unwrap();
        assert_eq!(column_count(&table), 4);
        assert_eq!(table.grid.len(), 4);
        assert_eq!(cell_text(cell(&table, 2, 3).unwrap()), "Role");

        assert!(insert_rows(&mut table, 9, 1).is_err());
    }

    #[test]
    fn columns_cannot_be_added_to_a_table_without_rows() {
        let mut table = sample();
        delete_rows(&mut table, &[0, 1, 2]).unwrap();
        let err = insert_columns(&mut table, 0, 1).unwrap_err();
        assert_eq!(err.code(), "INVALID_DATA_FORMAT");
    }

    #[test]
    fn delete_rows_dedups_and_validates_first() {
        let mut table = sample();
        assert!(delete_rows(&mut table, &[0, 7]).is_err());
        assert_eq!(row_count(&table), 3);

        let deleted = delete_rows(&mut table, &[1, 1, 0]).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(row_count(&table), 1);
    }

    #[test]
    fn set_cell_text_keeps_run_formatting() {
        let mut table = sample();
        let target = cell_mut(&mut table, 0, 0).unwrap();
        apply_text_format(
            target,
            &TextFormat {
                bold: Some(true),
                ..TextFormat::default()
            },
        );
        set_cell_text(target, "Full name\nsecond line");

        let view = DocxCellView::new(target);
        assert_eq!(view.text(), "Full name\nsecond line");
        let style = extract_cell_style(&view).style;
        assert_eq!(style.text_format.bold, Some(true));
    }

    #[test]
    fn formatting_is_visible_to_the_style_extractor() {
        let mut table = sample();
        let target = cell_mut(&mut table, 1, 1).unwrap();
        apply_text_format(
            target,
            &TextFormat {
                font_family: Some("Arial".to_string()),
                half_points: Some(24),
                color: Some("FF0000".to_string()),
                italic: Some(true),
                ..TextFormat::default()
            },
        );
        apply_horizontal_alignment(target, AlignmentType::Right);
        apply_vertical_alignment(target, VAlignType::Center);
        apply_background(target, "00FF00");
        apply_borders(
            target,
            &[(
                BorderSide::Top,
                BorderSpec {
                    border_type: BorderType::Double,
                    size: 8,
                    color: "0000FF".to_string(),
                },
            )],
        );

        let extraction = extract_cell_style(&DocxCellView::new(target));
        assert!(extraction.failures.is_empty(), "{:?}", extraction.failures);
        let style = extraction.style;
        assert_eq!(style.text_format.font_family.as_deref(), Some("Arial"));
        assert_eq!(style.text_format.font_size, Some(12.0));
        assert_eq!(style.text_format.font_color.as_deref(), Some("FF0000"));
        assert_eq!(style.text_format.italic, Some(true));
        assert_eq!(style.text_format.bold, Some(false));
        assert_eq!(style.alignment.horizontal.as_deref(), Some("right"));
        assert_eq!(style.alignment.vertical.as_deref(), Some("center"));
        assert_eq!(style.background.color.as_deref(), Some("00FF00"));
        let top = style.borders.top.expect("top border");
        assert_eq!(top.style.as_deref(), Some("double"));
        assert_eq!(top.width, Some(8));
        assert_eq!(top.color.as_deref(), Some("0000FF"));
    }
}
