use super::{CellMarkup, MarkupError, TableView, VerticalMerge};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MergeType {
    Horizontal,
    Vertical,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MergeDescriptor {
    #[serde(rename = "type")]
    pub merge_type: MergeType,
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub span_rows: usize,
    pub span_cols: usize,
}

/// Classify a cell's merge markers.
///
/// Only the presence of the vertical-merge marker is considered, so a
/// vertical descriptor always spans a single row. Use
/// [`resolve_vertical_extent`] to measure the real height.
pub fn detect_merge(
    markup: &dyn CellMarkup,
    row: usize,
    column: usize,
) -> Result<Option<MergeDescriptor>, MarkupError> {
    let span = markup.grid_span()?.unwrap_or(1).max(1);
    let vertical = markup.vertical_merge()?.is_some();

    let merge_type = match (span > 1, vertical) {
        (true, true) => MergeType::Both,
        (true, false) => MergeType::Horizontal,
        (false, true) => MergeType::Vertical,
        (false, false) => return Ok(None),
    };

    Ok(Some(MergeDescriptor {
        merge_type,
        start_row: row,
        end_row: row,
        start_col: column,
        end_col: column + span - 1,
        span_rows: 1,
        span_cols: span,
    }))
}

/// Grid column where the `column`-th cell of `row` starts.
pub fn grid_offset(table: &dyn TableView, row: usize, column: usize) -> Option<usize> {
    let mut offset = 0;
    for index in 0..column {
        let cell = table.cell(row, index)?;
        offset += cell.markup().grid_span().ok().flatten().unwrap_or(1).max(1);
    }
    Some(offset)
}

fn cell_at_grid_offset(table: &dyn TableView, row: usize, target: usize) -> Option<usize> {
    let mut offset = 0;
    for index in 0..table.cell_count(row) {
        if offset == target {
            return Some(index);
        }
        if offset > target {
            return None;
        }
        let cell = table.cell(row, index)?;
        offset += cell.markup().grid_span().ok().flatten().unwrap_or(1).max(1);
    }
    None
}

/// Whether the cell is a continuation whose region already started in the
/// row above, at the same grid column.
pub fn continues_region_above(table: &dyn TableView, row: usize, column: usize) -> bool {
    let Some(cell) = table.cell(row, column) else {
        return false;
    };
    if row == 0 || cell.markup().vertical_merge().ok().flatten() != Some(VerticalMerge::Continue) {
        return false;
    }
    let above = grid_offset(table, row, column)
        .and_then(|offset| cell_at_grid_offset(table, row - 1, offset))
        .and_then(|index| table.cell(row - 1, index));
    above.is_some_and(|cell| cell.markup().vertical_merge().ok().flatten().is_some())
}

/// Extend a vertical descriptor that starts a merge region down through the
/// continuation cells below it, matched by grid column.
///
/// Descriptors whose cell is itself a continuation are left untouched.
pub fn resolve_vertical_extent(
    table: &dyn TableView,
    descriptor: &mut MergeDescriptor,
) -> Result<(), MarkupError> {
    if descriptor.merge_type == MergeType::Horizontal {
        return Ok(());
    }
    let Some(cell) = table.cell(descriptor.start_row, descriptor.start_col) else {
        return Ok(());
    };
    if cell.markup().vertical_merge()? != Some(VerticalMerge::Restart) {
        return Ok(());
    }
    let Some(offset) = grid_offset(table, descriptor.start_row, descriptor.start_col) else {
        return Ok(());
    };

    let mut end_row = descriptor.start_row;
    for row in descriptor.start_row + 1..table.row_count() {
        let Some(index) = cell_at_grid_offset(table, row, offset) else {
            break;
        };
        let Some(below) = table.cell(row, index) else {
            break;
        };
        if below.markup().vertical_merge()? != Some(VerticalMerge::Continue) {
            break;
        }
        end_row = row;
    }

    descriptor.end_row = end_row;
    descriptor.span_rows = end_row - descriptor.start_row + 1;
    Ok(())
}
