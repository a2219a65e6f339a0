#![allow(dead_code)]
use docx_rs::{
    Docx, Paragraph, Run, RunFonts, Shading, Table, TableCell, TableRow, VMergeType,
};

pub fn paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

pub fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(paragraph(text))
}

pub fn run_cell(run: Run) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

pub fn font_cell(text: &str, family: &str) -> TableCell {
    run_cell(
        Run::new()
            .add_text(text)
            .fonts(RunFonts::new().ascii(family)),
    )
}

pub fn shaded_cell(text: &str, fill: &str) -> TableCell {
    text_cell(text).shading(Shading::new().fill(fill))
}

pub fn spanning_cell(text: &str, span: usize) -> TableCell {
    text_cell(text).grid_span(span)
}

pub fn merge_start(text: &str) -> TableCell {
    text_cell(text).vertical_merge(VMergeType::Restart)
}

pub fn merge_continue() -> TableCell {
    TableCell::new()
        .add_paragraph(Paragraph::new())
        .vertical_merge(VMergeType::Continue)
}

pub fn table_of(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|row| TableRow::new(row.iter().map(|text| text_cell(text)).collect()))
            .collect(),
    )
}

pub fn table_from_cells(rows: Vec<Vec<TableCell>>) -> Table {
    Table::new(rows.into_iter().map(TableRow::new).collect())
}

/// A document with an intro paragraph followed by `tables`.
pub fn document_with(tables: Vec<Table>) -> Docx {
    let mut docx = Docx::new().add_paragraph(paragraph("Quarterly report"));
    for table in tables {
        docx = docx.add_table(table);
    }
    docx
}

pub fn staff_table() -> Table {
    table_of(&[
        &["Name", "Team", "Location"],
        &["Ada", "Platform", "London"],
        &["Grace", "Compilers", "Arlington"],
    ])
}
