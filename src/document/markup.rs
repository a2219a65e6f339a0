//! Read-only adapter exposing `docx-rs` tables through the analyzer
//! capabilities.
//!
//! `docx-rs` keeps most property fields private but serializes all of them,
//! so properties are inspected through their JSON form. Readers accept both
//! bare values and `{ "val": .. }` wrappers, camelCase and snake_case keys.

use crate::analysis::{
    BorderFacts, BorderSide, CellMarkup, CellView, MarkupError, RunFacts, TableProperties,
    TableView, VerticalMerge,
};
use docx_rs::{
    Paragraph, ParagraphChild, Run, RunChild, Table, TableCell, TableCellContent, TableChild,
    TableRow, TableRowChild,
};
use serde_json::Value;

pub fn rows(table: &Table) -> impl Iterator<Item = &TableRow> {
    table.rows.iter().map(|child| {
        let TableChild::TableRow(row) = child;
        let row: &TableRow = row;
        row
    })
}

pub fn cells(row: &TableRow) -> impl Iterator<Item = &TableCell> {
    row.cells.iter().map(|child| {
        let TableRowChild::TableCell(cell) = child;
        let cell: &TableCell = cell;
        cell
    })
}

pub fn paragraphs(cell: &TableCell) -> impl Iterator<Item = &Paragraph> {
    cell.children.iter().filter_map(|content| match content {
        TableCellContent::Paragraph(paragraph) => {
            let paragraph: &Paragraph = paragraph;
            Some(paragraph)
        }
        _ => None,
    })
}

pub fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    push_children_text(&paragraph.children, &mut out);
    out
}

fn push_children_text(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, out),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, out),
            _ => {}
        }
    }
}

fn push_run_text(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Cell text with paragraphs joined by newlines.
pub fn cell_text(cell: &TableCell) -> String {
    paragraphs(cell)
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn first_run(paragraph: &Paragraph) -> Option<&Run> {
    paragraph.children.iter().find_map(|child| match child {
        ParagraphChild::Run(run) => {
            let run: &Run = run;
            Some(run)
        }
        _ => None,
    })
}

fn to_json<T: serde::Serialize>(element: &'static str, value: &T) -> Result<Value, MarkupError> {
    serde_json::to_value(value).map_err(|err| MarkupError::unreadable(element, err.to_string()))
}

fn field<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|found| !found.is_null())
}

fn unwrap_val(value: &Value) -> &Value {
    match value {
        Value::Object(object) => object.get("val").unwrap_or(value),
        _ => value,
    }
}

fn read_string(element: &'static str, value: &Value) -> Result<Option<String>, MarkupError> {
    match unwrap_val(value) {
        Value::Null => Ok(None),
        Value::String(text) if text.is_empty() => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(MarkupError::unexpected(element, other)),
    }
}

/// Enum-like markup values, with the first letter lower-cased.
fn read_token(element: &'static str, value: &Value) -> Result<Option<String>, MarkupError> {
    Ok(read_string(element, value)?.map(|token| {
        let mut chars = token.chars();
        match chars.next() {
            Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
            None => token,
        }
    }))
}

fn read_number(element: &'static str, value: &Value) -> Result<Option<u64>, MarkupError> {
    match unwrap_val(value) {
        Value::Null => Ok(None),
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| MarkupError::unexpected(element, number)),
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| MarkupError::unexpected(element, text)),
        other => Err(MarkupError::unexpected(element, other)),
    }
}

fn read_flag(element: &'static str, value: &Value) -> Result<Option<bool>, MarkupError> {
    match unwrap_val(value) {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "" | "true" | "1" | "on" => Ok(Some(true)),
            "false" | "0" | "off" | "none" => Ok(Some(false)),
            _ => Err(MarkupError::unexpected(element, text)),
        },
        Value::Number(number) => Ok(Some(number.as_u64() != Some(0))),
        other => Err(MarkupError::unexpected(element, other)),
    }
}

pub struct DocxCellMarkup {
    properties: Result<Value, MarkupError>,
}

impl DocxCellMarkup {
    fn new(cell: &TableCell) -> Self {
        Self {
            properties: to_json("tcPr", &cell.property),
        }
    }

    fn properties(&self) -> Result<&Value, MarkupError> {
        self.properties.as_ref().map_err(Clone::clone)
    }
}

impl CellMarkup for DocxCellMarkup {
    fn grid_span(&self) -> Result<Option<usize>, MarkupError> {
        let Some(span) = field(self.properties()?, &["gridSpan", "grid_span"]) else {
            return Ok(None);
        };
        Ok(read_number("gridSpan", span)?.map(|n| n as usize))
    }

    fn vertical_merge(&self) -> Result<Option<VerticalMerge>, MarkupError> {
        let Some(marker) = field(
            self.properties()?,
            &["verticalMerge", "vertical_merge", "vMerge"],
        ) else {
            return Ok(None);
        };
        // Only `restart` opens a region; any other value continues one.
        match read_token("vMerge", marker) {
            Ok(Some(token)) if token == "restart" => Ok(Some(VerticalMerge::Restart)),
            _ => Ok(Some(VerticalMerge::Continue)),
        }
    }

    fn shading_fill(&self) -> Result<Option<String>, MarkupError> {
        let Some(shading) = field(self.properties()?, &["shading", "shd"]) else {
            return Ok(None);
        };
        match field(shading, &["fill"]) {
            Some(fill) => read_string("shd.fill", fill),
            None => Ok(None),
        }
    }

    fn vertical_alignment(&self) -> Result<Option<String>, MarkupError> {
        match field(
            self.properties()?,
            &["verticalAlign", "vertical_align", "vAlign"],
        ) {
            Some(value) => read_token("vAlign", value),
            None => Ok(None),
        }
    }

    fn border(&self, side: BorderSide) -> Result<Option<BorderFacts>, MarkupError> {
        let Some(borders) = field(self.properties()?, &["borders", "tcBorders"]) else {
            return Ok(None);
        };
        let keys: &[&str] = match side {
            BorderSide::Top => &["top"],
            BorderSide::Bottom => &["bottom"],
            BorderSide::Left => &["left", "start"],
            BorderSide::Right => &["right", "end"],
        };
        let Some(border) = field(borders, keys) else {
            return Ok(None);
        };
        let style = match field(border, &["borderType", "border_type", "val"]) {
            Some(value) => read_token("tcBorders.val", value)?,
            None => None,
        };
        let width = match field(border, &["size", "sz"]) {
            Some(value) => read_number("tcBorders.sz", value)?.map(|n| n as u32),
            None => None,
        };
        let color = match field(border, &["color"]) {
            Some(value) => read_string("tcBorders.color", value)?,
            None => None,
        };
        Ok(Some(BorderFacts {
            style,
            width,
            color,
        }))
    }
}

pub struct DocxCellView<'a> {
    cell: &'a TableCell,
    markup: DocxCellMarkup,
}

impl<'a> DocxCellView<'a> {
    pub fn new(cell: &'a TableCell) -> Self {
        Self {
            cell,
            markup: DocxCellMarkup::new(cell),
        }
    }
}

pub fn run_facts(run: &Run) -> Result<RunFacts, MarkupError> {
    let properties = to_json("rPr", &run.run_property)?;

    let font_family = match field(&properties, &["fonts", "rFonts"]) {
        Some(fonts) => {
            let mut family = None;
            for key in ["ascii", "hiAnsi", "hi_ansi", "eastAsia", "east_asia", "cs"] {
                if let Some(value) = field(fonts, &[key]) {
                    family = read_string("rFonts", value)?;
                    if family.is_some() {
                        break;
                    }
                }
            }
            family
        }
        None => None,
    };

    let half_points = match field(&properties, &["sz", "size"]) {
        Some(value) => read_number("sz", value)?.map(|n| n as u32),
        None => None,
    };
    let color = match field(&properties, &["color"]) {
        Some(value) => read_string("color", value)?,
        None => None,
    };
    let bold = match field(&properties, &["bold", "b"]) {
        Some(value) => read_flag("b", value)?,
        None => None,
    };
    let italic = match field(&properties, &["italic", "i"]) {
        Some(value) => read_flag("i", value)?,
        None => None,
    };
    let strike = match field(&properties, &["strike"]) {
        Some(value) => read_flag("strike", value)?,
        None => None,
    };
    let underline = match field(&properties, &["underline", "u"]) {
        Some(value) => read_token("u", value)?.map(|kind| kind != "none"),
        None => None,
    };

    Ok(RunFacts {
        font_family,
        half_points,
        color,
        bold,
        italic,
        underline,
        strike,
    })
}

pub fn paragraph_alignment(paragraph: &Paragraph) -> Result<Option<String>, MarkupError> {
    let properties = to_json("pPr", &paragraph.property)?;
    match field(&properties, &["alignment", "justification", "jc"]) {
        Some(value) => read_token("jc", value),
        None => Ok(None),
    }
}

impl CellView for DocxCellView<'_> {
    fn text(&self) -> String {
        cell_text(self.cell)
    }

    fn paragraph_alignment(&self) -> Result<Option<String>, MarkupError> {
        match paragraphs(self.cell).next() {
            Some(paragraph) => paragraph_alignment(paragraph),
            None => Ok(None),
        }
    }

    fn first_run(&self) -> Result<Option<RunFacts>, MarkupError> {
        let Some(run) = paragraphs(self.cell).next().and_then(first_run) else {
            return Ok(None);
        };
        run_facts(run).map(Some)
    }

    fn markup(&self) -> &dyn CellMarkup {
        &self.markup
    }
}

pub struct DocxTableView<'a> {
    table: &'a Table,
    rows: Vec<Vec<DocxCellView<'a>>>,
}

impl<'a> DocxTableView<'a> {
    pub fn new(table: &'a Table) -> Self {
        let rows = rows(table)
            .map(|row| cells(row).map(DocxCellView::new).collect())
            .collect();
        Self { table, rows }
    }
}

impl TableView for DocxTableView<'_> {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_count(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> Option<&dyn CellView> {
        self.rows
            .get(row)?
            .get(column)
            .map(|cell| cell as &dyn CellView)
    }

    fn properties(&self) -> TableProperties {
        table_properties(self.table)
    }
}

/// Table style, justification and preferred width. Unreadable values are
/// reported as absent.
pub fn table_properties(table: &Table) -> TableProperties {
    let Ok(properties) = to_json("tblPr", &table.property) else {
        return TableProperties::default();
    };

    let style_name = field(&properties, &["style", "tblStyle"])
        .and_then(|value| read_string("tblStyle", value).ok().flatten());
    let alignment = field(&properties, &["justification", "alignment", "jc"])
        .and_then(|value| read_token("jc", value).ok().flatten());
    let width = field(&properties, &["width", "tblW"]).and_then(|width| {
        let amount =
            field(width, &["width", "w"]).and_then(|v| read_number("tblW", v).ok().flatten());
        let unit = field(width, &["widthType", "width_type", "type"])
            .and_then(|v| read_token("tblW", v).ok().flatten());
        match (amount, unit) {
            (_, Some(unit)) if unit == "auto" => Some("auto".to_string()),
            (Some(amount), Some(unit)) => Some(format!("{amount} {unit}")),
            (Some(amount), None) => Some(amount.to_string()),
            (None, _) => None,
        }
    });

    TableProperties {
        style_name,
        alignment,
        width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_are_read_bare_or_wrapped() {
        assert_eq!(read_number("sz", &json!(24)).unwrap(), Some(24));
        assert_eq!(read_number("sz", &json!({"val": "24"})).unwrap(), Some(24));
        assert_eq!(read_flag("b", &json!({"val": true})).unwrap(), Some(true));
        assert_eq!(read_token("jc", &json!("Center")).unwrap().as_deref(), Some("center"));
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(read_number("gridSpan", &json!("two")).is_err());
        assert!(read_flag("b", &json!([1])).is_err());
    }

    #[test]
    fn unrecognized_vertical_merge_value_still_counts_as_merged() {
        use crate::analysis::{CellView, MergeType, detect_merge};
        use docx_rs::{TableCell, VMergeType};

        let cell = TableCell::new().vertical_merge(VMergeType::Unsupported);
        let view = DocxCellView::new(&cell);
        assert_eq!(
            view.markup().vertical_merge().unwrap(),
            Some(VerticalMerge::Continue)
        );
        let merge = detect_merge(view.markup(), 2, 0).unwrap().expect("merge detected");
        assert_eq!(merge.merge_type, MergeType::Vertical);

        let restart = TableCell::new().vertical_merge(VMergeType::Restart);
        assert_eq!(
            DocxCellView::new(&restart).markup().vertical_merge().unwrap(),
            Some(VerticalMerge::Restart)
        );
    }

    #[test]
    fn field_skips_nulls_and_tries_aliases() {
        let value = json!({"gridSpan": null, "grid_span": 2});
        let found = field(&value, &["gridSpan", "grid_span"]);
        assert_eq!(found, Some(&json!(2)));
    }
}
